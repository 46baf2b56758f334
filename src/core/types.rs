use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Records ──────────────────────────────────────────────────────────────────
//
// Every field except the identifier is independently optional: a record is a
// best-effort snapshot of unstable markup, and a missing element degrades the
// field to absent rather than failing the record.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl Product {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            name: None,
            brand: None,
            price: None,
            old_price: None,
            rating: None,
            reviews_count: None,
            seller: None,
            images: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seller {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
}

// ── Operation payloads ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPayload {
    pub query: String,
    pub sort: String,
    pub count: usize,
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPayload {
    pub category_url: String,
    pub sort: String,
    pub count: usize,
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewsPayload {
    pub product_id: String,
    pub count: usize,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellersPayload {
    pub product_id: String,
    pub count: usize,
    pub sellers: Vec<Seller>,
}

// ── Operation outcome ────────────────────────────────────────────────────────

/// Engine-level faults. Anything below per-operation granularity (a single
/// failed field lookup) is absorbed into `Option` long before it reaches here.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("navigation to {url} did not reach `{readiness}` within {timeout_ms}ms")]
    NavigationTimeout {
        url: String,
        readiness: &'static str,
        timeout_ms: u64,
    },
    #[error("no usable browser found; install Chrome or Chromium, or set CHROME_EXECUTABLE")]
    BrowserUnavailable,
    #[error("{0}")]
    Browser(anyhow::Error),
}

impl From<anyhow::Error> for ScrapeError {
    fn from(e: anyhow::Error) -> Self {
        Self::Browser(e)
    }
}

/// The single structured value every operation resolves to. Callers never see
/// a thrown fault mixed with a partial payload: a blocked gate and an empty
/// extraction are results, and only navigation/browser faults carry an error.
#[derive(Debug)]
pub enum Outcome<T> {
    /// Gate resolved and extraction produced at least one record.
    Success(T),
    /// Gate resolved but no qualifying records were found on the page.
    Empty(T),
    /// Challenge gate exhausted its tick budget.
    AntibotBlocked,
    /// Navigation or browser fault; fatal to this operation only.
    Failed(ScrapeError),
}

impl<T: Serialize> Outcome<T> {
    /// Collapse into the wire contract: payload JSON for resolved outcomes
    /// (empty collections serialize as zero-count successes),
    /// `{"error": "antibot_blocked"}` for gate exhaustion. Engine faults are
    /// handed back to the transport layer to report as it sees fit.
    pub fn into_json(self) -> Result<serde_json::Value, ScrapeError> {
        match self {
            Outcome::Success(payload) | Outcome::Empty(payload) => {
                Ok(serde_json::to_value(&payload).unwrap_or_else(|e| {
                    serde_json::json!({"error": format!("serialization failed: {e}")})
                }))
            }
            Outcome::AntibotBlocked => Ok(serde_json::json!({"error": "antibot_blocked"})),
            Outcome::Failed(e) => Err(e),
        }
    }
}

// ── HTTP envelopes ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductRequest {
    /// Numeric id, canonical catalog URL, or slug URL.
    pub product: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryRequest {
    /// Full URL or site-relative path of the category.
    pub category: String,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewsRequest {
    pub product_id: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SellersRequest {
    pub product_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_outcome_maps_to_stable_error_json() {
        let outcome: Outcome<SearchPayload> = Outcome::AntibotBlocked;
        let json = outcome.into_json().unwrap();
        assert_eq!(json, serde_json::json!({"error": "antibot_blocked"}));
    }

    #[test]
    fn empty_outcome_is_a_zero_count_success() {
        let outcome = Outcome::Empty(SearchPayload {
            query: "iphone 15".into(),
            sort: "popular".into(),
            count: 0,
            products: vec![],
        });
        let json = outcome.into_json().unwrap();
        assert_eq!(json["count"], 0);
        assert!(json["products"].as_array().unwrap().is_empty());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn absent_fields_are_omitted_from_record_json() {
        let product = Product::new("482257013", "https://example.org/catalog/482257013/detail.aspx");
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["id"], "482257013");
        assert!(json.get("rating").is_none());
        assert!(json.get("images").is_none());
    }
}
