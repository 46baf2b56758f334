//! Target-site profile: URL shapes and block-signature phrases.
//!
//! Everything locale- or market-specific lives here as data. The challenge
//! gate, navigation driver, and extractor are site-agnostic; adding a new
//! target means writing a new profile, not touching the engine.

use url::Url;

/// Sort orders the site understands, documented for tool schemas only.
/// Unrecognized values are passed through to the site's query parameter
/// uninterpreted.
pub const SORT_VALUES: &[&str] = &["popular", "rate", "priceup", "pricedown", "newly"];

#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub name: &'static str,
    base: Url,
    /// Page-title substrings that mark the anti-bot interstitial.
    pub block_title_signatures: Vec<String>,
    /// Secondary signatures checked against full page content.
    pub block_content_signatures: Vec<String>,
}

impl SiteProfile {
    pub fn wildberries() -> Self {
        Self {
            name: "wildberries",
            base: Url::parse("https://www.wildberries.ru/").expect("static base url"),
            block_title_signatures: vec![
                "Почти готово".to_string(),
                "Доступ ограничен".to_string(),
            ],
            block_content_signatures: vec!["Antibot".to_string()],
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn search_url(&self, query: &str, sort: &str) -> Url {
        let mut url = self
            .base
            .join("catalog/0/search.aspx")
            .expect("static search path");
        url.query_pairs_mut()
            .append_pair("search", query)
            .append_pair("sort", sort);
        url
    }

    pub fn product_url(&self, id: &str) -> Url {
        self.base
            .join(&format!("catalog/{id}/detail.aspx"))
            .unwrap_or_else(|_| self.base.clone())
    }

    pub fn reviews_url(&self, id: &str) -> Url {
        self.base
            .join(&format!("catalog/{id}/feedbacks"))
            .unwrap_or_else(|_| self.base.clone())
    }

    /// Accepts a full URL or a site-relative path; the sort parameter is
    /// appended either way.
    pub fn category_url(&self, category: &str, sort: &str) -> Result<Url, url::ParseError> {
        let mut url = if category.starts_with("http://") || category.starts_with("https://") {
            Url::parse(category)?
        } else {
            self.base.join(category)?
        };
        url.query_pairs_mut().append_pair("sort", sort);
        Ok(url)
    }

    /// Absolutize an extracted href for record URLs.
    pub fn absolute(&self, href: &str) -> String {
        match self.base.join(href) {
            Ok(url) => url.to_string(),
            Err(_) => href.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_carries_query_and_sort() {
        let site = SiteProfile::wildberries();
        let url = site.search_url("iphone 15", "pricedown");
        assert!(url.as_str().contains("/catalog/0/search.aspx"));
        assert!(url.as_str().contains("search=iphone+15"));
        assert!(url.as_str().contains("sort=pricedown"));
    }

    #[test]
    fn unknown_sort_passes_through_untouched() {
        let site = SiteProfile::wildberries();
        let url = site.search_url("чайник", "mystery_sort");
        assert!(url.as_str().contains("sort=mystery_sort"));
    }

    #[test]
    fn category_url_accepts_paths_and_full_urls() {
        let site = SiteProfile::wildberries();
        let from_path = site
            .category_url("/catalog/elektronika/smartfony", "popular")
            .unwrap();
        assert_eq!(from_path.host_str(), Some("www.wildberries.ru"));
        assert!(from_path.as_str().ends_with("sort=popular"));

        let from_url = site
            .category_url("https://www.wildberries.ru/catalog/obuv?page=2", "rate")
            .unwrap();
        assert!(from_url.as_str().contains("page=2"));
        assert!(from_url.as_str().contains("sort=rate"));
    }

    #[test]
    fn product_and_reviews_urls_are_canonical() {
        let site = SiteProfile::wildberries();
        assert_eq!(
            site.product_url("482257013").as_str(),
            "https://www.wildberries.ru/catalog/482257013/detail.aspx"
        );
        assert_eq!(
            site.reviews_url("482257013").as_str(),
            "https://www.wildberries.ru/catalog/482257013/feedbacks"
        );
    }
}
