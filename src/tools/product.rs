//! Product detail lookup.

use url::Url;

use super::{capture_page, Capture, CaptureOptions};
use crate::core::site::SiteProfile;
use crate::core::types::{Outcome, Product};
use crate::core::AppState;
use crate::extract::{self, assemble, selectors};
use crate::scraping::navigate::Readiness;

/// Resolve a caller-supplied product reference into an identifier and the URL
/// to navigate. Accepts a bare numeric id, a canonical catalog URL, or a slug
/// URL. `None` means the reference carries no identifier at all; the handler
/// rejects it before any navigation happens.
pub fn resolve_product_ref(site: &SiteProfile, input: &str) -> Option<(String, Url)> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if input.chars().all(|c| c.is_ascii_digit()) {
        return Some((input.to_string(), site.product_url(input)));
    }
    let url = Url::parse(input).ok()?;
    let id = extract::product_id_from_url(url.path())?;
    Some((id, url))
}

pub async fn product(state: &AppState, id: &str, url: &Url) -> Outcome<Product> {
    if let Some(cached) = state.product_cache.get(id).await {
        return Outcome::Success(cached);
    }

    let sel = selectors::for_site(&state.site);
    let capture = match capture_page(
        state,
        url,
        CaptureOptions {
            readiness: Readiness::DomReady,
            warm_up: false,
            settle_selector: Some(sel.product_ready),
            expand: None,
        },
    )
    .await
    {
        Ok(capture) => capture,
        Err(e) => return Outcome::Failed(e),
    };

    let html = match capture {
        Capture::Blocked => return Outcome::AntibotBlocked,
        Capture::Html(html) => html,
    };

    let record = assemble::product_from_page(&html, &state.site, id, url.as_str());
    if has_detail(&record) {
        state.product_cache.insert(id.to_string(), record.clone()).await;
        Outcome::Success(record)
    } else {
        // Identity alone is not an extraction; the page yielded nothing.
        Outcome::Empty(record)
    }
}

fn has_detail(record: &Product) -> bool {
    record.name.is_some()
        || record.brand.is_some()
        || record.price.is_some()
        || record.old_price.is_some()
        || record.rating.is_some()
        || record.reviews_count.is_some()
        || record.seller.is_some()
        || !record.images.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_bare_ids_and_both_url_shapes() {
        let site = SiteProfile::wildberries();

        let (id, url) = resolve_product_ref(&site, "482257013").unwrap();
        assert_eq!(id, "482257013");
        assert!(url.as_str().ends_with("/catalog/482257013/detail.aspx"));

        let (id, _) = resolve_product_ref(
            &site,
            "https://www.wildberries.ru/catalog/146837693/detail.aspx",
        )
        .unwrap();
        assert_eq!(id, "146837693");

        let (id, url) = resolve_product_ref(
            &site,
            "https://www.example.org/product/smartfon-apple-iphone-15-146837693",
        )
        .unwrap();
        assert_eq!(id, "146837693");
        assert!(url.as_str().contains("example.org"));
    }

    #[test]
    fn unresolvable_references_are_rejected() {
        let site = SiteProfile::wildberries();
        assert!(resolve_product_ref(&site, "").is_none());
        assert!(resolve_product_ref(&site, "not a product").is_none());
        assert!(resolve_product_ref(&site, "https://www.wildberries.ru/brands/apple").is_none());
    }
}
