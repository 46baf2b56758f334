//! Category browsing: same listing pipeline as search, different entry URL.

use anyhow::anyhow;

use super::{capture_page, Capture, CaptureOptions, MAX_LISTING_LIMIT};
use crate::core::types::{CategoryPayload, Outcome, ScrapeError};
use crate::core::AppState;
use crate::extract::{assemble, selectors};
use crate::scraping::navigate::Readiness;

pub async fn category(
    state: &AppState,
    category: &str,
    sort: &str,
    limit: usize,
) -> Outcome<CategoryPayload> {
    let limit = limit.min(MAX_LISTING_LIMIT);
    let url = match state.site.category_url(category, sort) {
        Ok(url) => url,
        Err(e) => {
            return Outcome::Failed(ScrapeError::Browser(anyhow!(
                "invalid category url `{}`: {}",
                category,
                e
            )))
        }
    };
    let cache_key = format!("{}|{}", url, limit);

    if let Some(products) = state.listing_cache.get(&cache_key).await {
        return Outcome::Success(CategoryPayload {
            category_url: url.to_string(),
            sort: sort.to_string(),
            count: products.len(),
            products,
        });
    }

    let sel = selectors::for_site(&state.site);
    let capture = match capture_page(
        state,
        &url,
        CaptureOptions {
            readiness: Readiness::DomReady,
            warm_up: true,
            settle_selector: Some(sel.listing_ready),
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

    let products = assemble::products_from_listing(&html, &state.site, limit);
    let payload = CategoryPayload {
        category_url: url.to_string(),
        sort: sort.to_string(),
        count: products.len(),
        products,
    };

    if payload.products.is_empty() {
        Outcome::Empty(payload)
    } else {
        state
            .listing_cache
            .insert(cache_key, payload.products.clone())
            .await;
        Outcome::Success(payload)
    }
}
