//! Product reviews.

use super::{capture_page, Capture, CaptureOptions, MAX_REVIEWS_LIMIT};
use crate::core::types::{Outcome, ReviewsPayload};
use crate::core::AppState;
use crate::extract::{assemble, selectors};
use crate::scraping::navigate::Readiness;

pub async fn reviews(state: &AppState, product_id: &str, limit: usize) -> Outcome<ReviewsPayload> {
    let limit = limit.min(MAX_REVIEWS_LIMIT);
    let url = state.site.reviews_url(product_id);
    let cache_key = format!("{}|{}", product_id, limit);

    if let Some(reviews) = state.reviews_cache.get(&cache_key).await {
        return Outcome::Success(ReviewsPayload {
            product_id: product_id.to_string(),
            count: reviews.len(),
            reviews,
        });
    }

    let sel = selectors::for_site(&state.site);
    let capture = match capture_page(
        state,
        &url,
        CaptureOptions {
            readiness: Readiness::DomReady,
            warm_up: true,
            settle_selector: Some(sel.reviews_ready),
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

    let reviews = assemble::reviews_from_page(&html, &state.site, limit);
    let payload = ReviewsPayload {
        product_id: product_id.to_string(),
        count: reviews.len(),
        reviews,
    };

    if payload.reviews.is_empty() {
        Outcome::Empty(payload)
    } else {
        state
            .reviews_cache
            .insert(cache_key, payload.reviews.clone())
            .await;
        Outcome::Success(payload)
    }
}
