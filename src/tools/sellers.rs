//! Sellers offering a product.
//!
//! The seller list hides behind an expander on the product page; the capture
//! step clicks it best-effort so both the main seller and the expanded list
//! land in the snapshot.

use super::{capture_page, Capture, CaptureOptions};
use crate::core::types::{Outcome, SellersPayload};
use crate::core::AppState;
use crate::extract::{assemble, selectors};
use crate::scraping::navigate::Readiness;

pub async fn sellers(state: &AppState, product_id: &str) -> Outcome<SellersPayload> {
    let url = state.site.product_url(product_id);

    if let Some(sellers) = state.sellers_cache.get(product_id).await {
        return Outcome::Success(SellersPayload {
            product_id: product_id.to_string(),
            count: sellers.len(),
            sellers,
        });
    }

    let sel = selectors::for_site(&state.site);
    let capture = match capture_page(
        state,
        &url,
        CaptureOptions {
            readiness: Readiness::DomReady,
            warm_up: false,
            settle_selector: Some(sel.product_ready),
            expand: Some(sel.sellers_expander),
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

    let sellers = assemble::sellers_from_page(&html, &state.site);
    let payload = SellersPayload {
        product_id: product_id.to_string(),
        count: sellers.len(),
        sellers,
    };

    if payload.sellers.is_empty() {
        Outcome::Empty(payload)
    } else {
        state
            .sellers_cache
            .insert(product_id.to_string(), payload.sellers.clone())
            .await;
        Outcome::Success(payload)
    }
}
