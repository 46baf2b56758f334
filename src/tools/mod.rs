//! Operation plumbing shared by every tool.
//!
//! One logical operation = one page handle: borrow a page from the session,
//! navigate, pass the challenge gate, optionally settle/warm up/expand, capture
//! the HTML, and close the page on every exit path, faulted ones included.
//! Extraction then runs on the captured HTML, never on the live page.

pub mod category;
pub mod product;
pub mod reviews;
pub mod search;
pub mod sellers;

use anyhow::anyhow;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::core::config::EngineConfig;
use crate::core::types::ScrapeError;
use crate::core::AppState;
use crate::scraping::gate::{ChallengeGate, GateState};
use crate::scraping::navigate::{self, Readiness};

/// Listing endpoints cap at 50 records, reviews at 30 (site page size).
pub const MAX_LISTING_LIMIT: usize = 50;
pub const DEFAULT_LISTING_LIMIT: usize = 20;
pub const MAX_REVIEWS_LIMIT: usize = 30;
pub const DEFAULT_REVIEWS_LIMIT: usize = 10;

pub(crate) struct CaptureOptions<'a> {
    pub readiness: Readiness,
    /// Scroll/mouse warm-up before capture (listing-style pages).
    pub warm_up: bool,
    /// Entity-fragment selector to wait for after the gate resolves.
    pub settle_selector: Option<&'a str>,
    /// Button to click before capture (e.g. the sellers expander).
    pub expand: Option<&'a str>,
}

pub(crate) enum Capture {
    Html(String),
    Blocked,
}

/// Run one navigation-and-capture round trip on a fresh page handle.
///
/// Operations against the shared session are serialized here; the page is
/// closed whatever happens past this point.
pub(crate) async fn capture_page(
    state: &AppState,
    url: &Url,
    opts: CaptureOptions<'_>,
) -> Result<Capture, ScrapeError> {
    let session = state.session()?;
    let _serialize = state.scrape_lock.lock().await;

    let page = session.page().await.map_err(ScrapeError::Browser)?;
    let result = drive_page(state, &page, url, opts).await;
    if let Err(e) = page.close().await {
        warn!("page close error (non-fatal): {}", e);
    }
    result
}

async fn drive_page(
    state: &AppState,
    page: &Page,
    url: &Url,
    opts: CaptureOptions<'_>,
) -> Result<Capture, ScrapeError> {
    info!("operation navigating: {}", url);
    navigate::navigate(
        page,
        url.as_str(),
        opts.readiness,
        Duration::from_millis(state.engine.nav_timeout_ms),
    )
    .await?;

    let gate = ChallengeGate::for_site(&state.site, &state.engine);
    if gate.wait_for_page(page).await == GateState::Blocked {
        dump_blocked_page(&state.engine, page, url).await;
        return Ok(Capture::Blocked);
    }

    if let Some(selector) = opts.settle_selector {
        navigate::wait_for_fragment(
            page,
            selector,
            Duration::from_millis(state.engine.fragment_wait_ms),
            Duration::from_millis(state.engine.settle_ms),
        )
        .await;
    }

    if opts.warm_up {
        navigate::warm_up_listing(page, state.engine.warmup_passes).await;
    }

    if let Some(selector) = opts.expand {
        expand_section(page, selector, Duration::from_millis(state.engine.settle_ms)).await;
    }

    let html = page
        .content()
        .await
        .map_err(|e| ScrapeError::Browser(anyhow!("failed to capture page content: {}", e)))?;
    Ok(Capture::Html(html))
}

/// Best-effort click on an expander; absence or a failed click just means the
/// collapsed view gets extracted.
async fn expand_section(page: &Page, selector: &str, settle: Duration) {
    match page.find_element(selector).await {
        Ok(element) => match element.click().await {
            Ok(_) => tokio::time::sleep(settle).await,
            Err(e) => debug!("expander `{}` click failed: {}", selector, e),
        },
        Err(_) => debug!("expander `{}` not present", selector),
    }
}

/// Operator diagnostics for an exhausted gate: raw HTML plus a screenshot in
/// the scratch directory. Strictly best-effort and outside the functional
/// contract.
async fn dump_blocked_page(engine: &EngineConfig, page: &Page, url: &Url) {
    let dir = &engine.scratch_dir;
    if let Err(e) = tokio::fs::create_dir_all(dir).await {
        warn!("cannot create scratch dir {}: {}", dir.display(), e);
        return;
    }

    let host = url
        .host_str()
        .map(|h| h.replace('.', "_"))
        .unwrap_or_else(|| "unknown".to_string());
    let stem = format!("blocked_{}_{}", host, chrono::Utc::now().timestamp_millis());

    if let Ok(html) = page.content().await {
        let path = dir.join(format!("{stem}.html"));
        if let Err(e) = tokio::fs::write(&path, html).await {
            warn!("failed to write blocked-page html: {}", e);
        }
    }

    match page
        .screenshot(
            ScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .build(),
        )
        .await
    {
        Ok(bytes) => {
            let path = dir.join(format!("{stem}.png"));
            if let Err(e) = tokio::fs::write(&path, bytes).await {
                warn!("failed to write blocked-page screenshot: {}", e);
            }
        }
        Err(e) => warn!("blocked-page screenshot failed: {}", e),
    }

    warn!(
        "challenge gate exhausted for {}; diagnostics under {}",
        url,
        dir.display()
    );
}
