//! Navigation driver: issues a navigation, waits for a readiness condition,
//! and provides the pre-extraction warm-up for lazy-rendered listings.
//!
//! Readiness never implies the content is usable; the target happily reaches
//! `DomReady` on its challenge interstitial. Callers gate on the challenge
//! after every navigation, whatever readiness they asked for.

use anyhow::anyhow;
use chromiumoxide::Page;
use rand::RngExt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::core::types::ScrapeError;

/// Page-load milestone a navigation waits for before returning control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Structural DOM parsed (`document.readyState` left `loading`).
    DomReady,
    /// Resource traffic quiescent for a short window.
    NetworkIdle,
}

impl Readiness {
    pub fn as_str(self) -> &'static str {
        match self {
            Readiness::DomReady => "dom_ready",
            Readiness::NetworkIdle => "network_idle",
        }
    }
}

/// Navigate `page` to `url` and wait for `readiness`, all within one budget.
/// Exceeding the budget is a `NavigationTimeout`; transport-level failures
/// surface as browser faults. Either way the operation is over, there is no
/// partial-success navigation.
pub async fn navigate(
    page: &Page,
    url: &str,
    readiness: Readiness,
    budget: Duration,
) -> Result<(), ScrapeError> {
    let timeout_err = || ScrapeError::NavigationTimeout {
        url: url.to_string(),
        readiness: readiness.as_str(),
        timeout_ms: budget.as_millis() as u64,
    };

    let started = Instant::now();
    let committed = tokio::time::timeout(budget, page.goto(url))
        .await
        .map_err(|_| timeout_err())?;
    committed.map_err(|e| ScrapeError::Browser(anyhow!("navigation to {} failed: {}", url, e)))?;

    let remaining = budget.saturating_sub(started.elapsed());
    let reached = match readiness {
        Readiness::DomReady => wait_dom_ready(page, remaining).await,
        Readiness::NetworkIdle => wait_network_quiet(page, Duration::from_millis(1500), remaining).await,
    };
    if !reached {
        return Err(timeout_err());
    }
    debug!(
        "navigation reached {} in {}ms: {}",
        readiness.as_str(),
        started.elapsed().as_millis(),
        url
    );
    Ok(())
}

async fn eval_json(page: &Page, script: &str) -> Option<serde_json::Value> {
    page.evaluate(script)
        .await
        .ok()
        .and_then(|v| v.into_value::<serde_json::Value>().ok())
}

/// Poll until `document.readyState` leaves `loading`.
async fn wait_dom_ready(page: &Page, budget: Duration) -> bool {
    let deadline = Instant::now() + budget;
    loop {
        let parsed = eval_json(page, "document.readyState")
            .await
            .and_then(|j| j.as_str().map(|s| s != "loading"))
            .unwrap_or(false);
        if parsed {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep(Duration::from_millis(100)).await;
    }
}

/// Poll until the resource-entry count stops growing for `quiet` while the
/// document is fully loaded. A Playwright-style networkidle heuristic that
/// needs no CDP network events.
async fn wait_network_quiet(page: &Page, quiet: Duration, budget: Duration) -> bool {
    let deadline = Instant::now() + budget;
    let mut last_count = 0u64;
    let mut stable_since = Instant::now();

    loop {
        if Instant::now() >= deadline {
            return false;
        }

        let count = eval_json(page, "performance.getEntriesByType('resource').length")
            .await
            .and_then(|j| j.as_u64())
            .unwrap_or(0);
        let complete = eval_json(page, "document.readyState")
            .await
            .and_then(|j| j.as_str().map(|s| s == "complete"))
            .unwrap_or(false);

        if !complete || count != last_count {
            last_count = count;
            stable_since = Instant::now();
        } else if stable_since.elapsed() >= quiet {
            return true;
        }

        sleep(Duration::from_millis(250)).await;
    }
}

/// Wait for the first entity fragment to materialize, then a fixed settle
/// delay for hydration. Absence is not an error: extraction simply finds
/// nothing and the operation reports a zero-count result.
pub async fn wait_for_fragment(
    page: &Page,
    selector: &str,
    budget: Duration,
    settle: Duration,
) -> bool {
    let deadline = Instant::now() + budget;
    let script = format!("document.querySelector('{selector}') !== null");
    loop {
        if eval_json(page, &script)
            .await
            .and_then(|j| j.as_bool())
            .unwrap_or(false)
        {
            sleep(settle).await;
            return true;
        }
        if Instant::now() >= deadline {
            warn!("fragment `{selector}` never appeared within budget");
            return false;
        }
        sleep(Duration::from_millis(250)).await;
    }
}

/// Pre-extraction warm-up for listing pages: scroll ticks interleaved with
/// fixed short delays plus a few mouse probes, purely to trigger lazy
/// rendering. Capped, best-effort, and without any success/failure signal of
/// its own.
pub async fn warm_up_listing(page: &Page, passes: u32) {
    // Sample all jitter up front; the thread-local RNG must not be held
    // across an await.
    let (scrolls, probes) = {
        let mut rng = rand::rng();
        let scrolls: Vec<u32> = (0..passes).map(|_| rng.random_range(600..=900)).collect();
        let probes: Vec<(u32, u32)> = (0..2)
            .map(|_| (rng.random_range(100..800), rng.random_range(100..600)))
            .collect();
        (scrolls, probes)
    };

    for distance in scrolls {
        if let Err(e) = page
            .evaluate(format!(
                "window.scrollBy({{top: {distance}, behavior: 'smooth'}});"
            ))
            .await
        {
            warn!("warm-up scroll error: {}", e);
        }
        sleep(Duration::from_millis(500)).await;
    }

    for (x, y) in probes {
        if let Err(e) = page
            .evaluate(format!("document.elementFromPoint({x}, {y})"))
            .await
        {
            warn!("warm-up mouse probe error: {}", e);
        }
        sleep(Duration::from_millis(150)).await;
    }
}
