use std::sync::Arc;

use crate::core::config::EngineConfig;
use crate::core::site::SiteProfile;
use crate::core::types::{Product, Review, Seller};
use crate::scraping::browser_manager::BrowserSession;

#[derive(Clone)]
pub struct AppState {
    pub site: Arc<SiteProfile>,
    pub engine: EngineConfig,
    /// Shared persistent browser session (lazy launch, page-per-operation).
    /// `None` when no Chromium-family executable exists on this machine;
    /// every operation then resolves to a browser-unavailable fault.
    pub session: Option<Arc<BrowserSession>>,
    // Caches for repeat lookups; only resolved, non-empty payloads are stored.
    pub listing_cache: moka::future::Cache<String, Vec<Product>>, // key: listing url
    pub product_cache: moka::future::Cache<String, Product>,      // key: product id
    pub reviews_cache: moka::future::Cache<String, Vec<Review>>,  // key: id + limit
    pub sellers_cache: moka::future::Cache<String, Vec<Seller>>,  // key: product id
    // Operations against one session are strictly sequential; the page handle
    // is never shared across concurrent operations.
    pub scrape_lock: Arc<tokio::sync::Mutex<()>>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("site", &self.site.name)
            .field("browser_available", &self.session.is_some())
            .finish()
    }
}

impl AppState {
    pub fn new() -> Self {
        let site = Arc::new(SiteProfile::wildberries());
        let engine = EngineConfig::from_env();
        let session = BrowserSession::new_auto(crate::scraping::stealth::SessionConfig::default());

        Self {
            site,
            engine,
            session,
            listing_cache: moka::future::Cache::builder()
                .max_capacity(1_000)
                .time_to_live(std::time::Duration::from_secs(60 * 10))
                .build(),
            product_cache: moka::future::Cache::builder()
                .max_capacity(10_000)
                .time_to_live(std::time::Duration::from_secs(60 * 30))
                .build(),
            reviews_cache: moka::future::Cache::builder()
                .max_capacity(1_000)
                .time_to_live(std::time::Duration::from_secs(60 * 30))
                .build(),
            sellers_cache: moka::future::Cache::builder()
                .max_capacity(1_000)
                .time_to_live(std::time::Duration::from_secs(60 * 10))
                .build(),
            scrape_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Session accessor for operations; absence is an operation-level fault,
    /// not a panic.
    pub fn session(&self) -> Result<&Arc<BrowserSession>, crate::core::types::ScrapeError> {
        self.session
            .as_ref()
            .ok_or(crate::core::types::ScrapeError::BrowserUnavailable)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
