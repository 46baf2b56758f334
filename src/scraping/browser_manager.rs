//! Browser session management using `chromiumoxide`.
//!
//! One `BrowserSession` owns one Chromium process for the life of the server.
//! Operations never share a browsing surface: each one borrows a fresh page
//! handle from the session and must close it on every exit path. The session
//! itself is lazily launched on first use and restarted transparently if the
//! process dies between operations.

use anyhow::{anyhow, Result};
use chromiumoxide::browser::BrowserConfig;
use chromiumoxide::cdp::browser_protocol::emulation::SetTimezoneOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::stealth::{masking_script, SessionConfig};
use crate::core::config::chrome_executable_override;

// ── Browser executable discovery ─────────────────────────────────────────────

/// Find a usable Chromium-family browser executable.
///
/// Resolution order: `CHROME_EXECUTABLE` env var → PATH scan → OS-specific
/// well-known install locations.
pub fn find_chrome_executable() -> Option<String> {
    if let Some(p) = chrome_executable_override() {
        return Some(p);
    }

    if let Ok(path_var) = std::env::var("PATH") {
        let candidates = ["google-chrome", "chromium", "chromium-browser", "chrome"];
        for dir in std::env::split_paths(&path_var) {
            for exe in candidates {
                let full = dir.join(exe);
                if full.exists() {
                    return Some(full.to_string_lossy().to_string());
                }
            }
        }
    }

    #[cfg(target_os = "macos")]
    let candidates = [
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
    ];
    #[cfg(target_os = "linux")]
    let candidates = [
        "/usr/bin/google-chrome",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/usr/local/bin/chromium",
    ];
    #[cfg(target_os = "windows")]
    let candidates = [
        r"C:\Program Files\Google\Chrome\Application\chrome.exe",
        r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
    ];

    candidates
        .iter()
        .find(|c| Path::new(c).exists())
        .map(|c| c.to_string())
}

/// Build a headless `BrowserConfig` carrying the session's masking identity.
///
/// `--disable-blink-features=AutomationControlled` suppresses the
/// `navigator.webdriver` flag at the process level; the rest of the masking
/// happens in the per-page init script.
fn build_headless_config(exe: &str, cfg: &SessionConfig) -> Result<BrowserConfig> {
    BrowserConfig::builder()
        .chrome_executable(exe)
        .viewport(Viewport {
            width: cfg.viewport_width,
            height: cfg.viewport_height,
            device_scale_factor: Some(1.0),
            emulating_mobile: false,
            is_landscape: true,
            has_touch: false,
        })
        .window_size(cfg.viewport_width, cfg.viewport_height)
        .arg("--disable-gpu")
        .arg("--no-sandbox") // required in CI / container environments
        .arg("--disable-setuid-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-extensions")
        .arg("--disable-background-networking")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--hide-scrollbars")
        .arg("--mute-audio")
        .arg("--disable-blink-features=AutomationControlled")
        .arg(format!("--lang={}", cfg.lang))
        .arg(format!("--user-agent={}", cfg.user_agent))
        .build()
        .map_err(|e| anyhow!("Failed to build browser config: {}", e))
}

// ── Browser session ──────────────────────────────────────────────────────────

/// A long-lived browser process shared by all operations in this server.
///
/// `page()` vends a fresh tab per logical operation, with the masking script
/// and timezone override already installed. Callers close the tab when the
/// operation finishes; the browser stays alive. If the process has crashed,
/// the next `page()` call relaunches it.
pub struct BrowserSession {
    exe: String,
    config: SessionConfig,
    inner: Mutex<Option<Browser>>,
    pages_opened: AtomicUsize,
}

impl BrowserSession {
    pub fn new(exe: impl Into<String>, config: SessionConfig) -> Arc<Self> {
        Arc::new(Self {
            exe: exe.into(),
            config,
            inner: Mutex::new(None),
            pages_opened: AtomicUsize::new(0),
        })
    }

    /// Create a session using the auto-discovered executable.
    /// Returns `None` when no browser is installed on this machine.
    pub fn new_auto(config: SessionConfig) -> Option<Arc<Self>> {
        find_chrome_executable().map(|exe| Self::new(exe, config))
    }

    /// Borrow a fresh masked page handle.
    ///
    /// Lazy-starts the browser on first call and restarts it transparently if
    /// the process is gone. The returned page is on `about:blank`; callers
    /// navigate it and must close it on every exit path.
    pub async fn page(&self) -> Result<Page> {
        let mut guard = self.inner.lock().await;

        if let Some(browser) = guard.as_mut() {
            match browser.new_page("about:blank").await {
                Ok(page) => {
                    self.prepare_page(&page).await?;
                    self.pages_opened.fetch_add(1, Ordering::Relaxed);
                    return Ok(page);
                }
                Err(e) => {
                    warn!("Browser session dead ({}), restarting", e);
                    if let Some(mut old) = guard.take() {
                        let _ = old.close().await;
                    }
                }
            }
        }

        info!("Launching browser session ({})", self.exe);
        let config = build_headless_config(&self.exe, &self.config)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| anyhow!("Failed to launch browser ({}): {}", self.exe, e))?;
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("CDP handler error: {}", e);
                }
            }
        });
        *guard = Some(browser);

        let page = guard
            .as_mut()
            .expect("session just launched")
            .new_page("about:blank")
            .await
            .map_err(|e| anyhow!("Failed to open page: {}", e))?;
        self.prepare_page(&page).await?;
        self.pages_opened.fetch_add(1, Ordering::Relaxed);
        Ok(page)
    }

    /// Install the masking script and timezone override on a new page handle,
    /// before its first navigation.
    async fn prepare_page(&self, page: &Page) -> Result<()> {
        page.execute(AddScriptToEvaluateOnNewDocumentParams::new(
            masking_script(),
        ))
        .await
        .map_err(|e| anyhow!("Failed to install masking script: {}", e))?;

        if let Err(e) = page
            .execute(SetTimezoneOverrideParams::new(self.config.timezone.clone()))
            .await
        {
            warn!("Timezone override failed (non-fatal): {}", e);
        }
        Ok(())
    }

    /// Total pages this session has vended; diagnostic only.
    pub fn pages_opened(&self) -> usize {
        self.pages_opened.load(Ordering::Relaxed)
    }

    /// Gracefully close the browser process. Safe to call repeatedly.
    pub async fn shutdown(&self) {
        let mut guard = self.inner.lock().await;
        if let Some(mut browser) = guard.take() {
            let _ = browser.close().await;
            info!(
                "Browser session shut down ({} pages served)",
                self.pages_opened()
            );
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // Drop cannot await; spawn the close when a runtime is still around to
        // avoid leaving a zombie Chromium process behind.
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };

        if let Ok(mut guard) = self.inner.try_lock() {
            if let Some(mut browser) = guard.take() {
                handle.spawn(async move {
                    let _ = browser.close().await;
                });
            }
        }
    }
}
