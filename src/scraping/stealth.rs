//! Session masking configuration.
//!
//! The target serves a challenge interstitial to anything that smells like
//! automation, so the session presents one consistent desktop identity:
//! a fixed Chrome-on-Windows user agent, a Russian locale/timezone, and an
//! init script that hides the obvious CDP traces. The script is installed on
//! every page the session vends, before any navigation on that page.

/// Masking identity for a browser session. Applied once per session at
/// launch (flags) and once per page handle (init script, timezone override).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Browser UI locale, passed via `--lang`.
    pub lang: String,
    /// CDP timezone override, e.g. `Europe/Moscow`.
    pub timezone: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            viewport_width: 1920,
            viewport_height: 1080,
            lang: "ru-RU".to_string(),
            timezone: "Europe/Moscow".to_string(),
        }
    }
}

/// Fingerprint-masking script evaluated on every new document.
pub fn masking_script() -> &'static str {
    r#"
// Remove the webdriver flag: "absent" beats "false" for most detectors.
Object.defineProperty(navigator, 'webdriver', {
    get: () => undefined
});

// Non-empty plugins stub.
Object.defineProperty(navigator, 'plugins', {
    get: () => [1, 2, 3, 4, 5]
});

// Locale-consistent language list.
Object.defineProperty(navigator, 'languages', {
    get: () => ['ru-RU', 'ru', 'en-US', 'en']
});

// Notification permission probe must not throw under automation.
const originalQuery = window.navigator.permissions.query;
window.navigator.permissions.query = (parameters) => (
    parameters.name === 'notifications'
        ? Promise.resolve({ state: Notification.permission })
        : originalQuery(parameters)
);

// Headless Chromium ships without window.chrome.
window.chrome = window.chrome || { runtime: {} };
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_identity_is_desktop_russian() {
        let cfg = SessionConfig::default();
        assert!(cfg.user_agent.contains("Chrome/"));
        assert_eq!((cfg.viewport_width, cfg.viewport_height), (1920, 1080));
        assert_eq!(cfg.timezone, "Europe/Moscow");
    }

    #[test]
    fn masking_script_covers_the_known_probes() {
        let script = masking_script();
        for probe in ["webdriver", "plugins", "languages", "permissions", "chrome"] {
            assert!(script.contains(probe), "masking script misses {probe}");
        }
    }
}
