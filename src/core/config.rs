use std::path::{Path, PathBuf};

pub const ENV_CHROME_EXECUTABLE: &str = "CHROME_EXECUTABLE";
pub const ENV_SCRATCH_DIR: &str = "MARKET_SCOUT_SCRATCH_DIR";

/// Optional override for the Chromium-family browser executable.
///
/// Default behavior is auto-discovery (see
/// `scraping::browser_manager::find_chrome_executable()`). This only returns a
/// value when `CHROME_EXECUTABLE` points at an existing path.
pub fn chrome_executable_override() -> Option<String> {
    let p = std::env::var(ENV_CHROME_EXECUTABLE).ok()?;
    let p = p.trim();
    if p.is_empty() {
        return None;
    }
    if Path::new(p).exists() {
        Some(p.to_string())
    } else {
        None
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

/// Timeout and polling budgets for the navigation/gating engine.
///
/// Every wait the engine performs is bounded by one of these values; there are
/// no unbounded suspensions anywhere in an operation.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Budget for a navigation to reach its readiness condition.
    pub nav_timeout_ms: u64,
    /// Fixed interval between challenge-gate polls.
    pub gate_tick_ms: u64,
    /// Number of gate polls before the operation is reported blocked.
    pub gate_max_ticks: u32,
    /// Budget for the post-gate wait for the first entity fragment to appear.
    pub fragment_wait_ms: u64,
    /// Fixed delay after the fragment appears, letting hydration finish.
    pub settle_ms: u64,
    /// Scroll/mouse warm-up passes on listing pages before capture.
    pub warmup_passes: u32,
    /// Where blocked-page diagnostics (HTML + screenshot) are written.
    pub scratch_dir: PathBuf,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self {
            nav_timeout_ms: env_u64("MARKET_SCOUT_NAV_TIMEOUT_MS", 60_000),
            gate_tick_ms: env_u64("MARKET_SCOUT_GATE_TICK_MS", 1_000),
            gate_max_ticks: env_u64("MARKET_SCOUT_GATE_MAX_TICKS", 30) as u32,
            fragment_wait_ms: env_u64("MARKET_SCOUT_FRAGMENT_WAIT_MS", 10_000),
            settle_ms: env_u64("MARKET_SCOUT_SETTLE_MS", 2_000),
            warmup_passes: env_u64("MARKET_SCOUT_WARMUP_PASSES", 3) as u32,
            scratch_dir: scratch_dir(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Scratch directory for operator-facing diagnostics.
///
/// `MARKET_SCOUT_SCRATCH_DIR` → `~/.market-scout/debug` → system temp dir.
fn scratch_dir() -> PathBuf {
    if let Ok(v) = std::env::var(ENV_SCRATCH_DIR) {
        let v = v.trim();
        if !v.is_empty() {
            return PathBuf::from(v);
        }
    }
    match dirs::home_dir() {
        Some(home) => home.join(".market-scout").join("debug"),
        None => std::env::temp_dir().join("market-scout"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_gate_contract() {
        let cfg = EngineConfig::from_env();
        // 30 one-second ticks is the documented challenge budget.
        assert_eq!(cfg.gate_tick_ms, 1_000);
        assert_eq!(cfg.gate_max_ticks, 30);
        assert!(cfg.nav_timeout_ms >= cfg.fragment_wait_ms);
    }
}
