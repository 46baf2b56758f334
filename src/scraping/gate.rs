//! Challenge gate: waits out the anti-bot interstitial after a navigation.
//!
//! Two states, `Blocked` and `Resolved`, starting `Blocked` after every
//! navigation. Once per tick the gate observes the page title (and, when the
//! profile defines content signatures, the full content) and resolves as soon
//! as no block signature is present. The polling interval is fixed, not
//! exponential: the interstitial clears client-side within a bounded window
//! or not at all. The gate only observes; it never mutates the page.

use aho_corasick::AhoCorasick;
use chromiumoxide::Page;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::core::config::EngineConfig;
use crate::core::site::SiteProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Blocked,
    Resolved,
}

/// One observation of the page, taken each tick.
#[derive(Debug, Clone, Default)]
pub struct PageObservation {
    /// `None` when the title probe itself failed; counted as still blocked.
    pub title: Option<String>,
    /// Captured only when the site profile defines content signatures.
    pub content: Option<String>,
}

pub struct ChallengeGate {
    title_matcher: AhoCorasick,
    content_matcher: Option<AhoCorasick>,
    tick: Duration,
    max_ticks: u32,
}

impl ChallengeGate {
    pub fn new(
        title_signatures: &[String],
        content_signatures: &[String],
        tick: Duration,
        max_ticks: u32,
    ) -> Self {
        let title_matcher = AhoCorasick::new(title_signatures).expect("valid block signatures");
        let content_matcher = if content_signatures.is_empty() {
            None
        } else {
            Some(AhoCorasick::new(content_signatures).expect("valid block signatures"))
        };
        Self {
            title_matcher,
            content_matcher,
            tick,
            max_ticks,
        }
    }

    pub fn for_site(site: &SiteProfile, engine: &EngineConfig) -> Self {
        Self::new(
            &site.block_title_signatures,
            &site.block_content_signatures,
            Duration::from_millis(engine.gate_tick_ms),
            engine.gate_max_ticks,
        )
    }

    pub fn needs_content(&self) -> bool {
        self.content_matcher.is_some()
    }

    /// Classify a single observation. A failed probe is never resolution.
    pub fn inspect(&self, observation: &PageObservation) -> GateState {
        let Some(title) = observation.title.as_deref() else {
            return GateState::Blocked;
        };
        if self.title_matcher.is_match(title) {
            return GateState::Blocked;
        }
        if let (Some(matcher), Some(content)) =
            (self.content_matcher.as_ref(), observation.content.as_deref())
        {
            if matcher.is_match(content) {
                return GateState::Blocked;
            }
        }
        GateState::Resolved
    }

    /// Poll `probe` once per tick until the page stops matching any block
    /// signature or the tick budget runs out. Exactly `max_ticks` observations
    /// are taken in the blocked case.
    pub async fn wait_with<F, Fut>(&self, mut probe: F) -> GateState
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = PageObservation>,
    {
        for tick in 0..self.max_ticks {
            tokio::time::sleep(self.tick).await;
            let observation = probe().await;
            if self.inspect(&observation) == GateState::Resolved {
                debug!("challenge gate resolved after {} tick(s)", tick + 1);
                return GateState::Resolved;
            }
        }
        debug!("challenge gate exhausted {} ticks", self.max_ticks);
        GateState::Blocked
    }

    /// Gate a live page by polling its title (and content when the profile
    /// defines content signatures) over CDP.
    pub async fn wait_for_page(&self, page: &Page) -> GateState {
        let needs_content = self.needs_content();
        self.wait_with(|| {
            let page = page;
            async move {
                let title = page.get_title().await.ok().flatten();
                let content = if needs_content && title.is_some() {
                    page.content().await.ok()
                } else {
                    None
                };
                PageObservation { title, content }
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn gate(max_ticks: u32) -> ChallengeGate {
        ChallengeGate::new(
            &["Почти готово".to_string(), "Доступ ограничен".to_string()],
            &["Antibot".to_string()],
            Duration::from_millis(1),
            max_ticks,
        )
    }

    fn titled(title: &str) -> PageObservation {
        PageObservation {
            title: Some(title.to_string()),
            content: None,
        }
    }

    #[tokio::test]
    async fn resolves_once_the_title_clears() {
        let gate = gate(30);
        let tick = AtomicUsize::new(0);
        let state = gate
            .wait_with(|| {
                let n = tick.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 4 {
                        titled("Почти готово — Wildberries")
                    } else {
                        titled("Смартфоны — купить в интернет-магазине")
                    }
                }
            })
            .await;
        assert_eq!(state, GateState::Resolved);
        assert_eq!(tick.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn reports_blocked_at_exactly_the_tick_budget() {
        let gate = gate(7);
        let tick = AtomicUsize::new(0);
        let state = gate
            .wait_with(|| {
                tick.fetch_add(1, Ordering::SeqCst);
                async { titled("Доступ ограничен") }
            })
            .await;
        assert_eq!(state, GateState::Blocked);
        assert_eq!(tick.load(Ordering::SeqCst), 7);
    }

    #[tokio::test]
    async fn failed_probe_counts_as_still_blocked() {
        let gate = gate(3);
        let state = gate.wait_with(|| async { PageObservation::default() }).await;
        assert_eq!(state, GateState::Blocked);
    }

    #[test]
    fn content_signature_keeps_gate_blocked() {
        let gate = gate(1);
        let blocked = PageObservation {
            title: Some("Wildberries".to_string()),
            content: Some("<html><title>Antibot</title></html>".to_string()),
        };
        assert_eq!(gate.inspect(&blocked), GateState::Blocked);

        let clean = PageObservation {
            title: Some("Wildberries".to_string()),
            content: Some("<html>товары</html>".to_string()),
        };
        assert_eq!(gate.inspect(&clean), GateState::Resolved);
    }
}
