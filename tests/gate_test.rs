//! Challenge-gate behavior against scripted page observations.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use market_scout::gate::{ChallengeGate, GateState, PageObservation};
use market_scout::site::SiteProfile;
use market_scout::types::{Outcome, SearchPayload};

fn gate_with_budget(max_ticks: u32) -> ChallengeGate {
    let site = SiteProfile::wildberries();
    ChallengeGate::new(
        &site.block_title_signatures,
        &site.block_content_signatures,
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
async fn gate_resolves_when_the_interstitial_clears_mid_budget() {
    let gate = gate_with_budget(30);
    let ticks = AtomicUsize::new(0);

    let state = gate
        .wait_with(|| {
            let n = ticks.fetch_add(1, Ordering::SeqCst);
            async move {
                // The challenge clears client-side on the 12th observation.
                if n < 11 {
                    titled("Почти готово — проверяем браузер")
                } else {
                    titled("Смартфон iPhone 15 128 ГБ — купить")
                }
            }
        })
        .await;

    assert_eq!(state, GateState::Resolved);
    assert_eq!(ticks.load(Ordering::SeqCst), 12);
}

#[tokio::test]
async fn gate_fails_at_exactly_the_configured_budget() {
    let gate = gate_with_budget(30);
    let ticks = AtomicUsize::new(0);

    let state = gate
        .wait_with(|| {
            ticks.fetch_add(1, Ordering::SeqCst);
            async { titled("Доступ ограничен") }
        })
        .await;

    assert_eq!(state, GateState::Blocked);
    assert_eq!(ticks.load(Ordering::SeqCst), 30);
}

#[tokio::test]
async fn exhausted_gate_surfaces_as_the_blocked_wire_contract() {
    // A page whose title carries a block signature for the whole budget ends
    // the operation with the structured blocked result and zero records.
    let gate = gate_with_budget(5);
    let state = gate
        .wait_with(|| async { titled("Доступ ограничен") })
        .await;
    assert_eq!(state, GateState::Blocked);

    let outcome: Outcome<SearchPayload> = Outcome::AntibotBlocked;
    let json = outcome.into_json().unwrap();
    assert_eq!(json, serde_json::json!({"error": "antibot_blocked"}));
    assert!(json.get("products").is_none());
}

#[tokio::test]
async fn title_probe_failures_never_count_as_resolution() {
    let gate = gate_with_budget(4);
    let ticks = AtomicUsize::new(0);

    let state = gate
        .wait_with(|| {
            let n = ticks.fetch_add(1, Ordering::SeqCst);
            async move {
                if n % 2 == 0 {
                    PageObservation::default() // CDP hiccup: no title readable
                } else {
                    titled("Почти готово")
                }
            }
        })
        .await;

    assert_eq!(state, GateState::Blocked);
    assert_eq!(ticks.load(Ordering::SeqCst), 4);
}
