mod common;

use std::time::Duration;

use common::*;
use marquee_model::TrackPreferences;
use marquee_player::infra::runtime_config::RuntimeConfig;
use marquee_player::infra::testing::stubs::TestMediaServer;

async fn playing() -> Harness {
    let item = episode("Pilot", 1);
    let harness = Harness::new(TestMediaServer::new().with_item(item.clone()));
    harness.play(item.id, 0).await;
    harness
}

fn visible(harness: &Harness) -> bool {
    harness.coordinator.view().controls_visible
}

#[tokio::test(start_paused = true)]
async fn controls_hide_after_delay() {
    let harness = playing().await;
    assert!(visible(&harness));

    advance_secs(2.9).await;
    settle().await;
    assert!(visible(&harness));

    advance_secs(0.2).await;
    settle().await;
    assert!(!visible(&harness));
}

#[tokio::test(start_paused = true)]
async fn activity_pushes_the_hide_back() {
    let harness = playing().await;

    advance_secs(2.0).await;
    harness.coordinator.reset_controls_hide_timer();
    advance_secs(2.0).await;
    settle().await;
    assert!(visible(&harness));

    advance_secs(1.1).await;
    settle().await;
    assert!(!visible(&harness));
}

#[tokio::test(start_paused = true)]
async fn activity_while_hidden_does_not_show() {
    let harness = playing().await;
    harness.coordinator.hide_controls();

    harness.coordinator.reset_controls_hide_timer();
    assert!(!visible(&harness));
}

#[tokio::test(start_paused = true)]
async fn paused_controls_stay_visible() {
    let harness = playing().await;
    harness.coordinator.hide_controls();

    harness.coordinator.on_pause_state_changed(true, 1_000).await;
    assert!(visible(&harness));
    advance_secs(30.0).await;
    settle().await;
    assert!(visible(&harness));

    harness.coordinator.reset_controls_hide_timer();
    advance_secs(30.0).await;
    settle().await;
    assert!(visible(&harness));

    harness.coordinator.on_pause_state_changed(false, 1_000).await;
    advance_secs(3.1).await;
    settle().await;
    assert!(!visible(&harness));
}

#[tokio::test(start_paused = true)]
async fn toggle_flips_visibility() {
    let harness = playing().await;

    harness.coordinator.toggle_controls();
    assert!(!visible(&harness));
    harness.coordinator.toggle_controls();
    assert!(visible(&harness));

    advance_secs(3.1).await;
    settle().await;
    assert!(!visible(&harness));
}

#[tokio::test(start_paused = true)]
async fn explicit_hide_cancels_pending_timer() {
    let harness = playing().await;
    harness.coordinator.hide_controls();
    harness.coordinator.show_controls();

    advance_secs(2.0).await;
    harness.coordinator.hide_controls();
    harness.coordinator.show_controls();
    advance_secs(2.0).await;
    settle().await;
    assert!(visible(&harness));
}

#[tokio::test(start_paused = true)]
async fn hide_delay_is_configurable() {
    let item = episode("Pilot", 1);
    let config = RuntimeConfig {
        controls_hide_delay: Some(Duration::from_secs(10)),
        ..RuntimeConfig::default()
    };
    let harness = Harness::build(
        TestMediaServer::new().with_item(item.clone()),
        Vec::new(),
        config,
        TrackPreferences::default(),
    );
    harness.play(item.id, 0).await;

    advance_secs(5.0).await;
    settle().await;
    assert!(visible(&harness));
    advance_secs(5.1).await;
    settle().await;
    assert!(!visible(&harness));
}

#[tokio::test(start_paused = true)]
async fn controls_start_hidden_until_the_player_is_ready() {
    let item = episode("Pilot", 1);
    let harness = Harness::new(TestMediaServer::new().with_item(item.clone()));

    harness.coordinator.load_item(item.id, None).await.unwrap();
    assert!(!visible(&harness));
    harness.coordinator.set_player_ready();
    assert!(visible(&harness));
}
