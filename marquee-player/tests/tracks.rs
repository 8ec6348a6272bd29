mod common;

use common::*;
use marquee_model::Ticks;
use marquee_player::PlaybackError;
use marquee_player::domains::playback::SessionPhaseKind;
use marquee_player::infra::testing::stubs::{ServerCall, TestMediaServer};

#[tokio::test]
async fn audio_switch_stops_and_renegotiates_at_current_position() {
    let item = episode("Pilot", 1);
    let harness = Harness::new(TestMediaServer::new().with_item(item.clone()));
    harness.play(item.id, 0).await;
    harness.coordinator.report_progress(754_000, false).await;

    harness.coordinator.set_audio_stream_index(2).await.unwrap();

    let calls = harness.server.calls();
    let stop = calls
        .iter()
        .position(|c| matches!(c, ServerCall::Stopped(_)))
        .unwrap();
    let (renegotiate, request) = calls
        .iter()
        .enumerate()
        .filter_map(|(i, c)| match c {
            ServerCall::Negotiate(request) => Some((i, request)),
            _ => None,
        })
        .last()
        .unwrap();
    assert!(stop < renegotiate);
    assert_eq!(request.audio_stream_index, Some(2));
    assert_eq!(
        calls[stop].report().unwrap().position_ticks,
        Ticks::from_millis(754_000)
    );

    let session = harness.coordinator.current_session().unwrap();
    assert_eq!(session.start_position_ms, 754_000);
    assert_eq!(session.selected_audio_index, Some(2));
    assert_eq!(session.play_session_id.as_ref().unwrap().as_str(), "ps-2");
    assert_eq!(harness.coordinator.session_phase(), SessionPhaseKind::NotStarted);
    assert_eq!(harness.coordinator.view().selected_audio_index, Some(2));

    harness.coordinator.on_playback_started(754_000).await;
    assert_eq!(harness.starts(), 2);
}

#[tokio::test]
async fn selecting_the_current_track_is_a_no_op() {
    let item = episode("Pilot", 1);
    let harness = Harness::new(TestMediaServer::new().with_item(item.clone()));
    harness.play(item.id, 0).await;

    harness.coordinator.set_audio_stream_index(1).await.unwrap();
    harness.coordinator.set_subtitle_stream_index(None).await.unwrap();

    assert_eq!(harness.negotiations(item.id), 1);
    assert_eq!(harness.stops(), 0);
}

#[tokio::test]
async fn subtitles_can_be_turned_on_and_off() {
    let item = episode("Pilot", 1);
    let harness = Harness::new(TestMediaServer::new().with_item(item.clone()));
    harness.play(item.id, 0).await;

    harness.coordinator.set_subtitle_stream_index(Some(4)).await.unwrap();
    assert_eq!(harness.coordinator.view().selected_subtitle_index, Some(4));

    harness.coordinator.on_playback_started(0).await;
    harness.coordinator.set_subtitle_stream_index(None).await.unwrap();
    let view = harness.coordinator.view();
    assert_eq!(view.selected_subtitle_index, None);
    assert_eq!(view.selected_audio_index, Some(1));
    assert_eq!(harness.negotiations(item.id), 3);
}

#[tokio::test]
async fn overrides_persist_across_switches_on_the_same_item() {
    let item = episode("Pilot", 1);
    let harness = Harness::new(TestMediaServer::new().with_item(item.clone()));
    harness.play(item.id, 0).await;

    harness.coordinator.set_audio_stream_index(2).await.unwrap();
    harness.coordinator.set_subtitle_stream_index(Some(3)).await.unwrap();

    let view = harness.coordinator.view();
    assert_eq!(view.selected_audio_index, Some(2));
    assert_eq!(view.selected_subtitle_index, Some(3));
}

#[tokio::test]
async fn switching_without_an_item_fails() {
    let harness = Harness::new(TestMediaServer::new());

    assert!(matches!(
        harness.coordinator.set_audio_stream_index(2).await,
        Err(PlaybackError::NoActiveItem)
    ));
    assert!(matches!(
        harness.coordinator.set_subtitle_stream_index(Some(3)).await,
        Err(PlaybackError::NoActiveItem)
    ));
}

#[tokio::test]
async fn switch_before_start_sends_no_stop() {
    let item = episode("Pilot", 1);
    let harness = Harness::new(TestMediaServer::new().with_item(item.clone()));
    harness.coordinator.load_item(item.id, Some(30_000)).await.unwrap();

    harness.coordinator.set_audio_stream_index(2).await.unwrap();

    assert_eq!(harness.stops(), 0);
    assert_eq!(harness.negotiations(item.id), 2);
    let session = harness.coordinator.current_session().unwrap();
    assert_eq!(session.start_position_ms, 30_000);
}
