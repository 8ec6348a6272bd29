//! Shared fixtures for coordinator integration tests
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use marquee_model::{
    ItemId, ItemMetadata, MediaSegment, MediaSourceId, MediaSourceInfo,
    MediaStream, QueueItem, SegmentId, SegmentType, Ticks, TrackPreferences,
};
use marquee_player::domains::playback::{PlaybackCoordinator, PlaybackServices};
use marquee_player::infra::runtime_config::RuntimeConfig;
use marquee_player::infra::services::{InMemoryQueue, MemoryCheckpointStore};
use marquee_player::infra::testing::stubs::{ServerCall, TestMediaServer};

pub const RUNTIME_MS: u64 = 6_000_000;

/// Audio `[1 eng default, 2 fre]`, subtitles `[3 eng, 4 spa]`
pub fn default_streams() -> Vec<MediaStream> {
    vec![
        MediaStream::audio(1, Some("en"), true),
        MediaStream::audio(2, Some("fr"), false),
        MediaStream::subtitle(3, Some("en"), false),
        MediaStream::subtitle(4, Some("es"), false),
    ]
}

pub fn episode(name: &str, episode_number: u16) -> ItemMetadata {
    episode_with_streams(name, episode_number, default_streams())
}

pub fn episode_with_streams(
    name: &str,
    episode_number: u16,
    streams: Vec<MediaStream>,
) -> ItemMetadata {
    let id = ItemId::new();
    ItemMetadata {
        id,
        name: name.to_string(),
        series_name: Some("The Show".to_string()),
        season_number: Some(1),
        episode_number: Some(episode_number),
        run_time_ticks: Some(Ticks::from_millis(RUNTIME_MS)),
        resume_position_ticks: None,
        media_sources: vec![MediaSourceInfo {
            id: MediaSourceId::from(id),
            name: None,
            container: Some("mkv".to_string()),
            streams,
        }],
    }
}

pub fn queue_entry(item: &ItemMetadata) -> QueueItem {
    let mut entry = QueueItem::new(item.id, item.name.clone());
    entry.series_name = item.series_name.clone();
    entry.season_number = item.season_number;
    entry.episode_number = item.episode_number;
    entry
}

pub fn segment(kind: SegmentType, start_ms: u64, end_ms: u64) -> MediaSegment {
    MediaSegment::new(SegmentId::new(), kind, start_ms, end_ms).unwrap()
}

pub struct Harness {
    pub coordinator: PlaybackCoordinator,
    pub server: TestMediaServer,
    pub queue: Arc<InMemoryQueue>,
    pub checkpoints: Arc<MemoryCheckpointStore>,
}

impl Harness {
    pub fn new(server: TestMediaServer) -> Self {
        Self::build(
            server,
            Vec::new(),
            RuntimeConfig::default(),
            TrackPreferences::default(),
        )
    }

    pub fn with_queue(server: TestMediaServer, queue: Vec<QueueItem>) -> Self {
        Self::build(
            server,
            queue,
            RuntimeConfig::default(),
            TrackPreferences::default(),
        )
    }

    pub fn build(
        server: TestMediaServer,
        queue: Vec<QueueItem>,
        config: RuntimeConfig,
        preferences: TrackPreferences,
    ) -> Self {
        let queue = Arc::new(InMemoryQueue::new(queue));
        let checkpoints = Arc::new(MemoryCheckpointStore::new());
        let coordinator = PlaybackCoordinator::new(
            PlaybackServices {
                media_server: Arc::new(server.clone()),
                queue: queue.clone(),
                checkpoints: checkpoints.clone(),
            },
            config,
            preferences,
        );
        Self {
            coordinator,
            server,
            queue,
            checkpoints,
        }
    }

    /// Load and start playback at `position_ms`
    pub async fn play(&self, item_id: ItemId, position_ms: u64) {
        self.coordinator
            .load_item(item_id, Some(position_ms))
            .await
            .unwrap();
        self.coordinator.set_player_ready();
        self.coordinator.on_playback_started(position_ms).await;
    }

    pub fn starts(&self) -> usize {
        self.server.count(|c| matches!(c, ServerCall::Start(_)))
    }

    pub fn stops(&self) -> usize {
        self.server.count(|c| matches!(c, ServerCall::Stopped(_)))
    }

    pub fn negotiations(&self, item_id: ItemId) -> usize {
        self.server
            .count(|c| matches!(c, ServerCall::Negotiate(r) if r.item_id == item_id))
    }
}

/// Let spawned tasks (segment loads, detached reports) run
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

pub async fn advance_secs(secs: f64) {
    tokio::time::sleep(Duration::from_secs_f64(secs)).await;
}
