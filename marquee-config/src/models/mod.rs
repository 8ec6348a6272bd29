pub mod sources;

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// Fully resolved player configuration.
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    pub server: ServerConfig,
    pub playback: PlaybackConfig,
    pub tracks: TrackConfig,
    pub storage: StorageConfig,
}

/// Connection details for the media server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub base_url: Url,
    pub access_token: Option<String>,
    pub user_id: Option<String>,
    pub device_id: String,
    pub device_name: String,
    pub client_name: String,
    pub client_version: String,
    pub request_timeout: Duration,
}

/// Playback tuning. `None` keeps the player's compiled default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackConfig {
    pub countdown_seconds: Option<u32>,
    pub controls_hide_delay: Option<Duration>,
    pub progress_interval: Option<Duration>,
    pub watched_threshold: Option<f64>,
    pub auto_advance: Option<bool>,
}

/// Default track and quality preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackConfig {
    pub audio_language: Option<String>,
    pub subtitle_language: Option<String>,
    pub max_bitrate_mbps: Option<u32>,
}

/// Local persistence locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub checkpoint_path: PathBuf,
}

impl StorageConfig {
    /// `<data dir>/marquee/active_session.json`, or the working directory
    /// when the platform has no data dir.
    pub fn default_checkpoint_path() -> PathBuf {
        dirs::data_local_dir()
            .map(|dir| dir.join("marquee"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::constants::CHECKPOINT_FILE_NAME)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            checkpoint_path: Self::default_checkpoint_path(),
        }
    }
}
