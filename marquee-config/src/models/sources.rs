use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::*;
use crate::util::non_empty;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub playback: FilePlaybackConfig,
    #[serde(default)]
    pub tracks: FileTrackConfig,
    #[serde(default)]
    pub storage: FileStorageConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    /// Humantime string, e.g. `"30s"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FilePlaybackConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controls_hide_delay: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_interval: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watched_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_advance: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileTrackConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bitrate_mbps: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileStorageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkpoint_path: Option<PathBuf>,
}

/// Environment-derived configuration values.
///
/// Values stay raw strings here; the loader validates them so errors can
/// name the offending key.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub server_url: Option<String>,
    pub access_token: Option<String>,
    pub user_id: Option<String>,
    pub device_id: Option<String>,
    pub device_name: Option<String>,
    pub request_timeout: Option<String>,
    pub countdown_seconds: Option<String>,
    pub controls_hide_delay: Option<String>,
    pub progress_interval: Option<String>,
    pub watched_threshold: Option<String>,
    pub auto_advance: Option<String>,
    pub max_bitrate_mbps: Option<String>,
    pub audio_language: Option<String>,
    pub subtitle_language: Option<String>,
    pub checkpoint_path: Option<PathBuf>,
}

impl EnvConfig {
    /// Read from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary lookup; tests pass a map here.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_empty(lookup(key));
        Self {
            server_url: get(ENV_SERVER_URL),
            access_token: get(ENV_ACCESS_TOKEN),
            user_id: get(ENV_USER_ID),
            device_id: get(ENV_DEVICE_ID),
            device_name: get(ENV_DEVICE_NAME),
            request_timeout: get(ENV_REQUEST_TIMEOUT),
            countdown_seconds: get(ENV_COUNTDOWN_SECONDS),
            controls_hide_delay: get(ENV_CONTROLS_HIDE_DELAY),
            progress_interval: get(ENV_PROGRESS_INTERVAL),
            watched_threshold: get(ENV_WATCHED_THRESHOLD),
            auto_advance: get(ENV_AUTO_ADVANCE),
            max_bitrate_mbps: get(ENV_MAX_BITRATE_MBPS),
            audio_language: get(ENV_AUDIO_LANGUAGE),
            subtitle_language: get(ENV_SUBTITLE_LANGUAGE),
            checkpoint_path: get(ENV_CHECKPOINT_PATH).map(PathBuf::from),
        }
    }
}
