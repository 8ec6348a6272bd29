pub mod error;

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use log::{debug, info};
use url::Url;

use crate::constants::*;
use crate::models::sources::{EnvConfig, FileConfig};
use crate::models::{
    PlaybackConfig, PlayerConfig, ServerConfig, StorageConfig, TrackConfig,
};
use crate::util::{parse_bool, parse_duration};
use error::ConfigLoadError;

/// Where the effective configuration came from, for startup logging.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: PlayerConfig,
    pub file_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}

/// Builds a [`PlayerConfig`] from a TOML file and the environment.
///
/// Precedence is environment, then file, then compiled defaults.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    file_path: Option<PathBuf>,
    env_file: Option<PathBuf>,
    env_override: Option<EnvConfig>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Load this `.env` file before reading the environment. Without it the
    /// loader looks for `.env` in the working directory and ignores a
    /// missing one.
    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = Some(path.into());
        self
    }

    /// Use these values instead of the process environment.
    pub fn with_env(mut self, env: EnvConfig) -> Self {
        self.env_override = Some(env);
        self
    }

    pub fn load(self) -> Result<ConfigLoad, ConfigLoadError> {
        let file = match &self.file_path {
            Some(path) => read_file_config(path)?,
            None => FileConfig::default(),
        };

        let (env, env_file_loaded) = match self.env_override {
            Some(env) => (env, false),
            None => {
                let loaded = load_env_file(self.env_file.as_deref())?;
                (EnvConfig::from_env(), loaded)
            }
        };

        let config = compose(file, env)?;
        info!(
            "[Config] Media server {} (device {})",
            config.server.base_url, config.server.device_id
        );

        Ok(ConfigLoad {
            config,
            file_path: self.file_path,
            env_file_loaded,
        })
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let raw =
        std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    toml::from_str(&raw).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn load_env_file(path: Option<&Path>) -> Result<bool, ConfigLoadError> {
    match path {
        Some(path) => dotenvy::from_path(path)
            .map(|_| true)
            .map_err(|source| ConfigLoadError::EnvFile {
                path: path.to_path_buf(),
                source,
            }),
        None => match dotenvy::dotenv() {
            Ok(found) => {
                debug!("[Config] Loaded env file {}", found.display());
                Ok(true)
            }
            Err(_) => Ok(false),
        },
    }
}

/// Merge file and environment values into a validated config.
pub fn compose(
    file: FileConfig,
    env: EnvConfig,
) -> Result<PlayerConfig, ConfigLoadError> {
    let raw_url = env
        .server_url
        .or(file.server.url)
        .ok_or(ConfigLoadError::MissingServerUrl)?;
    let base_url = parse_server_url(&raw_url)?;

    let request_timeout = match env.request_timeout.or(file.server.request_timeout)
    {
        Some(raw) => duration_value(ENV_REQUEST_TIMEOUT, &raw)?,
        None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
    };

    let server = ServerConfig {
        base_url,
        access_token: env.access_token.or(file.server.access_token),
        user_id: env.user_id.or(file.server.user_id),
        device_id: env
            .device_id
            .or(file.server.device_id)
            .unwrap_or_else(|| DEFAULT_DEVICE_ID.to_string()),
        device_name: env
            .device_name
            .or(file.server.device_name)
            .unwrap_or_else(|| DEFAULT_DEVICE_NAME.to_string()),
        client_name: DEFAULT_CLIENT_NAME.to_string(),
        client_version: env!("CARGO_PKG_VERSION").to_string(),
        request_timeout,
    };

    let countdown_seconds = match env.countdown_seconds {
        Some(raw) => Some(number_value::<u32>(ENV_COUNTDOWN_SECONDS, &raw)?),
        None => file.playback.countdown_seconds,
    };
    if countdown_seconds == Some(0) {
        return Err(ConfigLoadError::InvalidValue {
            key: ENV_COUNTDOWN_SECONDS,
            value: "0".to_string(),
        });
    }

    let watched_threshold = match env.watched_threshold {
        Some(raw) => Some(number_value::<f64>(ENV_WATCHED_THRESHOLD, &raw)?),
        None => file.playback.watched_threshold,
    };
    if let Some(threshold) = watched_threshold
        && !(threshold > 0.0 && threshold <= 1.0)
    {
        return Err(ConfigLoadError::InvalidValue {
            key: ENV_WATCHED_THRESHOLD,
            value: threshold.to_string(),
        });
    }

    let auto_advance = match env.auto_advance {
        Some(raw) => Some(parse_bool(&raw).ok_or_else(|| {
            ConfigLoadError::InvalidValue {
                key: ENV_AUTO_ADVANCE,
                value: raw.clone(),
            }
        })?),
        None => file.playback.auto_advance,
    };

    let playback = PlaybackConfig {
        countdown_seconds,
        controls_hide_delay: optional_duration(
            ENV_CONTROLS_HIDE_DELAY,
            env.controls_hide_delay.or(file.playback.controls_hide_delay),
        )?,
        progress_interval: optional_duration(
            ENV_PROGRESS_INTERVAL,
            env.progress_interval.or(file.playback.progress_interval),
        )?,
        watched_threshold,
        auto_advance,
    };

    let max_bitrate_mbps = match env.max_bitrate_mbps {
        Some(raw) => Some(number_value::<u32>(ENV_MAX_BITRATE_MBPS, &raw)?),
        None => file.tracks.max_bitrate_mbps,
    };

    let tracks = TrackConfig {
        audio_language: env.audio_language.or(file.tracks.audio_language),
        subtitle_language: env
            .subtitle_language
            .or(file.tracks.subtitle_language),
        max_bitrate_mbps,
    };

    let storage = StorageConfig {
        checkpoint_path: env
            .checkpoint_path
            .or(file.storage.checkpoint_path)
            .unwrap_or_else(StorageConfig::default_checkpoint_path),
    };

    Ok(PlayerConfig {
        server,
        playback,
        tracks,
        storage,
    })
}

fn parse_server_url(raw: &str) -> Result<Url, ConfigLoadError> {
    // Accept "host:8096" the way users tend to type it
    let with_scheme = if raw.contains("://") {
        raw.trim().to_string()
    } else {
        format!("http://{}", raw.trim())
    };
    let url = Url::parse(with_scheme.trim_end_matches('/')).map_err(
        |source| ConfigLoadError::InvalidServerUrl {
            value: raw.to_string(),
            source,
        },
    )?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigLoadError::UnsupportedScheme(other.to_string())),
    }
}

fn number_value<T: FromStr>(
    key: &'static str,
    raw: &str,
) -> Result<T, ConfigLoadError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ConfigLoadError::InvalidValue {
            key,
            value: raw.to_string(),
        })
}

fn duration_value(
    key: &'static str,
    raw: &str,
) -> Result<Duration, ConfigLoadError> {
    parse_duration(raw).map_err(|source| ConfigLoadError::InvalidDuration {
        key,
        value: raw.to_string(),
        source,
    })
}

fn optional_duration(
    key: &'static str,
    raw: Option<String>,
) -> Result<Option<Duration>, ConfigLoadError> {
    raw.map(|value| duration_value(key, &value)).transpose()
}
