//! Environment keys and compiled defaults.

pub const ENV_SERVER_URL: &str = "MARQUEE_SERVER_URL";
pub const ENV_ACCESS_TOKEN: &str = "MARQUEE_ACCESS_TOKEN";
pub const ENV_USER_ID: &str = "MARQUEE_USER_ID";
pub const ENV_DEVICE_ID: &str = "MARQUEE_DEVICE_ID";
pub const ENV_DEVICE_NAME: &str = "MARQUEE_DEVICE_NAME";
pub const ENV_REQUEST_TIMEOUT: &str = "MARQUEE_REQUEST_TIMEOUT";
pub const ENV_COUNTDOWN_SECONDS: &str = "MARQUEE_COUNTDOWN_SECONDS";
pub const ENV_CONTROLS_HIDE_DELAY: &str = "MARQUEE_CONTROLS_HIDE_DELAY";
pub const ENV_PROGRESS_INTERVAL: &str = "MARQUEE_PROGRESS_INTERVAL";
pub const ENV_WATCHED_THRESHOLD: &str = "MARQUEE_WATCHED_THRESHOLD";
pub const ENV_MAX_BITRATE_MBPS: &str = "MARQUEE_MAX_BITRATE_MBPS";
pub const ENV_AUDIO_LANGUAGE: &str = "MARQUEE_AUDIO_LANGUAGE";
pub const ENV_SUBTITLE_LANGUAGE: &str = "MARQUEE_SUBTITLE_LANGUAGE";
pub const ENV_CHECKPOINT_PATH: &str = "MARQUEE_CHECKPOINT_PATH";
pub const ENV_AUTO_ADVANCE: &str = "MARQUEE_AUTO_ADVANCE";

pub const DEFAULT_CLIENT_NAME: &str = "Marquee";
pub const DEFAULT_DEVICE_NAME: &str = "Marquee Player";
pub const DEFAULT_DEVICE_ID: &str = "marquee-player";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const CHECKPOINT_FILE_NAME: &str = "active_session.json";
