//! Runtime configuration for playback tuning
//!
//! `RuntimeConfig` holds `Option<T>` overrides for the constants in
//! [`crate::infra::constants::player`]. Accessors fall back to the
//! constants when a value is unset.

use std::time::Duration;

use marquee_config::{PlaybackConfig, TrackConfig};
use marquee_model::TrackPreferences;

use crate::infra::constants::player;

/// Playback tuning. Unset fields fall back to the defaults in
/// [`crate::infra::constants::player`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuntimeConfig {
    // ========== AUTO-ADVANCE ==========
    /// Countdown length before the next queue item starts
    pub countdown_seconds: Option<u32>,
    /// Start the next queue item when the countdown ends
    pub auto_advance: Option<bool>,

    // ========== CONTROLS ==========
    /// Idle time before controls hide
    pub controls_hide_delay: Option<Duration>,

    // ========== REPORTING ==========
    /// Expected cadence of progress reports
    pub progress_interval: Option<Duration>,
    /// Fraction in (0, 1]
    pub watched_threshold: Option<f64>,
}

impl From<&PlaybackConfig> for RuntimeConfig {
    fn from(config: &PlaybackConfig) -> Self {
        Self {
            countdown_seconds: config.countdown_seconds,
            auto_advance: config.auto_advance,
            controls_hide_delay: config.controls_hide_delay,
            progress_interval: config.progress_interval,
            watched_threshold: config.watched_threshold,
        }
    }
}

impl RuntimeConfig {
    /// Countdown length, defaulting to five seconds
    pub fn countdown_seconds(&self) -> u32 {
        self.countdown_seconds
            .filter(|secs| *secs > 0)
            .unwrap_or(player::auto_advance::COUNTDOWN_SECONDS)
    }

    /// Auto-advance switch, on unless configured off
    pub fn auto_advance(&self) -> bool {
        self.auto_advance.unwrap_or(player::auto_advance::ENABLED)
    }

    /// Defaults to three seconds
    pub fn controls_hide_delay(&self) -> Duration {
        self.controls_hide_delay
            .unwrap_or(player::controls::HIDE_DELAY)
    }

    /// Defaults to ten seconds
    pub fn progress_interval(&self) -> Duration {
        self.progress_interval
            .unwrap_or(player::reporting::PROGRESS_INTERVAL)
    }

    /// Fraction of runtime that marks an item watched
    pub fn watched_threshold(&self) -> f64 {
        self.watched_threshold
            .filter(|t| *t > 0.0 && *t <= 1.0)
            .unwrap_or(player::reporting::WATCHED_THRESHOLD)
    }
}

/// Default track preferences from the `[tracks]` config section
pub fn track_preferences(config: &TrackConfig) -> TrackPreferences {
    TrackPreferences {
        audio_language: config.audio_language.clone(),
        subtitle_language: config.subtitle_language.clone(),
        max_streaming_bitrate_mbps: config.max_bitrate_mbps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_values_fall_back_to_constants() {
        let config = RuntimeConfig::default();
        assert_eq!(config.countdown_seconds(), 5);
        assert_eq!(config.controls_hide_delay(), Duration::from_secs(3));
        assert_eq!(config.watched_threshold(), 0.95);
        assert!(config.auto_advance());
    }

    #[test]
    fn overrides_win_when_valid() {
        let config = RuntimeConfig::from(&PlaybackConfig {
            countdown_seconds: Some(10),
            controls_hide_delay: Some(Duration::from_millis(1500)),
            progress_interval: None,
            watched_threshold: Some(1.5),
            auto_advance: Some(false),
        });
        assert_eq!(config.countdown_seconds(), 10);
        assert_eq!(config.controls_hide_delay(), Duration::from_millis(1500));
        assert_eq!(config.watched_threshold(), 0.95);
        assert!(!config.auto_advance());
    }
}
