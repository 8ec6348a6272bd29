//! Constants module for centralized configuration values

/// Playback defaults
pub mod player;
