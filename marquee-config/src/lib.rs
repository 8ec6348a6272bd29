//! Configuration loading for the Marquee player.
//!
//! A TOML file supplies the baseline, environment variables (optionally
//! from a `.env` file) override it, and anything left unset falls back to
//! compiled defaults. Playback tuning values that stay unset are left as
//! `None` so the player's own constants apply.

pub mod constants;
pub mod loader;
pub mod models;
pub mod util;

pub use loader::{ConfigLoad, ConfigLoader, compose, error::ConfigLoadError};
pub use models::sources::{EnvConfig, FileConfig};
pub use models::{
    PlaybackConfig, PlayerConfig, ServerConfig, StorageConfig, TrackConfig,
};
