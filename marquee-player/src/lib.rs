//! Marquee player library
//!
//! The playback session coordinator behind the `marquee-player` binary.
//! It resolves a catalog item to a stream URL, keeps the media server
//! informed of playback progress, tracks skippable segments, and drives
//! auto-advance through a play queue.
//!
//! Notes
//! - [`domains::playback::PlaybackCoordinator`] is the entry point. Hosts
//!   feed it player callbacks and observe
//!   [`domains::playback::PlayerViewState`] through a watch channel.
//! - Server, queue and checkpoint access sit behind traits in
//!   [`infra::services`] so the coordinator can run against the recording
//!   stub in [`infra::testing`].

/// Playback domain logic
pub mod domains;
/// Host-facing error type
pub mod error;
/// Server access, services and configuration glue
pub mod infra;

pub use error::PlaybackError;
