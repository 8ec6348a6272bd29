//! Core data model definitions shared across Marquee crates.
#![allow(missing_docs)]

pub mod error;
pub mod ids;
pub mod media;
pub mod playback;
pub mod queue;
pub mod segments;
pub mod ticks;

// Intentionally curated re-exports for downstream consumers.
pub use error::{ModelError, Result as ModelResult};
pub use ids::{ItemId, MediaSourceId, PlaySessionId, SegmentId};
pub use media::{ItemMetadata, MediaSourceInfo, MediaStream, StreamKind};
pub use playback::{
    PlayMethod, PlaybackCheckpoint, PlaybackSession, TrackPreferences,
};
pub use queue::{QueueItem, SUBTITLES_DISABLED, TrackOverrides};
pub use segments::{MediaSegment, SegmentType};
pub use ticks::{TICKS_PER_MILLISECOND, Ticks};
