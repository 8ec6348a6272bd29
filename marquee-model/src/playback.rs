use crate::ids::{ItemId, MediaSourceId, PlaySessionId};
use crate::ticks::Ticks;

/// How the stream was requested from the server.
///
/// This records the shape of the request, not what the server ended up
/// doing: a bitrate cap means `Transcode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlayMethod {
    #[default]
    DirectPlay,
    Transcode,
}

impl PlayMethod {
    pub fn for_bitrate_cap(max_streaming_bitrate_mbps: Option<u32>) -> Self {
        if max_streaming_bitrate_mbps.is_some() {
            PlayMethod::Transcode
        } else {
            PlayMethod::DirectPlay
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayMethod::DirectPlay => "DirectPlay",
            PlayMethod::Transcode => "Transcode",
        }
    }
}

impl std::fmt::Display for PlayMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The negotiated session for the item currently loaded.
///
/// Never mutated after creation. Advancing or switching tracks produces a
/// new session.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaybackSession {
    pub item_id: ItemId,
    pub media_source_id: Option<MediaSourceId>,
    pub play_session_id: Option<PlaySessionId>,
    pub play_method: PlayMethod,
    pub selected_audio_index: Option<i32>,
    pub selected_subtitle_index: Option<i32>,
    pub max_streaming_bitrate_mbps: Option<u32>,
    pub start_position_ms: u64,
}

impl PlaybackSession {
    /// Cap converted to bits per second, the unit the server expects
    pub fn max_streaming_bitrate_bps(&self) -> Option<u64> {
        self.max_streaming_bitrate_mbps
            .map(|mbps| u64::from(mbps) * 1_000_000)
    }
}

/// User-level track and quality preferences
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackPreferences {
    pub audio_language: Option<String>,
    pub subtitle_language: Option<String>,
    pub max_streaming_bitrate_mbps: Option<u32>,
}

/// Local record of the last reported position, used to offer resume
/// after a crash
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaybackCheckpoint {
    pub item_id: ItemId,
    pub position_ticks: Ticks,
    pub media_source_id: Option<MediaSourceId>,
}

impl PlaybackCheckpoint {
    pub fn position_ms(&self) -> u64 {
        self.position_ticks.as_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitrate_cap_selects_transcode() {
        assert_eq!(PlayMethod::for_bitrate_cap(Some(8)), PlayMethod::Transcode);
        assert_eq!(PlayMethod::for_bitrate_cap(None), PlayMethod::DirectPlay);
    }
}
