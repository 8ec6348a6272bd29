use crate::ids::ItemId;

/// Subtitle index the server understands as "no subtitles"
pub const SUBTITLES_DISABLED: i32 = -1;

/// Per-item stream index overrides.
///
/// These win over language preferences and server defaults during
/// negotiation. A subtitle override of [`SUBTITLES_DISABLED`] turns
/// subtitles off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackOverrides {
    pub audio_stream_index: Option<i32>,
    pub subtitle_stream_index: Option<i32>,
}

impl TrackOverrides {
    pub fn is_empty(&self) -> bool {
        self.audio_stream_index.is_none() && self.subtitle_stream_index.is_none()
    }

    /// Fields set in `other` replace ours
    pub fn merged_with(&self, other: &TrackOverrides) -> TrackOverrides {
        TrackOverrides {
            audio_stream_index: other
                .audio_stream_index
                .or(self.audio_stream_index),
            subtitle_stream_index: other
                .subtitle_stream_index
                .or(self.subtitle_stream_index),
        }
    }
}

/// An entry of the externally managed play queue
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueueItem {
    pub item_id: ItemId,
    pub title: String,
    pub series_name: Option<String>,
    pub season_number: Option<u16>,
    pub episode_number: Option<u16>,
    pub thumbnail_url: Option<String>,
    pub overrides: TrackOverrides,
}

impl QueueItem {
    pub fn new(item_id: ItemId, title: impl Into<String>) -> Self {
        Self {
            item_id,
            title: title.into(),
            series_name: None,
            season_number: None,
            episode_number: None,
            thumbnail_url: None,
            overrides: TrackOverrides::default(),
        }
    }

    pub fn with_overrides(mut self, overrides: TrackOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// "S01E02 - Title" when episode numbering is known
    pub fn display_title(&self) -> String {
        match (self.season_number, self.episode_number) {
            (Some(season), Some(episode)) => {
                format!("S{:02}E{:02} - {}", season, episode, self.title)
            }
            _ => self.title.clone(),
        }
    }
}
