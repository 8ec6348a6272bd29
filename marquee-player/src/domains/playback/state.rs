use marquee_model::{
    ItemMetadata, MediaSegment, MediaStream, PlaybackSession, QueueItem,
};

use super::auto_advance::AutoAdvanceState;
use super::segments::{skip_button_label, skip_target_ms};

/// Everything a UI needs to render the player.
///
/// Published through a `tokio::sync::watch` channel. A load replaces the
/// whole value; other transitions modify it in place under the channel's
/// lock.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerViewState {
    /// Loaded item metadata
    pub item: Option<ItemMetadata>,
    /// True while a load or renegotiation is in flight
    pub is_loading: bool,
    /// Set when loading the item failed; there is no stream then
    pub error: Option<String>,
    /// Current playable URL
    pub stream_url: Option<String>,
    /// Host reported its player can accept commands
    pub is_player_ready: bool,
    /// Last pause state the host reported
    pub is_paused: bool,
    /// On-screen controls are showing
    pub controls_visible: bool,

    /// Audio tracks of the chosen media source
    pub audio_streams: Vec<MediaStream>,
    /// Subtitle tracks of the chosen media source
    pub subtitle_streams: Vec<MediaStream>,
    /// Audio track in use
    pub selected_audio_index: Option<i32>,
    /// `None` means subtitles off
    pub selected_subtitle_index: Option<i32>,

    /// End-of-item countdown
    pub auto_advance: AutoAdvanceState,
    /// Set once the queue has a next item, cleared by cancel
    pub is_queue_mode: bool,

    /// Skippable segments of the loaded item
    pub segments: Vec<MediaSegment>,
    /// Segment under the playhead
    pub active_segment: Option<MediaSegment>,

    /// Mirror of the negotiated session
    pub session: Option<PlaybackSession>,
    /// Set once the watched threshold is crossed
    pub is_watched: bool,
}

impl PlayerViewState {
    /// Whether the next-up overlay should be visible
    pub fn show_countdown(&self) -> bool {
        self.auto_advance.is_counting_down()
    }

    /// Countdown value while counting down
    pub fn seconds_remaining(&self) -> Option<u32> {
        self.auto_advance.seconds_remaining()
    }

    /// Entry the countdown will advance to
    pub fn next_queue_item(&self) -> Option<&QueueItem> {
        self.auto_advance.next_item()
    }

    /// Skip target of the active segment
    pub fn skip_target_ms(&self) -> Option<u64> {
        skip_target_ms(self.active_segment.as_ref())
    }

    /// Skip label of the active segment
    pub fn skip_button_label(&self) -> Option<&'static str> {
        skip_button_label(self.active_segment.as_ref())
    }

    /// A session was negotiated without a server-issued id
    pub fn is_degraded(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.play_session_id.is_none())
    }
}
