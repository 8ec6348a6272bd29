//! Stream negotiation.
//!
//! Turns an item id plus preferences into something the video backend can
//! open. The session-aware request comes first; when it fails for any
//! reason the static URL is used instead and the session has no
//! `play_session_id`. Only a failed metadata fetch aborts the load.

use log::{debug, info, warn};
use std::sync::Arc;

use marquee_model::{
    ItemId, ItemMetadata, MediaSourceId, MediaStream, PlayMethod,
    PlaySessionId, PlaybackSession, TrackOverrides, TrackPreferences,
};

use crate::error::{PlaybackError, PlaybackResult};
use crate::infra::services::{MediaServerService, StreamRequest};

use super::track_selection::{select_audio_stream, select_subtitle_stream};

/// Result of a successful negotiation
#[derive(Debug, Clone, PartialEq)]
pub struct NegotiatedStream {
    /// The item as fetched from the server
    pub item: ItemMetadata,
    /// URL the host's player should open
    pub stream_url: String,
    /// Server-issued session id. `None` on the static fallback.
    pub play_session_id: Option<PlaySessionId>,
    /// Media source the stream plays from
    pub media_source_id: Option<MediaSourceId>,
    /// How the server will deliver the stream
    pub play_method: PlayMethod,
    /// Audio tracks of the chosen media source
    pub audio_streams: Vec<MediaStream>,
    /// Subtitle tracks of the chosen media source
    pub subtitle_streams: Vec<MediaStream>,
    /// Audio track picked by preference or request
    pub selected_audio_index: Option<i32>,
    /// Subtitle track, or `None` for off
    pub selected_subtitle_index: Option<i32>,
    /// Bitrate cap sent with the request
    pub max_streaming_bitrate_mbps: Option<u32>,
}

impl NegotiatedStream {
    /// True when negotiation failed and the static URL is in use
    pub fn is_degraded(&self) -> bool {
        self.play_session_id.is_none()
    }

    /// Build the reporting session for this stream starting at `start_position_ms`
    pub fn to_session(&self, start_position_ms: u64) -> PlaybackSession {
        PlaybackSession {
            item_id: self.item.id,
            media_source_id: self.media_source_id.clone(),
            play_session_id: self.play_session_id.clone(),
            play_method: self.play_method,
            selected_audio_index: self.selected_audio_index,
            selected_subtitle_index: self.selected_subtitle_index,
            max_streaming_bitrate_mbps: self.max_streaming_bitrate_mbps,
            start_position_ms,
        }
    }
}

/// Resolves an item to a playable stream
#[derive(Debug, Clone)]
pub struct StreamNegotiator {
    server: Arc<dyn MediaServerService>,
}

impl StreamNegotiator {
    /// Negotiator issuing requests against `server`
    pub fn new(server: Arc<dyn MediaServerService>) -> Self {
        Self { server }
    }

    /// Fetch the item and negotiate a stream for it.
    ///
    /// Only the item fetch can fail. A failed negotiation falls back to the
    /// server's static stream URL.
    pub async fn negotiate(
        &self,
        item_id: ItemId,
        preferences: &TrackPreferences,
        overrides: TrackOverrides,
        max_streaming_bitrate_mbps: Option<u32>,
    ) -> PlaybackResult<NegotiatedStream> {
        let item = self
            .server
            .get_item(item_id)
            .await
            .map_err(|source| PlaybackError::ItemFetch { item_id, source })?;

        let source = item.primary_source();
        let audio_streams =
            source.map(|s| s.audio_streams()).unwrap_or_default();
        let subtitle_streams =
            source.map(|s| s.subtitle_streams()).unwrap_or_default();

        let selected_audio_index = select_audio_stream(
            &audio_streams,
            overrides.audio_stream_index,
            preferences.audio_language.as_deref(),
        );
        let selected_subtitle_index = select_subtitle_stream(
            &subtitle_streams,
            overrides.subtitle_stream_index,
            preferences.subtitle_language.as_deref(),
        );
        debug!(
            "[Negotiator] {}: audio {:?}, subtitles {:?}",
            item_id, selected_audio_index, selected_subtitle_index
        );

        let request = StreamRequest {
            item_id,
            media_source_id: source.map(|s| s.id.clone()),
            audio_stream_index: selected_audio_index,
            subtitle_stream_index: selected_subtitle_index,
            max_streaming_bitrate_mbps,
        };

        let (stream_url, play_session_id, media_source_id) =
            match self.server.get_stream_url_with_session(&request).await {
                Ok(stream) => {
                    info!(
                        "[Negotiator] Session {:?} negotiated for {}",
                        stream.play_session_id, item_id
                    );
                    (
                        stream.url,
                        stream.play_session_id,
                        stream.media_source_id.or(request.media_source_id),
                    )
                }
                Err(err) => {
                    warn!(
                        "[Negotiator] Session negotiation failed for {}, using static stream: {:#}",
                        item_id, err
                    );
                    let url = self.server.get_stream_url(
                        item_id,
                        selected_audio_index,
                        selected_subtitle_index,
                    );
                    (url, None, request.media_source_id)
                }
            };

        Ok(NegotiatedStream {
            item,
            stream_url,
            play_session_id,
            media_source_id,
            play_method: PlayMethod::for_bitrate_cap(max_streaming_bitrate_mbps),
            audio_streams,
            subtitle_streams,
            selected_audio_index,
            selected_subtitle_index,
            max_streaming_bitrate_mbps,
        })
    }
}
