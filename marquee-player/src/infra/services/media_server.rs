// Media server service trait and HTTP adapter

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

use marquee_model::{
    ItemId, ItemMetadata, MediaSegment, MediaSourceId, PlayMethod,
    PlaySessionId, PlaybackSession, SUBTITLES_DISABLED, Ticks,
};

use crate::infra::api_client::ApiClient;
use crate::infra::api_types::{
    BaseItemDto, MediaSegmentDto, PlaybackInfoRequest, PlaybackInfoResponse,
    PlaybackReportDto, QueryResult,
};

/// What the player asks the server for when opening a stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRequest {
    /// Item to play
    pub item_id: ItemId,
    /// Preferred media source, server picks when `None`
    pub media_source_id: Option<MediaSourceId>,
    /// Audio track to burn into the stream
    pub audio_stream_index: Option<i32>,
    /// Subtitle track, `None` for off
    pub subtitle_stream_index: Option<i32>,
    /// Bitrate cap in Mbps
    pub max_streaming_bitrate_mbps: Option<u32>,
}

/// A stream URL the server handed out together with its session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStream {
    /// Absolute stream URL
    pub url: String,
    /// Session token to echo in every report
    pub play_session_id: Option<PlaySessionId>,
    /// Source the server chose
    pub media_source_id: Option<MediaSourceId>,
}

/// One start, progress or stopped report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackReport {
    /// Item being played
    pub item_id: ItemId,
    /// Source of the session
    pub media_source_id: Option<MediaSourceId>,
    /// Session token from negotiation
    pub play_session_id: Option<PlaySessionId>,
    /// Playhead position
    pub position_ticks: Ticks,
    /// Whether the player is paused
    pub is_paused: bool,
    /// Delivery method of the session
    pub play_method: PlayMethod,
    /// Audio track in use
    pub audio_stream_index: Option<i32>,
    /// Subtitle track in use
    pub subtitle_stream_index: Option<i32>,
    /// Bitrate cap of the session
    pub max_streaming_bitrate_mbps: Option<u32>,
}

impl PlaybackReport {
    /// Every report of a session echoes its identifiers and selections
    pub fn for_session(
        session: &PlaybackSession,
        position_ticks: Ticks,
        is_paused: bool,
    ) -> Self {
        Self {
            item_id: session.item_id,
            media_source_id: session.media_source_id.clone(),
            play_session_id: session.play_session_id.clone(),
            position_ticks,
            is_paused,
            play_method: session.play_method,
            audio_stream_index: session.selected_audio_index,
            subtitle_stream_index: session.selected_subtitle_index,
            max_streaming_bitrate_mbps: session.max_streaming_bitrate_mbps,
        }
    }

    fn to_dto(&self) -> PlaybackReportDto {
        PlaybackReportDto {
            item_id: self.item_id.as_str(),
            media_source_id: self
                .media_source_id
                .as_ref()
                .map(|id| id.as_str().to_string()),
            play_session_id: self
                .play_session_id
                .as_ref()
                .map(|id| id.as_str().to_string()),
            position_ticks: self.position_ticks.value(),
            is_paused: self.is_paused,
            can_seek: true,
            play_method: Some(self.play_method.as_str().to_string()),
            audio_stream_index: self.audio_stream_index,
            subtitle_stream_index: self.subtitle_stream_index,
            max_streaming_bitrate: self
                .max_streaming_bitrate_mbps
                .map(|mbps| u64::from(mbps) * 1_000_000),
        }
    }
}

/// Everything the coordinator needs from the media server
#[async_trait]
pub trait MediaServerService: Send + Sync + std::fmt::Debug {
    /// Item metadata including media sources and resume position
    async fn get_item(&self, item_id: ItemId) -> Result<ItemMetadata>;

    /// Negotiate a playback session and return its stream URL
    async fn get_stream_url_with_session(
        &self,
        request: &StreamRequest,
    ) -> Result<SessionStream>;

    /// Static stream URL used when negotiation fails. Never fails itself.
    fn get_stream_url(
        &self,
        item_id: ItemId,
        audio_stream_index: Option<i32>,
        subtitle_stream_index: Option<i32>,
    ) -> String;

    /// Session started
    async fn report_playback_start(
        &self,
        report: &PlaybackReport,
    ) -> Result<()>;

    /// Periodic position update
    async fn report_playback_progress(
        &self,
        report: &PlaybackReport,
    ) -> Result<()>;

    /// Session ended at the report's position
    async fn report_playback_stopped(
        &self,
        report: &PlaybackReport,
    ) -> Result<()>;

    /// Intro, outro and similar ranges of an item
    async fn get_media_segments(
        &self,
        item_id: ItemId,
    ) -> Result<Vec<MediaSegment>>;

    /// Set or clear the watched flag
    async fn set_played(&self, item_id: ItemId, played: bool) -> Result<()>;
}

/// [`MediaServerService`] over the Jellyfin REST API
#[derive(Clone, Debug)]
pub struct HttpMediaServer {
    client: Arc<ApiClient>,
    user_id: Option<String>,
}

impl HttpMediaServer {
    /// Adapter over `client`. Item lookups are scoped to `user_id` when set.
    pub fn new(client: Arc<ApiClient>, user_id: Option<String>) -> Self {
        Self { client, user_id }
    }

    fn item_path(&self, item_id: ItemId) -> String {
        match self.user_id.as_deref() {
            Some(user) => format!(
                "Users/{}/Items/{}",
                urlencoding::encode(user),
                item_id.as_str()
            ),
            None => format!("Items/{}", item_id.as_str()),
        }
    }
}

/// `Videos/{id}/stream?static=true&...` relative to the server base
pub fn static_stream_path(
    item_id: ItemId,
    media_source_id: Option<&MediaSourceId>,
    audio_stream_index: Option<i32>,
    subtitle_stream_index: Option<i32>,
    api_key: Option<&str>,
) -> String {
    let mut params = vec!["static=true".to_string()];
    if let Some(source) = media_source_id {
        params.push(format!(
            "mediaSourceId={}",
            urlencoding::encode(source.as_str())
        ));
    }
    if let Some(audio) = audio_stream_index {
        params.push(format!("audioStreamIndex={}", audio));
    }
    if let Some(subtitle) =
        subtitle_stream_index.filter(|index| *index != SUBTITLES_DISABLED)
    {
        params.push(format!("subtitleStreamIndex={}", subtitle));
    }
    if let Some(key) = api_key {
        params.push(format!("api_key={}", urlencoding::encode(key)));
    }
    format!("Videos/{}/stream?{}", item_id.as_str(), params.join("&"))
}

#[async_trait]
impl MediaServerService for HttpMediaServer {
    async fn get_item(&self, item_id: ItemId) -> Result<ItemMetadata> {
        let dto: BaseItemDto = self.client.get(&self.item_path(item_id)).await?;
        dto.into_metadata()
    }

    async fn get_stream_url_with_session(
        &self,
        request: &StreamRequest,
    ) -> Result<SessionStream> {
        let body = PlaybackInfoRequest {
            user_id: self.user_id.clone(),
            media_source_id: request
                .media_source_id
                .as_ref()
                .map(|id| id.as_str().to_string()),
            audio_stream_index: request.audio_stream_index,
            subtitle_stream_index: request.subtitle_stream_index,
            max_streaming_bitrate: request
                .max_streaming_bitrate_mbps
                .map(|mbps| u64::from(mbps) * 1_000_000),
            enable_direct_play: true,
            enable_direct_stream: true,
            enable_transcoding: true,
            auto_open_live_stream: false,
        };
        let path = format!("Items/{}/PlaybackInfo", request.item_id.as_str());
        let response: PlaybackInfoResponse =
            self.client.post(&path, &body).await?;

        if let Some(code) = response.error_code {
            return Err(anyhow!("Server refused playback: {}", code));
        }

        let wanted = request.media_source_id.as_ref().map(|id| id.as_str());
        let source = response
            .media_sources
            .iter()
            .find(|source| Some(source.id.as_str()) == wanted)
            .or_else(|| response.media_sources.first())
            .ok_or_else(|| anyhow!("PlaybackInfo returned no media sources"))?;
        let media_source_id = MediaSourceId::new(source.id.clone());

        let url = match &source.transcoding_url {
            Some(transcoding) => self.client.build_url(transcoding),
            None => {
                let mut path = static_stream_path(
                    request.item_id,
                    Some(&media_source_id),
                    request.audio_stream_index,
                    request.subtitle_stream_index,
                    self.client.access_token(),
                );
                if let Some(session) = &response.play_session_id {
                    path.push_str(&format!(
                        "&playSessionId={}",
                        urlencoding::encode(session)
                    ));
                }
                if let Some(bps) = body.max_streaming_bitrate {
                    path.push_str(&format!("&maxStreamingBitrate={}", bps));
                }
                self.client.build_url(path)
            }
        };

        debug!(
            "[MediaServer] Negotiated session {:?} for {}",
            response.play_session_id, request.item_id
        );

        Ok(SessionStream {
            url,
            play_session_id: response.play_session_id.map(PlaySessionId::new),
            media_source_id: Some(media_source_id),
        })
    }

    fn get_stream_url(
        &self,
        item_id: ItemId,
        audio_stream_index: Option<i32>,
        subtitle_stream_index: Option<i32>,
    ) -> String {
        self.client.build_url(static_stream_path(
            item_id,
            None,
            audio_stream_index,
            subtitle_stream_index,
            self.client.access_token(),
        ))
    }

    async fn report_playback_start(
        &self,
        report: &PlaybackReport,
    ) -> Result<()> {
        self.client
            .post_no_content("Sessions/Playing", &report.to_dto())
            .await
    }

    async fn report_playback_progress(
        &self,
        report: &PlaybackReport,
    ) -> Result<()> {
        self.client
            .post_no_content("Sessions/Playing/Progress", &report.to_dto())
            .await
    }

    async fn report_playback_stopped(
        &self,
        report: &PlaybackReport,
    ) -> Result<()> {
        self.client
            .post_no_content("Sessions/Playing/Stopped", &report.to_dto())
            .await
    }

    async fn get_media_segments(
        &self,
        item_id: ItemId,
    ) -> Result<Vec<MediaSegment>> {
        let path = format!("MediaSegments/{}", item_id.as_str());
        let result: QueryResult<MediaSegmentDto> = self.client.get(&path).await?;
        Ok(result
            .items
            .into_iter()
            .filter_map(MediaSegmentDto::into_segment)
            .collect())
    }

    async fn set_played(&self, item_id: ItemId, played: bool) -> Result<()> {
        let user = self
            .user_id
            .as_deref()
            .ok_or_else(|| anyhow!("Marking items played needs a user id"))?;
        let path = format!(
            "Users/{}/PlayedItems/{}",
            urlencoding::encode(user),
            item_id.as_str()
        );
        if played {
            self.client.post_empty(&path).await
        } else {
            self.client.delete_no_content(&path).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_path_carries_selected_tracks() {
        let item = ItemId::new();
        let path = static_stream_path(item, None, Some(2), Some(4), Some("k"));
        assert_eq!(
            path,
            format!(
                "Videos/{}/stream?static=true&audioStreamIndex=2&subtitleStreamIndex=4&api_key=k",
                item.as_str()
            )
        );
    }

    #[test]
    fn static_path_omits_disabled_subtitles() {
        let item = ItemId::new();
        let path = static_stream_path(
            item,
            Some(&MediaSourceId::new("src 1")),
            None,
            Some(SUBTITLES_DISABLED),
            None,
        );
        assert!(path.ends_with("?static=true&mediaSourceId=src%201"));
    }

    #[test]
    fn report_echoes_session_fields() {
        let session = PlaybackSession {
            item_id: ItemId::new(),
            media_source_id: Some(MediaSourceId::new("src")),
            play_session_id: Some(PlaySessionId::new("ps-1")),
            play_method: PlayMethod::Transcode,
            selected_audio_index: Some(1),
            selected_subtitle_index: None,
            max_streaming_bitrate_mbps: Some(8),
            start_position_ms: 0,
        };
        let report =
            PlaybackReport::for_session(&session, Ticks::from_millis(2), true);
        let dto = report.to_dto();
        assert_eq!(dto.play_session_id.as_deref(), Some("ps-1"));
        assert_eq!(dto.position_ticks, 20_000);
        assert_eq!(dto.max_streaming_bitrate, Some(8_000_000));
        assert_eq!(dto.play_method.as_deref(), Some("Transcode"));
        assert!(dto.is_paused);
    }
}
