//! Wire types for the Jellyfin-compatible REST API.
//!
//! The server speaks PascalCase JSON and counts time in ticks. These types
//! stay at the HTTP boundary; everything past the adapter uses
//! `marquee_model`. Field names mirror the server's schema.
#![allow(missing_docs)]

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

use marquee_model::{
    ItemId, ItemMetadata, MediaSegment, MediaSourceId, MediaSourceInfo,
    MediaStream, SegmentId, SegmentType, StreamKind, Ticks,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BaseItemDto {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub series_name: Option<String>,
    #[serde(default)]
    pub parent_index_number: Option<u16>,
    #[serde(default)]
    pub index_number: Option<u16>,
    #[serde(default)]
    pub run_time_ticks: Option<u64>,
    #[serde(default)]
    pub user_data: Option<UserItemDataDto>,
    #[serde(default)]
    pub media_sources: Vec<MediaSourceDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserItemDataDto {
    #[serde(default)]
    pub playback_position_ticks: Option<u64>,
    #[serde(default)]
    pub played: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MediaSourceDto {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default)]
    pub media_streams: Vec<MediaStreamDto>,
    #[serde(default)]
    pub transcoding_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MediaStreamDto {
    pub index: i32,
    #[serde(rename = "Type")]
    pub stream_type: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub display_title: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub codec: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub channels: Option<i32>,
}

/// Body of `POST /Items/{id}/PlaybackInfo`
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlaybackInfoRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_stream_index: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle_stream_index: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_streaming_bitrate: Option<u64>,
    pub enable_direct_play: bool,
    pub enable_direct_stream: bool,
    pub enable_transcoding: bool,
    pub auto_open_live_stream: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlaybackInfoResponse {
    #[serde(default)]
    pub play_session_id: Option<String>,
    #[serde(default)]
    pub media_sources: Vec<MediaSourceDto>,
    #[serde(default)]
    pub error_code: Option<String>,
}

/// Shared body of the start, progress and stopped reports
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlaybackReportDto {
    pub item_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub play_session_id: Option<String>,
    pub position_ticks: u64,
    pub is_paused: bool,
    pub can_seek: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub play_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_stream_index: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle_stream_index: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_streaming_bitrate: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MediaSegmentDto {
    pub id: String,
    #[serde(rename = "Type")]
    pub segment_type: String,
    pub start_ticks: u64,
    pub end_ticks: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryResult<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl BaseItemDto {
    pub fn into_metadata(self) -> Result<ItemMetadata> {
        let id: ItemId = self
            .id
            .parse()
            .with_context(|| format!("Server returned item id {:?}", self.id))?;
        Ok(ItemMetadata {
            id,
            name: self.name.unwrap_or_default(),
            series_name: self.series_name,
            season_number: self.parent_index_number,
            episode_number: self.index_number,
            run_time_ticks: self.run_time_ticks.map(Ticks::new),
            resume_position_ticks: self
                .user_data
                .and_then(|data| data.playback_position_ticks)
                .filter(|ticks| *ticks > 0)
                .map(Ticks::new),
            media_sources: self
                .media_sources
                .into_iter()
                .map(MediaSourceDto::into_source)
                .collect(),
        })
    }
}

impl MediaSourceDto {
    pub fn into_source(self) -> MediaSourceInfo {
        MediaSourceInfo {
            id: MediaSourceId::new(self.id),
            name: self.name,
            container: self.container,
            streams: self
                .media_streams
                .into_iter()
                .filter_map(MediaStreamDto::into_stream)
                .collect(),
        }
    }
}

impl MediaStreamDto {
    /// `None` for stream types the player does not select between
    pub fn into_stream(self) -> Option<MediaStream> {
        let kind = match self.stream_type.as_str() {
            "Video" => StreamKind::Video,
            "Audio" => StreamKind::Audio,
            "Subtitle" => StreamKind::Subtitle,
            _ => return None,
        };
        Some(MediaStream {
            index: self.index,
            kind,
            language: self.language,
            title: self.title.or(self.display_title),
            codec: self.codec,
            is_default: self.is_default,
            channels: self.channels,
        })
    }
}

impl MediaSegmentDto {
    /// Malformed ranges are dropped with a warning
    pub fn into_segment(self) -> Option<MediaSegment> {
        let id = match self.id.parse() {
            Ok(uuid) => SegmentId(uuid),
            Err(_) => SegmentId::new(),
        };
        let segment_type = self
            .segment_type
            .parse::<SegmentType>()
            .unwrap_or(SegmentType::Other);
        let start_ms = Ticks::new(self.start_ticks).as_millis();
        let end_ms = Ticks::new(self.end_ticks).as_millis();
        match MediaSegment::new(id, segment_type, start_ms, end_ms) {
            Ok(segment) => Some(segment),
            Err(err) => {
                warn!("[MediaServer] Dropping segment {}: {}", self.id, err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_json_maps_to_metadata() {
        let json = r#"{
            "Id": "8d4b1a2c3e4f40718293a4b5c6d7e8f9",
            "Name": "Pilot",
            "SeriesName": "Show",
            "ParentIndexNumber": 1,
            "IndexNumber": 2,
            "RunTimeTicks": 26000000000,
            "UserData": { "PlaybackPositionTicks": 1200000000, "Played": false },
            "MediaSources": [{
                "Id": "8d4b1a2c3e4f40718293a4b5c6d7e8f9",
                "Container": "mkv",
                "MediaStreams": [
                    { "Index": 0, "Type": "Video", "Codec": "h264" },
                    { "Index": 1, "Type": "Audio", "Language": "eng", "IsDefault": true },
                    { "Index": 2, "Type": "Subtitle", "Language": "spa" },
                    { "Index": 3, "Type": "Attachment" }
                ]
            }]
        }"#;
        let dto: BaseItemDto = serde_json::from_str(json).unwrap();
        let item = dto.into_metadata().unwrap();

        assert_eq!(item.display_title(), "Show - S01E02 - Pilot");
        assert_eq!(item.duration_ms(), Some(2_600_000));
        assert_eq!(item.resume_position_ms(), 120_000);
        let source = item.primary_source().unwrap();
        assert_eq!(source.streams.len(), 3);
        assert_eq!(source.audio_streams()[0].index, 1);
        assert_eq!(source.subtitle_streams()[0].index, 2);
    }

    #[test]
    fn zero_resume_position_is_no_resume() {
        let json = r#"{ "Id": "8d4b1a2c3e4f40718293a4b5c6d7e8f9",
                        "UserData": { "PlaybackPositionTicks": 0 } }"#;
        let dto: BaseItemDto = serde_json::from_str(json).unwrap();
        assert_eq!(dto.into_metadata().unwrap().resume_position_ticks, None);
    }

    #[test]
    fn report_body_is_pascal_case_and_sparse() {
        let body = PlaybackReportDto {
            item_id: "abc".into(),
            media_source_id: None,
            play_session_id: Some("ps".into()),
            position_ticks: 50_000,
            is_paused: false,
            can_seek: true,
            play_method: Some("DirectPlay".into()),
            audio_stream_index: None,
            subtitle_stream_index: None,
            max_streaming_bitrate: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["ItemId"], "abc");
        assert_eq!(json["PlaySessionId"], "ps");
        assert_eq!(json["PositionTicks"], 50_000);
        assert!(json.get("MediaSourceId").is_none());
    }

    #[test]
    fn segment_ticks_become_millis() {
        let dto = MediaSegmentDto {
            id: "not-a-uuid".into(),
            segment_type: "Intro".into(),
            start_ticks: 10_000_000,
            end_ticks: 900_000_000,
        };
        let segment = dto.into_segment().unwrap();
        assert_eq!(segment.segment_type, SegmentType::Intro);
        assert_eq!((segment.start_ms, segment.end_ms), (1_000, 90_000));

        let empty = MediaSegmentDto {
            id: "x".into(),
            segment_type: "Outro".into(),
            start_ticks: 5,
            end_ticks: 5,
        };
        assert!(empty.into_segment().is_none());
    }
}
