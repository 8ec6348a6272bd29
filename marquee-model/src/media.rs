use crate::ids::{ItemId, MediaSourceId};
use crate::ticks::Ticks;

/// Kind of elementary stream inside a media source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
}

/// One audio, video or subtitle stream as the server describes it.
///
/// `index` is the server's stream index, which is what stream URLs and
/// playback reports refer to. It is not a position in any list.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MediaStream {
    pub index: i32,
    pub kind: StreamKind,
    pub language: Option<String>,
    pub title: Option<String>,
    pub codec: Option<String>,
    pub is_default: bool,
    pub channels: Option<i32>,
}

impl MediaStream {
    pub fn audio(index: i32, language: Option<&str>, is_default: bool) -> Self {
        Self {
            index,
            kind: StreamKind::Audio,
            language: language.map(str::to_string),
            title: None,
            codec: None,
            is_default,
            channels: None,
        }
    }

    pub fn subtitle(
        index: i32,
        language: Option<&str>,
        is_default: bool,
    ) -> Self {
        Self {
            kind: StreamKind::Subtitle,
            ..Self::audio(index, language, is_default)
        }
    }

    /// Case-insensitive language comparison
    pub fn matches_language(&self, language: &str) -> bool {
        self.language
            .as_deref()
            .is_some_and(|lang| lang.eq_ignore_ascii_case(language.trim()))
    }

    /// Human readable label, e.g. "English (AC3 5.1)"
    pub fn display_label(&self) -> String {
        let mut parts = Vec::new();

        if let Some(lang) = &self.language {
            parts.push(format_language_code(lang));
        } else if let Some(title) = &self.title {
            parts.push(title.clone());
        } else {
            parts.push(format!("Track {}", self.index + 1));
        }

        let mut details = Vec::new();
        if let Some(codec) = &self.codec {
            details.push(match self.kind {
                StreamKind::Subtitle => format_subtitle_codec(codec),
                _ => format_audio_codec(codec),
            });
        }
        if self.kind == StreamKind::Audio
            && let Some(channels) = self.channels
        {
            details.push(format_channels(channels));
        }

        if !details.is_empty() {
            parts.push(format!("({})", details.join(" ")));
        }

        parts.join(" ")
    }
}

/// A physical source (file or stream variant) of an item
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MediaSourceInfo {
    pub id: MediaSourceId,
    pub name: Option<String>,
    pub container: Option<String>,
    pub streams: Vec<MediaStream>,
}

impl MediaSourceInfo {
    pub fn audio_streams(&self) -> Vec<MediaStream> {
        self.streams_of(StreamKind::Audio)
    }

    pub fn subtitle_streams(&self) -> Vec<MediaStream> {
        self.streams_of(StreamKind::Subtitle)
    }

    fn streams_of(&self, kind: StreamKind) -> Vec<MediaStream> {
        self.streams
            .iter()
            .filter(|s| s.kind == kind)
            .cloned()
            .collect()
    }
}

/// Item metadata needed to start playback
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemMetadata {
    pub id: ItemId,
    pub name: String,
    pub series_name: Option<String>,
    pub season_number: Option<u16>,
    pub episode_number: Option<u16>,
    pub run_time_ticks: Option<Ticks>,
    pub resume_position_ticks: Option<Ticks>,
    pub media_sources: Vec<MediaSourceInfo>,
}

impl ItemMetadata {
    /// The source playback uses; the first one the server lists
    pub fn primary_source(&self) -> Option<&MediaSourceInfo> {
        self.media_sources.first()
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.run_time_ticks.map(|t| t.as_millis())
    }

    pub fn resume_position_ms(&self) -> u64 {
        self.resume_position_ticks
            .map(|t| t.as_millis())
            .unwrap_or(0)
    }

    /// "Series - S01E02 - Name" for episodes, the plain name otherwise
    pub fn display_title(&self) -> String {
        match (&self.series_name, self.season_number, self.episode_number) {
            (Some(series), Some(season), Some(episode)) => format!(
                "{} - S{:02}E{:02} - {}",
                series, season, episode, self.name
            ),
            _ => self.name.clone(),
        }
    }
}

/// Convert language code to human-readable name
fn format_language_code(code: &str) -> String {
    match code.to_lowercase().as_str() {
        "en" | "eng" => "English",
        "es" | "spa" => "Spanish",
        "fr" | "fra" | "fre" => "French",
        "de" | "deu" | "ger" => "German",
        "it" | "ita" => "Italian",
        "pt" | "por" => "Portuguese",
        "ru" | "rus" => "Russian",
        "ja" | "jpn" => "Japanese",
        "zh" | "chi" | "zho" => "Chinese",
        "ko" | "kor" => "Korean",
        "nl" | "nld" | "dut" => "Dutch",
        "sv" | "swe" => "Swedish",
        "pl" | "pol" => "Polish",
        _ => code,
    }
    .to_string()
}

fn format_audio_codec(codec: &str) -> String {
    match codec.to_lowercase().as_str() {
        c if c.contains("eac3") || c.contains("eac-3") => "E-AC3",
        c if c.contains("ac3") || c.contains("ac-3") => "AC3",
        c if c.contains("aac") => "AAC",
        c if c.contains("dts") => "DTS",
        c if c.contains("truehd") => "TrueHD",
        c if c.contains("mp3") => "MP3",
        c if c.contains("opus") => "Opus",
        c if c.contains("flac") => "FLAC",
        _ => codec,
    }
    .to_string()
}

fn format_subtitle_codec(codec: &str) -> String {
    match codec.to_lowercase().as_str() {
        c if c.contains("srt") || c.contains("subrip") => "SRT",
        c if c.contains("webvtt") || c.contains("vtt") => "WebVTT",
        c if c.contains("ass") || c.contains("ssa") => "ASS/SSA",
        c if c.contains("pgs") => "PGS",
        _ => codec,
    }
    .to_string()
}

fn format_channels(channels: i32) -> String {
    match channels {
        1 => "Mono".to_string(),
        2 => "Stereo".to_string(),
        6 => "5.1".to_string(),
        8 => "7.1".to_string(),
        _ => format!("{} ch", channels),
    }
}
