use crate::error::{ModelError, Result};
use crate::ids::SegmentId;

/// Label the server attaches to a time range within an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SegmentType {
    Intro,
    Outro,
    Recap,
    Preview,
    Other,
}

impl SegmentType {
    /// Only intros and outros get a skip button
    pub fn is_skippable(&self) -> bool {
        matches!(self, SegmentType::Intro | SegmentType::Outro)
    }

    pub fn skip_label(&self) -> &'static str {
        match self {
            SegmentType::Intro => "Skip Intro",
            SegmentType::Outro => "Skip Outro",
            SegmentType::Recap => "Skip Recap",
            SegmentType::Preview => "Skip Preview",
            SegmentType::Other => "Skip",
        }
    }
}

impl std::str::FromStr for SegmentType {
    type Err = std::convert::Infallible;

    /// Unknown labels become `Other` rather than failing the whole list.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "intro" => SegmentType::Intro,
            "outro" | "credits" => SegmentType::Outro,
            "recap" => SegmentType::Recap,
            "preview" => SegmentType::Preview,
            _ => SegmentType::Other,
        })
    }
}

/// A labeled `[start_ms, end_ms)` range within an item
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MediaSegment {
    pub id: SegmentId,
    pub segment_type: SegmentType,
    pub start_ms: u64,
    pub end_ms: u64,
}

impl MediaSegment {
    pub fn new(
        id: SegmentId,
        segment_type: SegmentType,
        start_ms: u64,
        end_ms: u64,
    ) -> Result<Self> {
        if start_ms >= end_ms {
            return Err(ModelError::InvalidSegmentRange { start_ms, end_ms });
        }
        Ok(Self {
            id,
            segment_type,
            start_ms,
            end_ms,
        })
    }

    /// Half-open: the end position itself is outside the segment
    pub fn contains(&self, position_ms: u64) -> bool {
        self.start_ms <= position_ms && position_ms < self.end_ms
    }
}
