use log::{debug, warn};

use marquee_model::{ItemId, MediaSegment};

use crate::infra::services::MediaServerService;

/// Skippable ranges of the current item.
///
/// The list is replaced wholesale per item. When ranges overlap the first
/// one in server order wins.
#[derive(Debug, Default, Clone)]
pub struct SegmentIndex {
    segments: Vec<MediaSegment>,
}

impl SegmentIndex {
    /// Fetch segments for an item. Failures log and yield an empty list.
    pub async fn load(
        server: &dyn MediaServerService,
        item_id: ItemId,
    ) -> Vec<MediaSegment> {
        match server.get_media_segments(item_id).await {
            Ok(segments) => {
                debug!(
                    "[Segments] Loaded {} segments for {}",
                    segments.len(),
                    item_id
                );
                segments
            }
            Err(err) => {
                warn!("[Segments] Failed to load segments for {}: {:#}", item_id, err);
                Vec::new()
            }
        }
    }

    /// Swap in the segments of a newly loaded item
    pub fn replace(&mut self, segments: Vec<MediaSegment>) {
        self.segments = segments;
    }

    /// Forget all segments, e.g. when playback stops
    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// First intro or outro containing the position
    pub fn active_at(&self, position_ms: u64) -> Option<&MediaSegment> {
        self.segments
            .iter()
            .find(|s| s.segment_type.is_skippable() && s.contains(position_ms))
    }
}

/// Where the skip button jumps to
pub fn skip_target_ms(active: Option<&MediaSegment>) -> Option<u64> {
    active.map(|segment| segment.end_ms)
}

/// Button label for a segment kind
pub fn skip_button_label(active: Option<&MediaSegment>) -> Option<&'static str> {
    active.map(|segment| segment.segment_type.skip_label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_model::{SegmentId, SegmentType};

    fn segment(kind: SegmentType, start_ms: u64, end_ms: u64) -> MediaSegment {
        MediaSegment::new(SegmentId::new(), kind, start_ms, end_ms).unwrap()
    }

    fn index(segments: Vec<MediaSegment>) -> SegmentIndex {
        let mut index = SegmentIndex::default();
        index.replace(segments);
        index
    }

    #[test]
    fn active_at_uses_half_open_ranges() {
        let index = index(vec![segment(SegmentType::Intro, 10_000, 90_000)]);
        assert!(index.active_at(9_999).is_none());
        assert!(index.active_at(10_000).is_some());
        assert!(index.active_at(89_999).is_some());
        assert!(index.active_at(90_000).is_none());
    }

    #[test]
    fn only_intros_and_outros_are_active() {
        let index = index(vec![
            segment(SegmentType::Recap, 0, 5_000),
            segment(SegmentType::Preview, 100_000, 120_000),
            segment(SegmentType::Outro, 110_000, 130_000),
        ]);
        assert!(index.active_at(1_000).is_none());
        assert!(index.active_at(105_000).is_none());
        let outro = index.active_at(115_000).unwrap();
        assert_eq!(outro.segment_type, SegmentType::Outro);
        assert_eq!(skip_target_ms(Some(outro)), Some(130_000));
        assert_eq!(skip_button_label(Some(outro)), Some("Skip Outro"));
    }

    #[test]
    fn first_overlapping_segment_wins() {
        let first = segment(SegmentType::Intro, 0, 60_000);
        let second = segment(SegmentType::Outro, 30_000, 90_000);
        let index = index(vec![first.clone(), second]);
        assert_eq!(index.active_at(45_000), Some(&first));
    }

    #[test]
    fn nothing_active_without_segments() {
        let index = SegmentIndex::default();
        assert!(index.active_at(0).is_none());
        assert_eq!(skip_target_ms(None), None);
        assert_eq!(skip_button_label(None), None);
    }
}
