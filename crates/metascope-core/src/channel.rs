use serde::{Deserialize, Serialize};

use crate::ids::{CollectionId, SegmentId};
use crate::segment::{Position, Segment};

/// Segment buckets tracked per virtual channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentBucket {
    Flushed,
    Unflushed,
    Dropped,
}

impl SegmentBucket {
    pub const ALL: [SegmentBucket; 3] = [Self::Flushed, Self::Unflushed, Self::Dropped];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Flushed => "flushed",
            Self::Unflushed => "unflushed",
            Self::Dropped => "dropped",
        }
    }
}

/// Virtual channel assignment of a collection.
///
/// Records written by 2.0.2 carry whole segment records in the `legacy_*`
/// buckets instead of bare IDs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VChannelInfo {
    pub collection_id: CollectionId,
    pub channel_name: String,
    pub seek_position: Option<Position>,
    pub flushed_segment_ids: Vec<SegmentId>,
    pub unflushed_segment_ids: Vec<SegmentId>,
    pub dropped_segment_ids: Vec<SegmentId>,
    pub legacy_flushed_segments: Vec<Segment>,
    pub legacy_unflushed_segments: Vec<Segment>,
    pub legacy_dropped_segments: Vec<Segment>,
}

impl VChannelInfo {
    #[must_use]
    pub fn segment_ids(&self, bucket: SegmentBucket) -> &[SegmentId] {
        match bucket {
            SegmentBucket::Flushed => &self.flushed_segment_ids,
            SegmentBucket::Unflushed => &self.unflushed_segment_ids,
            SegmentBucket::Dropped => &self.dropped_segment_ids,
        }
    }

    #[must_use]
    pub fn legacy_segments(&self, bucket: SegmentBucket) -> &[Segment] {
        match bucket {
            SegmentBucket::Flushed => &self.legacy_flushed_segments,
            SegmentBucket::Unflushed => &self.legacy_unflushed_segments,
            SegmentBucket::Dropped => &self.legacy_dropped_segments,
        }
    }

    /// Mutable ID list and embedded records of one bucket.
    pub fn bucket_mut(&mut self, bucket: SegmentBucket) -> (&mut Vec<SegmentId>, &mut Vec<Segment>) {
        match bucket {
            SegmentBucket::Flushed => (
                &mut self.flushed_segment_ids,
                &mut self.legacy_flushed_segments,
            ),
            SegmentBucket::Unflushed => (
                &mut self.unflushed_segment_ids,
                &mut self.legacy_unflushed_segments,
            ),
            SegmentBucket::Dropped => (
                &mut self.dropped_segment_ids,
                &mut self.legacy_dropped_segments,
            ),
        }
    }

    /// True when any bucket still embeds full segment records.
    #[must_use]
    pub fn has_legacy_segments(&self) -> bool {
        SegmentBucket::ALL
            .iter()
            .any(|bucket| !self.legacy_segments(*bucket).is_empty())
    }
}
