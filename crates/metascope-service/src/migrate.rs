//! Normalization of legacy record shapes.

use std::collections::HashSet;

use metascope_core::{SegmentBucket, SegmentId, VChannelInfo};

/// Folds embedded segment records into the ID lists.
///
/// For every bucket the embedded records' IDs are appended to the ID list,
/// the embedded records are cleared, and the list is de-duplicated keeping
/// first occurrences. Applying it twice yields the same record.
pub fn normalize_vchannel(mut channel: VChannelInfo) -> VChannelInfo {
    for bucket in SegmentBucket::ALL {
        let (ids, embedded) = channel.bucket_mut(bucket);
        ids.extend(embedded.drain(..).map(|segment| segment.segment_id));
        dedup_in_order(ids);
    }
    channel
}

/// IDs that appear more than once in any bucket, in first-repeat order.
pub fn duplicate_segment_ids(channel: &VChannelInfo) -> Vec<SegmentId> {
    let mut duplicates = Vec::new();
    for bucket in SegmentBucket::ALL {
        let mut seen = HashSet::new();
        for id in channel.segment_ids(bucket) {
            if !seen.insert(*id) && !duplicates.contains(id) {
                duplicates.push(*id);
            }
        }
    }
    duplicates
}

fn dedup_in_order(ids: &mut Vec<SegmentId>) {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.retain(|id| seen.insert(*id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use metascope_core::Segment;
    use proptest::prelude::*;

    fn embedded(id: i64) -> Segment {
        Segment {
            segment_id: SegmentId::new(id),
            ..Segment::default()
        }
    }

    fn ids(raw: &[i64]) -> Vec<SegmentId> {
        raw.iter().copied().map(SegmentId::new).collect()
    }

    #[test]
    fn folds_embedded_segments_into_id_lists() {
        let channel = VChannelInfo {
            channel_name: "dml_0".into(),
            flushed_segment_ids: ids(&[3, 1]),
            legacy_flushed_segments: vec![embedded(1), embedded(5)],
            legacy_dropped_segments: vec![embedded(9)],
            ..VChannelInfo::default()
        };

        let normalized = normalize_vchannel(channel);
        assert_eq!(normalized.flushed_segment_ids, ids(&[3, 1, 5]));
        assert_eq!(normalized.dropped_segment_ids, ids(&[9]));
        assert!(normalized.unflushed_segment_ids.is_empty());
        assert!(!normalized.has_legacy_segments());
    }

    #[test]
    fn reports_duplicates_per_bucket() {
        let channel = VChannelInfo {
            flushed_segment_ids: ids(&[1, 2, 1, 1]),
            dropped_segment_ids: ids(&[2]),
            ..VChannelInfo::default()
        };
        assert_eq!(duplicate_segment_ids(&channel), ids(&[1]));
    }

    fn arb_channel() -> impl Strategy<Value = VChannelInfo> {
        let list = || prop::collection::vec(1i64..20, 0..8);
        (list(), list(), list(), list(), list(), list()).prop_map(
            |(flushed, unflushed, dropped, emb_f, emb_u, emb_d)| VChannelInfo {
                channel_name: "dml".into(),
                flushed_segment_ids: ids(&flushed),
                unflushed_segment_ids: ids(&unflushed),
                dropped_segment_ids: ids(&dropped),
                legacy_flushed_segments: emb_f.into_iter().map(embedded).collect(),
                legacy_unflushed_segments: emb_u.into_iter().map(embedded).collect(),
                legacy_dropped_segments: emb_d.into_iter().map(embedded).collect(),
                ..VChannelInfo::default()
            },
        )
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(channel in arb_channel()) {
            let once = normalize_vchannel(channel);
            let twice = normalize_vchannel(once.clone());
            prop_assert_eq!(&once, &twice);
            prop_assert!(duplicate_segment_ids(&once).is_empty());
            prop_assert!(!once.has_legacy_segments());
        }
    }
}
