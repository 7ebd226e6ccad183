use metascope_core::{CoreResult, EntityKind, VChannelInfo};
use metascope_metadata::{Stored, VersionedEntity};

use super::{EntityRef, Evidence, Finding, FindingKind, Mutation};
use crate::migrate::{duplicate_segment_ids, normalize_vchannel};

/// Channels that still embed segment records or list a segment ID twice.
///
/// The proposed repair writes the normalized record back under the same key.
pub fn detect_legacy_vchannels(channels: &[Stored<VChannelInfo>]) -> CoreResult<Vec<Finding>> {
    let mut findings = Vec::new();
    for stored in channels {
        let channel = &stored.value;
        let embedded_segments = channel.legacy_flushed_segments.len()
            + channel.legacy_unflushed_segments.len()
            + channel.legacy_dropped_segments.len();
        let duplicate_ids = duplicate_segment_ids(channel);
        if embedded_segments == 0 && duplicate_ids.is_empty() {
            continue;
        }

        let normalized = normalize_vchannel(channel.clone());
        let entity = EntityRef::new(
            EntityKind::Channel,
            &stored.key,
            channel.collection_id,
            &channel.channel_name,
        );
        findings.push(Finding {
            mutation: Some(Mutation::put(
                stored,
                normalized.encode_as(stored.version)?,
                entity.clone(),
            )),
            entity,
            kind: FindingKind::LegacyVChannel,
            evidence: Evidence::LegacyVChannel {
                channel: channel.channel_name.clone(),
                embedded_segments,
                duplicate_ids,
            },
        });
    }
    Ok(findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use metascope_core::{CollectionId, MetaVersion, Segment, SegmentId};

    fn stored(channel: VChannelInfo) -> Stored<VChannelInfo> {
        Stored {
            key: format!("meta/channel/1/{}", channel.channel_name),
            revision: 2,
            version: MetaVersion::V2_0,
            value: channel,
        }
    }

    #[test]
    fn flags_embedded_records_and_duplicates_only() {
        let legacy = VChannelInfo {
            collection_id: CollectionId::new(1),
            channel_name: "dml_0".into(),
            legacy_flushed_segments: vec![Segment {
                segment_id: SegmentId::new(4),
                ..Segment::default()
            }],
            ..VChannelInfo::default()
        };
        let duplicated = VChannelInfo {
            collection_id: CollectionId::new(1),
            channel_name: "dml_1".into(),
            unflushed_segment_ids: vec![SegmentId::new(2), SegmentId::new(2)],
            ..VChannelInfo::default()
        };
        let clean = VChannelInfo {
            collection_id: CollectionId::new(1),
            channel_name: "dml_2".into(),
            flushed_segment_ids: vec![SegmentId::new(3)],
            ..VChannelInfo::default()
        };

        let findings =
            detect_legacy_vchannels(&[stored(legacy), stored(duplicated), stored(clean)]).unwrap();
        let names: Vec<_> = findings.iter().map(|f| f.entity.id.as_str()).collect();
        assert_eq!(names, vec!["dml_0", "dml_1"]);
        assert!(findings.iter().all(Finding::is_repairable));
    }
}
