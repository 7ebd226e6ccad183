use tracing::info;

use metascope_core::{EntityKind, Segment, SegmentState};
use metascope_metadata::Stored;

use super::{Evidence, Finding, FindingKind, EntityRef, Mutation};

/// Importing segments with no rows whose effective timestamp is below `threshold_ts`.
///
/// Other importing segments are logged as skipped. The proposed repair deletes
/// the segment key; its binlog references live inside that record.
pub fn detect_dirty_importing(segments: &[Stored<Segment>], threshold_ts: u64) -> Vec<Finding> {
    let mut findings = Vec::new();
    for stored in segments {
        let segment = &stored.value;
        if segment.state != SegmentState::Importing {
            continue;
        }

        let effective_ts = segment.effective_ts();
        if segment.num_of_rows != 0 || effective_ts >= threshold_ts {
            info!(
                collection_id = %segment.collection_id,
                segment_id = %segment.segment_id,
                rows = segment.num_of_rows,
                ts = effective_ts,
                "importing segment is not dirty, skipping"
            );
            continue;
        }

        let entity = EntityRef::new(
            EntityKind::Segment,
            &stored.key,
            segment.collection_id,
            segment.segment_id,
        );
        findings.push(Finding {
            mutation: Some(Mutation::delete(stored, entity.clone())),
            entity,
            kind: FindingKind::DirtyImportingSegment,
            evidence: Evidence::DirtyImporting {
                rows: segment.num_of_rows,
                effective_ts,
                threshold_ts,
            },
        });
    }
    findings
}
