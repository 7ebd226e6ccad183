use metascope_metadata::{CollectionScoped, KeyLayout, Stored, VersionedEntity};

use super::{EntityRef, Evidence, Finding, FindingKind};

/// Records whose key path names a different collection than the record itself.
/// Report only; the right owner cannot be inferred.
pub fn detect_key_parent_mismatch<T>(layout: &KeyLayout, entities: &[Stored<T>]) -> Vec<Finding>
where
    T: VersionedEntity + CollectionScoped,
{
    entities
        .iter()
        .filter_map(|stored| {
            let path = layout.parse(T::KIND, &stored.key)?;
            let key_collection = path.collection_id?;
            let record_collection = stored.value.owner();
            if key_collection == record_collection {
                return None;
            }
            Some(Finding {
                entity: EntityRef::new(T::KIND, &stored.key, key_collection, path.leaf),
                kind: FindingKind::KeyParentMismatch,
                evidence: Evidence::KeyParentMismatch {
                    key_collection,
                    record_collection,
                },
                mutation: None,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use metascope_core::{CollectionId, MetaVersion, PartitionId, Segment, SegmentId};

    #[test]
    fn flags_records_filed_under_another_collection() {
        let layout = KeyLayout::new("by-dev/meta");
        let segment = |key_collection: i64, record_collection: i64| Stored {
            key: layout.segment_key(
                CollectionId::new(key_collection),
                PartitionId::new(1),
                SegmentId::new(9),
            ),
            revision: 1,
            version: MetaVersion::V2_2,
            value: Segment {
                segment_id: SegmentId::new(9),
                collection_id: CollectionId::new(record_collection),
                ..Segment::default()
            },
        };

        let findings = detect_key_parent_mismatch(&layout, &[segment(4, 4), segment(4, 5)]);
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].evidence,
            Evidence::KeyParentMismatch {
                key_collection: CollectionId::new(4),
                record_collection: CollectionId::new(5),
            }
        );
        assert_eq!(findings[0].entity.id, "9");
    }
}
