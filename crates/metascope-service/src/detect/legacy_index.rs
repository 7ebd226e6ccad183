use std::collections::HashMap;

use metascope_core::{Collection, CollectionId, EntityKind, FieldIndex};
use metascope_metadata::Stored;

use super::{EntityRef, Evidence, Finding, FindingKind};

/// Scalar index types whose type-param encoding predates the current layout.
pub const LEGACY_INDEX_TYPES: &[&str] = &["INVERTED", "BITMAP"];

/// Indexes declaring a legacy scalar index type in their type params. Report only.
pub fn detect_legacy_index_types(
    indexes: &[Stored<FieldIndex>],
    collections: &[Stored<Collection>],
) -> Vec<Finding> {
    let names: HashMap<CollectionId, &str> = collections
        .iter()
        .map(|stored| (stored.value.collection_id, stored.value.name()))
        .collect();

    indexes
        .iter()
        .filter_map(|stored| {
            let index = &stored.value;
            let index_type = index.type_param_index_type()?;
            if !LEGACY_INDEX_TYPES.contains(&index_type) {
                return None;
            }
            Some(Finding {
                entity: EntityRef::new(
                    EntityKind::FieldIndex,
                    &stored.key,
                    index.collection_id,
                    index.index_id,
                ),
                kind: FindingKind::LegacyIndexType,
                evidence: Evidence::LegacyIndexType {
                    index_type: index_type.to_string(),
                    field_id: index.field_id,
                    collection_name: names
                        .get(&index.collection_id)
                        .copied()
                        .unwrap_or_default()
                        .to_string(),
                },
                mutation: None,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use metascope_core::{CollectionSchema, IndexId, KeyValuePair, MetaVersion, INDEX_TYPE_KEY};

    fn stored<T>(key: &str, value: T) -> Stored<T> {
        Stored {
            key: key.into(),
            revision: 1,
            version: MetaVersion::V2_2,
            value,
        }
    }

    #[test]
    fn reports_inverted_and_bitmap_with_collection_name() {
        let collections = vec![stored(
            "meta/collection/5",
            Collection {
                collection_id: CollectionId::new(5),
                schema: CollectionSchema {
                    name: "books".into(),
                    ..CollectionSchema::default()
                },
                ..Collection::default()
            },
        )];
        let index = |id: i64, index_type: &str| {
            stored(
                &format!("meta/field-index/5/{id}"),
                FieldIndex {
                    collection_id: CollectionId::new(5),
                    index_id: IndexId::new(id),
                    type_params: vec![KeyValuePair::new(INDEX_TYPE_KEY, index_type)],
                    ..FieldIndex::default()
                },
            )
        };
        let indexes = vec![index(1, "INVERTED"), index(2, "HNSW"), index(3, "BITMAP")];

        let findings = detect_legacy_index_types(&indexes, &collections);
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| f.mutation.is_none()));
        let Evidence::LegacyIndexType { collection_name, .. } = &findings[0].evidence else {
            panic!("unexpected evidence");
        };
        assert_eq!(collection_name, "books");
    }
}
