//! Snapshot persistence and mixed-generation reads through the accessor.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tempfile::TempDir;

use metascope_core::{
    Binlog, Collection, CollectionId, CollectionSchema, DataType, FieldBinlog, FieldId, FieldSchema, MetaVersion,
    PartitionId, Position, Segment, SegmentId, SegmentState,
};
use metascope_metadata::{DecodeContext, KeyLayout, KeyScope, MemoryMetaKv, MetaAccessor, MetaKv};

fn accessor(kv: &MemoryMetaKv) -> MetaAccessor {
    MetaAccessor::new(
        Arc::new(kv.clone()),
        KeyLayout::new("by-dev/meta"),
        DecodeContext::new(MetaVersion::V2_2),
        Duration::from_secs(5),
    )
}

fn collection(id: i64) -> Collection {
    Collection {
        collection_id: CollectionId::new(id),
        schema: CollectionSchema {
            name: format!("coll_{id}"),
            fields: vec![FieldSchema {
                field_id: FieldId::new(100),
                name: "pk".into(),
                data_type: DataType::Int64,
                is_primary_key: true,
                ..FieldSchema::default()
            }],
            ..CollectionSchema::default()
        },
        shards_num: 2,
        ..Collection::default()
    }
}

fn segment(collection: i64, id: i64) -> Segment {
    Segment {
        segment_id: SegmentId::new(id),
        collection_id: CollectionId::new(collection),
        partition_id: PartitionId::new(1),
        state: SegmentState::Flushed,
        num_of_rows: 10,
        start_position: Some(Position {
            timestamp: 7,
            ..Position::default()
        }),
        ..Segment::default()
    }
}

#[tokio::test]
async fn snapshot_preserves_entities_and_revisions() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("meta.snap");

    let kv = MemoryMetaKv::new();
    let meta = accessor(&kv);
    meta.put_entity(&collection(7), MetaVersion::V2_2).await.expect("put collection");
    // Without binlogs a 2.0 segment is indistinguishable from a 2.2 one.
    let mut legacy = segment(7, 70);
    legacy.binlogs = vec![FieldBinlog {
        field_id: FieldId::new(100),
        binlogs: vec![Binlog {
            log_path: "files/insert_log/7/1/70/100/1".into(),
            ..Binlog::default()
        }],
    }];
    meta.put_entity(&legacy, MetaVersion::V2_0).await.expect("put legacy segment");
    meta.put_entity(&segment(7, 71), MetaVersion::V2_2).await.expect("put segment");
    kv.save_snapshot(&path).await.expect("save");

    let restored = MemoryMetaKv::load_snapshot(&path).await.expect("load");
    assert_eq!(restored.len(), kv.len());
    assert_eq!(restored.revision(), kv.revision());

    let meta = accessor(&restored);
    let stored = meta.get_collection(CollectionId::new(7)).await.expect("collection");
    assert_eq!(stored.value.name(), "coll_7");
    assert_eq!(stored.version, MetaVersion::V2_2);

    let segments = meta
        .list_segments(KeyScope::Collection(CollectionId::new(7)))
        .await
        .expect("segments");
    assert_eq!(segments.len(), 2);
    assert_eq!(segments.skipped(), 0);
    let versions: Vec<_> = segments
        .entities
        .iter()
        .map(|s| (s.value.segment_id.get(), s.version))
        .collect();
    assert!(versions.contains(&(70, MetaVersion::V2_0)));
    assert!(versions.contains(&(71, MetaVersion::V2_2)));
}

#[tokio::test]
async fn garbage_is_skipped_not_fatal() {
    let kv = MemoryMetaKv::new();
    let meta = accessor(&kv);
    meta.put_entity(&segment(9, 90), MetaVersion::V2_2).await.expect("put segment");
    let bad_key = meta.layout().segment_key(
        CollectionId::new(9),
        PartitionId::new(1),
        SegmentId::new(91),
    );
    kv.put(&bad_key, Bytes::from_static(b"\xff\xff\xff"))
        .await
        .expect("put garbage");

    let segments = meta.list_segments(KeyScope::All).await.expect("segments");
    assert_eq!(segments.len(), 1);
    assert_eq!(segments.skipped(), 1);
}

#[tokio::test]
async fn missing_snapshot_is_an_error() {
    let dir = TempDir::new().expect("tempdir");
    assert!(MemoryMetaKv::load_snapshot(&dir.path().join("absent.snap"))
        .await
        .is_err());
}
