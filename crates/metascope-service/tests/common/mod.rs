//! Shared fixtures for service integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use metascope_core::{
    Collection, CollectionId, CollectionSchema, CoreError, CoreResult, DataType, FieldId,
    FieldSchema, MetaVersion, Position, Segment, SegmentId, SegmentState, PartitionId,
};
use metascope_metadata::{DecodeContext, KeyLayout, KvEntry, MemoryMetaKv, MetaAccessor, MetaKv};

pub const BASE_PATH: &str = "by-dev/meta";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    Put(String),
    Delete(String),
}

/// Memory store that records every write and can be told to fail specific keys.
#[derive(Clone, Default)]
pub struct RecordingKv {
    inner: MemoryMetaKv,
    writes: Arc<Mutex<Vec<Write>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl RecordingKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, key: impl Into<String>) {
        self.failing.lock().insert(key.into());
    }

    pub fn writes(&self) -> Vec<Write> {
        self.writes.lock().clone()
    }

    pub fn clear_writes(&self) {
        self.writes.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    fn check(&self, key: &str) -> CoreResult<()> {
        if self.failing.lock().contains(key) {
            return Err(CoreError::transport(format!("injected failure for {key}")));
        }
        Ok(())
    }
}

#[async_trait]
impl MetaKv for RecordingKv {
    async fn get(&self, key: &str) -> CoreResult<Option<KvEntry>> {
        self.inner.get(key).await
    }

    async fn range(&self, prefix: &str) -> CoreResult<Vec<KvEntry>> {
        self.inner.range(prefix).await
    }

    async fn put(&self, key: &str, value: Bytes) -> CoreResult<i64> {
        self.writes.lock().push(Write::Put(key.to_string()));
        self.check(key)?;
        self.inner.put(key, value).await
    }

    async fn delete(&self, key: &str) -> CoreResult<bool> {
        self.writes.lock().push(Write::Delete(key.to_string()));
        self.check(key)?;
        self.inner.delete(key).await
    }

    async fn compare_and_put(&self, key: &str, value: Bytes, expected_revision: i64) -> CoreResult<i64> {
        self.writes.lock().push(Write::Put(key.to_string()));
        self.check(key)?;
        self.inner.compare_and_put(key, value, expected_revision).await
    }

    async fn compare_and_delete(&self, key: &str, expected_revision: i64) -> CoreResult<bool> {
        self.writes.lock().push(Write::Delete(key.to_string()));
        self.check(key)?;
        self.inner.compare_and_delete(key, expected_revision).await
    }
}

pub fn accessor(kv: &RecordingKv) -> MetaAccessor {
    MetaAccessor::new(
        Arc::new(kv.clone()),
        KeyLayout::new(BASE_PATH),
        DecodeContext::new(MetaVersion::V2_2),
        Duration::from_secs(1),
    )
}

pub fn collection(id: i64, name: &str) -> Collection {
    Collection {
        collection_id: CollectionId::new(id),
        schema: CollectionSchema {
            name: name.to_string(),
            fields: vec![
                FieldSchema {
                    field_id: FieldId::new(100),
                    name: "pk".into(),
                    data_type: DataType::Int64,
                    is_primary_key: true,
                    ..FieldSchema::default()
                },
                FieldSchema {
                    field_id: FieldId::new(101),
                    name: "embedding".into(),
                    data_type: DataType::FloatVector,
                    ..FieldSchema::default()
                },
            ],
            ..CollectionSchema::default()
        },
        shards_num: 1,
        ..Collection::default()
    }
}

pub fn segment(collection: i64, partition: i64, id: i64, state: SegmentState, rows: i64, ts: u64) -> Segment {
    Segment {
        segment_id: SegmentId::new(id),
        collection_id: CollectionId::new(collection),
        partition_id: PartitionId::new(partition),
        insert_channel: format!("by-dev-dml_0_{collection}v0"),
        state,
        num_of_rows: rows,
        start_position: Some(Position {
            channel_name: format!("by-dev-dml_0_{collection}v0"),
            timestamp: ts,
            ..Position::default()
        }),
        ..Segment::default()
    }
}
