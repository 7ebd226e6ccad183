//! In-memory revisioned store, also used as the offline snapshot backend.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use metascope_core::{CoreError, CoreResult};

use crate::kv::{KvEntry, MetaKv};

#[derive(Debug, Clone)]
struct StoredValue {
    value: Bytes,
    create_revision: i64,
    mod_revision: i64,
}

#[derive(Debug, Default)]
struct MemoryState {
    entries: BTreeMap<String, StoredValue>,
    revision: i64,
}

impl MemoryState {
    fn write(&mut self, key: &str, value: Bytes) -> i64 {
        self.revision += 1;
        let revision = self.revision;
        let create_revision = self
            .entries
            .get(key)
            .map_or(revision, |existing| existing.create_revision);
        self.entries.insert(
            key.to_string(),
            StoredValue {
                value,
                create_revision,
                mod_revision: revision,
            },
        );
        revision
    }

    fn remove(&mut self, key: &str) -> bool {
        let existed = self.entries.remove(key).is_some();
        if existed {
            self.revision += 1;
        }
        existed
    }

    fn current_revision(&self, key: &str) -> i64 {
        self.entries.get(key).map_or(0, |v| v.mod_revision)
    }
}

/// On-disk snapshot layout (bincode).
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    revision: i64,
    entries: Vec<SnapshotEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEntry {
    key: String,
    value: Vec<u8>,
    create_revision: i64,
    mod_revision: i64,
}

/// In-memory metadata store with etcd-like revision bookkeeping.
#[derive(Clone, Default)]
pub struct MemoryMetaKv {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryMetaKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current store revision.
    pub fn revision(&self) -> i64 {
        self.state.read().revision
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }

    /// Loads a snapshot previously written by [`MemoryMetaKv::save_snapshot`].
    pub async fn load_snapshot(path: &Path) -> CoreResult<Self> {
        let payload = tokio::fs::read(path).await?;
        let snapshot: SnapshotFile = bincode::deserialize(&payload).map_err(|err| {
            CoreError::SerializationError(format!(
                "invalid snapshot {}: {err}",
                path.display()
            ))
        })?;

        let mut state = MemoryState {
            entries: BTreeMap::new(),
            revision: snapshot.revision,
        };
        for entry in snapshot.entries {
            state.revision = state.revision.max(entry.mod_revision);
            state.entries.insert(
                entry.key,
                StoredValue {
                    value: Bytes::from(entry.value),
                    create_revision: entry.create_revision,
                    mod_revision: entry.mod_revision,
                },
            );
        }

        info!(
            path = %path.display(),
            keys = state.entries.len(),
            revision = state.revision,
            "loaded metadata snapshot"
        );
        Ok(Self {
            state: Arc::new(RwLock::new(state)),
        })
    }

    /// Writes the whole store to `path`, replacing it via a sibling temp file.
    pub async fn save_snapshot(&self, path: &Path) -> CoreResult<()> {
        let payload = {
            let state = self.state.read();
            let snapshot = SnapshotFile {
                revision: state.revision,
                entries: state
                    .entries
                    .iter()
                    .map(|(key, stored)| SnapshotEntry {
                        key: key.clone(),
                        value: stored.value.to_vec(),
                        create_revision: stored.create_revision,
                        mod_revision: stored.mod_revision,
                    })
                    .collect(),
            };
            bincode::serialize(&snapshot)
                .map_err(|err| CoreError::SerializationError(err.to_string()))?
        };

        let tmp = temp_path(path);
        tokio::fs::write(&tmp, payload).await?;
        tokio::fs::rename(&tmp, path).await?;
        debug!(path = %path.display(), "saved metadata snapshot");
        Ok(())
    }
}

/// Sibling of `path` with `.tmp` appended, distinct from `path` whatever its extension.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[async_trait]
impl MetaKv for MemoryMetaKv {
    async fn get(&self, key: &str) -> CoreResult<Option<KvEntry>> {
        let state = self.state.read();
        Ok(state.entries.get(key).map(|stored| KvEntry {
            key: key.to_string(),
            value: stored.value.clone(),
            create_revision: stored.create_revision,
            mod_revision: stored.mod_revision,
        }))
    }

    async fn range(&self, prefix: &str) -> CoreResult<Vec<KvEntry>> {
        let state = self.state.read();
        let entries = state
            .entries
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, stored)| KvEntry {
                key: key.clone(),
                value: stored.value.clone(),
                create_revision: stored.create_revision,
                mod_revision: stored.mod_revision,
            })
            .collect();
        Ok(entries)
    }

    async fn put(&self, key: &str, value: Bytes) -> CoreResult<i64> {
        Ok(self.state.write().write(key, value))
    }

    async fn delete(&self, key: &str) -> CoreResult<bool> {
        Ok(self.state.write().remove(key))
    }

    async fn compare_and_put(
        &self,
        key: &str,
        value: Bytes,
        expected_revision: i64,
    ) -> CoreResult<i64> {
        let mut state = self.state.write();
        let actual = state.current_revision(key);
        if actual != expected_revision {
            return Err(CoreError::Conflict {
                key: key.to_string(),
                expected: expected_revision,
                actual,
            });
        }
        Ok(state.write(key, value))
    }

    async fn compare_and_delete(&self, key: &str, expected_revision: i64) -> CoreResult<bool> {
        let mut state = self.state.write();
        let actual = state.current_revision(key);
        if actual == 0 {
            return Ok(false);
        }
        if actual != expected_revision {
            return Err(CoreError::Conflict {
                key: key.to_string(),
                expected: expected_revision,
                actual,
            });
        }
        Ok(state.remove(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn range_is_prefix_scoped_and_ordered() {
        let kv = MemoryMetaKv::new();
        kv.put("meta/segment/1/2/30", Bytes::from_static(b"c")).await.unwrap();
        kv.put("meta/segment/1/2/10", Bytes::from_static(b"a")).await.unwrap();
        kv.put("meta/segment-index/1", Bytes::from_static(b"x")).await.unwrap();
        kv.put("meta/segmenz", Bytes::from_static(b"y")).await.unwrap();

        let keys: Vec<_> = kv
            .range("meta/segment/")
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.key)
            .collect();
        assert_eq!(keys, vec!["meta/segment/1/2/10", "meta/segment/1/2/30"]);
    }

    #[tokio::test]
    async fn revisions_advance_per_write() {
        let kv = MemoryMetaKv::new();
        let first = kv.put("k", Bytes::from_static(b"1")).await.unwrap();
        let second = kv.put("k", Bytes::from_static(b"2")).await.unwrap();
        assert!(second > first);

        let entry = kv.get("k").await.unwrap().expect("present");
        assert_eq!(entry.create_revision, first);
        assert_eq!(entry.mod_revision, second);
    }

    #[tokio::test]
    async fn delete_of_absent_key_is_not_an_error() {
        let kv = MemoryMetaKv::new();
        assert!(!kv.delete("missing").await.unwrap());
        assert_eq!(kv.revision(), 0);
    }

    #[tokio::test]
    async fn compare_and_put_detects_concurrent_write() {
        let kv = MemoryMetaKv::new();
        let read_revision = kv.put("k", Bytes::from_static(b"old")).await.unwrap();
        kv.put("k", Bytes::from_static(b"external")).await.unwrap();

        let err = kv
            .compare_and_put("k", Bytes::from_static(b"repair"), read_revision)
            .await
            .expect_err("stale revision");
        assert!(matches!(err, CoreError::Conflict { .. }));

        let current = kv.get("k").await.unwrap().unwrap().mod_revision;
        kv.compare_and_put("k", Bytes::from_static(b"repair"), current)
            .await
            .expect("fresh revision");
        assert!(!kv.compare_and_delete("absent", 5).await.unwrap());
    }

    #[tokio::test]
    async fn snapshot_survives_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("meta.snapshot");

        let kv = MemoryMetaKv::new();
        kv.put("meta/collection/1", Bytes::from_static(b"one")).await.unwrap();
        kv.put("meta/collection/2", Bytes::from_static(b"two")).await.unwrap();
        kv.save_snapshot(&path).await.expect("save");

        let restored = MemoryMetaKv::load_snapshot(&path).await.expect("load");
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.revision(), kv.revision());
        let entry = restored.get("meta/collection/2").await.unwrap().unwrap();
        assert_eq!(entry.value, Bytes::from_static(b"two"));
    }

    #[test]
    fn temp_path_differs_from_target_for_any_extension() {
        for name in ["meta.snapshot", "meta.tmp", "meta"] {
            let path = Path::new("/var/backups").join(name);
            let tmp = temp_path(&path);
            assert_ne!(tmp, path);
            assert_eq!(tmp.parent(), path.parent());
        }
        assert_eq!(temp_path(Path::new("a/meta.tmp")), PathBuf::from("a/meta.tmp.tmp"));
    }

    #[tokio::test]
    async fn snapshot_with_tmp_extension_is_saved_through_a_sibling() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("meta.tmp");

        let kv = MemoryMetaKv::new();
        kv.put("meta/collection/1", Bytes::from_static(b"one")).await.unwrap();
        kv.save_snapshot(&path).await.expect("save");

        assert!(!temp_path(&path).exists());
        let restored = MemoryMetaKv::load_snapshot(&path).await.expect("load");
        assert_eq!(restored.len(), 1);
    }
}
