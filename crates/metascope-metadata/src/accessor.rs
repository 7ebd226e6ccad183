//! Typed reads and writes over a [`MetaKv`] store.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, warn};

use metascope_core::{
    Collection, CollectionId, ConsoleConfig, CoreError, CoreResult, FieldIndex, MetaVersion,
    Partition, Segment, Session, VChannelInfo,
};

use crate::decoder::{DecodeContext, VersionedEntity};
use crate::keys::{KeyLayout, KeyScope};
use crate::kv::{KvEntry, MetaKv};

/// A decoded entity together with where and how it was stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Stored<T> {
    pub key: String,
    /// `mod_revision` observed when the value was read.
    pub revision: i64,
    /// Generation whose layout accepted the bytes.
    pub version: MetaVersion,
    pub value: T,
}

impl<T> Stored<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Stored<U> {
        Stored {
            key: self.key,
            revision: self.revision,
            version: self.version,
            value: f(self.value),
        }
    }
}

/// A value under a listed prefix that no generation could decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Undecodable {
    pub key: String,
    pub revision: i64,
    pub error: String,
}

/// Outcome of a listing: decoded entities in key order plus the values no
/// generation could decode.
#[derive(Debug, Clone, PartialEq)]
pub struct ListResult<T> {
    pub entities: Vec<Stored<T>>,
    pub undecodable: Vec<Undecodable>,
}

impl<T> Default for ListResult<T> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            undecodable: Vec::new(),
        }
    }
}

impl<T> ListResult<T> {
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Number of undecodable values under the listed prefix.
    pub fn skipped(&self) -> usize {
        self.undecodable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entities.iter().map(|stored| &stored.value)
    }
}

/// Versioned, deadline-bounded access to the metadata store.
#[derive(Clone)]
pub struct MetaAccessor {
    kv: Arc<dyn MetaKv>,
    layout: KeyLayout,
    context: DecodeContext,
    request_timeout: Duration,
}

impl MetaAccessor {
    pub fn new(
        kv: Arc<dyn MetaKv>,
        layout: KeyLayout,
        context: DecodeContext,
        request_timeout: Duration,
    ) -> Self {
        Self {
            kv,
            layout,
            context,
            request_timeout,
        }
    }

    /// Builds an accessor from validated console configuration.
    pub fn from_config(kv: Arc<dyn MetaKv>, config: &ConsoleConfig) -> Self {
        Self::new(
            kv,
            KeyLayout::new(&config.meta.base_path),
            DecodeContext::new(config.cluster.version),
            config.meta.request_timeout(),
        )
    }

    pub fn layout(&self) -> &KeyLayout {
        &self.layout
    }

    pub fn context(&self) -> DecodeContext {
        self.context
    }

    pub fn store(&self) -> &Arc<dyn MetaKv> {
        &self.kv
    }

    async fn with_deadline<T, F>(&self, operation: &'static str, call: F) -> CoreResult<T>
    where
        F: Future<Output = CoreResult<T>>,
    {
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(CoreError::Timeout {
                operation,
                timeout_ms: u64::try_from(self.request_timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    fn decode_entry<T: VersionedEntity>(&self, entry: KvEntry) -> CoreResult<Stored<T>> {
        let (value, version) = self.context.decode::<T>(&entry.key, &entry.value)?;
        Ok(Stored {
            key: entry.key,
            revision: entry.mod_revision,
            version,
            value,
        })
    }

    /// Lists every `T` under `scope` with one prefix read.
    ///
    /// Values that fail to decode are logged and counted, not returned.
    pub async fn list<T: VersionedEntity>(&self, scope: KeyScope) -> CoreResult<ListResult<T>> {
        let prefix = self.layout.scope_prefix(T::KIND, scope);
        let entries = self.with_deadline("list", self.kv.range(&prefix)).await?;

        let mut result = ListResult::default();
        for entry in entries {
            if scope != KeyScope::All {
                // Prefixes without a trailing separator also match longer IDs.
                match self.layout.parse(T::KIND, &entry.key) {
                    Some(path) if scope.contains(&path) => {}
                    _ => continue,
                }
            }
            let (key, revision) = (entry.key.clone(), entry.mod_revision);
            match self.decode_entry::<T>(entry) {
                Ok(stored) => result.entities.push(stored),
                Err(err) => {
                    warn!(kind = %T::KIND, key = %key, error = %err, "skipping undecodable metadata value");
                    result.undecodable.push(Undecodable {
                        key,
                        revision,
                        error: err.to_string(),
                    });
                }
            }
        }

        debug!(
            kind = %T::KIND,
            prefix = %prefix,
            decoded = result.entities.len(),
            skipped = result.skipped(),
            "listed metadata"
        );
        Ok(result)
    }

    /// Reads and decodes one key. `None` when the key is absent.
    pub async fn get<T: VersionedEntity>(&self, key: &str) -> CoreResult<Option<Stored<T>>> {
        match self.with_deadline("get", self.kv.get(key)).await? {
            Some(entry) => self.decode_entry(entry).map(Some),
            None => Ok(None),
        }
    }

    pub async fn get_collection(&self, collection_id: CollectionId) -> CoreResult<Stored<Collection>> {
        let key = self.layout.collection_key(collection_id);
        self.get::<Collection>(&key)
            .await?
            .ok_or_else(|| CoreError::not_found("collection", collection_id.to_string()))
    }

    pub async fn list_collections(&self, scope: KeyScope) -> CoreResult<ListResult<Collection>> {
        self.list(scope).await
    }

    pub async fn list_partitions(&self, scope: KeyScope) -> CoreResult<ListResult<Partition>> {
        self.list(scope).await
    }

    pub async fn list_segments(&self, scope: KeyScope) -> CoreResult<ListResult<Segment>> {
        self.list(scope).await
    }

    pub async fn list_field_indexes(&self, scope: KeyScope) -> CoreResult<ListResult<FieldIndex>> {
        self.list(scope).await
    }

    pub async fn list_channels(&self, scope: KeyScope) -> CoreResult<ListResult<VChannelInfo>> {
        self.list(scope).await
    }

    pub async fn list_sessions(&self) -> CoreResult<ListResult<Session>> {
        self.list(KeyScope::All).await
    }

    /// Blind single-key write.
    pub async fn put(&self, key: &str, value: Bytes) -> CoreResult<i64> {
        self.with_deadline("put", self.kv.put(key, value)).await
    }

    /// Blind single-key delete; an absent key is not an error.
    pub async fn delete(&self, key: &str) -> CoreResult<bool> {
        self.with_deadline("delete", self.kv.delete(key)).await
    }

    /// Write that fails with `Conflict` if the key changed since `expected_revision`.
    pub async fn guarded_put(&self, key: &str, value: Bytes, expected_revision: i64) -> CoreResult<i64> {
        self.with_deadline(
            "compare_and_put",
            self.kv.compare_and_put(key, value, expected_revision),
        )
        .await
    }

    pub async fn guarded_delete(&self, key: &str, expected_revision: i64) -> CoreResult<bool> {
        self.with_deadline(
            "compare_and_delete",
            self.kv.compare_and_delete(key, expected_revision),
        )
        .await
    }

    /// Encodes `entity` in `version` and writes it under its own key.
    pub async fn put_entity<T: VersionedEntity>(&self, entity: &T, version: MetaVersion) -> CoreResult<i64> {
        let key = entity.store_key(&self.layout);
        let payload = entity.encode_as(version)?;
        self.put(&key, Bytes::from(payload)).await
    }
}
