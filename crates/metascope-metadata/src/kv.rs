use async_trait::async_trait;
use bytes::Bytes;

use metascope_core::CoreResult;

/// One key/value pair as returned by the store, with its revisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvEntry {
    pub key: String,
    pub value: Bytes,
    /// Store revision at which the key was created.
    pub create_revision: i64,
    /// Store revision of the last write to the key.
    pub mod_revision: i64,
}

/// Abstraction over the shared, revisioned metadata store.
///
/// Every call is a single round trip. Multi-key operations are not atomic and
/// no lease or lock is taken; the live cluster may write concurrently.
#[async_trait]
pub trait MetaKv: Send + Sync {
    /// Fetch one key. Returns `None` if absent.
    async fn get(&self, key: &str) -> CoreResult<Option<KvEntry>>;

    /// Point-in-time range read of every key starting with `prefix`, in key order.
    async fn range(&self, prefix: &str) -> CoreResult<Vec<KvEntry>>;

    /// Blind write. Returns the new store revision.
    async fn put(&self, key: &str, value: Bytes) -> CoreResult<i64>;

    /// Blind delete. Succeeds even if the key doesn't exist; returns whether it did.
    async fn delete(&self, key: &str) -> CoreResult<bool>;

    /// Write only if the key's `mod_revision` still equals `expected_revision`.
    ///
    /// An `expected_revision` of 0 requires the key to be absent.
    async fn compare_and_put(
        &self,
        key: &str,
        value: Bytes,
        expected_revision: i64,
    ) -> CoreResult<i64>;

    /// Delete only if the key's `mod_revision` still equals `expected_revision`.
    ///
    /// An already-absent key is not a conflict.
    async fn compare_and_delete(&self, key: &str, expected_revision: i64) -> CoreResult<bool>;
}
