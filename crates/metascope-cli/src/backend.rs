//! Store backend and configuration wiring for the binary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing::info;

use metascope_core::{ConsoleConfig, MetaVersion};
use metascope_metadata::{MemoryMetaKv, MetaAccessor};
use metascope_service::{AppliedResult, Console};

use crate::GlobalArgs;

/// Snapshot-backed store plus the console built on top of it.
pub struct Backend {
    store: MemoryMetaKv,
    snapshot: PathBuf,
    console: Console,
}

impl Backend {
    pub async fn open(args: &GlobalArgs) -> Result<Self> {
        let config = load_config(args)?;
        let snapshot = args
            .snapshot
            .clone()
            .or_else(|| config.meta.snapshot_path.clone())
            .ok_or_else(|| anyhow!("no metadata snapshot given; pass --snapshot or set meta.snapshot_path"))?;

        let store = MemoryMetaKv::load_snapshot(&snapshot)
            .await
            .with_context(|| format!("failed to load snapshot {}", snapshot.display()))?;
        info!(
            base_path = %config.meta.base_path,
            cluster_version = %config.cluster.version,
            guard_revisions = config.repair.guard_revisions,
            "metadata store opened"
        );

        let accessor = MetaAccessor::from_config(Arc::new(store.clone()), &config);
        Ok(Self {
            store,
            snapshot,
            console: Console::new(accessor, config.repair.guard_revisions),
        })
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    /// Writes the store back to its snapshot when `applied` changed anything.
    pub async fn persist(&self, applied: &AppliedResult) -> Result<()> {
        if applied.succeeded.is_empty() {
            return Ok(());
        }
        self.store
            .save_snapshot(&self.snapshot)
            .await
            .with_context(|| format!("failed to save snapshot {}", self.snapshot.display()))
    }
}

fn load_config(args: &GlobalArgs) -> Result<ConsoleConfig> {
    let mut config = match &args.config {
        Some(path) => ConsoleConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ConsoleConfig::load().context("failed to load configuration")?,
    };

    if let Some(base_path) = &args.base_path {
        config.meta.base_path = base_path.clone();
    }
    if let Some(version) = &args.cluster_version {
        config.cluster.version = version.parse::<MetaVersion>()?;
    }
    if args.guard_revisions {
        config.repair.guard_revisions = true;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use metascope_core::{Collection, CollectionId, CollectionSchema};
    use metascope_metadata::MetaKv;
    use tempfile::TempDir;

    use super::*;

    async fn seeded_backend(dir: &TempDir) -> Backend {
        let config = dir.path().join("metascope.toml");
        tokio::fs::write(&config, "[meta]\nbase_path = \"by-dev/meta\"\n")
            .await
            .unwrap();
        let snapshot = dir.path().join("meta.snap");

        let store = MemoryMetaKv::new();
        let collection = Collection {
            collection_id: CollectionId::new(42),
            schema: CollectionSchema {
                name: "docs".into(),
                ..CollectionSchema::default()
            },
            ..Collection::default()
        };
        let loaded = ConsoleConfig::from_file(&config).unwrap();
        MetaAccessor::from_config(Arc::new(store.clone()), &loaded)
            .put_entity(&collection, MetaVersion::V2_2)
            .await
            .unwrap();
        store.save_snapshot(&snapshot).await.unwrap();

        let args = GlobalArgs {
            config: Some(config),
            snapshot: Some(snapshot),
            base_path: None,
            cluster_version: None,
            guard_revisions: false,
        };
        Backend::open(&args).await.unwrap()
    }

    async fn collection_on_disk(backend: &Backend) -> bool {
        let reloaded = MemoryMetaKv::load_snapshot(&backend.snapshot).await.unwrap();
        reloaded.get("by-dev/meta/collection/42").await.unwrap().is_some()
    }

    #[tokio::test]
    async fn dry_run_leaves_the_snapshot_untouched() {
        let dir = TempDir::new().unwrap();
        let backend = seeded_backend(&dir).await;
        let before = tokio::fs::read(&backend.snapshot).await.unwrap();

        let outcome = backend
            .console()
            .remove_collection(CollectionId::new(42), false)
            .await
            .unwrap();
        assert!(outcome.applied.dry_run);
        backend.persist(&outcome.applied).await.unwrap();

        assert_eq!(tokio::fs::read(&backend.snapshot).await.unwrap(), before);
        assert!(collection_on_disk(&backend).await);
    }

    #[tokio::test]
    async fn successful_run_is_written_back() {
        let dir = TempDir::new().unwrap();
        let backend = seeded_backend(&dir).await;

        let outcome = backend
            .console()
            .remove_collection(CollectionId::new(42), true)
            .await
            .unwrap();
        assert_eq!(outcome.applied.succeeded.len(), 1);
        assert!(collection_on_disk(&backend).await, "nothing is saved before persist");

        backend.persist(&outcome.applied).await.unwrap();
        assert!(!collection_on_disk(&backend).await);
    }
}
