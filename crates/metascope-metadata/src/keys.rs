//! Deterministic key construction and parsing.
//!
//! | kind        | key                                                   |
//! |-------------|-------------------------------------------------------|
//! | collection  | `<base>/collection/<collectionID>`                    |
//! | partition   | `<base>/partition/<collectionID>/<partitionID>`       |
//! | segment     | `<base>/segment/<collectionID>/<partitionID>/<segID>` |
//! | field index | `<base>/field-index/<collectionID>/<indexID>`         |
//! | session     | `<base>/session/<serverName>-<serverID>`              |
//! | channel     | `<base>/channel/<collectionID>/<channelName>`         |

use metascope_core::{
    CollectionId, EntityKind, IndexId, PartitionId, SegmentId, ServerId,
};

/// Narrows a prefix scan to the keys under one collection or partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyScope {
    #[default]
    All,
    Collection(CollectionId),
    Partition(CollectionId, PartitionId),
}

impl KeyScope {
    /// Scope for an optional collection filter; zero means every collection.
    #[must_use]
    pub fn collection(collection_id: CollectionId) -> Self {
        if collection_id.is_unset() {
            Self::All
        } else {
            Self::Collection(collection_id)
        }
    }

    /// Whether a parsed key falls inside this scope.
    ///
    /// Keys without a partition component match any partition of their collection.
    #[must_use]
    pub fn contains(&self, path: &KeyPath) -> bool {
        match self {
            Self::All => true,
            Self::Collection(c) => path.collection_id.map_or(true, |id| id == *c),
            Self::Partition(c, p) => {
                path.collection_id.map_or(true, |id| id == *c)
                    && path.partition_id.map_or(true, |id| id == *p)
            }
        }
    }
}

/// Identifiers recovered from a key path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyPath {
    pub collection_id: Option<CollectionId>,
    pub partition_id: Option<PartitionId>,
    /// Last path component (entity ID, channel name or session name).
    pub leaf: String,
}

/// Key layout rooted at a configured base path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLayout {
    base_path: String,
}

impl KeyLayout {
    pub fn new(base_path: impl AsRef<str>) -> Self {
        Self {
            base_path: base_path.as_ref().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Prefix shared by every key of `kind`, with a trailing slash.
    pub fn kind_prefix(&self, kind: EntityKind) -> String {
        format!("{}/{}/", self.base_path, kind.prefix())
    }

    /// Prefix for a range read of `kind` restricted to `scope`.
    ///
    /// Collections have no parent, so only the exact key is addressed when a
    /// collection is requested. Field indexes and channels carry no partition
    /// component and fall back to the collection scope.
    pub fn scope_prefix(&self, kind: EntityKind, scope: KeyScope) -> String {
        let base = self.kind_prefix(kind);
        match scope {
            KeyScope::All => base,
            _ if kind == EntityKind::Session => base,
            KeyScope::Collection(c) | KeyScope::Partition(c, _)
                if kind == EntityKind::Collection =>
            {
                format!("{base}{c}")
            }
            KeyScope::Partition(c, p) if kind == EntityKind::Segment => format!("{base}{c}/{p}/"),
            KeyScope::Collection(c) | KeyScope::Partition(c, _) => format!("{base}{c}/"),
        }
    }

    pub fn collection_key(&self, collection_id: CollectionId) -> String {
        format!("{}{collection_id}", self.kind_prefix(EntityKind::Collection))
    }

    pub fn partition_key(&self, collection_id: CollectionId, partition_id: PartitionId) -> String {
        format!(
            "{}{collection_id}/{partition_id}",
            self.kind_prefix(EntityKind::Partition)
        )
    }

    pub fn segment_key(
        &self,
        collection_id: CollectionId,
        partition_id: PartitionId,
        segment_id: SegmentId,
    ) -> String {
        format!(
            "{}{collection_id}/{partition_id}/{segment_id}",
            self.kind_prefix(EntityKind::Segment)
        )
    }

    pub fn field_index_key(&self, collection_id: CollectionId, index_id: IndexId) -> String {
        format!(
            "{}{collection_id}/{index_id}",
            self.kind_prefix(EntityKind::FieldIndex)
        )
    }

    pub fn channel_key(&self, collection_id: CollectionId, channel_name: &str) -> String {
        format!(
            "{}{collection_id}/{channel_name}",
            self.kind_prefix(EntityKind::Channel)
        )
    }

    pub fn session_key(&self, server_name: &str, server_id: ServerId) -> String {
        format!(
            "{}{server_name}-{server_id}",
            self.kind_prefix(EntityKind::Session)
        )
    }

    /// Splits a key of `kind` into its identifier components.
    ///
    /// Returns `None` when the key is not under this layout's prefix for `kind`
    /// or a numeric component does not parse.
    pub fn parse(&self, kind: EntityKind, key: &str) -> Option<KeyPath> {
        let rest = key.strip_prefix(&self.kind_prefix(kind))?;
        let parts: Vec<&str> = rest.split('/').collect();
        let leaf = (*parts.last()?).to_string();

        let path = match (kind, parts.as_slice()) {
            (EntityKind::Collection, [id]) => KeyPath {
                collection_id: Some(id.parse().ok()?),
                partition_id: None,
                leaf,
            },
            (EntityKind::Partition, [c, p]) => KeyPath {
                collection_id: Some(c.parse().ok()?),
                partition_id: Some(p.parse().ok()?),
                leaf,
            },
            (EntityKind::Segment, [c, p, _]) => KeyPath {
                collection_id: Some(c.parse().ok()?),
                partition_id: Some(p.parse().ok()?),
                leaf,
            },
            (EntityKind::FieldIndex | EntityKind::Channel, [c, _]) => KeyPath {
                collection_id: Some(c.parse().ok()?),
                partition_id: None,
                leaf,
            },
            (EntityKind::Session, [_]) => KeyPath {
                leaf,
                ..KeyPath::default()
            },
            _ => return None,
        };
        Some(path)
    }
}
