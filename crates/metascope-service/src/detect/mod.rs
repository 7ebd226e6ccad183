//! Anomaly detectors.
//!
//! Each detector is a pure function over already-listed entities. Findings
//! may carry the single-key mutation that would repair them; report-only
//! findings carry none.

mod importing;
mod index_params;
mod key_parent;
mod legacy_index;
mod vchannel;

use std::fmt;

use bytes::Bytes;
use serde::Serialize;

use metascope_core::{CollectionId, EntityKind, FieldId, SegmentId};
use metascope_metadata::Stored;

pub use importing::detect_dirty_importing;
pub use index_params::{allowed_params, detect_index_param_drift, ParamClass, SHARED_PARAMS};
pub use key_parent::detect_key_parent_mismatch;
pub use legacy_index::{detect_legacy_index_types, LEGACY_INDEX_TYPES};
pub use vchannel::detect_legacy_vchannels;

/// Identifies the stored record a finding or mutation concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub key: String,
    pub collection_id: CollectionId,
    /// Entity ID, channel name or session name.
    pub id: String,
}

impl EntityRef {
    pub fn new(
        kind: EntityKind,
        key: impl Into<String>,
        collection_id: CollectionId,
        id: impl ToString,
    ) -> Self {
        Self {
            kind,
            key: key.into(),
            collection_id,
            id: id.to_string(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == EntityKind::Collection || self.collection_id.is_unset() {
            write!(f, "{} {}", self.kind, self.id)
        } else {
            write!(
                f,
                "{} {} (collection {})",
                self.kind, self.id, self.collection_id
            )
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingKind {
    DirtyImportingSegment,
    IndexParamDrift,
    LegacyVChannel,
    LegacyIndexType,
    KeyParentMismatch,
}

impl FindingKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DirtyImportingSegment => "dirty-importing-segment",
            Self::IndexParamDrift => "index-param-drift",
            Self::LegacyVChannel => "legacy-vchannel",
            Self::LegacyIndexType => "legacy-index-type",
            Self::KeyParentMismatch => "key-parent-mismatch",
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Facts that triggered a finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Evidence {
    DirtyImporting {
        rows: i64,
        effective_ts: u64,
        threshold_ts: u64,
    },
    IndexParamDrift {
        index_type: String,
        unrecognized: Vec<String>,
    },
    LegacyVChannel {
        channel: String,
        embedded_segments: usize,
        duplicate_ids: Vec<SegmentId>,
    },
    LegacyIndexType {
        index_type: String,
        field_id: FieldId,
        collection_name: String,
    },
    KeyParentMismatch {
        key_collection: CollectionId,
        record_collection: CollectionId,
    },
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirtyImporting {
                rows,
                effective_ts,
                threshold_ts,
            } => write!(
                f,
                "importing with {rows} rows, ts={effective_ts} < {threshold_ts}"
            ),
            Self::IndexParamDrift {
                index_type,
                unrecognized,
            } => write!(
                f,
                "{index_type} index has unrecognized params [{}]",
                unrecognized.join(", ")
            ),
            Self::LegacyVChannel {
                channel,
                embedded_segments,
                duplicate_ids,
            } => write!(
                f,
                "channel {channel} embeds {embedded_segments} segment records, {} duplicate ids",
                duplicate_ids.len()
            ),
            Self::LegacyIndexType {
                index_type,
                field_id,
                collection_name,
            } => write!(
                f,
                "legacy {index_type} index on field {field_id} of collection {collection_name}"
            ),
            Self::KeyParentMismatch {
                key_collection,
                record_collection,
            } => write!(
                f,
                "key names collection {key_collection}, record names {record_collection}"
            ),
        }
    }
}

/// Single-key write proposed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOp {
    Put(Bytes),
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub key: String,
    pub op: MutationOp,
    /// Revision observed when the entity was read; used by guarded apply.
    pub expected_revision: i64,
    pub entity: EntityRef,
}

impl Mutation {
    pub fn delete<T>(stored: &Stored<T>, entity: EntityRef) -> Self {
        Self {
            key: stored.key.clone(),
            op: MutationOp::Delete,
            expected_revision: stored.revision,
            entity,
        }
    }

    /// Deletes `key` without a decoded value, for records no generation can read.
    pub fn delete_key(key: impl Into<String>, expected_revision: i64, entity: EntityRef) -> Self {
        Self {
            key: key.into(),
            op: MutationOp::Delete,
            expected_revision,
            entity,
        }
    }

    pub fn put<T>(stored: &Stored<T>, value: Vec<u8>, entity: EntityRef) -> Self {
        Self {
            key: stored.key.clone(),
            op: MutationOp::Put(Bytes::from(value)),
            expected_revision: stored.revision,
            entity,
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(self.op, MutationOp::Delete)
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.op {
            MutationOp::Put(value) => write!(f, "put {} ({} bytes)", self.key, value.len()),
            MutationOp::Delete => write!(f, "delete {}", self.key),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub entity: EntityRef,
    pub kind: FindingKind,
    pub evidence: Evidence,
    pub mutation: Option<Mutation>,
}

impl Finding {
    pub fn is_repairable(&self) -> bool {
        self.mutation.is_some()
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.entity, self.evidence)
    }
}
