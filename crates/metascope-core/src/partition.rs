use serde::{Deserialize, Serialize};

use crate::ids::{CollectionId, PartitionId};

/// Lifecycle of a partition record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartitionState {
    Created,
    Creating,
    Dropping,
    Dropped,
}

impl PartitionState {
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Self::Creating,
            2 => Self::Dropping,
            3 => Self::Dropped,
            _ => Self::Created,
        }
    }

    #[must_use]
    pub const fn as_raw(&self) -> i32 {
        match self {
            Self::Created => 0,
            Self::Creating => 1,
            Self::Dropping => 2,
            Self::Dropped => 3,
        }
    }
}

impl Default for PartitionState {
    fn default() -> Self {
        Self::Created
    }
}

/// Normalized partition record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub collection_id: CollectionId,
    pub partition_id: PartitionId,
    pub name: String,
    pub state: PartitionState,
    pub create_time: u64,
}
