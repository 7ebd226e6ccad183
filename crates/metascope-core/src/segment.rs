use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ids::{CollectionId, FieldId, PartitionId, SegmentId};

/// Lifecycle state for a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentState {
    None,
    NotExist,
    Growing,
    Sealed,
    Flushed,
    Flushing,
    Dropped,
    Importing,
}

impl SegmentState {
    pub const ALL: [SegmentState; 8] = [
        Self::None,
        Self::NotExist,
        Self::Growing,
        Self::Sealed,
        Self::Flushed,
        Self::Flushing,
        Self::Dropped,
        Self::Importing,
    ];

    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Self::NotExist,
            2 => Self::Growing,
            3 => Self::Sealed,
            4 => Self::Flushed,
            5 => Self::Flushing,
            6 => Self::Dropped,
            7 => Self::Importing,
            _ => Self::None,
        }
    }

    #[must_use]
    pub const fn as_raw(&self) -> i32 {
        match self {
            Self::None => 0,
            Self::NotExist => 1,
            Self::Growing => 2,
            Self::Sealed => 3,
            Self::Flushed => 4,
            Self::Flushing => 5,
            Self::Dropped => 6,
            Self::Importing => 7,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "SegmentStateNone",
            Self::NotExist => "NotExist",
            Self::Growing => "Growing",
            Self::Sealed => "Sealed",
            Self::Flushed => "Flushed",
            Self::Flushing => "Flushing",
            Self::Dropped => "Dropped",
            Self::Importing => "Importing",
        }
    }
}

impl Default for SegmentState {
    fn default() -> Self {
        Self::None
    }
}

impl fmt::Display for SegmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SegmentState {
    type Err = CoreError;

    /// Case-insensitive match against the state names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::invalid_argument(format!("unknown segment state `{s}`")))
    }
}

/// Compaction tier of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentLevel {
    Legacy,
    L0,
    L1,
    L2,
}

impl SegmentLevel {
    pub const ALL: [SegmentLevel; 4] = [Self::Legacy, Self::L0, Self::L1, Self::L2];

    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Self::L0,
            2 => Self::L1,
            3 => Self::L2,
            _ => Self::Legacy,
        }
    }

    #[must_use]
    pub const fn as_raw(&self) -> i32 {
        match self {
            Self::Legacy => 0,
            Self::L0 => 1,
            Self::L1 => 2,
            Self::L2 => 3,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Legacy => "Legacy",
            Self::L0 => "L0",
            Self::L1 => "L1",
            Self::L2 => "L2",
        }
    }
}

impl Default for SegmentLevel {
    fn default() -> Self {
        Self::Legacy
    }
}

impl fmt::Display for SegmentLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SegmentLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::invalid_argument(format!("unknown segment level `{s}`")))
    }
}

/// Message-stream position; `timestamp` is a hybrid logical timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub channel_name: String,
    pub msg_id: Vec<u8>,
    pub msg_group: String,
    pub timestamp: u64,
}

/// One binlog file of a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binlog {
    pub log_id: i64,
    pub entries_num: i64,
    pub timestamp_from: u64,
    pub timestamp_to: u64,
    pub log_path: String,
    pub log_size: i64,
}

/// All binlogs of one field within a segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldBinlog {
    pub field_id: FieldId,
    pub binlogs: Vec<Binlog>,
}

/// Normalized segment record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub segment_id: SegmentId,
    pub collection_id: CollectionId,
    pub partition_id: PartitionId,
    pub insert_channel: String,
    pub num_of_rows: i64,
    pub max_row_num: i64,
    pub last_expire_time: u64,
    pub state: SegmentState,
    pub start_position: Option<Position>,
    pub dml_position: Option<Position>,
    pub binlogs: Vec<FieldBinlog>,
    pub statslogs: Vec<FieldBinlog>,
    pub deltalogs: Vec<FieldBinlog>,
    pub level: SegmentLevel,
    pub storage_version: i64,
}

impl Segment {
    /// DML checkpoint timestamp, falling back to the start position when unset.
    #[must_use]
    pub fn effective_ts(&self) -> u64 {
        let dml = self.dml_position.as_ref().map_or(0, |p| p.timestamp);
        if dml != 0 {
            dml
        } else {
            self.start_position.as_ref().map_or(0, |p| p.timestamp)
        }
    }

    /// Binlog paths recorded for one field, in stored order.
    pub fn field_log_paths(&self, field_id: FieldId) -> impl Iterator<Item = &str> {
        self.binlogs
            .iter()
            .filter(move |fb| fb.field_id == field_id)
            .flat_map(|fb| fb.binlogs.iter().map(|b| b.log_path.as_str()))
    }

    /// Total number of binlog references across insert, stats and delta logs.
    #[must_use]
    pub fn binlog_count(&self) -> usize {
        [&self.binlogs, &self.statslogs, &self.deltalogs]
            .into_iter()
            .flatten()
            .map(|fb| fb.binlogs.len())
            .sum()
    }
}
