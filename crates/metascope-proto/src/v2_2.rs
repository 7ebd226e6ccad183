//! Records written by 2.2.x and later coordinators.

use crate::common::{CollectionSchema, KeyValuePair, MsgPosition};

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CollectionInfo {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(message, optional, tag = "2")]
    pub schema: Option<CollectionSchema>,
    #[prost(uint64, tag = "3")]
    pub create_time: u64,
    /// Deprecated; partitions moved to their own keys.
    #[prost(int64, repeated, tag = "4")]
    pub partition_ids: Vec<i64>,
    /// Deprecated; partitions moved to their own keys.
    #[prost(string, repeated, tag = "5")]
    pub partition_names: Vec<String>,
    #[prost(string, repeated, tag = "7")]
    pub virtual_channel_names: Vec<String>,
    #[prost(string, repeated, tag = "8")]
    pub physical_channel_names: Vec<String>,
    #[prost(int32, tag = "10")]
    pub shards_num: i32,
    #[prost(int32, tag = "13")]
    pub state: i32,
    #[prost(int64, tag = "15")]
    pub db_id: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PartitionInfo {
    #[prost(int64, tag = "1")]
    pub partition_id: i64,
    #[prost(string, tag = "2")]
    pub partition_name: String,
    #[prost(uint64, tag = "3")]
    pub partition_created_timestamp: u64,
    #[prost(int64, tag = "4")]
    pub collection_id: i64,
    #[prost(int32, tag = "5")]
    pub state: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Binlog {
    #[prost(int64, tag = "1")]
    pub entries_num: i64,
    #[prost(uint64, tag = "2")]
    pub timestamp_from: u64,
    #[prost(uint64, tag = "3")]
    pub timestamp_to: u64,
    #[prost(string, tag = "4")]
    pub log_path: String,
    #[prost(int64, tag = "5")]
    pub log_size: i64,
    #[prost(int64, tag = "6")]
    pub log_id: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FieldBinlog {
    #[prost(int64, tag = "1")]
    pub field_id: i64,
    #[prost(message, repeated, tag = "2")]
    pub binlogs: Vec<Binlog>,
}

/// Segment record. Same tags as the 2.0 layout; only the binlog entries
/// inside tags 11-13 changed from bare paths to [`Binlog`] messages.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SegmentInfo {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(int64, tag = "2")]
    pub collection_id: i64,
    #[prost(int64, tag = "3")]
    pub partition_id: i64,
    #[prost(string, tag = "4")]
    pub insert_channel: String,
    #[prost(int64, tag = "5")]
    pub num_of_rows: i64,
    #[prost(int32, tag = "6")]
    pub state: i32,
    #[prost(int64, tag = "7")]
    pub max_row_num: i64,
    #[prost(uint64, tag = "8")]
    pub last_expire_time: u64,
    #[prost(message, optional, tag = "9")]
    pub start_position: Option<MsgPosition>,
    #[prost(message, optional, tag = "10")]
    pub dml_position: Option<MsgPosition>,
    #[prost(message, repeated, tag = "11")]
    pub binlogs: Vec<FieldBinlog>,
    #[prost(message, repeated, tag = "12")]
    pub statslogs: Vec<FieldBinlog>,
    #[prost(message, repeated, tag = "13")]
    pub deltalogs: Vec<FieldBinlog>,
    #[prost(int32, tag = "20")]
    pub level: i32,
    #[prost(int64, tag = "21")]
    pub storage_version: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IndexInfo {
    #[prost(int64, tag = "1")]
    pub collection_id: i64,
    #[prost(int64, tag = "2")]
    pub field_id: i64,
    #[prost(string, tag = "3")]
    pub index_name: String,
    #[prost(int64, tag = "4")]
    pub index_id: i64,
    #[prost(message, repeated, tag = "5")]
    pub type_params: Vec<KeyValuePair>,
    #[prost(message, repeated, tag = "6")]
    pub index_params: Vec<KeyValuePair>,
    #[prost(int64, tag = "7")]
    pub indexed_rows: i64,
    #[prost(int64, tag = "8")]
    pub total_rows: i64,
    #[prost(int32, tag = "9")]
    pub state: i32,
    #[prost(string, tag = "10")]
    pub index_state_fail_reason: String,
    #[prost(bool, tag = "11")]
    pub is_auto_index: bool,
    #[prost(message, repeated, tag = "12")]
    pub user_index_params: Vec<KeyValuePair>,
}

/// Index record; the payload moved into a nested `IndexInfo`, so tag 1 is a
/// message here and a varint in the 2.0 layout.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FieldIndex {
    #[prost(message, optional, tag = "1")]
    pub index_info: Option<IndexInfo>,
    #[prost(bool, tag = "2")]
    pub deleted: bool,
    #[prost(uint64, tag = "3")]
    pub create_time: u64,
}
