//! Records written by 2.0.x / 2.1.x coordinators.

use crate::common::{CollectionSchema, KeyValuePair, MsgPosition};

/// Collection record; partitions are embedded rather than stored under their own keys.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CollectionInfo {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(message, optional, tag = "2")]
    pub schema: Option<CollectionSchema>,
    #[prost(uint64, tag = "3")]
    pub create_time: u64,
    #[prost(int64, repeated, tag = "4")]
    pub partition_ids: Vec<i64>,
    #[prost(string, repeated, tag = "5")]
    pub partition_names: Vec<String>,
    #[prost(string, repeated, tag = "7")]
    pub virtual_channel_names: Vec<String>,
    #[prost(string, repeated, tag = "8")]
    pub physical_channel_names: Vec<String>,
    #[prost(int32, tag = "10")]
    pub shards_num: i32,
}

/// Binlog paths of one field; 2.0 kept no per-file statistics.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FieldBinlogPaths {
    #[prost(int64, tag = "1")]
    pub field_id: i64,
    #[prost(string, repeated, tag = "2")]
    pub binlogs: Vec<String>,
}

/// Segment record with binlogs stored as bare paths.
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
    pub binlogs: Vec<FieldBinlogPaths>,
}

/// Flat index record.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IndexMeta {
    #[prost(int64, tag = "1")]
    pub collection_id: i64,
    #[prost(int64, tag = "2")]
    pub field_id: i64,
    #[prost(string, tag = "3")]
    pub index_name: String,
    #[prost(int64, tag = "4")]
    pub index_id: i64,
    #[prost(message, repeated, tag = "5")]
    pub index_params: Vec<KeyValuePair>,
    #[prost(bool, tag = "6")]
    pub deleted: bool,
    #[prost(uint64, tag = "7")]
    pub create_time: u64,
}
