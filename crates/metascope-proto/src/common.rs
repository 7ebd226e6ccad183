//! Messages whose layout did not change between generations.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KeyValuePair {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(string, tag = "2")]
    pub value: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MsgPosition {
    #[prost(string, tag = "1")]
    pub channel_name: String,
    #[prost(bytes = "vec", tag = "2")]
    pub msg_id: Vec<u8>,
    #[prost(string, tag = "3")]
    pub msg_group: String,
    #[prost(uint64, tag = "4")]
    pub timestamp: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FieldSchema {
    #[prost(int64, tag = "1")]
    pub field_id: i64,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(bool, tag = "3")]
    pub is_primary_key: bool,
    #[prost(string, tag = "4")]
    pub description: String,
    #[prost(int32, tag = "5")]
    pub data_type: i32,
    #[prost(message, repeated, tag = "6")]
    pub type_params: Vec<KeyValuePair>,
    #[prost(message, repeated, tag = "7")]
    pub index_params: Vec<KeyValuePair>,
    #[prost(bool, tag = "8")]
    pub auto_id: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CollectionSchema {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub description: String,
    #[prost(bool, tag = "3")]
    pub auto_id: bool,
    #[prost(message, repeated, tag = "4")]
    pub fields: Vec<FieldSchema>,
}

/// Virtual channel assignment.
///
/// Tags 4-6 hold whole segment records and are only populated by 2.0.2
/// coordinators; later releases write the ID lists in tags 7-9.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VchannelInfo {
    #[prost(int64, tag = "1")]
    pub collection_id: i64,
    #[prost(string, tag = "2")]
    pub channel_name: String,
    #[prost(message, optional, tag = "3")]
    pub seek_position: Option<MsgPosition>,
    #[prost(message, repeated, tag = "4")]
    pub unflushed_segments: Vec<crate::v2_0::SegmentInfo>,
    #[prost(message, repeated, tag = "5")]
    pub flushed_segments: Vec<crate::v2_0::SegmentInfo>,
    #[prost(message, repeated, tag = "6")]
    pub dropped_segments: Vec<crate::v2_0::SegmentInfo>,
    #[prost(int64, repeated, tag = "7")]
    pub unflushed_segment_ids: Vec<i64>,
    #[prost(int64, repeated, tag = "8")]
    pub flushed_segment_ids: Vec<i64>,
    #[prost(int64, repeated, tag = "9")]
    pub dropped_segment_ids: Vec<i64>,
}
