//! Protobuf records stored in the cluster metadata store, one module per schema generation.
//!
//! Messages are declared with `prost` derives rather than generated from
//! `.proto` files so the crate builds without `protoc`. Tag numbers match the
//! layouts written by the cluster; do not renumber.

pub mod common;
pub mod v2_0;
pub mod v2_2;

pub use common::{CollectionSchema, FieldSchema, KeyValuePair, MsgPosition, VchannelInfo};
pub use prost::{DecodeError, Message};
