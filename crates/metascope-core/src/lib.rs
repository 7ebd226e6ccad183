//! Core domain types for the metascope metadata console.

pub mod channel;
pub mod collection;
pub mod config;
pub mod error;
pub mod ids;
pub mod index;
pub mod partition;
pub mod segment;
pub mod session;
pub mod timestamp;
pub mod version;

pub use channel::{SegmentBucket, VChannelInfo};
pub use collection::{Collection, CollectionSchema, CollectionState, DataType, FieldSchema};
pub use config::{ClusterConfig, ConsoleConfig, MetaStoreConfig, RepairConfig};
pub use error::{CoreError, CoreResult};
pub use ids::{CollectionId, DatabaseId, FieldId, IndexId, PartitionId, SegmentId, ServerId};
pub use index::{find_param, FieldIndex, IndexState, KeyValuePair, INDEX_TYPE_KEY};
pub use partition::{Partition, PartitionState};
pub use segment::{Binlog, FieldBinlog, Position, Segment, SegmentLevel, SegmentState};
pub use session::Session;
pub use version::{EntityKind, MetaVersion};
