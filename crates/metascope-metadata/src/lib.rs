//! Versioned access to the cluster's key-value metadata store.

mod accessor;
mod convert;
pub mod decoder;
pub mod filter;
pub mod keys;
mod kv;
mod memory;

pub use accessor::{ListResult, MetaAccessor, Stored, Undecodable};
pub use decoder::{Attempt, DecodeContext, VersionedEntity};
pub use filter::{filter, group_by_collection, CollectionFilter, CollectionScoped, Predicate, SegmentFilter};
pub use keys::{KeyLayout, KeyPath, KeyScope};
pub use kv::{KvEntry, MetaKv};
pub use memory::MemoryMetaKv;
