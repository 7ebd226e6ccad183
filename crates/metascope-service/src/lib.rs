//! Detection and repair of inconsistent cluster metadata.

pub mod cascade;
pub mod console;
pub mod detect;
pub mod index_file;
pub mod migrate;
pub mod pk;
pub mod plan;
pub mod session;

pub use cascade::{plan_collection_removal, CollectionDependents};
pub use console::{Console, RemovalOutcome, RepairOutcome, SegmentListing};
pub use detect::{EntityRef, Evidence, Finding, FindingKind, Mutation, MutationOp};
pub use index_file::{inspect, BinlogIndexDecoder, IndexFileContent, IndexFileDecoder, IndexFileError, RawIndexFile};
pub use migrate::normalize_vchannel;
pub use pk::{plan_pk_download, PkBinlog, PkDownloadPlan};
pub use plan::{apply, plan, AppliedResult, ApplyOptions, FailedMutation, RepairPlan};
pub use session::{find_by_role, session_for_role};
