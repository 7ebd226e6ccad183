//! Primary-key binlog download planning.
//!
//! Only the object paths are resolved here; fetching them is left to an
//! object-storage client.

use serde::Serialize;
use tracing::info;

use metascope_core::{CollectionId, CoreResult, FieldId, SegmentId};
use metascope_metadata::{KeyScope, MetaAccessor};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PkBinlog {
    pub segment_id: SegmentId,
    pub log_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PkDownloadPlan {
    pub collection_id: CollectionId,
    pub pk_field: FieldId,
    pub pk_field_name: String,
    pub files: Vec<PkBinlog>,
}

impl PkDownloadPlan {
    /// Local directory a file would be written to: `<collection>/<segment>/`.
    pub fn target_dir(&self, file: &PkBinlog) -> String {
        format!("{}/{}", self.collection_id, file.segment_id)
    }
}

/// Resolves the collection's primary-key field and lists its binlog paths
/// over every segment of the collection.
///
/// # Errors
///
/// `NotFound` for a missing collection or one without a primary key,
/// `InvalidState` when several fields are flagged as primary key.
pub async fn plan_pk_download(
    accessor: &MetaAccessor,
    collection_id: CollectionId,
) -> CoreResult<PkDownloadPlan> {
    let collection = accessor.get_collection(collection_id).await?;
    let pk = collection.value.primary_key_field()?;

    let segments = accessor
        .list_segments(KeyScope::Collection(collection_id))
        .await?;
    let files: Vec<PkBinlog> = segments
        .values()
        .flat_map(|segment| {
            segment
                .field_log_paths(pk.field_id)
                .map(move |path| PkBinlog {
                    segment_id: segment.segment_id,
                    log_path: path.to_string(),
                })
        })
        .collect();

    info!(
        collection_id = %collection_id,
        pk_field = %pk.field_id,
        segments = segments.len(),
        files = files.len(),
        "resolved primary key binlogs"
    );
    Ok(PkDownloadPlan {
        collection_id,
        pk_field: pk.field_id,
        pk_field_name: pk.name.clone(),
        files,
    })
}
