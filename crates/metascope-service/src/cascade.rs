//! Whole-collection removal.

use tracing::{info, warn};

use metascope_core::{Collection, CollectionId, CoreError, CoreResult, EntityKind};
use metascope_metadata::{KeyLayout, KeyScope, ListResult, MetaAccessor, Stored};

use crate::detect::{EntityRef, Mutation};
use crate::plan::RepairPlan;

/// Everything stored under one collection, read before planning its removal.
///
/// Per-kind counts include records that could not be decoded; those are
/// removed by key and also counted in `undecodable`.
#[derive(Debug, Clone)]
pub struct CollectionDependents {
    pub collection: Stored<Collection>,
    pub partitions: usize,
    pub segments: usize,
    pub field_indexes: usize,
    pub channels: usize,
    pub undecodable: usize,
    plan: RepairPlan,
}

impl CollectionDependents {
    pub fn plan(&self) -> &RepairPlan {
        &self.plan
    }

    pub fn into_plan(self) -> RepairPlan {
        self.plan
    }
}

fn delete_all<T>(
    plan: &mut RepairPlan,
    layout: &KeyLayout,
    listed: &ListResult<T>,
    kind: EntityKind,
    collection_id: CollectionId,
    id: impl Fn(&T) -> String,
) -> usize {
    for stored in &listed.entities {
        let entity = EntityRef::new(kind, &stored.key, collection_id, id(&stored.value));
        plan.push(Mutation::delete(stored, entity));
    }
    // The key path alone proves ownership; the value is not needed to delete it.
    for raw in &listed.undecodable {
        let leaf = layout
            .parse(kind, &raw.key)
            .map_or_else(|| raw.key.clone(), |path| path.leaf);
        warn!(key = %raw.key, error = %raw.error, "removing undecodable record by key");
        let entity = EntityRef::new(kind, &raw.key, collection_id, leaf);
        plan.push(Mutation::delete_key(&raw.key, raw.revision, entity));
    }
    listed.len() + listed.skipped()
}

/// Reads a collection and its dependents and plans deleting all of them.
///
/// Dependents go first and the collection record last, so an interrupted
/// run leaves the collection visible for a retry. Dependents whose values
/// cannot be decoded are deleted by key.
///
/// # Errors
///
/// `InvalidArgument` for collection ID 0, `NotFound` when the collection
/// record is absent; store errors propagate. No mutation is planned on error.
pub async fn plan_collection_removal(
    accessor: &MetaAccessor,
    collection_id: CollectionId,
) -> CoreResult<CollectionDependents> {
    if collection_id.is_unset() {
        return Err(CoreError::invalid_argument("collection id must be provided"));
    }

    let collection = accessor.get_collection(collection_id).await?;
    let scope = KeyScope::Collection(collection_id);
    let layout = accessor.layout();

    let partitions = accessor.list_partitions(scope).await?;
    let segments = accessor.list_segments(scope).await?;
    let indexes = accessor.list_field_indexes(scope).await?;
    let channels = accessor.list_channels(scope).await?;

    let mut plan = RepairPlan::new();
    let partitions_n = delete_all(&mut plan, layout, &partitions, EntityKind::Partition, collection_id, |p| {
        p.partition_id.to_string()
    });
    let segments_n = delete_all(&mut plan, layout, &segments, EntityKind::Segment, collection_id, |s| {
        s.segment_id.to_string()
    });
    let indexes_n = delete_all(&mut plan, layout, &indexes, EntityKind::FieldIndex, collection_id, |i| {
        i.index_id.to_string()
    });
    let channels_n = delete_all(&mut plan, layout, &channels, EntityKind::Channel, collection_id, |c| {
        c.channel_name.clone()
    });
    plan.push(Mutation::delete(
        &collection,
        EntityRef::new(EntityKind::Collection, &collection.key, collection_id, collection_id),
    ));

    let undecodable = partitions.skipped() + segments.skipped() + indexes.skipped() + channels.skipped();
    info!(
        collection_id = %collection_id,
        name = collection.value.name(),
        partitions = partitions_n,
        segments = segments_n,
        field_indexes = indexes_n,
        channels = channels_n,
        undecodable,
        "planned collection removal"
    );

    Ok(CollectionDependents {
        collection,
        partitions: partitions_n,
        segments: segments_n,
        field_indexes: indexes_n,
        channels: channels_n,
        undecodable,
        plan,
    })
}
