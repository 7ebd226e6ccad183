//! Operator commands over the accessor, detectors and planner.

use std::collections::BTreeMap;

use tracing::{info, warn};

use metascope_core::{Collection, CollectionId, CoreResult, Segment, Session};
use metascope_metadata::{
    filter, group_by_collection, CollectionFilter, KeyScope, ListResult, MetaAccessor,
    SegmentFilter, Stored,
};

use crate::cascade::{plan_collection_removal, CollectionDependents};
use crate::detect::{
    detect_dirty_importing, detect_index_param_drift, detect_key_parent_mismatch,
    detect_legacy_index_types, detect_legacy_vchannels, Finding,
};
use crate::plan::{apply, plan, AppliedResult, ApplyOptions, RepairPlan};

/// Result of a detect-plan-apply command.
#[derive(Debug)]
pub struct RepairOutcome {
    pub findings: Vec<Finding>,
    pub plan: RepairPlan,
    pub applied: AppliedResult,
    /// Values skipped as undecodable while listing.
    pub skipped: usize,
    /// Findings still detected after an authorized run.
    pub remaining: Option<usize>,
}

#[derive(Debug)]
pub struct RemovalOutcome {
    pub dependents: CollectionDependents,
    pub applied: AppliedResult,
}

/// Segments matching a filter, grouped by collection.
#[derive(Debug, Default)]
pub struct SegmentListing {
    pub groups: BTreeMap<CollectionId, Vec<Stored<Segment>>>,
    pub skipped: usize,
}

impl SegmentListing {
    pub fn total(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

/// Command entry points; each runs sequentially against one accessor.
#[derive(Clone)]
pub struct Console {
    accessor: MetaAccessor,
    guard_revisions: bool,
}

impl Console {
    pub fn new(accessor: MetaAccessor, guard_revisions: bool) -> Self {
        Self {
            accessor,
            guard_revisions,
        }
    }

    pub fn accessor(&self) -> &MetaAccessor {
        &self.accessor
    }

    fn options(&self, run: bool) -> ApplyOptions {
        if run {
            ApplyOptions::execute(self.guard_revisions)
        } else {
            ApplyOptions::dry_run()
        }
    }

    /// `remove collection`: deletes a collection with every dependent record.
    pub async fn remove_collection(&self, collection_id: CollectionId, run: bool) -> CoreResult<RemovalOutcome> {
        let dependents = plan_collection_removal(&self.accessor, collection_id).await?;
        let applied = apply(&self.accessor, dependents.plan(), self.options(run)).await;
        for failure in &applied.failed {
            warn!(entity = %failure.mutation.entity, error = %failure.error, "failed to remove");
        }
        Ok(RemovalOutcome {
            dependents,
            applied,
        })
    }

    /// `remove dirty-importing-segment`: zero-row importing segments older than `ts`.
    pub async fn remove_dirty_importing_segments(
        &self,
        collection_id: CollectionId,
        ts: u64,
        run: bool,
    ) -> CoreResult<RepairOutcome> {
        let scope = KeyScope::collection(collection_id);
        let segments = self.accessor.list_segments(scope).await?;
        let findings = detect_dirty_importing(&segments.entities, ts);
        let mut outcome = self.execute(findings, segments.skipped(), run).await;
        if run {
            let after = self.accessor.list_segments(scope).await?;
            outcome.remaining = Some(detect_dirty_importing(&after.entities, ts).len());
        }
        Ok(outcome)
    }

    /// `repair index-params`: strips unrecognized DISKANN/HNSW params.
    pub async fn repair_index_params(&self, collection_id: CollectionId, run: bool) -> CoreResult<RepairOutcome> {
        let scope = KeyScope::collection(collection_id);
        let indexes = self.accessor.list_field_indexes(scope).await?;
        let findings = detect_index_param_drift(&indexes.entities)?;
        let mut outcome = self.execute(findings, indexes.skipped(), run).await;
        if run {
            let after = self.accessor.list_field_indexes(scope).await?;
            outcome.remaining = Some(detect_index_param_drift(&after.entities)?.len());
        }
        Ok(outcome)
    }

    /// `repair vchannel`: folds embedded segment records into ID lists.
    pub async fn repair_vchannels(&self, collection_id: CollectionId, run: bool) -> CoreResult<RepairOutcome> {
        let scope = KeyScope::collection(collection_id);
        let channels = self.accessor.list_channels(scope).await?;
        let findings = detect_legacy_vchannels(&channels.entities)?;
        let mut outcome = self.execute(findings, channels.skipped(), run).await;
        if run {
            let after = self.accessor.list_channels(scope).await?;
            outcome.remaining = Some(detect_legacy_vchannels(&after.entities)?.len());
        }
        Ok(outcome)
    }

    async fn execute(&self, findings: Vec<Finding>, skipped: usize, run: bool) -> RepairOutcome {
        for finding in &findings {
            info!(%finding, "detected");
        }
        let plan = plan(&findings);
        let applied = apply(&self.accessor, &plan, self.options(run)).await;
        RepairOutcome {
            findings,
            plan,
            applied,
            skipped,
            remaining: None,
        }
    }

    /// Report-only pass over every detector that needs no operator input.
    pub async fn check(&self, collection_id: CollectionId) -> CoreResult<Vec<Finding>> {
        let scope = KeyScope::collection(collection_id);
        let layout = self.accessor.layout();
        let collections = self.accessor.list_collections(scope).await?;
        let partitions = self.accessor.list_partitions(scope).await?;
        let segments = self.accessor.list_segments(scope).await?;
        let indexes = self.accessor.list_field_indexes(scope).await?;
        let channels = self.accessor.list_channels(scope).await?;

        let mut findings = detect_index_param_drift(&indexes.entities)?;
        findings.extend(detect_legacy_vchannels(&channels.entities)?);
        findings.extend(detect_legacy_index_types(&indexes.entities, &collections.entities));
        findings.extend(detect_key_parent_mismatch(layout, &partitions.entities));
        findings.extend(detect_key_parent_mismatch(layout, &segments.entities));
        findings.extend(detect_key_parent_mismatch(layout, &indexes.entities));
        findings.extend(detect_key_parent_mismatch(layout, &channels.entities));
        Ok(findings)
    }

    pub async fn show_collections(&self, predicate: &CollectionFilter) -> CoreResult<ListResult<Collection>> {
        let scope = predicate.collection_id.map_or(KeyScope::All, KeyScope::collection);
        let listed = self.accessor.list_collections(scope).await?;
        Ok(ListResult {
            entities: filter(listed.entities, predicate),
            undecodable: listed.undecodable,
        })
    }

    pub async fn show_segments(&self, predicate: &SegmentFilter) -> CoreResult<SegmentListing> {
        let scope = match (predicate.collection_id, predicate.partition_id) {
            (Some(c), Some(p)) => KeyScope::Partition(c, p),
            (Some(c), None) => KeyScope::Collection(c),
            _ => KeyScope::All,
        };
        let listed = self.accessor.list_segments(scope).await?;
        Ok(SegmentListing {
            skipped: listed.skipped(),
            groups: group_by_collection(filter(listed.entities, predicate)),
        })
    }

    pub async fn show_sessions(&self) -> CoreResult<ListResult<Session>> {
        crate::session::list_sessions(&self.accessor).await
    }

    /// `show legacy-indexes`: INVERTED/BITMAP indexes with their collection names.
    pub async fn show_legacy_indexes(&self) -> CoreResult<Vec<Finding>> {
        let collections = self.accessor.list_collections(KeyScope::All).await?;
        let indexes = self.accessor.list_field_indexes(KeyScope::All).await?;
        Ok(detect_legacy_index_types(
            &indexes.entities,
            &collections.entities,
        ))
    }
}
