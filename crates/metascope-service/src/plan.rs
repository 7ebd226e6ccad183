//! Repair plans and their gated application.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use tracing::{debug, error, info};

use metascope_core::{CoreError, CoreResult, EntityKind};
use metascope_metadata::MetaAccessor;

use crate::detect::{Finding, Mutation, MutationOp};

/// Ordered, key-unique list of mutations, computed before any write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairPlan {
    mutations: Vec<Mutation>,
    keys: HashSet<String>,
    summary: BTreeMap<EntityKind, usize>,
}

impl RepairPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `mutation` unless its key is already planned. Returns whether it was added.
    pub fn push(&mut self, mutation: Mutation) -> bool {
        if !self.keys.insert(mutation.key.clone()) {
            debug!(key = %mutation.key, "mutation already planned, keeping the first");
            return false;
        }
        *self.summary.entry(mutation.entity.kind).or_default() += 1;
        self.mutations.push(mutation);
        true
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    /// Planned mutation count per entity kind.
    pub fn summary(&self) -> &BTreeMap<EntityKind, usize> {
        &self.summary
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.summary.get(&kind).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }
}

impl FromIterator<Mutation> for RepairPlan {
    fn from_iter<I: IntoIterator<Item = Mutation>>(iter: I) -> Self {
        let mut plan = Self::new();
        for mutation in iter {
            plan.push(mutation);
        }
        plan
    }
}

impl fmt::Display for RepairPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("nothing to do");
        }
        let parts: Vec<String> = self
            .summary
            .iter()
            .map(|(kind, count)| format!("{count} {kind}"))
            .collect();
        write!(f, "{} mutation(s): {}", self.len(), parts.join(", "))
    }
}

/// Collects the proposed mutations of repairable findings.
pub fn plan(findings: &[Finding]) -> RepairPlan {
    findings
        .iter()
        .filter_map(|finding| finding.mutation.clone())
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Without authorization nothing is written.
    pub authorized: bool,
    /// Use compare-and-swap against the revision each mutation was planned from.
    pub guard_revisions: bool,
}

impl ApplyOptions {
    pub fn dry_run() -> Self {
        Self::default()
    }

    pub fn execute(guard_revisions: bool) -> Self {
        Self {
            authorized: true,
            guard_revisions,
        }
    }
}

#[derive(Debug)]
pub struct FailedMutation {
    pub mutation: Mutation,
    pub error: CoreError,
}

/// Per-mutation outcome of [`apply`].
#[derive(Debug, Default)]
pub struct AppliedResult {
    pub succeeded: Vec<Mutation>,
    pub failed: Vec<FailedMutation>,
    /// Set when nothing was written because the run was not authorized.
    pub dry_run: bool,
}

impl AppliedResult {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Turns any failed mutation into `PartialApply`.
    pub fn into_result(self) -> CoreResult<Self> {
        if self.failed.is_empty() {
            Ok(self)
        } else {
            Err(CoreError::PartialApply {
                failed: self.failed.len(),
                total: self.total(),
            })
        }
    }
}

/// Applies `plan` one mutation at a time, continuing past failures.
///
/// Unauthorized runs issue no store calls. There is no rollback; callers
/// should re-list to observe the resulting state.
pub async fn apply(accessor: &MetaAccessor, plan: &RepairPlan, options: ApplyOptions) -> AppliedResult {
    if !options.authorized {
        info!(planned = plan.len(), "dry run, no mutations applied");
        return AppliedResult {
            dry_run: true,
            ..AppliedResult::default()
        };
    }

    let mut result = AppliedResult::default();
    for mutation in plan.mutations() {
        match apply_one(accessor, mutation, options.guard_revisions).await {
            Ok(()) => {
                debug!(entity = %mutation.entity, op = %mutation, "mutation applied");
                result.succeeded.push(mutation.clone());
            }
            Err(err) => {
                error!(entity = %mutation.entity, op = %mutation, error = %err, "mutation failed");
                result.failed.push(FailedMutation {
                    mutation: mutation.clone(),
                    error: err,
                });
            }
        }
    }

    info!(
        succeeded = result.succeeded.len(),
        failed = result.failed.len(),
        "repair plan applied"
    );
    result
}

async fn apply_one(accessor: &MetaAccessor, mutation: &Mutation, guarded: bool) -> CoreResult<()> {
    match (&mutation.op, guarded) {
        (MutationOp::Put(value), false) => accessor.put(&mutation.key, value.clone()).await.map(|_| ()),
        (MutationOp::Put(value), true) => accessor
            .guarded_put(&mutation.key, value.clone(), mutation.expected_revision)
            .await
            .map(|_| ()),
        (MutationOp::Delete, false) => accessor.delete(&mutation.key).await.map(|_| ()),
        (MutationOp::Delete, true) => accessor
            .guarded_delete(&mutation.key, mutation.expected_revision)
            .await
            .map(|_| ()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{EntityRef, Evidence, FindingKind};
    use bytes::Bytes;
    use metascope_core::CollectionId;

    fn mutation(kind: EntityKind, key: &str, op: MutationOp) -> Mutation {
        Mutation {
            key: key.into(),
            op,
            expected_revision: 1,
            entity: EntityRef::new(kind, key, CollectionId::new(1), key),
        }
    }

    #[test]
    fn deduplicates_by_key_keeping_the_first() {
        let plan: RepairPlan = [
            mutation(EntityKind::Segment, "a", MutationOp::Delete),
            mutation(EntityKind::Segment, "a", MutationOp::Put(Bytes::from_static(b"x"))),
            mutation(EntityKind::Partition, "b", MutationOp::Delete),
        ]
        .into_iter()
        .collect();

        assert_eq!(plan.len(), 2);
        assert!(plan.mutations()[0].is_delete());
        assert_eq!(plan.count(EntityKind::Segment), 1);
        assert_eq!(plan.count(EntityKind::Partition), 1);
        assert_eq!(plan.to_string(), "2 mutation(s): 1 partition, 1 segment");
    }

    #[test]
    fn report_only_findings_contribute_nothing() {
        let entity = EntityRef::new(EntityKind::FieldIndex, "k", CollectionId::new(1), 3);
        let findings = vec![Finding {
            entity,
            kind: FindingKind::KeyParentMismatch,
            evidence: Evidence::KeyParentMismatch {
                key_collection: CollectionId::new(1),
                record_collection: CollectionId::new(2),
            },
            mutation: None,
        }];
        assert!(plan(&findings).is_empty());
    }

    #[test]
    fn failures_become_partial_apply() {
        let failed = AppliedResult {
            succeeded: vec![mutation(EntityKind::Segment, "a", MutationOp::Delete)],
            failed: vec![FailedMutation {
                mutation: mutation(EntityKind::Segment, "b", MutationOp::Delete),
                error: CoreError::transport("connection reset"),
            }],
            dry_run: false,
        };
        assert!(matches!(
            failed.into_result(),
            Err(CoreError::PartialApply { failed: 1, total: 2 })
        ));
        assert!(AppliedResult::default().into_result().is_ok());
    }
}
