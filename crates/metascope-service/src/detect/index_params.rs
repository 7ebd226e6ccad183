use metascope_core::{CoreResult, EntityKind, FieldIndex, KeyValuePair};
use metascope_metadata::{Stored, VersionedEntity};

use super::{EntityRef, Evidence, Finding, FindingKind, Mutation};

const DISKANN_PARAMS: &[&str] = &[
    "max_degree",
    "search_list_size",
    "pq_code_budget_gb",
    "build_dram_budget_gb",
    "disk_pq_dims",
    "partition_limit",
    "accelerate_build",
    "search_cache_budget_gb",
    "warm_up",
    "use_bfs_cache",
    "beamwidth",
    "min_k",
    "max_k",
    "search_list_and_k_ratio",
    "filter_threshold",
    "pq_code_budget_gb_ratio",
    "num_build_thread_ratio",
    "search_cache_budget_gb_ratio",
    "num_load_thread_ratio",
    "beamwidth_ratio",
];

const HNSW_PARAMS: &[&str] = &["M", "efConstruction", "ef", "seed_ef", "overview_levels"];

/// Params accepted by every tunable index type.
pub const SHARED_PARAMS: &[&str] = &[
    "index_type",
    "metric_type",
    "k",
    "num_build_thread",
    "retrieve_friendly",
    "data_path",
    "index_prefix",
    "build_quant_type",
    "search_quant_type",
    "radius",
    "range_filter",
    "trace_visit",
    "enable_mmap",
    "for_tuning",
];

/// Type-specific params of a tunable index type; `None` for types that are not checked.
pub fn allowed_params(index_type: &str) -> Option<&'static [&'static str]> {
    match index_type {
        "DISKANN" => Some(DISKANN_PARAMS),
        "HNSW" => Some(HNSW_PARAMS),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamClass {
    Allowed,
    Shared,
    Unrecognized,
}

impl ParamClass {
    fn of(allowed: &[&str], key: &str) -> Self {
        if allowed.contains(&key) {
            Self::Allowed
        } else if SHARED_PARAMS.contains(&key) {
            Self::Shared
        } else {
            Self::Unrecognized
        }
    }
}

/// DISKANN and HNSW indexes whose index params include keys outside the
/// type's allowed set and the shared set.
///
/// The proposed repair rewrites the index, in the generation it was read
/// with, keeping only recognized params in their original order.
pub fn detect_index_param_drift(indexes: &[Stored<FieldIndex>]) -> CoreResult<Vec<Finding>> {
    let mut findings = Vec::new();
    for stored in indexes {
        let index = &stored.value;
        let Some(index_type) = index.index_type() else {
            continue;
        };
        let Some(allowed) = allowed_params(index_type) else {
            continue;
        };

        let (kept, dropped): (Vec<KeyValuePair>, Vec<KeyValuePair>) = index
            .index_params
            .iter()
            .cloned()
            .partition(|pair| ParamClass::of(allowed, &pair.key) != ParamClass::Unrecognized);
        if dropped.is_empty() {
            continue;
        }

        let repaired = FieldIndex {
            index_params: kept,
            ..index.clone()
        };
        let entity = EntityRef::new(
            EntityKind::FieldIndex,
            &stored.key,
            index.collection_id,
            index.index_id,
        );
        findings.push(Finding {
            mutation: Some(Mutation::put(
                stored,
                repaired.encode_as(stored.version)?,
                entity.clone(),
            )),
            entity,
            kind: FindingKind::IndexParamDrift,
            evidence: Evidence::IndexParamDrift {
                index_type: index_type.to_string(),
                unrecognized: dropped.into_iter().map(|pair| pair.key).collect(),
            },
        });
    }
    Ok(findings)
}
