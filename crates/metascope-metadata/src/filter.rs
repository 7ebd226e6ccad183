//! Predicate selection and grouping over listed entities.

use std::collections::BTreeMap;

use metascope_core::{
    Collection, CollectionId, CollectionState, CoreResult, DatabaseId, FieldIndex, Partition,
    PartitionId, Segment, SegmentId, SegmentLevel, SegmentState, VChannelInfo,
};

use crate::accessor::Stored;

/// A test applied to one decoded entity.
pub trait Predicate<T> {
    fn matches(&self, value: &T) -> bool;
}

impl<T, F> Predicate<T> for F
where
    F: Fn(&T) -> bool,
{
    fn matches(&self, value: &T) -> bool {
        self(value)
    }
}

/// Keeps the entities accepted by `predicate`, preserving order.
pub fn filter<T, P>(entities: impl IntoIterator<Item = Stored<T>>, predicate: &P) -> Vec<Stored<T>>
where
    P: Predicate<T> + ?Sized,
{
    entities
        .into_iter()
        .filter(|stored| predicate.matches(&stored.value))
        .collect()
}

/// Entities owned by a single collection.
pub trait CollectionScoped {
    fn owner(&self) -> CollectionId;
}

impl CollectionScoped for Collection {
    fn owner(&self) -> CollectionId {
        self.collection_id
    }
}

impl CollectionScoped for Partition {
    fn owner(&self) -> CollectionId {
        self.collection_id
    }
}

impl CollectionScoped for Segment {
    fn owner(&self) -> CollectionId {
        self.collection_id
    }
}

impl CollectionScoped for FieldIndex {
    fn owner(&self) -> CollectionId {
        self.collection_id
    }
}

impl CollectionScoped for VChannelInfo {
    fn owner(&self) -> CollectionId {
        self.collection_id
    }
}

/// Groups entities by owning collection, iterated in ascending collection ID.
/// Order within a group follows the input.
pub fn group_by_collection<T: CollectionScoped>(
    entities: impl IntoIterator<Item = Stored<T>>,
) -> BTreeMap<CollectionId, Vec<Stored<T>>> {
    let mut groups: BTreeMap<CollectionId, Vec<Stored<T>>> = BTreeMap::new();
    for stored in entities {
        groups.entry(stored.value.owner()).or_default().push(stored);
    }
    groups
}

/// Conjunction of optional segment constraints; `None` means unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentFilter {
    pub collection_id: Option<CollectionId>,
    pub partition_id: Option<PartitionId>,
    pub segment_id: Option<SegmentId>,
    pub state: Option<SegmentState>,
    pub level: Option<SegmentLevel>,
    /// Exclusive upper bound on the segment's effective timestamp.
    pub max_ts: Option<u64>,
}

impl SegmentFilter {
    /// Builds a filter from operator input where zero IDs and empty names mean unset.
    ///
    /// State and level names match case-insensitively.
    pub fn from_args(
        collection_id: i64,
        partition_id: i64,
        segment_id: i64,
        state: Option<&str>,
        level: Option<&str>,
        max_ts: u64,
    ) -> CoreResult<Self> {
        let state = match state.map(str::trim).filter(|s| !s.is_empty()) {
            Some(name) => Some(name.parse::<SegmentState>()?),
            None => None,
        };
        let level = match level.map(str::trim).filter(|s| !s.is_empty()) {
            Some(name) => Some(name.parse::<SegmentLevel>()?),
            None => None,
        };
        Ok(Self {
            collection_id: nonzero(collection_id).map(CollectionId::new),
            partition_id: nonzero(partition_id).map(PartitionId::new),
            segment_id: nonzero(segment_id).map(SegmentId::new),
            state,
            level,
            max_ts: (max_ts != 0).then_some(max_ts),
        })
    }

    #[must_use]
    pub fn collection(mut self, collection_id: CollectionId) -> Self {
        self.collection_id = Some(collection_id);
        self
    }

    #[must_use]
    pub fn state(mut self, state: SegmentState) -> Self {
        self.state = Some(state);
        self
    }

    #[must_use]
    pub fn max_ts(mut self, max_ts: u64) -> Self {
        self.max_ts = Some(max_ts);
        self
    }
}

fn nonzero(raw: i64) -> Option<i64> {
    (raw != 0).then_some(raw)
}

impl Predicate<Segment> for SegmentFilter {
    fn matches(&self, segment: &Segment) -> bool {
        self.collection_id.map_or(true, |id| segment.collection_id == id)
            && self.partition_id.map_or(true, |id| segment.partition_id == id)
            && self.segment_id.map_or(true, |id| segment.segment_id == id)
            && self.state.map_or(true, |state| segment.state == state)
            && self.level.map_or(true, |level| segment.level == level)
            && self.max_ts.map_or(true, |ts| segment.effective_ts() < ts)
    }
}

/// Conjunction of optional collection constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionFilter {
    pub collection_id: Option<CollectionId>,
    pub database_id: Option<DatabaseId>,
    /// Case-sensitive substring of the collection name.
    pub name_contains: Option<String>,
    pub state: Option<CollectionState>,
}

impl Predicate<Collection> for CollectionFilter {
    fn matches(&self, collection: &Collection) -> bool {
        self.collection_id
            .map_or(true, |id| collection.collection_id == id)
            && self
                .database_id
                .map_or(true, |id| collection.database_id == id)
            && self
                .name_contains
                .as_deref()
                .map_or(true, |needle| collection.name().contains(needle))
            && self.state.map_or(true, |state| collection.state == state)
    }
}
