use serde::{Deserialize, Serialize};

use crate::ids::{CollectionId, FieldId, IndexId};

/// Parameter key carrying the index algorithm name.
pub const INDEX_TYPE_KEY: &str = "index_type";

/// Ordered key/value parameter as stored in index metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyValuePair {
    pub key: String,
    pub value: String,
}

impl KeyValuePair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Returns the value of the last pair with `key`; later pairs override earlier ones.
#[must_use]
pub fn find_param<'a>(pairs: &'a [KeyValuePair], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .rfind(|pair| pair.key == key)
        .map(|pair| pair.value.as_str())
}

/// Build state of a field index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexState {
    None,
    Unissued,
    InProgress,
    Finished,
    Failed,
    Retry,
}

impl IndexState {
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Self::Unissued,
            2 => Self::InProgress,
            3 => Self::Finished,
            4 => Self::Failed,
            5 => Self::Retry,
            _ => Self::None,
        }
    }

    #[must_use]
    pub const fn as_raw(&self) -> i32 {
        match self {
            Self::None => 0,
            Self::Unissued => 1,
            Self::InProgress => 2,
            Self::Finished => 3,
            Self::Failed => 4,
            Self::Retry => 5,
        }
    }
}

impl Default for IndexState {
    fn default() -> Self {
        Self::None
    }
}

/// Normalized field index record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldIndex {
    pub collection_id: CollectionId,
    pub field_id: FieldId,
    pub index_id: IndexId,
    pub index_name: String,
    pub type_params: Vec<KeyValuePair>,
    pub index_params: Vec<KeyValuePair>,
    pub user_index_params: Vec<KeyValuePair>,
    pub indexed_rows: i64,
    pub total_rows: i64,
    pub state: IndexState,
    pub fail_reason: String,
    pub is_auto_index: bool,
    pub deleted: bool,
    pub create_time: u64,
}

impl FieldIndex {
    /// Algorithm declared in the build parameters (e.g. `DISKANN`).
    #[must_use]
    pub fn index_type(&self) -> Option<&str> {
        find_param(&self.index_params, INDEX_TYPE_KEY)
    }

    /// Algorithm declared in the type parameters; scalar indexes of older releases put it here.
    #[must_use]
    pub fn type_param_index_type(&self) -> Option<&str> {
        find_param(&self.type_params, INDEX_TYPE_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_type_reads_build_params() {
        let index = FieldIndex {
            index_params: vec![
                KeyValuePair::new("metric_type", "L2"),
                KeyValuePair::new(INDEX_TYPE_KEY, "HNSW"),
            ],
            type_params: vec![KeyValuePair::new(INDEX_TYPE_KEY, "INVERTED")],
            ..FieldIndex::default()
        };
        assert_eq!(index.index_type(), Some("HNSW"));
        assert_eq!(index.type_param_index_type(), Some("INVERTED"));
        assert_eq!(find_param(&index.index_params, "dim"), None);
    }

    #[test]
    fn repeated_keys_resolve_to_the_last_pair() {
        let pairs = vec![
            KeyValuePair::new(INDEX_TYPE_KEY, "IVF_FLAT"),
            KeyValuePair::new("nlist", "128"),
            KeyValuePair::new(INDEX_TYPE_KEY, "HNSW"),
        ];
        assert_eq!(find_param(&pairs, INDEX_TYPE_KEY), Some("HNSW"));
    }
}
