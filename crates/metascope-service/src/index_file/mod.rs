//! Interpretation of index files written by index nodes.
//!
//! The container format is decoded by an [`IndexFileDecoder`]
//! implementation ([`BinlogIndexDecoder`] for files written by the cluster);
//! this module only interprets what it yields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use metascope_core::CoreError;

mod binlog;

pub use binlog::BinlogIndexDecoder;

const INDEX_PARAMS_KEY: &str = "indexParams";
const SLICE_META_KEY: &str = "SLICE_META";

/// A decoded index file: the descriptor's extra JSON and the event payloads.
#[derive(Debug, Clone, Default)]
pub struct RawIndexFile {
    pub extra: serde_json::Map<String, serde_json::Value>,
    pub payloads: Vec<Vec<u8>>,
}

/// Opaque codec for the index binlog container.
pub trait IndexFileDecoder {
    fn decode(&self, raw: &[u8]) -> Result<RawIndexFile, IndexFileError>;
}

#[derive(Debug, Error)]
pub enum IndexFileError {
    #[error("index file codec error: {0}")]
    Codec(String),

    #[error("index file descriptor has no `key` entry")]
    MissingKey,

    #[error("{key} file carries {count} payloads, expected 1")]
    PayloadCount { key: String, count: usize },

    #[error("slice meta lists {0} items, expected 1")]
    SliceCount(usize),

    #[error("malformed {key} payload: {source}")]
    Payload {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<IndexFileError> for CoreError {
    fn from(err: IndexFileError) -> Self {
        CoreError::SerializationError(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceMetaItem {
    pub name: String,
    pub slice_num: i64,
    #[serde(rename = "total_len")]
    pub total_length: i64,
}

#[derive(Debug, Deserialize)]
struct SliceMetaFile {
    meta: Vec<SliceMetaItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IndexFileContent {
    IndexParams(BTreeMap<String, String>),
    SliceMeta(SliceMetaItem),
    /// Any other key is a slice of index data and is not interpreted.
    IndexData { key: String },
}

fn single_payload(key: &str, mut payloads: Vec<Vec<u8>>) -> Result<Vec<u8>, IndexFileError> {
    if payloads.len() != 1 {
        return Err(IndexFileError::PayloadCount {
            key: key.to_string(),
            count: payloads.len(),
        });
    }
    Ok(payloads.remove(0))
}

/// Decodes `raw` and classifies it by the descriptor's `key`.
pub fn inspect(decoder: &dyn IndexFileDecoder, raw: &[u8]) -> Result<IndexFileContent, IndexFileError> {
    let file = decoder.decode(raw)?;
    let key = file
        .extra
        .get("key")
        .and_then(serde_json::Value::as_str)
        .ok_or(IndexFileError::MissingKey)?
        .to_string();

    match key.as_str() {
        INDEX_PARAMS_KEY => {
            let payload = single_payload(&key, file.payloads)?;
            let params = serde_json::from_slice(&payload)
                .map_err(|source| IndexFileError::Payload { key, source })?;
            Ok(IndexFileContent::IndexParams(params))
        }
        SLICE_META_KEY => {
            let payload = single_payload(&key, file.payloads)?;
            let mut meta: SliceMetaFile = serde_json::from_slice(&payload)
                .map_err(|source| IndexFileError::Payload { key, source })?;
            if meta.meta.len() != 1 {
                return Err(IndexFileError::SliceCount(meta.meta.len()));
            }
            Ok(IndexFileContent::SliceMeta(meta.meta.remove(0)))
        }
        _ => Ok(IndexFileContent::IndexData { key }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Test codec: the raw bytes are the JSON of `{"extra": {...}, "payloads": [str...]}`.
    struct JsonCodec;

    impl IndexFileDecoder for JsonCodec {
        fn decode(&self, raw: &[u8]) -> Result<RawIndexFile, IndexFileError> {
            let value: serde_json::Value =
                serde_json::from_slice(raw).map_err(|err| IndexFileError::Codec(err.to_string()))?;
            let extra = value["extra"].as_object().cloned().unwrap_or_default();
            let payloads = value["payloads"]
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| item.as_str())
                        .map(|s| s.as_bytes().to_vec())
                        .collect()
                })
                .unwrap_or_default();
            Ok(RawIndexFile { extra, payloads })
        }
    }

    fn file(key: &str, payloads: &[&str]) -> Vec<u8> {
        serde_json::to_vec(&json!({ "extra": { "key": key }, "payloads": payloads })).unwrap()
    }

    #[test]
    fn interprets_index_params() {
        let raw = file("indexParams", &[r#"{"index_type":"HNSW","M":"16"}"#]);
        let IndexFileContent::IndexParams(params) = inspect(&JsonCodec, &raw).unwrap() else {
            panic!("expected params");
        };
        assert_eq!(params["M"], "16");
    }

    #[test]
    fn slice_meta_requires_exactly_one_item() {
        let one = file(
            "SLICE_META",
            &[r#"{"meta":[{"name":"HNSW","slice_num":3,"total_len":1024}]}"#],
        );
        assert_eq!(
            inspect(&JsonCodec, &one).unwrap(),
            IndexFileContent::SliceMeta(SliceMetaItem {
                name: "HNSW".into(),
                slice_num: 3,
                total_length: 1024,
            })
        );

        let two = file(
            "SLICE_META",
            &[r#"{"meta":[{"name":"a","slice_num":1,"total_len":1},{"name":"b","slice_num":1,"total_len":1}]}"#],
        );
        assert!(matches!(
            inspect(&JsonCodec, &two),
            Err(IndexFileError::SliceCount(2))
        ));
    }

    #[test]
    fn other_keys_are_index_data() {
        let raw = file("HNSW_0", &["opaque", "bytes"]);
        assert_eq!(
            inspect(&JsonCodec, &raw).unwrap(),
            IndexFileContent::IndexData { key: "HNSW_0".into() }
        );
    }

    #[test]
    fn params_need_a_single_payload() {
        let raw = file("indexParams", &[]);
        assert!(matches!(
            inspect(&JsonCodec, &raw),
            Err(IndexFileError::PayloadCount { count: 0, .. })
        ));
    }
}
