//! Binlog container used by index nodes for index files.
//!
//! Layout (all integers little-endian):
//! `magic:i32`, then a descriptor event, then index file events. Every event
//! starts with `timestamp:u64 type:i8 length:i32 next_position:i32`, where
//! `length` covers the header. The descriptor body is a fixed part of IDs,
//! timestamps and the payload type, a list of per-event post-header lengths,
//! then `extra_length:i32` and that many bytes of JSON. An index file event
//! body is `start_ts:u64 end_ts:u64` followed by a parquet payload holding one
//! binary or string column.

use arrow::array::{Array, BinaryArray, StringArray};
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::{IndexFileDecoder, IndexFileError, RawIndexFile};

const MAGIC_NUMBER: i32 = 0x00ff_fabc;
const HEADER_LEN: usize = 17;
const DESCRIPTOR_FIX_LEN: usize = 52;
const INDEX_EVENT_FIX_LEN: usize = 16;
const DESCRIPTOR_EVENT: i8 = 0;
const INDEX_FILE_EVENT: i8 = 7;

/// Decodes index files as written by the cluster.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinlogIndexDecoder;

fn codec(message: impl std::fmt::Display) -> IndexFileError {
    IndexFileError::Codec(message.to_string())
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], IndexFileError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| codec(format!("truncated at byte {} (wanted {len} more)", self.pos)))?;
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_i32(&mut self) -> Result<i32, IndexFileError> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.take(4)?);
        Ok(i32::from_le_bytes(raw))
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }
}

struct EventHeader {
    type_code: i8,
    length: usize,
}

impl EventHeader {
    fn read(reader: &mut Reader<'_>) -> Result<Self, IndexFileError> {
        let start = reader.pos;
        reader.take(8)?;
        let type_code = i8::from_le_bytes([reader.take(1)?[0]]);
        let length = reader.read_i32()?;
        reader.read_i32()?;
        let length = usize::try_from(length)
            .ok()
            .filter(|&len| len >= HEADER_LEN)
            .ok_or_else(|| codec(format!("event at byte {start} has invalid length {length}")))?;
        Ok(Self { type_code, length })
    }

    fn body_len(&self) -> usize {
        self.length - HEADER_LEN
    }
}

/// Finds `extra_length:i32` after the post-header length list, whose size
/// differs between releases: the extras always run to the end of the body.
fn descriptor_extra(rest: &[u8]) -> Result<&[u8], IndexFileError> {
    (0..rest.len().saturating_sub(3))
        .find_map(|at| {
            let mut raw = [0u8; 4];
            raw.copy_from_slice(&rest[at..at + 4]);
            let len = usize::try_from(i32::from_le_bytes(raw)).ok()?;
            (at + 4 + len == rest.len()).then(|| &rest[at + 4..])
        })
        .ok_or_else(|| codec("descriptor event has no extra section"))
}

fn payload_values(data: &[u8]) -> Result<Vec<Vec<u8>>, IndexFileError> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(Bytes::copy_from_slice(data))
        .map_err(|e| codec(format!("invalid parquet payload: {e}")))?
        .build()
        .map_err(|e| codec(format!("invalid parquet payload: {e}")))?;

    let mut values = Vec::new();
    for batch in reader {
        let batch = batch.map_err(|e| codec(format!("cannot read payload batch: {e}")))?;
        if batch.num_columns() != 1 {
            return Err(codec(format!("payload has {} columns, expected 1", batch.num_columns())));
        }
        let column = batch.column(0);
        if let Some(array) = column.as_any().downcast_ref::<BinaryArray>() {
            values.extend(array.iter().map(|v| v.unwrap_or_default().to_vec()));
        } else if let Some(array) = column.as_any().downcast_ref::<StringArray>() {
            values.extend(array.iter().map(|v| v.unwrap_or_default().as_bytes().to_vec()));
        } else {
            return Err(codec(format!("unsupported payload column type {}", column.data_type())));
        }
    }
    Ok(values)
}

impl IndexFileDecoder for BinlogIndexDecoder {
    fn decode(&self, raw: &[u8]) -> Result<RawIndexFile, IndexFileError> {
        let mut reader = Reader { buf: raw, pos: 0 };
        let magic = reader.read_i32()?;
        if magic != MAGIC_NUMBER {
            return Err(codec(format!("bad magic number {magic:#x}")));
        }

        let header = EventHeader::read(&mut reader)?;
        if header.type_code != DESCRIPTOR_EVENT {
            return Err(codec(format!("first event has type {}, expected descriptor", header.type_code)));
        }
        let body = reader.take(header.body_len())?;
        let rest = body
            .get(DESCRIPTOR_FIX_LEN..)
            .ok_or_else(|| codec("descriptor event is shorter than its fixed part"))?;
        let extra_bytes = descriptor_extra(rest)?;
        let extra = serde_json::from_slice(extra_bytes)
            .map_err(|e| codec(format!("descriptor extras are not a JSON object: {e}")))?;

        let mut payloads = Vec::new();
        while !reader.is_empty() {
            let header = EventHeader::read(&mut reader)?;
            if header.type_code != INDEX_FILE_EVENT {
                return Err(codec(format!("unexpected event type {} in index file", header.type_code)));
            }
            let body = reader.take(header.body_len())?;
            let data = body
                .get(INDEX_EVENT_FIX_LEN..)
                .ok_or_else(|| codec("index file event is shorter than its fixed part"))?;
            payloads.extend(payload_values(data)?);
        }

        Ok(RawIndexFile { extra, payloads })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{ArrayRef, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use serde_json::json;

    use super::*;
    use crate::index_file::{inspect, IndexFileContent};

    fn parquet_strings(values: &[&str]) -> Vec<u8> {
        let schema = Arc::new(Schema::new(vec![Field::new("val", DataType::Utf8, false)]));
        let column: ArrayRef = Arc::new(StringArray::from(values.to_vec()));
        let batch = RecordBatch::try_new(schema.clone(), vec![column]).unwrap();
        let mut buffer = Vec::new();
        let mut writer = ArrowWriter::try_new(&mut buffer, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        buffer
    }

    fn event_header(out: &mut Vec<u8>, type_code: i8, length: usize) {
        let next = out.len() + length;
        out.extend(7u64.to_le_bytes());
        out.extend(type_code.to_le_bytes());
        out.extend(i32::try_from(length).unwrap().to_le_bytes());
        out.extend(i32::try_from(next).unwrap().to_le_bytes());
    }

    /// Builds an index file with one event per payload.
    fn index_file(key: &str, payloads: &[&[&str]]) -> Vec<u8> {
        let extra = serde_json::to_vec(&json!({ "key": key, "indexBuildID": 9 })).unwrap();
        let post_header_lengths = [16u8, 16, 16, 16, 16, 16, 16, 16];

        let mut out = MAGIC_NUMBER.to_le_bytes().to_vec();
        let descriptor_len = HEADER_LEN + DESCRIPTOR_FIX_LEN + post_header_lengths.len() + 4 + extra.len();
        event_header(&mut out, DESCRIPTOR_EVENT, descriptor_len);
        for id in [42i64, 1, 5, 100] {
            out.extend(id.to_le_bytes());
        }
        out.extend(0u64.to_le_bytes());
        out.extend(0u64.to_le_bytes());
        out.extend(21i32.to_le_bytes());
        out.extend(post_header_lengths);
        out.extend(i32::try_from(extra.len()).unwrap().to_le_bytes());
        out.extend(&extra);

        for values in payloads {
            let payload = parquet_strings(values);
            event_header(&mut out, INDEX_FILE_EVENT, HEADER_LEN + INDEX_EVENT_FIX_LEN + payload.len());
            out.extend([0u8; INDEX_EVENT_FIX_LEN]);
            out.extend(payload);
        }
        out
    }

    #[test]
    fn reads_descriptor_extras_and_payloads() {
        let raw = index_file("indexParams", &[&[r#"{"index_type":"HNSW","M":"16"}"#]]);
        let file = BinlogIndexDecoder.decode(&raw).unwrap();
        assert_eq!(file.extra["key"], "indexParams");
        assert_eq!(file.extra["indexBuildID"], 9);
        assert_eq!(file.payloads.len(), 1);

        let IndexFileContent::IndexParams(params) = inspect(&BinlogIndexDecoder, &raw).unwrap() else {
            panic!("expected params");
        };
        assert_eq!(params["index_type"], "HNSW");
    }

    #[test]
    fn payloads_of_every_event_are_collected() {
        let raw = index_file("HNSW_3", &[&["a", "b"], &["c"]]);
        let file = BinlogIndexDecoder.decode(&raw).unwrap();
        assert_eq!(file.payloads, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn rejects_foreign_and_truncated_files() {
        assert!(matches!(
            BinlogIndexDecoder.decode(b"PAR1 not a binlog"),
            Err(IndexFileError::Codec(_))
        ));

        let raw = index_file("SLICE_META", &[&["{}"]]);
        assert!(matches!(
            BinlogIndexDecoder.decode(&raw[..raw.len() - 5]),
            Err(IndexFileError::Codec(_))
        ));
    }
}
