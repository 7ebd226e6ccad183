//! Per-generation mappings between stored protobuf records and normalized entities.

use metascope_core::{
    Binlog, Collection, CollectionId, CollectionSchema, CollectionState, CoreError, CoreResult,
    DataType, DatabaseId, EntityKind, FieldBinlog, FieldId, FieldIndex, FieldSchema, IndexId,
    IndexState, KeyValuePair, MetaVersion, Partition, PartitionId, PartitionState, Position,
    Segment, SegmentId, SegmentLevel, SegmentState, Session, VChannelInfo,
};
use metascope_proto::{common, v2_0, v2_2, Message};

use crate::decoder::{Attempt, VersionedEntity};
use crate::keys::KeyLayout;

fn parse<M: Message + Default>(raw: &[u8]) -> Result<M, String> {
    M::decode(raw).map_err(|err| err.to_string())
}

fn unsupported(kind: EntityKind, version: MetaVersion) -> CoreError {
    CoreError::invalid_argument(format!("{kind} records have no {version} layout"))
}

fn pairs_from(pairs: Vec<common::KeyValuePair>) -> Vec<KeyValuePair> {
    pairs
        .into_iter()
        .map(|p| KeyValuePair::new(p.key, p.value))
        .collect()
}

fn pairs_to(pairs: &[KeyValuePair]) -> Vec<common::KeyValuePair> {
    pairs
        .iter()
        .map(|p| common::KeyValuePair {
            key: p.key.clone(),
            value: p.value.clone(),
        })
        .collect()
}

fn position_from(position: Option<common::MsgPosition>) -> Option<Position> {
    position.map(|p| Position {
        channel_name: p.channel_name,
        msg_id: p.msg_id,
        msg_group: p.msg_group,
        timestamp: p.timestamp,
    })
}

fn position_to(position: &Option<Position>) -> Option<common::MsgPosition> {
    position.as_ref().map(|p| common::MsgPosition {
        channel_name: p.channel_name.clone(),
        msg_id: p.msg_id.clone(),
        msg_group: p.msg_group.clone(),
        timestamp: p.timestamp,
    })
}

fn schema_from(schema: common::CollectionSchema) -> CollectionSchema {
    CollectionSchema {
        name: schema.name,
        description: schema.description,
        auto_id: schema.auto_id,
        fields: schema
            .fields
            .into_iter()
            .map(|f| FieldSchema {
                field_id: FieldId::new(f.field_id),
                name: f.name,
                data_type: DataType::from_raw(f.data_type),
                is_primary_key: f.is_primary_key,
                auto_id: f.auto_id,
                description: f.description,
            })
            .collect(),
    }
}

fn schema_to(schema: &CollectionSchema) -> common::CollectionSchema {
    common::CollectionSchema {
        name: schema.name.clone(),
        description: schema.description.clone(),
        auto_id: schema.auto_id,
        fields: schema
            .fields
            .iter()
            .map(|f| common::FieldSchema {
                field_id: f.field_id.get(),
                name: f.name.clone(),
                is_primary_key: f.is_primary_key,
                description: f.description.clone(),
                data_type: f.data_type.as_raw(),
                type_params: Vec::new(),
                index_params: Vec::new(),
                auto_id: f.auto_id,
            })
            .collect(),
    }
}

impl VersionedEntity for Collection {
    const KIND: EntityKind = EntityKind::Collection;
    const PRECEDENCE: &'static [MetaVersion] = &[MetaVersion::V2_2, MetaVersion::V2_0];

    fn decode_as(version: MetaVersion, raw: &[u8]) -> Attempt<Self> {
        // The 2.0 layout is the 2.2 one without state and database ID.
        let (info, state, db_id) = match version {
            MetaVersion::V2_2 => match parse::<v2_2::CollectionInfo>(raw) {
                Ok(info) => {
                    let (state, db_id) = (info.state, info.db_id);
                    (
                        v2_0::CollectionInfo {
                            id: info.id,
                            schema: info.schema,
                            create_time: info.create_time,
                            partition_ids: info.partition_ids,
                            partition_names: info.partition_names,
                            virtual_channel_names: info.virtual_channel_names,
                            physical_channel_names: info.physical_channel_names,
                            shards_num: info.shards_num,
                        },
                        state,
                        db_id,
                    )
                }
                Err(err) => return Attempt::Rejected(err),
            },
            MetaVersion::V2_0 => match parse::<v2_0::CollectionInfo>(raw) {
                Ok(info) => (info, 0, 0),
                Err(err) => return Attempt::Rejected(err),
            },
        };

        let Some(schema) = info.schema.filter(|_| info.id != 0) else {
            return Attempt::Unpopulated;
        };

        Attempt::Accepted(Collection {
            collection_id: CollectionId::new(info.id),
            database_id: DatabaseId::new(db_id),
            schema: schema_from(schema),
            state: CollectionState::from_raw(state),
            create_time: info.create_time,
            shards_num: info.shards_num,
            virtual_channels: info.virtual_channel_names,
            physical_channels: info.physical_channel_names,
            legacy_partition_ids: info.partition_ids.into_iter().map(PartitionId::new).collect(),
            legacy_partition_names: info.partition_names,
        })
    }

    fn encode_as(&self, version: MetaVersion) -> CoreResult<Vec<u8>> {
        let partition_ids = self.legacy_partition_ids.iter().map(|p| p.get()).collect();
        Ok(match version {
            MetaVersion::V2_2 => v2_2::CollectionInfo {
                id: self.collection_id.get(),
                schema: Some(schema_to(&self.schema)),
                create_time: self.create_time,
                partition_ids,
                partition_names: self.legacy_partition_names.clone(),
                virtual_channel_names: self.virtual_channels.clone(),
                physical_channel_names: self.physical_channels.clone(),
                shards_num: self.shards_num,
                state: self.state.as_raw(),
                db_id: self.database_id.get(),
            }
            .encode_to_vec(),
            MetaVersion::V2_0 => v2_0::CollectionInfo {
                id: self.collection_id.get(),
                schema: Some(schema_to(&self.schema)),
                create_time: self.create_time,
                partition_ids,
                partition_names: self.legacy_partition_names.clone(),
                virtual_channel_names: self.virtual_channels.clone(),
                physical_channel_names: self.physical_channels.clone(),
                shards_num: self.shards_num,
            }
            .encode_to_vec(),
        })
    }

    fn store_key(&self, layout: &KeyLayout) -> String {
        layout.collection_key(self.collection_id)
    }
}

impl VersionedEntity for Partition {
    const KIND: EntityKind = EntityKind::Partition;
    const PRECEDENCE: &'static [MetaVersion] = &[MetaVersion::V2_2];

    fn decode_as(version: MetaVersion, raw: &[u8]) -> Attempt<Self> {
        if version != MetaVersion::V2_2 {
            return Attempt::Rejected(unsupported(Self::KIND, version).to_string());
        }
        match parse::<v2_2::PartitionInfo>(raw) {
            Ok(info) if info.partition_id != 0 => Attempt::Accepted(Partition {
                collection_id: CollectionId::new(info.collection_id),
                partition_id: PartitionId::new(info.partition_id),
                name: info.partition_name,
                state: PartitionState::from_raw(info.state),
                create_time: info.partition_created_timestamp,
            }),
            Ok(_) => Attempt::Unpopulated,
            Err(err) => Attempt::Rejected(err),
        }
    }

    fn encode_as(&self, version: MetaVersion) -> CoreResult<Vec<u8>> {
        if version != MetaVersion::V2_2 {
            return Err(unsupported(Self::KIND, version));
        }
        Ok(v2_2::PartitionInfo {
            partition_id: self.partition_id.get(),
            partition_name: self.name.clone(),
            partition_created_timestamp: self.create_time,
            collection_id: self.collection_id.get(),
            state: self.state.as_raw(),
        }
        .encode_to_vec())
    }

    fn store_key(&self, layout: &KeyLayout) -> String {
        layout.partition_key(self.collection_id, self.partition_id)
    }
}

/// Every structured binlog names its file by ID or path. A 2.0 path string
/// that happens to parse as a [`v2_2::Binlog`] names neither.
fn binlogs_identified(logs: &[v2_2::FieldBinlog]) -> bool {
    logs.iter()
        .flat_map(|fb| &fb.binlogs)
        .all(|b| b.log_id != 0 || !b.log_path.is_empty())
}

fn field_binlogs_from(logs: Vec<v2_2::FieldBinlog>) -> Vec<FieldBinlog> {
    logs.into_iter()
        .map(|fb| FieldBinlog {
            field_id: FieldId::new(fb.field_id),
            binlogs: fb
                .binlogs
                .into_iter()
                .map(|b| Binlog {
                    log_id: b.log_id,
                    entries_num: b.entries_num,
                    timestamp_from: b.timestamp_from,
                    timestamp_to: b.timestamp_to,
                    log_path: b.log_path,
                    log_size: b.log_size,
                })
                .collect(),
        })
        .collect()
}

fn field_binlogs_to(logs: &[FieldBinlog]) -> Vec<v2_2::FieldBinlog> {
    logs.iter()
        .map(|fb| v2_2::FieldBinlog {
            field_id: fb.field_id.get(),
            binlogs: fb
                .binlogs
                .iter()
                .map(|b| v2_2::Binlog {
                    entries_num: b.entries_num,
                    timestamp_from: b.timestamp_from,
                    timestamp_to: b.timestamp_to,
                    log_path: b.log_path.clone(),
                    log_size: b.log_size,
                    log_id: b.log_id,
                })
                .collect(),
        })
        .collect()
}

/// Normalizes a 2.0 segment record; also used for segments embedded in channel records.
pub(crate) fn segment_from_v2_0(info: v2_0::SegmentInfo) -> Segment {
    Segment {
        segment_id: SegmentId::new(info.id),
        collection_id: CollectionId::new(info.collection_id),
        partition_id: PartitionId::new(info.partition_id),
        insert_channel: info.insert_channel,
        num_of_rows: info.num_of_rows,
        max_row_num: info.max_row_num,
        last_expire_time: info.last_expire_time,
        state: SegmentState::from_raw(info.state),
        start_position: position_from(info.start_position),
        dml_position: position_from(info.dml_position),
        binlogs: info
            .binlogs
            .into_iter()
            .map(|fb| FieldBinlog {
                field_id: FieldId::new(fb.field_id),
                binlogs: fb
                    .binlogs
                    .into_iter()
                    .map(|log_path| Binlog {
                        log_path,
                        ..Binlog::default()
                    })
                    .collect(),
            })
            .collect(),
        statslogs: Vec::new(),
        deltalogs: Vec::new(),
        level: SegmentLevel::Legacy,
        storage_version: 0,
    }
}

pub(crate) fn segment_to_v2_0(segment: &Segment) -> v2_0::SegmentInfo {
    v2_0::SegmentInfo {
        id: segment.segment_id.get(),
        collection_id: segment.collection_id.get(),
        partition_id: segment.partition_id.get(),
        insert_channel: segment.insert_channel.clone(),
        num_of_rows: segment.num_of_rows,
        state: segment.state.as_raw(),
        dml_position: position_to(&segment.dml_position),
        max_row_num: segment.max_row_num,
        last_expire_time: segment.last_expire_time,
        binlogs: segment
            .binlogs
            .iter()
            .map(|fb| v2_0::FieldBinlogPaths {
                field_id: fb.field_id.get(),
                binlogs: fb.binlogs.iter().map(|b| b.log_path.clone()).collect(),
            })
            .collect(),
        start_position: position_to(&segment.start_position),
    }
}

impl VersionedEntity for Segment {
    const KIND: EntityKind = EntityKind::Segment;
    const PRECEDENCE: &'static [MetaVersion] = &[MetaVersion::V2_2, MetaVersion::V2_0];

    fn decode_as(version: MetaVersion, raw: &[u8]) -> Attempt<Self> {
        match version {
            MetaVersion::V2_2 => match parse::<v2_2::SegmentInfo>(raw) {
                Ok(info)
                    if info.id != 0
                        && binlogs_identified(&info.binlogs)
                        && binlogs_identified(&info.statslogs)
                        && binlogs_identified(&info.deltalogs) =>
                {
                    Attempt::Accepted(Segment {
                        segment_id: SegmentId::new(info.id),
                        collection_id: CollectionId::new(info.collection_id),
                        partition_id: PartitionId::new(info.partition_id),
                        insert_channel: info.insert_channel,
                        num_of_rows: info.num_of_rows,
                        max_row_num: info.max_row_num,
                        last_expire_time: info.last_expire_time,
                        state: SegmentState::from_raw(info.state),
                        start_position: position_from(info.start_position),
                        dml_position: position_from(info.dml_position),
                        binlogs: field_binlogs_from(info.binlogs),
                        statslogs: field_binlogs_from(info.statslogs),
                        deltalogs: field_binlogs_from(info.deltalogs),
                        level: SegmentLevel::from_raw(info.level),
                        storage_version: info.storage_version,
                    })
                }
                Ok(_) => Attempt::Unpopulated,
                Err(err) => Attempt::Rejected(err),
            },
            MetaVersion::V2_0 => match parse::<v2_0::SegmentInfo>(raw) {
                Ok(info) if info.id != 0 => Attempt::Accepted(segment_from_v2_0(info)),
                Ok(_) => Attempt::Unpopulated,
                Err(err) => Attempt::Rejected(err),
            },
        }
    }

    fn encode_as(&self, version: MetaVersion) -> CoreResult<Vec<u8>> {
        Ok(match version {
            MetaVersion::V2_2 => v2_2::SegmentInfo {
                id: self.segment_id.get(),
                collection_id: self.collection_id.get(),
                partition_id: self.partition_id.get(),
                insert_channel: self.insert_channel.clone(),
                num_of_rows: self.num_of_rows,
                state: self.state.as_raw(),
                dml_position: position_to(&self.dml_position),
                max_row_num: self.max_row_num,
                last_expire_time: self.last_expire_time,
                storage_version: self.storage_version,
                start_position: position_to(&self.start_position),
                binlogs: field_binlogs_to(&self.binlogs),
                statslogs: field_binlogs_to(&self.statslogs),
                deltalogs: field_binlogs_to(&self.deltalogs),
                level: self.level.as_raw(),
            }
            .encode_to_vec(),
            MetaVersion::V2_0 => segment_to_v2_0(self).encode_to_vec(),
        })
    }

    fn store_key(&self, layout: &KeyLayout) -> String {
        layout.segment_key(self.collection_id, self.partition_id, self.segment_id)
    }
}

impl VersionedEntity for FieldIndex {
    const KIND: EntityKind = EntityKind::FieldIndex;
    const PRECEDENCE: &'static [MetaVersion] = &[MetaVersion::V2_2, MetaVersion::V2_0];

    fn decode_as(version: MetaVersion, raw: &[u8]) -> Attempt<Self> {
        match version {
            MetaVersion::V2_2 => match parse::<v2_2::FieldIndex>(raw) {
                Ok(v2_2::FieldIndex {
                    index_info: Some(info),
                    deleted,
                    create_time,
                }) if info.index_id != 0 => Attempt::Accepted(FieldIndex {
                    collection_id: CollectionId::new(info.collection_id),
                    field_id: FieldId::new(info.field_id),
                    index_id: IndexId::new(info.index_id),
                    index_name: info.index_name,
                    type_params: pairs_from(info.type_params),
                    index_params: pairs_from(info.index_params),
                    user_index_params: pairs_from(info.user_index_params),
                    indexed_rows: info.indexed_rows,
                    total_rows: info.total_rows,
                    state: IndexState::from_raw(info.state),
                    fail_reason: info.index_state_fail_reason,
                    is_auto_index: info.is_auto_index,
                    deleted,
                    create_time,
                }),
                Ok(_) => Attempt::Unpopulated,
                Err(err) => Attempt::Rejected(err),
            },
            MetaVersion::V2_0 => match parse::<v2_0::IndexMeta>(raw) {
                Ok(meta) if meta.index_id != 0 => Attempt::Accepted(FieldIndex {
                    collection_id: CollectionId::new(meta.collection_id),
                    field_id: FieldId::new(meta.field_id),
                    index_id: IndexId::new(meta.index_id),
                    index_name: meta.index_name,
                    index_params: pairs_from(meta.index_params),
                    deleted: meta.deleted,
                    create_time: meta.create_time,
                    ..FieldIndex::default()
                }),
                Ok(_) => Attempt::Unpopulated,
                Err(err) => Attempt::Rejected(err),
            },
        }
    }

    fn encode_as(&self, version: MetaVersion) -> CoreResult<Vec<u8>> {
        Ok(match version {
            MetaVersion::V2_2 => v2_2::FieldIndex {
                index_info: Some(v2_2::IndexInfo {
                    collection_id: self.collection_id.get(),
                    field_id: self.field_id.get(),
                    index_name: self.index_name.clone(),
                    index_id: self.index_id.get(),
                    type_params: pairs_to(&self.type_params),
                    index_params: pairs_to(&self.index_params),
                    indexed_rows: self.indexed_rows,
                    total_rows: self.total_rows,
                    state: self.state.as_raw(),
                    index_state_fail_reason: self.fail_reason.clone(),
                    is_auto_index: self.is_auto_index,
                    user_index_params: pairs_to(&self.user_index_params),
                }),
                deleted: self.deleted,
                create_time: self.create_time,
            }
            .encode_to_vec(),
            MetaVersion::V2_0 => v2_0::IndexMeta {
                collection_id: self.collection_id.get(),
                field_id: self.field_id.get(),
                index_name: self.index_name.clone(),
                index_id: self.index_id.get(),
                index_params: pairs_to(&self.index_params),
                deleted: self.deleted,
                create_time: self.create_time,
            }
            .encode_to_vec(),
        })
    }

    fn store_key(&self, layout: &KeyLayout) -> String {
        layout.field_index_key(self.collection_id, self.index_id)
    }
}

impl VersionedEntity for VChannelInfo {
    const KIND: EntityKind = EntityKind::Channel;
    // One layout serves every generation; 2.0.2 fills the embedded buckets.
    const PRECEDENCE: &'static [MetaVersion] = &[MetaVersion::V2_2, MetaVersion::V2_0];

    fn decode_as(_version: MetaVersion, raw: &[u8]) -> Attempt<Self> {
        match parse::<common::VchannelInfo>(raw) {
            Ok(info) if !info.channel_name.is_empty() => {
                let ids = |ids: Vec<i64>| ids.into_iter().map(SegmentId::new).collect();
                let segments = |segments: Vec<v2_0::SegmentInfo>| {
                    segments.into_iter().map(segment_from_v2_0).collect()
                };
                Attempt::Accepted(VChannelInfo {
                    collection_id: CollectionId::new(info.collection_id),
                    channel_name: info.channel_name,
                    seek_position: position_from(info.seek_position),
                    flushed_segment_ids: ids(info.flushed_segment_ids),
                    unflushed_segment_ids: ids(info.unflushed_segment_ids),
                    dropped_segment_ids: ids(info.dropped_segment_ids),
                    legacy_flushed_segments: segments(info.flushed_segments),
                    legacy_unflushed_segments: segments(info.unflushed_segments),
                    legacy_dropped_segments: segments(info.dropped_segments),
                })
            }
            Ok(_) => Attempt::Unpopulated,
            Err(err) => Attempt::Rejected(err),
        }
    }

    fn encode_as(&self, _version: MetaVersion) -> CoreResult<Vec<u8>> {
        let ids = |ids: &Vec<SegmentId>| ids.iter().map(|id| id.get()).collect();
        let segments = |segments: &Vec<Segment>| segments.iter().map(segment_to_v2_0).collect();
        Ok(common::VchannelInfo {
            collection_id: self.collection_id.get(),
            channel_name: self.channel_name.clone(),
            seek_position: position_to(&self.seek_position),
            unflushed_segments: segments(&self.legacy_unflushed_segments),
            flushed_segments: segments(&self.legacy_flushed_segments),
            dropped_segments: segments(&self.legacy_dropped_segments),
            unflushed_segment_ids: ids(&self.unflushed_segment_ids),
            flushed_segment_ids: ids(&self.flushed_segment_ids),
            dropped_segment_ids: ids(&self.dropped_segment_ids),
        }
        .encode_to_vec())
    }

    fn store_key(&self, layout: &KeyLayout) -> String {
        layout.channel_key(self.collection_id, &self.channel_name)
    }
}

impl VersionedEntity for Session {
    const KIND: EntityKind = EntityKind::Session;
    // Sessions are JSON in every generation.
    const PRECEDENCE: &'static [MetaVersion] = &[MetaVersion::V2_2, MetaVersion::V2_0];

    fn decode_as(_version: MetaVersion, raw: &[u8]) -> Attempt<Self> {
        match serde_json::from_slice::<Session>(raw) {
            Ok(session) if !session.server_name.is_empty() => Attempt::Accepted(session),
            Ok(_) => Attempt::Unpopulated,
            Err(err) => Attempt::Rejected(err.to_string()),
        }
    }

    fn encode_as(&self, _version: MetaVersion) -> CoreResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    fn store_key(&self, layout: &KeyLayout) -> String {
        layout.session_key(&self.server_name, self.server_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::DecodeContext;

    fn legacy_segment_bytes() -> Vec<u8> {
        v2_0::SegmentInfo {
            id: 9,
            collection_id: 42,
            partition_id: 7,
            num_of_rows: 10,
            state: SegmentState::Flushed.as_raw(),
            binlogs: vec![v2_0::FieldBinlogPaths {
                field_id: 100,
                binlogs: vec!["files/insert_log/42/7/9/100/1".to_string()],
            }],
            ..Default::default()
        }
        .encode_to_vec()
    }

    #[test]
    fn legacy_segment_with_binlogs_falls_back_to_2_0_layout() {
        let ctx = DecodeContext::new(MetaVersion::V2_2);
        let (segment, version) = ctx
            .decode::<Segment>("k", &legacy_segment_bytes())
            .expect("decodes");
        assert_eq!(version, MetaVersion::V2_0);
        assert_eq!(segment.segment_id, SegmentId::new(9));
        let paths: Vec<_> = segment.field_log_paths(FieldId::new(100)).collect();
        assert_eq!(paths, vec!["files/insert_log/42/7/9/100/1"]);
    }

    #[test]
    fn newer_layout_is_never_tried_above_the_context_version() {
        let segment = Segment {
            segment_id: SegmentId::new(5),
            level: SegmentLevel::L1,
            storage_version: 2,
            ..Segment::default()
        };
        let raw = segment.encode_as(MetaVersion::V2_2).unwrap();

        let (decoded, version) = DecodeContext::new(MetaVersion::V2_2)
            .decode::<Segment>("k", &raw)
            .unwrap();
        assert_eq!(version, MetaVersion::V2_2);
        assert_eq!(decoded.level, SegmentLevel::L1);

        // With a 2.0 ceiling the level and storage version tags are unknown fields.
        let (decoded, version) = DecodeContext::new(MetaVersion::V2_0)
            .decode::<Segment>("k", &raw)
            .unwrap();
        assert_eq!(version, MetaVersion::V2_0);
        assert_eq!(decoded.level, SegmentLevel::Legacy);
        assert_eq!(decoded.storage_version, 0);
    }

    #[test]
    fn segment_bytes_follow_the_cluster_layout() {
        #[rustfmt::skip]
        let raw: &[u8] = &[
            0x08, 0x05,             // id = 5
            0x10, 0x2a,             // collection_id = 42
            0x18, 0x07,             // partition_id = 7
            0x30, 0x07,             // state = Importing
            0x38, 0xe8, 0x07,       // max_row_num = 1000
            0x4a, 0x02, 0x20, 0x0a, // start_position.timestamp = 10
            0x52, 0x02, 0x20, 0x14, // dml_position.timestamp = 20
            0xa0, 0x01, 0x02,       // level = L1
            0xa8, 0x01, 0x02,       // storage_version = 2
        ];

        let (segment, version) = DecodeContext::new(MetaVersion::V2_2)
            .decode::<Segment>("k", raw)
            .unwrap();
        assert_eq!(version, MetaVersion::V2_2);
        assert_eq!(segment.segment_id, SegmentId::new(5));
        assert_eq!(segment.collection_id, CollectionId::new(42));
        assert_eq!(segment.state, SegmentState::Importing);
        assert_eq!(segment.max_row_num, 1000);
        assert_eq!(segment.start_position.as_ref().map(|p| p.timestamp), Some(10));
        assert_eq!(segment.effective_ts(), 20);
        assert_eq!(segment.level, SegmentLevel::L1);
        assert_eq!(segment.storage_version, 2);
        assert_eq!(segment.encode_as(MetaVersion::V2_2).unwrap(), raw);
    }

    #[test]
    fn collection_bytes_follow_the_cluster_layout() {
        #[rustfmt::skip]
        let raw: &[u8] = &[
            0x08, 0x2a,                                     // id = 42
            0x12, 0x06, 0x0a, 0x04, b'd', b'o', b'c', b's', // schema.name = "docs"
            0x50, 0x02,                                     // shards_num = 2
            0x68, 0x01,                                     // state = Creating
            0x78, 0x07,                                     // db_id = 7
        ];

        let (collection, version) = DecodeContext::new(MetaVersion::V2_2)
            .decode::<Collection>("k", raw)
            .unwrap();
        assert_eq!(version, MetaVersion::V2_2);
        assert_eq!(collection.collection_id, CollectionId::new(42));
        assert_eq!(collection.name(), "docs");
        assert_eq!(collection.shards_num, 2);
        assert_eq!(collection.state, CollectionState::Creating);
        assert_eq!(collection.database_id, DatabaseId::new(7));
    }

    #[test]
    fn index_layouts_reject_each_other() {
        let index = FieldIndex {
            collection_id: CollectionId::new(42),
            field_id: FieldId::new(101),
            index_id: IndexId::new(3),
            index_name: "vec_idx".into(),
            index_params: vec![KeyValuePair::new("index_type", "HNSW")],
            ..FieldIndex::default()
        };

        let legacy = index.encode_as(MetaVersion::V2_0).unwrap();
        let (decoded, version) = DecodeContext::new(MetaVersion::V2_2)
            .decode::<FieldIndex>("k", &legacy)
            .unwrap();
        assert_eq!(version, MetaVersion::V2_0);
        assert_eq!(decoded.index_type(), Some("HNSW"));

        let current = index.encode_as(MetaVersion::V2_2).unwrap();
        let (decoded, version) = DecodeContext::new(MetaVersion::V2_2)
            .decode::<FieldIndex>("k", &current)
            .unwrap();
        assert_eq!(version, MetaVersion::V2_2);
        assert_eq!(decoded, index);
    }

    #[test]
    fn collection_without_schema_is_unpopulated() {
        let raw = v2_2::CollectionInfo {
            id: 42,
            ..Default::default()
        }
        .encode_to_vec();
        let err = DecodeContext::default()
            .decode::<Collection>("meta/collection/42", &raw)
            .expect_err("no schema");
        assert!(matches!(err, CoreError::Decode { .. }));
    }

    #[test]
    fn partitions_have_no_2_0_layout() {
        let partition = Partition {
            collection_id: CollectionId::new(1),
            partition_id: PartitionId::new(2),
            name: "_default".into(),
            ..Partition::default()
        };
        let raw = partition.encode_as(MetaVersion::V2_2).unwrap();
        let err = DecodeContext::new(MetaVersion::V2_0)
            .decode::<Partition>("k", &raw)
            .expect_err("no candidates");
        assert!(err.to_string().contains("no partition layout"));
        assert!(partition.encode_as(MetaVersion::V2_0).is_err());
    }

    #[test]
    fn garbage_is_rejected_by_every_layout() {
        let ctx = DecodeContext::default();
        assert!(ctx.decode::<Segment>("k", b"not a protobuf").is_err());
        assert!(ctx.decode::<FieldIndex>("k", &[0xff, 0xff, 0xff]).is_err());
        assert!(ctx.decode::<Session>("k", b"{").is_err());
    }
}
