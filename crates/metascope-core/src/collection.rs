use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::ids::{CollectionId, DatabaseId, FieldId, PartitionId};

/// Scalar and vector field types known to the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    None,
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Float,
    Double,
    String,
    VarChar,
    Array,
    Json,
    BinaryVector,
    FloatVector,
    Float16Vector,
}

impl DataType {
    /// Maps the wire enumeration value; unknown values collapse to `None`.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Self::Bool,
            2 => Self::Int8,
            3 => Self::Int16,
            4 => Self::Int32,
            5 => Self::Int64,
            10 => Self::Float,
            11 => Self::Double,
            20 => Self::String,
            21 => Self::VarChar,
            22 => Self::Array,
            23 => Self::Json,
            100 => Self::BinaryVector,
            101 => Self::FloatVector,
            102 => Self::Float16Vector,
            _ => Self::None,
        }
    }

    #[must_use]
    pub const fn as_raw(&self) -> i32 {
        match self {
            Self::None => 0,
            Self::Bool => 1,
            Self::Int8 => 2,
            Self::Int16 => 3,
            Self::Int32 => 4,
            Self::Int64 => 5,
            Self::Float => 10,
            Self::Double => 11,
            Self::String => 20,
            Self::VarChar => 21,
            Self::Array => 22,
            Self::Json => 23,
            Self::BinaryVector => 100,
            Self::FloatVector => 101,
            Self::Float16Vector => 102,
        }
    }
}

impl Default for DataType {
    fn default() -> Self {
        Self::None
    }
}

/// Lifecycle of a collection record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionState {
    Created,
    Creating,
    Dropping,
    Dropped,
}

impl CollectionState {
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Self::Creating,
            2 => Self::Dropping,
            3 => Self::Dropped,
            _ => Self::Created,
        }
    }

    #[must_use]
    pub const fn as_raw(&self) -> i32 {
        match self {
            Self::Created => 0,
            Self::Creating => 1,
            Self::Dropping => 2,
            Self::Dropped => 3,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CollectionCreated",
            Self::Creating => "CollectionCreating",
            Self::Dropping => "CollectionDropping",
            Self::Dropped => "CollectionDropped",
        }
    }
}

impl Default for CollectionState {
    fn default() -> Self {
        Self::Created
    }
}

impl fmt::Display for CollectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionState {
    type Err = CoreError;

    /// Case-insensitive; the `Collection` prefix is optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        [Self::Created, Self::Creating, Self::Dropping, Self::Dropped]
            .into_iter()
            .find(|state| {
                let name = state.as_str();
                name.eq_ignore_ascii_case(wanted)
                    || name["Collection".len()..].eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| CoreError::invalid_argument(format!("unknown collection state `{s}`")))
    }
}

/// One column of a collection schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub field_id: FieldId,
    pub name: String,
    pub data_type: DataType,
    pub is_primary_key: bool,
    pub auto_id: bool,
    pub description: String,
}

/// Ordered field list plus collection-level naming.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionSchema {
    pub name: String,
    pub description: String,
    pub auto_id: bool,
    pub fields: Vec<FieldSchema>,
}

/// Normalized collection record, independent of the schema generation it was read from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub collection_id: CollectionId,
    /// Zero for generations that predate database namespaces.
    pub database_id: DatabaseId,
    pub schema: CollectionSchema,
    pub state: CollectionState,
    pub create_time: u64,
    pub shards_num: i32,
    pub virtual_channels: Vec<String>,
    pub physical_channels: Vec<String>,
    /// Partition IDs embedded by 2.0 clusters; empty once partitions live under their own keys.
    pub legacy_partition_ids: Vec<PartitionId>,
    pub legacy_partition_names: Vec<String>,
}

impl Collection {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    /// Resolves the single primary-key field.
    ///
    /// # Errors
    ///
    /// `NotFound` when no field is flagged, `InvalidState` when several are.
    pub fn primary_key_field(&self) -> CoreResult<&FieldSchema> {
        let mut keys = self.schema.fields.iter().filter(|f| f.is_primary_key);
        let first = keys.next().ok_or_else(|| {
            CoreError::not_found("primary key field", format!("collection {}", self.collection_id))
        })?;
        if keys.next().is_some() {
            return Err(CoreError::invalid_state(format!(
                "collection {} declares more than one primary key field",
                self.collection_id
            )));
        }
        Ok(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(id: i64, name: &str, pk: bool) -> FieldSchema {
        FieldSchema {
            field_id: FieldId::new(id),
            name: name.to_string(),
            data_type: if pk { DataType::Int64 } else { DataType::FloatVector },
            is_primary_key: pk,
            ..FieldSchema::default()
        }
    }

    #[test]
    fn primary_key_is_resolved() {
        let collection = Collection {
            collection_id: CollectionId::new(1),
            schema: CollectionSchema {
                name: "books".into(),
                fields: vec![field(100, "id", true), field(101, "embedding", false)],
                ..CollectionSchema::default()
            },
            ..Collection::default()
        };
        assert_eq!(collection.primary_key_field().unwrap().name, "id");
    }

    #[test]
    fn missing_or_duplicate_primary_key_is_rejected() {
        let mut collection = Collection::default();
        collection.schema.fields = vec![field(101, "embedding", false)];
        assert!(collection.primary_key_field().unwrap_err().is_not_found());

        collection.schema.fields = vec![field(100, "a", true), field(102, "b", true)];
        assert!(matches!(
            collection.primary_key_field(),
            Err(CoreError::InvalidState { .. })
        ));
    }

    #[test]
    fn data_type_raw_values_round_trip() {
        for raw in [1, 5, 21, 101] {
            assert_eq!(DataType::from_raw(raw).as_raw(), raw);
        }
        assert_eq!(DataType::from_raw(999), DataType::None);
    }

    #[test]
    fn collection_state_parses_with_or_without_prefix() {
        assert_eq!("created".parse::<CollectionState>().unwrap(), CollectionState::Created);
        assert_eq!(
            "CollectionDropping".parse::<CollectionState>().unwrap(),
            CollectionState::Dropping
        );
        assert!("gone".parse::<CollectionState>().is_err());
    }
}
