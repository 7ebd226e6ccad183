use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// Metadata schema generation a record was written with.
///
/// Ordering follows release order, so `V2_0 < V2_2`. Serialized as `"2.0"` or
/// `"2.2"`; deserialized from any release string or number [`FromStr`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetaVersion {
    /// 2.0.x and 2.1.x clusters.
    V2_0,
    /// 2.2.x and later clusters.
    V2_2,
}

impl MetaVersion {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::V2_0 => "2.0",
            Self::V2_2 => "2.2",
        }
    }
}

impl Default for MetaVersion {
    fn default() -> Self {
        Self::V2_2
    }
}

impl fmt::Display for MetaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetaVersion {
    type Err = CoreError;

    /// Accepts release strings such as `2.0`, `v2.2.8` or `2.4.1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches(['v', 'V']);
        let mut parts = trimmed.split('.');
        let major = parts.next().and_then(|p| p.parse::<u32>().ok());
        let minor = parts.next().and_then(|p| p.parse::<u32>().ok());

        match (major, minor) {
            (Some(2), Some(0 | 1)) => Ok(Self::V2_0),
            (Some(2), Some(_)) => Ok(Self::V2_2),
            (Some(major), Some(_)) if major > 2 => Ok(Self::V2_2),
            _ => Err(CoreError::invalid_argument(format!(
                "unrecognized cluster version `{s}`"
            ))),
        }
    }
}

impl Serialize for MetaVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

struct MetaVersionVisitor;

impl<'de> Visitor<'de> for MetaVersionVisitor {
    type Value = MetaVersion;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a cluster release such as \"2.2\" or \"v2.4.1\"")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }

    // Environment sources parse `2.2` as a number.
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        self.visit_str(&format!("{v:.1}"))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        self.visit_str(&format!("{v}.0"))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        self.visit_str(&format!("{v}.0"))
    }
}

impl<'de> Deserialize<'de> for MetaVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MetaVersionVisitor)
    }
}

/// Kinds of metadata records the console understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Collection,
    Partition,
    Segment,
    FieldIndex,
    Session,
    Channel,
}

impl EntityKind {
    /// Key-path component directly below the base path.
    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Partition => "partition",
            Self::Segment => "segment",
            Self::FieldIndex => "field-index",
            Self::Session => "session",
            Self::Channel => "channel",
        }
    }

    /// Entity name used in errors and reports.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Partition => "partition",
            Self::Segment => "segment",
            Self::FieldIndex => "field index",
            Self::Session => "session",
            Self::Channel => "vchannel",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_release_strings() {
        assert_eq!("2.0".parse::<MetaVersion>().unwrap(), MetaVersion::V2_0);
        assert_eq!("v2.1.4".parse::<MetaVersion>().unwrap(), MetaVersion::V2_0);
        assert_eq!("2.2.8".parse::<MetaVersion>().unwrap(), MetaVersion::V2_2);
        assert_eq!("2.4".parse::<MetaVersion>().unwrap(), MetaVersion::V2_2);
        assert!("1.1".parse::<MetaVersion>().is_err());
        assert!("latest".parse::<MetaVersion>().is_err());
    }

    #[test]
    fn versions_order_by_release() {
        assert!(MetaVersion::V2_0 < MetaVersion::V2_2);
    }

    #[test]
    fn deserializes_from_strings_and_numbers() {
        let parse = |raw: &str| serde_json::from_str::<MetaVersion>(raw).unwrap();
        assert_eq!(parse("\"2.4\""), MetaVersion::V2_2);
        assert_eq!(parse("\"v2.1.4\""), MetaVersion::V2_0);
        assert_eq!(parse("2.2"), MetaVersion::V2_2);
        assert_eq!(parse("2.0"), MetaVersion::V2_0);
        assert_eq!(parse("3"), MetaVersion::V2_2);
        assert!(serde_json::from_str::<MetaVersion>("\"1.9\"").is_err());
        assert_eq!(serde_json::to_string(&MetaVersion::V2_0).unwrap(), "\"2.0\"");
    }
}
