use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw cluster-assigned identifier.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw identifier as stored in metadata records.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }

            /// Zero is never allocated by the cluster and doubles as "unset".
            #[must_use]
            pub const fn is_unset(self) -> bool {
                self.0 == 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

define_id!(CollectionId, "Cluster-assigned identifier of a collection.");
define_id!(
    DatabaseId,
    "Identifier of the database namespace owning a collection."
);
define_id!(
    PartitionId,
    "Identifier of a partition within a collection."
);
define_id!(SegmentId, "Identifier of a segment within a partition.");
define_id!(FieldId, "Identifier of a schema field.");
define_id!(IndexId, "Identifier of a field index.");
define_id!(ServerId, "Identifier of a registered cluster process.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trimmed_ids() {
        let id: CollectionId = " 42 ".parse().expect("parse");
        assert_eq!(id.get(), 42);
        assert_eq!(id.to_string(), "42");
        assert!("abc".parse::<SegmentId>().is_err());
    }

    #[test]
    fn zero_is_unset() {
        assert!(PartitionId::default().is_unset());
        assert!(!PartitionId::new(7).is_unset());
    }
}
