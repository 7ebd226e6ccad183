//! Version-aware decoding of stored values.
//!
//! Each entity kind lists the schema generations able to hold it, newest
//! first. A [`DecodeContext`] pins the newest generation the running cluster
//! may have written; candidates newer than that are never tried, so every
//! record of one run is interpreted against the same ceiling.

use metascope_core::{CoreError, CoreResult, EntityKind, MetaVersion};

use crate::keys::KeyLayout;

/// Outcome of parsing a value with one generation's layout.
pub enum Attempt<T> {
    /// Parsed and every discriminant field is populated.
    Accepted(T),
    /// Parsed, but the discriminant fields are empty; the bytes likely belong
    /// to another generation.
    Unpopulated,
    /// The layout rejected the bytes.
    Rejected(String),
}

/// A normalized entity that can be read from, and written back to, any
/// generation in its precedence list.
pub trait VersionedEntity: Sized + Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    /// Generations that store this kind, newest first.
    const PRECEDENCE: &'static [MetaVersion];

    fn decode_as(version: MetaVersion, raw: &[u8]) -> Attempt<Self>;

    fn encode_as(&self, version: MetaVersion) -> CoreResult<Vec<u8>>;

    /// Key the entity is stored under, derived from its own identifiers.
    fn store_key(&self, layout: &KeyLayout) -> String;
}

/// Cluster version selected once per run and threaded into every decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeContext {
    pub version: MetaVersion,
}

impl DecodeContext {
    pub const fn new(version: MetaVersion) -> Self {
        Self { version }
    }

    /// Generations tried for `T`, newest first, capped at the context version.
    pub fn candidates<T: VersionedEntity>(&self) -> impl Iterator<Item = MetaVersion> + '_ {
        T::PRECEDENCE
            .iter()
            .copied()
            .filter(move |candidate| *candidate <= self.version)
    }

    /// Decodes `raw` with the first candidate generation that accepts it.
    ///
    /// # Errors
    ///
    /// `Decode` when no candidate accepts the bytes.
    pub fn decode<T: VersionedEntity>(&self, key: &str, raw: &[u8]) -> CoreResult<(T, MetaVersion)> {
        let mut last_failure = None;
        for version in self.candidates::<T>() {
            match T::decode_as(version, raw) {
                Attempt::Accepted(entity) => return Ok((entity, version)),
                Attempt::Unpopulated => {
                    last_failure = Some(format!(
                        "{} layout {version} parsed without identifying fields",
                        T::KIND
                    ));
                }
                Attempt::Rejected(reason) => {
                    last_failure = Some(format!("{} layout {version}: {reason}", T::KIND));
                }
            }
        }

        Err(CoreError::decode(
            key,
            last_failure.unwrap_or_else(|| {
                format!(
                    "no {} layout exists at or below cluster version {}",
                    T::KIND,
                    self.version
                )
            }),
        ))
    }
}
