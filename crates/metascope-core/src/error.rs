use thiserror::Error;

/// Canonical error type for metadata access and repair operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity was not found in the metadata store.
    #[error("{entity} `{id}` was not found")]
    NotFound {
        /// Entity type name (e.g. `"collection"`).
        entity: &'static str,
        /// Identifier of the missing entity.
        id: String,
    },

    /// Stored value matched none of the known schema generations.
    #[error("failed to decode `{key}`: {message}")]
    Decode {
        /// Store key holding the undecodable value.
        key: String,
        /// Last decoder failure.
        message: String,
    },

    /// Store or RPC connectivity failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// A store call exceeded its deadline.
    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout {
        /// Store operation that timed out (e.g. `"list"`).
        operation: &'static str,
        /// Configured deadline in milliseconds.
        timeout_ms: u64,
    },

    /// Some mutations of a plan failed while others were applied.
    #[error("{failed} of {total} mutations failed")]
    PartialApply {
        /// Number of failed mutations.
        failed: usize,
        /// Number of mutations attempted.
        total: usize,
    },

    /// Revision-guarded write found a newer revision than the one read.
    #[error("revision conflict on `{key}`: expected {expected}, found {actual}")]
    Conflict {
        /// Contended key.
        key: String,
        /// Revision observed when the plan was built.
        expected: i64,
        /// Revision currently stored (0 when absent).
        actual: i64,
    },

    /// Operator supplied an unusable argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Stored metadata violates an invariant the operation depends on.
    #[error("invalid state: {message}")]
    InvalidState {
        /// Human-readable explanation of the invalid state.
        message: String,
    },

    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error occurred while reading or writing snapshot files.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error occurred.
    #[error("serialization error: {0}")]
    SerializationError(String),
}

impl CoreError {
    /// Creates a `NotFound` variant.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Creates a `Decode` variant.
    #[must_use]
    pub fn decode(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Creates a `Transport` variant.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates an `InvalidState` variant.
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Creates an `InvalidArgument` variant.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Returns true for the not-found class of errors.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true for connectivity failures, including deadlines.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout { .. })
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Convenient result alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
