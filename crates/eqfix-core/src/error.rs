//! Error types for eqfix-core

/// Result type for eqfix-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a whole run.
///
/// Per-block write failures are not errors at this level; they end up as
/// [`crate::OutcomeStatus::Failed`] entries in the run report.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Listing the children of a block failed after all allowed attempts
    #[error("Failed to fetch children of {parent_id} after {attempts} attempt(s): {source}")]
    Fetch {
        parent_id: String,
        attempts: u32,
        #[source]
        source: SourceError,
    },

    /// Scheduler configuration is out of range
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Error from eqfix-blocks
    #[error(transparent)]
    Blocks(#[from] eqfix_blocks::Error),
}

impl Error {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Failure reported by a [`crate::BlockSource`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Malformed response: {message}")]
    Decode { message: String },
}

/// Failure reported by a [`crate::BlockSink`].
///
/// Conflicts are kept apart from other failures for reporting, but every
/// variant is retried on the same schedule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },
}

impl SinkError {
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, SinkError::Conflict { .. })
    }
}
