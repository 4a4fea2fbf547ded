//! Error types for eqfix-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that end the process with a non-zero exit status
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from eqfix-core
    #[error(transparent)]
    Core(#[from] eqfix_core::Error),

    /// Error from eqfix-notion
    #[error(transparent)]
    Notion(#[from] eqfix_notion::Error),

    /// Config file is not valid TOML for the expected tables
    #[error("Failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),

    /// Report could not be serialized
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
