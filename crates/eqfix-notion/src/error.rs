//! Error types for eqfix-notion

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The page URL or id does not contain a Notion block id
    #[error("Invalid Notion page reference: '{reference}'")]
    InvalidReference { reference: String },

    /// The API token or version cannot be sent as a header value
    #[error("Invalid {header} header: {message}")]
    InvalidHeader {
        header: &'static str,
        message: String,
    },

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
