//! Error types for eqfix-blocks

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The block kind carries no rich text, so there is nothing to rewrite.
    #[error("Block {id} of type '{kind}' does not carry rich text")]
    NotTextBearing { id: String, kind: String },

    /// A text-bearing block arrived without the payload named by its type tag.
    #[error("Block {id} of type '{kind}' is missing its '{kind}' payload")]
    MissingPayload { id: String, kind: String },

    #[error("Malformed '{kind}' payload: {source}")]
    Payload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}
