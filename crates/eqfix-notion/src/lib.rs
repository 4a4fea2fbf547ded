//! Notion REST adapter for equation-fixer
//!
//! Implements [`eqfix_core::BlockSource`] and [`eqfix_core::BlockSink`] over
//! the public Notion API:
//!
//! - `GET  /v1/blocks/{id}/children?page_size=N&start_cursor=C`
//! - `PATCH /v1/blocks/{id}`
//!
//! A `409 Conflict` on a write is reported as [`eqfix_core::SinkError::Conflict`];
//! every other failure keeps its status code or transport message.

pub mod client;
pub mod error;
pub mod reference;

pub use client::{
    DEFAULT_BASE_URL, DEFAULT_NOTION_VERSION, NotionClient, NotionConfig, classify_write_failure,
};
pub use error::{Error, Result};
pub use reference::parse_page_reference;
