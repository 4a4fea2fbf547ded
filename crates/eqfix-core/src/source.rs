//! The two remote operations the scheduler depends on.

use async_trait::async_trait;
use eqfix_blocks::{BlockPage, BlockUpdate};

use crate::error::{SinkError, SourceError};

/// Paginated read access to the block tree.
#[async_trait]
pub trait BlockSource: Send + Sync {
    /// List one page of the direct children of `parent_id`.
    ///
    /// `cursor` is the `next_cursor` of the previous page, or `None` for the
    /// first page.
    async fn list_children(
        &self,
        parent_id: &str,
        cursor: Option<&str>,
        page_size: u32,
    ) -> std::result::Result<BlockPage, SourceError>;
}

/// Write access: replace a block's rich text.
#[async_trait]
pub trait BlockSink: Send + Sync {
    async fn update_block(
        &self,
        block_id: &str,
        update: &BlockUpdate,
    ) -> std::result::Result<(), SinkError>;
}
