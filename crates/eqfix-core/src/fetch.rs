//! Whole-tree retrieval.
//!
//! The tree is walked with an explicit stack of frames, one per parent whose
//! children are still being listed, so deep documents never grow the call
//! stack. Output order is pre-order: a block is followed by all of its
//! descendants before its next sibling.

use std::collections::VecDeque;

use eqfix_blocks::Block;
use tracing::{debug, warn};

use crate::config::RetryPolicy;
use crate::error::{Error, Result};
use crate::report::SkippedSubtree;
use crate::retry::with_retry;
use crate::source::BlockSource;

/// Blocks gathered under a root, plus the nested parents whose children
/// could not be listed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedTree {
    pub blocks: Vec<Block>,
    pub skipped: Vec<SkippedSubtree>,
}

/// Listing state for one parent block.
struct Frame {
    parent_id: String,
    /// False only for the root frame.
    nested: bool,
    /// Children fetched but not yet emitted.
    pending: VecDeque<Block>,
    cursor: Option<String>,
    exhausted: bool,
}

impl Frame {
    fn new(parent_id: String, nested: bool) -> Self {
        Self {
            parent_id,
            nested,
            pending: VecDeque::new(),
            cursor: None,
            exhausted: false,
        }
    }
}

/// Fetch every block below `root_id`, flattened in pre-order.
///
/// Pages of one parent are requested in sequence, threading `next_cursor`.
/// A child with `has_children` is descended into before the next sibling is
/// emitted, so a parent's later pages are only requested once the earlier
/// children's subtrees are complete.
///
/// When a nested parent's children cannot be listed within the policy's
/// attempt budget, the rest of that subtree is dropped, recorded in
/// [`FetchedTree::skipped`], and the walk continues with the next sibling.
///
/// # Errors
///
/// Returns [`Error::Fetch`] when a page of the root itself cannot be listed.
/// Nothing fetched so far is returned in that case.
pub async fn fetch_tree<S>(
    source: &S,
    root_id: &str,
    page_size: u32,
    policy: &RetryPolicy,
) -> Result<FetchedTree>
where
    S: BlockSource + ?Sized,
{
    let mut tree = FetchedTree::default();
    let mut stack = vec![Frame::new(root_id.to_string(), false)];

    while let Some(frame) = stack.last_mut() {
        if let Some(block) = frame.pending.pop_front() {
            let descend = block.has_children.then(|| block.id.clone());
            tree.blocks.push(block);
            if let Some(child_parent) = descend {
                stack.push(Frame::new(child_parent, true));
            }
            continue;
        }

        if frame.exhausted {
            stack.pop();
            continue;
        }

        let attempted = with_retry(policy, &frame.parent_id, |_| {
            source.list_children(&frame.parent_id, frame.cursor.as_deref(), page_size)
        })
        .await;
        let attempts = attempted.attempts;

        let page = match attempted.result {
            Ok(page) => page,
            Err(err) if frame.nested => {
                warn!(
                    parent_id = %frame.parent_id,
                    attempts,
                    error = %err,
                    "Skipping subtree whose children could not be listed"
                );
                tree.skipped.push(SkippedSubtree {
                    parent_id: frame.parent_id.clone(),
                    attempts,
                    reason: err.to_string(),
                });
                stack.pop();
                continue;
            }
            Err(err) => {
                return Err(Error::Fetch {
                    parent_id: frame.parent_id.clone(),
                    attempts,
                    source: err,
                });
            }
        };
        debug!(
            parent_id = %frame.parent_id,
            results = page.results.len(),
            has_more = page.has_more,
            "Fetched children page"
        );

        // A page claiming more results without a cursor cannot be continued.
        frame.exhausted = !page.has_more || page.next_cursor.is_none();
        frame.cursor = page.next_cursor;
        frame.pending.extend(page.results);
    }

    Ok(tree)
}
