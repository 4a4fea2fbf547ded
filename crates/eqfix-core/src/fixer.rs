//! EquationFixer implementation
//!
//! The fixer drives one document through four stages:
//!
//! ```text
//! fetch_tree ──> needs_equation_update ──> [bounded task pool] ──> RunReport
//!                                          rewrite_block
//!                                          update_block (+ retry)
//! ```
//!
//! Each candidate block gets its own task. Tasks share nothing but the client
//! handle and hand their [`BlockOutcome`] back through the join set.

use std::collections::BTreeMap;
use std::sync::Arc;

use eqfix_blocks::{Block, needs_equation_update, rewrite_block};
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::config::{FixerConfig, RetryPolicy};
use crate::error::Result;
use crate::fetch::{FetchedTree, fetch_tree};
use crate::report::{BlockOutcome, OutcomeStatus, RunReport};
use crate::retry::with_retry;
use crate::source::{BlockSink, BlockSource};

/// Rewrites LaTeX markup under a root block into native equations.
pub struct EquationFixer<C> {
    client: Arc<C>,
    config: FixerConfig,
}

impl<C> EquationFixer<C>
where
    C: BlockSource + BlockSink + 'static,
{
    /// Create a fixer over a client that can both list and update blocks.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn new(client: Arc<C>, config: FixerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FixerConfig {
        &self.config
    }

    /// Fetch every block below `root_id` in pre-order.
    pub async fn fetch_tree(&self, root_id: &str) -> Result<FetchedTree> {
        fetch_tree(
            self.client.as_ref(),
            root_id,
            self.config.page_size,
            &self.config.fetch_policy(),
        )
        .await
    }

    /// Run fetch, filter, concurrent patch and aggregation for one root.
    ///
    /// # Errors
    ///
    /// Only a failed listing of the root is an error. Unlistable nested
    /// subtrees and block-level failures are recorded in the returned report
    /// and never abort sibling blocks.
    pub async fn run(&self, root_id: &str) -> Result<RunReport> {
        let FetchedTree { blocks, skipped } = self.fetch_tree(root_id).await?;
        let scanned = blocks.len();

        let candidates: Vec<Block> = blocks.into_iter().filter(needs_equation_update).collect();
        info!(
            root_id,
            scanned,
            candidates = candidates.len(),
            skipped_subtrees = skipped.len(),
            dry_run = self.config.dry_run,
            "Selected blocks with equations"
        );

        let total = candidates.len();
        let outcomes = self.patch_all(candidates).await;

        Ok(RunReport {
            root_id: root_id.to_string(),
            scanned,
            candidates: total,
            outcomes,
            skipped_subtrees: skipped,
        })
    }

    /// Fan the candidates out over at most `concurrency` tasks and collect
    /// one outcome per block, returned in candidate order.
    async fn patch_all(&self, candidates: Vec<Block>) -> Vec<BlockOutcome> {
        let limit = self.config.concurrency.max(1);
        let mut queue = candidates.into_iter().enumerate();
        let mut tasks = JoinSet::new();
        // Blocks whose task has not reported back yet, keyed by position.
        let mut in_flight: BTreeMap<usize, (String, String)> = BTreeMap::new();
        let mut outcomes: BTreeMap<usize, BlockOutcome> = BTreeMap::new();

        loop {
            while tasks.len() < limit {
                let Some((index, block)) = queue.next() else {
                    break;
                };
                in_flight.insert(index, (block.id.clone(), block.kind().to_string()));
                let client = Arc::clone(&self.client);
                let policy = self.config.retry.clone();
                let dry_run = self.config.dry_run;
                tasks.spawn(async move {
                    (index, patch_block(client.as_ref(), &block, &policy, dry_run).await)
                });
            }

            match tasks.join_next().await {
                Some(Ok((index, outcome))) => {
                    in_flight.remove(&index);
                    outcomes.insert(index, outcome);
                }
                Some(Err(join_error)) => {
                    error!(error = %join_error, "Block update task did not complete");
                }
                None => break,
            }
        }

        // Anything still in flight belongs to a task that panicked.
        for (index, (block_id, kind)) in in_flight {
            outcomes.insert(
                index,
                BlockOutcome::new(
                    block_id,
                    kind,
                    OutcomeStatus::Failed {
                        attempts: 0,
                        reason: "update task panicked".to_string(),
                    },
                ),
            );
        }

        outcomes.into_values().collect()
    }
}

/// Rewrite one block and write it back, retrying failed writes.
async fn patch_block<S>(sink: &S, block: &Block, policy: &RetryPolicy, dry_run: bool) -> BlockOutcome
where
    S: BlockSink + ?Sized,
{
    let outcome = |status| BlockOutcome::new(block.id.clone(), block.kind(), status);

    let update = match rewrite_block(block) {
        Ok(update) => update,
        Err(e) => {
            return outcome(OutcomeStatus::Failed {
                attempts: 0,
                reason: e.to_string(),
            });
        }
    };

    let current = block.body.text_payload().map(|p| &p.rich_text);
    if current == Some(&update.payload.rich_text) {
        info!(block_id = %block.id, "Block already uses native equations");
        return outcome(OutcomeStatus::Unchanged);
    }

    if dry_run {
        return outcome(OutcomeStatus::Planned {
            runs: update.payload.rich_text.len(),
        });
    }

    let attempted = with_retry(policy, &block.id, |_| sink.update_block(&block.id, &update)).await;

    match attempted.result {
        Ok(()) => {
            info!(block_id = %block.id, attempts = attempted.attempts, "Updated block");
            outcome(OutcomeStatus::Updated {
                attempts: attempted.attempts,
            })
        }
        Err(e) => {
            error!(
                block_id = %block.id,
                attempts = attempted.attempts,
                conflict = e.is_conflict(),
                error = %e,
                "Giving up on block"
            );
            outcome(OutcomeStatus::Failed {
                attempts: attempted.attempts,
                reason: e.to_string(),
            })
        }
    }
}
