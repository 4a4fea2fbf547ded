//! Per-block outcomes and the run report

use serde::Serialize;

/// Terminal state of one candidate block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// The replacement payload was written.
    Updated { attempts: u32 },
    /// The rewrite matched the current runs, so nothing was written.
    Unchanged,
    /// Dry run: the block would be rewritten into `runs` runs.
    Planned { runs: usize },
    /// The block could not be rewritten or written.
    Failed { attempts: u32, reason: String },
}

/// Outcome record for one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockOutcome {
    pub block_id: String,
    pub kind: String,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl BlockOutcome {
    pub fn new(block_id: impl Into<String>, kind: impl Into<String>, status: OutcomeStatus) -> Self {
        Self {
            block_id: block_id.into(),
            kind: kind.into(),
            status,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed { .. })
    }
}

/// A nested parent whose children could not be listed. The parent block
/// itself was still scanned; its descendants were not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSubtree {
    pub parent_id: String,
    pub attempts: u32,
    pub reason: String,
}

/// Everything a run produced. Callers decide success from the individual
/// outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub root_id: String,
    /// Number of blocks fetched under the root.
    pub scanned: usize,
    /// Number of blocks the detector selected.
    pub candidates: usize,
    /// One entry per candidate, in fetch order.
    pub outcomes: Vec<BlockOutcome>,
    /// Subtrees left out of the scan, in fetch order.
    pub skipped_subtrees: Vec<SkippedSubtree>,
}

impl RunReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &BlockOutcome> {
        self.outcomes.iter().filter(|o| !o.is_failure())
    }

    pub fn failed(&self) -> impl Iterator<Item = &BlockOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    pub fn updated_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Updated { .. }))
            .count()
    }

    pub fn outcome_for(&self, block_id: &str) -> Option<&BlockOutcome> {
        self.outcomes.iter().find(|o| o.block_id == block_id)
    }
}
