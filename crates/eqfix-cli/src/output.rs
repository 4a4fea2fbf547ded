//! Human-readable and JSON rendering of a run report

use colored::Colorize;
use eqfix_core::{OutcomeStatus, RunReport};

use crate::error::Result;

/// One line per block outcome and per skipped subtree, then a summary line.
pub fn render_text(report: &RunReport) -> String {
    let mut out = String::new();

    for outcome in &report.outcomes {
        let line = match &outcome.status {
            OutcomeStatus::Updated { attempts } => format!(
                "{} {} ({}) after {} attempt(s)",
                "updated".green(),
                outcome.block_id,
                outcome.kind,
                attempts
            ),
            OutcomeStatus::Unchanged => format!(
                "{} {} ({})",
                "unchanged".dimmed(),
                outcome.block_id,
                outcome.kind
            ),
            OutcomeStatus::Planned { runs } => format!(
                "{} {} ({}) into {} run(s)",
                "would update".cyan(),
                outcome.block_id,
                outcome.kind,
                runs
            ),
            OutcomeStatus::Failed { attempts, reason } => format!(
                "{} {} ({}) after {} attempt(s): {}",
                "failed".red(),
                outcome.block_id,
                outcome.kind,
                attempts,
                reason
            ),
        };
        out.push_str(&line);
        out.push('\n');
    }

    for skipped in &report.skipped_subtrees {
        out.push_str(&format!(
            "{} children of {} after {} attempt(s): {}\n",
            "skipped".yellow(),
            skipped.parent_id,
            skipped.attempts,
            skipped.reason
        ));
    }

    let failed = report.failed().count();
    out.push_str(&format!(
        "{} blocks scanned, {} with equations, {} updated, {} failed\n",
        report.scanned,
        report.candidates,
        report.updated_count(),
        failed
    ));
    out
}

pub fn render_json(report: &RunReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
