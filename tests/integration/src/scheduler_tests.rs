//! Scheduler behaviour against the in-memory store: retries, exhaustion,
//! failure isolation and the concurrency bound.
//!
//! Timing tests run on paused tokio time, so backoff delays are observed
//! exactly as scheduled.

use std::sync::Arc;
use std::time::Duration;

use eqfix_blocks::Block;
use eqfix_core::{EquationFixer, FixerConfig, OutcomeStatus, RetryPolicy, SinkError};
use eqfix_test_utils::MemoryNotion;
use eqfix_test_utils::blocks::{paragraph, unsupported};
use pretty_assertions::assert_eq;
use rstest::rstest;
use tokio::time::Instant;

const ROOT: &str = "root";

fn equation_paragraphs(count: usize) -> Vec<Block> {
    (0..count)
        .map(|i| paragraph(&format!("p{i}"), &format!("Step {i}: $$x_{i}$$")))
        .collect()
}

fn config(max_attempts: u32, initial_backoff_ms: u64) -> FixerConfig {
    FixerConfig {
        retry: RetryPolicy {
            max_attempts,
            initial_backoff_ms,
            ..RetryPolicy::default()
        },
        ..FixerConfig::default()
    }
}

fn gaps(instants: &[Instant]) -> Vec<Duration> {
    instants.windows(2).map(|w| w[1] - w[0]).collect()
}

fn assert_gap(actual: Duration, expected_ms: u64) {
    let expected = Duration::from_millis(expected_ms);
    assert!(
        actual >= expected && actual <= expected + Duration::from_millis(1),
        "expected a {expected:?} gap, got {actual:?}"
    );
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(4)]
#[tokio::test(start_paused = true)]
async fn test_conflicts_then_success(#[case] failures: u32) {
    let store = Arc::new(
        MemoryNotion::new()
            .with_children(ROOT, vec![paragraph("p1", "Energy: $$E=mc^2$$")])
            .fail_first("p1", failures, SinkError::conflict("Conflict occurred while saving.")),
    );
    let fixer = EquationFixer::new(store.clone(), config(failures + 1, 100)).unwrap();

    let report = fixer.run(ROOT).await.unwrap();

    assert_eq!(
        report.outcome_for("p1").unwrap().status,
        OutcomeStatus::Updated {
            attempts: failures + 1
        }
    );
    assert!(store.applied("p1").is_some());

    let attempts = store.attempts_for("p1");
    assert_eq!(attempts.len() as u32, failures + 1);
    let mut expected_ms = 100;
    for gap in gaps(&attempts) {
        assert_gap(gap, expected_ms);
        expected_ms *= 2;
    }
}

#[tokio::test(start_paused = true)]
async fn test_non_conflict_errors_are_retried_too() {
    let store = Arc::new(
        MemoryNotion::new()
            .with_children(ROOT, vec![paragraph("p1", "$$a$$")])
            .fail_first(
                "p1",
                1,
                SinkError::Status {
                    status: 502,
                    message: "bad gateway".into(),
                },
            ),
    );
    let fixer = EquationFixer::new(store.clone(), config(3, 100)).unwrap();

    let report = fixer.run(ROOT).await.unwrap();

    assert_eq!(
        report.outcome_for("p1").unwrap().status,
        OutcomeStatus::Updated { attempts: 2 }
    );
}

#[tokio::test(start_paused = true)]
async fn test_exhaustion_stops_at_max_attempts() {
    let store = Arc::new(
        MemoryNotion::new()
            .with_children(ROOT, equation_paragraphs(3))
            .always_fail("p1", SinkError::conflict("still conflicting")),
    );
    let fixer = EquationFixer::new(store.clone(), config(4, 50)).unwrap();

    let report = fixer.run(ROOT).await.unwrap();

    let failed = report.outcome_for("p1").unwrap();
    assert!(failed.is_failure());
    match &failed.status {
        OutcomeStatus::Failed { attempts, reason } => {
            assert_eq!(*attempts, 4);
            assert!(reason.contains("still conflicting"), "got: {reason}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(store.attempts_for("p1").len(), 4);
    assert!(store.applied("p1").is_none());

    // Siblings are unaffected.
    for id in ["p0", "p2"] {
        assert_eq!(
            report.outcome_for(id).unwrap().status,
            OutcomeStatus::Updated { attempts: 1 }
        );
        assert_eq!(store.attempts_for(id).len(), 1);
    }
    assert_eq!(report.failed().count(), 1);
    assert_eq!(report.succeeded().count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_outcomes_keep_fetch_order_despite_retries() {
    let store = Arc::new(
        MemoryNotion::new()
            .with_children(ROOT, equation_paragraphs(5))
            .fail_first("p0", 2, SinkError::conflict("busy")),
    );
    let fixer = EquationFixer::new(store, config(3, 100)).unwrap();

    let report = fixer.run(ROOT).await.unwrap();
    let order: Vec<&str> = report.outcomes.iter().map(|o| o.block_id.as_str()).collect();

    assert_eq!(order, vec!["p0", "p1", "p2", "p3", "p4"]);
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(8)]
#[tokio::test(start_paused = true)]
async fn test_in_flight_writes_never_exceed_concurrency(#[case] concurrency: usize) {
    let store = Arc::new(
        MemoryNotion::new()
            .with_children(ROOT, equation_paragraphs(12))
            .with_write_latency(Duration::from_millis(50)),
    );
    let fixer = EquationFixer::new(
        store.clone(),
        FixerConfig {
            concurrency,
            ..FixerConfig::default()
        },
    )
    .unwrap();

    let report = fixer.run(ROOT).await.unwrap();

    assert_eq!(report.updated_count(), 12);
    assert!(store.peak_in_flight() <= concurrency);
    assert_eq!(store.peak_in_flight(), concurrency);
}

#[tokio::test(start_paused = true)]
async fn test_non_text_blocks_are_never_written() {
    let store = Arc::new(MemoryNotion::new().with_children(
        ROOT,
        vec![
            unsupported("code1", "code"),
            paragraph("p1", "Plain words only"),
            paragraph("p2", "With $$x$$"),
        ],
    ));
    let fixer = EquationFixer::new(store.clone(), FixerConfig::default()).unwrap();

    let report = fixer.run(ROOT).await.unwrap();

    assert_eq!(report.scanned, 3);
    assert_eq!(report.candidates, 1);
    let written: Vec<String> = store.writes().into_iter().map(|w| w.block_id).collect();
    assert_eq!(written, vec!["p2".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_retry_uses_fetch_attempts() {
    let store = Arc::new(MemoryNotion::new());
    let fixer = EquationFixer::new(
        store.clone(),
        FixerConfig {
            fetch_attempts: 3,
            ..config(5, 10)
        },
    )
    .unwrap();

    let err = fixer.run(ROOT).await.unwrap_err();

    assert!(matches!(err, eqfix_core::Error::Fetch { attempts: 3, .. }));
    assert_eq!(store.list_calls(), 3);
}

#[tokio::test]
async fn test_unlistable_child_subtree_does_not_stop_siblings() {
    let store = Arc::new(MemoryNotion::new().with_children(
        ROOT,
        vec![
            paragraph("p1", "Energy: $$E=mc^2$$"),
            // No children registered for "nested", so listing it answers 404.
            paragraph("nested", "Outline").with_children(true),
            paragraph("p2", "Area \\(\\pi r^2\\)"),
        ],
    ));
    let fixer = EquationFixer::new(store.clone(), FixerConfig::default()).unwrap();

    let report = fixer.run(ROOT).await.unwrap();

    assert_eq!(report.scanned, 3);
    assert_eq!(report.skipped_subtrees.len(), 1);
    assert_eq!(report.skipped_subtrees[0].parent_id, "nested");
    assert!(
        report.skipped_subtrees[0].reason.contains("404"),
        "got: {}",
        report.skipped_subtrees[0].reason
    );
    for id in ["p1", "p2"] {
        assert_eq!(
            report.outcome_for(id).unwrap().status,
            OutcomeStatus::Updated { attempts: 1 }
        );
        assert!(store.applied(id).is_some(), "{id} was not written");
    }
}
