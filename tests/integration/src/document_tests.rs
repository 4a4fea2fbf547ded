//! End-to-end runs over a recorded lecture-notes page.
//!
//! The fixture mixes plain headings, inline and display equations, a media
//! block with LaTeX in its caption, an unsupported toggle, a block that
//! already uses native equations and nested children two levels deep.

use std::sync::Arc;

use eqfix_blocks::RichText;
use eqfix_core::{EquationFixer, FixerConfig, OutcomeStatus};
use eqfix_test_utils::MemoryNotion;
use pretty_assertions::assert_eq;
use serde_json::json;

const FIXTURE: &str = include_str!("../../../test-fixtures/notion/lecture-notes.json");

fn load() -> (String, Arc<MemoryNotion>) {
    let (root, store) = MemoryNotion::from_fixture(FIXTURE).expect("fixture parses");
    (root, Arc::new(store))
}

fn ids<'a>(outcomes: impl Iterator<Item = &'a eqfix_core::BlockOutcome>) -> Vec<&'a str> {
    outcomes.map(|o| o.block_id.as_str()).collect()
}

#[tokio::test]
async fn test_fetches_whole_tree_in_pre_order() {
    let (root, store) = load();
    let fixer = EquationFixer::new(store.clone(), FixerConfig::default()).unwrap();

    let blocks = fixer.fetch_tree(&root).await.unwrap().blocks;
    let order: Vec<&str> = blocks.iter().map(|b| b.id.as_str()).collect();

    assert_eq!(
        order,
        vec!["h1", "p1", "p2", "img1", "t1", "p3", "b1", "q1", "n1", "p5", "c1"]
    );
    // Root plus the two parents with children.
    assert_eq!(store.list_calls(), 3);
}

#[tokio::test]
async fn test_small_pages_give_same_tree() {
    let (root, store) = load();
    let config = FixerConfig {
        page_size: 2,
        ..FixerConfig::default()
    };
    let fixer = EquationFixer::new(store.clone(), config).unwrap();

    let blocks = fixer.fetch_tree(&root).await.unwrap().blocks;

    assert_eq!(blocks.len(), 11);
    assert_eq!(blocks[5].id, "p3");
    // Root needs 4 pages of 2; "t1" and "p5" fit in one page each.
    assert_eq!(store.list_calls(), 6);
}

#[tokio::test]
async fn test_run_rewrites_only_blocks_with_markup() {
    let (root, store) = load();
    let fixer = EquationFixer::new(store.clone(), FixerConfig::default()).unwrap();

    let report = fixer.run(&root).await.unwrap();

    assert_eq!(report.scanned, 11);
    assert_eq!(report.candidates, 5);
    assert_eq!(ids(report.outcomes.iter()), vec!["p1", "p2", "p3", "n1", "c1"]);
    assert_eq!(report.updated_count(), 5);
    assert_eq!(report.failed().count(), 0);
    assert!(
        report
            .outcomes
            .iter()
            .all(|o| o.status == OutcomeStatus::Updated { attempts: 1 })
    );

    assert_eq!(store.applied_count(), 5);
    for untouched in ["h1", "img1", "t1", "b1", "q1", "p5"] {
        assert!(store.applied(untouched).is_none(), "{untouched} was written");
    }
}

#[tokio::test]
async fn test_written_runs_match_expected() {
    let (root, store) = load();
    let fixer = EquationFixer::new(store.clone(), FixerConfig::default()).unwrap();
    fixer.run(&root).await.unwrap();

    let runs = |id: &str| store.applied(id).unwrap().payload.rich_text;

    assert_eq!(
        runs("p1"),
        vec![
            RichText::plain("Energy: "),
            RichText::equation("E=mc^2"),
            RichText::plain(" is fundamental."),
        ]
    );
    // Bold styling on "Circle: " is not carried over.
    assert_eq!(
        runs("p2"),
        vec![RichText::plain("Circle: "), RichText::equation("x^2+y^2=r^2")]
    );
    assert_eq!(
        runs("p3"),
        vec![RichText::plain("Inside the toggle "), RichText::equation("a+b")]
    );
    assert_eq!(
        runs("n1"),
        vec![RichText::equation("a"), RichText::equation("b")]
    );
    assert_eq!(runs("c1"), vec![RichText::equation("F=ma")]);
}

#[tokio::test]
async fn test_update_payload_wire_shape() {
    let (root, store) = load();
    let fixer = EquationFixer::new(store.clone(), FixerConfig::default()).unwrap();
    fixer.run(&root).await.unwrap();

    let update = store.applied("p1").unwrap();
    let body = serde_json::to_value(&update).unwrap();

    assert_eq!(
        body,
        json!({
            "type": "paragraph",
            "paragraph": {
                "rich_text": [
                    {
                        "type": "text",
                        "text": { "content": "Energy: " },
                        "annotations": {
                            "bold": false, "italic": false, "strikethrough": false,
                            "underline": false, "code": false, "color": "default"
                        }
                    },
                    { "type": "equation", "equation": { "expression": "E=mc^2" } },
                    {
                        "type": "text",
                        "text": { "content": " is fundamental." },
                        "annotations": {
                            "bold": false, "italic": false, "strikethrough": false,
                            "underline": false, "code": false, "color": "default"
                        }
                    }
                ]
            }
        })
    );
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let (root, store) = load();
    let config = FixerConfig {
        dry_run: true,
        ..FixerConfig::default()
    };
    let fixer = EquationFixer::new(store.clone(), config).unwrap();

    let report = fixer.run(&root).await.unwrap();

    assert!(store.writes().is_empty());
    assert_eq!(report.candidates, 5);
    assert_eq!(
        report.outcome_for("p1").unwrap().status,
        OutcomeStatus::Planned { runs: 3 }
    );
    assert_eq!(
        report.outcome_for("n1").unwrap().status,
        OutcomeStatus::Planned { runs: 2 }
    );
}

#[tokio::test]
async fn test_report_serializes_flat_outcomes() {
    let (root, store) = load();
    let fixer = EquationFixer::new(store, FixerConfig::default()).unwrap();

    let report = fixer.run(&root).await.unwrap();
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["root_id"], "page-root");
    assert_eq!(value["scanned"], 11);
    assert_eq!(
        value["outcomes"][0],
        json!({ "block_id": "p1", "kind": "paragraph", "status": "updated", "attempts": 1 })
    );
}

#[tokio::test]
async fn test_unknown_root_aborts_run() {
    let (_, store) = load();
    let fixer = EquationFixer::new(store.clone(), FixerConfig::default()).unwrap();

    let err = fixer.run("missing-page").await.unwrap_err();

    assert!(matches!(
        err,
        eqfix_core::Error::Fetch { attempts: 1, .. }
    ));
    assert!(store.writes().is_empty());
}
