//! Update scheduling for equation-fixer
//!
//! This crate sits between the pure rewriting logic in `eqfix-blocks` and a
//! concrete remote store such as `eqfix-notion`:
//!
//! ```text
//!                 eqfix-cli
//!                     |
//!        +------------+------------+
//!        |                         |
//!    eqfix-core  <--- traits ---  eqfix-notion
//!        |
//!   eqfix-blocks
//! ```
//!
//! - **Tree fetch**: pre-order worklist over paginated child listings
//! - **Filtering**: only blocks with LaTeX markup are processed
//! - **Fan-out**: bounded pool of per-block tasks
//! - **Retry**: exponential backoff on every failed write
//! - **Reporting**: one [`BlockOutcome`] per candidate block

pub mod config;
pub mod error;
pub mod fetch;
pub mod fixer;
pub mod report;
pub mod retry;
pub mod source;

pub use config::{FixerConfig, MAX_PAGE_SIZE, RetryPolicy};
pub use error::{Error, Result, SinkError, SourceError};
pub use fetch::{FetchedTree, fetch_tree};
pub use fixer::EquationFixer;
pub use report::{BlockOutcome, OutcomeStatus, RunReport, SkippedSubtree};
pub use retry::{Attempted, with_retry};
pub use source::{BlockSink, BlockSource};
