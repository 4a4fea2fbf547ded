//! Block model and equation rewriting for equation-fixer.
//!
//! This crate is the pure, I/O-free half of the workspace:
//!
//! - [`model`]: typed Notion blocks and rich-text runs, with their JSON shape
//! - [`extract`]: flattening a block's runs into one matchable string
//! - [`detect`]: the cheap "does this block contain LaTeX?" predicate
//! - [`rewrite`]: segmentation into text/equation spans and payload rebuild
//!
//! Five delimiter forms are recognised:
//!
//! ```text
//! $$ ... $$
//! \[ ... \]
//! \( ... \)
//! \begin{equation} ... \end{equation}
//! \begin{align} ... \end{align}      (and align*)
//! ```

pub mod detect;
pub mod error;
pub mod extract;
pub mod model;
pub mod rewrite;

pub use detect::{contains_equation, needs_equation_update};
pub use error::{Error, Result};
pub use extract::flatten_content;
pub use model::{
    Annotations, Block, BlockBody, BlockPage, BlockUpdate, MediaKind, RichText, TextPayload,
};
pub use rewrite::{MatchSpan, Segment, find_equations, rewrite_block, rewrite_rich_text, segment};
