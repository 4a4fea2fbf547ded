//! Conversion of LaTeX markup into native equation runs.
//!
//! Rewriting works on the flattened content of a block:
//!
//! ```text
//! "Energy: $$E=mc^2$$ is fundamental."
//!  |-------||---------||---------------|
//!    text    equation        text
//! ```
//!
//! Each equation span becomes an equation run holding its trimmed inner
//! expression; each text span becomes an unstyled text run. Whitespace-only
//! text spans are dropped.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::error::{Error, Result};
use crate::extract::flatten_content;
use crate::model::{Block, BlockUpdate, RichText, TextPayload};

/// Alternation of the five delimiter forms, one capture group per form.
static EQUATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?s)\$\$(.*?)\$\$",
        r"|\\\[(.*?)\\\]",
        r"|\\\((.*?)\\\)",
        r"|\\begin\{equation\}(.*?)\\end\{equation\}",
        r"|\\begin\{align\*?\}(.*?)\\end\{align\*?\}",
    ))
    .expect("Invalid equation regex")
});

/// A detected equation inside flattened content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpan {
    /// Byte offset of the opening delimiter.
    pub start: usize,
    /// Byte offset one past the closing delimiter.
    pub end: usize,
    /// Inner expression with surrounding whitespace removed.
    pub expression: String,
}

/// One piece of flattened content, in reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Equation(MatchSpan),
}

fn expression_of(caps: &Captures<'_>) -> String {
    caps.iter()
        .skip(1)
        .flatten()
        .map(|group| group.as_str())
        .find(|group| !group.is_empty())
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Finds all equations in `content`, ordered and non-overlapping.
pub fn find_equations(content: &str) -> Vec<MatchSpan> {
    EQUATION_REGEX
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(MatchSpan {
                start: whole.start(),
                end: whole.end(),
                expression: expression_of(&caps),
            })
        })
        .collect()
}

/// Splits `content` into alternating text and equation segments.
///
/// Every byte of the input belongs to exactly one segment; whitespace-only
/// text segments are kept here and filtered during run construction.
pub fn segment(content: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last_pos = 0;

    for span in find_equations(content) {
        if span.start > last_pos {
            segments.push(Segment::Text(&content[last_pos..span.start]));
        }
        last_pos = span.end;
        segments.push(Segment::Equation(span));
    }

    if last_pos < content.len() {
        segments.push(Segment::Text(&content[last_pos..]));
    }

    segments
}

/// Builds the replacement run sequence for flattened content.
///
/// Content without any equation yields one text run holding the whole input
/// (or no runs at all if the input is blank).
pub fn rewrite_rich_text(content: &str) -> Vec<RichText> {
    segment(content)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Text(text) if text.trim().is_empty() => None,
            Segment::Text(text) => Some(RichText::plain(text)),
            Segment::Equation(span) => Some(RichText::equation(span.expression)),
        })
        .collect()
}

/// Builds the full replacement payload for a text-bearing block.
///
/// Original styling is not carried over. A `children` value on the original
/// payload is copied through verbatim.
///
/// # Errors
///
/// Returns [`Error::NotTextBearing`] for media and unsupported blocks.
///
/// # Example
/// ```
/// use eqfix_blocks::model::{Block, BlockBody, RichText, TextPayload};
/// use eqfix_blocks::rewrite::rewrite_block;
///
/// let block = Block::new(
///     "b1",
///     BlockBody::Paragraph(TextPayload::new(vec![RichText::plain("$$a$$ and $$b$$")])),
/// );
/// let update = rewrite_block(&block).unwrap();
/// assert_eq!(update.kind, "paragraph");
/// assert_eq!(update.payload.rich_text.len(), 3);
/// ```
pub fn rewrite_block(block: &Block) -> Result<BlockUpdate> {
    let payload = block
        .body
        .text_payload()
        .ok_or_else(|| Error::NotTextBearing {
            id: block.id.clone(),
            kind: block.kind().to_string(),
        })?;

    let content = flatten_content(block);
    Ok(BlockUpdate {
        kind: block.kind().to_string(),
        payload: TextPayload {
            rich_text: rewrite_rich_text(&content),
            children: payload.children.clone(),
        },
    })
}
