//! Flattening of a block's rich text into one matchable string.

use crate::model::{Block, RichText};

/// Opening and closing delimiter used for native equation runs.
pub const EQUATION_DELIMITER: &str = "$$";

/// Flattens a block's runs into a single string.
///
/// Text runs contribute their content verbatim and equation runs contribute
/// `$$expression$$`. Non-text blocks yield an empty string. The output is a
/// pure function of the block, so detection and rewriting always see the
/// same bytes.
///
/// # Example
/// ```
/// use eqfix_blocks::extract::flatten_content;
/// use eqfix_blocks::model::{Block, BlockBody, RichText, TextPayload};
///
/// let block = Block::new(
///     "b1",
///     BlockBody::Paragraph(TextPayload::new(vec![
///         RichText::plain("Area: "),
///         RichText::equation("\\pi r^2"),
///     ])),
/// );
/// assert_eq!(flatten_content(&block), "Area: $$\\pi r^2$$");
/// ```
pub fn flatten_content(block: &Block) -> String {
    let Some(payload) = block.body.text_payload() else {
        return String::new();
    };

    let mut content = String::new();
    for run in &payload.rich_text {
        match run {
            RichText::Text { text, .. } => content.push_str(&text.content),
            RichText::Equation { equation } => {
                content.push_str(EQUATION_DELIMITER);
                content.push_str(&equation.expression);
                content.push_str(EQUATION_DELIMITER);
            }
            RichText::Unsupported => {}
        }
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockBody, MediaKind, TextPayload};

    #[test]
    fn test_media_block_flattens_to_empty() {
        let block = Block::new("img", BlockBody::Media(MediaKind::Image));
        assert_eq!(flatten_content(&block), "");
    }

    #[test]
    fn test_runs_are_concatenated_without_separator() {
        let block = Block::new(
            "p",
            BlockBody::Quote(TextPayload::new(vec![
                RichText::plain("a"),
                RichText::plain("b"),
                RichText::Unsupported,
                RichText::equation("c"),
            ])),
        );
        assert_eq!(flatten_content(&block), "ab$$c$$");
    }

    #[test]
    fn test_flatten_is_deterministic() {
        let block = Block::new(
            "p",
            BlockBody::Paragraph(TextPayload::new(vec![RichText::plain("x \\(y\\)")])),
        );
        assert_eq!(flatten_content(&block), flatten_content(&block));
    }
}
