//! Fast check for LaTeX equations in a block.

use regex::Regex;
use std::sync::LazyLock;

use crate::extract::flatten_content;
use crate::model::Block;

/// The five recognised delimiter forms, each matched with `.` spanning lines.
static DETECT_PATTERNS: LazyLock<[Regex; 5]> = LazyLock::new(|| {
    [
        r"(?s)\$\$.*?\$\$",
        r"(?s)\\\[.*?\\\]",
        r"(?s)\\\(.*?\\\)",
        r"(?s)\\begin\{equation\}.*?\\end\{equation\}",
        r"(?s)\\begin\{align\*?\}.*?\\end\{align\*?\}",
    ]
    .map(|pattern| Regex::new(pattern).expect("Invalid equation detection regex"))
});

/// Returns true if the text contains any of the five delimiter forms.
pub fn contains_equation(content: &str) -> bool {
    DETECT_PATTERNS.iter().any(|pattern| pattern.is_match(content))
}

/// Checks if a block holds LaTeX markup that should become native equations.
///
/// Media blocks are rejected before any extraction takes place. Blocks without
/// rich text flatten to an empty string and are rejected as well.
pub fn needs_equation_update(block: &Block) -> bool {
    if block.body.is_media() {
        return false;
    }
    contains_equation(&flatten_content(block))
}
