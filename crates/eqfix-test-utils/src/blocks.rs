//! Block constructors for tests.

use eqfix_blocks::{Block, BlockBody, MediaKind, RichText, TextPayload};

/// A paragraph holding a single unstyled text run.
pub fn paragraph(id: &str, text: &str) -> Block {
    text_block("paragraph", id, vec![RichText::plain(text)])
}

/// A text-bearing block of the given type tag.
///
/// # Panics
/// Panics if `kind` is not a text-bearing type tag.
pub fn text_block(kind: &str, id: &str, runs: Vec<RichText>) -> Block {
    let body = BlockBody::text(kind, TextPayload::new(runs))
        .unwrap_or_else(|| panic!("text_block: '{kind}' is not a text-bearing kind"));
    Block::new(id, body)
}

pub fn media(id: &str, kind: MediaKind) -> Block {
    Block::new(id, BlockBody::Media(kind))
}

/// A block of a kind the fixer does not handle, e.g. `toggle`.
pub fn unsupported(id: &str, kind: &str) -> Block {
    Block::new(id, BlockBody::Unsupported(kind.to_string()))
}
