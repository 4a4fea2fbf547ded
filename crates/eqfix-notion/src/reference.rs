//! Resolution of user-supplied page references to block ids.
//!
//! Accepted forms:
//! ```text
//! 0123456789abcdef0123456789abcdef
//! 01234567-89ab-cdef-0123-456789abcdef
//! https://www.notion.so/workspace/Lecture-Notes-0123456789abcdef0123456789abcdef?pvs=4
//! ```

use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

use crate::error::{Error, Result};

/// 32 hex digits at the very end of the dash-stripped path segment.
static TRAILING_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9a-fA-F]{32})$").expect("Invalid page id regex"));

/// Resolve a page URL or id to a hyphenated, lower-case block id.
///
/// Only the last path segment is considered, so hex-looking workspace names
/// earlier in the URL are never mistaken for the id.
///
/// # Errors
///
/// Returns [`Error::InvalidReference`] if no id can be found.
///
/// # Example
/// ```
/// use eqfix_notion::parse_page_reference;
///
/// let id = parse_page_reference(
///     "https://www.notion.so/Notes-0123456789ABCDEF0123456789abcdef?pvs=4",
/// )
/// .unwrap();
/// assert_eq!(id, "01234567-89ab-cdef-0123-456789abcdef");
/// ```
pub fn parse_page_reference(reference: &str) -> Result<String> {
    let invalid = || Error::InvalidReference {
        reference: reference.to_string(),
    };

    let path = reference.trim().split(['?', '#']).next().unwrap_or_default();
    let segment = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    let compact: String = segment.chars().filter(|c| *c != '-').collect();

    let caps = TRAILING_ID_REGEX.captures(&compact).ok_or_else(invalid)?;
    let id = Uuid::parse_str(&caps[1]).map_err(|_| invalid())?;

    Ok(id.hyphenated().to_string())
}
