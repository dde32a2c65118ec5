//! Note tag normalization.

use std::collections::HashSet;

use crate::error::{GlossError, Result};

/// Maximum bytes per tag.
pub const MAX_TAG_BYTES: usize = 128;

/// Maximum tags per note.
pub const MAX_TAGS_PER_NOTE: usize = 100;

/// Normalize and validate note tags.
///
/// - Trims whitespace and converts to lowercase
/// - Removes duplicates, keeping first-seen order
/// - Allows only alphanumerics, dash, underscore and colon
/// - Enforces length limits
pub fn normalize_tags(tags: &[String]) -> Result<Vec<String>> {
    if tags.len() > MAX_TAGS_PER_NOTE {
        return Err(GlossError::Validation(format!(
            "Too many tags (max {})",
            MAX_TAGS_PER_NOTE
        )));
    }

    let mut seen = HashSet::with_capacity(tags.len());
    let mut normalized = Vec::with_capacity(tags.len());

    for tag in tags {
        let tag = tag.trim().to_ascii_lowercase();
        if tag.is_empty() {
            return Err(GlossError::Validation("Empty tag is not allowed".to_string()));
        }
        if tag.len() > MAX_TAG_BYTES {
            return Err(GlossError::Validation(format!(
                "Tag too long (max {} bytes)",
                MAX_TAG_BYTES
            )));
        }
        if !tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':')
        {
            return Err(GlossError::Validation(format!(
                "Tag '{}' contains invalid characters",
                tag
            )));
        }
        if seen.insert(tag.clone()) {
            normalized.push(tag);
        }
    }

    Ok(normalized)
}

/// Split a comma-separated tag list, dropping empty pieces.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}
