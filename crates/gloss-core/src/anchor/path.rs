//! Structural paths from the document root to an anchor root.

use serde::{Deserialize, Serialize};

use crate::document::{Document, NodeId};
use crate::error::{GlossError, Result};

/// One step of a root path: an element tag and its 1-based position among
/// same-tag element siblings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathSegment {
    pub tag: String,
    pub ordinal: u32,
}

impl PathSegment {
    pub fn new(tag: impl Into<String>, ordinal: u32) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ordinal,
        }
    }
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.tag, self.ordinal)
    }
}

/// Path from the document root down to `element`, inclusive.
pub fn compute_path(doc: &Document, element: NodeId) -> Result<Vec<PathSegment>> {
    if !doc.is_attached(element) {
        return Err(GlossError::InvalidInput(
            "Anchor root is not attached to the document".to_string(),
        ));
    }

    let mut segments = Vec::new();
    let mut current = Some(element);
    while let Some(node) = current {
        let tag = doc.tag(node).ok_or_else(|| {
            GlossError::InvalidInput("Anchor root must be an element".to_string())
        })?;
        segments.push(PathSegment::new(tag, ordinal_of(doc, node, tag)));
        current = doc.parent(node);
    }
    segments.reverse();
    Ok(segments)
}

/// Resolve a path against the live document.
///
/// # Errors
///
/// Returns `GlossError::AnchorUnresolvable` naming the first segment that no
/// longer matches.
pub fn resolve_path(doc: &Document, path: &[PathSegment]) -> Result<NodeId> {
    let (first, rest) = path
        .split_first()
        .ok_or_else(|| GlossError::AnchorUnresolvable("Anchor path is empty".to_string()))?;

    let root = doc.root();
    if first.ordinal != 1 || !tag_matches(doc.tag(root), &first.tag) {
        return Err(unresolved(first));
    }

    let mut current = root;
    for segment in rest {
        current = segment
            .ordinal
            .checked_sub(1)
            .and_then(|skip| {
                doc.element_children(current)
                    .filter(|&child| tag_matches(doc.tag(child), &segment.tag))
                    .nth(skip as usize)
            })
            .ok_or_else(|| unresolved(segment))?;
    }
    Ok(current)
}

fn ordinal_of(doc: &Document, node: NodeId, tag: &str) -> u32 {
    let Some(parent) = doc.parent(node) else {
        return 1;
    };
    let preceding = doc
        .element_children(parent)
        .take_while(|&sibling| sibling != node)
        .filter(|&sibling| doc.tag(sibling) == Some(tag))
        .count();
    u32::try_from(preceding + 1).unwrap_or(u32::MAX)
}

fn tag_matches(actual: Option<&str>, expected: &str) -> bool {
    actual.is_some_and(|tag| tag.eq_ignore_ascii_case(expected))
}

fn unresolved(segment: &PathSegment) -> GlossError {
    GlossError::AnchorUnresolvable(format!("Path segment {} not found", segment))
}
