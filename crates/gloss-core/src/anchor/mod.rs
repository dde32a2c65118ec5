//! Text anchoring.
//!
//! An [`Anchor`] describes a selected span without referring to in-memory
//! node identity: a structural path to an anchor root element, plus
//! half-open character offsets `[start, end)` into that element's flattened
//! text. Decoding re-resolves both against the live document and fails
//! cleanly when either no longer fits. There is no fuzzy matching.
//!
//! Wire format:
//!
//! ```text
//! { "path": [{"tag": "html", "ordinal": 1}, {"tag": "body", "ordinal": 1}],
//!   "start": 10, "end": 24 }
//! ```

mod path;

pub use path::{compute_path, resolve_path, PathSegment};

use serde::{Deserialize, Serialize};

use crate::document::{Document, NodeId, Span, TextMap};
use crate::error::{GlossError, Result};

/// A reload-stable description of a text span.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Anchor {
    pub path: Vec<PathSegment>,
    pub start: usize,
    pub end: usize,
}

impl Anchor {
    /// Number of characters covered.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check the structural invariants of a (possibly deserialized) anchor.
    pub fn validate(&self) -> Result<()> {
        if self.path.is_empty() {
            return Err(GlossError::AnchorUnresolvable(
                "Anchor path is empty".to_string(),
            ));
        }
        if self.start >= self.end {
            return Err(GlossError::AnchorUnresolvable(format!(
                "Anchor range {}..{} is empty or reversed",
                self.start, self.end
            )));
        }
        Ok(())
    }
}

/// Which element an anchor is measured from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorPolicy {
    /// Always the document's root content element. Survives edits anywhere
    /// outside the flattened text; offsets are long on large pages.
    #[default]
    DocumentBody,
    /// The nearest element containing the whole selection. Shorter offsets,
    /// but same-tag sibling insertions above it invalidate the path.
    CommonAncestor,
}

/// Converts selections to anchors and back.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchorCodec {
    policy: AnchorPolicy,
}

impl AnchorCodec {
    pub fn new(policy: AnchorPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> AnchorPolicy {
        self.policy
    }

    /// Describe `selection` as an anchor.
    ///
    /// Backward selections are normalized; the result always has
    /// `start < end`.
    ///
    /// # Errors
    ///
    /// Returns `GlossError::InvalidInput` if the selection is empty, refers to
    /// detached nodes, or lies outside the anchor root.
    pub fn encode(&self, doc: &Document, selection: &Span) -> Result<Anchor> {
        let root = self.anchor_root(doc, selection)?;
        let path = compute_path(doc, root)?;

        let map = TextMap::build(doc, root);
        let a = map.offset_of(selection.start)?;
        let b = map.offset_of(selection.end)?;
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        if start == end {
            return Err(GlossError::InvalidInput("Selection is empty".to_string()));
        }

        Ok(Anchor { path, start, end })
    }

    /// Re-resolve `anchor` against the live document.
    ///
    /// The path is matched segment by segment, then one pass over the
    /// flattened text locates both offsets.
    ///
    /// # Errors
    ///
    /// Returns `GlossError::AnchorUnresolvable` if the anchor is malformed,
    /// its path no longer matches, or the text has shrunk below `end`.
    pub fn resolve(&self, doc: &Document, anchor: &Anchor) -> Result<Span> {
        anchor.validate()?;
        let root = resolve_path(doc, &anchor.path)?;

        let map = TextMap::build(doc, root);
        if anchor.end > map.len() {
            return Err(GlossError::AnchorUnresolvable(format!(
                "Anchor end {} exceeds text length {}",
                anchor.end,
                map.len()
            )));
        }

        let start = map.locate(anchor.start);
        let end = map.locate(anchor.end);
        match (start, end) {
            (Some(start), Some(end)) => Ok(Span::new(start, end)),
            _ => Err(GlossError::AnchorUnresolvable(
                "Anchor offsets could not be located".to_string(),
            )),
        }
    }

    /// Like [`AnchorCodec::resolve`], dropping the failure reason.
    pub fn decode(&self, doc: &Document, anchor: &Anchor) -> Option<Span> {
        match self.resolve(doc, anchor) {
            Ok(span) => Some(span),
            Err(err) => {
                tracing::debug!(error = %err, "anchor did not resolve");
                None
            }
        }
    }

    fn anchor_root(&self, doc: &Document, selection: &Span) -> Result<NodeId> {
        for node in [selection.start.node, selection.end.node] {
            if !doc.is_attached(node) {
                return Err(GlossError::InvalidInput(
                    "Selection refers to a detached node".to_string(),
                ));
            }
        }

        match self.policy {
            AnchorPolicy::DocumentBody => {
                let body = doc.body();
                if !doc.contains(body, selection.start.node) || !doc.contains(body, selection.end.node)
                {
                    return Err(GlossError::InvalidInput(
                        "Selection lies outside the document body".to_string(),
                    ));
                }
                Ok(body)
            }
            AnchorPolicy::CommonAncestor => {
                let start = containing_element(doc, selection.start.node);
                let end = containing_element(doc, selection.end.node);
                let mut candidate = Some(start);
                while let Some(node) = candidate {
                    if doc.contains(node, end) {
                        return Ok(node);
                    }
                    candidate = doc.parent(node);
                }
                Ok(doc.root())
            }
        }
    }
}

fn containing_element(doc: &Document, node: NodeId) -> NodeId {
    if doc.is_text(node) {
        doc.parent(node).unwrap_or_else(|| doc.root())
    } else {
        node
    }
}
