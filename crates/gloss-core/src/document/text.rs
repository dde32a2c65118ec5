//! Flattened text sequence beneath an element.

use super::{Boundary, Document, NodeId};
use crate::error::{GlossError, Result};

#[derive(Debug, Clone, Copy)]
struct TextUnit {
    node: NodeId,
    start: usize,
    len: usize,
}

/// The text nodes beneath an ancestor, in document order, with their
/// cumulative character offsets.
///
/// Offsets are half-open: a unit covers `[start, start + len)`. A position
/// on the boundary between two units belongs to the start of the following
/// unit, so an empty unit never owns a position.
#[derive(Debug, Clone)]
pub struct TextMap<'a> {
    doc: &'a Document,
    ancestor: NodeId,
    units: Vec<TextUnit>,
    len: usize,
}

impl<'a> TextMap<'a> {
    /// Walk the subtree of `ancestor` once, recording each text node.
    pub fn build(doc: &'a Document, ancestor: NodeId) -> Self {
        let mut units = Vec::new();
        let mut len = 0;
        let mut stack = vec![ancestor];
        while let Some(node) = stack.pop() {
            if let Some(text) = doc.text(node) {
                let count = text.chars().count();
                units.push(TextUnit {
                    node,
                    start: len,
                    len: count,
                });
                len += count;
                continue;
            }
            if let Ok(children) = doc.children(node) {
                stack.extend(children.iter().rev().copied());
            }
        }
        Self {
            doc,
            ancestor,
            units,
            len,
        }
    }

    /// Total flattened length in characters.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The flattened text.
    pub fn text(&self) -> String {
        self.units
            .iter()
            .filter_map(|unit| self.doc.text(unit.node))
            .collect()
    }

    /// Characters `[from, to)` of the flattened text.
    pub fn slice(&self, from: usize, to: usize) -> String {
        self.text()
            .chars()
            .skip(from)
            .take(to.saturating_sub(from))
            .collect()
    }

    /// Flattened offset of a boundary inside the ancestor.
    ///
    /// # Errors
    ///
    /// Returns `GlossError::InvalidInput` if the boundary lies outside the
    /// ancestor or its offset exceeds its container.
    pub fn offset_of(&self, boundary: Boundary) -> Result<usize> {
        if self.doc.is_text(boundary.node) {
            let unit = self
                .units
                .iter()
                .find(|unit| unit.node == boundary.node)
                .ok_or_else(|| {
                    GlossError::InvalidInput("Boundary lies outside the anchor root".to_string())
                })?;
            if boundary.offset > unit.len {
                return Err(GlossError::InvalidInput(format!(
                    "Offset {} exceeds text length {}",
                    boundary.offset, unit.len
                )));
            }
            return Ok(unit.start + boundary.offset);
        }

        if !self.doc.contains(self.ancestor, boundary.node) {
            return Err(GlossError::InvalidInput(
                "Boundary lies outside the anchor root".to_string(),
            ));
        }
        let children = self.doc.children(boundary.node)?;
        if boundary.offset > children.len() {
            return Err(GlossError::InvalidInput(format!(
                "Child index {} exceeds child count {}",
                boundary.offset,
                children.len()
            )));
        }
        // Text before the position is everything in units that precede the
        // first text node at or after children[offset].
        let following = children[boundary.offset..]
            .iter()
            .find_map(|&child| self.first_unit_within(child));
        Ok(match following {
            Some(unit) => unit.start,
            None => self.end_of(boundary.node),
        })
    }

    /// Locate the text position for a flattened `offset`.
    ///
    /// An offset on a unit boundary resolves to the start of the following
    /// non-empty unit; only the total length resolves to the end of the last
    /// unit. Returns `None` when `offset` is beyond the flattened length.
    pub fn locate(&self, offset: usize) -> Option<Boundary> {
        if offset > self.len {
            return None;
        }
        if let Some(unit) = self
            .units
            .iter()
            .find(|unit| offset < unit.start + unit.len)
        {
            return Some(Boundary::new(unit.node, offset - unit.start));
        }
        match self.units.last() {
            Some(unit) => Some(Boundary::new(unit.node, unit.len)),
            None => Some(Boundary::new(self.ancestor, 0)),
        }
    }

    /// Character range of the `occurrence`-th (0-based) match of `quote`.
    pub fn find(&self, quote: &str, occurrence: usize) -> Option<(usize, usize)> {
        if quote.is_empty() {
            return None;
        }
        let text = self.text();
        let (byte_index, _) = text.match_indices(quote).nth(occurrence)?;
        let start = text[..byte_index].chars().count();
        Some((start, start + quote.chars().count()))
    }

    fn first_unit_within(&self, node: NodeId) -> Option<TextUnit> {
        self.units
            .iter()
            .find(|unit| self.doc.contains(node, unit.node))
            .copied()
    }

    /// Offset just past the last text inside `node`, or the position where
    /// its text would start if it has none.
    fn end_of(&self, node: NodeId) -> usize {
        if let Some(unit) = self
            .units
            .iter()
            .rev()
            .find(|unit| self.doc.contains(node, unit.node))
        {
            return unit.start + unit.len;
        }
        // No text inside: the position of the next text after `node`.
        let mut current = node;
        while current != self.ancestor {
            let Some(parent) = self.doc.parent(current) else {
                break;
            };
            let siblings = self.doc.children(parent).unwrap_or(&[]);
            let after = siblings
                .iter()
                .skip_while(|&&sibling| sibling != current)
                .skip(1)
                .find_map(|&sibling| self.first_unit_within(sibling));
            if let Some(unit) = after {
                return unit.start;
            }
            current = parent;
        }
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// body > [p > "ab", span > "", p > "cd" + em > "ef"]
    fn sample() -> (Document, Vec<NodeId>) {
        let mut doc = Document::new("body");
        let root = doc.root();
        let p1 = doc.append_element(root, "p").unwrap();
        let ab = doc.append_text(p1, "ab").unwrap();
        let span = doc.append_element(root, "span").unwrap();
        let empty = doc.append_text(span, "").unwrap();
        let p2 = doc.append_element(root, "p").unwrap();
        let cd = doc.append_text(p2, "cd").unwrap();
        let em = doc.append_element(p2, "em").unwrap();
        let ef = doc.append_text(em, "ef").unwrap();
        (doc, vec![p1, ab, span, empty, p2, cd, em, ef])
    }

    #[test]
    fn test_flatten_in_document_order() {
        let (doc, _) = sample();
        let map = TextMap::build(&doc, doc.root());
        assert_eq!(map.text(), "abcdef");
        assert_eq!(map.len(), 6);
    }

    #[test]
    fn test_locate_boundary_goes_to_following_unit() {
        let (doc, ids) = sample();
        let map = TextMap::build(&doc, doc.root());
        let (ab, cd) = (ids[1], ids[5]);

        assert_eq!(map.locate(0), Some(Boundary::new(ab, 0)));
        assert_eq!(map.locate(1), Some(Boundary::new(ab, 1)));
        // 2 is the end of "ab", the empty unit, and the start of "cd".
        assert_eq!(map.locate(2), Some(Boundary::new(cd, 0)));
    }

    #[test]
    fn test_locate_total_length_is_end_of_last_unit() {
        let (doc, ids) = sample();
        let map = TextMap::build(&doc, doc.root());
        assert_eq!(map.locate(6), Some(Boundary::new(ids[7], 2)));
        assert_eq!(map.locate(7), None);
    }

    #[test]
    fn test_offset_of_text_boundaries() {
        let (doc, ids) = sample();
        let map = TextMap::build(&doc, doc.root());
        assert_eq!(map.offset_of(Boundary::new(ids[1], 2)).unwrap(), 2);
        assert_eq!(map.offset_of(Boundary::new(ids[7], 1)).unwrap(), 5);
        assert!(map.offset_of(Boundary::new(ids[1], 3)).is_err());
    }

    #[test]
    fn test_offset_of_element_boundaries() {
        let (doc, ids) = sample();
        let map = TextMap::build(&doc, doc.root());
        let root = doc.root();
        let p2 = ids[4];

        assert_eq!(map.offset_of(Boundary::new(root, 0)).unwrap(), 0);
        assert_eq!(map.offset_of(Boundary::new(root, 1)).unwrap(), 2);
        assert_eq!(map.offset_of(Boundary::new(root, 3)).unwrap(), 6);
        assert_eq!(map.offset_of(Boundary::new(p2, 1)).unwrap(), 4);
        // Inside the span holding only an empty text node.
        assert_eq!(map.offset_of(Boundary::new(ids[2], 1)).unwrap(), 2);
        assert!(map.offset_of(Boundary::new(root, 4)).is_err());
    }

    #[test]
    fn test_offset_of_outside_ancestor_rejected() {
        let (doc, ids) = sample();
        let map = TextMap::build(&doc, ids[4]);
        assert!(map.offset_of(Boundary::new(ids[1], 0)).is_err());
        assert!(map.offset_of(Boundary::new(ids[0], 0)).is_err());
    }

    #[test]
    fn test_multibyte_offsets_count_chars() {
        let mut doc = Document::new("body");
        let root = doc.root();
        doc.append_text(root, "héllo wörld").unwrap();
        let map = TextMap::build(&doc, root);
        assert_eq!(map.len(), 11);
        assert_eq!(map.find("wörld", 0), Some((6, 11)));
        assert_eq!(map.slice(1, 5), "éllo");
    }
}
