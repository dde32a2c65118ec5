//! Live document tree.
//!
//! A minimal element/text arena standing in for the host page. Anchors are
//! encoded against it and re-resolved against it; nothing here knows about
//! anchors or persistence.
//!
//! Offsets inside text nodes are counted in `char`s. Tags are stored
//! lowercase.

mod text;
mod xhtml;

pub use text::TextMap;

use crate::error::{GlossError, Result};

/// Handle to a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Element { tag: String, children: Vec<NodeId> },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    kind: NodeKind,
}

/// A position in the tree.
///
/// Inside a text node `offset` counts characters; inside an element it is a
/// child index (the position just before `children[offset]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    pub node: NodeId,
    pub offset: usize,
}

impl Boundary {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A selected range between two boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: Boundary,
    pub end: Boundary,
}

impl Span {
    pub fn new(start: Boundary, end: Boundary) -> Self {
        Self { start, end }
    }
}

/// An element/text tree with a single root element.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    /// Create a document containing only a root element.
    pub fn new(root_tag: &str) -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                kind: NodeKind::Element {
                    tag: root_tag.to_ascii_lowercase(),
                    children: Vec::new(),
                },
            }],
            root: NodeId(0),
        }
    }

    /// Parse well-formed-enough XHTML into a document.
    ///
    /// Comments, processing instructions and the doctype are dropped; HTML
    /// void elements need not be self-closed.
    pub fn parse_xhtml(markup: &str) -> Result<Self> {
        xhtml::parse(markup)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The root content element: `<body>` when present, else the root.
    pub fn body(&self) -> NodeId {
        if self.tag(self.root) == Some("body") {
            return self.root;
        }
        self.element_children(self.root)
            .find(|&child| self.tag(child) == Some("body"))
            .unwrap_or(self.root)
    }

    /// Trimmed text of the first `<title>` element, if any.
    pub fn title(&self) -> Option<String> {
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            if self.tag(node) == Some("title") {
                let title = self.text_content(node).trim().to_string();
                return (!title.is_empty()).then_some(title);
            }
            stack.extend(self.element_children(node).collect::<Vec<_>>().into_iter().rev());
        }
        None
    }

    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> Result<NodeId> {
        let index = self.children(parent)?.len();
        self.insert_node(
            parent,
            index,
            NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
                children: Vec::new(),
            },
        )
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId> {
        let index = self.children(parent)?.len();
        self.insert_node(parent, index, NodeKind::Text(text.to_string()))
    }

    /// Insert a new element at child position `index` of `parent`.
    pub fn insert_element(&mut self, parent: NodeId, index: usize, tag: &str) -> Result<NodeId> {
        self.insert_node(
            parent,
            index,
            NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
                children: Vec::new(),
            },
        )
    }

    /// Insert a new text node at child position `index` of `parent`.
    pub fn insert_text(&mut self, parent: NodeId, index: usize, text: &str) -> Result<NodeId> {
        self.insert_node(parent, index, NodeKind::Text(text.to_string()))
    }

    /// Replace the contents of a text node.
    pub fn set_text(&mut self, node: NodeId, value: &str) -> Result<()> {
        match self.node_mut(node)? {
            Node {
                kind: NodeKind::Text(text),
                ..
            } => {
                *text = value.to_string();
                Ok(())
            }
            _ => Err(GlossError::InvalidInput(format!(
                "Node {} is not a text node",
                node.0
            ))),
        }
    }

    /// Detach `node` from its parent. The node stays in the arena but is no
    /// longer reachable from the root.
    pub fn detach(&mut self, node: NodeId) -> Result<()> {
        let parent = self
            .node(node)?
            .parent
            .ok_or_else(|| GlossError::InvalidInput("Cannot detach the root".to_string()))?;
        if let NodeKind::Element { children, .. } = &mut self.node_mut(parent)?.kind {
            children.retain(|&child| child != node);
        }
        self.node_mut(node)?.parent = None;
        Ok(())
    }

    /// Tag of an element node, `None` for text nodes or unknown ids.
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    /// Contents of a text node, `None` for elements or unknown ids.
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    pub fn is_text(&self, node: NodeId) -> bool {
        self.text(node).is_some()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    /// Children of an element (empty for text nodes).
    pub fn children(&self, node: NodeId) -> Result<&[NodeId]> {
        match &self.node(node)?.kind {
            NodeKind::Element { children, .. } => Ok(children),
            NodeKind::Text(_) => Ok(&[]),
        }
    }

    /// Element children of `node`, in order.
    pub fn element_children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(node)
            .unwrap_or(&[])
            .iter()
            .copied()
            .filter(|&child| !self.is_text(child))
    }

    /// True if `node` is `ancestor` or lies beneath it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// True if `node` is reachable from the root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.contains(self.root, node)
    }

    /// Concatenated text beneath `node`, in document order.
    pub fn text_content(&self, node: NodeId) -> String {
        TextMap::build(self, node).text()
    }

    /// Text covered by `span`.
    pub fn span_text(&self, span: &Span) -> Result<String> {
        let map = TextMap::build(self, self.root);
        let start = map.offset_of(span.start)?;
        let end = map.offset_of(span.end)?;
        let (from, to) = if start <= end { (start, end) } else { (end, start) };
        Ok(map.slice(from, to))
    }

    /// Select the `occurrence`-th (0-based) literal match of `quote` in the
    /// body text.
    pub fn find_text(&self, quote: &str, occurrence: usize) -> Option<Span> {
        let map = TextMap::build(self, self.body());
        let (start, end) = map.find(quote, occurrence)?;
        Some(Span::new(map.locate(start)?, map.locate(end)?))
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id.0)
            .ok_or_else(|| GlossError::InvalidInput(format!("Unknown node {}", id.0)))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id.0)
            .ok_or_else(|| GlossError::InvalidInput(format!("Unknown node {}", id.0)))
    }

    fn insert_node(&mut self, parent: NodeId, index: usize, kind: NodeKind) -> Result<NodeId> {
        let id = NodeId(self.nodes.len());
        match &mut self.node_mut(parent)?.kind {
            NodeKind::Element { children, .. } => {
                if index > children.len() {
                    return Err(GlossError::InvalidInput(format!(
                        "Child index {} out of range ({} children)",
                        index,
                        children.len()
                    )));
                }
                children.insert(index, id);
            }
            NodeKind::Text(_) => {
                return Err(GlossError::InvalidInput(
                    "Text nodes cannot have children".to_string(),
                ))
            }
        }
        self.nodes.push(Node {
            parent: Some(parent),
            kind,
        });
        Ok(id)
    }
}
