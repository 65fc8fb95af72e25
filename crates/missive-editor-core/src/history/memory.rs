//! In-memory node tree and editing surface.
//!
//! Used by headless hosts and tests in place of a live contenteditable
//! element. The HTML reader understands just enough markup to round-trip what
//! the composer produces: nested elements, void elements, raw attributes and
//! text. Character references are kept verbatim.

use super::controller::EditorSurface;
use super::locator::{DomPoint, NodeTree, SelectionLocator, end_point, locate, resolve};
use crate::error::SelectionError;
use smol_str::SmolStr;

const VOID_ELEMENTS: &[&str] = &["br", "img", "hr", "input", "wbr"];

/// Index of a node in a [`MemoryTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeKind {
    Element {
        tag: SmolStr,
        /// Everything between the tag name and `>`, leading space included.
        attrs: String,
        void: bool,
    },
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-allocated node tree. Node 0 is the editing root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryTree {
    nodes: Vec<Node>,
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTree {
    const ROOT: NodeId = NodeId(0);

    /// An empty tree holding just the root container.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Element {
                    tag: SmolStr::new_static("div"),
                    attrs: String::new(),
                    void: false,
                },
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Read `html` as the root's content.
    pub fn from_html(html: &str) -> Self {
        let mut tree = Self::new();
        let mut open = vec![Self::ROOT];
        let mut rest = html;

        while !rest.is_empty() {
            let parent = open.last().copied().unwrap_or(Self::ROOT);

            let Some(after_lt) = rest.strip_prefix('<') else {
                let end = rest.find('<').unwrap_or(rest.len());
                tree.append_text(parent, &rest[..end]);
                rest = &rest[end..];
                continue;
            };

            let Some(end) = after_lt.find('>') else {
                tree.append_text(parent, rest);
                break;
            };
            let inner = &after_lt[..end];

            if let Some(name) = inner.strip_prefix('/') {
                let name = name.trim().to_ascii_lowercase();
                if let Some(pos) = open
                    .iter()
                    .rposition(|&id| id != Self::ROOT && tree.tag(id) == Some(name.as_str()))
                {
                    open.truncate(pos);
                }
                rest = &after_lt[end + 1..];
                continue;
            }

            let name_end = inner
                .find(|c: char| c.is_ascii_whitespace() || c == '/')
                .unwrap_or(inner.len());
            if name_end == 0 {
                // Not a tag; keep the `<` as text.
                tree.append_text(parent, "<");
                rest = after_lt;
                continue;
            }

            let tag = SmolStr::new(inner[..name_end].to_ascii_lowercase());
            let void = VOID_ELEMENTS.contains(&tag.as_str()) || inner.ends_with('/');
            let id = tree.append_element(parent, tag, &inner[name_end..], void);
            if !void {
                open.push(id);
            }
            rest = &after_lt[end + 1..];
        }

        tree
    }

    /// Serialize the root's content.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for &child in &self.node(Self::ROOT).children {
            self.write_html(child, &mut out);
        }
        out
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(parent, NodeKind::Text(text.to_owned()))
    }

    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: impl Into<SmolStr>,
        attrs: &str,
        void: bool,
    ) -> NodeId {
        self.push(
            parent,
            NodeKind::Element {
                tag: tag.into(),
                attrs: attrs.to_owned(),
                void,
            },
        )
    }

    /// Follow child indices from the root.
    pub fn node_at(&self, path: &[usize]) -> Option<NodeId> {
        path.iter()
            .try_fold(Self::ROOT, |id, &index| self.node(id).children.get(index).copied())
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let node = self.node(id);
        match &node.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { .. } => {
                for &child in &node.children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let node = self.node(id);
        match &node.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { tag, attrs, void } => {
                out.push('<');
                out.push_str(tag);
                out.push_str(attrs);
                out.push('>');
                if !void {
                    for &child in &node.children {
                        self.write_html(child, out);
                    }
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                }
            }
        }
    }
}

impl NodeTree for MemoryTree {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        Self::ROOT
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.node(*node).parent
    }

    fn child(&self, node: &NodeId, index: usize) -> Option<NodeId> {
        self.node(*node).children.get(index).copied()
    }

    fn child_count(&self, node: &NodeId) -> usize {
        self.node(*node).children.len()
    }

    fn text_len(&self, node: &NodeId) -> usize {
        let node = self.node(*node);
        match &node.kind {
            NodeKind::Text(text) => text.chars().count(),
            NodeKind::Element { .. } => node
                .children
                .iter()
                .map(|child| self.text_len(child))
                .sum(),
        }
    }

    fn max_offset(&self, node: &NodeId) -> usize {
        let inner = self.node(*node);
        match &inner.kind {
            NodeKind::Text(text) => text.chars().count(),
            NodeKind::Element { .. } => inner.children.len(),
        }
    }

    fn same_node(&self, a: &NodeId, b: &NodeId) -> bool {
        a == b
    }

    fn index_in_parent(&self, node: &NodeId) -> Option<usize> {
        let parent = self.node(*node).parent?;
        self.node(parent).children.iter().position(|id| id == node)
    }
}

/// An [`EditorSurface`] over a [`MemoryTree`] with a single caret.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    tree: MemoryTree,
    caret: Option<DomPoint<NodeId>>,
}

impl MemorySurface {
    pub fn new(html: &str) -> Self {
        Self {
            tree: MemoryTree::from_html(html),
            caret: None,
        }
    }

    pub fn tree(&self) -> &MemoryTree {
        &self.tree
    }

    pub fn caret_point(&self) -> Option<&DomPoint<NodeId>> {
        self.caret.as_ref()
    }

    /// Put the caret inside the node at `path`. Returns false if there is no
    /// such node or the offset does not fit.
    pub fn place_caret(&mut self, path: &[usize], offset: usize) -> bool {
        match self.tree.node_at(path) {
            Some(node) if offset <= self.tree.max_offset(&node) => {
                self.caret = Some(DomPoint::new(node, offset));
                true
            }
            _ => false,
        }
    }

    /// Simulate the user editing the content: replace it and put the caret at
    /// the end of the last text.
    pub fn edit(&mut self, html: &str) {
        self.tree = MemoryTree::from_html(html);
        self.caret = end_point(&self.tree);
    }
}

impl EditorSurface for MemorySurface {
    fn html(&self) -> String {
        self.tree.to_html()
    }

    fn set_html(&mut self, html: &str) {
        self.tree = MemoryTree::from_html(html);
        self.caret = None;
    }

    fn caret(&self) -> Option<SelectionLocator> {
        locate(&self.tree, self.caret.as_ref()?)
    }

    fn set_caret(&mut self, locator: &SelectionLocator) -> Result<(), SelectionError> {
        let point = resolve(&self.tree, locator)
            .ok_or_else(|| SelectionError::Unresolved(locator.clone()))?;
        self.caret = Some(point);
        Ok(())
    }

    fn set_caret_to_end(&mut self) -> Result<(), SelectionError> {
        let point = end_point(&self.tree).ok_or(SelectionError::EmptyContent)?;
        self.caret = Some(point);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_round_trip() {
        let html = r#"one<div>two <b>bold</b></div><div><br></div><img alt="x" data-document-id="1">"#;
        assert_eq!(MemoryTree::from_html(html).to_html(), html);
    }

    #[test]
    fn test_self_closing_kept() {
        assert_eq!(MemoryTree::from_html("a<br/>b").to_html(), "a<br/>b");
    }

    #[test]
    fn test_unclosed_element_closed_on_output() {
        assert_eq!(MemoryTree::from_html("<b>open").to_html(), "<b>open</b>");
    }

    #[test]
    fn test_stray_angle_bracket_is_text() {
        let tree = MemoryTree::from_html("a < b");
        assert_eq!(tree.to_html(), "a < b");
        assert_eq!(tree.text_content(tree.root()), "a < b");
    }

    #[test]
    fn test_structure() {
        let tree = MemoryTree::from_html("x<div>y<i>z</i></div>");
        let div = tree.node_at(&[1]).unwrap();
        assert_eq!(tree.tag(div), Some("div"));
        assert_eq!(tree.child_count(&div), 2);
        assert_eq!(tree.text_content(div), "yz");
        assert_eq!(tree.text_len(&tree.root()), 3);
        assert_eq!(tree.index_in_parent(&div), Some(1));
    }

    #[test]
    fn test_surface_caret_round_trip() {
        let mut surface = MemorySurface::new("hi<div>there</div>");
        assert!(surface.place_caret(&[1, 0], 3));
        let locator = surface.caret().unwrap();

        surface.set_html("hi<div>there</div>");
        assert_eq!(surface.caret(), None);
        surface.set_caret(&locator).unwrap();
        assert_eq!(surface.caret(), Some(locator));
    }

    #[test]
    fn test_surface_set_caret_unresolved() {
        let mut surface = MemorySurface::new("short");
        let locator = SelectionLocator::Path {
            path: vec![4],
            offset: 0,
        };
        assert_eq!(
            surface.set_caret(&locator),
            Err(SelectionError::Unresolved(locator))
        );
        assert_eq!(
            MemorySurface::new("").set_caret_to_end(),
            Err(SelectionError::EmptyContent)
        );
    }
}
