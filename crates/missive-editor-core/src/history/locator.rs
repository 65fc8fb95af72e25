//! Serializable caret positions.
//!
//! A [`SelectionLocator`] survives a full content replacement: it records
//! where the caret was as a path of child indices from the editing root, so
//! it can be resolved again against the freshly parsed tree.

use serde::{Deserialize, Serialize};

/// Recorded caret position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SelectionLocator {
    /// The caret sat directly in the root container. `offset` counts the text
    /// of every root child before the caret.
    Root { offset: usize },
    /// The caret sat inside a descendant reached by following `path`.
    Path { path: Vec<usize>, offset: usize },
}

/// A concrete caret position: a container node and an offset inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomPoint<N> {
    pub node: N,
    pub offset: usize,
}

impl<N> DomPoint<N> {
    pub fn new(node: N, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// Read access to a node tree rooted at the editing container.
///
/// Offsets and text lengths are in whatever unit the platform's selection
/// API uses (UTF-16 code units in the browser).
pub trait NodeTree {
    type Node: Clone;

    /// The editing root.
    fn root(&self) -> Self::Node;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    fn child(&self, node: &Self::Node, index: usize) -> Option<Self::Node>;

    fn child_count(&self, node: &Self::Node) -> usize;

    /// Length of the node's text content, descendants included.
    fn text_len(&self, node: &Self::Node) -> usize;

    /// Largest valid caret offset inside `node`: the text length for text
    /// nodes, the child count for elements.
    fn max_offset(&self, node: &Self::Node) -> usize;

    fn same_node(&self, a: &Self::Node, b: &Self::Node) -> bool;

    fn index_in_parent(&self, node: &Self::Node) -> Option<usize> {
        let parent = self.parent(node)?;
        (0..self.child_count(&parent)).find(|&i| {
            self.child(&parent, i)
                .is_some_and(|child| self.same_node(&child, node))
        })
    }
}

/// Record a caret position relative to the tree's root.
///
/// Returns `None` when the caret is outside the root.
pub fn locate<T: NodeTree>(tree: &T, caret: &DomPoint<T::Node>) -> Option<SelectionLocator> {
    let root = tree.root();
    if tree.same_node(&caret.node, &root) {
        let offset = (0..caret.offset)
            .filter_map(|i| tree.child(&root, i))
            .map(|child| tree.text_len(&child))
            .sum();
        return Some(SelectionLocator::Root { offset });
    }

    let mut path = Vec::new();
    let mut current = caret.node.clone();
    loop {
        let parent = tree.parent(&current)?;
        path.push(tree.index_in_parent(&current)?);
        if tree.same_node(&parent, &root) {
            break;
        }
        current = parent;
    }
    path.reverse();

    Some(SelectionLocator::Path {
        path,
        offset: caret.offset,
    })
}

/// Resolve a recorded locator against the current tree.
///
/// Returns `None` when the path no longer exists or the offset does not fit
/// the node it lands on.
pub fn resolve<T: NodeTree>(tree: &T, locator: &SelectionLocator) -> Option<DomPoint<T::Node>> {
    let root = tree.root();
    let (node, offset) = match locator {
        SelectionLocator::Root { offset } => (tree.child(&root, 0)?, *offset),
        SelectionLocator::Path { path, offset } => {
            if path.is_empty() {
                return None;
            }
            let node = path
                .iter()
                .try_fold(root, |node, &index| tree.child(&node, index))?;
            (node, *offset)
        }
    };

    (offset <= tree.max_offset(&node)).then(|| DomPoint::new(node, offset))
}

/// The caret position after the last child of the root.
pub fn end_point<T: NodeTree>(tree: &T) -> Option<DomPoint<T::Node>> {
    let root = tree.root();
    match tree.child_count(&root) {
        0 => None,
        count => Some(DomPoint::new(root, count)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryTree;

    #[test]
    fn test_locate_text_in_element() {
        let tree = MemoryTree::from_html("a<b>bold</b>tail");
        let bold_text = tree.node_at(&[1, 0]).unwrap();
        let located = locate(&tree, &DomPoint::new(bold_text, 2));
        assert_eq!(
            located,
            Some(SelectionLocator::Path {
                path: vec![1, 0],
                offset: 2
            })
        );
    }

    #[test]
    fn test_locate_root_sums_preceding_text() {
        let tree = MemoryTree::from_html("ab<b>cde</b>f");
        let located = locate(&tree, &DomPoint::new(tree.root(), 2));
        assert_eq!(located, Some(SelectionLocator::Root { offset: 5 }));
    }

    #[test]
    fn test_resolve_round_trips_path() {
        let tree = MemoryTree::from_html("x<div>one</div><div>two</div>");
        let locator = SelectionLocator::Path {
            path: vec![2, 0],
            offset: 1,
        };
        let point = resolve(&tree, &locator).unwrap();
        assert_eq!(tree.text_content(point.node), "two");
        assert_eq!(locate(&tree, &point), Some(locator));
    }

    #[test]
    fn test_resolve_root_uses_first_child() {
        let tree = MemoryTree::from_html("hello<b>x</b>");
        let point = resolve(&tree, &SelectionLocator::Root { offset: 3 }).unwrap();
        assert_eq!(tree.text_content(point.node), "hello");
        assert_eq!(point.offset, 3);
    }

    #[test]
    fn test_resolve_rejects_missing_path() {
        let tree = MemoryTree::from_html("only text");
        let locator = SelectionLocator::Path {
            path: vec![3, 1],
            offset: 0,
        };
        assert_eq!(resolve(&tree, &locator), None);
    }

    #[test]
    fn test_resolve_rejects_offset_past_end() {
        let tree = MemoryTree::from_html("abc");
        let locator = SelectionLocator::Path {
            path: vec![0],
            offset: 9,
        };
        assert_eq!(resolve(&tree, &locator), None);
    }

    #[test]
    fn test_empty_path_does_not_resolve() {
        let tree = MemoryTree::from_html("abc");
        let locator = SelectionLocator::Path {
            path: Vec::new(),
            offset: 0,
        };
        assert_eq!(resolve(&tree, &locator), None);
    }

    #[test]
    fn test_end_point_after_last_child() {
        let tree = MemoryTree::from_html("a<b>b</b>c");
        let end = end_point(&tree).unwrap();
        assert!(tree.same_node(&end.node, &tree.root()));
        assert_eq!(end.offset, 3);
        assert_eq!(end_point(&MemoryTree::from_html("")), None);
    }

    #[test]
    fn test_locator_json_shape() {
        let json = serde_json::to_string(&SelectionLocator::Path {
            path: vec![0, 2],
            offset: 4,
        })
        .unwrap();
        insta::assert_snapshot!(json, @r#"{"kind":"path","path":[0,2],"offset":4}"#);
    }
}
