//! Contenteditable element as an editing surface.
//!
//! Uses the DOM Selection API to record and restore the caret. Offsets are in
//! UTF-16 code units, as the Selection API counts them.

use missive_editor_core::history::{
    DomPoint, EditorSurface, NodeTree, SelectionLocator, end_point, locate, resolve,
};
use missive_editor_core::SelectionError;
use web_sys::{HtmlElement, Node};

/// An [`EditorSurface`] over a contenteditable element.
#[derive(Debug, Clone)]
pub struct ContentEditableSurface {
    root: HtmlElement,
}

impl ContentEditableSurface {
    pub fn new(root: HtmlElement) -> Self {
        Self { root }
    }

    /// Look the editing root up by element id.
    pub fn from_element_id(id: &str) -> Option<Self> {
        use wasm_bindgen::JsCast;

        let element = web_sys::window()?.document()?.get_element_by_id(id)?;
        element.dyn_into::<HtmlElement>().ok().map(Self::new)
    }

    pub fn element(&self) -> &HtmlElement {
        &self.root
    }

    fn caret_point(&self) -> Option<DomPoint<Node>> {
        let selection = web_sys::window()?.get_selection().ok()??;
        if selection.range_count() == 0 {
            return None;
        }
        let range = selection
            .get_range_at(0)
            .inspect_err(|e| {
                tracing::trace!(target: "missive::cursor", "get_range_at failed: {:?}", e)
            })
            .ok()?;
        let node = range.end_container().ok()?;
        let offset = range.end_offset().ok()?;
        Some(DomPoint::new(node, offset as usize))
    }

    fn place_caret(&self, point: &DomPoint<Node>) -> Result<(), SelectionError> {
        let window = web_sys::window().ok_or(SelectionError::NoSelection)?;
        let document = window.document().ok_or(SelectionError::NoSelection)?;

        let selection = window
            .get_selection()
            .map_err(|e| SelectionError::Platform(format!("get_selection failed: {:?}", e)))?
            .ok_or(SelectionError::NoSelection)?;
        let range = document
            .create_range()
            .map_err(|e| SelectionError::Platform(format!("create_range failed: {:?}", e)))?;

        range
            .set_start(&point.node, point.offset as u32)
            .map_err(|e| SelectionError::Platform(format!("set_start failed: {:?}", e)))?;
        range.collapse_with_to_start(true);

        selection
            .remove_all_ranges()
            .map_err(|e| SelectionError::Platform(format!("remove_all_ranges failed: {:?}", e)))?;
        selection
            .add_range(&range)
            .map_err(|e| SelectionError::Platform(format!("add_range failed: {:?}", e)))?;

        tracing::trace!(
            target: "missive::cursor",
            offset = point.offset,
            "placed caret"
        );
        Ok(())
    }
}

impl NodeTree for ContentEditableSurface {
    type Node = Node;

    fn root(&self) -> Node {
        let node: &Node = &self.root;
        node.clone()
    }

    fn parent(&self, node: &Node) -> Option<Node> {
        node.parent_node()
    }

    fn child(&self, node: &Node, index: usize) -> Option<Node> {
        node.child_nodes().item(index as u32)
    }

    fn child_count(&self, node: &Node) -> usize {
        node.child_nodes().length() as usize
    }

    fn text_len(&self, node: &Node) -> usize {
        node.text_content()
            .map(|text| text.encode_utf16().count())
            .unwrap_or(0)
    }

    fn max_offset(&self, node: &Node) -> usize {
        match node.node_type() {
            Node::TEXT_NODE | Node::CDATA_SECTION_NODE | Node::COMMENT_NODE => {
                self.text_len(node)
            }
            _ => self.child_count(node),
        }
    }

    fn same_node(&self, a: &Node, b: &Node) -> bool {
        a.is_same_node(Some(b))
    }
}

impl EditorSurface for ContentEditableSurface {
    fn html(&self) -> String {
        self.root.inner_html()
    }

    fn set_html(&mut self, html: &str) {
        self.root.set_inner_html(html);
    }

    fn caret(&self) -> Option<SelectionLocator> {
        let point = self.caret_point()?;
        locate(self, &point)
    }

    fn set_caret(&mut self, locator: &SelectionLocator) -> Result<(), SelectionError> {
        let point =
            resolve(self, locator).ok_or_else(|| SelectionError::Unresolved(locator.clone()))?;
        self.place_caret(&point)
    }

    fn set_caret_to_end(&mut self) -> Result<(), SelectionError> {
        let point = end_point(self).ok_or(SelectionError::EmptyContent)?;
        self.place_caret(&point)
    }
}
