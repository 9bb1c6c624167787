//! Boundary with the host document service.
//!
//! The document owns every node; this crate only holds ids. Reads and writes
//! are split so that selection-change listeners, which run inside the host's
//! notification, get a read-only view of the document.

pub mod memory;

#[cfg(target_arch = "wasm32")]
pub mod js;

use crate::color::Rgba;
use crate::error::Result;
use crate::types::{
    Bounds, CharacterStyle, NodeId, NodeKind, Point, Size, Stroke, TextAlignment, Transform,
};

pub use memory::{HostOp, MemoryDocument, MemoryNode, SceneNode, TextMetrics};

/// Handle returned by [`DocumentHost::subscribe_selection_change`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Callback invoked with the document's new selection after every change
pub type SelectionListener = Box<dyn FnMut(&dyn DocumentQuery, &[NodeId])>;

/// Read access to the document tree
pub trait DocumentQuery {
    /// Top of the tree walked when verifying that a node still exists
    fn document_root(&self) -> Result<NodeId>;

    /// Container new tables are appended to (the active artboard)
    fn insertion_parent(&self) -> Result<NodeId>;

    /// Dimensions of the current page
    fn canvas_size(&self) -> Result<Size>;

    fn node_kind(&self, id: &NodeId) -> Result<NodeKind>;

    /// Children in paint order; empty for non-containers
    fn children(&self, id: &NodeId) -> Result<Vec<NodeId>>;

    fn parent(&self, id: &NodeId) -> Result<Option<NodeId>>;

    /// Rendered bounding box in the node's own coordinates
    fn bounds_local(&self, id: &NodeId) -> Result<Bounds>;

    fn transform(&self, id: &NodeId) -> Result<Transform>;

    fn metadata(&self, id: &NodeId, key: &str) -> Result<Option<String>>;

    fn metadata_keys(&self, id: &NodeId) -> Result<Vec<String>>;

    fn selection(&self) -> Result<Vec<NodeId>>;

    fn child_count(&self, id: &NodeId) -> Result<usize> {
        Ok(self.children(id)?.len())
    }

    fn child_at(&self, id: &NodeId, index: usize) -> Result<Option<NodeId>> {
        Ok(self.children(id)?.into_iter().nth(index))
    }
}

/// Mutating access to the document
pub trait DocumentHost: DocumentQuery {
    fn create_rectangle(&mut self) -> Result<NodeId>;

    fn create_text(&mut self) -> Result<NodeId>;

    fn create_group(&mut self) -> Result<NodeId>;

    /// Detach a node (and its subtree) from the document
    fn remove_node(&mut self, id: &NodeId) -> Result<()>;

    fn set_size(&mut self, id: &NodeId, width: f64, height: f64) -> Result<()>;

    fn set_translation(&mut self, id: &NodeId, at: Point) -> Result<()>;

    fn set_fill(&mut self, id: &NodeId, color: Rgba) -> Result<()>;

    fn set_stroke(&mut self, id: &NodeId, stroke: Stroke) -> Result<()>;

    fn set_text(&mut self, id: &NodeId, text: &str) -> Result<()>;

    fn apply_character_style(&mut self, id: &NodeId, style: &CharacterStyle) -> Result<()>;

    fn set_text_alignment(&mut self, id: &NodeId, alignment: TextAlignment) -> Result<()>;

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<()>;

    fn set_transform(&mut self, id: &NodeId, transform: Transform) -> Result<()>;

    fn set_metadata(&mut self, id: &NodeId, key: &str, value: &str) -> Result<()>;

    /// Replace the document selection
    fn set_selection(&mut self, ids: &[NodeId]) -> Result<()>;

    fn subscribe_selection_change(&mut self, listener: SelectionListener)
        -> Result<SubscriptionId>;

    fn unsubscribe_selection_change(&mut self, subscription: SubscriptionId) -> Result<()>;
}

/// Depth-first search for `target` below `root`, inclusive.
///
/// Cost is linear in the number of nodes visited. Tables are shallow
/// (root, row, cell, primitive) so the walk is dominated by the rest of
/// the document.
pub fn contains_node<Q: DocumentQuery + ?Sized>(
    doc: &Q,
    root: &NodeId,
    target: &NodeId,
) -> Result<bool> {
    let mut stack = vec![root.clone()];
    while let Some(id) = stack.pop() {
        if &id == target {
            return Ok(true);
        }
        if doc.node_kind(&id)? == NodeKind::Group {
            stack.extend(doc.children(&id)?);
        }
    }
    Ok(false)
}
