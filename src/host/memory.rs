//! In-memory document used by the CLI and the test suite.
//!
//! Text is measured with a fixed advance per character, scaled by font size,
//! so layouts are reproducible without a font stack. Text nodes anchor at
//! their translation: horizontally per alignment, vertically at the center.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use super::{DocumentHost, DocumentQuery, SelectionListener, SubscriptionId};
use crate::color::Rgba;
use crate::error::{Result, TableError};
use crate::types::{
    Bounds, CharacterStyle, NodeId, NodeKind, Point, Size, Stroke, TextAlignment, Transform,
};

/// Operations that can be made to fail on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostOp {
    CreateRectangle,
    CreateText,
    CreateGroup,
    RemoveNode,
    AppendChild,
    BoundsLocal,
    Children,
    SetMetadata,
    SetSelection,
    SetTransform,
    Subscribe,
}

impl HostOp {
    fn name(self) -> &'static str {
        match self {
            Self::CreateRectangle => "createRectangle",
            Self::CreateText => "createText",
            Self::CreateGroup => "createGroup",
            Self::RemoveNode => "removeNode",
            Self::AppendChild => "appendChild",
            Self::BoundsLocal => "boundsLocal",
            Self::Children => "children",
            Self::SetMetadata => "setMetadata",
            Self::SetSelection => "setSelection",
            Self::SetTransform => "setTransform",
            Self::Subscribe => "subscribeSelectionChange",
        }
    }
}

/// Deterministic text metrics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    /// Advance of one character at `default_font_size`
    pub char_width: f64,
    /// Line height as a multiple of font size
    pub line_height_factor: f64,
    /// Size of freshly created text
    pub default_font_size: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 7.5,
            line_height_factor: 1.2,
            default_font_size: 15.0,
        }
    }
}

/// One node of the in-memory tree
#[derive(Debug, Clone)]
pub struct MemoryNode {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub width: f64,
    pub height: f64,
    pub translation: Point,
    pub transform: Transform,
    pub fill: Option<Rgba>,
    pub stroke: Option<Stroke>,
    pub text: String,
    pub font_size: f64,
    pub text_color: Option<Rgba>,
    pub alignment: TextAlignment,
    pub metadata: BTreeMap<String, String>,
}

impl MemoryNode {
    fn new(kind: NodeKind, font_size: f64) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            width: 0.0,
            height: 0.0,
            translation: Point::default(),
            transform: Transform::IDENTITY,
            fill: None,
            stroke: None,
            text: String::new(),
            font_size,
            text_color: None,
            alignment: TextAlignment::Left,
            metadata: BTreeMap::new(),
        }
    }
}

/// Serializable snapshot of a subtree
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SceneNode>,
}

/// A self-contained document: one root holding one artboard
pub struct MemoryDocument {
    nodes: HashMap<NodeId, MemoryNode>,
    root: NodeId,
    artboard: NodeId,
    next_id: u64,
    selection: Vec<NodeId>,
    listeners: Vec<(SubscriptionId, SelectionListener)>,
    next_subscription: u64,
    canvas: Size,
    metrics: TextMetrics,
    failing: HashSet<HostOp>,
    created: usize,
    removed: usize,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// A 1080x1080 page with default text metrics
    pub fn new() -> Self {
        Self::with_canvas(Size {
            width: 1080.0,
            height: 1080.0,
        })
    }

    pub fn with_canvas(canvas: Size) -> Self {
        let metrics = TextMetrics::default();
        let root = NodeId::new("document");
        let artboard = NodeId::new("artboard");
        let mut nodes = HashMap::new();

        let mut root_node = MemoryNode::new(NodeKind::Group, metrics.default_font_size);
        root_node.children.push(artboard.clone());
        let mut artboard_node = MemoryNode::new(NodeKind::Group, metrics.default_font_size);
        artboard_node.parent = Some(root.clone());
        artboard_node.width = canvas.width;
        artboard_node.height = canvas.height;
        nodes.insert(root.clone(), root_node);
        nodes.insert(artboard.clone(), artboard_node);

        Self {
            nodes,
            root,
            artboard,
            next_id: 1,
            selection: Vec::new(),
            listeners: Vec::new(),
            next_subscription: 1,
            canvas,
            metrics,
            failing: HashSet::new(),
            created: 0,
            removed: 0,
        }
    }

    pub fn with_metrics(mut self, metrics: TextMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> TextMetrics {
        self.metrics
    }

    /// Switch metrics in place, as when the user picks another default font
    pub fn set_metrics(&mut self, metrics: TextMetrics) {
        self.metrics = metrics;
    }

    /// Make every later call of `op` fail until [`MemoryDocument::recover`]
    pub fn fail(&mut self, op: HostOp) {
        self.failing.insert(op);
    }

    pub fn recover(&mut self, op: HostOp) {
        self.failing.remove(&op);
    }

    pub fn node(&self, id: &NodeId) -> Option<&MemoryNode> {
        self.nodes.get(id)
    }

    /// Nodes created through the host API so far
    pub fn created_count(&self) -> usize {
        self.created
    }

    pub fn removed_count(&self) -> usize {
        self.removed
    }

    /// Created nodes that were never attached to the tree
    pub fn orphan_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|(id, node)| node.parent.is_none() && **id != self.root)
            .count()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Replace the selection the way a user click would
    pub fn user_select(&mut self, ids: &[NodeId]) -> Result<()> {
        self.apply_selection(ids)
    }

    /// Snapshot of the tree below `id`
    pub fn scene(&self, id: &NodeId) -> Option<SceneNode> {
        let node = self.nodes.get(id)?;
        let sized = node.kind == NodeKind::Rectangle;
        let scale = node.transform.a;
        Some(SceneNode {
            id: id.clone(),
            kind: node.kind,
            x: node.translation.x,
            y: node.translation.y,
            width: sized.then_some(node.width),
            height: sized.then_some(node.height),
            fill: node.fill.map(|c| c.to_hex()),
            text: (node.kind == NodeKind::Text).then(|| node.text.clone()),
            scale: ((scale - 1.0).abs() > f64::EPSILON).then_some(scale),
            metadata: node.metadata.clone(),
            children: node
                .children
                .iter()
                .filter_map(|child| self.scene(child))
                .collect(),
        })
    }

    fn check(&self, op: HostOp) -> Result<()> {
        if self.failing.contains(&op) {
            return Err(TableError::host(op.name(), "injected failure"));
        }
        Ok(())
    }

    fn get(&self, id: &NodeId) -> Result<&MemoryNode> {
        self.nodes
            .get(id)
            .ok_or_else(|| TableError::host("lookup", format!("node {id} is not in the document")))
    }

    fn get_mut(&mut self, id: &NodeId) -> Result<&mut MemoryNode> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| TableError::host("lookup", format!("node {id} is not in the document")))
    }

    fn create(&mut self, op: HostOp, kind: NodeKind) -> Result<NodeId> {
        self.check(op)?;
        let id = NodeId::new(format!("node-{}", self.next_id));
        self.next_id += 1;
        self.created += 1;
        self.nodes.insert(
            id.clone(),
            MemoryNode::new(kind, self.metrics.default_font_size),
        );
        Ok(id)
    }

    #[allow(clippy::cast_precision_loss)]
    fn text_bounds(&self, node: &MemoryNode) -> Bounds {
        let scale = node.font_size / self.metrics.default_font_size;
        let longest = node
            .text
            .split('\n')
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        let lines = node.text.split('\n').count().max(1);
        let width = longest as f64 * self.metrics.char_width * scale;
        let height = lines as f64 * node.font_size * self.metrics.line_height_factor;
        let x = match node.alignment {
            TextAlignment::Left => 0.0,
            TextAlignment::Center => -width / 2.0,
            TextAlignment::Right => -width,
        };
        Bounds::new(x, -height / 2.0, width, height)
    }

    fn local_bounds(&self, id: &NodeId) -> Result<Bounds> {
        let node = self.get(id)?;
        Ok(match node.kind {
            NodeKind::Rectangle => Bounds::new(0.0, 0.0, node.width, node.height),
            NodeKind::Text => self.text_bounds(node),
            NodeKind::Group => {
                let mut acc: Option<Bounds> = None;
                for child_id in &node.children {
                    let child = self.get(child_id)?;
                    let b = self.local_bounds(child_id)?;
                    let scaled = Bounds::new(
                        b.x * child.transform.a,
                        b.y * child.transform.d,
                        b.width * child.transform.a,
                        b.height * child.transform.d,
                    )
                    .translate(child.translation);
                    acc = Some(acc.map_or(scaled, |a| a.union(&scaled)));
                }
                acc.unwrap_or_default()
            }
        })
    }

    fn detach(&mut self, id: &NodeId) -> Result<()> {
        let parent = self.get(id)?.parent.clone();
        if let Some(parent) = parent {
            self.get_mut(&parent)?.children.retain(|c| c != id);
            self.get_mut(id)?.parent = None;
        }
        Ok(())
    }

    fn drop_subtree(&mut self, id: &NodeId) {
        if let Some(node) = self.nodes.remove(id) {
            self.removed += 1;
            for child in &node.children {
                self.drop_subtree(child);
            }
        }
    }

    fn apply_selection(&mut self, ids: &[NodeId]) -> Result<()> {
        if let Some(missing) = ids.iter().find(|id| !self.nodes.contains_key(*id)) {
            return Err(TableError::host(
                HostOp::SetSelection.name(),
                format!("node {missing} is not in the document"),
            ));
        }
        self.selection = ids.to_vec();
        self.notify_selection();
        Ok(())
    }

    fn notify_selection(&mut self) {
        let mut listeners = std::mem::take(&mut self.listeners);
        let selection = self.selection.clone();
        {
            let view: &dyn DocumentQuery = &*self;
            for (_, listener) in &mut listeners {
                listener(view, &selection);
            }
        }
        self.listeners = listeners;
    }
}

impl DocumentQuery for MemoryDocument {
    fn document_root(&self) -> Result<NodeId> {
        Ok(self.root.clone())
    }

    fn insertion_parent(&self) -> Result<NodeId> {
        Ok(self.artboard.clone())
    }

    fn canvas_size(&self) -> Result<Size> {
        Ok(self.canvas)
    }

    fn node_kind(&self, id: &NodeId) -> Result<NodeKind> {
        Ok(self.get(id)?.kind)
    }

    fn children(&self, id: &NodeId) -> Result<Vec<NodeId>> {
        self.check(HostOp::Children)?;
        Ok(self.get(id)?.children.clone())
    }

    fn parent(&self, id: &NodeId) -> Result<Option<NodeId>> {
        Ok(self.get(id)?.parent.clone())
    }

    fn bounds_local(&self, id: &NodeId) -> Result<Bounds> {
        self.check(HostOp::BoundsLocal)?;
        self.local_bounds(id)
    }

    fn transform(&self, id: &NodeId) -> Result<Transform> {
        Ok(self.get(id)?.transform)
    }

    fn metadata(&self, id: &NodeId, key: &str) -> Result<Option<String>> {
        Ok(self.get(id)?.metadata.get(key).cloned())
    }

    fn metadata_keys(&self, id: &NodeId) -> Result<Vec<String>> {
        Ok(self.get(id)?.metadata.keys().cloned().collect())
    }

    fn selection(&self) -> Result<Vec<NodeId>> {
        Ok(self.selection.clone())
    }
}

impl DocumentHost for MemoryDocument {
    fn create_rectangle(&mut self) -> Result<NodeId> {
        self.create(HostOp::CreateRectangle, NodeKind::Rectangle)
    }

    fn create_text(&mut self) -> Result<NodeId> {
        self.create(HostOp::CreateText, NodeKind::Text)
    }

    fn create_group(&mut self) -> Result<NodeId> {
        self.create(HostOp::CreateGroup, NodeKind::Group)
    }

    fn remove_node(&mut self, id: &NodeId) -> Result<()> {
        self.check(HostOp::RemoveNode)?;
        if id == &self.root || id == &self.artboard {
            return Err(TableError::host(
                HostOp::RemoveNode.name(),
                "the document root and artboard cannot be removed",
            ));
        }
        self.detach(id)?;
        self.drop_subtree(id);
        let before = self.selection.len();
        let nodes = &self.nodes;
        self.selection.retain(|s| nodes.contains_key(s));
        if self.selection.len() != before {
            self.notify_selection();
        }
        Ok(())
    }

    fn set_size(&mut self, id: &NodeId, width: f64, height: f64) -> Result<()> {
        let node = self.get_mut(id)?;
        node.width = width;
        node.height = height;
        Ok(())
    }

    fn set_translation(&mut self, id: &NodeId, at: Point) -> Result<()> {
        self.get_mut(id)?.translation = at;
        Ok(())
    }

    fn set_fill(&mut self, id: &NodeId, color: Rgba) -> Result<()> {
        self.get_mut(id)?.fill = Some(color);
        Ok(())
    }

    fn set_stroke(&mut self, id: &NodeId, stroke: Stroke) -> Result<()> {
        self.get_mut(id)?.stroke = Some(stroke);
        Ok(())
    }

    fn set_text(&mut self, id: &NodeId, text: &str) -> Result<()> {
        let node = self.get_mut(id)?;
        if node.kind != NodeKind::Text {
            return Err(TableError::host("setText", format!("node {id} is not text")));
        }
        node.text = text.to_string();
        Ok(())
    }

    fn apply_character_style(&mut self, id: &NodeId, style: &CharacterStyle) -> Result<()> {
        let node = self.get_mut(id)?;
        node.font_size = style.font_size;
        node.text_color = Some(style.color);
        Ok(())
    }

    fn set_text_alignment(&mut self, id: &NodeId, alignment: TextAlignment) -> Result<()> {
        self.get_mut(id)?.alignment = alignment;
        Ok(())
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<()> {
        self.check(HostOp::AppendChild)?;
        if parent == child || self.get(parent)?.kind != NodeKind::Group {
            return Err(TableError::host(
                HostOp::AppendChild.name(),
                format!("node {parent} cannot contain {child}"),
            ));
        }
        self.detach(child)?;
        self.get_mut(parent)?.children.push(child.clone());
        self.get_mut(child)?.parent = Some(parent.clone());
        Ok(())
    }

    fn set_transform(&mut self, id: &NodeId, transform: Transform) -> Result<()> {
        self.check(HostOp::SetTransform)?;
        self.get_mut(id)?.transform = transform;
        Ok(())
    }

    fn set_metadata(&mut self, id: &NodeId, key: &str, value: &str) -> Result<()> {
        self.check(HostOp::SetMetadata)?;
        self.get_mut(id)?
            .metadata
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn set_selection(&mut self, ids: &[NodeId]) -> Result<()> {
        self.check(HostOp::SetSelection)?;
        self.apply_selection(ids)
    }

    fn subscribe_selection_change(
        &mut self,
        listener: SelectionListener,
    ) -> Result<SubscriptionId> {
        self.check(HostOp::Subscribe)?;
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, listener));
        Ok(id)
    }

    fn unsubscribe_selection_change(&mut self, subscription: SubscriptionId) -> Result<()> {
        self.listeners.retain(|(id, _)| *id != subscription);
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_text_width_scales_with_font_size() {
        let mut doc = MemoryDocument::new();
        let text = doc.create_text().unwrap();
        doc.set_text(&text, "abcd").unwrap();
        assert_eq!(doc.bounds_local(&text).unwrap().width, 30.0);

        let style = CharacterStyle {
            font_size: 30.0,
            color: Rgba::BLACK,
        };
        doc.apply_character_style(&text, &style).unwrap();
        assert_eq!(doc.bounds_local(&text).unwrap().width, 60.0);
    }

    #[test]
    fn test_multiline_text_height() {
        let mut doc = MemoryDocument::new();
        let text = doc.create_text().unwrap();
        doc.set_text(&text, "ab\ncdef\ng").unwrap();
        let b = doc.bounds_local(&text).unwrap();
        assert_eq!(b.width, 30.0);
        assert!((b.height - 54.0).abs() < 1e-9);
    }

    #[test]
    fn test_group_bounds_cover_children() {
        let mut doc = MemoryDocument::new();
        let group = doc.create_group().unwrap();
        let a = doc.create_rectangle().unwrap();
        let b = doc.create_rectangle().unwrap();
        doc.set_size(&a, 10.0, 10.0).unwrap();
        doc.set_size(&b, 10.0, 20.0).unwrap();
        doc.set_translation(&b, Point::new(30.0, 5.0)).unwrap();
        doc.append_child(&group, &a).unwrap();
        doc.append_child(&group, &b).unwrap();
        assert_eq!(
            doc.bounds_local(&group).unwrap(),
            Bounds::new(0.0, 0.0, 40.0, 25.0)
        );
    }

    #[test]
    fn test_remove_node_drops_subtree_and_selection() {
        let mut doc = MemoryDocument::new();
        let artboard = doc.insertion_parent().unwrap();
        let group = doc.create_group().unwrap();
        let rect = doc.create_rectangle().unwrap();
        doc.append_child(&group, &rect).unwrap();
        doc.append_child(&artboard, &group).unwrap();
        doc.set_selection(&[rect.clone()]).unwrap();

        doc.remove_node(&group).unwrap();
        assert!(doc.node(&rect).is_none());
        assert!(doc.selection().unwrap().is_empty());
        assert!(doc.children(&artboard).unwrap().is_empty());
    }

    #[test]
    fn test_listeners_see_new_selection() {
        let mut doc = MemoryDocument::new();
        let rect = doc.create_rectangle().unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = doc
            .subscribe_selection_change(Box::new(move |_, ids| {
                sink.borrow_mut().extend_from_slice(ids);
            }))
            .unwrap();
        doc.user_select(&[rect.clone()]).unwrap();
        assert_eq!(*seen.borrow(), vec![rect.clone()]);

        doc.unsubscribe_selection_change(sub).unwrap();
        doc.user_select(&[]).unwrap();
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(doc.listener_count(), 0);
    }

    #[test]
    fn test_injected_failure() {
        let mut doc = MemoryDocument::new();
        doc.fail(HostOp::CreateGroup);
        let err = doc.create_group().unwrap_err();
        assert!(err.is_host_failure());
        doc.recover(HostOp::CreateGroup);
        assert!(doc.create_group().is_ok());
    }

    #[test]
    fn test_selecting_unknown_node_fails() {
        let mut doc = MemoryDocument::new();
        assert!(doc.set_selection(&[NodeId::new("ghost")]).is_err());
    }
}
