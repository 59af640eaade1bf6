//! Scene tree data structures.
//!
//! The tree owns every node. Nodes are created detached, attached by adding
//! them to a container, and destroyed together with their subtree when
//! removed.

use std::collections::HashMap;

use glam::Vec2;
use petal_core::{LayoutError, NodeId, TreeError};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::compute::{compute_layout, LayoutOptions};
use crate::node::Node;

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    /// Position of the top-left corner
    pub x: f32,
    pub y: f32,
    /// Size of the rectangle
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    /// Create bounds with position and size.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Create bounds from position and size vectors.
    pub fn from_vecs(position: Vec2, size: Vec2) -> Self {
        Self::new(position.x, position.y, size.x, size.y)
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Get the right edge (x + width).
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Get the bottom edge (y + height).
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check if a point is inside the bounds.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Compute intersection with another bounds.
    pub fn intersect(&self, other: &Bounds) -> Option<Bounds> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        if x1 < x2 && y1 < y2 {
            Some(Bounds::new(x1, y1, x2 - x1, y2 - y1))
        } else {
            None
        }
    }

    /// Whether the rectangle covers no area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// The scene graph: one root container plus every node created for it.
#[derive(Debug, Clone)]
pub struct SceneTree {
    pub(crate) nodes: HashMap<NodeId, Node>,
    pub(crate) root: NodeId,
    next_id: u64,
    dirty: bool,
    pub(crate) options: LayoutOptions,
}

impl Default for SceneTree {
    fn default() -> Self {
        Self::new(LayoutOptions::default())
    }
}

impl SceneTree {
    /// Create a tree whose root container fills the viewport.
    pub fn new(options: LayoutOptions) -> Self {
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            Node::container()
                .with_name("root")
                .with_size(options.viewport()),
        );
        Self {
            nodes,
            root,
            next_id: 1,
            dirty: true,
            options,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Resize the viewport the root fills.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.options.viewport_width = width;
        self.options.viewport_height = height;
        let size = self.options.viewport();
        if let Some(root) = self.nodes.get_mut(&self.root) {
            root.size = size;
        }
        self.dirty = true;
    }

    /// Take ownership of a detached node and return its id.
    pub fn insert(&mut self, mut node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        node.parent = None;
        node.children.clear();
        node.measured = None;
        node.resolved = None;
        self.nodes.insert(id, node);
        id
    }

    /// Insert a node and attach it to `parent` in one step.
    pub fn add(&mut self, parent: NodeId, node: Node) -> Result<NodeId, TreeError> {
        self.check_container(parent)?;
        let id = self.insert(node);
        self.add_child(parent, id)?;
        Ok(id)
    }

    /// Append an existing detached node to a container's child list.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check_container(parent)?;
        if child == self.root {
            return Err(TreeError::RootRemoval);
        }
        let node = self
            .nodes
            .get(&child)
            .ok_or(TreeError::UnknownNode { node: child })?;
        if let Some(existing) = node.parent {
            return Err(TreeError::AlreadyParented {
                node: child,
                parent: existing,
            });
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(TreeError::WouldCycle { node: child, parent });
        }

        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
        self.dirty = true;
        trace!(%child, %parent, "attached node");
        Ok(())
    }

    /// Detach a node from its parent and destroy it with its whole subtree.
    ///
    /// Returns every destroyed id so callers can drop state keyed by them.
    pub fn remove(&mut self, id: NodeId) -> Result<Vec<NodeId>, TreeError> {
        if id == self.root {
            return Err(TreeError::RootRemoval);
        }
        let node = self.nodes.get(&id).ok_or(TreeError::UnknownNode { node: id })?;
        if let Some(parent) = node.parent {
            if let Some(parent) = self.nodes.get_mut(&parent) {
                parent.children.retain(|c| *c != id);
            }
        }

        let removed = self.descendants_inclusive(id);
        for node in &removed {
            self.nodes.remove(node);
        }
        self.dirty = true;
        debug!(%id, count = removed.len(), "removed subtree");
        Ok(removed)
    }

    fn check_container(&self, id: NodeId) -> Result<(), TreeError> {
        if self.node(id)?.kind.is_container() {
            Ok(())
        } else {
            Err(TreeError::NotAContainer { node: id })
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Get a mutable node by ID. Any mutable access invalidates layout.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let node = self.nodes.get_mut(&id)?;
        self.dirty = true;
        Some(node)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, TreeError> {
        self.get(id).ok_or(TreeError::UnknownNode { node: id })
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        self.get_mut(id).ok_or(TreeError::UnknownNode { node: id })
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// Children of a node in list order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map_or(&[][..], |n| n.children.as_slice())
    }

    /// Whether the node is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// `ancestor` is `node` itself or one of its parents.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// The node and all of its descendants, parents before children.
    pub fn descendants_inclusive(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Force the next [`update_layout`](Self::update_layout) to run.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Resolve geometry for the whole tree if anything changed since the last pass.
    ///
    /// Configuration errors only leave the offending subtree unresolved; the
    /// first one is returned after the rest of the tree has been laid out.
    pub fn update_layout(&mut self) -> Result<(), LayoutError> {
        if !self.dirty {
            return Ok(());
        }
        self.dirty = false;
        compute_layout(self)
    }

    /// Apply a pointer drag to a scroll container.
    pub fn drag_by(&mut self, id: NodeId, delta: Vec2) -> Result<Vec2, TreeError> {
        let node = self.node_mut(id)?;
        let viewport = node
            .scroll_viewport_mut()
            .ok_or(TreeError::NotScrollable { node: id })?;
        Ok(viewport.drag_by(delta))
    }

    /// Apply a wheel delta to a scroll container.
    pub fn scroll_by(&mut self, id: NodeId, wheel: Vec2) -> Result<Vec2, TreeError> {
        let node = self.node_mut(id)?;
        let viewport = node
            .scroll_viewport_mut()
            .ok_or(TreeError::NotScrollable { node: id })?;
        Ok(viewport.scroll_by(wheel))
    }

    /// Jump a scroll container to an offset (clamped).
    pub fn scroll_to(&mut self, id: NodeId, offset: Vec2) -> Result<Vec2, TreeError> {
        let node = self.node_mut(id)?;
        let viewport = node
            .scroll_viewport_mut()
            .ok_or(TreeError::NotScrollable { node: id })?;
        Ok(viewport.scroll_to(offset))
    }

    /// Children sorted for drawing: descending depth, ties in list order.
    pub fn draw_children(&self, id: NodeId) -> SmallVec<[NodeId; 8]> {
        let mut children: SmallVec<[NodeId; 8]> = self.children(id).iter().copied().collect();
        children.sort_by(|a, b| {
            let da = self.nodes.get(a).map_or(0.0, |n| n.depth);
            let db = self.nodes.get(b).map_or(0.0, |n| n.depth);
            db.total_cmp(&da)
        });
        children
    }

    /// Every present node in back-to-front draw order.
    pub fn draw_order(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_draw_order(self.root, &mut out);
        out
    }

    fn collect_draw_order(&self, id: NodeId, out: &mut Vec<NodeId>) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if !node.is_present() {
            return;
        }
        out.push(id);
        for child in self.draw_children(id) {
            self.collect_draw_order(child, out);
        }
    }

    /// Nodes under a screen-space point, innermost first.
    ///
    /// Front-most siblings win; points outside an enclosing scroll viewport
    /// never reach its content.
    pub fn hit_test(&self, point: Vec2) -> Vec<NodeId> {
        let mut chain = Vec::new();
        self.hit_test_recursive(self.root, point, &mut chain);
        chain
    }

    fn hit_test_recursive(&self, id: NodeId, point: Vec2, chain: &mut Vec<NodeId>) -> bool {
        let Some(node) = self.nodes.get(&id) else {
            return false;
        };
        let Some(layout) = node.layout() else {
            return false;
        };
        if layout.alpha <= 0.0 || !layout.screen_bounds.contains(point) {
            return false;
        }
        if let Some(clip) = layout.clip {
            if clip.is_empty() || !clip.contains(point) {
                return false;
            }
        }

        // Test children front to back
        for child in self.draw_children(id).into_iter().rev() {
            if self.hit_test_recursive(child, point, chain) {
                chain.push(id);
                return true;
            }
        }

        chain.push(id);
        true
    }
}
