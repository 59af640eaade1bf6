//! Scene nodes and what kind of thing each node is.

use glam::Vec2;
use petal_core::{Anchor, Axes, Color, MarginPadding, NodeId};
use smallvec::SmallVec;

use crate::flow::FlowLayout;
use crate::resolve::Placement;
use crate::scroll::{ScrollConfig, ScrollViewport};
use crate::tree::Bounds;

/// A leaf shape drawn inside the node's box.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    /// Filled rectangle covering the box
    Box,
    /// Triangle with its apex at the top centre and its base along the bottom edge
    Triangle,
    /// Straight line between two named points of the box
    Line {
        from: Anchor,
        to: Anchor,
        thickness: f32,
    },
}

/// How a container arranges its children.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arrangement {
    /// Every child places itself by anchor, origin and position
    Free,
    /// Children follow one another along an axis
    Flow(FlowLayout),
    /// Children are clipped to the box and shifted by a scroll offset
    Scroll(ScrollViewport),
}

/// What a node is: something drawn, or something that holds children.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    Shape(Shape),
    Container(Arrangement),
}

impl NodeKind {
    pub fn is_container(&self) -> bool {
        matches!(self, NodeKind::Container(_))
    }

    pub fn arrangement(&self) -> Option<&Arrangement> {
        match self {
            NodeKind::Container(arrangement) => Some(arrangement),
            NodeKind::Shape(_) => None,
        }
    }
}

/// Output of a layout pass for one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedLayout {
    /// Layout box relative to the parent's box, before scaling
    pub bounds: Bounds,
    /// Drawn rectangle in screen space, after all scales and offsets
    pub screen_bounds: Bounds,
    /// Alpha composed down from the root (0 when hidden)
    pub alpha: f32,
    /// Scale composed down from the root
    pub scale: Vec2,
    /// Screen-space clip from enclosing scroll containers
    pub clip: Option<Bounds>,
}

/// A node in the scene tree.
///
/// Public fields are the declarative attributes. Mutating them through
/// [`SceneTree::get_mut`](crate::SceneTree::get_mut) invalidates layout.
#[derive(Debug, Clone)]
pub struct Node {
    /// Optional name for debugging
    pub name: Option<String>,
    pub kind: NodeKind,
    pub anchor: Anchor,
    pub origin: Anchor,
    pub size: Vec2,
    pub relative_size_axes: Axes,
    /// Axes sized to fit the children instead of `size`
    pub auto_size_axes: Axes,
    pub position: Vec2,
    pub relative_position_axes: Axes,
    pub margin: MarginPadding,
    pub padding: MarginPadding,
    /// Sibling ordering key: lower depth is drawn in front
    pub depth: f32,
    pub alpha: f32,
    pub visible: bool,
    pub scale: Vec2,
    pub color: Color,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: SmallVec<[NodeId; 4]>,
    pub(crate) measured: Option<Vec2>,
    pub(crate) resolved: Option<ResolvedLayout>,
}

impl Node {
    /// Create a detached node of the given kind with default attributes.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            name: None,
            kind,
            anchor: Anchor::TopLeft,
            origin: Anchor::TopLeft,
            size: Vec2::ZERO,
            relative_size_axes: Axes::None,
            auto_size_axes: Axes::None,
            position: Vec2::ZERO,
            relative_position_axes: Axes::None,
            margin: MarginPadding::ZERO,
            padding: MarginPadding::ZERO,
            depth: 0.0,
            alpha: 1.0,
            visible: true,
            scale: Vec2::ONE,
            color: Color::WHITE,
            parent: None,
            children: SmallVec::new(),
            measured: None,
            resolved: None,
        }
    }

    pub fn shape(shape: Shape) -> Self {
        Self::new(NodeKind::Shape(shape))
    }

    /// A container whose children place themselves.
    pub fn container() -> Self {
        Self::new(NodeKind::Container(Arrangement::Free))
    }

    pub fn flow(layout: FlowLayout) -> Self {
        Self::new(NodeKind::Container(Arrangement::Flow(layout)))
    }

    pub fn scroll(config: ScrollConfig) -> Self {
        Self::new(NodeKind::Container(Arrangement::Scroll(ScrollViewport::new(config))))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_origin(mut self, origin: Anchor) -> Self {
        self.origin = origin;
        self
    }

    /// Set anchor and origin to the same point.
    pub fn aligned(self, point: Anchor) -> Self {
        self.with_anchor(point).with_origin(point)
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    pub fn with_relative_size_axes(mut self, axes: Axes) -> Self {
        self.relative_size_axes = axes;
        self
    }

    pub fn with_auto_size_axes(mut self, axes: Axes) -> Self {
        self.auto_size_axes = axes;
        self
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_relative_position_axes(mut self, axes: Axes) -> Self {
        self.relative_position_axes = axes;
        self
    }

    pub fn with_margin(mut self, margin: MarginPadding) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_padding(mut self, padding: MarginPadding) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_depth(mut self, depth: f32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Relative size of 1 on both axes.
    pub fn fill_parent(self) -> Self {
        self.with_relative_size_axes(Axes::Both).with_size(Vec2::ONE)
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The placement attributes read by the geometry resolver.
    pub fn placement(&self) -> Placement {
        Placement {
            anchor: self.anchor,
            origin: self.origin,
            size: self.size,
            relative_size_axes: self.relative_size_axes,
            position: self.position,
            relative_position_axes: self.relative_position_axes,
            margin: self.margin,
        }
    }

    /// Full layout result, if the node was resolved by the last pass.
    pub fn layout(&self) -> Option<&ResolvedLayout> {
        self.resolved.as_ref()
    }

    /// Parent-space layout box, if resolved.
    pub fn bounds(&self) -> Option<Bounds> {
        self.resolved.map(|r| r.bounds)
    }

    /// Screen-space drawn rectangle, if resolved.
    pub fn screen_bounds(&self) -> Option<Bounds> {
        self.resolved.map(|r| r.screen_bounds)
    }

    /// Resolved size, if resolved.
    pub fn resolved_size(&self) -> Option<Vec2> {
        self.resolved.map(|r| r.bounds.size())
    }

    /// Composed alpha from the last pass (0 if unresolved).
    pub fn draw_alpha(&self) -> f32 {
        self.resolved.map_or(0.0, |r| r.alpha)
    }

    /// Resolved, visible and not fully transparent.
    pub fn is_present(&self) -> bool {
        self.draw_alpha() > 0.0
    }

    pub fn scroll_viewport(&self) -> Option<&ScrollViewport> {
        match &self.kind {
            NodeKind::Container(Arrangement::Scroll(viewport)) => Some(viewport),
            _ => None,
        }
    }

    pub(crate) fn scroll_viewport_mut(&mut self) -> Option<&mut ScrollViewport> {
        match &mut self.kind {
            NodeKind::Container(Arrangement::Scroll(viewport)) => Some(viewport),
            _ => None,
        }
    }
}
