//! Render primitives.
//!
//! Every primitive is already in screen space and carries its final colour
//! (alpha composed down the tree).

use glam::Vec2;
use petal_core::{Color, NodeId};
use petal_layout::Bounds;

/// A render command representing something to draw.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Draw a filled rectangle
    Rect(RectPrimitive),
    /// Draw a filled triangle
    Triangle(TrianglePrimitive),
    /// Draw a line segment
    Line(LinePrimitive),
    /// Push a clip region
    PushClip(ClipRegion),
    /// Pop clip region
    PopClip,
}

impl RenderCommand {
    /// Node that produced the command, if it draws anything.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            RenderCommand::Rect(p) => Some(p.node),
            RenderCommand::Triangle(p) => Some(p.node),
            RenderCommand::Line(p) => Some(p.node),
            RenderCommand::PushClip(_) | RenderCommand::PopClip => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RectPrimitive {
    pub node: NodeId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: Color,
}

impl RectPrimitive {
    pub fn new(node: NodeId, bounds: Bounds, color: Color) -> Self {
        Self {
            node,
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            color,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrianglePrimitive {
    pub node: NodeId,
    pub points: [Vec2; 3],
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinePrimitive {
    pub node: NodeId,
    pub from: Vec2,
    pub to: Vec2,
    pub thickness: f32,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl From<Bounds> for ClipRegion {
    fn from(bounds: Bounds) -> Self {
        Self {
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
        }
    }
}

/// Commands for one frame, back to front.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub commands: Vec<RenderCommand>,
    pub width: f32,
    pub height: f32,
}

impl DrawList {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            commands: Vec::new(),
            width,
            height,
        }
    }

    pub fn push(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    pub fn rect(&mut self, rect: RectPrimitive) {
        self.commands.push(RenderCommand::Rect(rect));
    }

    pub fn triangle(&mut self, triangle: TrianglePrimitive) {
        self.commands.push(RenderCommand::Triangle(triangle));
    }

    pub fn line(&mut self, line: LinePrimitive) {
        self.commands.push(RenderCommand::Line(line));
    }

    pub fn push_clip(&mut self, region: ClipRegion) {
        self.commands.push(RenderCommand::PushClip(region));
    }

    pub fn pop_clip(&mut self) {
        self.commands.push(RenderCommand::PopClip);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Nodes that drew something, in draw order.
    pub fn drawn_nodes(&self) -> Vec<NodeId> {
        self.commands.iter().filter_map(RenderCommand::node).collect()
    }
}
