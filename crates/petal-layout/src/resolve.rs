//! Geometry resolution.
//!
//! Turns a node's declarative placement (anchor, origin, absolute or relative
//! size and position, margin) into a box inside its parent's content area.
//! Everything here is a pure function of its inputs.

use glam::Vec2;
use petal_core::{Anchor, Axes, Axis, MarginPadding};

use crate::tree::Bounds;

/// Declared placement of a node.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placement {
    /// Point on the parent's content area used as reference
    pub anchor: Anchor,
    /// Point on the node's own box aligned to the anchor
    pub origin: Anchor,
    /// Declared size (pixels, or fractions on relative axes)
    pub size: Vec2,
    pub relative_size_axes: Axes,
    /// Declared offset (pixels, or fractions on relative axes)
    pub position: Vec2,
    pub relative_position_axes: Axes,
    pub margin: MarginPadding,
}

impl Placement {
    /// Resolve the size against the parent's content area. Never negative.
    pub fn resolve_size(&self, parent_content: Vec2) -> Vec2 {
        let mut size = self.size;
        for axis in Axis::BOTH {
            if self.relative_size_axes.contains(axis) {
                axis.set(&mut size, axis.of(self.size) * axis.of(parent_content));
            }
        }
        size.max(Vec2::ZERO)
    }

    /// Resolve the position offset against the parent's content area.
    pub fn resolve_offset(&self, parent_content: Vec2) -> Vec2 {
        let mut offset = self.position;
        for axis in Axis::BOTH {
            if self.relative_position_axes.contains(axis) {
                axis.set(&mut offset, axis.of(self.position) * axis.of(parent_content));
            }
        }
        offset
    }

    /// Start coordinate of the node's box on one axis.
    ///
    /// The outer box (size plus both margins) is aligned by anchor and origin;
    /// the node then sits inside it after its leading margin.
    pub fn place_axis(&self, axis: Axis, size: f32, parent_extent: f32) -> f32 {
        let anchor = axis.of(self.anchor.fraction());
        let origin = axis.of(self.origin.fraction());
        let lead = self.margin.leading(axis);
        let outer = size + lead + self.margin.trailing(axis);
        let offset = if self.relative_position_axes.contains(axis) {
            axis.of(self.position) * parent_extent
        } else {
            axis.of(self.position)
        };

        anchor * parent_extent - origin * outer + offset + lead
    }

    /// Top-left corner of the node's box within the parent's content area.
    pub fn place(&self, size: Vec2, parent_content: Vec2) -> Vec2 {
        Vec2::new(
            self.place_axis(Axis::X, size.x, parent_content.x),
            self.place_axis(Axis::Y, size.y, parent_content.y),
        )
    }

    /// Smallest parent extent on `axis` that keeps this node's outer box
    /// inside `[0, extent]`. Used to auto-size a parent to its children.
    ///
    /// Only meaningful for absolute positions: relative ones on an auto-sized
    /// axis are rejected before this is reached.
    pub fn required_extent(&self, axis: Axis, size: f32) -> f32 {
        let anchor = axis.of(self.anchor.fraction());
        let origin = axis.of(self.origin.fraction());
        let outer = size + self.margin.leading(axis) + self.margin.trailing(axis);
        let start = -origin * outer + axis.of(self.position);

        let mut needed = 0.0_f32;
        if anchor < 1.0 {
            needed = needed.max((start + outer) / (1.0 - anchor));
        }
        if anchor > 0.0 {
            needed = needed.max(-start / anchor);
        }
        needed.max(0.0)
    }
}

/// Resolve a placement into a box inside a parent content area of the given size.
pub fn resolve(placement: &Placement, parent_content: Vec2) -> Bounds {
    let size = placement.resolve_size(parent_content);
    Bounds::from_vecs(placement.place(size, parent_content), size)
}
