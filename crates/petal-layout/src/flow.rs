//! Flow layout: children placed one after another along a single axis.
//!
//! The flow owns each child's position on the primary axis. The cross axis is
//! left to the child's own anchor, origin and position.

use glam::Vec2;
use petal_core::{Axis, MarginPadding};

/// Direction children are laid out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlowDirection {
    /// Left to right
    #[default]
    Horizontal,
    /// Top to bottom
    Vertical,
}

impl FlowDirection {
    /// The axis children advance along.
    pub fn primary(self) -> Axis {
        match self {
            FlowDirection::Horizontal => Axis::X,
            FlowDirection::Vertical => Axis::Y,
        }
    }

    /// The axis left to each child's own alignment.
    pub fn cross(self) -> Axis {
        self.primary().other()
    }
}

/// Flow configuration of a container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlowLayout {
    /// Layout direction
    pub direction: FlowDirection,
    /// Gap between consecutive children (only the primary component is used)
    pub spacing: Vec2,
}

/// A child as seen by the flow: its extent and margins on the primary axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlowItem {
    pub extent: f32,
    pub margin_leading: f32,
    pub margin_trailing: f32,
}

impl FlowItem {
    pub fn new(extent: f32) -> Self {
        Self {
            extent,
            ..Default::default()
        }
    }

    /// Build an item from a child's size and margin along `axis`.
    pub fn along(axis: Axis, size: Vec2, margin: &MarginPadding) -> Self {
        Self {
            extent: axis.of(size),
            margin_leading: margin.leading(axis),
            margin_trailing: margin.trailing(axis),
        }
    }
}

/// Result of a flow pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowArrangement {
    /// Primary-axis start of each child, relative to the container's box
    pub offsets: Vec<f32>,
    /// Children, margins and spacing, without padding (0 for no children)
    pub content_extent: f32,
    /// Content extent plus leading and trailing padding
    pub extent: f32,
}

impl FlowLayout {
    /// Create a horizontal flow.
    pub fn horizontal() -> Self {
        Self {
            direction: FlowDirection::Horizontal,
            ..Default::default()
        }
    }

    /// Create a vertical flow.
    pub fn vertical() -> Self {
        Self {
            direction: FlowDirection::Vertical,
            ..Default::default()
        }
    }

    /// Set the spacing vector.
    pub fn with_spacing(mut self, spacing: Vec2) -> Self {
        self.spacing = spacing;
        self
    }

    /// Gap applied between consecutive children.
    pub fn primary_spacing(&self) -> f32 {
        self.direction.primary().of(self.spacing)
    }

    /// Compute primary-axis offsets for children in list order.
    pub fn arrange(&self, padding: &MarginPadding, items: &[FlowItem]) -> FlowArrangement {
        let axis = self.direction.primary();
        let spacing = self.primary_spacing();
        let leading = padding.leading(axis);
        let trailing = padding.trailing(axis);

        let mut running = leading;
        let mut offsets = Vec::with_capacity(items.len());
        for item in items {
            let at = running + item.margin_leading;
            offsets.push(at);
            running = at + item.extent + item.margin_trailing + spacing;
        }

        let content_extent = if items.is_empty() {
            0.0
        } else {
            running - spacing - leading
        };

        FlowArrangement {
            offsets,
            content_extent,
            extent: leading + content_extent + trailing,
        }
    }
}
