//! Scrollable viewport state.
//!
//! A scroll container clips its children to its own box and shifts them by
//! the current offset. The offset is always kept inside
//! `[0, max(0, content - viewport)]` on every axis.

use glam::Vec2;
use petal_core::Axis;

/// Axes a viewport scrolls along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    Horizontal,
    #[default]
    Vertical,
    Both,
}

impl ScrollDirection {
    pub fn allows(self, axis: Axis) -> bool {
        match self {
            ScrollDirection::Horizontal => axis == Axis::X,
            ScrollDirection::Vertical => axis == Axis::Y,
            ScrollDirection::Both => true,
        }
    }
}

/// Scroll configuration of a container.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollConfig {
    pub direction: ScrollDirection,
    /// Pixels scrolled per wheel notch
    pub wheel_step: f32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            direction: ScrollDirection::Vertical,
            wheel_step: 80.0,
        }
    }
}

impl ScrollConfig {
    pub fn new(direction: ScrollDirection) -> Self {
        Self {
            direction,
            ..Default::default()
        }
    }

    pub fn with_wheel_step(mut self, wheel_step: f32) -> Self {
        self.wheel_step = wheel_step;
        self
    }
}

/// Offset and extents of one scroll container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollViewport {
    config: ScrollConfig,
    offset: Vec2,
    content: Vec2,
    viewport: Vec2,
}

impl ScrollViewport {
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            config,
            offset: Vec2::ZERO,
            content: Vec2::ZERO,
            viewport: Vec2::ZERO,
        }
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn content_extent(&self) -> Vec2 {
        self.content
    }

    pub fn viewport_extent(&self) -> Vec2 {
        self.viewport
    }

    /// Largest reachable offset per axis (0 on disabled axes).
    pub fn max_offset(&self) -> Vec2 {
        let mut max = Vec2::ZERO;
        for axis in Axis::BOTH {
            if self.config.direction.allows(axis) {
                axis.set(&mut max, (axis.of(self.content) - axis.of(self.viewport)).max(0.0));
            }
        }
        max
    }

    /// Update extents after a layout pass and re-clamp the offset.
    pub fn set_extents(&mut self, content: Vec2, viewport: Vec2) {
        self.content = content.max(Vec2::ZERO);
        self.viewport = viewport.max(Vec2::ZERO);
        self.clamp();
    }

    /// Apply a pointer drag. Content follows the pointer.
    pub fn drag_by(&mut self, delta: Vec2) -> Vec2 {
        self.offset -= delta;
        self.clamp();
        self.offset
    }

    /// Apply a wheel delta in notches. Positive values scroll towards the start.
    ///
    /// A single-axis viewport takes the vertical wheel when its own axis has
    /// no input, so a plain mouse wheel scrolls horizontal lists too.
    pub fn scroll_by(&mut self, wheel: Vec2) -> Vec2 {
        let wheel = match self.config.direction {
            ScrollDirection::Vertical => Vec2::new(0.0, wheel.y),
            ScrollDirection::Horizontal if wheel.x == 0.0 => Vec2::new(wheel.y, 0.0),
            ScrollDirection::Horizontal => Vec2::new(wheel.x, 0.0),
            ScrollDirection::Both => wheel,
        };
        self.offset -= wheel * self.config.wheel_step;
        self.clamp();
        self.offset
    }

    /// Jump to an offset (clamped).
    pub fn scroll_to(&mut self, offset: Vec2) -> Vec2 {
        self.offset = offset;
        self.clamp();
        self.offset
    }

    pub fn scroll_to_start(&mut self) -> Vec2 {
        self.scroll_to(Vec2::ZERO)
    }

    pub fn scroll_to_end(&mut self) -> Vec2 {
        self.scroll_to(self.max_offset())
    }

    fn clamp(&mut self) {
        let max = self.max_offset();
        self.offset = self.offset.clamp(Vec2::ZERO, max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(direction: ScrollDirection, content: Vec2, size: Vec2) -> ScrollViewport {
        let mut v = ScrollViewport::new(ScrollConfig::new(direction));
        v.set_extents(content, size);
        v
    }

    #[test]
    fn test_drag_clamps_both_ends() {
        let mut v = viewport(ScrollDirection::Vertical, Vec2::new(500.0, 1500.0), Vec2::splat(500.0));
        assert_eq!(v.max_offset(), Vec2::new(0.0, 1000.0));

        // Dragging content up scrolls down.
        assert_eq!(v.drag_by(Vec2::new(0.0, -300.0)), Vec2::new(0.0, 300.0));
        assert_eq!(v.drag_by(Vec2::new(0.0, -5000.0)), Vec2::new(0.0, 1000.0));
        assert_eq!(v.drag_by(Vec2::new(0.0, 9000.0)), Vec2::ZERO);
    }

    #[test]
    fn test_disabled_axis_stays_pinned() {
        let mut v = viewport(ScrollDirection::Vertical, Vec2::splat(2000.0), Vec2::splat(500.0));
        let offset = v.drag_by(Vec2::new(-400.0, -100.0));
        assert_eq!(offset, Vec2::new(0.0, 100.0));
    }

    #[test]
    fn test_small_content_absorbs_input() {
        let mut v = viewport(ScrollDirection::Both, Vec2::new(300.0, 200.0), Vec2::splat(500.0));
        assert_eq!(v.drag_by(Vec2::splat(-50.0)), Vec2::ZERO);
        assert_eq!(v.scroll_by(Vec2::new(0.0, -3.0)), Vec2::ZERO);
    }

    #[test]
    fn test_wheel_step() {
        let mut v = viewport(ScrollDirection::Vertical, Vec2::new(100.0, 1000.0), Vec2::splat(100.0));
        assert_eq!(v.scroll_by(Vec2::new(0.0, -2.0)), Vec2::new(0.0, 160.0));
        assert_eq!(v.scroll_by(Vec2::new(0.0, 1.0)), Vec2::new(0.0, 80.0));
    }

    #[test]
    fn test_horizontal_takes_vertical_wheel() {
        let mut v = viewport(ScrollDirection::Horizontal, Vec2::new(1000.0, 100.0), Vec2::splat(100.0));
        assert_eq!(v.scroll_by(Vec2::new(0.0, -1.0)), Vec2::new(80.0, 0.0));
    }

    #[test]
    fn test_shrinking_content_reclamps() {
        let mut v = viewport(ScrollDirection::Vertical, Vec2::new(100.0, 1000.0), Vec2::splat(100.0));
        v.scroll_to_end();
        assert_eq!(v.offset(), Vec2::new(0.0, 900.0));
        v.set_extents(Vec2::new(100.0, 400.0), Vec2::splat(100.0));
        assert_eq!(v.offset(), Vec2::new(0.0, 300.0));
        v.scroll_to_start();
        assert_eq!(v.offset(), Vec2::ZERO);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn offset_always_within_range(
                content_x in 0.0f32..3000.0,
                content_y in 0.0f32..3000.0,
                deltas in proptest::collection::vec((-2000.0f32..2000.0, -2000.0f32..2000.0), 0..40),
            ) {
                let mut v = viewport(ScrollDirection::Both, Vec2::new(content_x, content_y), Vec2::splat(500.0));
                for (dx, dy) in deltas {
                    let offset = v.drag_by(Vec2::new(dx, dy));
                    let max = v.max_offset();
                    prop_assert!(offset.x >= 0.0 && offset.x <= max.x);
                    prop_assert!(offset.y >= 0.0 && offset.y <= max.y);
                    prop_assert!(max.x == (content_x - 500.0).max(0.0));
                }
            }
        }
    }
}
