//! Draw lists for petal scenes.
//!
//! This crate does not rasterize. It walks a laid-out [`SceneTree`] in draw
//! order and emits screen-space primitives for a renderer to consume.
//!
//! [`SceneTree`]: petal_layout::SceneTree

mod draw;
mod primitives;

pub use draw::build_draw_list;
pub use primitives::{ClipRegion, DrawList, LinePrimitive, RectPrimitive, RenderCommand, TrianglePrimitive};
