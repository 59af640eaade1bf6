//! Scene tree and layout for petal.
//!
//! This crate owns the node tree and turns declarative placement attributes
//! into resolved rectangles.
//!
//! # Architecture
//!
//! 1. **Geometry resolution**: anchor, origin, relative or absolute size and
//!    position, margin ([`resolve`])
//! 2. **Flow layout**: children placed one after another along an axis
//! 3. **Scroll viewports**: clipped content shifted by a clamped offset
//! 4. **Layout pass**: measure (sizes, auto-sizing) then place (positions,
//!    screen-space rectangles)
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use petal_core::Anchor;
//! use petal_layout::{LayoutOptions, Node, SceneTree, Shape};
//!
//! let mut tree = SceneTree::new(LayoutOptions::new(1000.0, 1000.0));
//! let id = tree
//!     .add(
//!         tree.root(),
//!         Node::shape(Shape::Box)
//!             .aligned(Anchor::Centre)
//!             .with_size(Vec2::splat(100.0)),
//!     )
//!     .unwrap();
//! tree.update_layout().unwrap();
//!
//! let bounds = tree.get(id).unwrap().bounds().unwrap();
//! assert_eq!(bounds.position(), Vec2::new(450.0, 450.0));
//! ```

mod compute;
mod flow;
mod node;
pub mod resolve;
mod scroll;
mod tree;

pub use compute::LayoutOptions;
pub use flow::{FlowArrangement, FlowDirection, FlowItem, FlowLayout};
pub use node::{Arrangement, Node, NodeKind, ResolvedLayout, Shape};
pub use resolve::{resolve, Placement};
pub use scroll::{ScrollConfig, ScrollDirection, ScrollViewport};
pub use tree::{Bounds, SceneTree};
