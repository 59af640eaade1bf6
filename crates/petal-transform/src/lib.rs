//! Eased property transforms for petal scene nodes.
//!
//! ```
//! use std::time::Duration;
//! use glam::Vec2;
//! use petal_layout::{LayoutOptions, Node, SceneTree, Shape};
//! use petal_transform::{Easing, TransformScheduler};
//!
//! let mut tree = SceneTree::new(LayoutOptions::default());
//! let id = tree.add(tree.root(), Node::shape(Shape::Box)).unwrap();
//! let mut scheduler = TransformScheduler::new();
//!
//! scheduler
//!     .animate(&tree, id)
//!     .unwrap()
//!     .move_to(Vec2::new(0.0, 100.0), Duration::from_millis(500), Easing::OutQuint)
//!     .then()
//!     .fade_out(Duration::from_millis(250), Easing::Linear);
//!
//! scheduler.update(&mut tree, Duration::from_secs(1));
//! assert_eq!(tree.get(id).unwrap().alpha, 0.0);
//! ```

mod easing;
mod scheduler;
mod value;

pub use easing::Easing;
pub use scheduler::{TransformScheduler, TransformSequence};
pub use value::{Animatable, Property, Value};
