//! petal: a retained-mode scene graph engine.
//!
//! Nodes are positioned declaratively (anchor, origin, relative or absolute
//! size and position, margin, padding), arranged by flow and scroll
//! containers, grouped into navigable screens and animated by eased
//! transforms. A [`Scene`] ties it all together and produces a depth-ordered
//! [`DrawList`] for a renderer.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use petal::prelude::*;
//!
//! let mut scene = Scene::new(SceneOptions::default().with_viewport(1000.0, 1000.0));
//! let id = scene
//!     .add(
//!         scene.root(),
//!         Node::shape(Shape::Box)
//!             .aligned(Anchor::Centre)
//!             .with_size(Vec2::splat(100.0))
//!             .with_alpha(0.0),
//!     )
//!     .unwrap();
//! scene
//!     .animate(id)
//!     .unwrap()
//!     .fade_in(Duration::from_millis(500), Easing::OutQuint);
//!
//! scene.update(Duration::from_secs(1)).unwrap();
//! let bounds = scene.tree().get(id).unwrap().screen_bounds().unwrap();
//! assert_eq!(bounds.position(), Vec2::new(450.0, 450.0));
//! assert_eq!(scene.draw_list().len(), 1);
//! ```

mod mutation;
mod scene;

pub use mutation::{ApplyFn, Mutation, MutationSender, SceneClosed};
pub use scene::{Scene, SceneOptions};

pub use petal_core as core;
pub use petal_layout as layout;
pub use petal_render_2d as render;
pub use petal_screen as screen;
pub use petal_transform as transform;

pub use petal_core::PetalError;
pub use petal_render_2d::DrawList;

/// Common imports.
pub mod prelude {
    pub use crate::{Mutation, MutationSender, Scene, SceneOptions};
    pub use petal_core::{
        Anchor, Axes, Axis, Color, MarginPadding, NodeId, PetalError, ScreenId, Vec2,
    };
    pub use petal_layout::{
        Bounds, FlowDirection, FlowLayout, LayoutOptions, Node, SceneTree, ScrollConfig,
        ScrollDirection, Shape,
    };
    pub use petal_render_2d::{DrawList, RenderCommand};
    pub use petal_screen::{Screen, ScreenContext, ScreenState};
    pub use petal_transform::{Easing, Property, Value};
}
