//! Screen navigation for petal.
//!
//! A [`ScreenStack`] hosts full-subtree [`Screen`]s under one container and
//! drives their enter, exit, suspend and resume transitions.

mod screen;
mod stack;

pub use screen::{Screen, ScreenContext, ScreenState};
pub use stack::ScreenStack;
