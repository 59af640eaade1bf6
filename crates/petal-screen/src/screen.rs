//! The `Screen` trait and the context its callbacks run in.

use std::fmt;

use petal_core::{NodeId, PetalError, ScreenId, TransformError, TreeError};
use petal_layout::{Node, SceneTree};
use petal_transform::{TransformScheduler, TransformSequence};

/// Lifecycle of a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenState {
    /// Registered, never pushed
    Created,
    /// Being pushed; `on_entering` is running
    Entering,
    /// Top of the stack
    Current,
    /// Covered by another screen
    Suspended,
    /// Left the stack; its exit transition is still playing
    Exiting,
    /// Gone for good
    Exited,
}

impl fmt::Display for ScreenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScreenState::Created => "created",
            ScreenState::Entering => "entering",
            ScreenState::Current => "current",
            ScreenState::Suspended => "suspended",
            ScreenState::Exiting => "exiting",
            ScreenState::Exited => "exited",
        };
        f.write_str(name)
    }
}

/// Access to the scene from inside a screen callback.
pub struct ScreenContext<'a> {
    pub(crate) tree: &'a mut SceneTree,
    pub(crate) scheduler: &'a mut TransformScheduler,
    pub(crate) screen: ScreenId,
    pub(crate) root: NodeId,
}

impl<'a> ScreenContext<'a> {
    pub fn screen(&self) -> ScreenId {
        self.screen
    }

    /// The screen's own root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn tree(&self) -> &SceneTree {
        &*self.tree
    }

    pub fn tree_mut(&mut self) -> &mut SceneTree {
        &mut *self.tree
    }

    /// Add a node under `parent`.
    pub fn add(&mut self, parent: NodeId, node: Node) -> Result<NodeId, TreeError> {
        self.tree.add(parent, node)
    }

    /// Add a node directly under the screen's root.
    pub fn add_to_root(&mut self, node: Node) -> Result<NodeId, TreeError> {
        self.tree.add(self.root, node)
    }

    /// Queue transforms on `node`.
    pub fn animate(&mut self, node: NodeId) -> Result<TransformSequence<'_, SceneTree>, TransformError> {
        self.scheduler.animate(&*self.tree, node)
    }

    /// Queue transforms on the screen's root.
    pub fn animate_root(&mut self) -> Result<TransformSequence<'_, SceneTree>, TransformError> {
        let root = self.root;
        self.animate(root)
    }
}

/// A full-subtree page pushed onto a [`ScreenStack`](crate::ScreenStack).
///
/// Every callback has a no-op default. Transforms queued from `on_exiting`
/// keep the screen's subtree alive until they finish.
pub trait Screen {
    /// Root node the stack attaches for this screen.
    fn root_node(&self) -> Node {
        Node::container().fill_parent()
    }

    /// Build the screen's content. Runs once, after the root is attached.
    fn load(&mut self, _ctx: &mut ScreenContext<'_>) -> Result<(), PetalError> {
        Ok(())
    }

    /// Pushed on top of `last`.
    fn on_entering(&mut self, _ctx: &mut ScreenContext<'_>, _last: Option<ScreenId>) -> Result<(), PetalError> {
        Ok(())
    }

    /// Leaving the stack; `next` becomes current.
    fn on_exiting(&mut self, _ctx: &mut ScreenContext<'_>, _next: Option<ScreenId>) -> Result<(), PetalError> {
        Ok(())
    }

    /// Covered by `next`.
    fn on_suspending(&mut self, _ctx: &mut ScreenContext<'_>, _next: ScreenId) -> Result<(), PetalError> {
        Ok(())
    }

    /// Back on top after `last` exited.
    fn on_resuming(&mut self, _ctx: &mut ScreenContext<'_>, _last: ScreenId) -> Result<(), PetalError> {
        Ok(())
    }
}
