//! Deferred structural mutations.
//!
//! Anything that changes the tree from outside the frame loop goes through a
//! queue that [`Scene::update`](crate::Scene::update) drains before it
//! advances transforms or lays out.

use std::fmt;

use crossbeam_channel::Sender;
use glam::Vec2;
use petal_core::{NodeId, PetalError};
use petal_layout::{Node, SceneTree};
use petal_transform::{Property, Value};
use thiserror::Error;

/// Closure run against the tree while the queue is drained.
pub type ApplyFn = Box<dyn FnOnce(&mut SceneTree) -> Result<(), PetalError> + Send>;

/// A queued change to the scene.
pub enum Mutation {
    /// Insert `node` under `parent`
    Add { parent: NodeId, node: Node },
    /// Destroy a node and its subtree
    Remove(NodeId),
    /// Set one property immediately
    Set {
        node: NodeId,
        property: Property,
        value: Value,
    },
    /// Wheel input for a scroll container
    ScrollBy { node: NodeId, wheel: Vec2 },
    /// Drag input for a scroll container
    DragBy { node: NodeId, delta: Vec2 },
    /// Arbitrary edit
    Apply(ApplyFn),
}

impl fmt::Debug for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Add { parent, node } => f
                .debug_struct("Add")
                .field("parent", parent)
                .field("name", &node.name)
                .finish(),
            Mutation::Remove(node) => f.debug_tuple("Remove").field(node).finish(),
            Mutation::Set { node, property, value } => f
                .debug_struct("Set")
                .field("node", node)
                .field("property", property)
                .field("value", value)
                .finish(),
            Mutation::ScrollBy { node, wheel } => f
                .debug_struct("ScrollBy")
                .field("node", node)
                .field("wheel", wheel)
                .finish(),
            Mutation::DragBy { node, delta } => f
                .debug_struct("DragBy")
                .field("node", node)
                .field("delta", delta)
                .finish(),
            Mutation::Apply(_) => f.write_str("Apply(..)"),
        }
    }
}

/// The scene that owned the queue has been dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("The scene has been dropped")]
pub struct SceneClosed;

/// Cloneable handle for queueing mutations from other threads.
#[derive(Debug, Clone)]
pub struct MutationSender {
    pub(crate) inner: Sender<Mutation>,
}

impl MutationSender {
    pub fn send(&self, mutation: Mutation) -> Result<(), SceneClosed> {
        self.inner.send(mutation).map_err(|_| SceneClosed)
    }

    pub fn add(&self, parent: NodeId, node: Node) -> Result<(), SceneClosed> {
        self.send(Mutation::Add { parent, node })
    }

    pub fn remove(&self, node: NodeId) -> Result<(), SceneClosed> {
        self.send(Mutation::Remove(node))
    }

    pub fn set(&self, node: NodeId, property: Property, value: Value) -> Result<(), SceneClosed> {
        self.send(Mutation::Set { node, property, value })
    }

    pub fn apply<F>(&self, f: F) -> Result<(), SceneClosed>
    where
        F: FnOnce(&mut SceneTree) -> Result<(), PetalError> + Send + 'static,
    {
        self.send(Mutation::Apply(Box::new(f)))
    }
}
