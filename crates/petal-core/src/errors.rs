//! Error types for the petal engine.

use thiserror::Error;

use crate::types::{Axis, NodeId, ScreenId};

/// Top-level error type for the petal engine.
#[derive(Debug, Error)]
pub enum PetalError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Screen(#[from] ScreenError),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Configuration errors found while resolving layout.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("Circular auto-size on the {axis} axis: {node} depends on {parent}, which sizes itself to its children")]
    CircularAutoSize {
        node: NodeId,
        parent: NodeId,
        axis: Axis,
    },

    #[error("{node} declares the {axis} axis as both relative and auto-sized")]
    ConflictingSizeModes { node: NodeId, axis: Axis },

    #[error("Malformed anchor: {value}")]
    MalformedAnchor { value: String },
}

/// Misuse of the scene tree's structural operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeError {
    #[error("Unknown node: {node}")]
    UnknownNode { node: NodeId },

    #[error("{node} is a shape and cannot hold children")]
    NotAContainer { node: NodeId },

    #[error("{node} is not a scroll container")]
    NotScrollable { node: NodeId },

    #[error("{node} already has parent {parent}")]
    AlreadyParented { node: NodeId, parent: NodeId },

    #[error("Adding {node} under {parent} would create a cycle")]
    WouldCycle { node: NodeId, parent: NodeId },

    #[error("The root node cannot be removed or re-parented")]
    RootRemoval,
}

/// Misuse of a screen navigation stack.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScreenError {
    #[error("Cannot exit: screen stack {stack} is empty")]
    EmptyStack { stack: NodeId },

    #[error("Screen stack {stack} is not attached to a live tree")]
    Detached { stack: NodeId },

    #[error("{screen} has already been pushed")]
    AlreadyStacked { screen: ScreenId },

    #[error("The root of {screen} is already owned by {parent}")]
    AlreadyOwned { screen: ScreenId, parent: NodeId },

    #[error("Unknown screen: {screen}")]
    UnknownScreen { screen: ScreenId },

    #[error("No screen stack at {stack}")]
    UnknownStack { stack: NodeId },

    #[error("{screen} is not in the navigation order")]
    NotInStack { screen: ScreenId },
}

/// Misuse of the transform scheduler.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("Cannot schedule transforms on detached {node}")]
    DetachedNode { node: NodeId },

    #[error("A looping transform needs a non-zero period")]
    EmptyLoop,

    #[error("Value does not match the {property} property")]
    PropertyMismatch { property: &'static str },
}
