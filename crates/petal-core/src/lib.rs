//! Core types and utilities for the petal scene graph engine.
//!
//! This crate provides the foundational types used across all other petal crates:
//! - Identifiers for nodes, screens and transform loops
//! - Placement values (anchors, axes, margins and padding)
//! - Colors
//! - Error types

pub mod errors;
pub mod types;

pub use errors::*;
pub use types::*;

pub use glam::Vec2;
