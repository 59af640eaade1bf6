//! Animatable properties and the values they take.

use std::fmt;

use glam::Vec2;
use petal_core::{Color, NodeId, TransformError};
use petal_layout::SceneTree;

/// A node attribute a transform can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Property {
    Position,
    Size,
    Scale,
    Alpha,
    Color,
    Depth,
}

impl Property {
    pub fn name(self) -> &'static str {
        match self {
            Property::Position => "position",
            Property::Size => "size",
            Property::Scale => "scale",
            Property::Alpha => "alpha",
            Property::Color => "color",
            Property::Depth => "depth",
        }
    }

    /// Reject values of the wrong shape for this property.
    pub fn check(self, value: &Value) -> Result<(), TransformError> {
        let ok = matches!(
            (self, value),
            (Property::Position | Property::Size | Property::Scale, Value::Vector(_))
                | (Property::Alpha | Property::Depth, Value::Float(_))
                | (Property::Color, Value::Color(_))
        );
        if ok {
            Ok(())
        } else {
            Err(TransformError::PropertyMismatch { property: self.name() })
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A property value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Float(f32),
    Vector(Vec2),
    Color(Color),
}

impl Value {
    /// Interpolate towards `other`. Mismatched shapes jump straight to `other`.
    pub fn lerp(&self, other: &Value, t: f32) -> Value {
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => Value::Float(a + (b - a) * t),
            (Value::Vector(a), Value::Vector(b)) => Value::Vector(a.lerp(*b, t)),
            (Value::Color(a), Value::Color(b)) => Value::Color(a.lerp(*b, t)),
            _ => *other,
        }
    }
}

/// Something whose nodes' properties can be read and written by the scheduler.
pub trait Animatable {
    /// Whether the node still exists (attached or not).
    fn exists(&self, node: NodeId) -> bool;

    /// Whether the node is reachable from the root.
    fn is_attached(&self, node: NodeId) -> bool;

    fn read(&self, node: NodeId, property: Property) -> Option<Value>;

    /// Write a value. Returns `false` if the node is gone or the shape is wrong.
    fn write(&mut self, node: NodeId, property: Property, value: Value) -> bool;
}

impl Animatable for SceneTree {
    fn exists(&self, node: NodeId) -> bool {
        self.contains(node)
    }

    fn is_attached(&self, node: NodeId) -> bool {
        SceneTree::is_attached(self, node)
    }

    fn read(&self, node: NodeId, property: Property) -> Option<Value> {
        let node = self.get(node)?;
        Some(match property {
            Property::Position => Value::Vector(node.position),
            Property::Size => Value::Vector(node.size),
            Property::Scale => Value::Vector(node.scale),
            Property::Alpha => Value::Float(node.alpha),
            Property::Color => Value::Color(node.color),
            Property::Depth => Value::Float(node.depth),
        })
    }

    fn write(&mut self, node: NodeId, property: Property, value: Value) -> bool {
        let Some(node) = self.get_mut(node) else {
            return false;
        };
        match (property, value) {
            (Property::Position, Value::Vector(v)) => node.position = v,
            (Property::Size, Value::Vector(v)) => node.size = v,
            (Property::Scale, Value::Vector(v)) => node.scale = v,
            (Property::Alpha, Value::Float(v)) => node.alpha = v,
            (Property::Color, Value::Color(c)) => node.color = c,
            (Property::Depth, Value::Float(v)) => node.depth = v,
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petal_layout::{LayoutOptions, Node, Shape};

    #[test]
    fn test_lerp() {
        let v = Value::Vector(Vec2::ZERO).lerp(&Value::Vector(Vec2::new(10.0, 20.0)), 0.5);
        assert_eq!(v, Value::Vector(Vec2::new(5.0, 10.0)));
        let f = Value::Float(1.0).lerp(&Value::Float(0.0), 0.25);
        assert_eq!(f, Value::Float(0.75));
    }

    #[test]
    fn test_property_check() {
        assert!(Property::Alpha.check(&Value::Float(0.5)).is_ok());
        assert_eq!(
            Property::Position.check(&Value::Float(0.5)),
            Err(TransformError::PropertyMismatch { property: "position" })
        );
    }

    #[test]
    fn test_tree_read_write() {
        let mut tree = SceneTree::new(LayoutOptions::default());
        let id = tree.add(tree.root(), Node::shape(Shape::Box)).unwrap();
        tree.update_layout().unwrap();

        assert_eq!(tree.read(id, Property::Alpha), Some(Value::Float(1.0)));
        assert!(tree.write(id, Property::Scale, Value::Vector(Vec2::splat(2.0))));
        assert!(tree.is_dirty());
        assert_eq!(tree.get(id).unwrap().scale, Vec2::splat(2.0));
        assert!(!tree.write(id, Property::Scale, Value::Float(2.0)));
    }
}
