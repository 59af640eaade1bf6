//! Core value types for placing and painting scene nodes.

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use glam::Vec2;

use crate::errors::LayoutError;

/// Unique identifier for scene nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Unique identifier for screens managed by a navigation stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScreenId(pub u64);

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "screen#{}", self.0)
    }
}

/// Unique identifier for a looping transform group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoopId(pub u64);

/// A single layout axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub const BOTH: [Axis; 2] = [Axis::X, Axis::Y];

    /// The perpendicular axis.
    pub fn other(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    /// Read this axis' component of a vector.
    pub fn of(self, v: Vec2) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
        }
    }

    /// Write this axis' component of a vector.
    pub fn set(self, v: &mut Vec2, value: f32) {
        match self {
            Axis::X => v.x = value,
            Axis::Y => v.y = value,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

/// A set of axes, used for relative sizing, relative positioning and auto-sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axes {
    #[default]
    None,
    X,
    Y,
    Both,
}

impl Axes {
    pub fn from_flags(x: bool, y: bool) -> Self {
        match (x, y) {
            (false, false) => Axes::None,
            (true, false) => Axes::X,
            (false, true) => Axes::Y,
            (true, true) => Axes::Both,
        }
    }

    pub fn has_x(self) -> bool {
        matches!(self, Axes::X | Axes::Both)
    }

    pub fn has_y(self) -> bool {
        matches!(self, Axes::Y | Axes::Both)
    }

    pub fn contains(self, axis: Axis) -> bool {
        match axis {
            Axis::X => self.has_x(),
            Axis::Y => self.has_y(),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Axes::None
    }
}

impl From<Axis> for Axes {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::X => Axes::X,
            Axis::Y => Axes::Y,
        }
    }
}

impl BitOr for Axes {
    type Output = Axes;

    fn bitor(self, rhs: Axes) -> Axes {
        Axes::from_flags(self.has_x() || rhs.has_x(), self.has_y() || rhs.has_y())
    }
}

/// One of nine named alignment points on a box.
///
/// Used both as an anchor (where in the parent's content area a node is
/// placed) and as an origin (which point of the node's own box sits there).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Anchor {
    #[default]
    TopLeft,
    TopCentre,
    TopRight,
    CentreLeft,
    Centre,
    CentreRight,
    BottomLeft,
    BottomCentre,
    BottomRight,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::TopCentre,
        Anchor::TopRight,
        Anchor::CentreLeft,
        Anchor::Centre,
        Anchor::CentreRight,
        Anchor::BottomLeft,
        Anchor::BottomCentre,
        Anchor::BottomRight,
    ];

    /// Fraction of a box's extent at which this point sits (0, 0.5 or 1 per axis).
    pub fn fraction(self) -> Vec2 {
        let x = match self {
            Anchor::TopLeft | Anchor::CentreLeft | Anchor::BottomLeft => 0.0,
            Anchor::TopCentre | Anchor::Centre | Anchor::BottomCentre => 0.5,
            Anchor::TopRight | Anchor::CentreRight | Anchor::BottomRight => 1.0,
        };
        let y = match self {
            Anchor::TopLeft | Anchor::TopCentre | Anchor::TopRight => 0.0,
            Anchor::CentreLeft | Anchor::Centre | Anchor::CentreRight => 0.5,
            Anchor::BottomLeft | Anchor::BottomCentre | Anchor::BottomRight => 1.0,
        };
        Vec2::new(x, y)
    }

    /// The point inside a box of the given size.
    pub fn point_in(self, size: Vec2) -> Vec2 {
        self.fraction() * size
    }

    pub fn name(self) -> &'static str {
        match self {
            Anchor::TopLeft => "TopLeft",
            Anchor::TopCentre => "TopCentre",
            Anchor::TopRight => "TopRight",
            Anchor::CentreLeft => "CentreLeft",
            Anchor::Centre => "Centre",
            Anchor::CentreRight => "CentreRight",
            Anchor::BottomLeft => "BottomLeft",
            Anchor::BottomCentre => "BottomCentre",
            Anchor::BottomRight => "BottomRight",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Anchor {
    type Err = LayoutError;

    /// Accepts `TopLeft`, `top-left`, `top_left`, `centre`, `center`, etc.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect::<String>()
            .replace("center", "centre");

        Anchor::ALL
            .into_iter()
            .find(|anchor| anchor.name().to_lowercase() == normalized)
            .ok_or_else(|| LayoutError::MalformedAnchor {
                value: s.to_string(),
            })
    }
}

/// Four-sided inset, used for both margin and padding.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarginPadding {
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
}

impl MarginPadding {
    pub const ZERO: Self = Self {
        top: 0.0,
        left: 0.0,
        bottom: 0.0,
        right: 0.0,
    };

    /// Create a uniform inset.
    pub fn uniform(value: f32) -> Self {
        Self {
            top: value,
            left: value,
            bottom: value,
            right: value,
        }
    }

    pub fn with_top(mut self, top: f32) -> Self {
        self.top = top;
        self
    }

    pub fn with_left(mut self, left: f32) -> Self {
        self.left = left;
        self
    }

    pub fn with_bottom(mut self, bottom: f32) -> Self {
        self.bottom = bottom;
        self
    }

    pub fn with_right(mut self, right: f32) -> Self {
        self.right = right;
        self
    }

    /// Total horizontal inset.
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// Total vertical inset.
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    /// Total inset per axis.
    pub fn total(&self) -> Vec2 {
        Vec2::new(self.horizontal(), self.vertical())
    }

    /// Left and top insets.
    pub fn top_left(&self) -> Vec2 {
        Vec2::new(self.left, self.top)
    }

    /// Inset on the start side of an axis (left or top).
    pub fn leading(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.left,
            Axis::Y => self.top,
        }
    }

    /// Inset on the end side of an axis (right or bottom).
    pub fn trailing(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.right,
            Axis::Y => self.bottom,
        }
    }
}

/// An RGBA color with linear components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create from 8-bit RGB values.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: 1.0,
        }
    }

    /// Create from hex string (e.g., "#FF66AA", "FF66AA" or "FF66AA80").
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::from_rgb8(channel(0)?, channel(2)?, channel(4)?)),
            8 => {
                let mut color = Self::from_rgb8(channel(0)?, channel(2)?, channel(4)?);
                color.a = channel(6)? as f32 / 255.0;
                Some(color)
            }
            _ => None,
        }
    }

    /// Convert to 8-bit RGBA tuple.
    pub fn to_rgba8(&self) -> (u8, u8, u8, u8) {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (q(self.r), q(self.g), q(self.b), q(self.a))
    }

    /// Same color with alpha multiplied by `factor`.
    pub fn multiply_alpha(self, factor: f32) -> Self {
        Self {
            a: self.a * factor,
            ..self
        }
    }

    /// Component-wise linear interpolation.
    pub fn lerp(self, other: Color, t: f32) -> Color {
        Color {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    // Common colors
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_fractions() {
        assert_eq!(Anchor::TopLeft.fraction(), Vec2::ZERO);
        assert_eq!(Anchor::Centre.fraction(), Vec2::splat(0.5));
        assert_eq!(Anchor::BottomRight.fraction(), Vec2::ONE);
        assert_eq!(Anchor::CentreRight.fraction(), Vec2::new(1.0, 0.5));
        assert_eq!(Anchor::BottomCentre.fraction(), Vec2::new(0.5, 1.0));
    }

    #[test]
    fn test_anchor_parse() {
        assert_eq!("TopLeft".parse::<Anchor>().unwrap(), Anchor::TopLeft);
        assert_eq!("bottom-centre".parse::<Anchor>().unwrap(), Anchor::BottomCentre);
        assert_eq!("centre_right".parse::<Anchor>().unwrap(), Anchor::CentreRight);
        assert_eq!("center".parse::<Anchor>().unwrap(), Anchor::Centre);
    }

    #[test]
    fn test_anchor_parse_malformed() {
        let err = "middle-ish".parse::<Anchor>().unwrap_err();
        assert!(matches!(err, LayoutError::MalformedAnchor { ref value } if value == "middle-ish"));
    }

    #[test]
    fn test_axes_union() {
        assert_eq!(Axes::X | Axes::Y, Axes::Both);
        assert_eq!(Axes::None | Axes::Y, Axes::Y);
        assert!(Axes::Both.contains(Axis::X));
        assert!(!Axes::Y.contains(Axis::X));
    }

    #[test]
    fn test_margin_padding_totals() {
        let inset = MarginPadding::uniform(15.0).with_left(20.0);
        assert_eq!(inset.horizontal(), 35.0);
        assert_eq!(inset.vertical(), 30.0);
        assert_eq!(inset.leading(Axis::X), 20.0);
        assert_eq!(inset.trailing(Axis::Y), 15.0);
    }

    #[test]
    fn test_color_hex() {
        let color = Color::from_hex("#FF66AA").unwrap();
        assert_eq!(color.to_rgba8(), (255, 102, 170, 255));
        assert!(Color::from_hex("12345").is_none());
        let translucent = Color::from_hex("00000080").unwrap();
        assert!((translucent.a - 128.0 / 255.0).abs() < 0.001);
    }

    #[test]
    fn test_color_lerp() {
        let mid = Color::BLACK.lerp(Color::WHITE, 0.5);
        assert!((mid.r - 0.5).abs() < 0.001);
        assert!((mid.a - 1.0).abs() < 0.001);
    }
}
