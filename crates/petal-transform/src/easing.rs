//! Easing curves.
//!
//! Every curve maps `[0, 1]` onto `[0, 1]` with `f(0) = 0` and `f(1) = 1`.
//! The `Out` variant of a curve is its mirror image and `InOut` joins the two
//! halves at `t = 0.5`.

use std::f32::consts::PI;

/// Easing applied to a transform's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Easing {
    #[default]
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    InQuart,
    OutQuart,
    InOutQuart,
    InQuint,
    OutQuint,
    InOutQuint,
    InSine,
    OutSine,
    InOutSine,
    InExpo,
    OutExpo,
    InOutExpo,
    InCirc,
    OutCirc,
    InOutCirc,
}

#[derive(Clone, Copy)]
enum Curve {
    Power(i32),
    Sine,
    Expo,
    Circ,
}

#[derive(Clone, Copy)]
enum Mode {
    In,
    Out,
    InOut,
}

impl Curve {
    /// The accelerating form of the curve.
    fn ease_in(self, t: f32) -> f32 {
        match self {
            Curve::Power(n) => t.powi(n),
            Curve::Sine => 1.0 - (t * PI / 2.0).cos(),
            Curve::Expo => {
                if t <= 0.0 {
                    0.0
                } else {
                    2f32.powf(10.0 * t - 10.0)
                }
            }
            Curve::Circ => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
        }
    }
}

impl Easing {
    pub const ALL: [Easing; 22] = [
        Easing::Linear,
        Easing::InQuad,
        Easing::OutQuad,
        Easing::InOutQuad,
        Easing::InCubic,
        Easing::OutCubic,
        Easing::InOutCubic,
        Easing::InQuart,
        Easing::OutQuart,
        Easing::InOutQuart,
        Easing::InQuint,
        Easing::OutQuint,
        Easing::InOutQuint,
        Easing::InSine,
        Easing::OutSine,
        Easing::InOutSine,
        Easing::InExpo,
        Easing::OutExpo,
        Easing::InOutExpo,
        Easing::InCirc,
        Easing::OutCirc,
        Easing::InOutCirc,
    ];

    fn shape(self) -> Option<(Curve, Mode)> {
        use Easing::*;
        let shape = match self {
            Linear => return None,
            InQuad => (Curve::Power(2), Mode::In),
            OutQuad => (Curve::Power(2), Mode::Out),
            InOutQuad => (Curve::Power(2), Mode::InOut),
            InCubic => (Curve::Power(3), Mode::In),
            OutCubic => (Curve::Power(3), Mode::Out),
            InOutCubic => (Curve::Power(3), Mode::InOut),
            InQuart => (Curve::Power(4), Mode::In),
            OutQuart => (Curve::Power(4), Mode::Out),
            InOutQuart => (Curve::Power(4), Mode::InOut),
            InQuint => (Curve::Power(5), Mode::In),
            OutQuint => (Curve::Power(5), Mode::Out),
            InOutQuint => (Curve::Power(5), Mode::InOut),
            InSine => (Curve::Sine, Mode::In),
            OutSine => (Curve::Sine, Mode::Out),
            InOutSine => (Curve::Sine, Mode::InOut),
            InExpo => (Curve::Expo, Mode::In),
            OutExpo => (Curve::Expo, Mode::Out),
            InOutExpo => (Curve::Expo, Mode::InOut),
            InCirc => (Curve::Circ, Mode::In),
            OutCirc => (Curve::Circ, Mode::Out),
            InOutCirc => (Curve::Circ, Mode::InOut),
        };
        Some(shape)
    }

    /// Map linear progress to eased progress. Input is clamped to `[0, 1]`.
    pub fn apply(self, t: f32) -> f32 {
        let t = if t.is_nan() { 1.0 } else { t.clamp(0.0, 1.0) };
        let Some((curve, mode)) = self.shape() else {
            return t;
        };
        match mode {
            Mode::In => curve.ease_in(t),
            Mode::Out => 1.0 - curve.ease_in(1.0 - t),
            Mode::InOut => {
                if t < 0.5 {
                    curve.ease_in(2.0 * t) / 2.0
                } else {
                    1.0 - curve.ease_in(2.0 - 2.0 * t) / 2.0
                }
            }
        }
    }
}
