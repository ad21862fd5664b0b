//! Easing curves.
//!
//! A curve maps the raw progress of a unit (`0.0..=1.0`) to the factor its
//! values are interpolated with. Custom curves may leave `[0, 1]` to
//! overshoot: plain numbers extrapolate, colors clamp.

use std::fmt;
use std::rc::Rc;

#[derive(Clone, Default)]
pub enum Easing {
    /// `3t² - 2t³`; eases in and out. Used when an animation names no curve.
    #[default]
    SmoothStep,
    Linear,
    /// Any function of progress, e.g. a spring or back-out curve.
    Custom(Rc<dyn Fn(f32) -> f32>),
}

impl Easing {
    pub fn custom(curve: impl Fn(f32) -> f32 + 'static) -> Self {
        Self::Custom(Rc::new(curve))
    }

    /// Eased factor for `progress`.
    pub fn evaluate(&self, progress: f32) -> f32 {
        match self {
            Self::SmoothStep => smooth_step(progress),
            Self::Linear => progress,
            Self::Custom(curve) => curve(progress),
        }
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SmoothStep => "SmoothStep",
            Self::Linear => "Linear",
            Self::Custom(_) => "Custom(..)",
        })
    }
}

/// Cubic Hermite step with its input clamped to `[0, 1]`.
pub fn smooth_step(x: f32) -> f32 {
    let x = x.clamp(0.0, 1.0);
    x * x * (3.0 - 2.0 * x)
}
