//! Error types for animation setup

/// Errors raised while setting up an animation.
///
/// Running animations never fail: a dead owner or an animation that lost all
/// of its properties is dropped silently by the [`Animator`](crate::Animator).
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum AnimationError {
    /// A duration or delay was negative, NaN or infinite
    #[error("Invalid {name}: {value} (must be finite and non-negative)")]
    InvalidTime { name: &'static str, value: f32 },

    /// A fallible definition callback returned an error
    #[error("Animation definition failed: {0}")]
    Definition(#[source] Box<dyn std::error::Error + 'static>),
}

impl AnimationError {
    pub(crate) fn check_time(name: &'static str, value: f32) -> Result<(), Self> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(AnimationError::InvalidTime { name, value })
        }
    }
}
