use std::time::Duration;

use crate::easing::Easing;

/// Scheduler settings.
#[derive(Clone, Debug)]
pub struct AnimatorConfig {
    /// Longest time step a single tick may advance animations by. Stalls
    /// (window dragged, app suspended) are clamped to this.
    pub max_frame_delta: Duration,
    /// Curve used by animations that don't supply their own
    pub default_easing: Easing,
}

impl AnimatorConfig {
    pub fn max_frame_delta(mut self, max_frame_delta: Duration) -> Self {
        self.max_frame_delta = max_frame_delta;
        self
    }

    pub fn default_easing(mut self, easing: Easing) -> Self {
        self.default_easing = easing;
        self
    }
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            max_frame_delta: Duration::from_secs_f32(1.0 / 15.0),
            default_easing: Easing::SmoothStep,
        }
    }
}
