//! Implicit property animation.
//!
//! Instead of describing tweens explicitly, open an animation scope and set
//! properties as if the change were immediate. Every [`Tweenable`] written
//! inside the scope is captured and then played from its old value to the
//! new one over the following frames.
//!
//! ```ignore
//! use glide::prelude::*;
//!
//! let animator = Animator::new();
//! let x = Tweenable::from_value(0.0f32);
//!
//! animator.animate(AnimationOptions::new(0.5).on_complete(|| println!("done")), || {
//!     x.set(100.0);
//! })?;
//!
//! // x is still 0.0 here; each frame:
//! animator.tick(frame_delta);
//! ```

// Lets `#[derive(Tween)]` refer to `::glide` from inside this crate
extern crate self as glide;

pub mod animation;
pub mod animator;
pub mod color;
pub mod config;
pub mod context;
pub mod easing;
pub mod error;
pub mod owner;
pub mod property;
pub mod record;
pub mod tween;

pub use animation::{Animation, AnimationOptions, CompletionCallback};
pub use animator::{Animator, FrameClock};
pub use color::Color;
pub use config::AnimatorConfig;
pub use context::{
    add_custom_animation, add_delay, add_duration, animatable, animatable_value, is_defining,
};
pub use easing::Easing;
pub use error::AnimationError;
pub use owner::{AnimationOwner, OwnerRef};
pub use property::Tweenable;
pub use record::{RecordPool, UnitTiming};
pub use tween::{lerp_angle, Tween, Vec2};

pub mod prelude {
    pub use crate::{
        add_custom_animation, add_delay, add_duration, animatable, animatable_value, Animation,
        AnimationError, AnimationOptions, AnimationOwner, Animator, AnimatorConfig, Color, Easing,
        OwnerRef, Tween, Tweenable, Vec2,
    };
}
