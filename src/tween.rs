pub use glide_macros::Tween;

/// Trait for values that can be interpolated between a start and an end.
///
/// `t = 0.0` returns `from`, `t = 1.0` returns `to`. Implementations for
/// plain numbers must not clamp `t`: easing curves are allowed to overshoot.
pub trait Tween: Clone + 'static {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self;
}

impl Tween for f32 {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        from + (to - from) * t
    }
}

impl Tween for f64 {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        from + (to - from) * t as f64
    }
}

/// Interpolate between two angles in degrees along the shortest arc.
///
/// The result is `from` offset by the wrapped difference, so it is not
/// normalized to `[0, 360)`.
pub fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    let mut delta = (to - from).rem_euclid(360.0);
    if delta > 180.0 {
        delta -= 360.0;
    }
    from + delta * t
}

/// 2D vector for positions, sizes and pivots.
#[derive(Debug, Clone, Copy, PartialEq, Default, Tween)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2::new(0.0, 0.0);
    pub const ONE: Vec2 = Vec2::new(1.0, 1.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}
