//! Tweenable properties: the interception point for implicit animation.
//!
//! A [`Tweenable`] wraps the getter/setter pair of one attribute of a UI
//! element. Reading is always the live value. Writing first tells the
//! animation currently being defined (if any) to capture the property, then
//! forwards the value to the setter:
//!
//! ```ignore
//! let x = Tweenable::new(move || node.x(), move |v| node.set_x(v));
//!
//! x.set(10.0); // immediate
//!
//! animator.animate(AnimationOptions::new(0.5), || {
//!     x.set(100.0); // captured, then tweened from 10 to 100
//! })?;
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::animation::Animation;
use crate::context;
use crate::record::PropertyRecord;
use crate::tween::{lerp_angle, Tween};

pub(crate) type LerpFn<T> = fn(&T, &T, f32) -> T;

/// Shared state behind a [`Tweenable`] handle.
pub(crate) struct PropertyCell<T> {
    getter: Box<dyn Fn() -> T>,
    setter: Box<dyn Fn(T)>,
    pub(crate) lerp: LerpFn<T>,
    /// At most one live record per property
    pub(crate) record: RefCell<Option<Rc<PropertyRecord<T>>>>,
}

impl<T> PropertyCell<T> {
    pub(crate) fn get(&self) -> T {
        (self.getter)()
    }

    /// Write straight through to the setter, bypassing capture.
    pub(crate) fn write(&self, value: T) {
        (self.setter)(value)
    }
}

/// Handle to an animatable attribute of a UI element.
///
/// Cloning the handle shares the same property, including its animation
/// state.
pub struct Tweenable<T> {
    cell: Rc<PropertyCell<T>>,
}

impl<T> Clone for Tweenable<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T: Tween> Tweenable<T> {
    /// Wrap a getter/setter pair, interpolating with `T`'s own [`Tween`] rule.
    pub fn new(getter: impl Fn() -> T + 'static, setter: impl Fn(T) + 'static) -> Self {
        Self::with_lerp(getter, setter, T::lerp)
    }

    /// Wrap a getter/setter pair with a custom interpolation rule.
    pub fn with_lerp(
        getter: impl Fn() -> T + 'static,
        setter: impl Fn(T) + 'static,
        lerp: fn(&T, &T, f32) -> T,
    ) -> Self {
        Self {
            cell: Rc::new(PropertyCell {
                getter: Box::new(getter),
                setter: Box::new(setter),
                lerp,
                record: RefCell::new(None),
            }),
        }
    }

    /// Property that stores its own value instead of forwarding to an element.
    pub fn from_value(initial: T) -> Self
    where
        T: Copy,
    {
        let value = Rc::new(Cell::new(initial));
        let read = value.clone();
        Self::new(move || read.get(), move |v| value.set(v))
    }

    /// The live value, animated or not.
    pub fn get(&self) -> T {
        self.cell.get()
    }

    /// Assign a value. Inside an animation definition the property is
    /// captured first, so the assignment becomes the animation's target.
    pub fn set(&self, value: T) {
        self.register_capture();
        self.cell.write(value);
    }

    /// Capture the property into the animation being defined without
    /// writing anything. No-op outside a definition.
    pub fn register_capture(&self) {
        if let Some(animation) = context::current() {
            animation.setup_capture(&self.cell);
        }
    }

    /// Whether an animation currently holds a record for this property.
    pub fn is_animating(&self) -> bool {
        self.cell.record.borrow().is_some()
    }

    /// The animation currently driving this property.
    pub fn animation(&self) -> Option<Rc<Animation>> {
        let record = self.cell.record.borrow().clone();
        record.and_then(|record| record.animation())
    }
}

impl Tweenable<f32> {
    /// Angle in degrees, interpolated along the shortest arc.
    pub fn angle(getter: impl Fn() -> f32 + 'static, setter: impl Fn(f32) + 'static) -> Self {
        Self::with_lerp(getter, setter, |from, to, t| lerp_angle(*from, *to, t))
    }
}
