//! Per-animation records: the moving parts of an [`Animation`].
//!
//! A [`PropertyRecord`] remembers where one property starts and ends inside
//! one animation. A [`CustomUnit`] wraps a closure driven by the eased time.
//! Both carry the delay/duration that was current when they were added.
//!
//! Property records are recycled through a [`RecordPool`] keyed by value
//! type, so a steady stream of animations does not allocate.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::animation::Animation;
use crate::property::PropertyCell;
use crate::tween::Tween;

/// Delay and duration of a single record, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct UnitTiming {
    pub delay: f32,
    pub duration: f32,
}

impl UnitTiming {
    /// Normalized, clamped progress at animation time `elapsed`.
    pub fn progress(&self, elapsed: f32) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((elapsed - self.delay) / self.duration).clamp(0.0, 1.0)
    }
}

/// Lifecycle shared by property records and custom units.
pub(crate) trait AnimatedUnit {
    fn timing(&self) -> UnitTiming;

    /// The definition callback has run: remember the live value as the end.
    fn capture_end(&self);

    /// Capture the end, then put the start value back on screen.
    fn rewind(&self);

    /// Apply the eased time `t`.
    fn apply(&self, t: f32);

    /// Land exactly on the end state.
    fn finish(&self);

    /// Unlink from the property and hand back to the pool.
    fn release(self: Rc<Self>, pool: &RecordPool);
}

struct RecordState<T> {
    start: Option<T>,
    end: Option<T>,
    timing: UnitTiming,
    animation: Weak<Animation>,
    property: Option<Rc<PropertyCell<T>>>,
}

impl<T> Default for RecordState<T> {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            timing: UnitTiming::default(),
            animation: Weak::new(),
            property: None,
        }
    }
}

/// Start/end of one property inside one animation.
pub(crate) struct PropertyRecord<T> {
    state: RefCell<RecordState<T>>,
}

impl<T: Tween> PropertyRecord<T> {
    fn empty() -> Self {
        Self {
            state: RefCell::new(RecordState::default()),
        }
    }

    /// Take a record from the pool (or allocate one) and link it both ways
    /// with `property`. The property's current value becomes the start.
    pub(crate) fn bind(
        pool: &RecordPool,
        animation: &Rc<Animation>,
        property: &Rc<PropertyCell<T>>,
        timing: UnitTiming,
    ) -> Rc<Self> {
        let record = pool.take::<T>().unwrap_or_else(|| Rc::new(Self::empty()));
        let start = property.get();
        {
            let mut state = record.state.borrow_mut();
            state.start = Some(start);
            state.end = None;
            state.timing = timing;
            state.animation = Rc::downgrade(animation);
            state.property = Some(property.clone());
        }
        *property.record.borrow_mut() = Some(record.clone());
        record
    }

    pub(crate) fn animation(&self) -> Option<Rc<Animation>> {
        self.state.borrow().animation.upgrade()
    }

    pub(crate) fn belongs_to(&self, animation: &Rc<Animation>) -> bool {
        std::ptr::eq(self.state.borrow().animation.as_ptr(), Rc::as_ptr(animation))
    }

    pub(crate) fn start(&self) -> Option<T> {
        self.state.borrow().start.clone()
    }

    pub(crate) fn end(&self) -> Option<T> {
        self.state.borrow().end.clone()
    }

    fn property(&self) -> Option<Rc<PropertyCell<T>>> {
        self.state.borrow().property.clone()
    }
}

impl<T: Tween> AnimatedUnit for PropertyRecord<T> {
    fn timing(&self) -> UnitTiming {
        self.state.borrow().timing
    }

    fn capture_end(&self) {
        let Some(property) = self.property() else {
            return;
        };
        let end = property.get();
        self.state.borrow_mut().end = Some(end);
    }

    fn rewind(&self) {
        self.capture_end();
        let (Some(property), Some(start)) = (self.property(), self.start()) else {
            return;
        };
        property.write(start);
    }

    fn apply(&self, t: f32) {
        let value = {
            let state = self.state.borrow();
            match (&state.property, &state.start, &state.end) {
                (Some(property), Some(start), Some(end)) => {
                    Some((property.clone(), (property.lerp)(start, end, t)))
                }
                _ => None,
            }
        };
        if let Some((property, value)) = value {
            property.write(value);
        }
    }

    fn finish(&self) {
        if let (Some(property), Some(end)) = (self.property(), self.end()) {
            property.write(end);
        }
    }

    fn release(self: Rc<Self>, pool: &RecordPool) {
        let property = {
            let mut state = self.state.borrow_mut();
            let property = state.property.take();
            *state = RecordState::default();
            property
        };
        // Already released
        let Some(property) = property else {
            return;
        };
        {
            let mut slot = property.record.borrow_mut();
            if slot.as_ref().is_some_and(|linked| Rc::ptr_eq(linked, &self)) {
                *slot = None;
            }
        }
        pool.give(self);
    }
}

/// Arbitrary per-frame callback driven by the animation's eased time.
pub(crate) struct CustomUnit {
    callback: RefCell<Option<Box<dyn FnMut(f32)>>>,
    timing: UnitTiming,
}

impl CustomUnit {
    pub(crate) fn new(callback: impl FnMut(f32) + 'static, timing: UnitTiming) -> Self {
        Self {
            callback: RefCell::new(Some(Box::new(callback))),
            timing,
        }
    }
}

impl AnimatedUnit for CustomUnit {
    fn timing(&self) -> UnitTiming {
        self.timing
    }

    fn capture_end(&self) {}

    fn rewind(&self) {}

    fn apply(&self, t: f32) {
        // A callback that re-enters its own animation is skipped, not deadlocked
        if let Ok(mut callback) = self.callback.try_borrow_mut() {
            if let Some(callback) = callback.as_mut() {
                callback(t);
            }
        }
    }

    fn finish(&self) {
        self.apply(1.0);
    }

    fn release(self: Rc<Self>, _pool: &RecordPool) {
        if let Ok(mut callback) = self.callback.try_borrow_mut() {
            callback.take();
        }
    }
}

/// Free-list of released property records, one list per value type.
///
/// Uses `Vec<(TypeId, Box<dyn Any>)>` with a linear scan: an application
/// animates a handful of value types, so this stays tiny.
#[derive(Default)]
pub struct RecordPool {
    free: RefCell<Vec<(TypeId, Box<dyn Any>)>>,
}

impl RecordPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pooled records for value type `T`.
    pub fn available<T: Tween>(&self) -> usize {
        let free = self.free.borrow();
        Self::list::<T>(&free).map_or(0, Vec::len)
    }

    /// Drop every pooled record.
    pub fn clear(&self) {
        self.free.borrow_mut().clear();
    }

    pub(crate) fn take<T: Tween>(&self) -> Option<Rc<PropertyRecord<T>>> {
        let mut free = self.free.borrow_mut();
        let list = Self::list_mut::<T>(&mut free)?;
        // A record still referenced elsewhere (e.g. by an in-flight tick) is
        // left to die rather than re-bound under its holder's feet.
        while let Some(record) = list.pop() {
            if Rc::strong_count(&record) == 1 {
                log::trace!("Reusing pooled {} record", std::any::type_name::<T>());
                return Some(record);
            }
        }
        None
    }

    pub(crate) fn give<T: Tween>(&self, record: Rc<PropertyRecord<T>>) {
        let mut free = self.free.borrow_mut();
        if let Some(list) = Self::list_mut::<T>(&mut free) {
            list.push(record);
            return;
        }
        free.push((TypeId::of::<T>(), Box::new(vec![record])));
    }

    fn list<T: Tween>(free: &[(TypeId, Box<dyn Any>)]) -> Option<&Vec<Rc<PropertyRecord<T>>>> {
        let type_id = TypeId::of::<T>();
        free.iter()
            .find(|entry| entry.0 == type_id)
            .and_then(|entry| entry.1.downcast_ref())
    }

    fn list_mut<T: Tween>(
        free: &mut [(TypeId, Box<dyn Any>)],
    ) -> Option<&mut Vec<Rc<PropertyRecord<T>>>> {
        let type_id = TypeId::of::<T>();
        free.iter_mut()
            .find(|entry| entry.0 == type_id)
            .and_then(|entry| entry.1.downcast_mut())
    }
}

impl std::fmt::Debug for RecordPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordPool")
            .field("types", &self.free.borrow().len())
            .finish()
    }
}
