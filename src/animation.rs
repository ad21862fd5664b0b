//! A single animation: everything captured by one definition callback.
//!
//! Construction runs the definition callback once, synchronously, with the
//! animation on top of the definition context. Every [`Tweenable`] assigned
//! inside the callback is captured with its value *before* the assignment,
//! and the assignment itself goes through, so when the callback returns each
//! property shows its end state. The animation then records those end values
//! and rewinds every property to its start, ready to be played forward by
//! [`Animator::tick`](crate::Animator::tick).
//!
//! [`Tweenable`]: crate::Tweenable

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bitflags::bitflags;

use crate::context::DefinitionScope;
use crate::easing::Easing;
use crate::error::AnimationError;
use crate::owner::OwnerRef;
use crate::property::PropertyCell;
use crate::record::{AnimatedUnit, CustomUnit, PropertyRecord, RecordPool, UnitTiming};
use crate::tween::Tween;

/// Callback fired once when an animation completes
pub type CompletionCallback = Box<dyn FnOnce()>;

/// Settings for a new animation
pub struct AnimationOptions {
    /// Duration in seconds
    pub duration: f32,
    /// Delay before the first property starts moving, in seconds
    pub delay: f32,
    /// Curve for every record; the animator's default when `None`
    pub easing: Option<Easing>,
    /// Element the animation belongs to
    pub owner: Option<OwnerRef>,
    on_complete: Option<CompletionCallback>,
}

impl AnimationOptions {
    /// Animation lasting `duration` seconds with no delay
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            delay: 0.0,
            easing: None,
            owner: None,
            on_complete: None,
        }
    }

    /// Set the delay before the animation starts
    pub fn delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    /// Set the duration of the animation
    pub fn duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }

    /// Set the easing curve
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    /// Tie the animation to an element. It is dropped once the element dies.
    pub fn owner(mut self, owner: impl Into<OwnerRef>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Run `f` once when the animation completes (not when it is cancelled)
    pub fn on_complete(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn validate(&self) -> Result<(), AnimationError> {
        AnimationError::check_time("duration", self.duration)?;
        AnimationError::check_time("delay", self.delay)
    }
}

impl fmt::Debug for AnimationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationOptions")
            .field("duration", &self.duration)
            .field("delay", &self.delay)
            .field("easing", &self.easing)
            .field("owner", &self.owner)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

bitflags! {
    /// Lifecycle state of an animation
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    struct AnimationFlags: u8 {
        /// Finished naturally or via complete_immediate; completion fired
        const COMPLETED = 0b001;
        /// Cancelled; inert until removed
        const CANCELLED = 0b010;
        /// At least one unit was added at some point
        const HAD_UNITS = 0b100;
    }
}

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// One definition callback's worth of captured properties.
pub struct Animation {
    id: u64,
    elapsed: Cell<Duration>,
    /// Cursors stamped onto units captured from now on
    duration: Cell<f32>,
    delay: Cell<f32>,
    /// High-water marks of the cursors over the whole definition
    max_duration: Cell<f32>,
    max_delay: Cell<f32>,
    units: RefCell<Vec<Rc<dyn AnimatedUnit>>>,
    easing: Easing,
    on_complete: RefCell<Option<CompletionCallback>>,
    owner: Option<OwnerRef>,
    flags: Cell<AnimationFlags>,
    pool: Rc<RecordPool>,
}

impl Animation {
    /// Build an animation and run its definition callback.
    ///
    /// An error from `define` pops the definition context and drops the
    /// half-built animation; its records are released without rewinding.
    pub(crate) fn define<E>(
        options: AnimationOptions,
        default_easing: &Easing,
        pool: Rc<RecordPool>,
        define: Option<impl FnOnce() -> Result<(), E>>,
    ) -> Result<Rc<Animation>, E> {
        let AnimationOptions {
            duration,
            delay,
            easing,
            owner,
            on_complete,
        } = options;

        let animation = Rc::new(Animation {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            elapsed: Cell::new(Duration::ZERO),
            duration: Cell::new(duration),
            delay: Cell::new(delay),
            max_duration: Cell::new(duration),
            max_delay: Cell::new(delay),
            units: RefCell::new(Vec::new()),
            easing: easing.unwrap_or_else(|| default_easing.clone()),
            on_complete: RefCell::new(on_complete),
            owner,
            flags: Cell::new(AnimationFlags::empty()),
            pool,
        });

        {
            let _scope = DefinitionScope::enter(&animation);
            if let Some(define) = define {
                define()?;
            }
            if !animation.is_instant() {
                for unit in animation.units_snapshot() {
                    unit.rewind();
                }
            }
        }

        if animation.is_instant() {
            log::debug!("Animation {} has zero length, finishing now", animation.id);
            for unit in animation.units_snapshot() {
                unit.capture_end();
            }
            animation.finish();
        }

        Ok(animation)
    }

    /// Capture `property` into this animation, stealing it from any other
    /// animation that currently drives it.
    pub(crate) fn setup_capture<T: Tween>(self: &Rc<Self>, property: &Rc<PropertyCell<T>>) {
        let existing = property.record.borrow().clone();
        if let Some(record) = existing {
            // Set again in the same definition: the existing start stands
            if record.belongs_to(self) {
                return;
            }
            match record.animation() {
                Some(other) => {
                    log::trace!(
                        "Animation {} steals a property from animation {}",
                        self.id,
                        other.id
                    );
                    other.remove_unit(&record);
                }
                None => record.release(&self.pool),
            }
        }

        let record = PropertyRecord::bind(&self.pool, self, property, self.cursor());
        log::trace!(
            "Animation {} captured a {} property",
            self.id,
            std::any::type_name::<T>()
        );
        self.push_unit(record);
    }

    /// Push the delay cursor forward for properties captured after this call.
    pub fn add_delay(&self, extra: f32) {
        let delay = self.delay.get() + extra;
        self.delay.set(delay);
        self.max_delay.set(self.max_delay.get().max(delay));
    }

    /// Push the duration cursor forward for properties captured after this call.
    pub fn add_duration(&self, extra: f32) {
        let duration = self.duration.get() + extra;
        self.duration.set(duration);
        self.max_duration.set(self.max_duration.get().max(duration));
    }

    /// Add a custom unit stamped with the current cursors.
    pub fn add_custom_animation(&self, callback: impl FnMut(f32) + 'static) {
        self.push_unit(Rc::new(CustomUnit::new(callback, self.cursor())));
    }

    /// Advance by `dt` (already clamped by the scheduler).
    pub(crate) fn update(&self, dt: Duration) {
        if self.is_complete() {
            return;
        }

        // Summed exactly; rounded to seconds once per update
        let total = self.elapsed.get() + dt;
        self.elapsed.set(total);
        let elapsed = total.as_secs_f32();

        for unit in self.units_snapshot() {
            let timing = unit.timing();
            if elapsed > timing.delay {
                unit.apply(self.easing.evaluate(timing.progress(elapsed)));
            }
        }

        if elapsed >= self.lifetime() {
            self.finish();
        }
    }

    /// Jump to the end state now and run the completion path.
    pub fn complete_immediate(&self) {
        self.finish();
    }

    /// Stop without reaching the end state; the completion callback never runs.
    pub fn cancel(&self) {
        if self.is_complete() {
            return;
        }
        log::debug!("Animation {} cancelled", self.id);
        self.insert_flags(AnimationFlags::CANCELLED);
        self.release_units();
        self.on_complete.borrow_mut().take();
    }

    fn finish(&self) {
        if self.is_complete() {
            return;
        }
        self.insert_flags(AnimationFlags::COMPLETED);

        for unit in self.units_snapshot() {
            unit.finish();
        }
        self.release_units();

        let on_complete = self.on_complete.borrow_mut().take();
        if let Some(on_complete) = on_complete {
            on_complete();
        }
    }

    /// False once the owner is gone, after cancellation, or once every
    /// captured unit has been stolen by other animations.
    pub fn can_animate(&self) -> bool {
        let flags = self.flags.get();
        if flags.contains(AnimationFlags::CANCELLED) {
            return false;
        }
        if flags.contains(AnimationFlags::HAD_UNITS) && self.units.borrow().is_empty() {
            return false;
        }
        self.owner.as_ref().map_or(true, OwnerRef::is_alive)
    }

    pub fn is_complete(&self) -> bool {
        self.flags.get().contains(AnimationFlags::COMPLETED)
    }

    pub fn is_cancelled(&self) -> bool {
        self.flags.get().contains(AnimationFlags::CANCELLED)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn owner(&self) -> Option<&OwnerRef> {
        self.owner.as_ref()
    }

    pub(crate) fn is_owned_by(&self, owner: &OwnerRef) -> bool {
        self.owner.as_ref().is_some_and(|own| own.is(owner))
    }

    /// Seconds played so far.
    pub fn elapsed(&self) -> f32 {
        self.elapsed.get().as_secs_f32()
    }

    /// Longest delay plus longest duration seen during the definition.
    pub fn lifetime(&self) -> f32 {
        self.max_delay.get() + self.max_duration.get()
    }

    /// Number of properties and custom units still attached.
    pub fn unit_count(&self) -> usize {
        self.units.borrow().len()
    }

    /// Delay/duration of each attached unit, in capture order.
    pub fn unit_timings(&self) -> Vec<UnitTiming> {
        self.units.borrow().iter().map(|unit| unit.timing()).collect()
    }

    fn is_instant(&self) -> bool {
        self.lifetime() <= 0.0
    }

    fn cursor(&self) -> UnitTiming {
        UnitTiming {
            delay: self.delay.get(),
            duration: self.duration.get(),
        }
    }

    fn insert_flags(&self, flags: AnimationFlags) {
        self.flags.set(self.flags.get() | flags);
    }

    fn push_unit(&self, unit: Rc<dyn AnimatedUnit>) {
        self.units.borrow_mut().push(unit);
        self.insert_flags(AnimationFlags::HAD_UNITS);
    }

    /// Units are cloned out so callbacks may touch this animation freely
    fn units_snapshot(&self) -> Vec<Rc<dyn AnimatedUnit>> {
        self.units.borrow().clone()
    }

    fn remove_unit<T: Tween>(&self, record: &Rc<PropertyRecord<T>>) {
        let removed = {
            let mut units = self.units.borrow_mut();
            let index = units
                .iter()
                .position(|unit| std::ptr::addr_eq(Rc::as_ptr(unit), Rc::as_ptr(record)));
            index.map(|index| units.remove(index))
        };
        if let Some(unit) = removed {
            unit.release(&self.pool);
            if self.units.borrow().is_empty() {
                log::debug!("Animation {} lost its last property", self.id);
            }
        }
    }

    fn release_units(&self) {
        let units = std::mem::take(&mut *self.units.borrow_mut());
        for unit in units {
            unit.release(&self.pool);
        }
    }
}

impl Drop for Animation {
    fn drop(&mut self) {
        // Unlink properties of an animation that never ran to an end,
        // e.g. one whose definition callback failed
        for unit in std::mem::take(self.units.get_mut()) {
            unit.release(&self.pool);
        }
    }
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("id", &self.id)
            .field("elapsed", &self.elapsed())
            .field("lifetime", &self.lifetime())
            .field("units", &self.unit_count())
            .field("flags", &self.flags.get())
            .field("owner", &self.owner)
            .finish()
    }
}
