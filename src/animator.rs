//! The scheduler that plays animations frame by frame.
//!
//! An [`Animator`] owns the set of playing animations. The host calls
//! [`Animator::tick`] once per frame; each live animation is advanced at most
//! once per tick. Animations started from a completion callback during a
//! tick join the set but are not advanced until the next tick, so an
//! animation that restarts itself on completion cannot spin within a frame.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::animation::{Animation, AnimationOptions};
use crate::config::AnimatorConfig;
use crate::context;
use crate::error::AnimationError;
use crate::owner::OwnerRef;
use crate::record::RecordPool;

struct AnimatorInner {
    config: AnimatorConfig,
    pool: Rc<RecordPool>,
    animations: RefCell<Vec<Rc<Animation>>>,
}

/// Handle to a scheduler. Clones share the same set of animations, so a
/// completion callback can hold one to start follow-up animations.
#[derive(Clone)]
pub struct Animator {
    inner: Rc<AnimatorInner>,
}

impl Animator {
    pub fn new() -> Self {
        Self::with_config(AnimatorConfig::default())
    }

    pub fn with_config(config: AnimatorConfig) -> Self {
        Self::with_pool(config, Rc::new(RecordPool::new()))
    }

    /// Scheduler that recycles records through a caller-provided pool.
    pub fn with_pool(config: AnimatorConfig, pool: Rc<RecordPool>) -> Self {
        Self {
            inner: Rc::new(AnimatorInner {
                config,
                pool,
                animations: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &AnimatorConfig {
        &self.inner.config
    }

    pub fn pool(&self) -> &Rc<RecordPool> {
        &self.inner.pool
    }

    /// Start an animation. `define` runs once, right now; every
    /// [`Tweenable`](crate::Tweenable) it sets is animated from its current
    /// value to the value it was set to.
    ///
    /// Animations with zero total length finish before this returns and are
    /// never scheduled.
    pub fn animate(
        &self,
        options: AnimationOptions,
        define: impl FnOnce(),
    ) -> Result<Rc<Animation>, AnimationError> {
        self.begin(
            options,
            Some(|| -> Result<(), AnimationError> {
                define();
                Ok(())
            }),
        )
    }

    /// Like [`animate`](Self::animate) for a definition that can fail.
    ///
    /// On error nothing is scheduled and captured properties are left with
    /// whatever the callback assigned before failing.
    pub fn try_animate<E>(
        &self,
        options: AnimationOptions,
        define: impl FnOnce() -> Result<(), E>,
    ) -> Result<Rc<Animation>, AnimationError>
    where
        E: std::error::Error + 'static,
    {
        self.begin(
            options,
            Some(|| define().map_err(|err| AnimationError::Definition(Box::new(err)))),
        )
    }

    /// Animation whose single unit is `callback`, driven with eased time.
    pub fn animate_custom(
        &self,
        options: AnimationOptions,
        callback: impl FnMut(f32) + 'static,
    ) -> Result<Rc<Animation>, AnimationError> {
        self.animate(options, move || context::animatable(callback))
    }

    /// Run `f` after `delay` seconds.
    pub fn after(
        &self,
        delay: f32,
        owner: Option<OwnerRef>,
        f: impl FnOnce() + 'static,
    ) -> Result<Rc<Animation>, AnimationError> {
        let mut options = AnimationOptions::new(0.0).delay(delay).on_complete(f);
        options.owner = owner;
        self.begin(options, None::<fn() -> Result<(), AnimationError>>)
    }

    fn begin(
        &self,
        options: AnimationOptions,
        define: Option<impl FnOnce() -> Result<(), AnimationError>>,
    ) -> Result<Rc<Animation>, AnimationError> {
        options.validate()?;

        let animation = Animation::define(
            options,
            &self.inner.config.default_easing,
            self.inner.pool.clone(),
            define,
        )?;

        if !animation.is_complete() {
            log::debug!(
                "Animation {} scheduled ({} units, {}s)",
                animation.id(),
                animation.unit_count(),
                animation.lifetime()
            );
            self.inner.animations.borrow_mut().push(animation.clone());
        }
        Ok(animation)
    }

    /// Advance every playing animation by `delta`, clamped to
    /// [`AnimatorConfig::max_frame_delta`].
    ///
    /// Only the animations present when the tick starts are visited, each
    /// once, and only while they are still scheduled. Animations whose owner
    /// died or that lost every property to other animations are removed
    /// without being updated.
    pub fn tick(&self, delta: Duration) {
        let snapshot = self.inner.animations.borrow().clone();
        if snapshot.is_empty() {
            return;
        }

        let dt = delta.min(self.inner.config.max_frame_delta);
        let mut finished = Vec::new();

        for animation in snapshot {
            // Removed by a callback earlier in this tick
            if !self.is_scheduled(&animation) {
                continue;
            }

            if !animation.can_animate() {
                log::debug!("Dropping animation {}: nothing left to animate", animation.id());
                animation.cancel();
                finished.push(animation);
                continue;
            }

            animation.update(dt);

            if animation.is_complete() {
                finished.push(animation);
            }
        }

        if !finished.is_empty() {
            self.inner
                .animations
                .borrow_mut()
                .retain(|animation| !finished.iter().any(|done| Rc::ptr_eq(done, animation)));
        }
    }

    fn is_scheduled(&self, animation: &Rc<Animation>) -> bool {
        self.inner
            .animations
            .borrow()
            .iter()
            .any(|scheduled| Rc::ptr_eq(scheduled, animation))
    }

    /// Whether `owner` has an animation that is still playing.
    pub fn is_animating(&self, owner: impl Into<OwnerRef>) -> bool {
        let owner = owner.into();
        self.inner.animations.borrow().iter().any(|animation| {
            animation.is_owned_by(&owner) && animation.can_animate() && !animation.is_complete()
        })
    }

    /// Cancel and remove every animation owned by `owner`. Properties keep
    /// their current values; completion callbacks don't run.
    pub fn cancel_animations(&self, owner: impl Into<OwnerRef>) {
        let owner = owner.into();
        let cancelled: Vec<_> = {
            let mut animations = self.inner.animations.borrow_mut();
            let (cancelled, kept): (Vec<_>, Vec<_>) = animations
                .drain(..)
                .partition(|animation| animation.is_owned_by(&owner));
            *animations = kept;
            cancelled
        };
        if !cancelled.is_empty() {
            log::debug!("Cancelling {} animations for {:?}", cancelled.len(), owner);
        }
        for animation in cancelled {
            animation.cancel();
        }
    }

    /// Jump every animation owned by `owner` to its end state, firing
    /// completion callbacks, and remove them.
    pub fn complete_animations(&self, owner: impl Into<OwnerRef>) {
        let owner = owner.into();
        let owned: Vec<_> = self
            .inner
            .animations
            .borrow()
            .iter()
            .filter(|animation| animation.is_owned_by(&owner))
            .cloned()
            .collect();

        for animation in &owned {
            if animation.can_animate() {
                animation.complete_immediate();
            } else {
                animation.cancel();
            }
        }

        self.inner
            .animations
            .borrow_mut()
            .retain(|animation| !owned.iter().any(|done| Rc::ptr_eq(done, animation)));
    }

    /// Cancel one animation and remove it right away.
    pub fn cancel(&self, animation: &Rc<Animation>) {
        animation.cancel();
        self.inner
            .animations
            .borrow_mut()
            .retain(|scheduled| !Rc::ptr_eq(scheduled, animation));
    }

    /// Number of scheduled animations.
    pub fn len(&self) -> usize {
        self.inner.animations.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Animator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Animator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animator")
            .field("config", &self.inner.config)
            .field("animations", &self.len())
            .finish()
    }
}

/// Measures wall-clock time between frames for hosts without their own delta.
#[derive(Debug, Default)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time since the previous call; zero on the first call.
    pub fn delta(&mut self) -> Duration {
        let now = Instant::now();
        let delta = self
            .last
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last = Some(now);
        delta
    }
}

thread_local! {
    static GLOBAL: RefCell<Option<Animator>> = const { RefCell::new(None) };
}

/// This thread's shared animator, created on first use.
pub fn global() -> Animator {
    GLOBAL.with(|global| global.borrow_mut().get_or_insert_with(Animator::new).clone())
}

/// Drop this thread's shared animator. The next [`global`] call makes a
/// fresh one; handles already cloned keep the old one alive.
pub fn reset_global() {
    GLOBAL.with(|global| global.borrow_mut().take());
}
