//! Animation-definition context.
//!
//! While an animation's definition callback runs, that animation sits on top
//! of a per-thread stack. [`Tweenable::set`](crate::Tweenable::set) and the
//! free functions in this module consult the top of the stack to find the
//! animation they should register with. Definitions nest: an animation
//! started inside another's definition callback captures into itself until
//! its own callback returns.
//!
//! The stack is only touched through [`DefinitionScope`], whose `Drop` pops
//! the entry, so a definition that panics or returns early never leaves a
//! stale animation behind.
//!
//! # Example
//!
//! ```ignore
//! animator.animate(AnimationOptions::new(0.3), || {
//!     for word in &words {
//!         word.alpha.set(1.0);
//!         // Each following word starts 50ms later
//!         add_delay(0.05);
//!     }
//! })?;
//! ```

use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::animation::Animation;
use crate::tween::Tween;

/// Stack of animations whose definition callbacks are running.
#[derive(Default)]
struct DefinitionContext {
    stack: Vec<Rc<Animation>>,
}

impl DefinitionContext {
    fn push(&mut self, animation: Rc<Animation>) {
        self.stack.push(animation);
    }

    fn pop(&mut self, animation: &Rc<Animation>) {
        match self.stack.last() {
            Some(top) if Rc::ptr_eq(top, animation) => {
                self.stack.pop();
            }
            _ => {
                // Scopes are strictly nested, so this only happens if one
                // was leaked with mem::forget
                log::error!("Definition context out of order, removing animation by identity");
                self.stack.retain(|entry| !Rc::ptr_eq(entry, animation));
            }
        }
    }

    fn current(&self) -> Option<Rc<Animation>> {
        self.stack.last().cloned()
    }
}

thread_local! {
    static CONTEXT: RefCell<DefinitionContext> = RefCell::new(DefinitionContext::default());
}

/// Guard holding an animation on top of the definition context.
pub(crate) struct DefinitionScope {
    animation: Rc<Animation>,
    // Tied to the thread whose stack it pushed onto
    _not_send: PhantomData<*const ()>,
}

impl DefinitionScope {
    pub(crate) fn enter(animation: &Rc<Animation>) -> Self {
        CONTEXT.with(|ctx| ctx.borrow_mut().push(animation.clone()));
        Self {
            animation: animation.clone(),
            _not_send: PhantomData,
        }
    }
}

impl Drop for DefinitionScope {
    fn drop(&mut self) {
        // The thread-local may already be gone during thread teardown
        let _ = CONTEXT.try_with(|ctx| ctx.borrow_mut().pop(&self.animation));
    }
}

/// The animation currently being defined, if any.
pub fn current() -> Option<Rc<Animation>> {
    CONTEXT
        .try_with(|ctx| ctx.borrow().current())
        .ok()
        .flatten()
}

/// Whether an animation definition callback is running on this thread.
pub fn is_defining() -> bool {
    current().is_some()
}

/// Delay every property captured from now on in the current definition by
/// `extra` more seconds. No-op outside a definition.
pub fn add_delay(extra: f32) {
    if let Some(animation) = current() {
        animation.add_delay(extra);
    }
}

/// Lengthen every property captured from now on in the current definition
/// by `extra` seconds. No-op outside a definition.
pub fn add_duration(extra: f32) {
    if let Some(animation) = current() {
        animation.add_duration(extra);
    }
}

/// Add a custom per-frame callback to the current definition.
///
/// Returns `false`, without calling `callback`, when no animation is being
/// defined. See [`animatable`] for the variant that falls back to an
/// immediate call.
pub fn add_custom_animation(callback: impl FnMut(f32) + 'static) -> bool {
    match current() {
        Some(animation) => {
            animation.add_custom_animation(callback);
            true
        }
        None => false,
    }
}

/// Drive `callback` with the eased time of the animation being defined, or
/// call it once with `1.0` when nothing is being defined.
pub fn animatable(mut callback: impl FnMut(f32) + 'static) {
    match current() {
        Some(animation) => animation.add_custom_animation(callback),
        None => callback(1.0),
    }
}

/// Animate a value that has no [`Tweenable`](crate::Tweenable) wrapper.
///
/// Inside a definition, `setter` receives the interpolated value each frame;
/// outside, it receives `target` immediately.
pub fn animatable_value<T: Tween>(initial: T, target: T, setter: impl Fn(T) + 'static) {
    animatable(move |t| setter(T::lerp(&initial, &target, t)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_no_context_outside_definition() {
        assert!(!is_defining());
        assert!(current().is_none());
        // Must not panic
        add_delay(1.0);
        add_duration(1.0);
        assert!(!add_custom_animation(|_| {}));
    }

    #[test]
    fn test_animatable_outside_definition_runs_at_end() {
        let seen = Rc::new(Cell::new(-1.0f32));
        let sink = seen.clone();
        animatable(move |t| sink.set(t));
        assert_eq!(seen.get(), 1.0);
    }

    #[test]
    fn test_animatable_value_outside_definition_sets_target() {
        let seen = Rc::new(Cell::new(0.0f32));
        let sink = seen.clone();
        animatable_value(2.0f32, 8.0, move |v| sink.set(v));
        assert_eq!(seen.get(), 8.0);
    }
}
