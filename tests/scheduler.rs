use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use glide::prelude::*;
use glide::RecordPool;

fn frame() -> Duration {
    Duration::from_micros(62_500)
}

fn run_frames(animator: &Animator, frames: usize) {
    for _ in 0..frames {
        animator.tick(frame());
    }
}

struct Panel {
    alive: Cell<bool>,
}

impl Panel {
    fn new() -> Rc<Self> {
        Rc::new(Self {
            alive: Cell::new(true),
        })
    }
}

impl AnimationOwner for Panel {
    fn is_alive(&self) -> bool {
        self.alive.get()
    }
}

/// Property whose setter counts writes
fn counted(initial: f32) -> (Tweenable<f32>, Rc<Cell<usize>>) {
    let value = Rc::new(Cell::new(initial));
    let writes = Rc::new(Cell::new(0));
    let (read, counter) = (value.clone(), writes.clone());
    let property = Tweenable::new(
        move || read.get(),
        move |v| {
            counter.set(counter.get() + 1);
            value.set(v);
        },
    );
    (property, writes)
}

type Latest = Rc<RefCell<Option<Rc<Animation>>>>;

/// Starts a one-frame animation that starts another one when it completes
fn spawn_chain(animator: &Animator, spawned: &Rc<Cell<u32>>, latest: &Latest) {
    spawned.set(spawned.get() + 1);
    let (next_animator, next_spawned, next_latest) =
        (animator.clone(), spawned.clone(), latest.clone());
    let animation = animator
        .animate_custom(
            AnimationOptions::new(0.0625)
                .on_complete(move || spawn_chain(&next_animator, &next_spawned, &next_latest)),
            |_| {},
        )
        .unwrap();
    *latest.borrow_mut() = Some(animation);
}

#[test]
fn test_completion_callback_animation_waits_for_next_tick() {
    let animator = Animator::new();
    let spawned = Rc::new(Cell::new(0));
    let latest = Rc::new(RefCell::new(None));

    spawn_chain(&animator, &spawned, &latest);
    assert_eq!(spawned.get(), 1);

    for tick in 1..=5 {
        animator.tick(frame());
        // One completion per tick, and the replacement hasn't been advanced
        assert_eq!(spawned.get(), tick + 1);
        assert_eq!(animator.len(), 1);
        let current = latest.borrow().clone().unwrap();
        assert_eq!(current.elapsed(), 0.0);
    }

    let current = latest.borrow_mut().take().unwrap();
    animator.cancel(&current);
    assert!(animator.is_empty());
}

#[test]
fn test_each_animation_advances_once_per_tick() {
    let animator = Animator::new();
    let a = Tweenable::from_value(0.0f32);
    let b = Tweenable::from_value(0.0f32);

    let first = animator
        .animate(AnimationOptions::new(1.0), || a.set(1.0))
        .unwrap();
    let second = animator
        .animate(AnimationOptions::new(1.0), || b.set(1.0))
        .unwrap();

    animator.tick(frame());
    assert_eq!(first.elapsed(), 0.0625);
    assert_eq!(second.elapsed(), 0.0625);
}

#[test]
fn test_dropped_owner_stops_animation_without_touching_property() {
    let animator = Animator::new();
    let panel = Panel::new();
    let (x, writes) = counted(0.0);

    animator
        .animate(AnimationOptions::new(1.0).owner(&panel), || x.set(10.0))
        .unwrap();
    // The assignment plus the rewind
    assert_eq!(writes.get(), 2);
    assert!(animator.is_animating(&panel));

    let owner = OwnerRef::new(&panel);
    drop(panel);
    assert!(!animator.is_animating(owner.clone()));

    run_frames(&animator, 4);
    assert_eq!(writes.get(), 2);
    assert_eq!(x.get(), 0.0);
    assert!(!x.is_animating());
    assert!(animator.is_empty());
}

#[test]
fn test_owner_reporting_dead_stops_animation() {
    let animator = Animator::new();
    let panel = Panel::new();
    let (x, writes) = counted(0.0);

    animator
        .animate(AnimationOptions::new(1.0).owner(&panel), || x.set(10.0))
        .unwrap();
    run_frames(&animator, 2);
    let moved = x.get();
    let writes_before = writes.get();

    panel.alive.set(false);
    run_frames(&animator, 2);

    assert_eq!(x.get(), moved);
    assert_eq!(writes.get(), writes_before);
    assert!(animator.is_empty());
}

#[test]
fn test_cancel_animations_only_affects_owner() {
    let animator = Animator::new();
    let left = Panel::new();
    let right = Panel::new();
    let x = Tweenable::from_value(0.0f32);
    let y = Tweenable::from_value(0.0f32);
    let left_completed = Rc::new(Cell::new(false));

    let flag = left_completed.clone();
    animator
        .animate(
            AnimationOptions::new(1.0)
                .owner(&left)
                .on_complete(move || flag.set(true)),
            || x.set(1.0),
        )
        .unwrap();
    animator
        .animate(AnimationOptions::new(1.0).owner(&right), || y.set(1.0))
        .unwrap();
    run_frames(&animator, 8);

    animator.cancel_animations(&left);

    assert_eq!(animator.len(), 1);
    assert!(!animator.is_animating(&left));
    assert!(animator.is_animating(&right));
    assert_eq!(x.get(), 0.5);
    assert!(!x.is_animating());

    run_frames(&animator, 8);
    assert_eq!(x.get(), 0.5);
    assert_eq!(y.get(), 1.0);
    assert!(!left_completed.get());
}

#[test]
fn test_complete_animations_jumps_to_end() {
    let animator = Animator::new();
    let left = Panel::new();
    let right = Panel::new();
    let x = Tweenable::from_value(0.0f32);
    let y = Tweenable::from_value(0.0f32);
    let completions = Rc::new(Cell::new(0));

    let counter = completions.clone();
    animator
        .animate(
            AnimationOptions::new(1.0)
                .delay(0.5)
                .owner(&left)
                .on_complete(move || counter.set(counter.get() + 1)),
            || x.set(4.0),
        )
        .unwrap();
    animator
        .animate(AnimationOptions::new(1.0).owner(&right), || y.set(4.0))
        .unwrap();

    animator.complete_animations(&left);

    assert_eq!(x.get(), 4.0);
    assert_eq!(y.get(), 0.0);
    assert_eq!(completions.get(), 1);
    assert_eq!(animator.len(), 1);
    assert!(!animator.is_animating(&left));

    run_frames(&animator, 20);
    assert_eq!(completions.get(), 1);
    assert_eq!(y.get(), 4.0);
}

#[test]
fn test_after_fires_once_delay_elapses() {
    let animator = Animator::new();
    let panel = Panel::new();
    let fired = Rc::new(Cell::new(0));

    let counter = fired.clone();
    animator
        .after(0.25, Some(OwnerRef::new(&panel)), move || {
            counter.set(counter.get() + 1)
        })
        .unwrap();
    assert!(animator.is_animating(&panel));

    run_frames(&animator, 3);
    assert_eq!(fired.get(), 0);

    run_frames(&animator, 1);
    assert_eq!(fired.get(), 1);
    assert!(animator.is_empty());
}

#[test]
fn test_after_zero_delay_runs_immediately() {
    let animator = Animator::new();
    let fired = Rc::new(Cell::new(false));

    let flag = fired.clone();
    animator.after(0.0, None, move || flag.set(true)).unwrap();

    assert!(fired.get());
    assert!(animator.is_empty());
}

#[test]
fn test_custom_animation_receives_eased_time() {
    let animator = Animator::new();
    let samples = Rc::new(RefCell::new(Vec::new()));

    let sink = samples.clone();
    animator
        .animate_custom(
            AnimationOptions::new(0.25).easing(Easing::Linear),
            move |t| sink.borrow_mut().push(t),
        )
        .unwrap();
    assert!(samples.borrow().is_empty());

    run_frames(&animator, 4);

    let samples = samples.borrow();
    assert_eq!(samples[..4], [0.25, 0.5, 0.75, 1.0]);
    assert_eq!(samples.last(), Some(&1.0));
}

#[test]
fn test_records_are_recycled() {
    let animator = Animator::new();
    let x = Tweenable::from_value(0.0f32);
    let y = Tweenable::from_value(0.0f32);
    assert_eq!(animator.pool().available::<f32>(), 0);

    animator
        .animate(AnimationOptions::new(0.125), || x.set(1.0))
        .unwrap();
    run_frames(&animator, 2);
    assert_eq!(animator.pool().available::<f32>(), 1);

    animator
        .animate(AnimationOptions::new(0.125), || y.set(1.0))
        .unwrap();
    assert_eq!(animator.pool().available::<f32>(), 0);

    run_frames(&animator, 2);
    assert_eq!(animator.pool().available::<f32>(), 1);
    assert_eq!(y.get(), 1.0);
}

#[test]
fn test_stolen_records_go_back_to_pool() {
    let pool = Rc::new(RecordPool::new());
    let animator = Animator::with_pool(AnimatorConfig::default(), pool.clone());
    let x = Tweenable::from_value(0.0f32);

    animator
        .animate(AnimationOptions::new(1.0), || x.set(1.0))
        .unwrap();
    // The stolen record goes back to the pool and is rebound right away
    animator
        .animate(AnimationOptions::new(1.0), || x.set(2.0))
        .unwrap();
    assert_eq!(pool.available::<f32>(), 0);

    run_frames(&animator, 16);
    assert_eq!(x.get(), 2.0);
    assert_eq!(pool.available::<f32>(), 1);
    assert!(animator.is_empty());
}

#[test]
fn test_config_default_easing_applies() {
    let animator = Animator::with_config(AnimatorConfig::default().default_easing(Easing::Linear));
    let x = Tweenable::from_value(0.0f32);

    animator
        .animate(AnimationOptions::new(1.0), || x.set(16.0))
        .unwrap();
    run_frames(&animator, 1);

    assert_eq!(x.get(), 1.0);
}

#[test]
fn test_stall_is_clamped() {
    let animator = Animator::new();
    let x = Tweenable::from_value(0.0f32);

    let anim = animator
        .animate(AnimationOptions::new(1.0), || x.set(1.0))
        .unwrap();
    animator.tick(Duration::from_secs(30));

    assert!(!anim.is_complete());
    assert!(anim.elapsed() <= 1.0 / 15.0 + f32::EPSILON);
}

#[test]
fn test_removal_during_tick_does_not_skip_or_advance_new_animations() {
    let animator = Animator::new();
    let panel = Panel::new();
    let spawned: Latest = Rc::new(RefCell::new(None));

    let (cb_animator, cb_panel, cb_spawned) = (animator.clone(), panel.clone(), spawned.clone());
    animator
        .animate_custom(
            AnimationOptions::new(0.0625)
                .owner(&panel)
                .on_complete(move || {
                    cb_animator.cancel_animations(&cb_panel);
                    let next = cb_animator
                        .animate_custom(AnimationOptions::new(1.0), |_| {})
                        .unwrap();
                    *cb_spawned.borrow_mut() = Some(next);
                }),
            |_| {},
        )
        .unwrap();
    let other = animator
        .animate_custom(AnimationOptions::new(1.0), |_| {})
        .unwrap();

    animator.tick(frame());

    assert_eq!(other.elapsed(), 0.0625);
    let spawned = spawned.borrow().clone().unwrap();
    assert_eq!(spawned.elapsed(), 0.0);
    assert_eq!(animator.len(), 2);
}

#[test]
fn test_cancelling_an_earlier_animation_mid_tick_keeps_later_ones_running() {
    let animator = Animator::new();
    let first = animator
        .animate_custom(AnimationOptions::new(1.0), |_| {})
        .unwrap();

    let (cb_animator, target) = (animator.clone(), Rc::new(RefCell::new(Some(first.clone()))));
    let cb_target = target.clone();
    let second = animator
        .animate_custom(AnimationOptions::new(1.0), move |_| {
            if let Some(first) = cb_target.borrow_mut().take() {
                cb_animator.cancel(&first);
            }
        })
        .unwrap();
    let third = animator
        .animate_custom(AnimationOptions::new(1.0), |_| {})
        .unwrap();

    animator.tick(frame());

    assert!(first.is_cancelled());
    assert_eq!(second.elapsed(), 0.0625);
    assert_eq!(third.elapsed(), 0.0625);
    assert_eq!(animator.len(), 2);
}
