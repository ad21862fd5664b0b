//! Weak references from animations to the UI element that owns them.
//!
//! An animation never keeps its element alive. Once the element is dropped,
//! or reports itself dead through [`AnimationOwner::is_alive`], the scheduler
//! discards the animation without touching its properties again.

use std::fmt;
use std::rc::{Rc, Weak};

/// Implemented by UI elements that own animations.
pub trait AnimationOwner: 'static {
    /// Whether the element is still valid. Elements that can be torn down
    /// while something still holds a reference to them override this.
    fn is_alive(&self) -> bool {
        true
    }
}

/// Weak, identity-comparable reference to an [`AnimationOwner`].
#[derive(Clone)]
pub struct OwnerRef(Weak<dyn AnimationOwner>);

impl OwnerRef {
    pub fn new<T: AnimationOwner>(owner: &Rc<T>) -> Self {
        let weak: Weak<T> = Rc::downgrade(owner);
        Self(weak)
    }

    /// The owner is still referenced somewhere and reports itself alive.
    pub fn is_alive(&self) -> bool {
        self.0.upgrade().is_some_and(|owner| owner.is_alive())
    }

    /// Identity comparison; works even after the owner has been dropped.
    pub fn is(&self, other: &OwnerRef) -> bool {
        std::ptr::addr_eq(self.0.as_ptr(), other.0.as_ptr())
    }
}

impl<T: AnimationOwner> From<&Rc<T>> for OwnerRef {
    fn from(owner: &Rc<T>) -> Self {
        OwnerRef::new(owner)
    }
}

impl fmt::Debug for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OwnerRef")
            .field(&(self.0.as_ptr() as *const ()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Element {
        alive: Cell<bool>,
    }

    impl AnimationOwner for Element {
        fn is_alive(&self) -> bool {
            self.alive.get()
        }
    }

    fn element() -> Rc<Element> {
        Rc::new(Element {
            alive: Cell::new(true),
        })
    }

    #[test]
    fn test_dropped_owner_is_dead() {
        let owner = element();
        let owner_ref = OwnerRef::new(&owner);
        assert!(owner_ref.is_alive());
        drop(owner);
        assert!(!owner_ref.is_alive());
    }

    #[test]
    fn test_owner_can_report_itself_dead() {
        let owner = element();
        let owner_ref = OwnerRef::from(&owner);
        owner.alive.set(false);
        assert!(!owner_ref.is_alive());
    }

    #[test]
    fn test_identity() {
        let a = element();
        let b = element();
        assert!(OwnerRef::new(&a).is(&OwnerRef::new(&a)));
        assert!(!OwnerRef::new(&a).is(&OwnerRef::new(&b)));

        let stale = OwnerRef::new(&a);
        drop(a);
        assert!(stale.is(&stale.clone()));
    }

    #[test]
    fn test_owners_of_different_types_erase_to_one_ref() {
        struct Window;
        impl AnimationOwner for Window {}

        let panel = element();
        let window = Rc::new(Window);
        let owners = [OwnerRef::new(&panel), OwnerRef::new(&window)];
        assert!(owners.iter().all(OwnerRef::is_alive));
        assert!(!owners[0].is(&owners[1]));
    }
}
