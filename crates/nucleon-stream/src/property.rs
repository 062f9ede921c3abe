#![forbid(unsafe_code)]

//! Shared properties with a current value and ordered observers.
//!
//! # Design
//!
//! [`Property<T>`] wraps its state in an `Rc`, so cloning a property creates a
//! new handle to the **same** value and observer list. Observers are plain
//! `Rc<dyn Fn(&T)>` callbacks; notification iterates over a snapshot of the
//! list so callbacks may subscribe, unsubscribe or emit re-entrantly.
//!
//! # Activation
//!
//! A property built with [`Property::with_lifecycle`] calls back into its
//! owner when it gains its first observer and when it loses its last one.
//! Derived cells use this to attach to their own sources lazily.
//!
//! # Failure Modes
//!
//! - **Observer panics**: the panic propagates to the emitter; observers later
//!   in the list are not notified for that value.
//! - **Owner dropped**: the lifecycle is held weakly, so a dropped owner simply
//!   stops receiving activation hooks.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use nucleon_core::Identical;

use crate::subscription::{Detach, ObserverId, Subscription};

/// The current value of a property.
#[derive(Clone, Debug, PartialEq)]
pub struct Event<T> {
    pub value: T,
}

/// Activation hooks for the owner of a [`Property`].
pub trait Lifecycle {
    /// Called before the first observer is registered.
    fn on_activation(&self);
    /// Called after the last observer is removed.
    fn on_deactivation(&self);
}

/// Payload-free "any event" channel.
///
/// Derived cells only need to know *that* something changed; they recompute
/// from scratch. This trait is object safe so heterogeneous sources can be
/// combined.
pub trait Source {
    fn on_any(&self, handler: Rc<dyn Fn()>) -> Subscription;
}

impl<S: Source + ?Sized> Source for Rc<S> {
    fn on_any(&self, handler: Rc<dyn Fn()>) -> Subscription {
        (**self).on_any(handler)
    }
}

type Observer<T> = Rc<dyn Fn(&T)>;

struct PropertyInner<T> {
    current: RefCell<Option<Event<T>>>,
    observers: RefCell<Vec<(ObserverId, Observer<T>)>>,
    next_id: Cell<ObserverId>,
    lifecycle: Option<Weak<dyn Lifecycle>>,
}

impl<T> PropertyInner<T> {
    fn lifecycle(&self) -> Option<Rc<dyn Lifecycle>> {
        self.lifecycle.as_ref().and_then(Weak::upgrade)
    }
}

impl<T> Detach for PropertyInner<T> {
    fn detach(&self, id: ObserverId) {
        let deactivated = {
            let mut observers = self.observers.borrow_mut();
            let before = observers.len();
            observers.retain(|(oid, _)| *oid != id);
            observers.len() != before && observers.is_empty()
        };
        if deactivated && let Some(lifecycle) = self.lifecycle() {
            lifecycle.on_deactivation();
        }
    }
}

/// A shared value holder that pushes changes to its observers.
pub struct Property<T> {
    inner: Rc<PropertyInner<T>>,
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("current", &*self.inner.current.borrow())
            .field("observers", &self.inner.observers.borrow().len())
            .finish()
    }
}

impl<T> Default for Property<T> {
    fn default() -> Self {
        Self::build(None, None)
    }
}

impl<T> Property<T> {
    fn build(current: Option<Event<T>>, lifecycle: Option<Weak<dyn Lifecycle>>) -> Self {
        Self {
            inner: Rc::new(PropertyInner {
                current: RefCell::new(current),
                observers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                lifecycle,
            }),
        }
    }

    /// Create a property with no current value.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a property holding `value`.
    #[must_use]
    pub fn with_value(value: T) -> Self {
        Self::build(Some(Event { value }), None)
    }

    /// Create a property whose activation is reported to `lifecycle`.
    #[must_use]
    pub fn with_lifecycle(lifecycle: Weak<dyn Lifecycle>) -> Self {
        Self::build(None, Some(lifecycle))
    }

    /// Stable identity of the shared state, equal across clones.
    #[must_use]
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.inner) as *const () as usize
    }

    /// Whether two handles refer to the same property.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    #[must_use]
    pub fn has_current(&self) -> bool {
        self.inner.current.borrow().is_some()
    }

    /// Whether at least one observer is attached.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.inner.observers.borrow().is_empty()
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }

    /// Access the current value by reference without cloning.
    ///
    /// # Panics
    ///
    /// Panics if the closure emits on this same property (re-entrant borrow).
    pub fn with_current<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        let current = self.inner.current.borrow();
        f(current.as_ref().map(|event| &event.value))
    }

    /// Replace the current value without notifying anyone.
    pub fn replace_silently(&self, value: T) {
        *self.inner.current.borrow_mut() = Some(Event { value });
    }

    /// Drop the current value without notifying anyone.
    pub fn clear(&self) {
        self.inner.current.borrow_mut().take();
    }
}

impl<T: Clone + 'static> Property<T> {
    /// Clone of the current value, if any.
    #[must_use]
    pub fn current(&self) -> Option<T> {
        self.with_current(|value| value.cloned())
    }

    /// Register an observer.
    ///
    /// If this is the first observer, the lifecycle's activation hook runs
    /// first. The observer then immediately receives the current value, if
    /// one exists.
    pub fn subscribe(&self, observer: impl Fn(&T) + 'static) -> Subscription {
        let observer: Observer<T> = Rc::new(observer);

        if !self.is_active()
            && let Some(lifecycle) = self.inner.lifecycle()
        {
            lifecycle.on_activation();
        }

        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .observers
            .borrow_mut()
            .push((id, Rc::clone(&observer)));

        if let Some(value) = self.current() {
            observer(&value);
        }

        let source: Weak<dyn Detach> = Rc::downgrade(&self.inner) as Weak<dyn Detach>;
        Subscription::observer(source, id)
    }

    /// Set the current value and notify every observer in registration order.
    pub fn emit(&self, value: T) {
        self.replace_silently(value.clone());
        let observers: Vec<Observer<T>> = self
            .inner
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();
        for observer in observers {
            observer(&value);
        }
    }
}

impl<T: Identical + Clone + 'static> Property<T> {
    /// Emit `next` unless it is identical to the current value.
    ///
    /// Returns whether observers were notified.
    pub fn maybe_emit(&self, next: T) -> bool {
        let changed = self.with_current(|current| current.is_none_or(|prev| !prev.identical(&next)));
        if changed {
            self.emit(next);
        }
        changed
    }
}

impl<T: Clone + 'static> Source for Property<T> {
    fn on_any(&self, handler: Rc<dyn Fn()>) -> Subscription {
        self.subscribe(move |_| handler())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder<T: Clone + 'static>() -> (Rc<RefCell<Vec<T>>>, impl Fn(&T) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |v: &T| sink.borrow_mut().push(v.clone()))
    }

    #[derive(Default)]
    struct Hooks {
        activations: Cell<u32>,
        deactivations: Cell<u32>,
    }

    impl Lifecycle for Hooks {
        fn on_activation(&self) {
            self.activations.set(self.activations.get() + 1);
        }
        fn on_deactivation(&self) {
            self.deactivations.set(self.deactivations.get() + 1);
        }
    }

    #[test]
    fn new_observer_receives_current_value() {
        let p = Property::with_value(7);
        let (seen, observer) = recorder();
        let _sub = p.subscribe(observer);
        assert_eq!(*seen.borrow(), vec![7]);
    }

    #[test]
    fn empty_property_does_not_replay() {
        let p: Property<i32> = Property::new();
        let (seen, observer) = recorder();
        let _sub = p.subscribe(observer);
        assert!(seen.borrow().is_empty());
        p.emit(1);
        assert_eq!(*seen.borrow(), vec![1]);
    }

    #[test]
    fn observers_notified_in_registration_order() {
        let p = Property::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let o1 = Rc::clone(&order);
        let o2 = Rc::clone(&order);
        let _a = p.subscribe(move |_: &i32| o1.borrow_mut().push('a'));
        let _b = p.subscribe(move |_: &i32| o2.borrow_mut().push('b'));
        p.emit(1);
        assert_eq!(*order.borrow(), vec!['a', 'b']);
    }

    #[test]
    fn maybe_emit_suppresses_identical_values() {
        let p = Property::with_value(f64::NAN);
        let (seen, observer) = recorder();
        let _sub = p.subscribe(observer);
        assert!(!p.maybe_emit(f64::NAN));
        assert!(p.maybe_emit(0.0));
        assert!(p.maybe_emit(-0.0));
        assert!(!p.maybe_emit(-0.0));
        assert_eq!(seen.borrow().len(), 3);
    }

    #[test]
    fn maybe_emit_always_fires_without_current() {
        let p: Property<Option<i32>> = Property::new();
        assert!(p.maybe_emit(None));
        assert_eq!(p.current(), Some(None));
    }

    #[test]
    fn drop_unsubscribes() {
        let p = Property::new();
        let (seen, observer) = recorder();
        let sub = p.subscribe(observer);
        p.emit(1);
        drop(sub);
        p.emit(2);
        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(p.observer_count(), 0);
    }

    #[test]
    fn lifecycle_tracks_first_and_last_observer() {
        let hooks = Rc::new(Hooks::default());
        let weak: Weak<dyn Lifecycle> = Rc::downgrade(&hooks) as Weak<dyn Lifecycle>;
        let p: Property<i32> = Property::with_lifecycle(weak);

        let a = p.subscribe(|_| {});
        let b = p.subscribe(|_| {});
        assert_eq!(hooks.activations.get(), 1);

        drop(a);
        assert_eq!(hooks.deactivations.get(), 0);
        drop(b);
        assert_eq!(hooks.deactivations.get(), 1);

        let _c = p.subscribe(|_| {});
        assert_eq!(hooks.activations.get(), 2);
    }

    #[test]
    fn replace_silently_does_not_notify() {
        let p = Property::with_value(1);
        let (seen, observer) = recorder();
        let _sub = p.subscribe(observer);
        p.replace_silently(2);
        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(p.current(), Some(2));
    }

    #[test]
    fn observer_may_unsubscribe_during_notification() {
        let p = Property::new();
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let slot_clone = Rc::clone(&slot);
        let count = Rc::new(Cell::new(0));
        let count_clone = Rc::clone(&count);
        let sub = p.subscribe(move |_: &i32| {
            count_clone.set(count_clone.get() + 1);
            slot_clone.borrow_mut().take();
        });
        *slot.borrow_mut() = Some(sub);

        p.emit(1);
        p.emit(2);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn subscription_outlives_property() {
        let sub = {
            let p = Property::with_value(1);
            p.subscribe(|_| {})
        };
        assert!(!sub.is_live());
        drop(sub);
    }

    #[test]
    fn clones_share_state() {
        let p = Property::new();
        let q = p.clone();
        p.emit(5);
        assert_eq!(q.current(), Some(5));
        assert!(p.ptr_eq(&q));
        assert_eq!(p.id(), q.id());
    }

    #[test]
    fn on_any_ignores_payload() {
        let p = Property::with_value("x");
        let hits = Rc::new(Cell::new(0));
        let hits_clone = Rc::clone(&hits);
        let _sub = p.on_any(Rc::new(move || hits_clone.set(hits_clone.get() + 1)));
        p.emit("y");
        assert_eq!(hits.get(), 2);
    }
}
