#![forbid(unsafe_code)]

//! The root mutable cell.
//!
//! An [`Atom`] owns its value. Outside a transaction a write emits at once
//! (unless the new value is identical to the old one). Inside a transaction
//! the write replaces the current value silently and registers the atom with
//! the lock, which emits the final value once on release.

use std::fmt;
use std::rc::Rc;

use nucleon_core::Identical;
use nucleon_stream::{Property, Source, Subscription};

use crate::error::Result;
use crate::mutable::{Gettable, Observable, Settable};
use crate::transaction::{self, Touched, TransactionLock};

/// A mutable, observable value cell.
///
/// Cloning an `Atom` creates a new handle to the **same** cell.
pub struct Atom<V> {
    property: Property<Option<V>>,
}

impl<V> Clone for Atom<V> {
    fn clone(&self) -> Self {
        Self {
            property: self.property.clone(),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Atom<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.property
            .with_current(|value| f.debug_tuple("Atom").field(&value).finish())
    }
}

impl<V: Identical + Clone + 'static> Default for Atom<V> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<V: Identical + Clone + 'static> Atom<V> {
    pub fn new(value: V) -> Self {
        Self {
            property: Property::with_value(Some(value)),
        }
    }

    /// An atom with no value yet.
    pub fn empty() -> Self {
        Self {
            property: Property::new(),
        }
    }

    pub fn get(&self) -> Option<V> {
        self.property.current().flatten()
    }

    pub fn set(&self, value: V) {
        self.modify(move |_| Some(value));
    }

    pub fn remove(&self) {
        self.modify(|_| None);
    }

    /// Replace the value with `f(current)` using this thread's lock.
    pub fn modify(&self, f: impl FnOnce(Option<V>) -> Option<V>) {
        transaction::with_lock(|lock| self.modify_in(lock, f));
    }

    /// Replace the value with `f(current)`, buffering the write if `lock`
    /// has an open transaction.
    pub fn modify_in(&self, lock: &TransactionLock, f: impl FnOnce(Option<V>) -> Option<V>) {
        let next = f(self.get());
        if lock.is_open() {
            lock.touch(self.property.id(), || {
                Box::new(TouchedAtom {
                    property: self.property.clone(),
                    before: self.property.current(),
                }) as Box<dyn Touched>
            });
            self.property.replace_silently(next);
        } else {
            self.property.maybe_emit(next);
        }
    }

    /// Identity of the cell, shared by all clones.
    #[must_use]
    pub fn id(&self) -> usize {
        self.property.id()
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.property.ptr_eq(&other.property)
    }
}

/// Pre-transaction state of a touched atom. `before` is `None` when the atom
/// had no value at all, which never matches a final value.
struct TouchedAtom<V> {
    property: Property<Option<V>>,
    before: Option<Option<V>>,
}

impl<V: Identical + Clone + 'static> Touched for TouchedAtom<V> {
    fn settle(&self) -> bool {
        let Some(after) = self.property.current() else {
            return false;
        };
        let changed = self
            .before
            .as_ref()
            .is_none_or(|before| !before.identical(&after));
        if changed {
            self.property.emit(after);
        }
        changed
    }
}

impl<V: Identical + Clone + 'static> Gettable for Atom<V> {
    type Value = V;

    fn get(&self) -> Option<V> {
        Atom::get(self)
    }
}

impl<V: Identical + Clone + 'static> Settable for Atom<V> {
    fn modify<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(Option<V>) -> Option<V>,
    {
        Atom::modify(self, f);
        Ok(())
    }
}

impl<V: Identical + Clone + 'static> Observable for Atom<V> {
    fn property(&self) -> &Property<Option<V>> {
        &self.property
    }
}

impl<V: Identical + Clone + 'static> Source for Atom<V> {
    fn on_any(&self, handler: Rc<dyn Fn()>) -> Subscription {
        self.property.on_any(handler)
    }
}
