#![forbid(unsafe_code)]

//! Mutables whose value is derived from another source.
//!
//! A [`MutableWithSource`] pairs a [`Derivation`] with a property. While the
//! property has observers it subscribes to the derivation's source, re-derives
//! on every source event and emits when the result changes. When the last
//! observer leaves it unsubscribes and forgets the cached value, so an
//! unobserved derived mutable costs nothing and always reads fresh.
//!
//! # Invariants
//!
//! 1. A cached value exists only between activation and deactivation.
//! 2. `get` returns the cached value only when one exists and no transaction
//!    is open on any lock of this thread; otherwise it derives from the
//!    source.
//! 3. Emission goes through `maybe_emit`, so identical derivations are silent.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use nucleon_core::Identical;
use nucleon_stream::{Lifecycle, Property, Source, Subscription};

use crate::transaction;

/// How a derived mutable computes its value.
pub trait Derivation: 'static {
    type Value: Identical + Clone + 'static;

    /// The source whose events trigger re-derivation.
    fn source(&self) -> &dyn Source;

    /// Compute the current value. `previous` is the cached value, if any,
    /// which a derivation may return parts of unchanged.
    fn derive(&self, previous: Option<&Self::Value>) -> Option<Self::Value>;
}

struct Inner<D: Derivation> {
    derivation: D,
    property: Property<Option<D::Value>>,
    source_subscription: RefCell<Option<Subscription>>,
    this: Weak<Inner<D>>,
}

impl<D: Derivation> Inner<D> {
    fn derive_now(&self) -> Option<D::Value> {
        let previous = self.property.current().flatten();
        self.derivation.derive(previous.as_ref())
    }

    fn handle_any(&self) {
        let next = self.derive_now();
        self.property.maybe_emit(next);
    }
}

impl<D: Derivation> Lifecycle for Inner<D> {
    fn on_activation(&self) {
        let this = self.this.clone();
        let handler: Rc<dyn Fn()> = Rc::new(move || {
            if let Some(inner) = this.upgrade() {
                inner.handle_any();
            }
        });
        // The source may replay its current value into `handler` right away.
        let subscription = self.derivation.source().on_any(handler);
        *self.source_subscription.borrow_mut() = Some(subscription);
    }

    fn on_deactivation(&self) {
        let subscription = self.source_subscription.borrow_mut().take();
        drop(subscription);
        self.property.clear();
    }
}

/// Shared handle to a derived mutable cell.
pub struct MutableWithSource<D: Derivation> {
    inner: Rc<Inner<D>>,
}

impl<D: Derivation> Clone for MutableWithSource<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<D: Derivation> fmt::Debug for MutableWithSource<D>
where
    D::Value: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableWithSource")
            .field("cached", &self.inner.property.current())
            .field("observers", &self.inner.property.observer_count())
            .finish()
    }
}

impl<D: Derivation> MutableWithSource<D> {
    pub fn new(derivation: D) -> Self {
        let inner = Rc::new_cyclic(|this: &Weak<Inner<D>>| {
            let lifecycle: Weak<dyn Lifecycle> = this.clone();
            Inner {
                derivation,
                property: Property::with_lifecycle(lifecycle),
                source_subscription: RefCell::new(None),
                this: this.clone(),
            }
        });
        Self { inner }
    }

    pub fn derivation(&self) -> &D {
        &self.inner.derivation
    }

    pub fn property(&self) -> &Property<Option<D::Value>> {
        &self.inner.property
    }

    /// The cached value while observed and outside a transaction, otherwise a
    /// fresh derivation.
    pub fn get(&self) -> Option<D::Value> {
        if !transaction::any_open()
            && let Some(cached) = self.inner.property.current()
        {
            return cached;
        }
        self.inner.derive_now()
    }

    /// Whether the source subscription is currently held.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.inner.source_subscription.borrow().is_some()
    }
}
