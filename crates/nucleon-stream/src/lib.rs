#![forbid(unsafe_code)]

//! Push-based observable primitive for Nucleon.
//!
//! This crate provides the subscription plumbing the mutable cells build on:
//!
//! - [`Property`]: a shared, single-threaded value holder that remembers its
//!   current [`Event`] and pushes new values to observers.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//! - [`Lifecycle`]: activation hooks fired when the first observer attaches and
//!   the last one detaches.
//! - [`Source`] and [`combine`]: the payload-free "any event" channel and the
//!   operator that merges many sources into one.
//!
//! # Architecture
//!
//! `Property<T>` uses `Rc<..>` with interior `RefCell`s for single-threaded
//! shared ownership. Subscriptions hold a `Weak` back-reference, so dropping a
//! property while subscriptions are alive is harmless.
//!
//! # Invariants
//!
//! 1. Observers are notified in registration order.
//! 2. A new observer immediately receives the current value, if there is one.
//! 3. `Lifecycle::on_activation` runs before the first observer is registered;
//!    `Lifecycle::on_deactivation` runs after the last one is removed.
//! 4. `maybe_emit` never notifies for a value identical to the current one.

pub mod combine;
pub mod property;
pub mod subscription;

pub use combine::{Combined, combine};
pub use property::{Event, Lifecycle, Property, Source};
pub use subscription::Subscription;
