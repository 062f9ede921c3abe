#![forbid(unsafe_code)]

//! Mutable, observable state cells with transactional batching.
//!
//! - [`Atom`]: the root cell that owns a value.
//! - [`LensedAtom`]: a cell that reads and writes a part of another mutable
//!   through a lens. Obtained with [`Mutable::view`].
//! - [`Molecule`]: a cell over a [`Template`] of many mutables.
//! - [`holding`]: run writes inside a transaction so each atom settles with
//!   at most one notification.
//!
//! # Architecture
//!
//! Every cell is a cheap `Rc` handle around a
//! [`Property`](nucleon_stream::Property) of `Option<V>`. Derived cells
//! ([`LensedAtom`], [`Molecule`]) are [`MutableWithSource`]s: they subscribe
//! to their source only while observed, and otherwise derive on demand.
//! Transaction state lives in a per-thread [`TransactionLock`].
//!
//! # Invariants
//!
//! 1. No notification is sent for a value identical to the current one.
//! 2. Inside a transaction atoms do not notify; on release each touched atom
//!    notifies at most once, in first-touch order.
//! 3. An unobserved derived cell holds no cached value.
//! 4. A molecule write that does not fit the template writes nothing.

pub mod atom;
pub mod error;
pub mod lensed;
pub mod molecule;
pub mod mutable;
pub mod template;
pub mod transaction;
pub mod with_source;

pub use atom::Atom;
pub use error::{Error, Result};
pub use lensed::{Lensed, LensedAtom};
pub use molecule::{Combination, Molecule};
pub use mutable::{Gettable, Mutable, Observable, Settable};
pub use template::{DynMutable, Template};
pub use transaction::{TransactionLock, holding};
pub use with_source::{Derivation, MutableWithSource};
