#![forbid(unsafe_code)]

//! Partial lenses: reified get/set accessors into a focused part of a structure.
//!
//! - [`Lens`]: the trait every lens implements. Both the whole and the focus
//!   are optional, so a lens can read a missing part and write a removal.
//! - [`Identity`], [`At`], [`field`], [`lens`] and [`Compose`]: generic lenses.
//! - [`Path`]: a sequence of object keys and array indices into a
//!   [`Value`](nucleon_core::Value) tree.
//!
//! # Laws
//!
//! A well-behaved lens satisfies get-after-set: `l.get(l.set(Some(a), s).as_ref())`
//! yields `Some(a)`. [`Path`] and [`At`] satisfy it for every index within
//! [`MAX_PADDING`] of the end of its sequence.

pub mod lens;
pub mod path;

pub use lens::{At, Compose, FnLens, Identity, Lens, MAX_PADDING, field, lens};
pub use path::{Path, Segment};
