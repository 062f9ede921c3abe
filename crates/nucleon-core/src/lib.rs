#![forbid(unsafe_code)]

//! Core: value identity and the dynamic value tree shared by lenses and molecules.

pub mod identity;
pub mod value;

pub use identity::{Identical, identical};
pub use value::{Value, ValueKind};
