#![forbid(unsafe_code)]

//! Nucleon public facade crate.
//!
//! Observable state cells with lenses and transactional batching:
//!
//! ```
//! use nucleon::prelude::*;
//!
//! let doc = atom(Value::object([("count", 1)]));
//! let count = doc.view(Path::from("count"));
//! let x = atom(Value::from(0));
//! let pair = molecule(Template::mapping([("count", Template::from(count.clone())), ("x", Template::from(&x))]));
//!
//! holding(|| {
//!     doc.set(Value::object([("count", 2)]));
//!     x.set(Value::from(5));
//! });
//! assert_eq!(pair.get(), Some(Value::object([("count", 2), ("x", 5)])));
//! ```

pub use nucleon_core as core;
pub use nucleon_lens as lens;
pub use nucleon_runtime as runtime;
pub use nucleon_stream as stream;

pub use nucleon_core::{Identical, Value, identical};
pub use nucleon_lens::{Lens, Path, Segment};
pub use nucleon_runtime::{
    Atom, Error, Gettable, LensedAtom, Molecule, Mutable, Observable, Result, Settable, Template,
    TransactionLock, holding,
};
pub use nucleon_stream::Subscription;

/// An atom holding `value`, or an empty atom for `None`.
pub fn atom<V>(value: impl Into<Option<V>>) -> Atom<V>
where
    V: Identical + Clone + 'static,
{
    match value.into() {
        Some(value) => Atom::new(value),
        None => Atom::empty(),
    }
}

/// An atom with no value.
pub fn atom_empty<V>() -> Atom<V>
where
    V: Identical + Clone + 'static,
{
    Atom::empty()
}

/// A molecule over `template`.
pub fn molecule(template: impl Into<Template>) -> Molecule {
    Molecule::new(template)
}

pub mod prelude {
    pub use crate::{
        Atom, Gettable, Identical, Lens, LensedAtom, Molecule, Mutable, Observable, Path,
        Segment, Settable, Template, Value, atom, atom_empty, holding, molecule,
    };
}
