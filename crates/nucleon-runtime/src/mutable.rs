#![forbid(unsafe_code)]

//! Capability traits shared by every mutable cell.
//!
//! - [`Gettable`]: read the current value.
//! - [`Settable`]: write through `modify`, with `set` and `remove` derived
//!   from it.
//! - [`Observable`]: the backing [`Property`] and subscription helpers.
//! - [`Mutable`]: all three together, plus [`view`](Mutable::view) to derive a
//!   [`LensedAtom`].
//!
//! `None` plays the role of an absent value throughout: `get` returns `None`
//! before the first write, `modify` receives and returns `Option<V>`, and
//! `remove` writes `None`.

use nucleon_core::{Identical, Value};
use nucleon_lens::{Lens, Path};
use nucleon_stream::{Property, Subscription};

use crate::error::{Error, Result};
use crate::lensed::LensedAtom;

pub trait Gettable {
    type Value: Identical + Clone + 'static;

    /// The current value, or `None` if there is none.
    fn get(&self) -> Option<Self::Value>;
}

pub trait Settable: Gettable {
    /// Replace the value with `f(current)`.
    fn modify<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(Option<Self::Value>) -> Option<Self::Value>;

    fn set(&self, value: Self::Value) -> Result<()> {
        self.modify(move |_| Some(value))
    }

    fn remove(&self) -> Result<()> {
        self.modify(|_| None)
    }
}

pub trait Observable: Gettable {
    /// The property observers attach to.
    fn property(&self) -> &Property<Option<Self::Value>>;

    /// Observe every value change. The observer immediately receives the
    /// current value, if there is one.
    fn subscribe(&self, observer: impl Fn(&Option<Self::Value>) + 'static) -> Subscription
    where
        Self: Sized,
    {
        self.property().subscribe(observer)
    }

    /// Whether at least one observer is attached.
    fn is_active(&self) -> bool {
        self.property().is_active()
    }
}

/// A readable, writable, observable cell handle.
pub trait Mutable: Settable + Observable + Clone + 'static {
    /// Derive a mutable that reads and writes this one through `lens`.
    fn view<L, A>(&self, lens: L) -> LensedAtom<Self, L, A>
    where
        L: Lens<Self::Value, A> + 'static,
        A: Identical + Clone + 'static,
    {
        LensedAtom::new(self.clone(), lens)
    }

    #[deprecated(note = "use `view` instead")]
    fn lens<L, A>(&self, lens: L) -> LensedAtom<Self, L, A>
    where
        L: Lens<Self::Value, A> + 'static,
        A: Identical + Clone + 'static,
    {
        self.view(lens)
    }

    /// [`view`](Mutable::view) over a lens-path argument list, which must
    /// hold exactly one path.
    fn view_path(&self, paths: &[Path]) -> Result<LensedAtom<Self, Path, Value>>
    where
        Self: Gettable<Value = Value>,
    {
        match paths {
            [path] => Ok(self.view(path.clone())),
            _ => Err(Error::Arity {
                expected: 1,
                got: paths.len(),
            }),
        }
    }
}

impl<M: Settable + Observable + Clone + 'static> Mutable for M {}
