#![forbid(unsafe_code)]

//! Mutables viewed through a lens.

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use nucleon_core::Identical;
use nucleon_lens::Lens;
use nucleon_stream::{Property, Source, Subscription};

use crate::error::Result;
use crate::mutable::{Gettable, Mutable, Observable, Settable};
use crate::with_source::{Derivation, MutableWithSource};

/// Reads the focus of a lens out of a parent mutable.
pub struct Lensed<P, L, A> {
    parent: P,
    lens: L,
    _focus: PhantomData<fn() -> A>,
}

impl<P, L, A> Derivation for Lensed<P, L, A>
where
    P: Mutable,
    L: Lens<P::Value, A> + 'static,
    A: Identical + Clone + 'static,
{
    type Value = A;

    fn source(&self) -> &dyn Source {
        self.parent.property()
    }

    fn derive(&self, _previous: Option<&A>) -> Option<A> {
        self.lens.get(self.parent.get().as_ref())
    }
}

/// A mutable whose value is the focus of `lens` inside a parent mutable.
///
/// Reading applies the lens to the parent's value. Writing rewrites the
/// parent through the lens, so the parent decides whether the write is
/// buffered by an open transaction.
pub struct LensedAtom<P, L, A>
where
    P: Mutable,
    L: Lens<P::Value, A> + 'static,
    A: Identical + Clone + 'static,
{
    cell: MutableWithSource<Lensed<P, L, A>>,
}

impl<P, L, A> LensedAtom<P, L, A>
where
    P: Mutable,
    L: Lens<P::Value, A> + 'static,
    A: Identical + Clone + 'static,
{
    pub fn new(parent: P, lens: L) -> Self {
        Self {
            cell: MutableWithSource::new(Lensed {
                parent,
                lens,
                _focus: PhantomData,
            }),
        }
    }

    pub fn parent(&self) -> &P {
        &self.cell.derivation().parent
    }

    pub fn lens(&self) -> &L {
        &self.cell.derivation().lens
    }
}

impl<P, L, A> Clone for LensedAtom<P, L, A>
where
    P: Mutable,
    L: Lens<P::Value, A> + 'static,
    A: Identical + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<P, L, A> fmt::Debug for LensedAtom<P, L, A>
where
    P: Mutable,
    L: Lens<P::Value, A> + fmt::Debug + 'static,
    A: Identical + Clone + fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LensedAtom")
            .field("lens", self.lens())
            .field("cached", &self.cell.property().current())
            .finish()
    }
}

impl<P, L, A> Gettable for LensedAtom<P, L, A>
where
    P: Mutable,
    L: Lens<P::Value, A> + 'static,
    A: Identical + Clone + 'static,
{
    type Value = A;

    fn get(&self) -> Option<A> {
        self.cell.get()
    }
}

impl<P, L, A> Settable for LensedAtom<P, L, A>
where
    P: Mutable,
    L: Lens<P::Value, A> + 'static,
    A: Identical + Clone + 'static,
{
    fn modify<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(Option<A>) -> Option<A>,
    {
        let lensed = self.cell.derivation();
        lensed
            .parent
            .modify(|whole| lensed.lens.modify(whole, f))
    }
}

impl<P, L, A> Observable for LensedAtom<P, L, A>
where
    P: Mutable,
    L: Lens<P::Value, A> + 'static,
    A: Identical + Clone + 'static,
{
    fn property(&self) -> &Property<Option<A>> {
        self.cell.property()
    }
}

impl<P, L, A> Source for LensedAtom<P, L, A>
where
    P: Mutable,
    L: Lens<P::Value, A> + 'static,
    A: Identical + Clone + 'static,
{
    fn on_any(&self, handler: Rc<dyn Fn()>) -> Subscription {
        self.cell.property().on_any(handler)
    }
}
