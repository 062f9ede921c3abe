#![forbid(unsafe_code)]

//! The [`Lens`] trait and the generic lenses.

use std::fmt;
use std::marker::PhantomData;

/// A reified accessor for some part `A` of a whole `S`.
///
/// Both sides are optional: `get` on a missing whole or a missing part yields
/// `None`, and `set(None, ..)` removes the focused part where the whole allows
/// it.
pub trait Lens<S, A> {
    /// Read the focus out of `whole`.
    fn get(&self, whole: Option<&S>) -> Option<A>;

    /// Write `part` into `whole`, returning the new whole.
    fn set(&self, part: Option<A>, whole: Option<S>) -> Option<S>;

    /// Rewrite the focus of `whole` with `f`.
    fn modify<F>(&self, whole: Option<S>, f: F) -> Option<S>
    where
        Self: Sized,
        F: FnOnce(Option<A>) -> Option<A>,
    {
        let part = self.get(whole.as_ref());
        self.set(f(part), whole)
    }

    /// Focus further into the part with `inner`.
    fn then<B, L>(self, inner: L) -> Compose<Self, L, A>
    where
        Self: Sized,
        L: Lens<A, B>,
    {
        Compose(self, inner, PhantomData)
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The lens whose focus is the whole.
#[derive(Copy, Clone, Debug, Default)]
pub struct Identity;

impl<S: Clone> Lens<S, S> for Identity {
    fn get(&self, whole: Option<&S>) -> Option<S> {
        whole.cloned()
    }

    fn set(&self, part: Option<S>, _whole: Option<S>) -> Option<S> {
        part
    }
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// Lens composition: combines `Lens<S, A>` and `Lens<A, B>` into `Lens<S, B>`.
pub struct Compose<O, I, A: ?Sized>(pub O, pub I, pub PhantomData<fn() -> Box<A>>);

impl<O: Clone, I: Clone, A: ?Sized> Clone for Compose<O, I, A> {
    fn clone(&self) -> Self {
        Compose(self.0.clone(), self.1.clone(), PhantomData)
    }
}

impl<O: fmt::Debug, I: fmt::Debug, A: ?Sized> fmt::Debug for Compose<O, I, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Compose").field(&self.0).field(&self.1).finish()
    }
}

impl<S, A, B, O, I> Lens<S, B> for Compose<O, I, A>
where
    O: Lens<S, A>,
    I: Lens<A, B>,
{
    fn get(&self, whole: Option<&S>) -> Option<B> {
        let mid = self.0.get(whole);
        self.1.get(mid.as_ref())
    }

    fn set(&self, part: Option<B>, whole: Option<S>) -> Option<S> {
        self.0.modify(whole, |mid| self.1.set(part, mid))
    }
}

// ---------------------------------------------------------------------------
// Closure lenses
// ---------------------------------------------------------------------------

/// A lens built from a getter and a setter closure. See [`lens`].
#[derive(Clone)]
pub struct FnLens<G, St> {
    get: G,
    set: St,
}

impl<G, St> fmt::Debug for FnLens<G, St> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnLens")
    }
}

/// Build a lens from a getter and a setter.
pub fn lens<S, A, G, St>(get: G, set: St) -> FnLens<G, St>
where
    G: Fn(Option<&S>) -> Option<A>,
    St: Fn(Option<A>, Option<S>) -> Option<S>,
{
    FnLens { get, set }
}

impl<S, A, G, St> Lens<S, A> for FnLens<G, St>
where
    G: Fn(Option<&S>) -> Option<A>,
    St: Fn(Option<A>, Option<S>) -> Option<S>,
{
    fn get(&self, whole: Option<&S>) -> Option<A> {
        (self.get)(whole)
    }

    fn set(&self, part: Option<A>, whole: Option<S>) -> Option<S> {
        (self.set)(part, whole)
    }
}

/// Lens onto a field of a struct, given a reader and an in-place writer.
///
/// Writing `None` leaves the whole unchanged, since a field cannot be removed.
pub fn field<S, A>(
    read: impl Fn(&S) -> A,
    write: impl Fn(&mut S, A),
) -> FnLens<impl Fn(Option<&S>) -> Option<A>, impl Fn(Option<A>, Option<S>) -> Option<S>> {
    lens(
        move |whole: Option<&S>| whole.map(&read),
        move |part: Option<A>, whole: Option<S>| match (part, whole) {
            (Some(part), Some(mut whole)) => {
                write(&mut whole, part);
                Some(whole)
            }
            (_, whole) => whole,
        },
    )
}

/// Longest run of filler elements a single index write may add past the end
/// of a sequence. Writes further out leave the whole unchanged.
pub const MAX_PADDING: usize = 1 << 16;

/// Lens onto element `index` of a `Vec`.
///
/// Writing past the end pads with `T::default()`; writing `None` removes the
/// element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct At(pub usize);

impl<T: Clone + Default> Lens<Vec<T>, T> for At {
    fn get(&self, whole: Option<&Vec<T>>) -> Option<T> {
        whole.and_then(|items| items.get(self.0)).cloned()
    }

    fn set(&self, part: Option<T>, whole: Option<Vec<T>>) -> Option<Vec<T>> {
        match (part, whole) {
            (Some(part), Some(mut items)) if self.0 < items.len() => {
                items[self.0] = part;
                Some(items)
            }
            (Some(part), whole) => {
                let len = whole.as_ref().map_or(0, Vec::len);
                if self.0 - len > MAX_PADDING {
                    return whole;
                }
                let mut items = whole.unwrap_or_default();
                items.resize_with(self.0, T::default);
                items.push(part);
                Some(items)
            }
            (None, Some(mut items)) => {
                if self.0 < items.len() {
                    items.remove(self.0);
                }
                Some(items)
            }
            (None, None) => None,
        }
    }
}
