#![forbid(unsafe_code)]

//! Combination of many sources into one "any event" source.

use std::fmt;
use std::rc::Rc;

use crate::property::Source;
use crate::subscription::Subscription;

/// A source that fires whenever any of its constituents fires.
///
/// Subscribing attaches the handler to every constituent in order, so a
/// constituent that replays its current value on subscription makes the
/// combined source fire once per such constituent.
pub struct Combined<S: ?Sized> {
    sources: Vec<Rc<S>>,
}

/// Combine `sources` into a single [`Source`].
pub fn combine<S: Source + ?Sized>(sources: impl IntoIterator<Item = Rc<S>>) -> Combined<S> {
    Combined {
        sources: sources.into_iter().collect(),
    }
}

impl<S: ?Sized> Combined<S> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn sources(&self) -> impl Iterator<Item = &Rc<S>> {
        self.sources.iter()
    }
}

impl<S: Source + ?Sized> Source for Combined<S> {
    fn on_any(&self, handler: Rc<dyn Fn()>) -> Subscription {
        Subscription::group(
            self.sources
                .iter()
                .map(|source| source.on_any(Rc::clone(&handler)))
                .collect(),
        )
    }
}

impl<S: ?Sized> fmt::Debug for Combined<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Combined")
            .field("sources", &self.sources.len())
            .finish()
    }
}
