#![forbid(unsafe_code)]

//! RAII subscription guards.

use std::fmt;
use std::rc::Weak;

/// Identifier of one registered observer within a property.
pub(crate) type ObserverId = u64;

/// Something an observer can be detached from.
pub(crate) trait Detach {
    fn detach(&self, id: ObserverId);
}

enum Kind {
    Observer {
        source: Weak<dyn Detach>,
        id: ObserverId,
    },
    Group(Vec<Subscription>),
    Empty,
}

/// RAII guard for a registered observer.
///
/// Dropping the guard removes the observer. A guard may also group several
/// child subscriptions (see [`combine`](crate::combine)), in which case all of
/// them are released together.
#[must_use = "dropping a Subscription immediately unsubscribes"]
pub struct Subscription {
    kind: Kind,
}

impl Subscription {
    pub(crate) fn observer(source: Weak<dyn Detach>, id: ObserverId) -> Self {
        Self {
            kind: Kind::Observer { source, id },
        }
    }

    /// Bundle several subscriptions into one guard.
    pub fn group(subscriptions: Vec<Subscription>) -> Self {
        Self {
            kind: Kind::Group(subscriptions),
        }
    }

    /// A guard that holds nothing.
    pub fn empty() -> Self {
        Self { kind: Kind::Empty }
    }

    /// Release the subscription now. Equivalent to dropping it.
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Whether any observer held by this guard is still attached to a live source.
    #[must_use]
    pub fn is_live(&self) -> bool {
        match &self.kind {
            Kind::Observer { source, .. } => source.strong_count() > 0,
            Kind::Group(children) => children.iter().any(Subscription::is_live),
            Kind::Empty => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Kind::Observer { source, id } = &self.kind
            && let Some(source) = source.upgrade()
        {
            source.detach(*id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Observer { id, .. } => f
                .debug_struct("Subscription")
                .field("id", id)
                .field("live", &self.is_live())
                .finish(),
            Kind::Group(children) => f
                .debug_struct("Subscription")
                .field("children", &children.len())
                .finish(),
            Kind::Empty => f.write_str("Subscription(empty)"),
        }
    }
}
