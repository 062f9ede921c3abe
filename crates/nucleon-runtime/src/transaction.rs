#![forbid(unsafe_code)]

//! Reentrant batching of atom writes.
//!
//! A [`TransactionLock`] is a depth counter plus the ordered set of atoms
//! written while the counter is above zero. [`TransactionLock::holding`] runs
//! an action with the counter raised; nested calls join the outermost one.
//! When the outermost call returns, the lock *releases*: every touched atom,
//! in first-touch order, compares the value it had before its first buffered
//! write with its final value and emits once if they are not identical.
//!
//! Each thread owns one lock, reachable through [`holding`], [`depth`],
//! [`is_open`] and [`with_lock`]. A standalone lock can be created with
//! [`TransactionLock::new`] and handed to
//! [`Atom::modify_in`](crate::Atom::modify_in) explicitly. [`any_open`]
//! reports whether any lock on this thread, standalone or not, is open.
//!
//! # Invariants
//!
//! 1. The depth returns to its value before `holding` on every exit path,
//!    including unwinding.
//! 2. An atom's pre-transaction value is recorded on its first touch only.
//! 3. Release happens exactly when the depth returns to zero, and leaves the
//!    touched set empty.
//!
//! # Failure Modes
//!
//! - **Action panics**: the depth is restored and the lock still releases
//!   while the panic unwinds, so observers see the buffered values. A panic
//!   raised by an observer during that release is caught and the remaining
//!   atoms still settle.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::mem;
use std::panic::{AssertUnwindSafe, catch_unwind};

use indexmap::IndexMap;

/// An atom registered with an open transaction.
pub(crate) trait Touched {
    /// Emit the final value if it differs from the pre-transaction one.
    /// Returns whether an emission happened.
    fn settle(&self) -> bool;
}

/// Depth counter and touched-atom queue for one batching context.
pub struct TransactionLock {
    depth: Cell<usize>,
    touched: RefCell<IndexMap<usize, Box<dyn Touched>>>,
}

impl Default for TransactionLock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TransactionLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionLock")
            .field("depth", &self.depth.get())
            .field("touched", &self.touched.borrow().len())
            .finish()
    }
}

impl TransactionLock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            depth: Cell::new(0),
            touched: RefCell::new(IndexMap::new()),
        }
    }

    /// Current nesting depth; zero when no transaction is open.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.depth.get() > 0
    }

    /// Number of distinct atoms written in the open transaction.
    #[must_use]
    pub fn touched_count(&self) -> usize {
        self.touched.borrow().len()
    }

    /// Run `action` inside a transaction and return its result.
    pub fn holding<R>(&self, action: impl FnOnce() -> R) -> R {
        let depth = self.depth.get() + 1;
        self.depth.set(depth);
        if depth == 1 {
            OPEN_LOCKS.with(|open| open.set(open.get() + 1));
            #[cfg(feature = "tracing")]
            tracing::trace!(message = "transaction.open");
        }
        let _release = ReleaseGuard { lock: self };
        action()
    }

    /// Register atom `id` unless it is already touched. `record` captures the
    /// pre-transaction state and only runs on first touch.
    pub(crate) fn touch(&self, id: usize, record: impl FnOnce() -> Box<dyn Touched>) {
        self.touched.borrow_mut().entry(id).or_insert_with(record);
    }

    /// Settle every touched atom and return how many emitted.
    fn release(&self, unwinding: bool) -> usize {
        // Observers may open new transactions while we settle.
        let touched = mem::take(&mut *self.touched.borrow_mut());
        let mut emitted = 0;
        for atom in touched.values() {
            let changed = if unwinding {
                // A second panic escaping a destructor aborts the process.
                catch_unwind(AssertUnwindSafe(|| atom.settle())).unwrap_or_else(|_| {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(message = "transaction.observer_panicked");
                    false
                })
            } else {
                atom.settle()
            };
            if changed {
                emitted += 1;
            }
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(
            message = "transaction.release",
            touched = touched.len(),
            emitted,
            unwinding
        );
        emitted
    }
}

struct ReleaseGuard<'a> {
    lock: &'a TransactionLock,
}

impl Drop for ReleaseGuard<'_> {
    fn drop(&mut self) {
        let depth = self.lock.depth.get().saturating_sub(1);
        self.lock.depth.set(depth);
        if depth > 0 {
            return;
        }
        OPEN_LOCKS.with(|open| open.set(open.get().saturating_sub(1)));
        self.lock.release(std::thread::panicking());
    }
}

thread_local! {
    static LOCK: TransactionLock = TransactionLock::new();
    static OPEN_LOCKS: Cell<usize> = const { Cell::new(0) };
}

/// Run `f` with this thread's lock.
pub fn with_lock<R>(f: impl FnOnce(&TransactionLock) -> R) -> R {
    LOCK.with(f)
}

/// Run `action` inside a transaction on this thread's lock.
///
/// Atom writes made by `action` (directly or through views and molecules) are
/// buffered and settle as at most one notification per atom when the
/// outermost `holding` returns.
pub fn holding<R>(action: impl FnOnce() -> R) -> R {
    with_lock(|lock| lock.holding(action))
}

#[must_use]
pub fn depth() -> usize {
    with_lock(TransactionLock::depth)
}

#[must_use]
pub fn is_open() -> bool {
    with_lock(TransactionLock::is_open)
}

/// Whether any lock on this thread has an open transaction.
#[must_use]
pub fn any_open() -> bool {
    OPEN_LOCKS.with(Cell::get) > 0
}
