#![forbid(unsafe_code)]

//! Molecules: one mutable over a template of many.
//!
//! A [`Molecule`] observes every mutable in its [`Template`] through a
//! combined source. Its value is the template with each mutable leaf replaced
//! by that leaf's value. Writing a molecule checks the new value against the
//! template first, then writes every leaf inside a single transaction, so
//! observers of the leaves (and of the molecule) see one settled change.
//!
//! # Failure Modes
//!
//! - **Shape change**: a value that changes a static part or a container of
//!   the template is rejected with [`Error::TemplateShape`] before any leaf is
//!   written.
//! - **Nested failure**: a nested molecule rejecting its part stops the write.
//!   Leaves written before it keep their new values.

use std::fmt;
use std::rc::Rc;

use nucleon_core::Value;
use nucleon_lens::Path;
use nucleon_stream::{Combined, Property, Source, Subscription, combine};

use crate::error::{Error, Result};
use crate::mutable::{Gettable, Observable, Settable};
use crate::template::{DynMutable, Template};
use crate::transaction;
use crate::with_source::{Derivation, MutableWithSource};

/// Derives a molecule's value from its template.
pub struct Combination {
    template: Template,
    source: Combined<dyn DynMutable>,
}

impl Derivation for Combination {
    type Value = Value;

    fn source(&self) -> &dyn Source {
        &self.source
    }

    fn derive(&self, previous: Option<&Value>) -> Option<Value> {
        self.template.combine(previous)
    }
}

/// A mutable whose value combines the mutables of a template.
///
/// Cloning a `Molecule` creates a new handle to the **same** molecule.
#[derive(Clone)]
pub struct Molecule {
    cell: MutableWithSource<Combination>,
}

impl fmt::Debug for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Molecule")
            .field("template", self.template())
            .field("active", &self.is_active())
            .finish()
    }
}

impl Molecule {
    pub fn new(template: impl Into<Template>) -> Self {
        let template = template.into();
        let source = combine(template.mutables());
        Self {
            cell: MutableWithSource::new(Combination { template, source }),
        }
    }

    pub fn template(&self) -> &Template {
        &self.cell.derivation().template
    }

    /// The distinct mutables of the template, in first-seen order.
    pub fn mutables(&self) -> impl Iterator<Item = &Rc<dyn DynMutable>> {
        self.cell.derivation().source.sources()
    }

    /// Check `next` against the template without writing.
    pub fn check(&self, next: Option<&Value>) -> Result<()> {
        self.template().check(next, &Path::new())
    }
}

impl Gettable for Molecule {
    type Value = Value;

    fn get(&self) -> Option<Value> {
        self.cell.get()
    }
}

impl Settable for Molecule {
    fn modify<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(Option<Value>) -> Option<Value>,
    {
        let next = f(self.get());
        if let Err(err) = self.check(next.as_ref()) {
            log_mismatch(&err);
            return Err(err);
        }
        transaction::holding(|| self.template().write(next.as_ref()))
    }
}

impl Observable for Molecule {
    fn property(&self) -> &Property<Option<Value>> {
        self.cell.property()
    }
}

impl Source for Molecule {
    fn on_any(&self, handler: Rc<dyn Fn()>) -> Subscription {
        self.cell.property().on_any(handler)
    }
}

#[cfg(feature = "tracing")]
fn log_mismatch(err: &Error) {
    if let Error::TemplateShape { path, reason } = err {
        tracing::debug!(
            message = "molecule.template_mismatch",
            path = %path,
            reason = reason.as_str()
        );
    }
}

#[cfg(not(feature = "tracing"))]
fn log_mismatch(_err: &Error) {}
