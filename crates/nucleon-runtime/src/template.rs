#![forbid(unsafe_code)]

//! Molecule templates.
//!
//! A [`Template`] is a fixed tree of sequences and mappings whose leaves are
//! either mutables or static values. Three walks run over it:
//!
//! - **combine**: replace every mutable leaf by its current value. A container
//!   whose children are all identical to the previous combined value's
//!   children is returned as that previous container.
//! - **check**: verify that a proposed combined value keeps the template's
//!   shape, without writing anything.
//! - **write**: hand each mutable leaf its part of a checked value.
//!
//! # Shape rules
//!
//! - A sequence accepts only an array of the same length.
//! - A mapping accepts only an object whose keys all belong to the template.
//!   A key missing from the object removes the value of a mutable leaf.
//! - A static leaf accepts only a value of the same shape with identical
//!   scalars.
//! - A mutable leaf accepts anything.
//!
//! An unset mutable leaf is left out of a combined mapping and combines to
//! `Null` inside a sequence. Writing `Null` back to an unset sequence leaf
//! leaves it unset.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use nucleon_core::value::Map;
use nucleon_core::{Identical, Value};
use nucleon_lens::{Path, Segment};
use nucleon_stream::{Source, Subscription};

use crate::atom::Atom;
use crate::error::{Error, Result};
use crate::lensed::LensedAtom;
use crate::molecule::Molecule;
use crate::mutable::Mutable;

/// A mutable over [`Value`] with its static type erased.
pub trait DynMutable {
    /// Identity of the underlying cell.
    fn id(&self) -> usize;
    fn get_value(&self) -> Option<Value>;
    fn put_value(&self, value: Option<Value>) -> Result<()>;
    fn on_any_event(&self, handler: Rc<dyn Fn()>) -> Subscription;
}

impl<M: Mutable<Value = Value>> DynMutable for M {
    fn id(&self) -> usize {
        self.property().id()
    }

    fn get_value(&self) -> Option<Value> {
        self.get()
    }

    fn put_value(&self, value: Option<Value>) -> Result<()> {
        self.modify(move |_| value)
    }

    fn on_any_event(&self, handler: Rc<dyn Fn()>) -> Subscription {
        self.property().on_any(handler)
    }
}

impl Source for dyn DynMutable {
    fn on_any(&self, handler: Rc<dyn Fn()>) -> Subscription {
        self.on_any_event(handler)
    }
}

/// The fixed shape of a molecule.
#[derive(Clone)]
pub enum Template {
    Mutable(Rc<dyn DynMutable>),
    Static(Value),
    Sequence(Vec<Template>),
    Mapping(IndexMap<String, Template>),
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mutable(m) => write!(f, "Mutable(#{:x})", m.id()),
            Self::Static(v) => f.debug_tuple("Static").field(v).finish(),
            Self::Sequence(items) => f.debug_list().entries(items).finish(),
            Self::Mapping(entries) => f.debug_map().entries(entries).finish(),
        }
    }
}

impl Template {
    /// A mutable leaf.
    pub fn mutable(m: impl Mutable<Value = Value>) -> Self {
        Self::Mutable(Rc::new(m))
    }

    pub fn sequence<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Template>,
    {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }

    pub fn mapping<I, K, T>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<Template>,
    {
        Self::Mapping(
            entries
                .into_iter()
                .map(|(k, t)| (k.into(), t.into()))
                .collect(),
        )
    }

    /// Every distinct mutable leaf, in first-seen order.
    pub fn mutables(&self) -> Vec<Rc<dyn DynMutable>> {
        let mut found = Vec::new();
        self.collect_mutables(&mut found);
        found
    }

    fn collect_mutables(&self, found: &mut Vec<Rc<dyn DynMutable>>) {
        match self {
            Self::Mutable(m) => {
                if !found.iter().any(|seen| seen.id() == m.id()) {
                    found.push(Rc::clone(m));
                }
            }
            Self::Static(_) => {}
            Self::Sequence(items) => {
                for item in items {
                    item.collect_mutables(found);
                }
            }
            Self::Mapping(entries) => {
                for entry in entries.values() {
                    entry.collect_mutables(found);
                }
            }
        }
    }

    /// The combined value, sharing unchanged containers with `previous`.
    pub fn combine(&self, previous: Option<&Value>) -> Option<Value> {
        match self {
            Self::Mutable(m) => m.get_value(),
            Self::Static(value) => Some(value.clone()),
            Self::Sequence(items) => {
                let prev = previous.and_then(Value::as_array);
                let next: Vec<Value> = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        item.combine(prev.and_then(|p| p.get(i)))
                            .unwrap_or(Value::Null)
                    })
                    .collect();
                if let Some(prev) = prev
                    && prev.identical(next.as_slice())
                {
                    return previous.cloned();
                }
                Some(Value::Array(Rc::new(next)))
            }
            Self::Mapping(entries) => {
                let prev = previous.and_then(Value::as_object);
                let mut next = Map::with_capacity(entries.len());
                for (key, entry) in entries {
                    if let Some(value) = entry.combine(prev.and_then(|p| p.get(key))) {
                        next.insert(key.clone(), value);
                    }
                }
                if let Some(prev) = prev
                    && same_entries(prev, &next)
                {
                    return previous.cloned();
                }
                Some(Value::Object(Rc::new(next)))
            }
        }
    }

    /// Verify that `next` keeps this template's shape. `at` locates `self`
    /// inside the root template.
    pub fn check(&self, next: Option<&Value>, at: &Path) -> Result<()> {
        match self {
            Self::Mutable(_) => Ok(()),
            Self::Static(expected) => match next {
                Some(found) if expected.same_shape(found) => Ok(()),
                Some(found) => Err(Error::template_shape(
                    at,
                    format!("static {} cannot become {found}", expected.kind()),
                )),
                None => Err(Error::template_shape(at, "static value cannot be removed")),
            },
            Self::Sequence(items) => {
                let Some(Value::Array(found)) = next else {
                    return Err(Error::template_shape(
                        at,
                        format!("expected array, found {}", describe(next)),
                    ));
                };
                if found.len() != items.len() {
                    return Err(Error::template_shape(
                        at,
                        format!("expected {} elements, found {}", items.len(), found.len()),
                    ));
                }
                items
                    .iter()
                    .zip(found.iter())
                    .enumerate()
                    .try_for_each(|(i, (item, value))| item.check(Some(value), &at.clone().index(i)))
            }
            Self::Mapping(entries) => {
                let Some(Value::Object(found)) = next else {
                    return Err(Error::template_shape(
                        at,
                        format!("expected object, found {}", describe(next)),
                    ));
                };
                if let Some(extra) = found.keys().find(|key| !entries.contains_key(*key)) {
                    return Err(Error::template_shape(
                        &at.clone().key(extra.as_str()),
                        "key is not part of the template",
                    ));
                }
                entries
                    .iter()
                    .try_for_each(|(key, entry)| entry.check(found.get(key), &at.clone().key(key.as_str())))
            }
        }
    }

    /// Write each mutable leaf's part of `next`. Static parts are skipped.
    pub fn write(&self, next: Option<&Value>) -> Result<()> {
        match self {
            Self::Mutable(m) => m.put_value(next.cloned()),
            Self::Static(_) => Ok(()),
            Self::Sequence(items) => items.iter().enumerate().try_for_each(|(i, item)| {
                let part = next.and_then(|n| n.get_index(i));
                match (item, part) {
                    (Self::Mutable(m), Some(Value::Null)) if m.get_value().is_none() => Ok(()),
                    _ => item.write(part),
                }
            }),
            Self::Mapping(entries) => entries
                .iter()
                .try_for_each(|(key, entry)| entry.write(next.and_then(|n| n.get_key(key)))),
        }
    }

    /// The sub-template at `path`, if the path stays inside the template.
    pub fn at(&self, path: &Path) -> Option<&Template> {
        path.segments()
            .iter()
            .try_fold(self, |node, segment| match (node, segment) {
                (Self::Sequence(items), Segment::Index(i)) => items.get(*i),
                (Self::Mapping(entries), Segment::Key(k)) => entries.get(k),
                _ => None,
            })
    }
}

fn same_entries(prev: &Map, next: &Map) -> bool {
    prev.len() == next.len()
        && next
            .iter()
            .all(|(key, value)| prev.get(key).is_some_and(|p| p.identical(value)))
}

fn describe(value: Option<&Value>) -> String {
    value.map_or_else(|| "nothing".to_owned(), |v| v.kind().to_string())
}

impl From<Value> for Template {
    fn from(value: Value) -> Self {
        Self::Static(value)
    }
}

impl From<Vec<Template>> for Template {
    fn from(items: Vec<Template>) -> Self {
        Self::Sequence(items)
    }
}

impl From<IndexMap<String, Template>> for Template {
    fn from(entries: IndexMap<String, Template>) -> Self {
        Self::Mapping(entries)
    }
}

impl From<Atom<Value>> for Template {
    fn from(atom: Atom<Value>) -> Self {
        Self::mutable(atom)
    }
}

impl From<&Atom<Value>> for Template {
    fn from(atom: &Atom<Value>) -> Self {
        Self::mutable(atom.clone())
    }
}

impl From<Molecule> for Template {
    fn from(molecule: Molecule) -> Self {
        Self::mutable(molecule)
    }
}

impl From<&Molecule> for Template {
    fn from(molecule: &Molecule) -> Self {
        Self::mutable(molecule.clone())
    }
}

impl<P, L> From<LensedAtom<P, L, Value>> for Template
where
    P: Mutable,
    L: nucleon_lens::Lens<P::Value, Value> + 'static,
{
    fn from(view: LensedAtom<P, L, Value>) -> Self {
        Self::mutable(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(value: i32) -> Atom<Value> {
        Atom::new(Value::from(value))
    }

    #[test]
    fn mutables_are_deduplicated_in_first_seen_order() {
        let a = leaf(1);
        let b = leaf(2);
        let t = Template::mapping([
            ("x", Template::from(&b)),
            ("y", Template::sequence([Template::from(&a), Template::from(&b)])),
            ("z", Template::from(Value::from("static"))),
        ]);
        let ids: Vec<usize> = t.mutables().iter().map(|m| m.id()).collect();
        assert_eq!(ids, vec![b.id(), a.id()]);
    }

    #[test]
    fn combine_substitutes_leaf_values() {
        let a = leaf(1);
        let t = Template::mapping([
            ("a", Template::from(&a)),
            ("s", Template::from(Value::from(true))),
            ("list", Template::sequence([Template::from(&a)])),
        ]);
        assert_eq!(
            t.combine(None),
            Some(Value::object([
                ("a", Value::from(1)),
                ("s", Value::from(true)),
                ("list", Value::array([1])),
            ]))
        );
    }

    #[test]
    fn unset_leaves_are_omitted_or_null() {
        let unset: Atom<Value> = Atom::empty();
        let t = Template::mapping([
            ("gone", Template::from(&unset)),
            ("list", Template::sequence([Template::from(&unset)])),
        ]);
        assert_eq!(
            t.combine(None),
            Some(Value::object([("list", Value::array([Value::Null]))]))
        );
    }

    #[test]
    fn combine_shares_unchanged_containers() {
        let a = leaf(1);
        let b = leaf(2);
        let t = Template::mapping([
            ("left", Template::mapping([("a", Template::from(&a))])),
            ("right", Template::sequence([Template::from(&b)])),
        ]);
        let first = t.combine(None).expect("combined");
        let same = t.combine(Some(&first)).expect("combined");
        assert!(same.identical(&first));

        b.set(Value::from(3));
        let second = t.combine(Some(&first)).expect("combined");
        assert!(!second.identical(&first));
        let left = |v: &Value| v.get_key("left").cloned().expect("left");
        assert!(left(&second).identical(&left(&first)));
        assert_eq!(second.get_key("right"), Some(&Value::array([3])));
    }

    #[test]
    fn check_rejects_kind_length_and_key_changes() {
        let a = leaf(1);
        let t = Template::mapping([
            ("list", Template::sequence([Template::from(&a), Template::from(Value::from(0))])),
        ]);
        let root = Path::new();

        let wrong_kind = Value::object([("list", Value::object([("0", 1)]))]);
        let err = t.check(Some(&wrong_kind), &root).expect_err("kind");
        assert!(matches!(err, Error::TemplateShape { ref path, .. } if path.to_string() == "$.list"));

        let wrong_len = Value::object([("list", Value::array([1]))]);
        assert!(t.check(Some(&wrong_len), &root).is_err());

        let extra = Value::object([("list", Value::array([1, 0])), ("more", Value::Null)]);
        let err = t.check(Some(&extra), &root).expect_err("extra");
        assert!(matches!(err, Error::TemplateShape { ref path, .. } if path.to_string() == "$.more"));

        let static_changed = Value::object([("list", Value::array([5, 1]))]);
        let err = t.check(Some(&static_changed), &root).expect_err("static");
        assert!(matches!(err, Error::TemplateShape { ref path, .. } if path.to_string() == "$.list[1]"));

        let fine = Value::object([("list", Value::array([Value::from("any"), Value::from(0)]))]);
        assert!(t.check(Some(&fine), &root).is_ok());
        assert!(t.check(None, &root).is_err());
    }

    #[test]
    fn missing_key_removes_mutable_but_not_static() {
        let a = leaf(1);
        let t = Template::mapping([
            ("a", Template::from(&a)),
            ("s", Template::from(Value::from(1))),
        ]);
        let root = Path::new();
        assert!(t.check(Some(&Value::object([("s", 1)])), &root).is_ok());
        assert!(t.check(Some(&Value::object([("a", 1)])), &root).is_err());

        t.write(Some(&Value::object([("s", 1)]))).expect("write");
        assert_eq!(a.get(), None);
    }

    #[test]
    fn at_follows_template_structure() {
        let a = leaf(1);
        let t = Template::mapping([("xs", Template::sequence([Template::from(&a)]))]);
        assert!(matches!(t.at(&Path::new().key("xs").index(0)), Some(Template::Mutable(_))));
        assert!(t.at(&Path::new().key("xs").key("nope")).is_none());
        assert!(matches!(t.at(&Path::new()), Some(Template::Mapping(_))));
    }
}
