#![forbid(unsafe_code)]

//! Path lenses over [`Value`] trees.
//!
//! A [`Path`] is an ordered list of [`Segment`]s. Reading walks the tree and
//! yields `None` as soon as a step is missing or lands on the wrong kind of
//! container. Writing rebuilds only the containers along the path; every
//! sibling subtree is shared with the input, so unrelated parts of the tree
//! stay [`Identical`].
//!
//! # Write rules
//!
//! - A `Key` step on a non-object starts a fresh object.
//! - An `Index` step on a non-array starts a fresh array; indices past the end
//!   pad with `Null`. An index more than [`MAX_PADDING`] past the end leaves
//!   the input unchanged.
//! - Writing `None` removes the focused key or element. Removing something that
//!   is not there returns the input unchanged.
//! - Writing a value identical to the current focus returns the input unchanged.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use nucleon_core::{Identical, Value};

use crate::lens::{Lens, MAX_PADDING};

/// One step of a [`Path`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, ".{key}"),
            Self::Index(index) => write!(f, "[{index}]"),
        }
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_owned())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// A lens focusing a location inside a [`Value`] tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// The empty path, focusing the whole value.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(Segment::Key(key.into()));
        self
    }

    #[must_use]
    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(Segment::Index(index));
        self
    }

    /// Append every segment of `other`.
    #[must_use]
    pub fn join(mut self, other: &Path) -> Self {
        self.segments.extend(other.segments.iter().cloned());
        self
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.segments {
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl From<Segment> for Path {
    fn from(segment: Segment) -> Self {
        Self {
            segments: vec![segment],
        }
    }
}

impl From<&str> for Path {
    fn from(key: &str) -> Self {
        Segment::from(key).into()
    }
}

impl From<String> for Path {
    fn from(key: String) -> Self {
        Segment::from(key).into()
    }
}

impl From<usize> for Path {
    fn from(index: usize) -> Self {
        Segment::from(index).into()
    }
}

impl FromIterator<Segment> for Path {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl Lens<Value, Value> for Path {
    fn get(&self, whole: Option<&Value>) -> Option<Value> {
        let mut focus = whole?;
        for segment in &self.segments {
            focus = match (segment, focus) {
                (Segment::Key(key), Value::Object(entries)) => entries.get(key)?,
                (Segment::Index(index), Value::Array(items)) => items.get(*index)?,
                _ => return None,
            };
        }
        Some(focus.clone())
    }

    fn set(&self, part: Option<Value>, whole: Option<Value>) -> Option<Value> {
        set_at(&self.segments, part, whole)
    }
}

fn set_at(segments: &[Segment], part: Option<Value>, whole: Option<Value>) -> Option<Value> {
    let Some((segment, rest)) = segments.split_first() else {
        return part;
    };

    match segment {
        Segment::Key(key) => {
            let child = whole.as_ref().and_then(|w| w.get_key(key)).cloned();
            let next = set_at(rest, part, child.clone());
            if next.identical(&child) {
                return whole;
            }
            let mut entries = match whole {
                Some(Value::Object(entries)) => Rc::unwrap_or_clone(entries),
                _ => IndexMap::new(),
            };
            match next {
                Some(value) => {
                    entries.insert(key.clone(), value);
                }
                None => {
                    entries.shift_remove(key);
                }
            }
            Some(Value::Object(Rc::new(entries)))
        }
        Segment::Index(index) => {
            let index = *index;
            let child = whole.as_ref().and_then(|w| w.get_index(index)).cloned();
            let next = set_at(rest, part, child.clone());
            if next.identical(&child)
                || (next.is_some() && !within_padding(whole.as_ref(), index))
            {
                return whole;
            }
            let mut items = match whole {
                Some(Value::Array(items)) => Rc::unwrap_or_clone(items),
                _ => Vec::new(),
            };
            match next {
                Some(value) => {
                    if index >= items.len() {
                        items.resize(index + 1, Value::Null);
                    }
                    items[index] = value;
                }
                None => {
                    items.remove(index);
                }
            }
            Some(Value::Array(Rc::new(items)))
        }
    }
}

fn within_padding(whole: Option<&Value>, index: usize) -> bool {
    let len = whole.and_then(Value::as_array).map_or(0, <[Value]>::len);
    index.saturating_sub(len) <= MAX_PADDING
}
