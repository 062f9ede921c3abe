#![forbid(unsafe_code)]

//! Dynamic value tree with shared containers.
//!
//! [`Value`] is the combined value of a molecule and the structure that path
//! lenses navigate. Arrays and objects live behind `Rc`, so an unchanged
//! subtree can be handed from one combined value to the next without copying,
//! and [`Identical`] can tell "same subtree" from "equal subtree" in O(1).
//!
//! # Identity vs equality
//!
//! - `PartialEq` is deep structural equality (`NaN != NaN`).
//! - [`Identical`] is reference identity for containers and value identity for
//!   scalars. This is what change detection uses.
//! - [`Value::same_shape`] is the structural walk used to compare static parts
//!   of a molecule template: containers by kind, length and key set, scalars by
//!   identity.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::identity::Identical;

/// Ordered object storage; keys keep insertion order.
pub type Map = IndexMap<String, Value>;

/// A dynamically shaped value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Array(Rc<Vec<Value>>),
    Object(Rc<Map>),
}

/// The variant of a [`Value`], without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        })
    }
}

impl Value {
    /// Build an array from anything convertible into values.
    pub fn array<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self::Array(Rc::new(items.into_iter().map(Into::into).collect()))
    }

    /// Build an object from key/value pairs, keeping their order.
    pub fn object<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Object(Rc::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Number(_) => ValueKind::Number,
            Self::String(_) => ValueKind::String,
            Self::Array(_) => ValueKind::Array,
            Self::Object(_) => ValueKind::Object,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Self::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up `key` if this is an object.
    #[must_use]
    pub fn get_key(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|entries| entries.get(key))
    }

    /// Look up `index` if this is an array.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.as_array().and_then(|items| items.get(index))
    }

    /// Structural comparison with identical scalars at the leaves.
    ///
    /// Arrays must have the same length and objects the same key set; key
    /// order is ignored.
    #[must_use]
    pub fn same_shape(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Array(a), Self::Array(b)) => {
                Rc::ptr_eq(a, b)
                    || (a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.same_shape(y)))
            }
            (Self::Object(a), Self::Object(b)) => {
                Rc::ptr_eq(a, b)
                    || (a.len() == b.len()
                        && a.iter()
                            .all(|(k, x)| b.get(k).is_some_and(|y| x.same_shape(y))))
            }
            _ => self.identical(other),
        }
    }
}

impl Identical for Value {
    fn identical(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a.identical(b),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => Rc::ptr_eq(a, b),
            (Self::Object(a), Self::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Object(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{k:?}:{v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

macro_rules! impl_from_number {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Self::Number(n as f64)
                }
            }
        )*
    };
}

impl_from_number!(f64, f32, i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(Rc::from(s))
    }
}

impl From<Rc<str>> for Value {
    fn from(s: Rc<str>) -> Self {
        Self::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(Rc::new(items))
    }
}

impl From<Map> for Value {
    fn from(entries: Map) -> Self {
        Self::Object(Rc::new(entries))
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Null
    }
}

// ---------------------------------------------------------------------------
// Serde
// ---------------------------------------------------------------------------

#[cfg(feature = "serde")]
mod serde_impl {
    use std::fmt;
    use std::rc::Rc;

    use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
    use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

    use super::{Map, Value};

    impl Serialize for Value {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Value::Null => serializer.serialize_unit(),
                Value::Bool(b) => serializer.serialize_bool(*b),
                Value::Number(n) => serializer.serialize_f64(*n),
                Value::String(s) => serializer.serialize_str(s),
                Value::Array(items) => {
                    let mut seq = serializer.serialize_seq(Some(items.len()))?;
                    for item in items.iter() {
                        seq.serialize_element(item)?;
                    }
                    seq.end()
                }
                Value::Object(entries) => {
                    let mut map = serializer.serialize_map(Some(entries.len()))?;
                    for (k, v) in entries.iter() {
                        map.serialize_entry(k, v)?;
                    }
                    map.end()
                }
            }
        }
    }

    struct ValueVisitor;

    impl<'de> Visitor<'de> for ValueVisitor {
        type Value = Value;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a JSON-compatible value")
        }

        fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
            Ok(Value::Null)
        }

        fn visit_none<E: de::Error>(self) -> Result<Value, E> {
            Ok(Value::Null)
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
            Deserialize::deserialize(deserializer)
        }

        fn visit_bool<E: de::Error>(self, b: bool) -> Result<Value, E> {
            Ok(Value::Bool(b))
        }

        fn visit_i64<E: de::Error>(self, n: i64) -> Result<Value, E> {
            Ok(Value::Number(n as f64))
        }

        fn visit_u64<E: de::Error>(self, n: u64) -> Result<Value, E> {
            Ok(Value::Number(n as f64))
        }

        fn visit_f64<E: de::Error>(self, n: f64) -> Result<Value, E> {
            Ok(Value::Number(n))
        }

        fn visit_str<E: de::Error>(self, s: &str) -> Result<Value, E> {
            Ok(Value::String(Rc::from(s)))
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
            let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(item) = seq.next_element()? {
                items.push(item);
            }
            Ok(Value::Array(Rc::new(items)))
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
            let mut entries = Map::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((k, v)) = access.next_entry::<String, Value>()? {
                entries.insert(k, v);
            }
            Ok(Value::Object(Rc::new(entries)))
        }
    }

    impl<'de> Deserialize<'de> for Value {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_any(ValueVisitor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containers_are_identical_only_when_shared() {
        let a = Value::array([1, 2, 3]);
        let b = Value::array([1, 2, 3]);
        assert!(a.identical(&a.clone()));
        assert!(!a.identical(&b));
        assert_eq!(a, b);
    }

    #[test]
    fn scalars_use_value_identity() {
        assert!(Value::from(f64::NAN).identical(&Value::from(f64::NAN)));
        assert!(!Value::from(0.0).identical(&Value::from(-0.0)));
        assert!(Value::from("x").identical(&Value::from(String::from("x"))));
        assert!(!Value::from(1).identical(&Value::from(true)));
    }

    #[test]
    fn same_shape_walks_containers() {
        let a = Value::object([("x", Value::array([1, 2])), ("y", Value::from("s"))]);
        let b = Value::object([("y", Value::from("s")), ("x", Value::array([1, 2]))]);
        assert!(a.same_shape(&b));

        let c = Value::object([("x", Value::array([1, 3])), ("y", Value::from("s"))]);
        assert!(!a.same_shape(&c));

        let d = Value::object([("x", Value::array([1, 2]))]);
        assert!(!a.same_shape(&d));
    }

    #[test]
    fn same_shape_distinguishes_container_kinds() {
        let arr = Value::array([1, 2]);
        let obj = Value::object([("0", 1), ("1", 2)]);
        assert!(!arr.same_shape(&obj));
    }

    #[test]
    fn accessors() {
        let v = Value::object([("items", Value::array(["a", "b"]))]);
        assert_eq!(
            v.get_key("items").and_then(|i| i.get_index(1)).and_then(Value::as_str),
            Some("b")
        );
        assert_eq!(v.get_key("missing"), None);
        assert_eq!(v.kind(), ValueKind::Object);
        assert!(Value::default().is_null());
    }

    #[test]
    fn display_is_json_like() {
        let v = Value::object([("a", Value::array([Value::from(1), Value::Null]))]);
        assert_eq!(v.to_string(), r#"{"a":[1,null]}"#);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trip_preserves_key_order() {
        let v = Value::object([("z", Value::from(1)), ("a", Value::array([true, false]))]);
        let json = serde_json::to_string(&v).expect("serialize");
        assert_eq!(json, r#"{"z":1.0,"a":[true,false]}"#);
        let back: Value = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, v);
    }
}
