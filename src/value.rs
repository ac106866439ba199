//! Dynamic value representation for configuration entries.
//!
//! [`Value`] is the closed set of types a configuration value may take:
//! strings, integers, floats, booleans, `None`, bytes, and the literal
//! containers (list, tuple, set, dict) built from them. A last variant,
//! [`Value::Object`], holds an opaque structured object that can only be
//! stored through the pickle escape hatch.
//!
//! ## Creating Values
//!
//! ```rust
//! use plain_config::{conf, Value};
//!
//! let port = Value::from(8080);
//! let name = Value::from("example.com");
//! let key = Value::from(vec![0u8, 1, 2]);
//! let list = conf!(["a", 1, None]);
//!
//! assert!(port.is_int());
//! assert!(name.is_str());
//! assert!(key.is_bytes());
//! assert_eq!(list.to_string(), "['a', 1, None]");
//! ```
//!
//! ## Opaque Objects
//!
//! Any serde type can be wrapped as an opaque object. Such a value is written
//! with the `/64p` tag chain, which requires [`TrustMode::Permissive`].
//!
//! ```rust
//! use plain_config::Value;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Point { x: i32, y: i32 }
//!
//! let value = Value::object(&Point { x: 1, y: 2 }).unwrap();
//! assert!(value.is_object());
//! assert!(!value.is_literal_safe());
//! assert_eq!(value.to_object::<Point>().unwrap(), Point { x: 1, y: 2 });
//! ```
//!
//! [`TrustMode::Permissive`]: crate::TrustMode::Permissive

use crate::literal::{self, MAX_LITERAL_DEPTH};
use crate::{Error, Result};
use num_bigint::BigInt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A dynamically-typed configuration value.
///
/// Containers keep their elements in order: `Set` and `Dict` compare
/// element by element, so two sets holding the same members in a different
/// order are not equal. Values read back from a file keep the order in
/// which they were written.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    /// Integer outside the `i64` range. Use [`Value::from_bigint`] to build one.
    BigInt(BigInt),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Set(Vec<Value>),
    Dict(Vec<(Value, Value)>),
    /// Opaque structured object, only representable by pickling.
    Object(ciborium::Value),
}

impl Value {
    /// Builds an integer value, keeping `BigInt` for values outside `i64`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use num_bigint::BigInt;
    /// use plain_config::Value;
    ///
    /// assert_eq!(Value::from_bigint(BigInt::from(7)), Value::Int(7));
    /// assert!(matches!(Value::from_bigint(BigInt::from(u64::MAX)), Value::BigInt(_)));
    /// ```
    #[must_use]
    pub fn from_bigint(value: BigInt) -> Self {
        match i64::try_from(&value) {
            Ok(small) => Value::Int(small),
            Err(_) => Value::BigInt(value),
        }
    }

    /// Wraps any serde value as an opaque object.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` fails to serialize.
    pub fn object<T>(value: &T) -> Result<Self>
    where
        T: ?Sized + Serialize,
    {
        ciborium::Value::serialized(value)
            .map(Value::Object)
            .map_err(|e| Error::custom(format!("cannot capture object: {}", e)))
    }

    /// Extracts a typed value out of an opaque object.
    ///
    /// # Errors
    ///
    /// Returns an error if this is not an object or its content does not
    /// deserialize into `T`.
    pub fn to_object<T>(&self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        match self {
            Value::Object(inner) => inner
                .deserialized()
                .map_err(|e| Error::custom(format!("cannot restore object: {}", e))),
            other => Err(Error::custom(format!(
                "expected object, found {}",
                other.type_name()
            ))),
        }
    }

    /// Short name of the variant, used in diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) | Value::BigInt(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Set(_) => "set",
            Value::Dict(_) => "dict",
            Value::Object(_) => "object",
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Returns `true` for both `Int` and `BigInt`.
    #[inline]
    #[must_use]
    pub const fn is_int(&self) -> bool {
        matches!(self, Value::Int(_) | Value::BigInt(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_bytes(&self) -> bool {
        matches!(self, Value::Bytes(_))
    }

    /// Returns `true` for lists, tuples, sets and dicts.
    #[inline]
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(
            self,
            Value::List(_) | Value::Tuple(_) | Value::Set(_) | Value::Dict(_)
        )
    }

    #[inline]
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// If the value is an integer that fits in `i64`, returns it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use plain_config::Value;
    ///
    /// assert_eq!(Value::from(42).as_i64(), Some(42));
    /// assert_eq!(Value::from(42.0).as_i64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// If the value is a float or an integer, returns it as `f64`.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the elements of a list, tuple or set.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Tuple(items) | Value::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries of a dict, in order.
    #[inline]
    #[must_use]
    pub fn as_dict(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Dict(entries) => Some(entries),
            _ => None,
        }
    }

    /// Looks up a string key in a dict.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_dict()?
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }

    /// Returns `true` if the value can be written with the literal tag and
    /// read back unchanged.
    ///
    /// That excludes opaque objects, non-finite floats inside containers,
    /// unhashable dict keys or set members, duplicate keys or members, and
    /// nesting deeper than the literal parser accepts.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use plain_config::{conf, Value};
    ///
    /// assert!(conf!({"a": [1, 2.5, "x"]}).is_literal_safe());
    /// assert!(!Value::List(vec![Value::Float(f64::NAN)]).is_literal_safe());
    /// ```
    #[must_use]
    pub fn is_literal_safe(&self) -> bool {
        self.literal_safe_at(0)
    }

    fn literal_safe_at(&self, depth: usize) -> bool {
        if depth > MAX_LITERAL_DEPTH {
            return false;
        }
        match self {
            Value::None
            | Value::Bool(_)
            | Value::Int(_)
            | Value::BigInt(_)
            | Value::Str(_)
            | Value::Bytes(_) => true,
            // The top level uses the float tag, which spells inf and nan.
            Value::Float(f) => depth == 0 || f.is_finite(),
            Value::List(items) | Value::Tuple(items) => {
                items.iter().all(|v| v.literal_safe_at(depth + 1))
            }
            Value::Set(items) => {
                items
                    .iter()
                    .all(|v| v.is_hashable() && v.literal_safe_at(depth + 1))
                    && !has_duplicates(items.iter())
            }
            Value::Dict(entries) => {
                entries.iter().all(|(k, v)| {
                    k.is_hashable() && k.literal_safe_at(depth + 1) && v.literal_safe_at(depth + 1)
                }) && !has_duplicates(entries.iter().map(|(k, _)| k))
            }
            Value::Object(_) => false,
        }
    }

    /// Whether the value may be a dict key or a set member.
    pub(crate) fn is_hashable(&self) -> bool {
        match self {
            Value::List(_) | Value::Set(_) | Value::Dict(_) | Value::Object(_) => false,
            Value::Tuple(items) => items.iter().all(Value::is_hashable),
            _ => true,
        }
    }
}

fn has_duplicates<'a, I>(items: I) -> bool
where
    I: Iterator<Item = &'a Value>,
{
    let mut seen: Vec<&Value> = Vec::new();
    for item in items {
        if seen.contains(&item) {
            return true;
        }
        seen.push(item);
    }
    false
}

impl fmt::Display for Value {
    /// Literal spelling of the value, or `<object>` for opaque objects.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match literal::to_literal(self) {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "<{}>", self.type_name()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::{SerializeMap, SerializeSeq, SerializeTuple};

        match self {
            Value::None => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::BigInt(bi) => match i128::try_from(bi) {
                Ok(wide) => serializer.serialize_i128(wide),
                Err(_) => serializer.serialize_str(&bi.to_string()),
            },
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Bytes(b) => serializer.serialize_bytes(b),
            Value::List(items) | Value::Set(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Tuple(items) => {
                let mut tuple = serializer.serialize_tuple(items.len())?;
                for item in items {
                    tuple.serialize_element(item)?;
                }
                tuple.end()
            }
            Value::Dict(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Object(inner) => inner.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any configuration value")
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Value, E> {
                Ok(Value::Int(value))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Value, E> {
                Ok(Value::from_bigint(BigInt::from(value)))
            }

            fn visit_i128<E>(self, value: i128) -> std::result::Result<Value, E> {
                Ok(Value::from_bigint(BigInt::from(value)))
            }

            fn visit_u128<E>(self, value: u128) -> std::result::Result<Value, E> {
                Ok(Value::from_bigint(BigInt::from(value)))
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Value, E> {
                Ok(Value::Float(value))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Value, E> {
                Ok(Value::Str(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Value, E> {
                Ok(Value::Str(value))
            }

            fn visit_bytes<E>(self, value: &[u8]) -> std::result::Result<Value, E> {
                Ok(Value::Bytes(value.to_vec()))
            }

            fn visit_byte_buf<E>(self, value: Vec<u8>) -> std::result::Result<Value, E> {
                Ok(Value::Bytes(value))
            }

            fn visit_unit<E>(self) -> std::result::Result<Value, E> {
                Ok(Value::None)
            }

            fn visit_none<E>(self) -> std::result::Result<Value, E> {
                Ok(Value::None)
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(Value::List(vec))
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some((key, value)) = map.next_entry()? {
                    entries.push((key, value));
                }
                Ok(Value::Dict(entries))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i8> for Value {
    fn from(value: i8) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::from_bigint(BigInt::from(value))
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::from_bigint(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::None, Into::into)
    }
}

impl TryFrom<Value> for i64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Int(i) => Ok(i),
            other => Err(Error::custom(format!(
                "expected integer, found {}",
                other.type_name()
            ))),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Int(i) => Ok(i as f64),
            other => Err(Error::custom(format!(
                "expected float, found {}",
                other.type_name()
            ))),
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(Error::custom(format!(
                "expected bool, found {}",
                other.type_name()
            ))),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(Error::custom(format!(
                "expected str, found {}",
                other.type_name()
            ))),
        }
    }
}

impl TryFrom<Value> for Vec<u8> {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Bytes(b) => Ok(b),
            other => Err(Error::custom(format!(
                "expected bytes, found {}",
                other.type_name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_primitives() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(42i32), Value::Int(42));
        assert_eq!(Value::from(3.5f64), Value::Float(3.5));
        assert_eq!(Value::from("x"), Value::Str("x".to_string()));
        assert_eq!(Value::from(vec![1u8, 2]), Value::Bytes(vec![1, 2]));
        assert_eq!(Value::from(None::<i32>), Value::None);
        assert_eq!(Value::from(Some(5)), Value::Int(5));
    }

    #[test]
    fn test_u64_normalizes() {
        assert_eq!(Value::from(5u64), Value::Int(5));
        assert!(matches!(Value::from(u64::MAX), Value::BigInt(_)));
    }

    #[test]
    fn test_tryfrom() {
        assert_eq!(i64::try_from(Value::Int(3)).unwrap(), 3);
        assert_eq!(f64::try_from(Value::Int(3)).unwrap(), 3.0);
        assert!(bool::try_from(Value::Int(1)).is_err());
        assert_eq!(String::try_from(Value::from("a")).unwrap(), "a");
        assert!(Vec::<u8>::try_from(Value::from("a")).is_err());
    }

    #[test]
    fn test_literal_safety() {
        assert!(Value::Float(f64::INFINITY).is_literal_safe());
        assert!(!Value::Tuple(vec![Value::Float(f64::INFINITY)]).is_literal_safe());
        assert!(!Value::Set(vec![Value::List(vec![])]).is_literal_safe());
        assert!(!Value::Set(vec![Value::Int(1), Value::Int(1)]).is_literal_safe());
        assert!(!Value::Dict(vec![(Value::List(vec![]), Value::None)]).is_literal_safe());
        assert!(Value::Dict(vec![(
            Value::Tuple(vec![Value::Int(1), Value::from("a")]),
            Value::None
        )])
        .is_literal_safe());
    }

    #[test]
    fn test_depth_bound() {
        let mut value = Value::Int(1);
        for _ in 0..=MAX_LITERAL_DEPTH {
            value = Value::List(vec![value]);
        }
        assert!(!value.is_literal_safe());
    }

    #[test]
    fn test_dict_get() {
        let dict = Value::Dict(vec![(Value::from("k"), Value::from(1))]);
        assert_eq!(dict.get("k"), Some(&Value::Int(1)));
        assert_eq!(dict.get("missing"), None);
    }

    #[test]
    fn test_object_roundtrip() {
        let value = Value::object(&vec![("a", 1)]).unwrap();
        let back: Vec<(String, i32)> = value.to_object().unwrap();
        assert_eq!(back, vec![("a".to_string(), 1)]);
        assert!(Value::Int(1).to_object::<i32>().is_err());
    }

    #[test]
    fn test_display_uses_literal_syntax() {
        let value = Value::List(vec![Value::from("a"), Value::Int(1), Value::None]);
        assert_eq!(value.to_string(), "['a', 1, None]");
    }
}
