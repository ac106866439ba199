//! Opaque object serialization behind the `/p` tag.
//!
//! A pickled value is the CBOR encoding of a [`ciborium::Value`] tree built
//! from the [`Value`]. Variants CBOR has no native form for are wrapped in
//! tags:
//!
//! | Value        | CBOR                                 |
//! |--------------|--------------------------------------|
//! | `BigInt`     | tag [`BIGINT_TAG`] around decimal text |
//! | `Tuple`      | tag [`TUPLE_TAG`] around an array    |
//! | `Set`        | tag 258 around an array              |
//! | `Object`     | tag [`OBJECT_TAG`] around its content |
//!
//! Tags not in this table are dropped on read and their content kept.
//!
//! Reading a pickle never runs code, but it does materialize arbitrary
//! object graphs, so it is only reached in [`TrustMode::Permissive`].
//!
//! [`TrustMode::Permissive`]: crate::TrustMode::Permissive

use crate::{Error, Result, Value};
use ciborium::value::{Integer, Value as Cbor};
use num_bigint::BigInt;

/// Mathematical finite set (IANA registered).
pub const SET_TAG: u64 = 258;
/// `"tupl"` in ASCII.
pub const TUPLE_TAG: u64 = 0x7475_706c;
/// `"objt"` in ASCII.
pub const OBJECT_TAG: u64 = 0x6f62_6a74;
/// `"bigi"` in ASCII.
pub const BIGINT_TAG: u64 = 0x6269_6769;

/// Serializes a value into pickle bytes.
pub(crate) fn pickle(value: &Value) -> Result<Vec<u8>> {
    let tree = to_cbor(value);
    let mut bytes = Vec::with_capacity(64);
    ciborium::into_writer(&tree, &mut bytes)
        .map_err(|e| Error::custom(format!("cannot pickle {}: {}", value.type_name(), e)))?;
    Ok(bytes)
}

/// Restores a value from pickle bytes.
///
/// # Errors
///
/// Every failure is reported as [`Error::UnsafeObject`].
pub(crate) fn unpickle(bytes: &[u8]) -> Result<Value> {
    let tree: Cbor = ciborium::from_reader(bytes).map_err(Error::unsafe_object)?;
    from_cbor(tree)
}

fn to_cbor(value: &Value) -> Cbor {
    match value {
        Value::None => Cbor::Null,
        Value::Bool(b) => Cbor::Bool(*b),
        Value::Int(i) => Cbor::Integer(Integer::from(*i)),
        Value::BigInt(bi) => Cbor::Tag(BIGINT_TAG, Box::new(Cbor::Text(bi.to_string()))),
        Value::Float(f) => Cbor::Float(*f),
        Value::Str(s) => Cbor::Text(s.clone()),
        Value::Bytes(b) => Cbor::Bytes(b.clone()),
        Value::List(items) => Cbor::Array(items.iter().map(to_cbor).collect()),
        Value::Tuple(items) => Cbor::Tag(
            TUPLE_TAG,
            Box::new(Cbor::Array(items.iter().map(to_cbor).collect())),
        ),
        Value::Set(items) => Cbor::Tag(
            SET_TAG,
            Box::new(Cbor::Array(items.iter().map(to_cbor).collect())),
        ),
        Value::Dict(entries) => Cbor::Map(
            entries
                .iter()
                .map(|(k, v)| (to_cbor(k), to_cbor(v)))
                .collect(),
        ),
        Value::Object(inner) => Cbor::Tag(OBJECT_TAG, Box::new(inner.clone())),
    }
}

fn from_cbor(tree: Cbor) -> Result<Value> {
    Ok(match tree {
        Cbor::Null => Value::None,
        Cbor::Bool(b) => Value::Bool(b),
        Cbor::Integer(i) => Value::from_bigint(BigInt::from(i128::from(i))),
        Cbor::Float(f) => Value::Float(f),
        Cbor::Text(s) => Value::Str(s),
        Cbor::Bytes(b) => Value::Bytes(b),
        Cbor::Array(items) => Value::List(from_array(items)?),
        Cbor::Map(entries) => Value::Dict(
            entries
                .into_iter()
                .map(|(k, v)| Ok((from_cbor(k)?, from_cbor(v)?)))
                .collect::<Result<_>>()?,
        ),
        Cbor::Tag(OBJECT_TAG, inner) => Value::Object(*inner),
        Cbor::Tag(TUPLE_TAG, inner) => Value::Tuple(expect_array(*inner, "tuple")?),
        Cbor::Tag(SET_TAG, inner) => Value::Set(expect_array(*inner, "set")?),
        Cbor::Tag(BIGINT_TAG, inner) => match *inner {
            Cbor::Text(digits) => digits
                .parse::<BigInt>()
                .map(Value::from_bigint)
                .map_err(|e| Error::unsafe_object(format!("bad integer {:?}: {}", digits, e)))?,
            other => {
                return Err(Error::unsafe_object(format!(
                    "integer tag around {}",
                    cbor_kind(&other)
                )))
            }
        },
        Cbor::Tag(_, inner) => from_cbor(*inner)?,
        other => {
            return Err(Error::unsafe_object(format!(
                "unsupported item: {}",
                cbor_kind(&other)
            )))
        }
    })
}

fn from_array(items: Vec<Cbor>) -> Result<Vec<Value>> {
    items.into_iter().map(from_cbor).collect()
}

fn expect_array(tree: Cbor, what: &str) -> Result<Vec<Value>> {
    match tree {
        Cbor::Array(items) => from_array(items),
        other => Err(Error::unsafe_object(format!(
            "{} tag around {}",
            what,
            cbor_kind(&other)
        ))),
    }
}

fn cbor_kind(tree: &Cbor) -> &'static str {
    match tree {
        Cbor::Null => "null",
        Cbor::Bool(_) => "bool",
        Cbor::Integer(_) => "integer",
        Cbor::Float(_) => "float",
        Cbor::Text(_) => "text",
        Cbor::Bytes(_) => "bytes",
        Cbor::Array(_) => "array",
        Cbor::Map(_) => "map",
        Cbor::Tag(..) => "tag",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: Value) -> Value {
        let bytes = pickle(&value).unwrap();
        unpickle(&bytes).unwrap()
    }

    #[test]
    fn test_preserves_container_kinds() {
        let value = Value::Dict(vec![
            (
                Value::Tuple(vec![Value::Int(1), Value::from("a")]),
                Value::Set(vec![Value::Int(2), Value::Int(3)]),
            ),
            (Value::from("list"), Value::List(vec![Value::None, Value::Bool(false)])),
        ]);
        assert_eq!(roundtrip(value.clone()), value);
    }

    #[test]
    fn test_big_integers() {
        let big: BigInt = "-123456789012345678901234567890123456789".parse().unwrap();
        let value = Value::from_bigint(big);
        assert_eq!(roundtrip(value.clone()), value);
        assert_eq!(roundtrip(Value::Int(i64::MIN)), Value::Int(i64::MIN));
    }

    #[test]
    fn test_non_finite_floats() {
        let value = roundtrip(Value::List(vec![Value::Float(f64::INFINITY), Value::Float(f64::NAN)]));
        let items = value.as_slice().unwrap();
        assert_eq!(items[0], Value::Float(f64::INFINITY));
        assert!(matches!(items[1], Value::Float(f) if f.is_nan()));
    }

    #[test]
    fn test_objects() {
        let object = Value::object(&("point", 1, 2)).unwrap();
        assert_eq!(roundtrip(object.clone()), object);
    }

    #[test]
    fn test_unknown_tag_unwraps() {
        let tree = Cbor::Tag(1, Box::new(Cbor::Integer(Integer::from(1_700_000_000))));
        let mut bytes = Vec::new();
        ciborium::into_writer(&tree, &mut bytes).unwrap();
        assert_eq!(unpickle(&bytes).unwrap(), Value::Int(1_700_000_000));
    }

    #[test]
    fn test_garbage_is_unsafe_object() {
        for bytes in [&b""[..], &[0xff, 0x00][..], &[0x9f][..]] {
            assert!(matches!(unpickle(bytes), Err(Error::UnsafeObject(_))));
        }
    }
}
