//! Dynamic value representation for BTOON data.
//!
//! This module provides the [`Value`] enum, the closed universe of everything
//! the wire format can carry: MessagePack's primitives and containers plus
//! BTOON's domain types (timestamps at three resolutions, big integers, and
//! packed float vectors).
//!
//! ## Integer normalization
//!
//! The wire distinguishes signed from unsigned integers, and so does `Value`:
//! `Int` and `Uint` are distinct variants even when numerically equal. The
//! `From` constructors normalize for you — a non-negative signed integer
//! becomes `Uint`, which is what the encoder would emit anyway:
//!
//! ```rust
//! use btoon::Value;
//!
//! assert_eq!(Value::from(5i64), Value::Uint(5));
//! assert_eq!(Value::from(-5i64), Value::Int(-5));
//! ```
//!
//! ## Examples
//!
//! ```rust
//! use btoon::{btoon, Value};
//!
//! let record = btoon!({
//!     "name": "Alice",
//!     "age": 30,
//!     "scores": [95, 87]
//! });
//!
//! assert_eq!(record.as_map().unwrap().get("name").and_then(Value::as_str), Some("Alice"));
//! ```

use crate::BtoonMap;
use chrono::{DateTime as ChronoDateTime, Utc};
use num_bigint::BigInt;
use serde::de::{self, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A dynamically-typed representation of any value the BTOON wire can carry.
///
/// Values are immutable to the codec: encoding never mutates its input, and
/// decoded values own their storage outright — nothing aliases the source
/// buffer.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    /// 64-bit signed integer; the encoder uses the signed ladder only for
    /// negative values.
    Int(i64),
    /// 64-bit unsigned integer; preferred for every non-negative value.
    Uint(u64),
    Float(f64),
    String(String),
    Binary(Vec<u8>),
    Array(Vec<Value>),
    Map(BtoonMap),
    /// Seconds since the Unix epoch.
    Timestamp(i64),
    /// Milliseconds since the Unix epoch.
    Date(i64),
    /// Nanoseconds since the Unix epoch.
    DateTime(i64),
    /// Big-endian two's-complement magnitude, at least one byte.
    BigInt(Vec<u8>),
    /// Packed 32-bit IEEE-754 floats.
    VectorFloat(Vec<f32>),
    /// Packed 64-bit IEEE-754 floats.
    VectorDouble(Vec<f64>),
    /// An application-defined extension. Codes in the reserved negative band
    /// that this library does not interpret survive a round trip unchanged.
    Extension { code: i8, data: Vec<u8> },
}

impl Value {
    /// Returns a short name for the variant, used in messages and statistics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Binary(_) => "binary",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Timestamp(_) => "timestamp",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::BigInt(_) => "bigint",
            Value::VectorFloat(_) => "vector_float",
            Value::VectorDouble(_) => "vector_double",
            Value::Extension { .. } => "extension",
        }
    }

    /// Returns `true` if the value is `Nil`.
    #[inline]
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Returns `true` if the value is an integer of either signedness.
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Uint(_))
    }

    /// Returns `true` if the value is an array.
    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Returns `true` if the value is a map.
    #[inline]
    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// If the value is a boolean, returns it.
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the numeric meaning of an `Int` or a `Uint` that fits in `i64`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use btoon::Value;
    ///
    /// assert_eq!(Value::Int(-7).as_i64(), Some(-7));
    /// assert_eq!(Value::Uint(7).as_i64(), Some(7));
    /// assert_eq!(Value::Uint(u64::MAX).as_i64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Uint(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    /// Returns the numeric meaning of a `Uint` or a non-negative `Int`.
    #[inline]
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Uint(u) => Some(*u),
            Value::Int(i) => u64::try_from(*i).ok(),
            _ => None,
        }
    }

    /// If the value is a float, returns it.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// If the value is a string, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is binary, returns a reference to its bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(b) => Some(b),
            _ => None,
        }
    }

    /// If the value is an array, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// If the value is a map, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_map(&self) -> Option<&BtoonMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Builds a `Timestamp` value from a chrono instant (second resolution).
    #[must_use]
    pub fn timestamp(instant: ChronoDateTime<Utc>) -> Value {
        Value::Timestamp(instant.timestamp())
    }

    /// Builds a `Date` value from a chrono instant (millisecond resolution).
    #[must_use]
    pub fn date(instant: ChronoDateTime<Utc>) -> Value {
        Value::Date(instant.timestamp_millis())
    }

    /// Builds a `DateTime` value from a chrono instant (nanosecond resolution).
    ///
    /// Returns `None` for instants outside roughly 1677..=2262, where the
    /// nanosecond count does not fit an `i64`.
    #[must_use]
    pub fn datetime(instant: ChronoDateTime<Utc>) -> Option<Value> {
        instant.timestamp_nanos_opt().map(Value::DateTime)
    }

    /// If the value is a `Timestamp`, returns it as a chrono instant.
    #[must_use]
    pub fn as_timestamp(&self) -> Option<ChronoDateTime<Utc>> {
        match self {
            Value::Timestamp(secs) => ChronoDateTime::from_timestamp(*secs, 0),
            _ => None,
        }
    }

    /// If the value is a `Date`, returns it as a chrono instant.
    #[must_use]
    pub fn as_date(&self) -> Option<ChronoDateTime<Utc>> {
        match self {
            Value::Date(ms) => ChronoDateTime::from_timestamp_millis(*ms),
            _ => None,
        }
    }

    /// If the value is a `DateTime`, returns it as a chrono instant.
    #[must_use]
    pub fn as_datetime(&self) -> Option<ChronoDateTime<Utc>> {
        match self {
            Value::DateTime(ns) => Some(ChronoDateTime::from_timestamp_nanos(*ns)),
            _ => None,
        }
    }

    /// Builds a `BigInt` value from an arbitrary-precision integer.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use btoon::Value;
    /// use num_bigint::BigInt;
    ///
    /// let n: BigInt = BigInt::from(10).pow(30);
    /// let v = Value::big_int(&n);
    /// assert_eq!(v.as_big_int(), Some(n));
    /// ```
    #[must_use]
    pub fn big_int(n: &BigInt) -> Value {
        Value::BigInt(n.to_signed_bytes_be())
    }

    /// If the value is a `BigInt`, returns it as an arbitrary-precision integer.
    #[must_use]
    pub fn as_big_int(&self) -> Option<BigInt> {
        match self {
            Value::BigInt(bytes) => Some(BigInt::from_signed_bytes_be(bytes)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Uint(u) => write!(f, "{}", u),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Binary(b) => write!(f, "bin({} bytes)", b.len()),
            Value::Array(arr) => {
                write!(f, "[")?;
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Timestamp(s) => write!(f, "timestamp({}s)", s),
            Value::Date(ms) => write!(f, "date({}ms)", ms),
            Value::DateTime(ns) => write!(f, "datetime({}ns)", ns),
            Value::BigInt(bytes) => write!(f, "{}", BigInt::from_signed_bytes_be(bytes)),
            Value::VectorFloat(v) => write!(f, "vector_float({} elements)", v.len()),
            Value::VectorDouble(v) => write!(f, "vector_double({} elements)", v.len()),
            Value::Extension { code, data } => write!(f, "ext({}, {} bytes)", code, data.len()),
        }
    }
}

macro_rules! from_signed {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                let value = value as i64;
                if value >= 0 {
                    Value::Uint(value as u64)
                } else {
                    Value::Int(value)
                }
            }
        })*
    };
}

macro_rules! from_unsigned {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Value::Uint(value as u64)
            }
        })*
    };
}

from_signed!(i8, i16, i32, i64);
from_unsigned!(u8, u16, u32, u64);

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
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
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Binary(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<BtoonMap> for Value {
    fn from(value: BtoonMap) -> Self {
        Value::Map(value)
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::big_int(&value)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Nil => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Uint(u) => serializer.serialize_u64(*u),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::String(s) => serializer.serialize_str(s),
            Value::Binary(b) => serializer.serialize_bytes(b),
            Value::Array(arr) => {
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for element in arr {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            Value::Timestamp(s) => serializer.serialize_i64(*s),
            Value::Date(ms) => serializer.serialize_i64(*ms),
            Value::DateTime(ns) => serializer.serialize_i64(*ns),
            Value::BigInt(bytes) => {
                serializer.serialize_str(&BigInt::from_signed_bytes_be(bytes).to_string())
            }
            Value::VectorFloat(v) => {
                let mut seq = serializer.serialize_seq(Some(v.len()))?;
                for x in v {
                    seq.serialize_element(x)?;
                }
                seq.end()
            }
            Value::VectorDouble(v) => {
                let mut seq = serializer.serialize_seq(Some(v.len()))?;
                for x in v {
                    seq.serialize_element(x)?;
                }
                seq.end()
            }
            Value::Extension { code, data } => (code, data).serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid BTOON value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(Value::from(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
                Ok(Value::Uint(value))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
                Ok(Value::Float(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(Value::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(Value::String(value))
            }

            fn visit_bytes<E>(self, value: &[u8]) -> Result<Self::Value, E> {
                Ok(Value::Binary(value.to_vec()))
            }

            fn visit_byte_buf<E>(self, value: Vec<u8>) -> Result<Self::Value, E> {
                Ok(Value::Binary(value))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Nil)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Nil)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(Value::Array(vec))
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut map = BtoonMap::new();
                while let Some((key, value)) = access.next_entry()? {
                    map.insert(key, value);
                }
                Ok(Value::Map(map))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}
