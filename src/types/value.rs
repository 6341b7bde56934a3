//! Dynamically-typed tag values
//!
//! Decoders store whatever representation a format uses; callers ask for the
//! representation they want. Every conversion here is total: a value that
//! cannot be converted yields `None`, never a panic.
//!
//! Conversion rules:
//! - numbers convert to integers by truncating toward zero; a rational is
//!   divided first
//! - arrays convert to a scalar only when they hold exactly one element
//! - a string that is not a base-10 integer converts to an integer by reading
//!   its UTF-8 bytes as a big-endian number
//! - a rational with a zero numerator converts to `0.0`, whatever its denominator

use crate::types::rational::Rational;
use crate::types::string_value::StringValue;
use crate::utils::datetime::DateTime;
use std::fmt;

/// A tag value as stored by a format decoder
#[derive(Debug, Clone, PartialEq)]
pub enum DynValue {
    /// Signed integer
    Int(i64),
    /// Unsigned integer
    UInt(u64),
    /// Numerator/denominator pair
    Rational(Rational),
    /// Byte array
    Bytes(Vec<u8>),
    /// 16-bit integer array
    ShortArray(Vec<i16>),
    /// 32-bit integer array
    IntArray(Vec<i32>),
    /// 64-bit integer array
    LongArray(Vec<i64>),
    /// Rational array
    RationalArray(Vec<Rational>),
    /// String with explicit or default encoding
    String(StringValue),
    /// String array
    StringArray(Vec<StringValue>),
    /// Date and/or time
    DateTime(DateTime),
}

impl DynValue {
    /// Name of the stored representation
    pub fn kind(&self) -> &'static str {
        match self {
            DynValue::Int(_) => "int",
            DynValue::UInt(_) => "uint",
            DynValue::Rational(_) => "rational",
            DynValue::Bytes(_) => "bytes",
            DynValue::ShortArray(_) => "short[]",
            DynValue::IntArray(_) => "int[]",
            DynValue::LongArray(_) => "long[]",
            DynValue::RationalArray(_) => "rational[]",
            DynValue::String(_) => "string",
            DynValue::StringArray(_) => "string[]",
            DynValue::DateTime(_) => "datetime",
        }
    }

    /// Number of elements for array values, `None` for scalars and strings
    pub fn array_len(&self) -> Option<usize> {
        match self {
            DynValue::Bytes(v) => Some(v.len()),
            DynValue::ShortArray(v) => Some(v.len()),
            DynValue::IntArray(v) => Some(v.len()),
            DynValue::LongArray(v) => Some(v.len()),
            DynValue::RationalArray(v) => Some(v.len()),
            DynValue::StringArray(v) => Some(v.len()),
            _ => None,
        }
    }

    /// Convert to a 32-bit integer
    pub fn to_i32(&self) -> Option<i32> {
        match self {
            DynValue::Rational(r) => Some(r.to_i32()),
            DynValue::RationalArray(v) => single(v).map(|r| r.to_i32()),
            DynValue::String(s) => {
                let text = s.decode();
                Some(
                    text.parse::<i32>()
                        .unwrap_or_else(|_| pack_big_endian(text.as_bytes()) as i32),
                )
            }
            _ => self.to_i64().map(|v| v as i32),
        }
    }

    /// Convert to a 64-bit integer
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            DynValue::Int(v) => Some(*v),
            DynValue::UInt(v) => Some(*v as i64),
            DynValue::Rational(r) => Some(r.to_i64()),
            DynValue::Bytes(v) => single(v).map(i64::from),
            DynValue::ShortArray(v) => single(v).map(i64::from),
            DynValue::IntArray(v) => single(v).map(i64::from),
            DynValue::LongArray(v) => single(v),
            DynValue::RationalArray(v) => single(v).map(|r| r.to_i64()),
            DynValue::String(s) => {
                let text = s.decode();
                Some(
                    text.parse::<i64>()
                        .unwrap_or_else(|_| pack_big_endian(text.as_bytes())),
                )
            }
            DynValue::StringArray(_) | DynValue::DateTime(_) => None,
        }
    }

    /// Convert to a double
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            DynValue::Int(v) => Some(*v as f64),
            DynValue::UInt(v) => Some(*v as f64),
            DynValue::Rational(r) => Some(r.to_f64()),
            DynValue::Bytes(v) => single(v).map(f64::from),
            DynValue::ShortArray(v) => single(v).map(f64::from),
            DynValue::IntArray(v) => single(v).map(f64::from),
            DynValue::LongArray(v) => single(v).map(|n| n as f64),
            DynValue::RationalArray(v) => single(v).map(|r| r.to_f64()),
            DynValue::String(s) => s.decode().trim().parse().ok(),
            DynValue::StringArray(_) | DynValue::DateTime(_) => None,
        }
    }

    /// Convert to a float
    pub fn to_f32(&self) -> Option<f32> {
        match self {
            DynValue::Rational(r) => Some(r.to_f32()),
            DynValue::RationalArray(v) => single(v).map(|r| r.to_f32()),
            _ => self.to_f64().map(|v| v as f32),
        }
    }

    /// Convert to a boolean
    ///
    /// Numbers are true when non-zero; strings must read `true` or `false`.
    pub fn to_bool(&self) -> Option<bool> {
        match self {
            DynValue::Int(v) => Some(*v != 0),
            DynValue::UInt(v) => Some(*v != 0),
            DynValue::Rational(r) => Some(!r.is_zero()),
            DynValue::String(s) => {
                let text = s.decode();
                if text.trim().eq_ignore_ascii_case("true") {
                    Some(true)
                } else if text.trim().eq_ignore_ascii_case("false") {
                    Some(false)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Convert to a rational
    pub fn to_rational(&self) -> Option<Rational> {
        match self {
            DynValue::Rational(r) => Some(*r),
            DynValue::RationalArray(v) => single(v),
            DynValue::Int(v) => Some(Rational::new(*v, 1)),
            DynValue::UInt(v) => i64::try_from(*v).ok().map(|n| Rational::new(n, 1)),
            _ => None,
        }
    }

    /// Convert to a rational array
    pub fn to_rational_array(&self) -> Option<Vec<Rational>> {
        match self {
            DynValue::RationalArray(v) => Some(v.clone()),
            DynValue::Rational(r) => Some(vec![*r]),
            _ => None,
        }
    }

    /// Convert to a 32-bit integer array
    ///
    /// Strings convert to their character codes.
    pub fn to_i32_array(&self) -> Option<Vec<i32>> {
        match self {
            DynValue::IntArray(v) => Some(v.clone()),
            DynValue::ShortArray(v) => Some(v.iter().copied().map(i32::from).collect()),
            DynValue::Bytes(v) => Some(v.iter().copied().map(i32::from).collect()),
            DynValue::LongArray(v) => Some(v.iter().map(|&n| n as i32).collect()),
            DynValue::RationalArray(v) => Some(v.iter().map(Rational::to_i32).collect()),
            DynValue::String(s) => Some(s.decode().chars().map(|c| c as i32).collect()),
            DynValue::Int(v) => Some(vec![*v as i32]),
            DynValue::UInt(v) => Some(vec![*v as i32]),
            DynValue::Rational(_) | DynValue::StringArray(_) | DynValue::DateTime(_) => None,
        }
    }

    /// Convert to a byte array
    ///
    /// Strings yield their stored bytes; wider integers are truncated.
    pub fn to_byte_array(&self) -> Option<Vec<u8>> {
        match self {
            DynValue::Bytes(v) => Some(v.clone()),
            DynValue::String(s) => Some(s.bytes().to_vec()),
            DynValue::ShortArray(v) => Some(v.iter().map(|&n| n as u8).collect()),
            DynValue::IntArray(v) => Some(v.iter().map(|&n| n as u8).collect()),
            DynValue::LongArray(v) => Some(v.iter().map(|&n| n as u8).collect()),
            DynValue::RationalArray(v) => Some(v.iter().map(|r| r.to_i32() as u8).collect()),
            DynValue::Int(v) => Some(vec![*v as u8]),
            DynValue::UInt(v) => Some(vec![*v as u8]),
            DynValue::Rational(_) | DynValue::StringArray(_) | DynValue::DateTime(_) => None,
        }
    }

    /// Convert to a string value, keeping the original bytes of strings
    pub fn to_string_value(&self) -> StringValue {
        match self {
            DynValue::String(s) => s.clone(),
            other => StringValue::from(other.to_string()),
        }
    }

    /// Convert to a string array
    pub fn to_string_array(&self) -> Option<Vec<String>> {
        match self {
            DynValue::StringArray(v) => Some(v.iter().map(StringValue::decode).collect()),
            DynValue::String(s) => Some(vec![s.decode()]),
            DynValue::Bytes(v) => Some(v.iter().map(u8::to_string).collect()),
            DynValue::ShortArray(v) => Some(v.iter().map(i16::to_string).collect()),
            DynValue::IntArray(v) => Some(v.iter().map(i32::to_string).collect()),
            DynValue::LongArray(v) => Some(v.iter().map(i64::to_string).collect()),
            DynValue::RationalArray(v) => {
                Some(v.iter().map(|r| r.to_simple_string(false)).collect())
            }
            DynValue::Int(v) => Some(vec![v.to_string()]),
            DynValue::UInt(v) => Some(vec![v.to_string()]),
            DynValue::Rational(r) => Some(vec![r.to_simple_string(false)]),
            DynValue::DateTime(_) => None,
        }
    }

    /// Convert to a date/time
    pub fn to_date(&self) -> Option<DateTime> {
        match self {
            DynValue::DateTime(dt) => Some(dt.clone()),
            DynValue::String(s) => DateTime::parse(&s.decode()).ok(),
            _ => None,
        }
    }
}

fn single<T: Copy>(values: &[T]) -> Option<T> {
    match values {
        [value] => Some(*value),
        _ => None,
    }
}

/// Read bytes as a big-endian integer, keeping the low 64 bits
fn pack_big_endian(bytes: &[u8]) -> i64 {
    bytes
        .iter()
        .fold(0i64, |acc, &b| acc.wrapping_shl(8) | i64::from(b))
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, values: &[T]) -> fmt::Result {
    for (i, value) in values.iter().enumerate() {
        if i != 0 {
            f.write_str(" ")?;
        }
        write!(f, "{}", value)?;
    }
    Ok(())
}

/// Default text rendering: scalars as numbers, rationals in simplest form,
/// arrays space-separated
impl fmt::Display for DynValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DynValue::Int(v) => write!(f, "{}", v),
            DynValue::UInt(v) => write!(f, "{}", v),
            DynValue::Rational(r) => f.write_str(&r.to_simple_string(true)),
            DynValue::Bytes(v) => write_joined(f, v),
            DynValue::ShortArray(v) => write_joined(f, v),
            DynValue::IntArray(v) => write_joined(f, v),
            DynValue::LongArray(v) => write_joined(f, v),
            DynValue::RationalArray(v) => write_joined(f, v),
            DynValue::String(s) => write!(f, "{}", s),
            DynValue::StringArray(v) => write_joined(f, v),
            DynValue::DateTime(dt) => write!(f, "{}", dt),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Serialize for DynValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        match self {
            DynValue::Int(v) => serializer.serialize_i64(*v),
            DynValue::UInt(v) => serializer.serialize_u64(*v),
            DynValue::Rational(r) => serializer.collect_str(r),
            DynValue::Bytes(v) => serde::Serialize::serialize(v, serializer),
            DynValue::ShortArray(v) => serde::Serialize::serialize(v, serializer),
            DynValue::IntArray(v) => serde::Serialize::serialize(v, serializer),
            DynValue::LongArray(v) => serde::Serialize::serialize(v, serializer),
            DynValue::RationalArray(v) => serializer.collect_seq(v.iter().map(|r| r.to_string())),
            DynValue::String(s) => serializer.serialize_str(&s.decode()),
            DynValue::StringArray(v) => serializer.collect_seq(v.iter().map(StringValue::decode)),
            DynValue::DateTime(dt) => serializer.serialize_str(&dt.format()),
        }
    }
}

impl From<i32> for DynValue {
    fn from(v: i32) -> Self {
        DynValue::Int(i64::from(v))
    }
}

impl From<i64> for DynValue {
    fn from(v: i64) -> Self {
        DynValue::Int(v)
    }
}

impl From<u8> for DynValue {
    fn from(v: u8) -> Self {
        DynValue::UInt(u64::from(v))
    }
}

impl From<u16> for DynValue {
    fn from(v: u16) -> Self {
        DynValue::UInt(u64::from(v))
    }
}

impl From<u32> for DynValue {
    fn from(v: u32) -> Self {
        DynValue::UInt(u64::from(v))
    }
}

impl From<u64> for DynValue {
    fn from(v: u64) -> Self {
        DynValue::UInt(v)
    }
}

impl From<Rational> for DynValue {
    fn from(r: Rational) -> Self {
        DynValue::Rational(r)
    }
}

impl From<Vec<u8>> for DynValue {
    fn from(v: Vec<u8>) -> Self {
        DynValue::Bytes(v)
    }
}

impl From<Vec<i16>> for DynValue {
    fn from(v: Vec<i16>) -> Self {
        DynValue::ShortArray(v)
    }
}

impl From<Vec<i32>> for DynValue {
    fn from(v: Vec<i32>) -> Self {
        DynValue::IntArray(v)
    }
}

impl From<Vec<i64>> for DynValue {
    fn from(v: Vec<i64>) -> Self {
        DynValue::LongArray(v)
    }
}

impl From<Vec<Rational>> for DynValue {
    fn from(v: Vec<Rational>) -> Self {
        DynValue::RationalArray(v)
    }
}

impl From<StringValue> for DynValue {
    fn from(s: StringValue) -> Self {
        DynValue::String(s)
    }
}

impl From<&str> for DynValue {
    fn from(s: &str) -> Self {
        DynValue::String(StringValue::from(s))
    }
}

impl From<String> for DynValue {
    fn from(s: String) -> Self {
        DynValue::String(StringValue::from(s))
    }
}

impl From<Vec<StringValue>> for DynValue {
    fn from(v: Vec<StringValue>) -> Self {
        DynValue::StringArray(v)
    }
}

impl From<DateTime> for DynValue {
    fn from(dt: DateTime) -> Self {
        DynValue::DateTime(dt)
    }
}
