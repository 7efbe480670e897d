//! Runtime values handed to the variant resolver.
//!
//! Only the shape and the class of a value matter here. Nothing in this crate
//! encodes values.
use std::borrow::Cow;
use std::net::{Ipv4Addr, Ipv6Addr};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::Serialize;
use uuid::Uuid;

/// The class of a scalar runtime value.
///
/// Type registry entries list which classes a column type can hold, and the
/// variant resolver keys its lookup tables by class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ValueClass {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    Int128,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    UInt128,
    Float32,
    Float64,
    Decimal,
    Utf8,
    Binary,
    Date,
    Timestamp,
    TimestampTz,
    Uuid,
    Ipv4,
    Ipv6,
}

/// A decimal held as an unscaled integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecimalValue {
    pub value: i128,
    pub scale: u8,
}

/// A single scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue<'a> {
    Boolean(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Int128(i128),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    UInt128(u128),
    Float32(f32),
    Float64(f64),
    Decimal(DecimalValue),
    /// Utf-8 encoded string.
    Utf8(Cow<'a, str>),
    Binary(Cow<'a, [u8]>),
    Date(NaiveDate),
    /// Timestamp without a time zone.
    Timestamp(NaiveDateTime),
    /// Timestamp with a fixed offset.
    TimestampTz(DateTime<FixedOffset>),
    Uuid(Uuid),
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
}

pub type OwnedScalarValue = ScalarValue<'static>;

impl<'a> ScalarValue<'a> {
    pub const fn value_class(&self) -> ValueClass {
        match self {
            Self::Boolean(_) => ValueClass::Boolean,
            Self::Int8(_) => ValueClass::Int8,
            Self::Int16(_) => ValueClass::Int16,
            Self::Int32(_) => ValueClass::Int32,
            Self::Int64(_) => ValueClass::Int64,
            Self::Int128(_) => ValueClass::Int128,
            Self::UInt8(_) => ValueClass::UInt8,
            Self::UInt16(_) => ValueClass::UInt16,
            Self::UInt32(_) => ValueClass::UInt32,
            Self::UInt64(_) => ValueClass::UInt64,
            Self::UInt128(_) => ValueClass::UInt128,
            Self::Float32(_) => ValueClass::Float32,
            Self::Float64(_) => ValueClass::Float64,
            Self::Decimal(_) => ValueClass::Decimal,
            Self::Utf8(_) => ValueClass::Utf8,
            Self::Binary(_) => ValueClass::Binary,
            Self::Date(_) => ValueClass::Date,
            Self::Timestamp(_) => ValueClass::Timestamp,
            Self::TimestampTz(_) => ValueClass::TimestampTz,
            Self::Uuid(_) => ValueClass::Uuid,
            Self::Ipv4(_) => ValueClass::Ipv4,
            Self::Ipv6(_) => ValueClass::Ipv6,
        }
    }

    pub fn into_owned(self) -> OwnedScalarValue {
        match self {
            Self::Boolean(v) => OwnedScalarValue::Boolean(v),
            Self::Int8(v) => OwnedScalarValue::Int8(v),
            Self::Int16(v) => OwnedScalarValue::Int16(v),
            Self::Int32(v) => OwnedScalarValue::Int32(v),
            Self::Int64(v) => OwnedScalarValue::Int64(v),
            Self::Int128(v) => OwnedScalarValue::Int128(v),
            Self::UInt8(v) => OwnedScalarValue::UInt8(v),
            Self::UInt16(v) => OwnedScalarValue::UInt16(v),
            Self::UInt32(v) => OwnedScalarValue::UInt32(v),
            Self::UInt64(v) => OwnedScalarValue::UInt64(v),
            Self::UInt128(v) => OwnedScalarValue::UInt128(v),
            Self::Float32(v) => OwnedScalarValue::Float32(v),
            Self::Float64(v) => OwnedScalarValue::Float64(v),
            Self::Decimal(v) => OwnedScalarValue::Decimal(v),
            Self::Utf8(v) => OwnedScalarValue::Utf8(v.into_owned().into()),
            Self::Binary(v) => OwnedScalarValue::Binary(v.into_owned().into()),
            Self::Date(v) => OwnedScalarValue::Date(v),
            Self::Timestamp(v) => OwnedScalarValue::Timestamp(v),
            Self::TimestampTz(v) => OwnedScalarValue::TimestampTz(v),
            Self::Uuid(v) => OwnedScalarValue::Uuid(v),
            Self::Ipv4(v) => OwnedScalarValue::Ipv4(v),
            Self::Ipv6(v) => OwnedScalarValue::Ipv6(v),
        }
    }
}

impl From<&'static str> for ScalarValue<'static> {
    fn from(value: &'static str) -> Self {
        ScalarValue::Utf8(Cow::Borrowed(value))
    }
}

impl From<String> for ScalarValue<'static> {
    fn from(value: String) -> Self {
        ScalarValue::Utf8(Cow::Owned(value))
    }
}

/// A typed, possibly multi-dimensional array.
///
/// The element class is carried explicitly so an empty array still knows
/// what it would hold.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayValue<'a> {
    /// Class of the innermost elements.
    pub element_class: ValueClass,
    /// Number of array dimensions, at least 1.
    pub dimensions: usize,
    pub values: Vec<Value<'a>>,
}

impl<'a> ArrayValue<'a> {
    pub fn new(element_class: ValueClass, values: impl IntoIterator<Item = Value<'a>>) -> Self {
        ArrayValue {
            element_class,
            dimensions: 1,
            values: values.into_iter().collect(),
        }
    }

    /// Wrap arrays into one more dimension.
    pub fn nested(element_class: ValueClass, arrays: impl IntoIterator<Item = ArrayValue<'a>>) -> Self {
        let arrays: Vec<_> = arrays.into_iter().collect();
        let dimensions = arrays.iter().map(|a| a.dimensions).max().unwrap_or(1) + 1;
        ArrayValue {
            element_class,
            dimensions,
            values: arrays.into_iter().map(Value::Array).collect(),
        }
    }
}

/// Shape of a runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Null,
    Scalar(ScalarValue<'a>),
    Array(ArrayValue<'a>),
    /// Ordered list whose element class is only known from its contents.
    List(Vec<Value<'a>>),
    /// Key/value entries in iteration order.
    Map(Vec<(Value<'a>, Value<'a>)>),
}

impl<'a> Value<'a> {
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Class of a scalar value, None for every other shape.
    pub const fn scalar_class(&self) -> Option<ValueClass> {
        match self {
            Value::Scalar(s) => Some(s.value_class()),
            _ => None,
        }
    }
}

impl<'a> From<ScalarValue<'a>> for Value<'a> {
    fn from(value: ScalarValue<'a>) -> Self {
        Value::Scalar(value)
    }
}

impl<'a> From<ArrayValue<'a>> for Value<'a> {
    fn from(value: ArrayValue<'a>) -> Self {
        Value::Array(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_classes() {
        assert_eq!(ValueClass::UInt8, ScalarValue::UInt8(4).value_class());
        assert_eq!(ValueClass::Utf8, ScalarValue::from("abc").value_class());
        assert_eq!(
            ValueClass::Ipv4,
            ScalarValue::Ipv4(Ipv4Addr::LOCALHOST).value_class()
        );
    }

    #[test]
    fn nested_array_dimensions() {
        let inner = ArrayValue::new(ValueClass::Int32, [Value::Scalar(ScalarValue::Int32(1))]);
        let outer = ArrayValue::nested(ValueClass::Int32, [inner.clone(), inner]);
        assert_eq!(2, outer.dimensions);

        let empty = ArrayValue::nested(ValueClass::Int32, Vec::new());
        assert_eq!(2, empty.dimensions);
    }

    #[test]
    fn into_owned_keeps_value() {
        let s = String::from("hello");
        let borrowed = ScalarValue::Utf8(Cow::Borrowed(s.as_str()));
        let owned = borrowed.into_owned();
        assert_eq!(OwnedScalarValue::Utf8("hello".into()), owned);
    }
}
