//! Operand values carried by conditions and the conversions applied to them
//! before a comparison predicate is built.

use crate::schema::ScalarType;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Floats in `[-2^63, 2^63)` cast to `i64` without saturating
const I64_LOWER: f64 = -9_223_372_036_854_775_808.0;
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

/// A literal operand
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    /// Decimal kept in its canonical textual form
    Decimal(String),
    String(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Uuid(Uuid),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short type name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::Float64(_) => "float64",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Uuid(_) => "uuid",
        }
    }

    /// Convert the operand to the declared scalar type of the property it is
    /// compared against. Returns `None` when the value cannot represent the
    /// target type without loss.
    pub fn convert_to(&self, target: ScalarType) -> Option<Value> {
        use ScalarType as T;

        match (self, target) {
            (Value::Null, _) => Some(Value::Null),

            (Value::Bool(b), T::Bool) => Some(Value::Bool(*b)),

            (Value::Int32(i), T::Int32) => Some(Value::Int32(*i)),
            (Value::Int32(i), T::Int64) => Some(Value::Int64(i64::from(*i))),
            (Value::Int32(i), T::Float64) => Some(Value::Float64(f64::from(*i))),
            (Value::Int32(i), T::Decimal) => Some(Value::Decimal(i.to_string())),

            (Value::Int64(i), T::Int32) => i32::try_from(*i).ok().map(Value::Int32),
            (Value::Int64(i), T::Int64) => Some(Value::Int64(*i)),
            (Value::Int64(i), T::Float64) => Some(Value::Float64(*i as f64)),
            (Value::Int64(i), T::Decimal) => Some(Value::Decimal(i.to_string())),

            (Value::Float64(f), T::Float64) => Some(Value::Float64(*f)),
            (Value::Float64(f), T::Decimal) if f.is_finite() => Some(Value::Decimal(f.to_string())),
            (Value::Float64(f), T::Int32 | T::Int64)
                if f.fract() == 0.0 && (I64_LOWER..I64_UPPER).contains(f) =>
            {
                Value::Int64(*f as i64).convert_to(target)
            }

            (Value::Decimal(d), T::Decimal) => Some(Value::Decimal(d.clone())),
            (Value::Decimal(d), T::Float64) => d.parse().ok().map(Value::Float64),

            (Value::Date(d), T::Date) => Some(Value::Date(*d)),
            (Value::Date(d), T::DateTime) => Some(Value::DateTime(d.and_time(NaiveTime::MIN))),
            (Value::DateTime(dt), T::DateTime) => Some(Value::DateTime(*dt)),
            (Value::DateTime(dt), T::Date) if dt.time() == NaiveTime::MIN => {
                Some(Value::Date(dt.date()))
            }

            (Value::Uuid(u), T::Uuid) => Some(Value::Uuid(*u)),

            (Value::String(s), _) => parse_string(s, target),

            (other, T::String) => Some(Value::String(other.to_string())),

            _ => None,
        }
    }
}

fn parse_string(s: &str, target: ScalarType) -> Option<Value> {
    use ScalarType as T;

    match target {
        T::String => Some(Value::String(s.to_string())),
        T::Bool => s.parse().ok().map(Value::Bool),
        T::Int32 => s.trim().parse().ok().map(Value::Int32),
        T::Int64 => s.trim().parse().ok().map(Value::Int64),
        T::Float64 => s.trim().parse().ok().map(Value::Float64),
        T::Decimal => s
            .trim()
            .parse::<f64>()
            .ok()
            .map(|_| Value::Decimal(s.trim().to_string())),
        T::Date => NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().map(Value::Date),
        T::DateTime => parse_datetime(s).map(Value::DateTime),
        T::Uuid => Uuid::parse_str(s).ok().map(Value::Uuid),
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int32(i) => write!(f, "{i}"),
            Value::Int64(i) => write!(f, "{i}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Decimal(d) => f.write_str(d),
            Value::String(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            Value::Uuid(u) => write!(f, "{u}"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float64(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::DateTime(value.naive_utc())
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Uuid(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
