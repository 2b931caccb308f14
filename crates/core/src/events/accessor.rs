use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::{
    error::CoercionError,
    events::{Event, FieldPath, event::value_kind},
};

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f %z", "%Y-%m-%dT%H:%M:%S%.f%z"];
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const UTC_SUFFIXES: &[&str] = &[" UTC", " GMT", " Z"];

fn parse_naive(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = UTC_SUFFIXES
        .iter()
        .find_map(|suffix| raw.strip_suffix(suffix))
        .unwrap_or(raw);

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Parses a lifecycle timestamp, keeping its UTC offset.
///
/// Tries RFC 3339, RFC 2822, a few ISO-like layouts with an explicit offset,
/// then the same layouts without one (or with a trailing `UTC`/`GMT` name),
/// which are read as UTC. A bare date means midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();

    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .ok()
        .or_else(|| {
            OFFSET_FORMATS
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
        })
        .or_else(|| parse_naive(raw))
}

/// A JSON number as read from an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Int(i64),
    /// Integers above `i64::MAX`.
    UInt(u64),
    Float(f64),
}

impl Numeric {
    /// Coerces a raw field value. Absent and `null` both count as missing.
    pub fn coerce(path: &FieldPath, raw: Option<&Value>) -> Result<Self, CoercionError> {
        match raw {
            None | Some(Value::Null) => Err(CoercionError::Missing {
                path: path.to_string(),
            }),
            Some(Value::Number(n)) => n
                .as_i64()
                .map(Numeric::Int)
                .or_else(|| n.as_u64().map(Numeric::UInt))
                .or_else(|| n.as_f64().map(Numeric::Float))
                .ok_or_else(|| CoercionError::Unparseable {
                    path: path.to_string(),
                    value: n.to_string(),
                    expected: "number",
                }),
            Some(other) => Err(CoercionError::WrongType {
                path: path.to_string(),
                expected: "number",
                found: value_kind(other),
            }),
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Numeric::Int(v) => v as f64,
            Numeric::UInt(v) => v as f64,
            Numeric::Float(v) => v,
        }
    }

    /// The exact integer value, `None` for floats.
    pub fn integer(self) -> Option<i128> {
        match self {
            Numeric::Int(v) => Some(v.into()),
            Numeric::UInt(v) => Some(v.into()),
            Numeric::Float(_) => None,
        }
    }

    /// Narrows an exact integer back to the smallest variant that holds it.
    pub fn from_integer(v: i128) -> Option<Self> {
        i64::try_from(v)
            .map(Numeric::Int)
            .or_else(|_| u64::try_from(v).map(Numeric::UInt))
            .ok()
    }

    pub fn is_positive(self) -> bool {
        self.as_f64() > 0.0
    }

    pub fn is_negative(self) -> bool {
        self.as_f64() < 0.0
    }

    pub fn max(self, other: Self) -> Self {
        let other_larger = match (self.integer(), other.integer()) {
            (Some(a), Some(b)) => b > a,
            _ => other.as_f64() > self.as_f64(),
        };
        if other_larger { other } else { self }
    }
}

impl From<Numeric> for Value {
    fn from(n: Numeric) -> Self {
        match n {
            Numeric::Int(v) => Value::from(v),
            Numeric::UInt(v) => Value::from(v),
            Numeric::Float(v) => Value::from(v),
        }
    }
}

impl Event {
    pub fn timestamp(&self, path: &FieldPath) -> Result<DateTime<FixedOffset>, CoercionError> {
        match self.get(path) {
            None | Some(Value::Null) => Err(CoercionError::Missing {
                path: path.to_string(),
            }),
            Some(Value::String(raw)) => {
                parse_timestamp(raw).ok_or_else(|| CoercionError::Unparseable {
                    path: path.to_string(),
                    value: raw.clone(),
                    expected: "timestamp",
                })
            }
            Some(other) => Err(CoercionError::WrongType {
                path: path.to_string(),
                expected: "string",
                found: value_kind(other),
            }),
        }
    }

    pub fn number(&self, path: &FieldPath) -> Result<Numeric, CoercionError> {
        Numeric::coerce(path, self.get(path))
    }
}
