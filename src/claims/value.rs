//! Open JSON value model used for headers and claims
//!
//! Objects are [`BTreeMap`]s so serialization is canonical: keys come out
//! sorted and the output is compact. Numbers are either `f64` or, when the
//! parser is configured to preserve them, the exact decimal literal from the
//! source text.

use std::collections::BTreeMap;

use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// String-keyed object with sorted keys
pub type Map = BTreeMap<String, Value>;

/// Largest integer an `f64` represents exactly (2^53)
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A JSON number
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    /// Floating-point (default decoding)
    Float(f64),
    /// Exact decimal literal as it appeared in the token
    Literal(String),
}

impl Number {
    /// Numeric value as `f64`, parsing literals
    ///
    /// Literals outside the `f64` range yield `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Number::Float(f) => Some(*f),
            Number::Literal(s) => s.parse::<f64>().ok().filter(|f| f.is_finite()),
        }
    }

    /// The exact literal, if this number was decoded in precise mode
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Number::Literal(s) => Some(s),
            Number::Float(_) => None,
        }
    }
}

/// A JSON value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(Map),
}

impl Value {
    /// Convert a decoded `serde_json` value
    ///
    /// With `precise` set, every numeric leaf becomes a [`Number::Literal`]
    /// holding the exact source text; otherwise numbers become `f64`.
    pub fn from_json(value: serde_json::Value, precise: bool) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if precise {
                    Value::Number(Number::Literal(n.to_string()))
                } else {
                    match n.as_f64() {
                        Some(f) => Value::Number(Number::Float(f)),
                        None => Value::Number(Number::Literal(n.to_string())),
                    }
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| Value::from_json(item, precise))
                    .collect(),
            ),
            serde_json::Value::Object(fields) => Value::Object(map_from_json(fields, precise)),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Numeric value as `f64` (see [`Number::as_f64`])
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().and_then(Number::as_f64)
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }
}

pub(crate) fn map_from_json(fields: serde_json::Map<String, serde_json::Value>, precise: bool) -> Map {
    fields
        .into_iter()
        .map(|(k, v)| (k, Value::from_json(v, precise)))
        .collect()
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Number::Float(f) => {
                // Integral values are written without a fractional part
                if f.is_finite() && f.fract() == 0.0 && f.abs() < MAX_SAFE_INTEGER {
                    serializer.serialize_i64(*f as i64)
                } else {
                    serializer.serialize_f64(*f)
                }
            }
            Number::Literal(s) => {
                let number: serde_json::Number = s
                    .parse()
                    .map_err(|_| S::Error::custom(format!("invalid numeric literal '{s}'")))?;
                number.serialize(serializer)
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
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

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(Number::Float(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(Number::Float(value as f64))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(Number::Float(f64::from(value)))
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into_iter().map(Into::into).collect())
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Value::Object(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Value::from_json(value, false)
    }
}
