use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single custom-field value.
///
/// Deserializes untagged from JSON scalars: strings become `Str`, integral
/// numbers `Int`, other numbers `Float`, booleans `Bool`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl AttributeValue {
    /// Runtime type name used in mismatch messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::Str(_) => "string",
            AttributeValue::Int(_) => "integer",
            AttributeValue::Float(_) => "float",
            AttributeValue::Bool(_) => "boolean",
        }
    }

    /// Read one JSON value from a request body.
    ///
    /// `Ok(None)` is JSON `null`. Lists and objects cannot be stored; the
    /// error carries their runtime type name (`"list"`, `"object"`).
    pub fn from_json(value: &Value) -> Result<Option<Self>, &'static str> {
        let parsed = match value {
            Value::Null => return Ok(None),
            Value::Bool(b) => AttributeValue::Bool(*b),
            Value::String(s) => AttributeValue::Str(s.clone()),
            Value::Number(n) => match n.as_i64() {
                Some(i) => AttributeValue::Int(i),
                None => AttributeValue::Float(n.as_f64().ok_or("number")?),
            },
            Value::Array(_) => return Err("list"),
            Value::Object(_) => return Err("object"),
        };
        Ok(Some(parsed))
    }

    /// Numeric view of the value. Booleans are not numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Int(i) => Some(*i as f64),
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Str(_) | AttributeValue::Bool(_) => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Str(s.to_string())
    }
}

impl From<i64> for AttributeValue {
    fn from(i: i64) -> Self {
        AttributeValue::Int(i)
    }
}

impl From<f64> for AttributeValue {
    fn from(f: f64) -> Self {
        AttributeValue::Float(f)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Bool(b)
    }
}

/// Custom fields attached to an asset or asset instance.
///
/// `None` is an explicit JSON `null`: accepted for every declared type and
/// never converted.
pub type CustomFieldBag = BTreeMap<String, Option<AttributeValue>>;

/// Custom fields exactly as they arrived in a request body, before any
/// key normalization or type check.
pub type RawFieldBag = BTreeMap<String, Value>;
