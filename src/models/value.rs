//! Source value model
//!
//! Raw records arrive from fetchers as untyped nested documents. They are
//! converted once into [`SourceValue`] so that the converter can pattern-match
//! exhaustively instead of probing a dynamic value at every step.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An untyped node of a source record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceValue {
    /// Explicit null
    Null,
    /// Boolean literal
    Bool(bool),
    /// Numeric literal (integer or floating point, as received)
    Number(serde_json::Number),
    /// String literal
    String(String),
    /// Ordered sequence of values
    List(Vec<SourceValue>),
    /// Mapping of string keys to values
    Object(BTreeMap<String, SourceValue>),
}

impl SourceValue {
    /// Name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceValue::Null => "null",
            SourceValue::Bool(_) => "boolean",
            SourceValue::Number(_) => "number",
            SourceValue::String(_) => "string",
            SourceValue::List(_) => "list",
            SourceValue::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SourceValue::Null)
    }

    /// Whether this value is a scalar (neither a list nor an object).
    pub fn is_scalar(&self) -> bool {
        !matches!(self, SourceValue::List(_) | SourceValue::Object(_))
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, SourceValue>> {
        match self {
            SourceValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[SourceValue]> {
        match self {
            SourceValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a key when this value is an object.
    pub fn get(&self, key: &str) -> Option<&SourceValue> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Render the value as compact JSON.
    ///
    /// Used for stringifying objects and mixed lists into a single column, and
    /// for reporting offending values in conversion errors.
    pub fn to_json_string(&self) -> String {
        serde_json::Value::from(self.clone()).to_string()
    }

    /// Render a scalar as plain text (strings unquoted, null as empty).
    ///
    /// Lists and objects fall back to compact JSON.
    pub fn to_plain_string(&self) -> String {
        match self {
            SourceValue::Null => String::new(),
            SourceValue::Bool(b) => b.to_string(),
            SourceValue::Number(n) => n.to_string(),
            SourceValue::String(s) => s.clone(),
            SourceValue::List(_) | SourceValue::Object(_) => self.to_json_string(),
        }
    }
}

impl From<serde_json::Value> for SourceValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => SourceValue::Null,
            serde_json::Value::Bool(b) => SourceValue::Bool(b),
            serde_json::Value::Number(n) => SourceValue::Number(n),
            serde_json::Value::String(s) => SourceValue::String(s),
            serde_json::Value::Array(items) => {
                SourceValue::List(items.into_iter().map(SourceValue::from).collect())
            }
            serde_json::Value::Object(map) => SourceValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, SourceValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<SourceValue> for serde_json::Value {
    fn from(value: SourceValue) -> Self {
        match value {
            SourceValue::Null => serde_json::Value::Null,
            SourceValue::Bool(b) => serde_json::Value::Bool(b),
            SourceValue::Number(n) => serde_json::Value::Number(n),
            SourceValue::String(s) => serde_json::Value::String(s),
            SourceValue::List(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            SourceValue::Object(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_yaml::Value> for SourceValue {
    fn from(value: serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Null => SourceValue::Null,
            serde_yaml::Value::Bool(b) => SourceValue::Bool(b),
            serde_yaml::Value::Number(n) => yaml_number(&n),
            serde_yaml::Value::String(s) => SourceValue::String(s),
            serde_yaml::Value::Sequence(items) => {
                SourceValue::List(items.into_iter().map(SourceValue::from).collect())
            }
            serde_yaml::Value::Mapping(map) => SourceValue::Object(
                map.into_iter()
                    .map(|(k, v)| (yaml_key(k), SourceValue::from(v)))
                    .collect(),
            ),
            serde_yaml::Value::Tagged(tagged) => SourceValue::from(tagged.value),
        }
    }
}

fn yaml_number(n: &serde_yaml::Number) -> SourceValue {
    if let Some(i) = n.as_i64() {
        SourceValue::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        SourceValue::Number(u.into())
    } else {
        // NaN and infinities have no JSON number representation
        n.as_f64()
            .and_then(serde_json::Number::from_f64)
            .map(SourceValue::Number)
            .unwrap_or(SourceValue::Null)
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        other => SourceValue::from(other).to_plain_string(),
    }
}
