//! Type specification model
//!
//! A [`TypeSpec`] is an ordered mapping from field name to a [`TypeDescriptor`]:
//! either a scalar SQL type tag or a nested specification describing the
//! objects of a list that is promoted into its own table.
//!
//! Scalar tags follow the grammar `name`, `name(param)` or `name[pattern]`:
//!
//! ```rust
//! use response_sql_sdk::models::ScalarType;
//!
//! let tag: ScalarType = "varchar(20)".parse().unwrap();
//! assert_eq!(tag, ScalarType::Varchar { max_length: 20 });
//! assert_eq!(tag.sql_type(), "VARCHAR(20)");
//! assert!("uuid".parse::<ScalarType>().is_err());
//! ```

use chrono::format::{Item, StrftimeItems};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer, ser::SerializeMap};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

static TAG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-z][a-z0-9_]*)(?:\(([^()]*)\)|\[(.*)\])?$").expect("valid tag regex")
});

/// Errors produced while parsing a single scalar type tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    /// Tag name is not part of the vocabulary
    #[error("unknown type '{0}'")]
    Unknown(String),

    /// Tag name is known but the tag is malformed
    #[error("invalid type tag '{tag}': {reason}")]
    Invalid { tag: String, reason: String },
}

/// A parsed scalar type tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ScalarType {
    /// `varchar(N)`: string truncated to `N` characters
    Varchar { max_length: usize },
    /// `text`: unbounded string
    Text,
    /// `decimal`: exact base-10 number
    Decimal,
    /// `money`: exact base-10 number stored in a currency column
    Money,
    /// `int`: 64-bit integer
    Int,
    /// `float`: double precision floating point
    Float,
    /// `bool`: boolean (SQL `BIT`)
    Bool,
    /// `datetime[FMT]`, or `datetime` for ISO-8601 input
    DateTime { format: Option<String> },
    /// `smalldatetime[FMT]`, or `smalldatetime` for ISO-8601 input
    SmallDateTime { format: Option<String> },
    /// `date[FMT]`, or `date` for ISO-8601 input
    Date { format: Option<String> },
}

impl ScalarType {
    /// Tag name without parameters.
    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Varchar { .. } => "varchar",
            ScalarType::Text => "text",
            ScalarType::Decimal => "decimal",
            ScalarType::Money => "money",
            ScalarType::Int => "int",
            ScalarType::Float => "float",
            ScalarType::Bool => "bool",
            ScalarType::DateTime { .. } => "datetime",
            ScalarType::SmallDateTime { .. } => "smalldatetime",
            ScalarType::Date { .. } => "date",
        }
    }

    /// SQL column type handed to the integrator.
    pub fn sql_type(&self) -> String {
        match self {
            ScalarType::Varchar { max_length } => format!("VARCHAR({})", max_length),
            ScalarType::Text => "VARCHAR(MAX)".to_string(),
            ScalarType::Decimal => "DECIMAL".to_string(),
            ScalarType::Money => "MONEY".to_string(),
            ScalarType::Int => "INT".to_string(),
            ScalarType::Float => "FLOAT".to_string(),
            ScalarType::Bool => "BIT".to_string(),
            ScalarType::DateTime { .. } => "DATETIME".to_string(),
            ScalarType::SmallDateTime { .. } => "SMALLDATETIME".to_string(),
            ScalarType::Date { .. } => "DATE".to_string(),
        }
    }

    /// Date format pattern, for the temporal family.
    pub fn format(&self) -> Option<&str> {
        match self {
            ScalarType::DateTime { format }
            | ScalarType::SmallDateTime { format }
            | ScalarType::Date { format } => format.as_deref(),
            _ => None,
        }
    }

    /// Whether values of this type are rendered as strings.
    pub fn is_textual(&self) -> bool {
        matches!(self, ScalarType::Varchar { .. } | ScalarType::Text)
    }

    /// Whether `name` is part of the tag vocabulary.
    pub fn is_known_name(name: &str) -> bool {
        matches!(
            name,
            "varchar"
                | "text"
                | "decimal"
                | "money"
                | "int"
                | "float"
                | "bool"
                | "datetime"
                | "smalldatetime"
                | "date"
        )
    }
}

impl FromStr for ScalarType {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        let invalid = |reason: &str| TagError::Invalid {
            tag: tag.to_string(),
            reason: reason.to_string(),
        };

        let captures = TAG_PATTERN.captures(tag).ok_or_else(|| {
            // `Varchar(10)` or `uuid<4>` is an unknown name, not a grammar error
            let name: String = tag
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect();
            if !name.is_empty() && !ScalarType::is_known_name(&name) {
                TagError::Unknown(name)
            } else {
                invalid("expected `name`, `name(param)` or `name[pattern]`")
            }
        })?;

        let name = &captures[1];
        let param = captures.get(2).map(|m| m.as_str());
        let pattern = captures.get(3).map(|m| m.as_str());

        if !ScalarType::is_known_name(name) {
            return Err(TagError::Unknown(name.to_string()));
        }

        match name {
            "varchar" => {
                if pattern.is_some() {
                    return Err(invalid("varchar does not take a pattern"));
                }
                let param =
                    param.ok_or_else(|| invalid("varchar requires a length, e.g. varchar(100)"))?;
                let max_length = parse_length(param)
                    .ok_or_else(|| invalid("length must be a positive integer"))?;
                Ok(ScalarType::Varchar { max_length })
            }
            "datetime" | "smalldatetime" | "date" => {
                if param.is_some() {
                    return Err(invalid("temporal types take a [pattern], not a (param)"));
                }
                let format = match pattern {
                    Some(p) => {
                        validate_pattern(p).map_err(|reason| invalid(&reason))?;
                        Some(p.to_string())
                    }
                    None => None,
                };
                Ok(match name {
                    "datetime" => ScalarType::DateTime { format },
                    "smalldatetime" => ScalarType::SmallDateTime { format },
                    _ => ScalarType::Date { format },
                })
            }
            _ => {
                if param.is_some() || pattern.is_some() {
                    return Err(invalid(&format!("{} does not take parameters", name)));
                }
                Ok(match name {
                    "text" => ScalarType::Text,
                    "decimal" => ScalarType::Decimal,
                    "money" => ScalarType::Money,
                    "int" => ScalarType::Int,
                    "float" => ScalarType::Float,
                    _ => ScalarType::Bool,
                })
            }
        }
    }
}

fn parse_length(param: &str) -> Option<usize> {
    if param.is_empty() || !param.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    param.parse::<usize>().ok().filter(|n| *n > 0)
}

fn validate_pattern(pattern: &str) -> Result<(), String> {
    if pattern.is_empty() {
        return Err("date pattern cannot be empty".to_string());
    }
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(format!("unsupported date pattern '{}'", pattern));
    }
    Ok(())
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarType::Varchar { max_length } => write!(f, "varchar({})", max_length),
            other => match other.format() {
                Some(pattern) => write!(f, "{}[{}]", other.name(), pattern),
                None => write!(f, "{}", other.name()),
            },
        }
    }
}

impl TryFrom<String> for ScalarType {
    type Error = TagError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ScalarType> for String {
    fn from(value: ScalarType) -> Self {
        value.to_string()
    }
}

/// Descriptor of a single field in a [`TypeSpec`].
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    /// Scalar column
    Scalar(ScalarType),
    /// List of objects promoted to a sub-table named after the field
    Nested(TypeSpec),
}

impl TypeDescriptor {
    pub fn as_scalar(&self) -> Option<&ScalarType> {
        match self {
            TypeDescriptor::Scalar(t) => Some(t),
            TypeDescriptor::Nested(_) => None,
        }
    }

    pub fn as_nested(&self) -> Option<&TypeSpec> {
        match self {
            TypeDescriptor::Nested(spec) => Some(spec),
            TypeDescriptor::Scalar(_) => None,
        }
    }
}

/// Ordered mapping from field name to [`TypeDescriptor`].
///
/// Field iteration order is the declared order, which is also the column
/// order of every row produced against this specification.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeSpec {
    fields: Vec<(String, TypeDescriptor)>,
}

impl TypeSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a field, keeping the position of a replaced field.
    pub fn insert(&mut self, name: impl Into<String>, descriptor: TypeDescriptor) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = descriptor,
            None => self.fields.push((name, descriptor)),
        }
    }

    /// Builder-style variant of [`insert`](Self::insert) for a scalar field.
    pub fn with_scalar(mut self, name: impl Into<String>, scalar: ScalarType) -> Self {
        self.insert(name, TypeDescriptor::Scalar(scalar));
        self
    }

    /// Builder-style variant of [`insert`](Self::insert) for a nested field.
    pub fn with_nested(mut self, name: impl Into<String>, spec: TypeSpec) -> Self {
        self.insert(name, TypeDescriptor::Nested(spec));
        self
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, d)| d)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeDescriptor)> {
        self.fields.iter().map(|(n, d)| (n.as_str(), d))
    }

    /// Scalar fields in declared order.
    pub fn scalar_fields(&self) -> impl Iterator<Item = (&str, &ScalarType)> {
        self.iter().filter_map(|(n, d)| d.as_scalar().map(|t| (n, t)))
    }

    /// Nested fields in declared order.
    pub fn nested_fields(&self) -> impl Iterator<Item = (&str, &TypeSpec)> {
        self.iter().filter_map(|(n, d)| d.as_nested().map(|s| (n, s)))
    }

    /// Nesting depth: 1 for a flat specification.
    pub fn depth(&self) -> usize {
        1 + self
            .nested_fields()
            .map(|(_, spec)| spec.depth())
            .max()
            .unwrap_or(0)
    }
}

impl Serialize for TypeSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, descriptor) in &self.fields {
            match descriptor {
                TypeDescriptor::Scalar(t) => map.serialize_entry(name, &t.to_string())?,
                TypeDescriptor::Nested(spec) => map.serialize_entry(name, spec)?,
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TypeSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // serde_yaml mappings keep insertion order for every input format
        let value = serde_yaml::Value::deserialize(deserializer)?;
        crate::import::TypeSpecImporter::new()
            .parse_value(&value)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vocabulary() {
        assert_eq!("text".parse::<ScalarType>().unwrap(), ScalarType::Text);
        assert_eq!("money".parse::<ScalarType>().unwrap(), ScalarType::Money);
        assert_eq!(" int ".parse::<ScalarType>().unwrap(), ScalarType::Int);
        assert_eq!(
            "smalldatetime[%Y-%m-%d %H:%M:%S]".parse::<ScalarType>().unwrap(),
            ScalarType::SmallDateTime {
                format: Some("%Y-%m-%d %H:%M:%S".to_string())
            }
        );
        assert_eq!(
            "datetime".parse::<ScalarType>().unwrap(),
            ScalarType::DateTime { format: None }
        );
    }

    #[test]
    fn test_unknown_and_invalid_tags() {
        assert_eq!(
            "uuid".parse::<ScalarType>(),
            Err(TagError::Unknown("uuid".to_string()))
        );
        assert_eq!(
            "uuid(4)".parse::<ScalarType>(),
            Err(TagError::Unknown("uuid".to_string()))
        );
        assert!(matches!(
            "varchar(0)".parse::<ScalarType>(),
            Err(TagError::Invalid { .. })
        ));
        assert!(matches!(
            "varchar".parse::<ScalarType>(),
            Err(TagError::Invalid { .. })
        ));
        assert!(matches!(
            "int(4)".parse::<ScalarType>(),
            Err(TagError::Invalid { .. })
        ));
        assert!(matches!(
            "datetime(3)".parse::<ScalarType>(),
            Err(TagError::Invalid { .. })
        ));
        assert!(matches!(
            "datetime[%Q]".parse::<ScalarType>(),
            Err(TagError::Invalid { .. })
        ));
        assert_eq!(
            "Varchar(10)".parse::<ScalarType>(),
            Err(TagError::Unknown("Varchar".to_string()))
        );
    }

    #[test]
    fn test_display_round_trips() {
        for tag in ["varchar(12)", "text", "bool", "date[%d/%m/%Y]", "smalldatetime"] {
            let parsed: ScalarType = tag.parse().unwrap();
            assert_eq!(parsed.to_string(), tag);
        }
    }

    #[test]
    fn test_spec_builder_keeps_order() {
        let spec = TypeSpec::new()
            .with_scalar("b", ScalarType::Int)
            .with_scalar("a", ScalarType::Text)
            .with_nested("items", TypeSpec::new().with_scalar("x", ScalarType::Bool))
            .with_scalar("b", ScalarType::Float);
        let names: Vec<&str> = spec.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a", "items"]);
        assert_eq!(spec.get("b").and_then(|d| d.as_scalar()), Some(&ScalarType::Float));
        assert_eq!(spec.depth(), 2);
        assert_eq!(spec.scalar_fields().count(), 2);
    }
}
