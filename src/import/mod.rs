//! Import functionality
//!
//! Loads type specifications from documents:
//! - JSON or YAML spec documents mapping field names to type tags or nested
//!   mappings ([`TypeSpecImporter`])
//! - OpenAPI 3.x response schemas ([`openapi::OpenAPISpecImporter`])
//!
//! Every tag is parsed here, so a malformed document is rejected before any
//! record is converted.

#[cfg(feature = "openapi")]
pub mod openapi;

use std::path::Path;

use serde_yaml::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::convert::config::DEFAULT_MAX_DEPTH;
use crate::models::{ScalarType, TagError, TypeDescriptor, TypeSpec};
use crate::validation::input::{validate_document_size, validate_field_name};

/// Error raised while loading a type specification.
///
/// Paths are dotted field paths from the document root, e.g.
/// `purchaseHistory.cost`; `$` is the root itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpecError {
    #[error("Unknown type '{tag}' for field '{path}'")]
    UnknownType { path: String, tag: String },

    #[error("Invalid type tag '{tag}' for field '{path}': {reason}")]
    InvalidTag {
        path: String,
        tag: String,
        reason: String,
    },

    #[error("Invalid specification at '{path}': {reason}")]
    InvalidStructure { path: String, reason: String },

    #[error("Specification nesting depth {depth} exceeds maximum {max}")]
    ExcessiveNesting { depth: usize, max: usize },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl SpecError {
    /// Dotted path of the offending field, if the error has one.
    pub fn path(&self) -> Option<&str> {
        match self {
            SpecError::UnknownType { path, .. }
            | SpecError::InvalidTag { path, .. }
            | SpecError::InvalidStructure { path, .. } => Some(path),
            SpecError::ExcessiveNesting { .. } | SpecError::Parse(_) => None,
        }
    }
}

/// Type specification importer
///
/// Parses JSON or YAML documents into a [`TypeSpec`], keeping the declared
/// field order.
#[derive(Debug, Clone)]
pub struct TypeSpecImporter {
    max_depth: usize,
}

impl Default for TypeSpecImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeSpecImporter {
    /// Create a new importer with the default nesting limit
    ///
    /// # Example
    ///
    /// ```rust
    /// use response_sql_sdk::import::TypeSpecImporter;
    ///
    /// let spec = TypeSpecImporter::new()
    ///     .import("id: varchar(3)\nname: varchar(20)\n")
    ///     .unwrap();
    /// assert_eq!(spec.len(), 2);
    /// ```
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the maximum nesting depth (the root mapping is depth 1)
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Import a spec document; JSON documents are accepted as YAML.
    pub fn import(&self, content: &str) -> Result<TypeSpec, SpecError> {
        let value: Value =
            serde_yaml::from_str(content).map_err(|e| SpecError::Parse(e.to_string()))?;
        self.parse_value(&value)
    }

    /// Load and import a spec document from disk.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<TypeSpec, SpecError> {
        let path = path.as_ref();
        let read_error = |e: std::io::Error| {
            SpecError::Parse(format!("Failed to read {}: {}", path.display(), e))
        };

        let metadata = std::fs::metadata(path).map_err(read_error)?;
        validate_document_size(metadata.len()).map_err(|e| SpecError::Parse(e.to_string()))?;
        let content = std::fs::read_to_string(path).map_err(read_error)?;

        debug!("Loading type specification from {}", path.display());
        self.import(&content)
    }

    /// Convert an already parsed document into a [`TypeSpec`].
    pub fn parse_value(&self, value: &Value) -> Result<TypeSpec, SpecError> {
        let spec = self.parse_mapping(value, "", 1)?;
        if spec.is_empty() {
            return Err(SpecError::InvalidStructure {
                path: "$".to_string(),
                reason: "specification declares no fields".to_string(),
            });
        }
        Ok(spec)
    }

    fn parse_mapping(
        &self,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> Result<TypeSpec, SpecError> {
        if depth > self.max_depth {
            return Err(SpecError::ExcessiveNesting {
                depth,
                max: self.max_depth,
            });
        }

        let Value::Mapping(mapping) = value else {
            return Err(SpecError::InvalidStructure {
                path: display_path(path),
                reason: format!("expected a mapping, found {}", yaml_kind(value)),
            });
        };

        let mut spec = TypeSpec::new();
        for (key, entry) in mapping {
            let Value::String(name) = key else {
                return Err(SpecError::InvalidStructure {
                    path: display_path(path),
                    reason: format!("field names must be strings, found {}", yaml_kind(key)),
                });
            };
            let field_path = join_path(path, name);

            if let Err(e) = validate_field_name(name) {
                warn!("Field name validation warning for '{}': {}", field_path, e);
            }

            let descriptor = match entry {
                Value::String(tag) => TypeDescriptor::Scalar(parse_tag(tag, &field_path)?),
                Value::Mapping(_) => {
                    TypeDescriptor::Nested(self.parse_mapping(entry, &field_path, depth + 1)?)
                }
                other => {
                    return Err(SpecError::InvalidStructure {
                        path: field_path,
                        reason: format!(
                            "expected a type tag or a nested mapping, found {}",
                            yaml_kind(other)
                        ),
                    });
                }
            };
            spec.insert(name.clone(), descriptor);
        }

        Ok(spec)
    }
}

/// Parse a single tag, attaching the field path to any error.
pub(crate) fn parse_tag(tag: &str, path: &str) -> Result<ScalarType, SpecError> {
    tag.parse::<ScalarType>().map_err(|e| match e {
        TagError::Unknown(_) => SpecError::UnknownType {
            path: path.to_string(),
            tag: tag.to_string(),
        },
        TagError::Invalid { reason, .. } => SpecError::InvalidTag {
            path: path.to_string(),
            tag: tag.to_string(),
            reason,
        },
    })
}

pub(crate) fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "$".to_string()
    } else {
        path.to_string()
    }
}

fn yaml_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_keeps_declared_order() {
        let spec = TypeSpecImporter::new()
            .import(r#"{"zeta": "int", "alpha": "text", "mid": {"b": "bool", "a": "float"}}"#)
            .unwrap();
        let names: Vec<&str> = spec.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);

        let nested = spec.get("mid").and_then(TypeDescriptor::as_nested).unwrap();
        let names: Vec<&str> = nested.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_unknown_type_reports_path() {
        let err = TypeSpecImporter::new()
            .import("orders:\n  id: int\n  ref: uuid\n")
            .unwrap_err();
        assert_eq!(
            err,
            SpecError::UnknownType {
                path: "orders.ref".to_string(),
                tag: "uuid".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_tag() {
        let err = TypeSpecImporter::new()
            .import(r#"{"name": "varchar(0)"}"#)
            .unwrap_err();
        assert!(matches!(err, SpecError::InvalidTag { ref path, .. } if path == "name"));
    }

    #[test]
    fn test_invalid_structure() {
        let importer = TypeSpecImporter::new();
        for doc in ["[1, 2]", "id: 3", "id:", "{}", "id: [int]"] {
            let err = importer.import(doc).unwrap_err();
            assert!(
                matches!(err, SpecError::InvalidStructure { .. }),
                "{doc} gave {err:?}"
            );
        }
        assert_eq!(importer.import("id: 3").unwrap_err().path(), Some("id"));
        assert_eq!(importer.import("[1]").unwrap_err().path(), Some("$"));
    }

    #[test]
    fn test_parse_error() {
        let err = TypeSpecImporter::new().import("id: int\nid: text\n").unwrap_err();
        assert!(matches!(err, SpecError::Parse(_)));
    }

    #[test]
    fn test_nesting_limit() {
        let doc = r#"{"a": {"b": {"c": "int"}}}"#;
        assert!(TypeSpecImporter::new().with_max_depth(3).import(doc).is_ok());
        assert_eq!(
            TypeSpecImporter::new().with_max_depth(2).import(doc).unwrap_err(),
            SpecError::ExcessiveNesting { depth: 3, max: 2 }
        );
    }
}
