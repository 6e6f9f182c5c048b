//! OpenAPI importer
//!
//! Derives a [`TypeSpec`] from the JSON response schema of a `GET` operation
//! in an OpenAPI 3.x document (YAML or JSON).
//!
//! # Mapping
//!
//! | Schema | Tag |
//! |---|---|
//! | `string` + `format: date-time` (+ `pattern`) | `datetime` / `datetime[pattern]` |
//! | `string` + `format: date` (+ `pattern`) | `date` / `date[pattern]` |
//! | `string` + `maxLength: N` | `varchar(N)` |
//! | `string` | `text` |
//! | `boolean` | `bool` |
//! | `integer` | `int` |
//! | `number` | the `format` hint when it is a known tag, else `decimal` |
//! | `array` of objects | nested specification |
//! | anything else | `text` |
//!
//! Date patterns are strftime patterns, e.g. `%d/%m/%Y`.

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use serde_yaml::Value;
use tracing::{debug, warn};

use super::{SpecError, join_path, parse_tag};
use crate::convert::config::DEFAULT_MAX_DEPTH;
use crate::models::{ScalarType, TypeDescriptor, TypeSpec};
use crate::validation::input::{validate_document_size, validate_field_name};

/// Longest chain of `$ref`s followed before giving up
const MAX_REF_CHAIN: usize = 16;

/// OpenAPI response schema importer
#[derive(Debug, Clone)]
pub struct OpenAPISpecImporter {
    max_depth: usize,
}

impl Default for OpenAPISpecImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenAPISpecImporter {
    /// Create a new OpenAPISpecImporter
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the maximum nesting depth of the derived specification
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Derive the specification for the `GET` response of `path`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use response_sql_sdk::import::openapi::OpenAPISpecImporter;
    ///
    /// let doc = r#"
    /// openapi: 3.0.0
    /// paths:
    ///   /customers:
    ///     get:
    ///       responses:
    ///         200:
    ///           content:
    ///             application/json:
    ///               schema:
    ///                 type: array
    ///                 items:
    ///                   type: object
    ///                   properties:
    ///                     id: {type: string, maxLength: 3}
    ///                     active: {type: boolean}
    /// "#;
    /// let spec = OpenAPISpecImporter::new().import(doc, "/customers").unwrap();
    /// assert_eq!(spec.get("id").unwrap().as_scalar().unwrap().to_string(), "varchar(3)");
    /// ```
    pub fn import(&self, content: &str, path: &str) -> Result<TypeSpec, SpecError> {
        self.import_document(content, path).map_err(into_spec_error)
    }

    /// Load an OpenAPI document from disk and derive the specification for `path`.
    pub fn load_file(&self, file: impl AsRef<Path>, path: &str) -> Result<TypeSpec, SpecError> {
        let file = file.as_ref();
        self.load_document(file, path).map_err(into_spec_error)
    }

    fn load_document(&self, file: &Path, path: &str) -> Result<TypeSpec> {
        let metadata = std::fs::metadata(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        validate_document_size(metadata.len())?;
        let content = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        self.import_document(&content, path)
    }

    fn import_document(&self, content: &str, path: &str) -> Result<TypeSpec> {
        let document: Value =
            serde_yaml::from_str(content).context("Failed to parse OpenAPI document")?;
        let schema = response_schema(&document, path)?;
        let schema = resolve(&document, schema)?;

        // A list endpoint describes its records through `items`
        let record = if schema_type(schema) == Some("array") {
            let items = child(schema, "items")
                .ok_or_else(|| anyhow!("Array response of '{}' has no items schema", path))?;
            resolve(&document, items)?
        } else {
            schema
        };

        if !is_object_schema(record) {
            return Err(SpecError::InvalidStructure {
                path: "$".to_string(),
                reason: format!("response records of '{}' are not objects", path),
            }
            .into());
        }

        let spec = self.translate_object(&document, record, "", 1)?;
        debug!("Derived {} top-level field(s) from {}", spec.len(), path);
        Ok(spec)
    }

    fn translate_object(
        &self,
        document: &Value,
        schema: &Value,
        field_path: &str,
        depth: usize,
    ) -> Result<TypeSpec> {
        if depth > self.max_depth {
            return Err(SpecError::ExcessiveNesting {
                depth,
                max: self.max_depth,
            }
            .into());
        }

        let mut spec = TypeSpec::new();
        let Some(Value::Mapping(properties)) = child(schema, "properties") else {
            return Ok(spec);
        };

        for (key, property) in properties {
            let Some(name) = key.as_str() else {
                continue;
            };
            let path = join_path(field_path, name);
            if let Err(e) = validate_field_name(name) {
                warn!("Field name validation warning for '{}': {}", path, e);
            }

            let property = resolve(document, property)
                .with_context(|| format!("Failed to resolve schema of '{}'", path))?;
            let descriptor = self.translate_property(document, property, &path, depth)?;
            spec.insert(name, descriptor);
        }

        Ok(spec)
    }

    fn translate_property(
        &self,
        document: &Value,
        schema: &Value,
        path: &str,
        depth: usize,
    ) -> Result<TypeDescriptor> {
        let format = child(schema, "format").and_then(Value::as_str);
        let pattern = child(schema, "pattern").and_then(Value::as_str);

        let scalar = match schema_type(schema) {
            Some("string") => match (format, pattern) {
                (Some("date-time"), Some(pattern)) => {
                    parse_tag(&format!("datetime[{}]", pattern), path)?
                }
                (Some("date-time"), None) => ScalarType::DateTime { format: None },
                (Some("date"), Some(pattern)) => parse_tag(&format!("date[{}]", pattern), path)?,
                (Some("date"), None) => ScalarType::Date { format: None },
                _ => match child(schema, "maxLength").and_then(Value::as_u64) {
                    Some(max_length) if max_length > 0 => ScalarType::Varchar {
                        max_length: max_length as usize,
                    },
                    _ => ScalarType::Text,
                },
            },
            Some("boolean") => ScalarType::Bool,
            Some("integer") => ScalarType::Int,
            Some("number") => format
                .filter(|hint| ScalarType::is_known_name(hint))
                .and_then(|hint| hint.parse::<ScalarType>().ok())
                .unwrap_or(ScalarType::Decimal),
            Some("array") => {
                if let Some(items) = child(schema, "items") {
                    let items = resolve(document, items)?;
                    if is_object_schema(items) {
                        let nested = self.translate_object(document, items, path, depth + 1)?;
                        return Ok(TypeDescriptor::Nested(nested));
                    }
                }
                ScalarType::Text
            }
            _ => ScalarType::Text,
        };

        debug!("{} -> {}", path, scalar);
        Ok(TypeDescriptor::Scalar(scalar))
    }
}

/// Locate `paths.<path>.get.responses.200.content.application/json.schema`.
fn response_schema<'a>(document: &'a Value, path: &str) -> Result<&'a Value> {
    let operation = child(document, "paths")
        .and_then(|paths| child(paths, path))
        .and_then(|item| child(item, "get"))
        .ok_or_else(|| anyhow!("No GET operation for path '{}'", path))?;

    child(operation, "responses")
        .and_then(|responses| child(responses, "200"))
        .and_then(|response| child(response, "content"))
        .and_then(|content| child(content, "application/json"))
        .and_then(|media| child(media, "schema"))
        .ok_or_else(|| anyhow!("GET '{}' has no 200 application/json response schema", path))
}

/// Follow local `$ref`s until a concrete schema is reached.
fn resolve<'a>(document: &'a Value, schema: &'a Value) -> Result<&'a Value> {
    let mut current = schema;
    for _ in 0..MAX_REF_CHAIN {
        let Some(reference) = child(current, "$ref").and_then(Value::as_str) else {
            return Ok(current);
        };
        let Some(pointer) = reference.strip_prefix("#/") else {
            bail!("Only local references are supported, found '{}'", reference);
        };
        current = pointer
            .split('/')
            .map(|token| token.replace("~1", "/").replace("~0", "~"))
            .try_fold(document, |node, token| child(node, &token))
            .ok_or_else(|| anyhow!("Unresolved reference '{}'", reference))?;
    }
    bail!("Reference chain longer than {} starting at {:?}", MAX_REF_CHAIN, child(schema, "$ref"))
}

/// Mapping lookup that also matches numeric keys, so YAML `200:` and JSON
/// `"200":` behave the same.
fn child<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let Value::Mapping(mapping) = value else {
        return None;
    };
    mapping.iter().find_map(|(k, v)| match k {
        Value::String(s) if s == key => Some(v),
        Value::Number(n) if n.to_string() == key => Some(v),
        _ => None,
    })
}

/// The schema's type; OpenAPI 3.1 type lists pick their first non-null entry.
fn schema_type(schema: &Value) -> Option<&str> {
    match child(schema, "type")? {
        Value::String(s) => Some(s.as_str()),
        Value::Sequence(types) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null"),
        _ => None,
    }
}

fn is_object_schema(schema: &Value) -> bool {
    match schema_type(schema) {
        Some("object") => true,
        None => child(schema, "properties").is_some(),
        Some(_) => false,
    }
}

fn into_spec_error(err: anyhow::Error) -> SpecError {
    match err.downcast::<SpecError>() {
        Ok(spec_error) => spec_error,
        Err(other) => SpecError::Parse(format!("{:#}", other)),
    }
}
