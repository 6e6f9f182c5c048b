//! Row converter
//!
//! Walks source records alongside a [`TypeSpec`], producing one flat row per
//! record and promoting lists under nested specifications into sub-tables.

use tracing::{debug, info, warn};

use super::address::{ResponseAddress, extract_records};
use super::classify::{ListShape, classify};
use super::coerce::{coerce_with, truncate};
use super::config::{ConverterConfig, ErrorPolicy};
use super::error::{CoercionError, ConversionError};
use crate::models::{
    Column, ConversionResult, ConvertedRow, ParentRef, RecordFailure, ScalarType, SourceValue,
    TypeSpec, TypedValue,
};

/// Longest raw value quoted in an error message, in characters
const MAX_REPORTED_VALUE_LENGTH: usize = 200;

/// Specification-driven converter from source records to typed row-sets.
///
/// The converter holds only its configuration; every call builds a fresh
/// [`ConversionResult`].
///
/// # Example
///
/// ```rust
/// use response_sql_sdk::convert::Converter;
/// use response_sql_sdk::import::TypeSpecImporter;
/// use response_sql_sdk::models::SourceValue;
///
/// let spec = TypeSpecImporter::new()
///     .import(r#"{"id": "varchar(3)", "purchaseHistory": {"cost": "money"}}"#)
///     .unwrap();
/// let record = SourceValue::from(serde_json::json!({
///     "id": "001",
///     "purchaseHistory": [{"cost": 1.2}, {"cost": 3.4}]
/// }));
///
/// let result = Converter::new().convert(&record, &spec, "customers").unwrap();
/// assert_eq!(result.rows("customers").len(), 1);
/// assert_eq!(result.rows("purchaseHistory").len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConverterConfig,
}

impl Converter {
    /// Create a converter with default configuration
    pub fn new() -> Self {
        Self::with_config(ConverterConfig::default())
    }

    /// Create a converter with custom configuration
    pub fn with_config(config: ConverterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Convert a single record into `table` and its sub-tables.
    ///
    /// Every table declared by `spec` is present in the result, even when it
    /// receives no rows.
    pub fn convert(
        &self,
        source: &SourceValue,
        spec: &TypeSpec,
        table: &str,
    ) -> Result<ConversionResult, ConversionError> {
        let mut result = self.declare(spec, table)?;
        self.convert_record(source, spec, table, None, 1, &mut result)?;
        Ok(result)
    }

    /// Convert a batch of records into one result.
    ///
    /// Each record is converted on its own and then merged, so a failing
    /// record never leaves partial rows behind. Failures abort the batch or
    /// are recorded in [`ConversionResult::failures`] according to
    /// [`ConverterConfig::on_error`].
    pub fn convert_batch<'a, I>(
        &self,
        sources: I,
        spec: &TypeSpec,
        table: &str,
    ) -> Result<ConversionResult, ConversionError>
    where
        I: IntoIterator<Item = &'a SourceValue>,
    {
        let template = self.declare(spec, table)?;
        let mut result = template.clone();
        let mut records = 0usize;

        for (index, source) in sources.into_iter().enumerate() {
            records += 1;
            let mut scratch = template.clone();
            let outcome = self
                .convert_record(source, spec, table, None, 1, &mut scratch)
                .and_then(|()| result.merge(scratch));

            if let Err(error) = outcome {
                match self.config.on_error {
                    ErrorPolicy::Abort => return Err(error),
                    ErrorPolicy::SkipRecord => {
                        warn!("Skipping record {} of table '{}': {}", index, table, error);
                        result.push_failure(RecordFailure { index, error });
                    }
                }
            }
        }

        info!(
            "Converted {} record(s) into {} table(s), {} row(s), {} skipped",
            records,
            result.tables().len(),
            result.total_rows(),
            result.failures().len()
        );
        Ok(result)
    }

    /// Extract the records at `address` from a raw response and convert them.
    pub fn convert_response(
        &self,
        response: &SourceValue,
        address: &ResponseAddress,
        spec: &TypeSpec,
        table: &str,
    ) -> Result<ConversionResult, ConversionError> {
        let records = extract_records(response, address)?;
        debug!("Found {} record(s) at {}", records.len(), address);
        self.convert_batch(records, spec, table)
    }

    /// Build an empty result holding every table `spec` declares.
    fn declare(&self, spec: &TypeSpec, table: &str) -> Result<ConversionResult, ConversionError> {
        let mut result = ConversionResult::new();
        self.declare_tables(spec, table, None, 1, &mut result)?;
        Ok(result)
    }

    fn declare_tables(
        &self,
        spec: &TypeSpec,
        table: &str,
        parent_table: Option<&str>,
        depth: usize,
        result: &mut ConversionResult,
    ) -> Result<(), ConversionError> {
        self.check_depth(table, depth)?;
        result.declare_table(table, parent_table, Column::from_spec(spec))?;
        debug!(
            "Declared table '{}' (depth {}, {} column(s))",
            table,
            depth,
            spec.scalar_fields().count()
        );
        for (field, sub_spec) in spec.nested_fields() {
            self.declare_tables(sub_spec, field, Some(table), depth + 1, result)?;
        }
        Ok(())
    }

    fn check_depth(&self, table: &str, depth: usize) -> Result<(), ConversionError> {
        if depth > self.config.max_depth {
            return Err(ConversionError::ExcessiveNesting {
                table: table.to_string(),
                depth,
                max: self.config.max_depth,
            });
        }
        Ok(())
    }

    fn convert_record(
        &self,
        source: &SourceValue,
        spec: &TypeSpec,
        table: &str,
        parent: Option<ParentRef>,
        depth: usize,
        result: &mut ConversionResult,
    ) -> Result<(), ConversionError> {
        self.check_depth(table, depth)?;
        let Some(object) = source.as_object() else {
            return Err(ConversionError::InvalidSource {
                table: table.to_string(),
                found: source.kind().to_string(),
            });
        };

        // Scalars first so the row exists before its children point at it
        let mut row = parent.map(ConvertedRow::with_parent).unwrap_or_default();
        for (field, tag) in spec.scalar_fields() {
            let value = object.get(field).unwrap_or(&SourceValue::Null);
            row.push(field, self.convert_scalar(value, tag, table, field)?);
        }

        let table_idx = result.declare_table(
            table,
            row.parent().map(|p| p.table.as_str()),
            Column::from_spec(spec),
        )?;
        let row_idx = result.push_row(table_idx, row);

        for (field, sub_spec) in spec.nested_fields() {
            match object.get(field) {
                Some(SourceValue::List(items)) => {
                    for item in items {
                        if !matches!(item, SourceValue::Object(_)) {
                            return Err(ConversionError::SpecificationMismatch {
                                table: table.to_string(),
                                field: field.to_string(),
                                reason: format!(
                                    "nested specification expects a list of objects, \
                                     found a {} element",
                                    item.kind()
                                ),
                            });
                        }
                        let link = ParentRef {
                            table: table.to_string(),
                            row: row_idx,
                        };
                        self.convert_record(item, sub_spec, field, Some(link), depth + 1, result)?;
                    }
                }
                None | Some(SourceValue::Null) => {}
                Some(other) => {
                    debug!(
                        "{}.{}: {} under a nested specification yields no sub-rows",
                        table,
                        field,
                        other.kind()
                    );
                }
            }
        }

        Ok(())
    }

    fn convert_scalar(
        &self,
        value: &SourceValue,
        tag: &ScalarType,
        table: &str,
        field: &str,
    ) -> Result<TypedValue, ConversionError> {
        let trim = self.config.trim_strings;
        let coerced = match value {
            SourceValue::List(items) => match classify(items) {
                ListShape::Consistent(keys) => {
                    let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
                    return Err(ConversionError::SpecificationMismatch {
                        table: table.to_string(),
                        field: field.to_string(),
                        reason: format!(
                            "list of objects with keys [{}] needs a nested specification, not '{}'",
                            keys.join(", "),
                            tag
                        ),
                    });
                }
                ListShape::Inconsistent if items.is_empty() => Ok(TypedValue::Null),
                ListShape::Inconsistent => {
                    let serialized = SourceValue::String(self.serialize_list(items));
                    coerce_with(&serialized, tag, trim)
                }
            },
            scalar_or_object => coerce_with(scalar_or_object, tag, trim),
        };
        coerced.map_err(|err| locate(err, table, field, value))
    }

    /// Join a list of scalars with the configured separator; lists holding
    /// lists or objects are written as JSON.
    fn serialize_list(&self, items: &[SourceValue]) -> String {
        if items.iter().all(SourceValue::is_scalar) {
            items
                .iter()
                .map(SourceValue::to_plain_string)
                .collect::<Vec<_>>()
                .join(&self.config.list_separator)
        } else {
            SourceValue::List(items.to_vec()).to_json_string()
        }
    }
}

fn locate(err: CoercionError, table: &str, field: &str, value: &SourceValue) -> ConversionError {
    let value = truncate(value.to_json_string(), MAX_REPORTED_VALUE_LENGTH);
    match err {
        CoercionError::Type { expected, reason } => ConversionError::TypeCoercion {
            table: table.to_string(),
            field: field.to_string(),
            value,
            expected,
            reason,
        },
        CoercionError::Date { format, reason } => ConversionError::DateParse {
            table: table.to_string(),
            field: field.to_string(),
            value,
            format,
            reason,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::TypeSpecImporter;
    use serde_json::json;

    fn spec(json: &str) -> TypeSpec {
        TypeSpecImporter::new().import(json).unwrap()
    }

    #[test]
    fn test_missing_fields_are_null_and_extra_fields_ignored() {
        let spec = spec(r#"{"id": "int", "name": "text"}"#);
        let record = SourceValue::from(json!({"id": 1, "unused": true}));
        let result = Converter::new().convert(&record, &spec, "t").unwrap();
        let row = &result.rows("t")[0];
        assert_eq!(row.field_names().collect::<Vec<_>>(), vec!["id", "name"]);
        assert_eq!(row.get("name"), Some(&TypedValue::Null));
        assert!(row.get("unused").is_none());
    }

    #[test]
    fn test_scalar_list_is_joined() {
        let spec = spec(r#"{"aliases": "varchar(100)"}"#);
        let record = SourceValue::from(json!({"aliases": ["johnny", "j"]}));
        let result = Converter::new().convert(&record, &spec, "people").unwrap();
        assert_eq!(
            result.rows("people")[0].get("aliases"),
            Some(&TypedValue::String("johnny,j".to_string()))
        );
    }

    #[test]
    fn test_mixed_list_is_serialized_as_json() {
        let spec = spec(r#"{"misc": "text"}"#);
        let record = SourceValue::from(json!({"misc": [1, {"a": 2}]}));
        let result = Converter::new().convert(&record, &spec, "t").unwrap();
        assert_eq!(
            result.rows("t")[0].get("misc"),
            Some(&TypedValue::String(r#"[1,{"a":2}]"#.to_string()))
        );
    }

    #[test]
    fn test_empty_list_under_scalar_is_null() {
        let spec = spec(r#"{"tags": "varchar(10)", "n": "int"}"#);
        let record = SourceValue::from(json!({"tags": [], "n": []}));
        let result = Converter::new().convert(&record, &spec, "t").unwrap();
        assert_eq!(result.rows("t")[0].get("tags"), Some(&TypedValue::Null));
        assert_eq!(result.rows("t")[0].get("n"), Some(&TypedValue::Null));
    }

    #[test]
    fn test_consistent_list_under_scalar_is_mismatch() {
        let spec = spec(r#"{"orders": "text"}"#);
        let record = SourceValue::from(json!({"orders": [{"id": 1}, {"id": 2}]}));
        let err = Converter::new().convert(&record, &spec, "t").unwrap_err();
        assert!(matches!(
            err,
            ConversionError::SpecificationMismatch { ref field, .. } if field == "orders"
        ));
    }

    #[test]
    fn test_scalar_list_under_nested_is_mismatch() {
        let spec = spec(r#"{"orders": {"id": "int"}}"#);
        let record = SourceValue::from(json!({"orders": [1, 2]}));
        let err = Converter::new().convert(&record, &spec, "t").unwrap_err();
        assert!(matches!(err, ConversionError::SpecificationMismatch { .. }));
    }

    #[test]
    fn test_nested_non_list_yields_no_rows() {
        let spec = spec(r#"{"id": "int", "orders": {"id": "int"}}"#);
        for record in [
            json!({"id": 1}),
            json!({"id": 1, "orders": {"id": 2}}),
            json!({"id": 1, "orders": null}),
        ] {
            let result = Converter::new()
                .convert(&SourceValue::from(record), &spec, "t")
                .unwrap();
            assert_eq!(result.rows("t").len(), 1);
            assert!(result.table("orders").unwrap().is_empty());
        }
    }

    #[test]
    fn test_coercion_error_carries_context() {
        let spec = spec(r#"{"age": "int"}"#);
        let record = SourceValue::from(json!({"age": "old"}));
        let err = Converter::new().convert(&record, &spec, "people").unwrap_err();
        assert_eq!(err.table(), Some("people"));
        assert_eq!(err.field(), Some("age"));
        match err {
            ConversionError::TypeCoercion { value, expected, .. } => {
                assert_eq!(value, r#""old""#);
                assert_eq!(expected, "int");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_object_record_rejected() {
        let spec = spec(r#"{"id": "int"}"#);
        let err = Converter::new()
            .convert(&SourceValue::from(json!([1])), &spec, "t")
            .unwrap_err();
        assert!(matches!(err, ConversionError::InvalidSource { .. }));
    }

    #[test]
    fn test_depth_cap() {
        let spec = spec(r#"{"a": {"b": {"c": "int"}}}"#);
        let converter = Converter::with_config(ConverterConfig::builder().max_depth(2).build());
        let err = converter
            .convert(&SourceValue::from(json!({})), &spec, "t")
            .unwrap_err();
        assert_eq!(
            err,
            ConversionError::ExcessiveNesting {
                table: "b".to_string(),
                depth: 3,
                max: 2
            }
        );
    }

    #[test]
    fn test_custom_list_separator() {
        let spec = spec(r#"{"aliases": "text"}"#);
        let converter =
            Converter::with_config(ConverterConfig::builder().list_separator(" | ").build());
        let record = SourceValue::from(json!({"aliases": ["a", 1, null, true]}));
        let result = converter.convert(&record, &spec, "t").unwrap();
        assert_eq!(
            result.rows("t")[0].get("aliases"),
            Some(&TypedValue::String("a | 1 |  | true".to_string()))
        );
    }
}
