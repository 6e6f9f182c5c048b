//! Validation functionality
//!
//! Provides identifier and document-size checks used when loading specs.

pub mod input;

pub use input::{
    ValidationError, ValidationResult, sanitize_sql_identifier, validate_document_size,
    validate_field_name, validate_table_name,
};
