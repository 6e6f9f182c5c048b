//! Error types for conversion

use thiserror::Error;

/// Coercion failure without table/field context.
///
/// The converter wraps it into a [`ConversionError`] carrying the location
/// and the offending raw value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoercionError {
    /// Value cannot be represented as the target type
    #[error("cannot convert to {expected}: {reason}")]
    Type { expected: String, reason: String },

    /// String does not match the date pattern
    #[error("does not match date format '{format}': {reason}")]
    Date { format: String, reason: String },
}

/// Errors that can occur while converting source records
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// A value could not be coerced to its declared type
    #[error("{table}.{field}: cannot convert {value} to {expected}: {reason}")]
    TypeCoercion {
        table: String,
        field: String,
        value: String,
        expected: String,
        reason: String,
    },

    /// A date string did not match its declared pattern
    #[error("{table}.{field}: {value} does not match date format '{format}': {reason}")]
    DateParse {
        table: String,
        field: String,
        value: String,
        format: String,
        reason: String,
    },

    /// Declared type and observed list shape disagree
    #[error("{table}.{field}: specification mismatch: {reason}")]
    SpecificationMismatch {
        table: String,
        field: String,
        reason: String,
    },

    /// Nested tables exceed the configured recursion cap
    #[error("{table}: maximum nesting depth exceeded: {depth} > {max}")]
    ExcessiveNesting {
        table: String,
        depth: usize,
        max: usize,
    },

    /// A record is not an object
    #[error("{table}: expected an object record, found {found}")]
    InvalidSource { table: String, found: String },

    /// Two different specifications produce a table with the same name
    #[error("table '{table}' is declared twice with different columns")]
    TableNameConflict { table: String },

    /// Response data address does not resolve
    #[error("response address {address} not found: {reason}")]
    AddressNotFound { address: String, reason: String },
}

impl ConversionError {
    /// Table the error was raised for, when it relates to a single table.
    pub fn table(&self) -> Option<&str> {
        match self {
            ConversionError::TypeCoercion { table, .. }
            | ConversionError::DateParse { table, .. }
            | ConversionError::SpecificationMismatch { table, .. }
            | ConversionError::ExcessiveNesting { table, .. }
            | ConversionError::InvalidSource { table, .. }
            | ConversionError::TableNameConflict { table } => Some(table),
            ConversionError::AddressNotFound { .. } => None,
        }
    }

    /// Field the error was raised for, for per-field errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            ConversionError::TypeCoercion { field, .. }
            | ConversionError::DateParse { field, .. }
            | ConversionError::SpecificationMismatch { field, .. } => Some(field),
            _ => None,
        }
    }
}
