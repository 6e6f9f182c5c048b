//! Input validation and sanitization utilities.
//!
//! Table names come from callers and field names come straight from spec
//! documents, and both end up as SQL identifiers on the integrator side. The
//! importer and the CLI run them through these checks; a failed check is
//! reported as a warning, never as a hard error, because a source API's field
//! names are not under the caller's control.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length for table names
pub const MAX_TABLE_NAME_LENGTH: usize = 128;

/// Maximum length for field (column) names
pub const MAX_FIELD_NAME_LENGTH: usize = 128;

/// Maximum file size for spec and OpenAPI documents (5MB)
pub const MAX_DOCUMENT_SIZE: u64 = 5 * 1024 * 1024;

/// Errors that can occur during input validation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ValidationError {
    /// Input is empty when a value is required
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    /// Input exceeds maximum allowed length
    #[error("{field} exceeds maximum length (max: {max}, got: {actual})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    /// Input contains invalid characters
    #[error("{field} contains invalid characters: {reason}")]
    InvalidCharacters { field: &'static str, reason: String },

    /// Input has invalid format
    #[error("{0}: {1}")]
    InvalidFormat(&'static str, String),

    /// Input is a reserved word
    #[error("{field} cannot be a reserved word: {word}")]
    ReservedWord { field: &'static str, word: String },
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a table name.
///
/// # Rules
///
/// - Must not be empty
/// - Must not exceed 128 characters
/// - Must start with a letter or underscore
/// - May contain letters, digits, underscores, and hyphens
/// - Cannot be a SQL reserved word
///
/// # Examples
///
/// ```
/// use response_sql_sdk::validation::input::validate_table_name;
///
/// assert!(validate_table_name("customers").is_ok());
/// assert!(validate_table_name("purchaseHistory").is_ok());
/// assert!(validate_table_name("").is_err());
/// assert!(validate_table_name("order").is_err());
/// ```
pub fn validate_table_name(name: &str) -> ValidationResult<()> {
    validate_identifier(name, "table name", MAX_TABLE_NAME_LENGTH)
}

/// Validate a field name from a spec document.
///
/// Same rules as [`validate_table_name`]; a nested field name doubles as the
/// name of its sub-table.
///
/// # Examples
///
/// ```
/// use response_sql_sdk::validation::input::validate_field_name;
///
/// assert!(validate_field_name("customerId").is_ok());
/// assert!(validate_field_name("first name").is_err());
/// ```
pub fn validate_field_name(name: &str) -> ValidationResult<()> {
    validate_identifier(name, "field name", MAX_FIELD_NAME_LENGTH)
}

fn validate_identifier(name: &str, field: &'static str, max: usize) -> ValidationResult<()> {
    let Some(first_char) = name.chars().next() else {
        return Err(ValidationError::Empty(field));
    };

    let length = name.chars().count();
    if length > max {
        return Err(ValidationError::TooLong {
            field,
            max,
            actual: length,
        });
    }

    if !first_char.is_alphabetic() && first_char != '_' {
        return Err(ValidationError::InvalidFormat(
            field,
            "must start with a letter or underscore".to_string(),
        ));
    }

    if let Some(c) = name
        .chars()
        .find(|c| !c.is_alphanumeric() && *c != '_' && *c != '-')
    {
        return Err(ValidationError::InvalidCharacters {
            field,
            reason: format!("invalid character: '{}'", c),
        });
    }

    if is_sql_reserved_word(name) {
        return Err(ValidationError::ReservedWord {
            field,
            word: name.to_string(),
        });
    }

    Ok(())
}

/// Validate the size of a spec or OpenAPI document before reading it.
pub fn validate_document_size(file_size: u64) -> ValidationResult<()> {
    if file_size > MAX_DOCUMENT_SIZE {
        return Err(ValidationError::TooLong {
            field: "document size",
            max: MAX_DOCUMENT_SIZE as usize,
            actual: file_size as usize,
        });
    }
    Ok(())
}

/// Sanitize a SQL identifier by quoting it.
///
/// # Examples
///
/// ```
/// use response_sql_sdk::validation::input::sanitize_sql_identifier;
///
/// assert_eq!(sanitize_sql_identifier("users", "postgres"), "\"users\"");
/// assert_eq!(sanitize_sql_identifier("order", "mssql"), "[order]");
/// assert_eq!(sanitize_sql_identifier("a]b", "mssql"), "[a]]b]");
/// ```
pub fn sanitize_sql_identifier(name: &str, dialect: &str) -> String {
    let (open, close) = match dialect.to_lowercase().as_str() {
        "mysql" | "mariadb" => ('`', '`'),
        "sqlserver" | "mssql" => ('[', ']'),
        _ => ('"', '"'),
    };

    // Doubling the closing quote escapes it in every supported dialect
    let escaped = name.replace(close, &format!("{}{}", close, close));
    format!("{}{}{}", open, escaped, close)
}

/// Check if a word is a SQL reserved word (case-insensitive).
///
/// This is a basic check covering common reserved words across SQL dialects.
pub fn is_sql_reserved_word(word: &str) -> bool {
    const RESERVED_WORDS: &[&str] = &[
        "add", "all", "alter", "and", "as", "asc", "begin", "between", "by", "case", "check",
        "column", "commit", "constraint", "create", "cross", "database", "default", "delete",
        "desc", "distinct", "drop", "else", "end", "exists", "foreign", "from", "full", "grant",
        "group", "having", "in", "index", "inner", "insert", "into", "is", "join", "key", "left",
        "like", "limit", "not", "null", "offset", "on", "or", "order", "outer", "primary",
        "references", "revoke", "right", "rollback", "select", "set", "table", "then", "to",
        "transaction", "union", "unique", "update", "user", "using", "values", "view", "when",
        "where",
    ];

    let lower = word.to_lowercase();
    RESERVED_WORDS.contains(&lower.as_str())
}
