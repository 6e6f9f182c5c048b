//! Column model for converted row-sets

use serde::{Deserialize, Serialize};

use super::type_spec::{ScalarType, TypeSpec};

/// Column model describing one scalar field of a generated table
///
/// Columns are derived from a [`TypeSpec`] and travel with every
/// [`TableRowSet`](super::TableRowSet) so that the integrator can create the
/// target table without re-reading the specification.
///
/// # Example
///
/// ```rust
/// use response_sql_sdk::models::{Column, ScalarType};
///
/// let column = Column::new("cost".to_string(), ScalarType::Money);
/// assert_eq!(column.data_type, "MONEY");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Column {
    /// Column name (the field name in the specification)
    pub name: String,
    /// SQL data type (e.g., "VARCHAR(100)", "SMALLDATETIME")
    pub data_type: String,
    /// Scalar type tag the column was declared with
    pub tag: ScalarType,
    /// Whether the column allows NULL values (default: true)
    #[serde(default = "default_true")]
    pub nullable: bool,
    /// Position of the column in the declared specification
    #[serde(default)]
    pub column_order: i32,
}

fn default_true() -> bool {
    true
}

impl Column {
    /// Create a new nullable column for the given scalar type
    pub fn new(name: String, tag: ScalarType) -> Self {
        Self {
            name,
            data_type: tag.sql_type(),
            tag,
            nullable: true,
            column_order: 0,
        }
    }

    /// Columns for the scalar fields of a specification, in declared order
    pub fn from_spec(spec: &TypeSpec) -> Vec<Column> {
        spec.scalar_fields()
            .enumerate()
            .map(|(idx, (name, tag))| Column {
                column_order: idx as i32,
                ..Column::new(name.to_string(), tag.clone())
            })
            .collect()
    }
}
