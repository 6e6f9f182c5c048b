//! Converted rows, table row-sets and conversion results

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer, ser::SerializeMap};
use std::collections::HashMap;

use super::column::Column;
use crate::convert::ConversionError;

/// A typed scalar produced by coercion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    /// Field absent from the source or explicitly null
    Null,
    String(String),
    Int(i64),
    Float(f64),
    /// Exact decimal, serialized as a string to keep its precision
    Decimal(Decimal),
    Bool(bool),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
}

impl TypedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, TypedValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            TypedValue::Decimal(d) => Some(*d),
            _ => None,
        }
    }
}

/// Link from a sub-table row to the row it was extracted from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParentRef {
    /// Name of the parent table
    pub table: String,
    /// Index of the parent row inside the parent row-set
    pub row: usize,
}

/// One flat row: scalar field values in specification order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ConvertedRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<ParentRef>,
    #[serde(serialize_with = "serialize_ordered")]
    values: Vec<(String, TypedValue)>,
}

fn serialize_ordered<S: Serializer>(
    values: &[(String, TypedValue)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(values.len()))?;
    for (name, value) in values {
        map.serialize_entry(name, value)?;
    }
    map.end()
}

impl ConvertedRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(parent: ParentRef) -> Self {
        Self {
            parent: Some(parent),
            values: Vec::new(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: TypedValue) {
        self.values.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Field names in specification order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(n, _)| n.as_str())
    }

    pub fn values(&self) -> &[(String, TypedValue)] {
        &self.values
    }

    pub fn parent(&self) -> Option<&ParentRef> {
        self.parent.as_ref()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Rows of a single generated table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRowSet {
    /// Table name: the caller-supplied top-level name or the nested field name
    pub name: String,
    /// Table this one was promoted out of, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_table: Option<String>,
    /// Scalar columns in specification order
    pub columns: Vec<Column>,
    pub rows: Vec<ConvertedRow>,
}

impl TableRowSet {
    pub fn new(
        name: impl Into<String>,
        parent_table: Option<String>,
        columns: Vec<Column>,
    ) -> Self {
        Self {
            name: name.into(),
            parent_table,
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether a table declared as `parent_table` / `columns` may share these rows.
    fn accepts(&self, parent_table: Option<&str>, columns: &[Column]) -> bool {
        self.parent_table.as_deref() == parent_table && self.columns == columns
    }
}

/// A record dropped from a batch under the `skip_record` policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordFailure {
    /// Position of the record in the batch
    pub index: usize,
    #[serde(serialize_with = "serialize_display")]
    pub error: ConversionError,
}

fn serialize_display<S: Serializer>(
    error: &ConversionError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Forest of row-sets produced by one conversion call.
///
/// Row-sets are kept in the order their tables were first declared: the
/// top-level table first, then sub-tables depth-first in specification order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ConversionResult {
    tables: Vec<TableRowSet>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<RecordFailure>,
}

impl ConversionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, name: &str) -> Option<&TableRowSet> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn tables(&self) -> &[TableRowSet] {
        &self.tables
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }

    pub fn into_tables(self) -> Vec<TableRowSet> {
        self.tables
    }

    /// Rows of a table, empty when the table does not exist.
    pub fn rows(&self, table: &str) -> &[ConvertedRow] {
        self.table(table).map(|t| t.rows.as_slice()).unwrap_or(&[])
    }

    /// Total number of rows across all tables.
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(TableRowSet::len).sum()
    }

    /// Records skipped by a batch conversion.
    pub fn failures(&self) -> &[RecordFailure] {
        &self.failures
    }

    pub(crate) fn push_failure(&mut self, failure: RecordFailure) {
        self.failures.push(failure);
    }

    /// Register a table, or check that an existing table of that name has
    /// the same parent table and columns.
    ///
    /// Returns the position of the table.
    pub(crate) fn declare_table(
        &mut self,
        name: &str,
        parent_table: Option<&str>,
        columns: Vec<Column>,
    ) -> Result<usize, ConversionError> {
        if let Some(idx) = self.tables.iter().position(|t| t.name == name) {
            if !self.tables[idx].accepts(parent_table, &columns) {
                return Err(ConversionError::TableNameConflict {
                    table: name.to_string(),
                });
            }
            return Ok(idx);
        }
        self.tables.push(TableRowSet::new(
            name,
            parent_table.map(str::to_string),
            columns,
        ));
        Ok(self.tables.len() - 1)
    }

    /// Append a row to the table at `table_idx`, returning the row index.
    pub(crate) fn push_row(&mut self, table_idx: usize, row: ConvertedRow) -> usize {
        let rows = &mut self.tables[table_idx].rows;
        rows.push(row);
        rows.len() - 1
    }

    /// Append all row-sets of `other`, merging tables by name.
    ///
    /// Parent references of the appended rows are re-based onto the rows
    /// already present in `self`. On error `self` is left unchanged.
    pub fn merge(&mut self, other: ConversionResult) -> Result<(), ConversionError> {
        for table in &other.tables {
            if let Some(existing) = self.table(&table.name)
                && !existing.accepts(table.parent_table.as_deref(), &table.columns)
            {
                return Err(ConversionError::TableNameConflict {
                    table: table.name.clone(),
                });
            }
        }

        let offsets: HashMap<String, usize> = self
            .tables
            .iter()
            .map(|t| (t.name.clone(), t.rows.len()))
            .collect();

        for table in other.tables {
            let idx = match self.tables.iter().position(|t| t.name == table.name) {
                Some(idx) => idx,
                None => {
                    self.tables.push(TableRowSet::new(
                        table.name.clone(),
                        table.parent_table.clone(),
                        table.columns.clone(),
                    ));
                    self.tables.len() - 1
                }
            };
            for mut row in table.rows {
                if let Some(parent) = row.parent.as_mut() {
                    parent.row += offsets.get(&parent.table).copied().unwrap_or(0);
                }
                self.tables[idx].rows.push(row);
            }
        }

        self.failures.extend(other.failures);
        Ok(())
    }
}
