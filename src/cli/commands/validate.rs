//! Validate command implementation

use std::path::Path;

use tracing::warn;

use crate::cli::error::CliError;
use crate::import::TypeSpecImporter;
use crate::models::{Column, TypeSpec};
use crate::validation::input::{sanitize_sql_identifier, validate_table_name};

/// Describe the tables a spec produces, one block per table.
///
/// ```text
/// customers
///   [id] VARCHAR(3)
/// purchaseHistory (child of customers)
///   [cost] MONEY
/// ```
pub fn describe_spec(spec: &TypeSpec, table: &str) -> String {
    let mut out = String::new();
    describe_table(spec, table, None, &mut out);
    out
}

fn describe_table(spec: &TypeSpec, table: &str, parent: Option<&str>, out: &mut String) {
    if let Err(e) = validate_table_name(table) {
        warn!("Table name validation warning for '{}': {}", table, e);
    }

    match parent {
        Some(parent) => out.push_str(&format!("{} (child of {})\n", table, parent)),
        None => out.push_str(&format!("{}\n", table)),
    }
    for column in Column::from_spec(spec) {
        out.push_str(&format!(
            "  {} {}\n",
            sanitize_sql_identifier(&column.name, "mssql"),
            column.data_type
        ));
    }
    for (field, nested) in spec.nested_fields() {
        describe_table(nested, field, Some(table), out);
    }
}

/// Handle the validate command
pub fn handle_validate(spec_path: &Path, table: &str) -> Result<(), CliError> {
    if !spec_path.exists() {
        return Err(CliError::FileNotFound(spec_path.to_path_buf()));
    }
    let spec = TypeSpecImporter::new().load_file(spec_path)?;

    print!("{}", describe_spec(&spec, table));
    println!("Validation successful");
    Ok(())
}
