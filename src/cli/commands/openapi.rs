//! OpenAPI command implementation

use std::path::Path;

use crate::cli::error::CliError;
use crate::import::openapi::OpenAPISpecImporter;

/// Derive a spec document (YAML) from an OpenAPI document
pub fn derive_spec_yaml(document: &Path, path: &str) -> Result<String, CliError> {
    if !document.exists() {
        return Err(CliError::FileNotFound(document.to_path_buf()));
    }
    let spec = OpenAPISpecImporter::new().load_file(document, path)?;
    serde_yaml::to_string(&spec).map_err(|e| CliError::SerializationError(e.to_string()))
}

/// Handle the openapi command
pub fn handle_openapi(document: &Path, path: &str) -> Result<(), CliError> {
    print!("{}", derive_spec_yaml(document, path)?);
    Ok(())
}
