//! CLI command implementations

pub mod convert;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod validate;

use crate::cli::error::CliError;
use std::io::{self, Read};
use std::path::PathBuf;

/// Input source for commands reading documents
#[derive(Debug, Clone)]
pub enum InputSource {
    File(PathBuf),
    Stdin,
    String(String),
}

impl InputSource {
    /// `-` reads stdin, anything else is a file path
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            InputSource::Stdin
        } else {
            InputSource::File(PathBuf::from(arg))
        }
    }
}

/// Load input content from InputSource
pub fn load_input(input: &InputSource) -> Result<String, CliError> {
    match input {
        InputSource::File(path) => {
            if !path.exists() {
                return Err(CliError::FileNotFound(path.clone()));
            }
            std::fs::read_to_string(path)
                .map_err(|e| CliError::FileReadError(path.clone(), e.to_string()))
        }
        InputSource::Stdin => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| CliError::InvalidArgument(format!("Failed to read stdin: {}", e)))?;
            Ok(buffer)
        }
        InputSource::String(content) => Ok(content.clone()),
    }
}
