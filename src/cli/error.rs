//! CLI-specific error types

use crate::config::ConfigError;
use crate::convert::ConversionError;
use crate::import::SpecError;
use std::path::PathBuf;
use thiserror::Error;

/// CLI-specific error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read file {0}: {1}")]
    FileReadError(PathBuf, String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Specification error: {0}")]
    SpecError(#[from] SpecError),

    #[error("Conversion error: {0}")]
    ConversionError(#[from] ConversionError),

    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}
