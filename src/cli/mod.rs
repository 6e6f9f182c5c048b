//! Command line interface for the `response-sql` binary

pub mod commands;
pub mod error;

pub use error::CliError;
