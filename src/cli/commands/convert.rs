//! Convert command implementation

use std::path::PathBuf;

use tracing::{debug, info};

use super::{InputSource, load_input};
use crate::cli::error::CliError;
use crate::config::IntegrationConfig;
use crate::convert::{Converter, ResponseAddress, extract_records};
use crate::import::TypeSpecImporter;
use crate::models::{ConversionResult, SourceValue};

/// Arguments for the convert command
#[derive(Debug, Clone)]
pub struct ConvertArgs {
    /// Spec document; taken from the configured source when omitted
    pub spec: Option<PathBuf>,
    /// Top-level table name
    pub table: String,
    /// JSON response or JSON Lines of responses
    pub input: InputSource,
    /// Address of the records in each response; overrides the configured one
    pub records_at: Option<ResponseAddress>,
    /// Directory holding `.response-sql.toml`
    pub workspace: PathBuf,
    pub pretty: bool,
}

/// Parse a JSON document, falling back to JSON Lines.
pub fn parse_responses(content: &str) -> Result<Vec<SourceValue>, CliError> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(content) {
        return Ok(vec![SourceValue::from(value)]);
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(number, line)| {
            serde_json::from_str::<serde_json::Value>(line)
                .map(SourceValue::from)
                .map_err(|e| CliError::InvalidInput(format!("line {}: {}", number + 1, e)))
        })
        .collect()
}

/// Run a conversion and return its result
pub fn run_convert(args: &ConvertArgs) -> Result<ConversionResult, CliError> {
    let config = IntegrationConfig::load(&args.workspace)?;
    let source = config.source(&args.table);

    let spec = match (&args.spec, source) {
        (Some(path), _) => TypeSpecImporter::new()
            .with_max_depth(config.converter.max_depth)
            .load_file(path)?,
        (None, Some(source)) => config.load_spec(&args.workspace, source)?,
        (None, None) => {
            return Err(CliError::InvalidArgument(format!(
                "No --spec given and no source configured for table '{}'",
                args.table
            )));
        }
    };

    let address = args
        .records_at
        .clone()
        .or_else(|| source.map(|s| s.records_at.clone()))
        .unwrap_or_default();

    let responses = parse_responses(&load_input(&args.input)?)?;
    let mut records = Vec::new();
    for response in &responses {
        records.extend(extract_records(response, &address)?);
    }
    debug!(
        "Extracted {} record(s) from {} response(s) at {}",
        records.len(),
        responses.len(),
        address
    );

    let converter = Converter::with_config(config.converter.clone());
    let result = converter.convert_batch(records, &spec, &args.table)?;
    info!("Conversion of '{}' finished", args.table);
    Ok(result)
}

/// Handle the convert command
pub fn handle_convert(args: &ConvertArgs) -> Result<(), CliError> {
    let result = run_convert(args)?;

    let output = if args.pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    }
    .map_err(|e| CliError::SerializationError(e.to_string()))?;

    println!("{}", output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_responses_json_lines() {
        let responses = parse_responses("{\"id\": 1}\n\n{\"id\": 2}\n").unwrap();
        assert_eq!(responses.len(), 2);

        let responses = parse_responses("[{\"id\": 1}, {\"id\": 2}]").unwrap();
        assert_eq!(responses.len(), 1);

        let err = parse_responses("{\"id\": 1}\nnot json\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
