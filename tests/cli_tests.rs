//! CLI command tests

#![cfg(feature = "cli")]

use response_sql_sdk::cli::CliError;
use response_sql_sdk::cli::commands::InputSource;
use response_sql_sdk::cli::commands::convert::{ConvertArgs, handle_convert, run_convert};
use response_sql_sdk::cli::commands::validate::handle_validate;
use response_sql_sdk::config::{IntegrationConfig, SourceConfig};
use response_sql_sdk::models::TypedValue;
use std::io::Write;
use std::path::PathBuf;
use tempfile::{NamedTempFile, tempdir};

fn spec_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"id: varchar(3)
aliases: varchar(100)
purchaseHistory:
  cost: money"#
    )
    .unwrap();
    file.flush().unwrap();
    file
}

fn args(spec: Option<PathBuf>, input: &str, workspace: PathBuf) -> ConvertArgs {
    ConvertArgs {
        spec,
        table: "customers".to_string(),
        input: InputSource::String(input.to_string()),
        records_at: None,
        workspace,
        pretty: false,
    }
}

#[test]
fn test_cli_convert_json_document() {
    let spec = spec_file();
    let dir = tempdir().unwrap();
    let mut args = args(
        Some(spec.path().to_path_buf()),
        &serde_json::json!({"data": [{
            "id": "001",
            "aliases": ["johnny", "j"],
            "purchaseHistory": [{"cost": 1.2}]
        }]})
        .to_string(),
        dir.path().to_path_buf(),
    );
    args.records_at = Some("data".parse().unwrap());

    let result = run_convert(&args).unwrap();
    assert_eq!(
        result.rows("customers")[0].get("aliases"),
        Some(&TypedValue::String("johnny,j".into()))
    );
    assert_eq!(result.rows("purchaseHistory").len(), 1);
    assert!(handle_convert(&args).is_ok());
}

#[test]
fn test_cli_convert_json_lines_with_configured_source() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("customers.yaml"), "id: varchar(3)\n").unwrap();

    let mut config = IntegrationConfig::new();
    config.sources.push(
        SourceConfig::new("customers", "customers.yaml")
            .with_records_at("customer".parse().unwrap()),
    );
    config.save(dir.path()).unwrap();

    let input = "{\"customer\": {\"id\": \"001\"}}\n{\"customer\": {\"id\": \"002\"}}\n";
    let result = run_convert(&args(None, input, dir.path().to_path_buf())).unwrap();
    assert_eq!(result.rows("customers").len(), 2);
}

#[test]
fn test_cli_convert_requires_a_spec() {
    let dir = tempdir().unwrap();
    let err = run_convert(&args(None, "{}", dir.path().to_path_buf())).unwrap_err();
    assert!(matches!(err, CliError::InvalidArgument(_)));
}

#[test]
fn test_cli_convert_reports_conversion_errors() {
    let spec = spec_file();
    let dir = tempdir().unwrap();
    let args = args(
        Some(spec.path().to_path_buf()),
        r#"{"id": "001", "purchaseHistory": [{"cost": "free"}]}"#,
        dir.path().to_path_buf(),
    );
    let err = run_convert(&args).unwrap_err();
    assert!(matches!(err, CliError::ConversionError(_)));
    assert!(err.to_string().contains("purchaseHistory.cost"));
}

#[test]
fn test_cli_validate() {
    let spec = spec_file();
    assert!(handle_validate(spec.path(), "customers").is_ok());

    let mut bad = NamedTempFile::new().unwrap();
    writeln!(bad, "id: uuid").unwrap();
    bad.flush().unwrap();
    let err = handle_validate(bad.path(), "customers").unwrap_err();
    assert!(matches!(err, CliError::SpecError(_)));

    let err = handle_validate(&PathBuf::from("/nonexistent.yaml"), "customers").unwrap_err();
    assert!(matches!(err, CliError::FileNotFound(_)));
}

#[cfg(feature = "openapi")]
#[test]
fn test_cli_openapi_derives_yaml() {
    use response_sql_sdk::cli::commands::openapi::derive_spec_yaml;
    use response_sql_sdk::import::TypeSpecImporter;

    let mut document = NamedTempFile::new().unwrap();
    let openapi = serde_json::json!({
        "openapi": "3.0.0",
        "paths": {"/people": {"get": {"responses": {"200": {"content": {
            "application/json": {"schema": {
                "type": "object",
                "properties": {
                    "name": {"type": "string", "maxLength": 10},
                    "age": {"type": "integer"}
                }
            }}
        }}}}}}
    });
    write!(document, "{}", openapi).unwrap();
    document.flush().unwrap();

    let yaml = derive_spec_yaml(document.path(), "/people").unwrap();
    let spec = TypeSpecImporter::new().import(&yaml).unwrap();
    assert_eq!(spec.len(), 2);
    assert!(yaml.contains("varchar(10)"));
}
