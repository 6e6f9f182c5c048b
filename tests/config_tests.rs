//! Integration configuration tests

use response_sql_sdk::config::{CONFIG_FILENAME, ConfigError, IntegrationConfig, SourceConfig};
use response_sql_sdk::convert::{Converter, ErrorPolicy};
use response_sql_sdk::models::SourceValue;
use serde_json::json;
use tempfile::tempdir;

#[test]
fn test_workspace_round_trip() {
    let dir = tempdir().unwrap();
    std::fs::create_dir(dir.path().join("specs")).unwrap();
    std::fs::write(
        dir.path().join("specs/customers.yaml"),
        "id: varchar(3)\npurchaseHistory:\n  cost: money\n",
    )
    .unwrap();

    let mut config = IntegrationConfig::new();
    config.converter.on_error = ErrorPolicy::SkipRecord;
    config.sources.push(
        SourceConfig::new("customers", "specs/customers.yaml")
            .with_records_at("data.customers".parse().unwrap()),
    );
    config.save(dir.path()).unwrap();
    assert!(dir.path().join(CONFIG_FILENAME).exists());

    let content = std::fs::read_to_string(dir.path().join(CONFIG_FILENAME)).unwrap();
    let loaded = IntegrationConfig::parse(&content).unwrap();
    assert_eq!(loaded.converter.on_error, ErrorPolicy::SkipRecord);

    let source = loaded.source("customers").unwrap();
    let spec = loaded.load_spec(dir.path(), source).unwrap();
    let response = SourceValue::from(json!({
        "data": {"customers": [
            {"id": "001", "purchaseHistory": [{"cost": 1}]},
            {"id": "002", "purchaseHistory": [{"cost": "n/a"}]}
        ]}
    }));

    let result = Converter::with_config(loaded.converter.clone())
        .convert_response(&response, &source.records_at, &spec, &source.table)
        .unwrap();
    assert_eq!(result.rows("customers").len(), 1);
    assert_eq!(result.failures().len(), 1);
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempdir().unwrap();
    assert!(!IntegrationConfig::exists(dir.path()));
    let config = IntegrationConfig::load(dir.path()).unwrap();
    assert!(config.sources.is_empty());
}

#[test]
fn test_invalid_toml() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILENAME), "[converter\nmax_depth = 2\n").unwrap();
    let err = IntegrationConfig::load(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_missing_spec_file() {
    let dir = tempdir().unwrap();
    let config = IntegrationConfig::new();
    let result = config.load_spec(dir.path(), &SourceConfig::new("t", "missing.yaml"));
    assert!(result.is_err());
}
