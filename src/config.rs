//! Integration configuration file support
//!
//! Handles parsing of `.response-sql.toml` configuration files and
//! environment variable overrides. The file carries the converter settings
//! and the list of sources: which table each API response lands in, the
//! spec document describing it and where its records sit in the response.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::convert::{ConverterConfig, ResponseAddress};
use crate::import::{SpecError, TypeSpecImporter};
use crate::models::TypeSpec;

/// Default configuration filename
pub const CONFIG_FILENAME: &str = ".response-sql.toml";

/// Environment variable for the maximum nesting depth
pub const ENV_MAX_DEPTH: &str = "RESPONSE_SQL_MAX_DEPTH";

/// Environment variable for the batch error policy
pub const ENV_ON_ERROR: &str = "RESPONSE_SQL_ON_ERROR";

/// Environment variable for the list separator
pub const ENV_LIST_SEPARATOR: &str = "RESPONSE_SQL_LIST_SEPARATOR";

/// Configuration file errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Config error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// One API source and the table its records are converted into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Top-level table name
    pub table: String,

    /// Path to the spec document (relative to the workspace, or absolute)
    pub spec: String,

    /// Address of the records inside a response; the root when omitted
    #[serde(default, skip_serializing_if = "ResponseAddress::is_root")]
    pub records_at: ResponseAddress,
}

impl SourceConfig {
    pub fn new(table: impl Into<String>, spec: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            spec: spec.into(),
            records_at: ResponseAddress::root(),
        }
    }

    /// Set the address of the records inside a response
    pub fn with_records_at(mut self, records_at: ResponseAddress) -> Self {
        self.records_at = records_at;
        self
    }

    /// Resolve the spec path against a workspace directory
    pub fn spec_path(&self, workspace_path: &Path) -> PathBuf {
        if Path::new(&self.spec).is_absolute() {
            PathBuf::from(&self.spec)
        } else {
            workspace_path.join(&self.spec)
        }
    }
}

/// Main configuration structure
///
/// Represents the `.response-sql.toml` configuration file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct IntegrationConfig {
    /// Converter settings
    #[serde(default)]
    pub converter: ConverterConfig,

    /// Configured sources
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceConfig>,
}

impl IntegrationConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a workspace directory
    ///
    /// Looks for `.response-sql.toml` in the workspace directory.
    /// Falls back to defaults if not found.
    pub fn load(workspace_path: &Path) -> ConfigResult<Self> {
        let config_path = workspace_path.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::Io(format!("Failed to read config: {}", e)))?;

            Self::parse(&content)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> ConfigResult<Self> {
        toml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a workspace directory
    pub fn save(&self, workspace_path: &Path) -> ConfigResult<()> {
        let config_path = workspace_path.join(CONFIG_FILENAME);
        let content = self.to_toml()?;

        std::fs::write(&config_path, content)
            .map_err(|e| ConfigError::Io(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Convert configuration to TOML string
    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| {
            ConfigError::Serialization(format!("Failed to serialize config: {}", e))
        })
    }

    /// Apply environment variable overrides
    ///
    /// Values that fail to parse are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(depth) = std::env::var(ENV_MAX_DEPTH)
            && let Ok(depth) = depth.parse::<usize>()
        {
            self.converter.max_depth = depth.max(1);
        }

        if let Ok(policy) = std::env::var(ENV_ON_ERROR)
            && let Ok(policy) = policy.parse()
        {
            self.converter.on_error = policy;
        }

        if let Ok(separator) = std::env::var(ENV_LIST_SEPARATOR) {
            self.converter.list_separator = separator;
        }
    }

    /// Find the source configured for a table
    pub fn source(&self, table: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.table == table)
    }

    /// Load the spec document of a source, nested no deeper than the
    /// converter allows
    pub fn load_spec(
        &self,
        workspace_path: &Path,
        source: &SourceConfig,
    ) -> Result<TypeSpec, SpecError> {
        TypeSpecImporter::new()
            .with_max_depth(self.converter.max_depth)
            .load_file(source.spec_path(workspace_path))
    }

    /// Check if configuration exists in a workspace
    pub fn exists(workspace_path: &Path) -> bool {
        workspace_path.join(CONFIG_FILENAME).exists()
    }
}

/// Generate a sample configuration file content
pub fn sample_config() -> &'static str {
    r#"# Response-to-SQL configuration

[converter]
# Maximum nesting depth of sub-tables (the top-level table is depth 1)
max_depth = 32

# Separator used when a list of scalars is stored in one column
list_separator = ","

# Batch error policy: "abort" (default) or "skip_record"
on_error = "abort"

# Trim whitespace before parsing numbers, booleans and dates
trim_strings = true

# One entry per API source
[[sources]]
table = "customers"
spec = "specs/customers.yaml"
records_at = ["data", "customers"]
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{AddressSegment, ErrorPolicy};
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = IntegrationConfig::new();
        assert_eq!(config.converter, ConverterConfig::default());
        assert!(config.sources.is_empty());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[converter]
max_depth = 4
on_error = "skip_record"

[[sources]]
table = "customers"
spec = "customers.yaml"
records_at = ["data", 0, "items"]

[[sources]]
table = "orders"
spec = "/abs/orders.json"
"#;
        let config = IntegrationConfig::parse(toml).unwrap();
        assert_eq!(config.converter.max_depth, 4);
        assert_eq!(config.converter.on_error, ErrorPolicy::SkipRecord);
        assert_eq!(config.converter.list_separator, ",");

        let customers = config.source("customers").unwrap();
        assert_eq!(
            customers.records_at.segments(),
            &[
                AddressSegment::Key("data".into()),
                AddressSegment::Index(0),
                AddressSegment::Key("items".into()),
            ]
        );
        assert!(config.source("orders").unwrap().records_at.is_root());
        assert!(config.source("missing").is_none());
    }

    #[test]
    fn test_parse_invalid_config() {
        let err = IntegrationConfig::parse("[converter]\non_error = \"retry\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_spec_path() {
        let workspace = Path::new("/workspace");
        assert_eq!(
            SourceConfig::new("t", "specs/t.yaml").spec_path(workspace),
            PathBuf::from("/workspace/specs/t.yaml")
        );
        assert_eq!(
            SourceConfig::new("t", "/etc/t.yaml").spec_path(workspace),
            PathBuf::from("/etc/t.yaml")
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let mut config = IntegrationConfig::new();
        config.sources.push(
            SourceConfig::new("customers", "customers.yaml")
                .with_records_at("data.customers".parse().unwrap()),
        );

        config.save(dir.path()).unwrap();
        assert!(IntegrationConfig::exists(dir.path()));

        let loaded = IntegrationConfig::parse(
            &std::fs::read_to_string(dir.path().join(CONFIG_FILENAME)).unwrap(),
        )
        .unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_spec() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("customers.yaml"), "id: varchar(3)\n").unwrap();
        let config = IntegrationConfig::new();
        let spec = config
            .load_spec(dir.path(), &SourceConfig::new("customers", "customers.yaml"))
            .unwrap();
        assert!(spec.contains("id"));
    }

    #[test]
    fn test_sample_config_is_valid() {
        let config = IntegrationConfig::parse(sample_config()).unwrap();
        assert_eq!(config.sources.len(), 1);
    }
}
