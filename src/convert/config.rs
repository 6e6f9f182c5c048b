//! Configuration for the converter

use serde::{Deserialize, Serialize};

/// Default recursion cap for nested tables
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Default separator for joining inconsistent lists of scalars
pub const DEFAULT_LIST_SEPARATOR: &str = ",";

/// What a batch conversion does with a record that fails to convert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Stop at the first failing record and return its error (default)
    #[default]
    Abort,
    /// Drop the failing record, log it and keep converting
    SkipRecord,
}

impl std::str::FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "abort" => Ok(ErrorPolicy::Abort),
            "skip_record" | "skip" => Ok(ErrorPolicy::SkipRecord),
            _ => Err(format!(
                "Unknown error policy: {}. Use 'abort' or 'skip_record'.",
                s
            )),
        }
    }
}

impl std::fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorPolicy::Abort => write!(f, "abort"),
            ErrorPolicy::SkipRecord => write!(f, "skip_record"),
        }
    }
}

/// Configuration for the converter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Maximum nesting depth of sub-tables (the top-level table is depth 1)
    pub max_depth: usize,

    /// Separator placed between elements when a list of scalars is stored
    /// in a single column
    pub list_separator: String,

    /// Batch behavior for records that fail to convert
    pub on_error: ErrorPolicy,

    /// Trim surrounding whitespace before parsing numbers, booleans and dates
    pub trim_strings: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            list_separator: DEFAULT_LIST_SEPARATOR.to_string(),
            on_error: ErrorPolicy::default(),
            trim_strings: true,
        }
    }
}

impl ConverterConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for custom configuration
    pub fn builder() -> ConverterConfigBuilder {
        ConverterConfigBuilder::default()
    }
}

/// Builder for ConverterConfig
#[derive(Debug, Default)]
pub struct ConverterConfigBuilder {
    config: ConverterConfig,
}

impl ConverterConfigBuilder {
    /// Set the maximum nesting depth (at least 1)
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth.max(1);
        self
    }

    /// Set the separator used when joining lists of scalars
    pub fn list_separator(mut self, separator: impl Into<String>) -> Self {
        self.config.list_separator = separator.into();
        self
    }

    /// Set the batch error policy
    pub fn on_error(mut self, policy: ErrorPolicy) -> Self {
        self.config.on_error = policy;
        self
    }

    /// Enable or disable whitespace trimming before parsing
    pub fn trim_strings(mut self, trim: bool) -> Self {
        self.config.trim_strings = trim;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ConverterConfig {
        self.config
    }
}
