//! Response-to-SQL SDK - typed row-sets from JSON API responses
//!
//! Provides:
//! - Type specifications: field name to SQL type tag or nested specification
//! - Type coercion of untyped source values into typed SQL values
//! - Row conversion with promotion of nested lists into sub-tables
//! - Spec import from JSON/YAML documents and OpenAPI response schemas
//! - Integration configuration (`.response-sql.toml`)
//!
//! ```rust
//! use response_sql_sdk::{Converter, SourceValue, TypeSpecImporter, TypedValue};
//!
//! let spec = TypeSpecImporter::new()
//!     .import("id: varchar(3)\nname: varchar(20)\npurchaseHistory:\n  cost: money\n")
//!     .unwrap();
//! let customer = SourceValue::from(serde_json::json!({
//!     "id": "001",
//!     "name": "John",
//!     "purchaseHistory": [{"cost": 1.2}, {"cost": 3.4}]
//! }));
//!
//! let result = Converter::new().convert(&customer, &spec, "customers").unwrap();
//! let row = &result.rows("customers")[0];
//! assert_eq!(row.get("name"), Some(&TypedValue::String("John".into())));
//! assert_eq!(result.rows("purchaseHistory").len(), 2);
//! ```

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod convert;
pub mod import;
pub mod models;
pub mod validation;

pub use config::{ConfigError, IntegrationConfig, SourceConfig};
pub use convert::{
    CoercionError, ConversionError, Converter, ConverterConfig, ErrorPolicy, ListShape,
    ResponseAddress, classify, coerce, extract_records,
};
#[cfg(feature = "openapi")]
pub use import::openapi::OpenAPISpecImporter;
pub use import::{SpecError, TypeSpecImporter};
pub use models::{
    Column, ConversionResult, ConvertedRow, ParentRef, RecordFailure, ScalarType, SourceValue,
    TableRowSet, TypeDescriptor, TypeSpec, TypedValue,
};
pub use validation::ValidationError;
