//! Conversion module
//!
//! Turns JSON-like source records into typed, flat row-sets driven by a
//! [`TypeSpec`](crate::models::TypeSpec):
//! - [`coerce`] maps one source value onto one scalar type
//! - [`classify`] tells uniform lists of objects apart from everything else
//! - [`Converter`] walks records and promotes nested lists into sub-tables
//! - [`extract_records`] digs the records out of a wrapped API response

pub mod address;
pub mod classify;
pub mod coerce;
pub mod config;
pub mod converter;
pub mod error;

pub use address::{AddressSegment, ResponseAddress, extract_records};
pub use classify::{ListShape, classify};
pub use coerce::{coerce, coerce_with};
pub use config::{ConverterConfig, ConverterConfigBuilder, ErrorPolicy};
pub use converter::Converter;
pub use error::{CoercionError, ConversionError};
