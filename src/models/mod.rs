//! Models module for the SDK
//!
//! Defines the data structures flowing through a conversion: untyped source
//! values, type specifications, and the typed row-sets handed to an integrator.

pub mod column;
pub mod row;
pub mod type_spec;
pub mod value;

pub use column::Column;
pub use row::{ConversionResult, ConvertedRow, ParentRef, RecordFailure, TableRowSet, TypedValue};
pub use type_spec::{ScalarType, TagError, TypeDescriptor, TypeSpec};
pub use value::SourceValue;
