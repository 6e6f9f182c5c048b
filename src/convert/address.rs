//! Response data addresses
//!
//! API responses often wrap their records in metadata, e.g.
//! `{"data": {"users": [...]}, "requestDate": "..."}`. A [`ResponseAddress`]
//! names the path to the records (`data.users`) so that only the records are
//! handed to the converter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ConversionError;
use crate::models::SourceValue;

/// One step of a response address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddressSegment {
    /// Position in a list
    Index(usize),
    /// Key of an object
    Key(String),
}

impl fmt::Display for AddressSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressSegment::Index(i) => write!(f, "{}", i),
            AddressSegment::Key(k) => write!(f, "{}", k),
        }
    }
}

/// Path from the root of a response to its records.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseAddress(pub Vec<AddressSegment>);

impl ResponseAddress {
    /// The response root itself.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[AddressSegment] {
        &self.0
    }
}

impl FromStr for ResponseAddress {
    type Err = String;

    /// Parse a dotted address; all-digit segments are list indices.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::root());
        }
        s.split('.')
            .map(|segment| {
                let segment = segment.trim();
                if segment.is_empty() {
                    Err(format!("Empty segment in response address '{}'", s))
                } else if let Ok(idx) = segment.parse::<usize>() {
                    Ok(AddressSegment::Index(idx))
                } else {
                    Ok(AddressSegment::Key(segment.to_string()))
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .map(ResponseAddress)
    }
}

impl fmt::Display for ResponseAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "$");
        }
        let parts: Vec<String> = self.0.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Resolve `address` inside `response` and return the records found there.
///
/// A list yields its elements, an object yields itself, and null yields no
/// records.
pub fn extract_records<'a>(
    response: &'a SourceValue,
    address: &ResponseAddress,
) -> Result<Vec<&'a SourceValue>, ConversionError> {
    let not_found = |reason: String| ConversionError::AddressNotFound {
        address: address.to_string(),
        reason,
    };

    let mut current = response;
    for segment in address.segments() {
        current = match (segment, current) {
            (AddressSegment::Key(key), SourceValue::Object(map)) => map
                .get(key)
                .ok_or_else(|| not_found(format!("missing key '{}'", key)))?,
            (AddressSegment::Index(idx), SourceValue::List(items)) => items.get(*idx).ok_or_else(
                || not_found(format!("index {} out of range (len {})", idx, items.len())),
            )?,
            // Numeric keys are legal object keys
            (AddressSegment::Index(idx), SourceValue::Object(map)) => map
                .get(&idx.to_string())
                .ok_or_else(|| not_found(format!("missing key '{}'", idx)))?,
            (segment, other) => {
                return Err(not_found(format!(
                    "cannot step into {} with '{}'",
                    other.kind(),
                    segment
                )));
            }
        };
    }

    match current {
        SourceValue::List(items) => Ok(items.iter().collect()),
        SourceValue::Object(_) => Ok(vec![current]),
        SourceValue::Null => Ok(Vec::new()),
        other => Err(not_found(format!(
            "expected an object or a list of objects, found {}",
            other.kind()
        ))),
    }
}
