//! Type coercion engine
//!
//! Converts a single [`SourceValue`] into the [`TypedValue`] demanded by a
//! [`ScalarType`]. Coercion is pure: it never mutates its input and never
//! consults anything but the value and the tag.
//!
//! Null input always yields [`TypedValue::Null`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::str::FromStr;

use super::error::CoercionError;
use crate::models::{ScalarType, SourceValue, TypedValue};

/// Label used in errors for temporal tags declared without a pattern
const ISO_8601: &str = "ISO 8601";

/// String literals accepted as `true` by `bool` columns (case-insensitive)
const TRUTHY: &[&str] = &["true", "t", "yes", "y", "1", "on"];

/// String literals accepted as `false` by `bool` columns (case-insensitive)
const FALSY: &[&str] = &["false", "f", "no", "n", "0", "off"];

/// Plain base-10 literal: optional sign, digits, optional fraction and exponent
static NUMERIC_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?$").expect("valid numeric regex")
});

/// Coerce a value, trimming strings before non-textual parsing.
///
/// # Example
///
/// ```rust
/// use response_sql_sdk::convert::coerce;
/// use response_sql_sdk::models::{ScalarType, SourceValue, TypedValue};
///
/// let value = SourceValue::String("Johnny".to_string());
/// let typed = coerce(&value, &ScalarType::Varchar { max_length: 4 }).unwrap();
/// assert_eq!(typed, TypedValue::String("John".to_string()));
/// ```
pub fn coerce(value: &SourceValue, target: &ScalarType) -> Result<TypedValue, CoercionError> {
    coerce_with(value, target, true)
}

/// Coerce a value, optionally trimming strings before non-textual parsing.
pub fn coerce_with(
    value: &SourceValue,
    target: &ScalarType,
    trim: bool,
) -> Result<TypedValue, CoercionError> {
    if value.is_null() {
        return Ok(TypedValue::Null);
    }

    match target {
        ScalarType::Varchar { max_length } => {
            Ok(TypedValue::String(truncate(stringify(value), *max_length)))
        }
        ScalarType::Text => Ok(TypedValue::String(stringify(value))),
        ScalarType::Decimal | ScalarType::Money => {
            to_decimal(value, trim, target).map(TypedValue::Decimal)
        }
        ScalarType::Int => to_int(value, trim).map(TypedValue::Int),
        ScalarType::Float => to_float(value, trim).map(TypedValue::Float),
        ScalarType::Bool => to_bool(value, trim).map(TypedValue::Bool),
        ScalarType::DateTime { format } | ScalarType::SmallDateTime { format } => {
            let text = temporal_text(value, target, trim)?;
            parse_datetime(text, format.as_deref()).map(TypedValue::DateTime)
        }
        ScalarType::Date { format } => {
            let text = temporal_text(value, target, trim)?;
            parse_date(text, format.as_deref()).map(TypedValue::Date)
        }
    }
}

/// Stringify any value: strings verbatim, scalars in their literal form,
/// lists and objects as compact JSON.
fn stringify(value: &SourceValue) -> String {
    value.to_plain_string()
}

/// Truncate to at most `max_length` characters.
pub(crate) fn truncate(mut text: String, max_length: usize) -> String {
    if let Some((byte_idx, _)) = text.char_indices().nth(max_length) {
        text.truncate(byte_idx);
    }
    text
}

fn type_error(target: &ScalarType, reason: impl Into<String>) -> CoercionError {
    CoercionError::Type {
        expected: target.to_string(),
        reason: reason.into(),
    }
}

fn text_of(s: &str, trim: bool) -> &str {
    if trim { s.trim() } else { s }
}

fn to_decimal(
    value: &SourceValue,
    trim: bool,
    target: &ScalarType,
) -> Result<Decimal, CoercionError> {
    let text = match value {
        SourceValue::Number(n) => n.to_string(),
        SourceValue::String(s) => text_of(s, trim).to_string(),
        other => return Err(type_error(target, format!("found {}", other.kind()))),
    };
    parse_decimal(&text).map_err(|e| match e {
        NumericError::NotANumber => type_error(target, format!("'{}' is not a number", text)),
        NumericError::OutOfRange => {
            type_error(target, format!("'{}' is out of range for decimal", text))
        }
    })
}

enum NumericError {
    NotANumber,
    OutOfRange,
}

/// Parse a plain base-10 literal exactly.
///
/// Digit separators, hex, `inf` and `NaN` are not numbers here.
fn parse_decimal(text: &str) -> Result<Decimal, NumericError> {
    if !NUMERIC_LITERAL.is_match(text) {
        return Err(NumericError::NotANumber);
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| NumericError::OutOfRange)
}

fn to_int(value: &SourceValue, trim: bool) -> Result<i64, CoercionError> {
    let target = ScalarType::Int;
    match value {
        SourceValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            if n.is_u64() {
                return Err(type_error(&target, format!("{} is out of range", n)));
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                    Ok(f as i64)
                }
                _ => Err(type_error(&target, format!("{} is not an integer", n))),
            }
        }
        SourceValue::String(s) => {
            let text = text_of(s, trim);
            if let Ok(i) = text.parse::<i64>() {
                return Ok(i);
            }
            // "42.0" and "4.2e1" are integral even though i64 parsing rejects them
            match parse_decimal(text) {
                Ok(d) if d.fract().is_zero() => d
                    .to_i64()
                    .ok_or_else(|| type_error(&target, format!("'{}' is out of range", text))),
                Err(NumericError::OutOfRange) => {
                    Err(type_error(&target, format!("'{}' is out of range", text)))
                }
                _ => Err(type_error(&target, format!("'{}' is not an integer", text))),
            }
        }
        other => Err(type_error(&target, format!("found {}", other.kind()))),
    }
}

fn to_float(value: &SourceValue, trim: bool) -> Result<f64, CoercionError> {
    let target = ScalarType::Float;
    let parsed = match value {
        SourceValue::Number(n) => n.as_f64(),
        SourceValue::String(s) => text_of(s, trim).parse::<f64>().ok(),
        other => return Err(type_error(&target, format!("found {}", other.kind()))),
    };
    parsed
        .filter(|f| f.is_finite())
        .ok_or_else(|| {
            let reason = format!("{} is not a finite number", value.to_json_string());
            type_error(&target, reason)
        })
}

fn to_bool(value: &SourceValue, trim: bool) -> Result<bool, CoercionError> {
    let target = ScalarType::Bool;
    match value {
        SourceValue::Bool(b) => Ok(*b),
        SourceValue::Number(n) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(type_error(&target, format!("{} is neither 0 nor 1", n))),
        },
        SourceValue::String(s) => {
            let text = text_of(s, trim).to_lowercase();
            if TRUTHY.contains(&text.as_str()) {
                Ok(true)
            } else if FALSY.contains(&text.as_str()) {
                Ok(false)
            } else {
                Err(type_error(&target, format!("'{}' is not a boolean literal", s)))
            }
        }
        other => Err(type_error(&target, format!("found {}", other.kind()))),
    }
}

fn temporal_text<'a>(
    value: &'a SourceValue,
    target: &ScalarType,
    trim: bool,
) -> Result<&'a str, CoercionError> {
    match value {
        SourceValue::String(s) => Ok(text_of(s, trim)),
        other => Err(type_error(
            target,
            format!("expected a date string, found {}", other.kind()),
        )),
    }
}

fn date_error(format: Option<&str>, reason: impl ToString) -> CoercionError {
    CoercionError::Date {
        format: format.unwrap_or(ISO_8601).to_string(),
        reason: reason.to_string(),
    }
}

fn has_offset(format: &str) -> bool {
    format.contains("%z") || format.contains("%:z") || format.contains("%#z")
}

/// Parse a date-time, normalizing offset-aware input to UTC.
fn parse_datetime(text: &str, format: Option<&str>) -> Result<NaiveDateTime, CoercionError> {
    match format {
        Some(fmt) => {
            if has_offset(fmt) {
                return DateTime::parse_from_str(text, fmt)
                    .map(|dt| dt.naive_utc())
                    .map_err(|e| date_error(format, e));
            }
            NaiveDateTime::parse_from_str(text, fmt).or_else(|err| {
                // Date-only patterns carry no time; store them at midnight
                NaiveDate::parse_from_str(text, fmt)
                    .map(|d| d.and_time(NaiveTime::MIN))
                    .map_err(|_| date_error(format, err))
            })
        }
        None => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
                return Ok(dt.naive_utc());
            }
            ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .or_else(|| {
                    NaiveDate::parse_from_str(text, "%Y-%m-%d")
                        .ok()
                        .map(|d| d.and_time(NaiveTime::MIN))
                })
                .ok_or_else(|| date_error(None, format!("'{}' is not an ISO 8601 date-time", text)))
        }
    }
}

fn parse_date(text: &str, format: Option<&str>) -> Result<NaiveDate, CoercionError> {
    let fmt = format.unwrap_or("%Y-%m-%d");
    NaiveDate::parse_from_str(text, fmt).or_else(|err| {
        // Accept a full timestamp where only the date is stored
        parse_datetime(text, format)
            .map(|dt| dt.date())
            .map_err(|_| date_error(format, err))
    })
}
