//! Raw value conversion.
//!
//! Filter expressions carry values as strings; each attribute declares a
//! native type in the query configuration. The converter coerces raw
//! strings into typed `sea_query::Value`s so comparisons are rendered
//! with the correct SQL type, and fails with the offending raw value and
//! target type when coercion is impossible.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use sea_query::Value;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{SpecError, SpecResult};

/// Native value types an attribute can declare.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// Plain text; raw values pass through unchanged.
    #[default]
    Text,
    /// 64-bit signed integer.
    Integer,
    /// 64-bit float.
    Float,
    /// Boolean; accepts true/false (any case) and 1/0.
    Boolean,
    /// UUID in hyphenated or simple form.
    Uuid,
    /// Calendar date, `%Y-%m-%d`.
    Date,
    /// RFC 3339 timestamp, normalized to UTC.
    DateTime,
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Uuid => "uuid",
            Self::Date => "date",
            Self::DateTime => "datetime",
        };
        f.write_str(name)
    }
}

type ConvertFn = Box<dyn Fn(&str) -> Option<Value> + Send + Sync>;

/// Converts raw string values into typed query values.
///
/// Custom conversions can be registered per attribute type and take
/// precedence over the built-in coercions.
#[derive(Default)]
pub struct ValueConverter {
    custom: HashMap<AttributeType, ConvertFn>,
}

impl ValueConverter {
    /// Create a converter with the built-in coercions only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom conversion for an attribute type.
    ///
    /// The conversion returns `None` when the raw value cannot be
    /// coerced, which surfaces as a conversion error to the caller.
    pub fn with_custom_converter<F>(mut self, target: AttributeType, convert: F) -> Self
    where
        F: Fn(&str) -> Option<Value> + Send + Sync + 'static,
    {
        self.custom.insert(target, Box::new(convert));
        self
    }

    /// Coerce a raw string into a typed value.
    pub fn convert(&self, raw: &str, target: AttributeType) -> SpecResult<Value> {
        if let Some(convert) = self.custom.get(&target) {
            return convert(raw).ok_or_else(|| conversion_error(raw, target));
        }

        let converted = match target {
            AttributeType::Text => Some(Value::from(raw.to_string())),
            AttributeType::Integer => raw.parse::<i64>().ok().map(Value::from),
            AttributeType::Float => raw.parse::<f64>().ok().map(Value::from),
            AttributeType::Boolean => parse_boolean(raw).map(Value::from),
            AttributeType::Uuid => Uuid::parse_str(raw).ok().map(Value::from),
            AttributeType::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(Value::from),
            AttributeType::DateTime => DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| Value::from(dt.with_timezone(&Utc))),
        };

        converted.ok_or_else(|| conversion_error(raw, target))
    }
}

fn conversion_error(raw: &str, target: AttributeType) -> SpecError {
    SpecError::ValueConversion {
        raw: raw.to_string(),
        target,
    }
}

fn parse_boolean(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") || raw == "1" {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") || raw == "0" {
        Some(false)
    } else {
        None
    }
}
