//! Search IR: the structured search intent extracted from free text.
//!
//! A [`SearchIR`] comes from an unreliable source (a language model), so
//! every field is optional and unparsed. [`validate`] is the only backstop
//! between that source and query execution: it rejects literals that do not
//! parse, negative or inverted duration bounds, and empty tags.
//!
//! Absence and emptiness are kept distinct throughout: `None` means "no
//! constraint", while `Some("")` is a malformed value and fails validation.

use crate::duration::{parse_duration, DurationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Candidate search intent. Field names match the JSON the extraction
/// prompt asks for; `min_duration_ms` / `max_duration_ms` are accepted as
/// aliases even though the values carry their own units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchIR {
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub operation: Option<String>,
    #[serde(default, alias = "min_duration_ms")]
    pub min_duration: Option<String>,
    #[serde(default, alias = "max_duration_ms")]
    pub max_duration: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    /// Independent `key = value` constraints, ANDed together.
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: BTreeMap<String, String>,
}

impl SearchIR {
    /// True when no field constrains the search.
    pub fn is_empty(&self) -> bool {
        self.service.is_none()
            && self.operation.is_none()
            && self.min_duration.is_none()
            && self.max_duration.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.tags.is_empty()
    }
}

/// `null` or a missing object means no tags. Scalar values are rendered to
/// strings (models like to emit `"http.status_code": 500`). A `null` value
/// becomes an empty string so [`validate`] rejects it.
fn deserialize_tags<'de, D>(d: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, serde_json::Value>> = Option::deserialize(d)?;
    let mut tags = BTreeMap::new();
    for (key, value) in raw.unwrap_or_default() {
        let value = match value {
            serde_json::Value::Null => String::new(),
            serde_json::Value::String(s) => s,
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            other => {
                return Err(serde::de::Error::custom(format!(
                    "tag {key:?} must be a scalar, got {other}"
                )))
            }
        };
        tags.insert(key, value);
    }
    Ok(tags)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be non-empty when present")]
    EmptyField { field: &'static str },
    #[error("{field} must be a valid duration string (e.g. '300ms', '1.5s'): {source}")]
    InvalidDuration {
        field: &'static str,
        source: DurationError,
    },
    #[error("{field} cannot be negative")]
    NegativeDuration { field: &'static str },
    #[error("min_duration cannot exceed max_duration")]
    InvertedDurations,
    #[error("{field} must be RFC3339: {source}")]
    InvalidTimestamp {
        field: &'static str,
        source: chrono::ParseError,
    },
    #[error("tag keys and values must be non-empty (key {key:?})")]
    EmptyTag { key: String },
}

/// Check every rule; the first violation is returned. An empty IR is valid.
pub fn validate(ir: &SearchIR) -> Result<(), ValidationError> {
    non_empty("service", ir.service.as_deref())?;
    non_empty("operation", ir.operation.as_deref())?;

    let min = checked_duration("min_duration", ir.min_duration.as_deref())?;
    let max = checked_duration("max_duration", ir.max_duration.as_deref())?;
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(ValidationError::InvertedDurations);
        }
    }

    checked_timestamp("start_time", ir.start_time.as_deref())?;
    checked_timestamp("end_time", ir.end_time.as_deref())?;

    for (key, value) in &ir.tags {
        if key.is_empty() || value.is_empty() {
            return Err(ValidationError::EmptyTag { key: key.clone() });
        }
    }

    Ok(())
}

fn non_empty(field: &'static str, value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some("") => Err(ValidationError::EmptyField { field }),
        _ => Ok(()),
    }
}

fn checked_duration(
    field: &'static str,
    literal: Option<&str>,
) -> Result<Option<chrono::Duration>, ValidationError> {
    let Some(literal) = literal else {
        return Ok(None);
    };
    let d = parse_duration(literal)
        .map_err(|source| ValidationError::InvalidDuration { field, source })?;
    if d < chrono::Duration::zero() {
        return Err(ValidationError::NegativeDuration { field });
    }
    Ok(Some(d))
}

fn checked_timestamp(field: &'static str, literal: Option<&str>) -> Result<(), ValidationError> {
    if let Some(literal) = literal {
        parse_timestamp(literal)
            .map_err(|source| ValidationError::InvalidTimestamp { field, source })?;
    }
    Ok(())
}

/// Parse an RFC3339 timestamp and normalise it to UTC.
pub fn parse_timestamp(literal: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(literal).map(|dt| dt.with_timezone(&Utc))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
