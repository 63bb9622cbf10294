//! Typed query parameters and the IR → query mapper.
//!
//! [`map_ir`] is a pure, deterministic transformation. It parses literals
//! and copies tags into a freshly allocated [`Attributes`] set, so the
//! returned [`TraceQueryParams`] owns all of its data and never observes
//! later changes to the IR it came from.

use crate::duration::{parse_duration, DurationError};
use crate::ir::{parse_timestamp, SearchIR};
use crate::types::Attributes;
use chrono::{DateTime, Duration, Utc};

/// A fully-typed trace query. The default value is the unconstrained query.
///
/// Empty strings and zero durations mean "unconstrained"; time bounds are
/// `None` when unconstrained.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceQueryParams {
    pub service_name: String,
    pub operation_name: String,
    pub attributes: Attributes,
    pub start_time_min: Option<DateTime<Utc>>,
    pub start_time_max: Option<DateTime<Utc>>,
    pub duration_min: Duration,
    pub duration_max: Duration,
    /// Maximum number of matching traces to return; zero is unbounded.
    pub search_depth: usize,
}

impl Default for TraceQueryParams {
    fn default() -> Self {
        Self {
            service_name: String::new(),
            operation_name: String::new(),
            attributes: Attributes::new(),
            start_time_min: None,
            start_time_max: None,
            duration_min: Duration::zero(),
            duration_max: Duration::zero(),
            search_depth: 0,
        }
    }
}

impl TraceQueryParams {
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service_name = service.into();
        self
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation_name = operation.into();
        self
    }

    pub fn with_min_duration(mut self, floor: Duration) -> Self {
        self.duration_min = floor;
        self
    }

    pub fn with_max_duration(mut self, ceiling: Duration) -> Self {
        self.duration_max = ceiling;
        self
    }

    pub fn with_time_range(
        mut self,
        min: Option<DateTime<Utc>>,
        max: Option<DateTime<Utc>>,
    ) -> Self {
        self.start_time_min = min;
        self.start_time_max = max;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.put_str(key, value);
        self
    }

    pub fn with_search_depth(mut self, depth: usize) -> Self {
        self.search_depth = depth;
        self
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MappingError {
    #[error("cannot parse {field}: {source}")]
    Duration {
        field: &'static str,
        source: DurationError,
    },
    #[error("cannot parse {field}: {source}")]
    Timestamp {
        field: &'static str,
        source: chrono::ParseError,
    },
}

/// Map a search IR to query parameters.
///
/// Literals are parsed in the order min duration, max duration, start time,
/// end time; the first failure is returned and no partial query escapes.
/// The search depth is left unbounded for the caller to set.
pub fn map_ir(ir: &SearchIR) -> Result<TraceQueryParams, MappingError> {
    let mut qp = TraceQueryParams::default();

    if let Some(service) = &ir.service {
        qp.service_name = service.clone();
    }
    if let Some(operation) = &ir.operation {
        qp.operation_name = operation.clone();
    }

    if let Some(literal) = &ir.min_duration {
        qp.duration_min = parse_duration(literal).map_err(|source| MappingError::Duration {
            field: "min_duration",
            source,
        })?;
    }
    if let Some(literal) = &ir.max_duration {
        qp.duration_max = parse_duration(literal).map_err(|source| MappingError::Duration {
            field: "max_duration",
            source,
        })?;
    }

    if let Some(literal) = &ir.start_time {
        let ts = parse_timestamp(literal).map_err(|source| MappingError::Timestamp {
            field: "start_time",
            source,
        })?;
        qp.start_time_min = Some(ts);
    }
    if let Some(literal) = &ir.end_time {
        let ts = parse_timestamp(literal).map_err(|source| MappingError::Timestamp {
            field: "end_time",
            source,
        })?;
        qp.start_time_max = Some(ts);
    }

    if !ir.tags.is_empty() {
        qp.attributes = ir
            .tags
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
    }

    Ok(qp)
}
