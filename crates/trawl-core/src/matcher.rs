//! Trace matcher: pure predicates over a single query dimension.
//!
//! Every predicate is existential across spans: a trace satisfies a
//! dimension when *any* of its spans does, never "all spans" and never a
//! trace-level aggregate. An unconstrained dimension (empty string, zero
//! duration, absent bound, empty attribute set) always matches.
//!
//! [`TracePredicates`] bundles the constrained dimensions of a query so the
//! reader can AND them with short-circuiting.

use crate::query::TraceQueryParams;
use crate::types::{AnyValue, Attributes, SpanRef, Trace};
use chrono::{DateTime, Duration, Utc};

/// Attribute key satisfied by any span whose status is error.
const ERROR_TAG_KEY: &str = "error";

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Any span belongs to `service` (span `service.name`, else resource's).
pub fn matches_service(trace: &Trace, service: &str) -> bool {
    if service.is_empty() {
        return true;
    }
    trace.spans().any(|s| s.service_name() == Some(service))
}

/// Any span is named exactly `operation`.
pub fn matches_operation(trace: &Trace, operation: &str) -> bool {
    if operation.is_empty() {
        return true;
    }
    trace.spans().any(|s| s.span.name == operation)
}

/// Any span lasted at least `floor`.
pub fn matches_min_duration(trace: &Trace, floor: Duration) -> bool {
    if floor == Duration::zero() {
        return true;
    }
    trace.spans().any(|s| s.span.duration() >= floor)
}

/// Any span lasted at most `ceiling`.
///
/// A single fast child span is enough, so this rarely narrows a trace with
/// many spans, and it is not combined with the floor on the same span.
pub fn matches_max_duration(trace: &Trace, ceiling: Duration) -> bool {
    if ceiling == Duration::zero() {
        return true;
    }
    trace.spans().any(|s| s.span.duration() <= ceiling)
}

/// Any span started within the inclusive `[min, max]` window.
pub fn matches_time_range(
    trace: &Trace,
    min: Option<DateTime<Utc>>,
    max: Option<DateTime<Utc>>,
) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    trace.spans().any(|s| {
        let start = s.span.start_time();
        min.map_or(true, |m| start >= m) && max.map_or(true, |m| start <= m)
    })
}

/// Every `key = value` pair is satisfied by some span.
///
/// Values are compared by their canonical string form, so `"500"` matches
/// an integer attribute `500`. A span with error status satisfies
/// `error = true` even without an explicit attribute.
pub fn matches_attributes(trace: &Trace, attributes: &Attributes) -> bool {
    attributes
        .iter()
        .all(|(key, value)| trace.spans().any(|s| span_has_tag(&s, key, value)))
}

fn span_has_tag(span: &SpanRef<'_>, key: &str, expected: &AnyValue) -> bool {
    let expected = expected.as_string();
    if key == ERROR_TAG_KEY && expected == "true" && span.span.is_error() {
        return true;
    }
    span.attribute(key)
        .is_some_and(|actual| actual.as_string() == expected)
}

// ---------------------------------------------------------------------------
// Predicate sets
// ---------------------------------------------------------------------------

/// One constrained query dimension, owning its operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Service(String),
    Operation(String),
    MinDuration(Duration),
    MaxDuration(Duration),
    TimeRange {
        min: Option<DateTime<Utc>>,
        max: Option<DateTime<Utc>>,
    },
    Attributes(Attributes),
}

impl Predicate {
    pub fn matches(&self, trace: &Trace) -> bool {
        match self {
            Predicate::Service(name) => matches_service(trace, name),
            Predicate::Operation(name) => matches_operation(trace, name),
            Predicate::MinDuration(floor) => matches_min_duration(trace, *floor),
            Predicate::MaxDuration(ceiling) => matches_max_duration(trace, *ceiling),
            Predicate::TimeRange { min, max } => matches_time_range(trace, *min, *max),
            Predicate::Attributes(attrs) => matches_attributes(trace, attrs),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Predicate::Service(_) => "service",
            Predicate::Operation(_) => "operation",
            Predicate::MinDuration(_) => "min_duration",
            Predicate::MaxDuration(_) => "max_duration",
            Predicate::TimeRange { .. } => "time_range",
            Predicate::Attributes(_) => "attributes",
        }
    }
}

/// The constrained dimensions of a query, evaluated in a fixed order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TracePredicates {
    predicates: Vec<Predicate>,
}

impl TracePredicates {
    pub fn from_query(query: &TraceQueryParams) -> Self {
        let mut predicates = Vec::new();
        if !query.service_name.is_empty() {
            predicates.push(Predicate::Service(query.service_name.clone()));
        }
        if !query.operation_name.is_empty() {
            predicates.push(Predicate::Operation(query.operation_name.clone()));
        }
        if query.duration_min != Duration::zero() {
            predicates.push(Predicate::MinDuration(query.duration_min));
        }
        if query.duration_max != Duration::zero() {
            predicates.push(Predicate::MaxDuration(query.duration_max));
        }
        if query.start_time_min.is_some() || query.start_time_max.is_some() {
            predicates.push(Predicate::TimeRange {
                min: query.start_time_min,
                max: query.start_time_max,
            });
        }
        if !query.attributes.is_empty() {
            predicates.push(Predicate::Attributes(query.attributes.clone()));
        }
        Self { predicates }
    }

    /// Logical AND, stopping at the first predicate that fails.
    pub fn matches(&self, trace: &Trace) -> bool {
        self.predicates.iter().all(|p| p.matches(trace))
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.predicates.iter().map(Predicate::name).collect()
    }
}
