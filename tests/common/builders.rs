//! Test builders: ergonomic constructors for `Span`, `Trace`, and `SearchIR`.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use trawl_core::types::{
    AnyValue, Event, ResourceSpans, ScopeSpans, Span, SpanKind, Status, SERVICE_NAME_KEY,
};
use trawl_core::{SearchIR, Trace};

/// 2024-01-01T12:00:00Z in Unix nanoseconds.
pub const BASE_UNIX_NANOS: u64 = 1_704_110_400_000_000_000;

const NANOS_PER_MILLI: u64 = 1_000_000;

// ---------------------------------------------------------------------------
// SpanBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`Span`] fixtures. Times are milliseconds after
/// [`BASE_UNIX_NANOS`].
///
/// # Example
///
/// ```rust
/// let span = SpanBuilder::new("Authorize")
///     .start_ms(50)
///     .duration_ms(150)
///     .attr("http.status_code", 402i64)
///     .error("insufficient_funds")
///     .build();
/// ```
pub struct SpanBuilder {
    span: Span,
    start_ms: u64,
    duration_ms: u64,
}

impl SpanBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            span: Span {
                name: name.into(),
                kind: SpanKind::Internal,
                ..Default::default()
            },
            start_ms: 0,
            duration_ms: 10,
        }
    }

    pub fn start_ms(mut self, ms: u64) -> Self {
        self.start_ms = ms;
        self
    }

    pub fn duration_ms(mut self, ms: u64) -> Self {
        self.duration_ms = ms;
        self
    }

    pub fn kind(mut self, kind: SpanKind) -> Self {
        self.span.kind = kind;
        self
    }

    /// Set the span-level `service.name` attribute.
    pub fn service(self, service: &str) -> Self {
        self.attr(SERVICE_NAME_KEY, service)
    }

    pub fn attr(mut self, key: &str, value: impl Into<AnyValue>) -> Self {
        self.span.attributes.put(key, value);
        self
    }

    pub fn error(mut self, message: &str) -> Self {
        self.span.status = Status::error(message);
        self
    }

    pub fn parent(mut self, span_id: &str) -> Self {
        self.span.parent_span_id = span_id.to_string();
        self
    }

    pub fn event(mut self, name: &str, offset_ms: u64) -> Self {
        self.span.events.push(Event {
            time_unix_nano: BASE_UNIX_NANOS + (self.start_ms + offset_ms) * NANOS_PER_MILLI,
            name: name.to_string(),
            ..Default::default()
        });
        self
    }

    pub fn build(mut self) -> Span {
        self.span.start_time_unix_nano = BASE_UNIX_NANOS + self.start_ms * NANOS_PER_MILLI;
        self.span.end_time_unix_nano =
            self.span.start_time_unix_nano + self.duration_ms * NANOS_PER_MILLI;
        self.span
    }
}

// ---------------------------------------------------------------------------
// TraceBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`Trace`] fixtures. Each [`TraceBuilder::resource`]
/// call adds one resource with its own `service.name`.
///
/// ```rust
/// let trace = TraceBuilder::new(1)
///     .resource("frontend", vec![SpanBuilder::new("GET /items").duration_ms(100)])
///     .resource("catalog-db", vec![SpanBuilder::new("FETCH").duration_ms(60)])
///     .build();
/// ```
pub struct TraceBuilder {
    trace_id: String,
    resources: Vec<ResourceSpans>,
    next_span: u64,
}

impl TraceBuilder {
    pub fn new(id: u64) -> Self {
        Self {
            trace_id: format!("{id:032x}"),
            resources: Vec::new(),
            next_span: 1,
        }
    }

    pub fn resource(mut self, service: &str, spans: Vec<SpanBuilder>) -> Self {
        let mut rs = ResourceSpans::default();
        if !service.is_empty() {
            rs.resource.attributes.put_str(SERVICE_NAME_KEY, service);
        }
        let spans = spans
            .into_iter()
            .map(|b| {
                let mut span = b.build();
                span.trace_id = self.trace_id.clone();
                span.span_id = format!("{:016x}", self.next_span);
                self.next_span += 1;
                span
            })
            .collect();
        rs.scope_spans.push(ScopeSpans {
            spans,
            ..Default::default()
        });
        self.resources.push(rs);
        self
    }

    pub fn build(self) -> Trace {
        Trace {
            resource_spans: self.resources,
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

/// A single-span trace for `service` whose span lasts `duration_ms`.
pub fn single_span_trace(id: u64, service: &str, name: &str, duration_ms: u64) -> Trace {
    TraceBuilder::new(id)
        .resource(service, vec![SpanBuilder::new(name).duration_ms(duration_ms)])
        .build()
}

/// Fluent [`SearchIR`] construction for harnesses.
#[derive(Default)]
pub struct IrBuilder {
    ir: SearchIR,
}

impl IrBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn service(mut self, s: &str) -> Self {
        self.ir.service = Some(s.to_string());
        self
    }

    pub fn operation(mut self, s: &str) -> Self {
        self.ir.operation = Some(s.to_string());
        self
    }

    pub fn min_duration(mut self, s: &str) -> Self {
        self.ir.min_duration = Some(s.to_string());
        self
    }

    pub fn max_duration(mut self, s: &str) -> Self {
        self.ir.max_duration = Some(s.to_string());
        self
    }

    pub fn start_time(mut self, s: &str) -> Self {
        self.ir.start_time = Some(s.to_string());
        self
    }

    pub fn end_time(mut self, s: &str) -> Self {
        self.ir.end_time = Some(s.to_string());
        self
    }

    pub fn tag(mut self, k: &str, v: &str) -> Self {
        self.ir.tags.insert(k.to_string(), v.to_string());
        self
    }

    pub fn build(self) -> SearchIR {
        self.ir
    }
}
