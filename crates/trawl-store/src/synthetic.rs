//! Deterministic synthetic corpus.
//!
//! Traces rotate through three small stories, one second apart starting at
//! 2024-01-01T12:00:00Z:
//!
//! | # | root              | children                                             |
//! |---|-------------------|------------------------------------------------------|
//! | 0 | `POST /checkout`  | `payment-svc Authorize` fails with 402               |
//! | 1 | `GET /search`     | fast `search-db SELECT products` (postgres)          |
//! | 2 | `GET /items`      | `catalog-svc GetItems` → slow `catalog-db FETCH`     |
//!
//! Every span lives in its own resource and carries `service.name` both on
//! the resource and on the span itself. Ids are derived from the trace index
//! so the same `n` always yields the same corpus.

use crate::otlp::LoadError;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::path::Path;
use trawl_core::types::{
    Attributes, ResourceSpans, ScopeSpans, Span, SpanKind, Status, SERVICE_NAME_KEY,
};
use trawl_core::Trace;

const STORY_COUNT: usize = 3;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Generate `n` traces.
pub fn generate_traces(n: usize) -> Vec<Trace> {
    (0..n)
        .map(|i| {
            let mut story = Story::new(i, base_time() + Duration::seconds(i as i64));
            match i % STORY_COUNT {
                0 => checkout(&mut story),
                1 => search(&mut story),
                _ => catalog(&mut story),
            }
            story.finish()
        })
        .collect()
}

/// Write a corpus in the format [`crate::load_traces_from_file`] reads.
pub fn write_traces(path: impl AsRef<Path>, traces: &[Trace]) -> Result<(), LoadError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(traces).map_err(LoadError::Encode)?;
    std::fs::write(path, json).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), traces = traces.len(), "wrote trace corpus");
    Ok(())
}

// ---------------------------------------------------------------------------
// Stories
// ---------------------------------------------------------------------------

fn checkout(story: &mut Story) {
    let fe = story.span("frontend", "POST /checkout", None, SpanKind::Server, 0, 300);
    story.attrs(fe).put("http.status_code", 402i64);

    let pay = story.span("payment-svc", "Authorize", Some(fe), SpanKind::Client, 50, 150);
    story.spans[pay].span.status = Status::error("insufficient_funds");
    story.attrs(pay).put("http.status_code", 402i64);
}

fn search(story: &mut Story) {
    let fe = story.span("frontend", "GET /search", None, SpanKind::Server, 0, 50);
    set_http(story.attrs(fe), "GET", 200);

    let db = story.span("search-db", "SELECT products", Some(fe), SpanKind::Client, 5, 20);
    story.attrs(db).put_str("db.system", "postgres");
}

fn catalog(story: &mut Story) {
    let fe = story.span("frontend", "GET /items", None, SpanKind::Server, 0, 100);
    set_http(story.attrs(fe), "GET", 200);

    let cat = story.span("catalog-svc", "GetItems", Some(fe), SpanKind::Server, 10, 80);
    let db = story.span("catalog-db", "FETCH", Some(cat), SpanKind::Client, 20, 60);
    story.attrs(db).put("slow_query", true);
}

fn set_http(attrs: &mut Attributes, method: &str, code: i64) {
    attrs.put_str("http.method", method);
    attrs.put("http.status_code", code);
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Story {
    index: usize,
    start: DateTime<Utc>,
    trace_id: String,
    spans: Vec<PendingSpan>,
}

/// A span with its owning service, before being wrapped into OTLP shape.
struct PendingSpan {
    service: &'static str,
    span: Span,
}

impl Story {
    fn new(index: usize, start: DateTime<Utc>) -> Self {
        Self {
            index,
            start,
            trace_id: format!("{:032x}", index + 1),
            spans: Vec::new(),
        }
    }

    /// Add a span `offset_ms` after the story start; returns its position.
    fn span(
        &mut self,
        service: &'static str,
        name: &str,
        parent: Option<usize>,
        kind: SpanKind,
        offset_ms: i64,
        duration_ms: i64,
    ) -> usize {
        let start = self.start + Duration::milliseconds(offset_ms);
        let end = start + Duration::milliseconds(duration_ms);
        let position = self.spans.len();

        let mut span = Span {
            trace_id: self.trace_id.clone(),
            span_id: format!("{:016x}", ((self.index as u64 + 1) << 8) | (position as u64 + 1)),
            parent_span_id: parent
                .map(|p| self.spans[p].span.span_id.clone())
                .unwrap_or_default(),
            name: name.to_string(),
            kind,
            start_time_unix_nano: unix_nanos(start),
            end_time_unix_nano: unix_nanos(end),
            ..Default::default()
        };
        span.attributes.put_str(SERVICE_NAME_KEY, service);

        self.spans.push(PendingSpan { service, span });
        position
    }

    fn attrs(&mut self, position: usize) -> &mut Attributes {
        &mut self.spans[position].span.attributes
    }

    fn finish(self) -> Trace {
        let resource_spans = self
            .spans
            .into_iter()
            .map(|entry| {
                let mut rs = ResourceSpans::default();
                rs.resource.attributes.put_str(SERVICE_NAME_KEY, entry.service);
                rs.scope_spans.push(ScopeSpans {
                    spans: vec![entry.span],
                    ..Default::default()
                });
                rs
            })
            .collect();
        Trace { resource_spans }
    }
}

fn unix_nanos(t: DateTime<Utc>) -> u64 {
    t.timestamp_nanos_opt()
        .and_then(|n| u64::try_from(n).ok())
        .unwrap_or_default()
}
