//! Static trace corpora used across harnesses.
//!
//! [`demo_corpus`] is small and hand-built so each test can name exactly
//! which traces it expects. [`CORPUS_JSON`] is the same kind of data in the
//! on-disk OTLP/JSON format.

use super::builders::{SpanBuilder, TraceBuilder};
use trawl_core::types::SpanKind;
use trawl_core::Trace;

pub const CHECKOUT: u64 = 1;
pub const SEARCH: u64 = 2;
pub const CATALOG: u64 = 3;
pub const LOGIN: u64 = 4;

/// Four traces:
///
/// | id | services                               | notable                          |
/// |----|----------------------------------------|----------------------------------|
/// | 1  | frontend, payment-svc                  | 300ms root, Authorize errors 402 |
/// | 2  | frontend, search-db                    | 50ms root, postgres              |
/// | 3  | frontend, catalog-svc, catalog-db      | 100ms root, slow FETCH           |
/// | 4  | auth-api                               | 5ms login, one hour later        |
pub fn demo_corpus() -> Vec<Trace> {
    vec![
        TraceBuilder::new(CHECKOUT)
            .resource(
                "frontend",
                vec![SpanBuilder::new("POST /checkout")
                    .kind(SpanKind::Server)
                    .duration_ms(300)
                    .attr("http.method", "POST")
                    .attr("http.status_code", 402i64)],
            )
            .resource(
                "payment-svc",
                vec![SpanBuilder::new("Authorize")
                    .kind(SpanKind::Client)
                    .start_ms(50)
                    .duration_ms(150)
                    .attr("http.status_code", 402i64)
                    .error("insufficient_funds")
                    .event("card declined", 120)],
            )
            .build(),
        TraceBuilder::new(SEARCH)
            .resource(
                "frontend",
                vec![SpanBuilder::new("GET /search")
                    .kind(SpanKind::Server)
                    .start_ms(1_000)
                    .duration_ms(50)
                    .attr("http.method", "GET")
                    .attr("http.status_code", 200i64)],
            )
            .resource(
                "search-db",
                vec![SpanBuilder::new("SELECT products")
                    .kind(SpanKind::Client)
                    .start_ms(1_005)
                    .duration_ms(20)
                    .attr("db.system", "postgres")],
            )
            .build(),
        TraceBuilder::new(CATALOG)
            .resource(
                "frontend",
                vec![SpanBuilder::new("GET /items")
                    .kind(SpanKind::Server)
                    .start_ms(2_000)
                    .duration_ms(100)
                    .attr("http.method", "GET")
                    .attr("http.status_code", 200i64)],
            )
            .resource(
                "catalog-svc",
                vec![SpanBuilder::new("GetItems")
                    .kind(SpanKind::Server)
                    .start_ms(2_010)
                    .duration_ms(80)],
            )
            .resource(
                "catalog-db",
                vec![SpanBuilder::new("FETCH")
                    .kind(SpanKind::Client)
                    .start_ms(2_020)
                    .duration_ms(60)
                    .attr("slow_query", true)],
            )
            .build(),
        TraceBuilder::new(LOGIN)
            .resource(
                "auth-api",
                vec![SpanBuilder::new("login")
                    .kind(SpanKind::Server)
                    .start_ms(3_600_000)
                    .duration_ms(5)
                    .attr("http.method", "POST")],
            )
            .build(),
    ]
}

/// Numeric id of a trace built by [`TraceBuilder::new`].
pub fn id_of(trace: &Trace) -> u64 {
    trace
        .trace_id()
        .and_then(|id| u64::from_str_radix(id, 16).ok())
        .unwrap_or_default()
}

/// Two traces in the on-disk format: mixed numeric and named enums,
/// stringified nanosecond timestamps, and an integer attribute.
pub const CORPUS_JSON: &str = r#"[
  {
    "resourceSpans": [
      {
        "resource": {
          "attributes": [
            {"key": "service.name", "value": {"stringValue": "frontend"}}
          ]
        },
        "scopeSpans": [
          {
            "scope": {"name": "demo"},
            "spans": [
              {
                "traceId": "0000000000000000000000000000000a",
                "spanId": "00000000000000a1",
                "name": "GET /items",
                "kind": "SPAN_KIND_SERVER",
                "startTimeUnixNano": "1704110400000000000",
                "endTimeUnixNano": "1704110400100000000",
                "attributes": [
                  {"key": "http.method", "value": {"stringValue": "GET"}},
                  {"key": "http.status_code", "value": {"intValue": "200"}}
                ],
                "status": {}
              }
            ]
          }
        ]
      }
    ]
  },
  {
    "resourceSpans": [
      {
        "resource": {
          "attributes": [
            {"key": "service.name", "value": {"stringValue": "payment-svc"}}
          ]
        },
        "scopeSpans": [
          {
            "scope": {},
            "spans": [
              {
                "traceId": "0000000000000000000000000000000b",
                "spanId": "00000000000000b1",
                "name": "Authorize",
                "kind": 3,
                "startTimeUnixNano": 1704110401050000000,
                "endTimeUnixNano": 1704110401200000000,
                "attributes": [],
                "status": {"code": 2, "message": "insufficient_funds"}
              }
            ]
          }
        ]
      }
    ]
  }
]"#;
