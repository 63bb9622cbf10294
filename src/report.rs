//! Plain-text rendering of search results for the terminal.

use serde::Serialize;
use std::io::{self, Write};
use trawl_core::types::{SpanRef, TraceSummary};
use trawl_core::SearchResult;

/// `Traces returned: N`, then one block per trace with a line per span.
pub fn write_search_result(out: &mut impl Write, result: &SearchResult) -> io::Result<()> {
    writeln!(out, "Traces returned: {}", result.len())?;
    for (i, trace) in result.traces.iter().enumerate() {
        writeln!(out)?;
        writeln!(out, "Trace #{}", i + 1)?;
        for span in trace.spans() {
            writeln!(
                out,
                "trace={} span={} service={} error={}",
                span.span.trace_id,
                span.span.name,
                span.service_name().unwrap_or_default(),
                span_failed(&span)
            )?;
        }
    }
    Ok(())
}

/// Error status, or an explicit `error=true` attribute.
pub fn span_failed(span: &SpanRef<'_>) -> bool {
    span.span.is_error()
        || span
            .span
            .attributes
            .get("error")
            .is_some_and(|v| v.as_string() == "true")
}

/// JSON body returned by `POST /search`.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub count: usize,
    pub traces: Vec<TraceSummary>,
}

impl From<&SearchResult> for SearchResponse {
    fn from(result: &SearchResult) -> Self {
        Self {
            count: result.len(),
            traces: result.traces.iter().map(|t| t.summary()).collect(),
        }
    }
}
