//! Plain-text context blocks handed to the model for explanations.

use crate::duration::format_duration;
use crate::types::{Span, Trace};

const TRACE_TAG_PREFIXES: &[&str] = &["http."];
const TRACE_TAG_KEYS: &[&str] = &["db.system", "error"];

const SPAN_TAG_PREFIXES: &[&str] = &["http.", "db.", "rpc.", "messaging."];
const SPAN_TAG_KEYS: &[&str] = &["error", "exception.type"];

/// One block per span: name, resource service, kind, duration in
/// milliseconds, the HTTP/DB/error tags and any error status.
pub fn build_trace_context(trace: &Trace) -> String {
    let mut out = String::from("Trace Analysis Context:\n");

    for rs in &trace.resource_spans {
        let service = rs.resource.service_name().unwrap_or_default();
        for span in rs.scope_spans.iter().flat_map(|ss| &ss.spans) {
            out.push_str(&format!(
                "\n[Span] Name: {} | Service: {} | Kind: {}\n",
                span.name, service, span.kind
            ));
            out.push_str(&format!("  Duration: {}ms\n", span.duration().num_milliseconds()));

            for (key, value) in span.attributes.iter() {
                if is_selected(key, TRACE_TAG_PREFIXES, TRACE_TAG_KEYS) {
                    out.push_str(&format!("  Tag: {key} = {value}\n"));
                }
            }

            if span.is_error() {
                out.push_str(&format!("  Status: ERROR ({})\n", span.status.message));
            }
        }
    }

    out
}

/// Detailed view of one span, including its events as offsets from the
/// span start.
pub fn build_span_context(span: &Span, service: &str) -> String {
    let mut out = String::from("### Detailed Span Analysis\n");
    out.push_str(&format!("Operation: {}\n", span.name));
    out.push_str(&format!("Service: {service}\n"));
    out.push_str(&format!("Kind: {}\n", span.kind));
    out.push_str(&format!("Duration: {}\n", format_duration(span.duration())));

    out.push_str("\nAttributes:\n");
    for (key, value) in span.attributes.iter() {
        if is_selected(key, SPAN_TAG_PREFIXES, SPAN_TAG_KEYS) {
            out.push_str(&format!("- {key}: {value}\n"));
        }
    }

    if span.is_error() {
        out.push_str("\n[!] Status: ERROR\n");
        out.push_str(&format!("[!] Error Message: {}\n", span.status.message));
    }

    if !span.events.is_empty() {
        out.push_str("\nEvents (Internal Logs):\n");
        let start = span.start_time();
        for event in &span.events {
            let offset = event.time() - start;
            out.push_str(&format!("- T+{}: {}\n", format_duration(offset), event.name));
            for (key, value) in event.attributes.iter() {
                out.push_str(&format!("  └ {key}: {value}\n"));
            }
        }
    }

    out
}

fn is_selected(key: &str, prefixes: &[&str], keys: &[&str]) -> bool {
    keys.contains(&key) || prefixes.iter().any(|p| key.starts_with(p))
}
