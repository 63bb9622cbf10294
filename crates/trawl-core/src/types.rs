//! Core trace model for trawl.
//!
//! This module defines the read-only trace entities the pipeline matches
//! against. The shape follows OTLP/JSON: a [`Trace`] groups
//! [`ResourceSpans`], each resource owns [`ScopeSpans`], and each scope owns
//! [`Span`]s. Serde attributes mirror the OTLP/JSON field names so corpora
//! exported by collectors deserialize without a translation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Attribute key carrying the service identity of a resource or span.
pub const SERVICE_NAME_KEY: &str = "service.name";

// ---------------------------------------------------------------------------
// Trace hierarchy
// ---------------------------------------------------------------------------

/// One end-to-end request, as supplied by the trace store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    #[serde(default)]
    pub resource_spans: Vec<ResourceSpans>,
}

/// Spans emitted by a single resource (usually one service instance).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSpans {
    #[serde(default)]
    pub resource: Resource,
    #[serde(default)]
    pub scope_spans: Vec<ScopeSpans>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub attributes: Attributes,
}

impl Resource {
    /// The resource's `service.name`, if it carries one as a string.
    pub fn service_name(&self) -> Option<&str> {
        self.attributes.get_str(SERVICE_NAME_KEY)
    }
}

/// Spans produced by one instrumentation scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopeSpans {
    #[serde(default)]
    pub scope: Scope,
    #[serde(default)]
    pub spans: Vec<Span>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
}

/// A unit of work within a trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    /// Hex-encoded 16-byte trace id.
    #[serde(default)]
    pub trace_id: String,
    /// Hex-encoded 8-byte span id.
    #[serde(default)]
    pub span_id: String,
    /// Empty for root spans.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub parent_span_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: SpanKind,
    #[serde(default, with = "unix_nanos")]
    pub start_time_unix_nano: u64,
    #[serde(default, with = "unix_nanos")]
    pub end_time_unix_nano: u64,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
    #[serde(default)]
    pub status: Status,
}

impl Span {
    /// Wall-clock duration (end − start). Negative if the span's clock
    /// skewed backwards; never panics.
    pub fn duration(&self) -> chrono::Duration {
        let delta = i128::from(self.end_time_unix_nano) - i128::from(self.start_time_unix_nano);
        let clamped = delta.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64;
        chrono::Duration::nanoseconds(clamped)
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        nanos_to_datetime(self.start_time_unix_nano)
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        nanos_to_datetime(self.end_time_unix_nano)
    }

    pub fn is_error(&self) -> bool {
        self.status.code == StatusCode::Error
    }

    pub fn is_root(&self) -> bool {
        self.parent_span_id.is_empty()
    }
}

/// A timestamped annotation on a span (exception, log line, …).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default, with = "unix_nanos")]
    pub time_unix_nano: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub attributes: Attributes,
}

impl Event {
    pub fn time(&self) -> DateTime<Utc> {
        nanos_to_datetime(self.time_unix_nano)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default)]
    pub code: StatusCode,
}

impl Status {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: StatusCode::Error,
        }
    }
}

fn nanos_to_datetime(nanos: u64) -> DateTime<Utc> {
    DateTime::from_timestamp_nanos(i64::try_from(nanos).unwrap_or(i64::MAX))
}

// ---------------------------------------------------------------------------
// Span views
// ---------------------------------------------------------------------------

/// A span together with the resource that emitted it.
#[derive(Debug, Clone, Copy)]
pub struct SpanRef<'a> {
    pub resource: &'a Resource,
    pub span: &'a Span,
}

impl<'a> SpanRef<'a> {
    /// The span's service identity: its own `service.name` attribute if set,
    /// otherwise the owning resource's.
    pub fn service_name(&self) -> Option<&'a str> {
        self.span
            .attributes
            .get_str(SERVICE_NAME_KEY)
            .or_else(|| self.resource.service_name())
    }

    /// Look up an attribute on the span, falling back to the resource.
    pub fn attribute(&self, key: &str) -> Option<&'a AnyValue> {
        self.span
            .attributes
            .get(key)
            .or_else(|| self.resource.attributes.get(key))
    }
}

impl Trace {
    /// Every span in resource → scope → span order.
    pub fn spans(&self) -> impl Iterator<Item = SpanRef<'_>> + '_ {
        self.resource_spans.iter().flat_map(|rs| {
            rs.scope_spans.iter().flat_map(move |ss| {
                ss.spans.iter().map(move |span| SpanRef {
                    resource: &rs.resource,
                    span,
                })
            })
        })
    }

    pub fn span_count(&self) -> usize {
        self.resource_spans
            .iter()
            .flat_map(|rs| &rs.scope_spans)
            .map(|ss| ss.spans.len())
            .sum()
    }

    /// The trace id shared by the spans (taken from the first span).
    pub fn trace_id(&self) -> Option<&str> {
        self.spans()
            .map(|s| s.span.trace_id.as_str())
            .find(|id| !id.is_empty())
    }

    /// The first parentless span, or the first span if every span has a parent.
    pub fn root_span(&self) -> Option<SpanRef<'_>> {
        self.spans()
            .find(|s| s.span.is_root())
            .or_else(|| self.spans().next())
    }

    /// Earliest span start to latest span end.
    pub fn duration(&self) -> chrono::Duration {
        let mut start = u64::MAX;
        let mut end = 0u64;
        for s in self.spans() {
            start = start.min(s.span.start_time_unix_nano);
            end = end.max(s.span.end_time_unix_nano);
        }
        if start == u64::MAX {
            return chrono::Duration::zero();
        }
        chrono::Duration::nanoseconds(i64::try_from(end.saturating_sub(start)).unwrap_or(i64::MAX))
    }

    pub fn has_error(&self) -> bool {
        self.spans().any(|s| s.span.is_error())
    }

    pub fn summary(&self) -> TraceSummary {
        let root = self.root_span();
        TraceSummary {
            trace_id: self.trace_id().unwrap_or_default().to_string(),
            root_name: root.map(|r| r.span.name.clone()).unwrap_or_default(),
            root_service: root
                .and_then(|r| r.service_name())
                .unwrap_or("unknown")
                .to_string(),
            span_count: self.span_count(),
            duration: self.duration(),
            has_error: self.has_error(),
        }
    }
}

/// One-line overview of a trace, used when listing search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceSummary {
    pub trace_id: String,
    pub root_name: String,
    pub root_service: String,
    pub span_count: usize,
    #[serde(serialize_with = "serialize_millis")]
    pub duration: chrono::Duration,
    pub has_error: bool,
}

fn serialize_millis<S: Serializer>(d: &chrono::Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_i64(d.num_milliseconds())
}

// ---------------------------------------------------------------------------
// Span kind and status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SpanKind {
    #[default]
    Unspecified,
    Internal,
    Server,
    Client,
    Producer,
    Consumer,
}

impl SpanKind {
    fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            0 => SpanKind::Unspecified,
            1 => SpanKind::Internal,
            2 => SpanKind::Server,
            3 => SpanKind::Client,
            4 => SpanKind::Producer,
            5 => SpanKind::Consumer,
            _ => return None,
        })
    }

    fn code(self) -> i64 {
        match self {
            SpanKind::Unspecified => 0,
            SpanKind::Internal => 1,
            SpanKind::Server => 2,
            SpanKind::Client => 3,
            SpanKind::Producer => 4,
            SpanKind::Consumer => 5,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        let name = name.strip_prefix("SPAN_KIND_").unwrap_or(name);
        Some(match name.to_ascii_uppercase().as_str() {
            "UNSPECIFIED" => SpanKind::Unspecified,
            "INTERNAL" => SpanKind::Internal,
            "SERVER" => SpanKind::Server,
            "CLIENT" => SpanKind::Client,
            "PRODUCER" => SpanKind::Producer,
            "CONSUMER" => SpanKind::Consumer,
            _ => return None,
        })
    }
}

impl std::fmt::Display for SpanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpanKind::Unspecified => write!(f, "Unspecified"),
            SpanKind::Internal => write!(f, "Internal"),
            SpanKind::Server => write!(f, "Server"),
            SpanKind::Client => write!(f, "Client"),
            SpanKind::Producer => write!(f, "Producer"),
            SpanKind::Consumer => write!(f, "Consumer"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StatusCode {
    #[default]
    Unset,
    Ok,
    Error,
}

impl StatusCode {
    fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            0 => StatusCode::Unset,
            1 => StatusCode::Ok,
            2 => StatusCode::Error,
            _ => return None,
        })
    }

    fn code(self) -> i64 {
        match self {
            StatusCode::Unset => 0,
            StatusCode::Ok => 1,
            StatusCode::Error => 2,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        let name = name.strip_prefix("STATUS_CODE_").unwrap_or(name);
        Some(match name.to_ascii_uppercase().as_str() {
            "UNSET" => StatusCode::Unset,
            "OK" => StatusCode::Ok,
            "ERROR" => StatusCode::Error,
            _ => return None,
        })
    }
}

/// OTLP/JSON encodes enums as integers, but hand-written corpora often use
/// the proto names. Accept both, emit integers.
#[derive(Deserialize)]
#[serde(untagged)]
enum EnumRepr {
    Code(i64),
    Name(String),
}

impl Serialize for SpanKind {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for SpanKind {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let parsed = match EnumRepr::deserialize(d)? {
            EnumRepr::Code(c) => SpanKind::from_code(c),
            EnumRepr::Name(n) => SpanKind::from_name(&n),
        };
        parsed.ok_or_else(|| serde::de::Error::custom("unknown span kind"))
    }
}

impl Serialize for StatusCode {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for StatusCode {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let parsed = match EnumRepr::deserialize(d)? {
            EnumRepr::Code(c) => StatusCode::from_code(c),
            EnumRepr::Name(n) => StatusCode::from_name(&n),
        };
        parsed.ok_or_else(|| serde::de::Error::custom("unknown status code"))
    }
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// Ordered attribute map. Keys are unique; `put` replaces in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(Vec<KeyValue>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: AnyValue,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&AnyValue> {
        self.0.iter().find(|kv| kv.key == key).map(|kv| &kv.value)
    }

    /// The value under `key` if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AnyValue::as_str)
    }

    pub fn put(&mut self, key: impl Into<String>, value: impl Into<AnyValue>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|kv| kv.key == key) {
            Some(kv) => kv.value = value,
            None => self.0.push(KeyValue { key, value }),
        }
    }

    pub fn put_str(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.put(key, AnyValue::Str(value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnyValue)> {
        self.0.iter().map(|kv| (kv.key.as_str(), &kv.value))
    }
}

impl<K: Into<String>, V: Into<AnyValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Attributes::new();
        for (k, v) in iter {
            attrs.put(k, v);
        }
        attrs
    }
}

/// An OTLP attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnyValue {
    #[serde(rename = "stringValue")]
    Str(String),
    #[serde(rename = "boolValue")]
    Bool(bool),
    #[serde(rename = "intValue", with = "int_value")]
    Int(i64),
    #[serde(rename = "doubleValue")]
    Double(f64),
    #[serde(rename = "arrayValue")]
    Array(ArrayValue),
    #[serde(rename = "kvlistValue")]
    KvList(KeyValueList),
    /// Base64 text, kept as received.
    #[serde(rename = "bytesValue")]
    Bytes(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<AnyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyValueList {
    #[serde(default)]
    pub values: Vec<KeyValue>,
}

impl AnyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnyValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Canonical string rendering used for tag comparison and display.
    pub fn as_string(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for AnyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnyValue::Str(s) | AnyValue::Bytes(s) => f.write_str(s),
            AnyValue::Bool(b) => write!(f, "{b}"),
            AnyValue::Int(i) => write!(f, "{i}"),
            AnyValue::Double(d) => write!(f, "{d}"),
            AnyValue::Array(arr) => {
                f.write_str("[")?;
                for (i, v) in arr.values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            }
            AnyValue::KvList(list) => {
                f.write_str("{")?;
                for (i, kv) in list.values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}:{}", kv.key, kv.value)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<&str> for AnyValue {
    fn from(s: &str) -> Self {
        AnyValue::Str(s.to_string())
    }
}

impl From<String> for AnyValue {
    fn from(s: String) -> Self {
        AnyValue::Str(s)
    }
}

impl From<bool> for AnyValue {
    fn from(b: bool) -> Self {
        AnyValue::Bool(b)
    }
}

impl From<i64> for AnyValue {
    fn from(i: i64) -> Self {
        AnyValue::Int(i)
    }
}

impl From<f64> for AnyValue {
    fn from(d: f64) -> Self {
        AnyValue::Double(d)
    }
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

/// Either a JSON number or a decimal string; OTLP/JSON uses strings for
/// 64-bit integers.
#[derive(Deserialize)]
#[serde(untagged)]
enum IntRepr<T> {
    Num(T),
    Text(String),
}

mod unix_nanos {
    use super::IntRepr;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &u64, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&v.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        match IntRepr::<u64>::deserialize(d)? {
            IntRepr::Num(n) => Ok(n),
            IntRepr::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

mod int_value {
    use super::IntRepr;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &i64, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&v.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        match IntRepr::<i64>::deserialize(d)? {
            IntRepr::Num(n) => Ok(n),
            IntRepr::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
