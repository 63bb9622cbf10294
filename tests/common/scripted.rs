//! Scripted collaborators: an [`Assistant`] that replays canned IRs and a
//! [`TraceReader`] wrapper that counts how often it is asked for a stream.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use trawl_core::{
    Assistant, ExtractionError, InMemoryTraceReader, SearchIR, TraceQueryParams, TraceReader,
    TraceStream,
};

/// What the scripted assistant answers to `extract_search_ir`.
pub enum Script {
    Ir(SearchIR),
    Empty,
    BadJson(&'static str),
}

/// Replays one [`Script`] for every extraction and records the text it was
/// given. Explanations echo the first line of their context.
pub struct ScriptedAssistant {
    script: Script,
    seen: Mutex<Vec<String>>,
}

impl ScriptedAssistant {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn returning(ir: SearchIR) -> Arc<Self> {
        Self::new(Script::Ir(ir))
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Assistant for ScriptedAssistant {
    async fn extract_search_ir(&self, text: &str) -> Result<SearchIR, ExtractionError> {
        self.seen.lock().unwrap().push(text.to_string());
        match &self.script {
            Script::Ir(ir) => Ok(ir.clone()),
            Script::Empty => Err(ExtractionError::EmptyResponse),
            Script::BadJson(raw) => Err(serde_json::from_str::<SearchIR>(raw).unwrap_err().into()),
        }
    }

    async fn explain_trace(&self, context: &str) -> Result<String, ExtractionError> {
        Ok(first_line(context))
    }

    async fn explain_span(&self, context: &str) -> Result<String, ExtractionError> {
        Ok(first_line(context))
    }
}

fn first_line(context: &str) -> String {
    context.lines().next().unwrap_or_default().to_string()
}

/// Wraps an [`InMemoryTraceReader`] and counts `find_traces` calls.
pub struct CountingReader {
    inner: InMemoryTraceReader,
    calls: AtomicUsize,
}

impl CountingReader {
    pub fn new(inner: InMemoryTraceReader) -> Arc<Self> {
        Arc::new(Self {
            inner,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TraceReader for CountingReader {
    fn find_traces(&self, cancel: CancellationToken, query: TraceQueryParams) -> TraceStream<'_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find_traces(cancel, query)
    }
}
