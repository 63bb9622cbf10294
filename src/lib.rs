//! trawl: natural-language search over distributed traces.
//!
//! The binary wires the workspace crates together and exposes them on the
//! command line and over HTTP. This crate exposes that wiring as public
//! modules so integration tests can drive it without a real model.
//!
//! # Architecture
//!
//! ```text
//! trawl-store ──► Corpus ──► InMemoryTraceReader ──► QueryService
//!                                                         │
//! trawl-llm (SearchExtractor) ──► AssistedQueryService ◄──┘
//!                                        │
//!                              CLI (main.rs) / HTTP (server.rs)
//! ```

pub mod report;
pub mod server;

use std::path::Path;
use std::sync::Arc;
use trawl_core::config::Config;
use trawl_core::{
    AssistedQueryService, Assistant, Corpus, InMemoryTraceReader, QueryService, SpanRef, Trace,
};
use trawl_llm::SearchExtractor;

/// Service name reported for spans that carry none.
pub const UNKNOWN_SERVICE: &str = "unknown";

/// A loaded corpus plus the assisted search service running over it.
pub struct App {
    corpus: Corpus,
    service: AssistedQueryService,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("trace index {index} out of range (corpus has {len} traces)")]
    TraceOutOfRange { index: usize, len: usize },
    #[error("span index {index} out of range (trace {trace} has {count} spans)")]
    SpanOutOfRange {
        trace: usize,
        index: usize,
        count: usize,
    },
}

impl App {
    pub fn new(corpus: Corpus, assistant: Arc<dyn Assistant>, max_results: usize) -> Self {
        let reader = Arc::new(InMemoryTraceReader::new(corpus.clone()));
        let service = AssistedQueryService::new(assistant, QueryService::new(reader))
            .with_max_results(max_results);
        Self { corpus, service }
    }

    /// Load the corpus (`corpus_path` overrides `[corpus] path`) and build the
    /// configured model backend.
    pub fn from_config(config: &Config, corpus_path: Option<&Path>) -> anyhow::Result<Self> {
        let path = corpus_path.unwrap_or(&config.corpus.path);
        let traces = trawl_store::load_traces_from_file(path)?;
        tracing::info!(path = %path.display(), traces = traces.len(), "corpus loaded");

        let generator = trawl_llm::new_generator(&config.llm)?;
        let assistant = Arc::new(SearchExtractor::new(generator));
        Ok(Self::new(
            Corpus::new(traces),
            assistant,
            config.search.max_results,
        ))
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn service(&self) -> &AssistedQueryService {
        &self.service
    }

    pub fn trace(&self, index: usize) -> Result<&Arc<Trace>, LookupError> {
        self.corpus.trace(index).ok_or(LookupError::TraceOutOfRange {
            index,
            len: self.corpus.len(),
        })
    }

    pub fn span(&self, trace: usize, index: usize) -> Result<SpanRef<'_>, LookupError> {
        let count = self.trace(trace)?.span_count();
        self.corpus
            .span(trace, index)
            .ok_or(LookupError::SpanOutOfRange {
                trace,
                index,
                count,
            })
    }

    /// Explain the span at `(trace, index)`; the context names its service.
    pub async fn explain_span(&self, trace: usize, index: usize) -> anyhow::Result<String> {
        let span = self.span(trace, index)?;
        let service = span.service_name().unwrap_or(UNKNOWN_SERVICE);
        Ok(self.service.explain_span(span.span, service).await?)
    }
}
