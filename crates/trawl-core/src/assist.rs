//! Assisted search: free text in, matching traces out.
//!
//! [`AssistedQueryService`] drives the whole pipeline:
//!
//! ```text
//! text ──► Assistant::extract_search_ir ──► validate ──► map_ir ──► QueryService
//!                                              │                         │
//!                                              └─ warn + Err             └─ drain, first Err aborts
//! ```
//!
//! The language model sits behind the [`Assistant`] trait so the pipeline
//! can be exercised with scripted collaborators in tests.

use crate::explain::{build_span_context, build_trace_context};
use crate::ir::{validate, SearchIR, ValidationError};
use crate::query::{map_ir, MappingError};
use crate::reader::QueryError;
use crate::service::QueryService;
use crate::types::{Span, Trace};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The external language-model collaborator.
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Turn free text into a candidate IR. The result is untrusted.
    async fn extract_search_ir(&self, text: &str) -> Result<SearchIR, ExtractionError>;

    async fn explain_trace(&self, context: &str) -> Result<String, ExtractionError>;

    async fn explain_span(&self, context: &str) -> Result<String, ExtractionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("model backend failed: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("model returned an empty response")]
    EmptyResponse,
    #[error("model output is not a valid search IR: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl ExtractionError {
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        ExtractionError::Backend(Box::new(err))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("invalid search: {0}")]
    Validation(#[from] ValidationError),
    #[error("cannot build query: {0}")]
    Mapping(#[from] MappingError),
    #[error(transparent)]
    Query(#[from] QueryError),
}

#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    pub traces: Vec<Arc<Trace>>,
}

impl SearchResult {
    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }
}

pub struct AssistedQueryService {
    assistant: Arc<dyn Assistant>,
    query: QueryService,
    max_results: usize,
}

impl AssistedQueryService {
    pub fn new(assistant: Arc<dyn Assistant>, query: QueryService) -> Self {
        Self {
            assistant,
            query,
            max_results: 0,
        }
    }

    /// Cap the number of traces a search may return; zero is unbounded.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn query_service(&self) -> &QueryService {
        &self.query
    }

    pub async fn search(
        &self,
        cancel: &CancellationToken,
        text: &str,
    ) -> Result<SearchResult, SearchError> {
        let ir = self.assistant.extract_search_ir(text).await?;
        tracing::debug!(?ir, "extracted search IR");

        if let Err(err) = validate(&ir) {
            tracing::warn!(%err, "rejecting extracted search IR");
            return Err(err.into());
        }

        let params = map_ir(&ir)?.with_search_depth(self.max_results);
        tracing::debug!(?params, "mapped trace query");

        let mut result = SearchResult::default();
        for batch in self.query.find_traces(cancel.clone(), params) {
            result.traces.extend(batch?);
        }
        tracing::debug!(matched = result.len(), "search complete");
        Ok(result)
    }

    pub async fn explain_trace(&self, trace: &Trace) -> Result<String, ExtractionError> {
        let context = build_trace_context(trace);
        self.assistant.explain_trace(&context).await
    }

    pub async fn explain_span(&self, span: &Span, service: &str) -> Result<String, ExtractionError> {
        let context = build_span_context(span, service);
        self.assistant.explain_span(&context).await
    }
}

impl std::fmt::Debug for AssistedQueryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistedQueryService")
            .field("max_results", &self.max_results)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
