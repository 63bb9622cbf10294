//! Trace reader: lazy, cancellable streams of matching traces.
//!
//! A [`TraceReader`] turns a query into a [`TraceStream`]: a pull-driven
//! iterator that scans the corpus one entry at a time, only when the
//! consumer asks for the next item. Nothing is precomputed and nothing runs
//! in the background, so dropping the stream stops the scan.
//!
//! Cancellation is cooperative. The stream checks its
//! [`CancellationToken`] before evaluating every corpus entry; once the
//! token fires it yields a single `Err(QueryError::Cancelled)` and is fused.
//!
//! ```text
//! corpus ──► [cancelled?] ──► predicates (AND) ──► Ok(batch) ──► consumer
//!                 │
//!                 └──► Err(Cancelled), then None forever
//! ```

use crate::matcher::TracePredicates;
use crate::query::TraceQueryParams;
use crate::types::{SpanRef, Trace};
use std::iter::FusedIterator;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// One unit of stream output. The in-memory reader yields one trace per
/// batch; other readers may group several.
pub type TraceBatch = Vec<Arc<Trace>>;

/// A lazy sequence of matching batches, ending early on the first error.
pub type TraceStream<'a> = Box<dyn Iterator<Item = Result<TraceBatch, QueryError>> + Send + 'a>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("query cancelled")]
    Cancelled,
}

/// Source of matching traces for a query.
pub trait TraceReader: Send + Sync {
    fn find_traces(&self, cancel: CancellationToken, query: TraceQueryParams) -> TraceStream<'_>;
}

// ---------------------------------------------------------------------------
// Corpus
// ---------------------------------------------------------------------------

/// An ordered, immutable collection of traces shared between queries.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    traces: Arc<[Arc<Trace>]>,
}

impl Corpus {
    pub fn new(traces: Vec<Trace>) -> Self {
        Self {
            traces: traces.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    pub fn trace(&self, index: usize) -> Option<&Arc<Trace>> {
        self.traces.get(index)
    }

    /// The `span_index`-th span of a trace, counting across resources and
    /// scopes in order.
    pub fn span(&self, trace_index: usize, span_index: usize) -> Option<SpanRef<'_>> {
        self.trace(trace_index)?.spans().nth(span_index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<Trace>> {
        self.traces.iter()
    }
}

impl From<Vec<Trace>> for Corpus {
    fn from(traces: Vec<Trace>) -> Self {
        Corpus::new(traces)
    }
}

// ---------------------------------------------------------------------------
// In-memory reader
// ---------------------------------------------------------------------------

/// Linear-scan reader over an in-memory [`Corpus`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryTraceReader {
    corpus: Corpus,
}

impl InMemoryTraceReader {
    pub fn new(corpus: impl Into<Corpus>) -> Self {
        Self {
            corpus: corpus.into(),
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// The concrete scan behind [`TraceReader::find_traces`], exposing its
    /// evaluation counters.
    pub fn scan(&self, cancel: CancellationToken, query: TraceQueryParams) -> TraceScan<'_> {
        let predicates = TracePredicates::from_query(&query);
        tracing::debug!(
            predicates = ?predicates.names(),
            search_depth = query.search_depth,
            corpus = self.corpus.len(),
            "starting trace scan"
        );
        TraceScan {
            entries: self.corpus.iter(),
            predicates,
            cancel,
            limit: query.search_depth,
            evaluated: 0,
            matched: 0,
            state: ScanState::Running,
        }
    }
}

impl TraceReader for InMemoryTraceReader {
    fn find_traces(&self, cancel: CancellationToken, query: TraceQueryParams) -> TraceStream<'_> {
        Box::new(self.scan(cancel, query))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Running,
    Exhausted,
    Cancelled,
}

/// Single-pass cursor over a corpus. Each entry is evaluated at most once.
#[derive(Debug)]
pub struct TraceScan<'a> {
    entries: std::slice::Iter<'a, Arc<Trace>>,
    predicates: TracePredicates,
    cancel: CancellationToken,
    limit: usize,
    evaluated: usize,
    matched: usize,
    state: ScanState,
}

impl TraceScan<'_> {
    /// Corpus entries the predicates have been evaluated against so far.
    pub fn evaluated(&self) -> usize {
        self.evaluated
    }

    /// Matching traces yielded so far.
    pub fn matched(&self) -> usize {
        self.matched
    }

    pub fn is_cancelled(&self) -> bool {
        self.state == ScanState::Cancelled
    }
}

impl Iterator for TraceScan<'_> {
    type Item = Result<TraceBatch, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state != ScanState::Running {
            return None;
        }
        if self.limit != 0 && self.matched >= self.limit {
            self.state = ScanState::Exhausted;
            return None;
        }

        loop {
            if self.cancel.is_cancelled() {
                self.state = ScanState::Cancelled;
                return Some(Err(QueryError::Cancelled));
            }

            let Some(trace) = self.entries.next() else {
                self.state = ScanState::Exhausted;
                return None;
            };

            self.evaluated += 1;
            if self.predicates.matches(trace) {
                self.matched += 1;
                return Some(Ok(vec![Arc::clone(trace)]));
            }
        }
    }
}

impl FusedIterator for TraceScan<'_> {}

impl Drop for TraceScan<'_> {
    fn drop(&mut self) {
        tracing::debug!(
            evaluated = self.evaluated,
            matched = self.matched,
            state = ?self.state,
            "trace scan finished"
        );
    }
}
