#![allow(unused)]
//! Trace reader integration harness.
//!
//! # What this covers
//!
//! - **Corpus order**: matching traces are yielded in corpus order, each
//!   exactly once.
//! - **Laziness**: the reader evaluates a corpus entry only when the consumer
//!   pulls. Taking the first match and dropping the stream leaves the rest of
//!   the corpus unevaluated.
//! - **Mid-stream cancellation**: cancelling between pulls yields exactly one
//!   `Err(Cancelled)`, evaluates no further entries, and then ends.
//! - **Search depth**: a depth of N stops after N matches without scanning
//!   the tail; zero is unbounded.
//! - **Concurrent scans**: independent scans over one shared reader on
//!   several threads see identical results.
//! - **Trait object**: the same behavior through `Arc<dyn TraceReader>` and
//!   the `QueryService` facade.
//!
//! # What this does NOT cover
//!
//! - Per-dimension predicate semantics (see matcher_harness)
//! - Loading corpora from disk (see store_harness)
//!
//! # Running
//!
//! ```sh
//! cargo test --test reader_harness
//! ```

mod common;
use common::*;

use chrono::Duration;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use trawl_core::reader::TraceBatch;
use trawl_core::{InMemoryTraceReader, QueryError, QueryService, Trace, TraceQueryParams, TraceReader};

fn demo_reader() -> InMemoryTraceReader {
    InMemoryTraceReader::new(demo_corpus())
}

fn flatten(batches: Vec<TraceBatch>) -> Vec<Arc<Trace>> {
    batches.into_iter().flatten().collect()
}

/// `n` single-span traces, every one lasting 10ms.
fn uniform_corpus(n: u64) -> Vec<Trace> {
    (1..=n)
        .map(|id| single_span_trace(id, "svc", "op", 10))
        .collect()
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

#[test]
fn matches_arrive_in_corpus_order() {
    let reader = demo_reader();
    let batches: Result<Vec<_>, _> = reader
        .find_traces(
            CancellationToken::new(),
            TraceQueryParams::default().with_service("frontend"),
        )
        .collect();

    assert_trace_ids!(flatten(batches.unwrap()), [CHECKOUT, SEARCH, CATALOG]);
}

#[test]
fn stream_yields_shared_corpus_entries() {
    let reader = demo_reader();
    let first = reader
        .find_traces(CancellationToken::new(), TraceQueryParams::default())
        .next()
        .unwrap()
        .unwrap();

    let stored = reader.corpus().trace(0).unwrap();
    assert!(Arc::ptr_eq(&first[0], stored));
}

#[test]
fn no_match_scans_everything_and_ends() {
    let reader = demo_reader();
    let mut scan = reader.scan(
        CancellationToken::new(),
        TraceQueryParams::default().with_service("inventory"),
    );

    assert!(scan.next().is_none());
    assert_eq!(scan.evaluated(), 4);
    assert_eq!(scan.matched(), 0);
    assert!(!scan.is_cancelled());
}

#[test]
fn empty_corpus_ends_immediately() {
    let reader = InMemoryTraceReader::default();
    let mut stream = reader.find_traces(CancellationToken::new(), TraceQueryParams::default());
    assert!(stream.next().is_none());
}

// ---------------------------------------------------------------------------
// Laziness
// ---------------------------------------------------------------------------

#[test]
fn nothing_is_evaluated_before_the_first_pull() {
    let reader = InMemoryTraceReader::new(uniform_corpus(100));
    let scan = reader.scan(CancellationToken::new(), TraceQueryParams::default());
    assert_eq!(scan.evaluated(), 0);
}

#[test]
fn consumer_stopping_early_leaves_tail_unscanned() {
    let reader = InMemoryTraceReader::new(uniform_corpus(1_000));
    let mut scan = reader.scan(CancellationToken::new(), TraceQueryParams::default());

    let taken: Vec<_> = scan.by_ref().take(3).collect();
    assert_eq!(taken.len(), 3);
    assert_eq!(scan.evaluated(), 3);
}

#[test]
fn pulls_skip_non_matching_entries_in_one_step() {
    // Only trace 3 matches; one pull walks entries 1..=3 and stops.
    let reader = demo_reader();
    let mut scan = reader.scan(
        CancellationToken::new(),
        TraceQueryParams::default().with_operation("FETCH"),
    );

    let batch = scan.next().unwrap().unwrap();
    assert_trace_ids!(batch, [CATALOG]);
    assert_eq!(scan.evaluated(), 3);
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[test]
fn cancellation_between_pulls_stops_scan() {
    let reader = InMemoryTraceReader::new(uniform_corpus(50));
    let cancel = CancellationToken::new();
    let mut scan = reader.scan(cancel.clone(), TraceQueryParams::default());

    assert!(matches!(scan.next(), Some(Ok(_))));
    assert!(matches!(scan.next(), Some(Ok(_))));
    cancel.cancel();

    assert_eq!(scan.next(), Some(Err(QueryError::Cancelled)));
    assert_eq!(scan.next(), None);
    assert_eq!(scan.next(), None);
    assert_eq!(scan.evaluated(), 2);
    assert!(scan.is_cancelled());
}

#[test]
fn cancelling_a_child_token_cancels_scan() {
    let reader = demo_reader();
    let parent = CancellationToken::new();
    let mut stream = reader.find_traces(parent.child_token(), TraceQueryParams::default());

    parent.cancel();
    assert_eq!(stream.next(), Some(Err(QueryError::Cancelled)));
    assert!(stream.next().is_none());
}

#[test]
fn cancelling_one_scan_leaves_others_running() {
    let reader = demo_reader();
    let doomed = CancellationToken::new();
    let mut a = reader.scan(doomed.clone(), TraceQueryParams::default());
    let b = reader.scan(CancellationToken::new(), TraceQueryParams::default());

    doomed.cancel();
    assert_eq!(a.next(), Some(Err(QueryError::Cancelled)));
    assert_eq!(b.count(), 4);
}

// ---------------------------------------------------------------------------
// Search depth
// ---------------------------------------------------------------------------

#[test]
fn search_depth_caps_matches_without_scanning_tail() {
    let reader = InMemoryTraceReader::new(uniform_corpus(100));
    let mut scan = reader.scan(
        CancellationToken::new(),
        TraceQueryParams::default().with_search_depth(5),
    );

    let got: Vec<_> = scan.by_ref().collect();
    assert_eq!(got.len(), 5);
    assert_eq!(scan.evaluated(), 5);
    assert_eq!(scan.matched(), 5);
}

#[test]
fn search_depth_counts_matches_not_entries() {
    let reader = demo_reader();
    let q = TraceQueryParams::default()
        .with_min_duration(Duration::milliseconds(60))
        .with_search_depth(1);
    let mut scan = reader.scan(CancellationToken::new(), q);

    let batches: Vec<_> = scan.by_ref().map(Result::unwrap).collect();
    assert_trace_ids!(flatten(batches), [CHECKOUT]);
    assert_eq!(scan.evaluated(), 1);
}

#[test]
fn zero_search_depth_is_unbounded() {
    let reader = InMemoryTraceReader::new(uniform_corpus(250));
    let count = reader
        .find_traces(CancellationToken::new(), TraceQueryParams::default().with_search_depth(0))
        .count();
    assert_eq!(count, 250);
}

// ---------------------------------------------------------------------------
// Concurrency and trait objects
// ---------------------------------------------------------------------------

#[test]
fn concurrent_scans_over_shared_reader_agree() {
    let reader = InMemoryTraceReader::new(uniform_corpus(200));
    let query = TraceQueryParams::default().with_service("svc");

    let counts: Vec<usize> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let reader = &reader;
                let query = query.clone();
                s.spawn(move || {
                    reader
                        .find_traces(CancellationToken::new(), query)
                        .map(|b| b.unwrap().len())
                        .sum::<usize>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(counts, vec![200; 4]);
}

#[test]
fn query_service_delegates_to_reader() {
    let reader: Arc<dyn TraceReader> = Arc::new(demo_reader());
    let service = QueryService::new(reader);

    let batches: Result<Vec<_>, _> = service
        .find_traces(
            CancellationToken::new(),
            TraceQueryParams::default().with_attribute("db.system", "postgres"),
        )
        .collect();
    assert_trace_ids!(flatten(batches.unwrap()), [SEARCH]);
}
