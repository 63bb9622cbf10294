//! trawl-core: natural-language trace search core library.
//!
//! This crate holds the query-translation and matching pipeline plus the
//! trace model it runs over.
//!
//! # Architecture
//!
//! ```text
//! text ──► Assistant ──► SearchIR ──► validate ──► map_ir ──► TraceQueryParams
//!                                                                   │
//!                          SearchResult ◄── QueryService ◄── TraceReader (predicates)
//! ```
//!
//! Validation and mapping are pure. The reader yields a lazy, cancellable
//! stream over an immutable [`reader::Corpus`]; the model sits behind the
//! [`assist::Assistant`] trait.

pub mod assist;
pub mod config;
pub mod duration;
pub mod explain;
pub mod ir;
pub mod matcher;
pub mod query;
pub mod reader;
pub mod service;
pub mod types;

pub use assist::{AssistedQueryService, Assistant, ExtractionError, SearchError, SearchResult};
pub use ir::{validate, SearchIR, ValidationError};
pub use query::{map_ir, MappingError, TraceQueryParams};
pub use reader::{Corpus, InMemoryTraceReader, QueryError, TraceReader, TraceStream};
pub use service::QueryService;
pub use types::{Span, SpanRef, Trace};
