//! trawl-store: trace corpus sources for trawl.
//!
//! The corpus is always an ordered, already-parsed `Vec<Trace>`; this crate
//! only decides where it comes from: an OTLP/JSON file on disk
//! ([`otlp::load_traces_from_file`]) or the deterministic synthetic stories
//! used for demos and benchmarks ([`synthetic::generate_traces`]).

pub mod otlp;
pub mod synthetic;

pub use otlp::{load_traces_from_file, parse_traces, LoadError};
pub use synthetic::{generate_traces, write_traces};
