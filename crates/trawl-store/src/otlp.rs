//! OTLP/JSON corpus files.
//!
//! A corpus file is a JSON array; each element is one OTLP/JSON traces
//! document (`{"resourceSpans": [...]}`). Elements are decoded one at a
//! time so a bad document is reported by its position in the array.

use std::path::{Path, PathBuf};
use trawl_core::Trace;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("corpus is not a JSON array: {0}")]
    NotAnArray(#[source] serde_json::Error),
    #[error("failed to decode trace at index {index}: {source}")]
    Trace {
        index: usize,
        source: serde_json::Error,
    },
    #[error("failed to encode corpus: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Read and decode a corpus file.
pub fn load_traces_from_file(path: impl AsRef<Path>) -> Result<Vec<Trace>, LoadError> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let traces = parse_traces(&data)?;
    tracing::debug!(path = %path.display(), traces = traces.len(), "loaded trace corpus");
    Ok(traces)
}

/// Decode a corpus from its JSON text.
pub fn parse_traces(json: &str) -> Result<Vec<Trace>, LoadError> {
    let docs: Vec<serde_json::Value> = serde_json::from_str(json).map_err(LoadError::NotAnArray)?;
    docs.into_iter()
        .enumerate()
        .map(|(index, doc)| {
            serde_json::from_value(doc).map_err(|source| LoadError::Trace { index, source })
        })
        .collect()
}
