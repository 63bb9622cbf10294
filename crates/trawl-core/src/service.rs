//! Query service: the stable entry point callers use to run trace queries.

use crate::query::TraceQueryParams;
use crate::reader::{TraceReader, TraceStream};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Thin facade over whichever [`TraceReader`] backs the deployment.
#[derive(Clone)]
pub struct QueryService {
    reader: Arc<dyn TraceReader>,
}

impl QueryService {
    pub fn new(reader: Arc<dyn TraceReader>) -> Self {
        Self { reader }
    }

    pub fn find_traces(&self, cancel: CancellationToken, query: TraceQueryParams) -> TraceStream<'_> {
        self.reader.find_traces(cancel, query)
    }
}

impl std::fmt::Debug for QueryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryService").finish_non_exhaustive()
    }
}
