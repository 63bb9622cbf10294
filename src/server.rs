//! HTTP surface for `trawl serve`.
//!
//! | route                                   | handler          |
//! |-----------------------------------------|------------------|
//! | `POST /search` `{"query": "..."}`       | [`search`]       |
//! | `GET /traces/{idx}/explain`             | [`explain_trace`]|
//! | `GET /traces/{idx}/spans/{span}/explain`| [`explain_span`] |
//! | `GET /healthz`                          | `ok`             |
//!
//! Every search gets a child of the server's shutdown token, so stopping the
//! server cancels scans still in flight.

use crate::report::SearchResponse;
use crate::{App, LookupError};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use trawl_core::{ExtractionError, QueryError, SearchError};

pub struct ServerState {
    pub app: App,
    pub shutdown: CancellationToken,
}

pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/search", post(search))
        .route("/traces/{idx}/explain", get(explain_trace))
        .route("/traces/{idx}/spans/{span}/explain", get(explain_span))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct Explanation {
    pub explanation: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Handler error carrying its HTTP status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        let status = match &err {
            SearchError::Validation(_) | SearchError::Mapping(_) => StatusCode::BAD_REQUEST,
            SearchError::Extraction(_) => StatusCode::BAD_GATEWAY,
            SearchError::Query(QueryError::Cancelled) => StatusCode::SERVICE_UNAVAILABLE,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: err.to_string(),
        }
    }
}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: err.to_string(),
        }
    }
}

async fn search(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let cancel = state.shutdown.child_token();
    let result = state.app.service().search(&cancel, &req.query).await?;
    Ok(Json(SearchResponse::from(&result)))
}

async fn explain_trace(
    State(state): State<Arc<ServerState>>,
    Path(idx): Path<usize>,
) -> Result<Json<Explanation>, ApiError> {
    let trace = state.app.trace(idx)?;
    let explanation = state.app.service().explain_trace(trace).await?;
    Ok(Json(Explanation { explanation }))
}

async fn explain_span(
    State(state): State<Arc<ServerState>>,
    Path((idx, span)): Path<(usize, usize)>,
) -> Result<Json<Explanation>, ApiError> {
    let span = state.app.span(idx, span)?;
    let service = span.service_name().unwrap_or(crate::UNKNOWN_SERVICE);
    let explanation = state.app.service().explain_span(span.span, service).await?;
    Ok(Json(Explanation { explanation }))
}
