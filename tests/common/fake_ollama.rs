//! Fake Ollama server for integration tests.
//!
//! Spins up a minimal `axum` HTTP server on a random TCP port bound to
//! 127.0.0.1. Serves `POST /api/generate`, answering each request with the
//! next queued [`Reply`] and recording every request body.
//!
//! # Example
//!
//! ```rust,ignore
//! let server = FakeOllama::start().await.unwrap();
//! server.push(Reply::text(r#"{"service": "frontend"}"#)).await;
//!
//! // Point an OllamaGenerator at server.base_url()
//! let url = server.base_url();
//! ```

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// One canned answer.
#[derive(Debug, Clone)]
pub enum Reply {
    /// 200 with `{"response": text, "done": true}`.
    Text(String),
    /// Arbitrary status and raw body.
    Status(u16, String),
    /// Sleep, then answer like [`Reply::Text`].
    Slow(Duration, String),
}

impl Reply {
    pub fn text(s: impl Into<String>) -> Self {
        Reply::Text(s.into())
    }
}

#[derive(Default)]
struct ServerState {
    replies: VecDeque<Reply>,
    requests: Vec<serde_json::Value>,
}

/// Handle to the running fake Ollama server.
pub struct FakeOllama {
    addr: SocketAddr,
    state: Arc<Mutex<ServerState>>,
}

impl FakeOllama {
    /// Start the server on a random port. Returns once it is listening.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(ServerState::default()));

        let app = Router::new()
            .route("/api/generate", post(generate))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Ok(Self { addr, state })
    }

    /// Base URL (e.g. `http://127.0.0.1:PORT`).
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn push(&self, reply: Reply) {
        self.state.lock().await.replies.push_back(reply);
    }

    /// Every request body received so far.
    pub async fn requests(&self) -> Vec<serde_json::Value> {
        self.state.lock().await.requests.clone()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

async fn generate(
    State(state): State<Arc<Mutex<ServerState>>>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let reply = {
        let mut state = state.lock().await;
        state.requests.push(body);
        state.replies.pop_front()
    };

    match reply {
        Some(Reply::Text(text)) => (StatusCode::OK, ollama_body(&text)),
        Some(Reply::Slow(delay, text)) => {
            tokio::time::sleep(delay).await;
            (StatusCode::OK, ollama_body(&text))
        }
        Some(Reply::Status(code, body)) => (
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body,
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "no reply queued".to_string(),
        ),
    }
}

fn ollama_body(text: &str) -> String {
    serde_json::json!({"model": "test", "response": text, "done": true}).to_string()
}
