//! trawl-llm: the language-model collaborator for trawl.
//!
//! ```text
//! SearchExtractor ──► prompt::render_* ──► TextGenerator ──► parse_json_block ──► SearchIR
//! ```
//!
//! [`TextGenerator`] is the transport seam: [`ollama::OllamaGenerator`] in
//! production, scripted generators in tests. [`SearchExtractor`] implements
//! [`trawl_core::Assistant`] on top of any generator.

pub mod extractor;
pub mod ollama;
pub mod prompt;

use async_trait::async_trait;
use std::sync::Arc;
use trawl_core::config::LlmConfig;

pub use extractor::{parse_json_block, SearchExtractor};
pub use ollama::OllamaGenerator;

/// Prompt in, completion text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        (**self).generate(prompt).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("unsupported LLM provider {0:?}")]
    UnsupportedProvider(String),
    #[error("invalid endpoint {endpoint:?}: {source}")]
    InvalidEndpoint {
        endpoint: String,
        source: hyper::http::uri::InvalidUri,
    },
    #[error("failed to build request: {0}")]
    Request(#[from] hyper::http::Error),
    #[error("request failed: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),
    #[error("failed to read response body: {0}")]
    Body(#[from] hyper::Error),
    #[error("model server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("model did not answer within {0:?}")]
    Timeout(std::time::Duration),
    #[error("model returned an empty response")]
    EmptyResponse,
}

/// Build the generator named by `config.provider`.
pub fn new_generator(config: &LlmConfig) -> Result<Arc<dyn TextGenerator>, LlmError> {
    match config.provider.as_str() {
        "ollama" => Ok(Arc::new(OllamaGenerator::new(config)?)),
        other => Err(LlmError::UnsupportedProvider(other.to_string())),
    }
}
