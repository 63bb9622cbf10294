//! Ollama `/api/generate` client over hyper.
//!
//! One non-streaming request per prompt. Non-2xx statuses, malformed bodies
//! and blank completions are all errors; nothing is retried.

use crate::{LlmError, TextGenerator};
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::CONTENT_TYPE;
use hyper::{Method, Request, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use trawl_core::config::LlmConfig;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f64,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    client: Client<HttpConnector, Full<Bytes>>,
    uri: Uri,
    model: String,
    temperature: f64,
    max_tokens: u32,
    timeout: Duration,
}

impl OllamaGenerator {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let url = format!("{}/api/generate", config.endpoint.trim_end_matches('/'));
        let uri = url.parse::<Uri>().map_err(|source| LlmError::InvalidEndpoint {
            endpoint: config.endpoint.clone(),
            source,
        })?;

        Ok(Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
            uri,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    async fn send(&self, prompt: &str) -> Result<String, LlmError> {
        let body = serde_json::to_vec(&GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
        })?;

        let request = Request::builder()
            .method(Method::POST)
            .uri(self.uri.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body)))?;

        let response = self.client.request(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();

        if !status.is_success() {
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let parsed: GenerateResponse = serde_json::from_slice(&bytes)?;
        let text = parsed.response.trim();
        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        tracing::debug!(model = %self.model, uri = %self.uri, chars = prompt.len(), "calling model");
        let text = tokio::time::timeout(self.timeout, self.send(prompt))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout))??;
        tracing::debug!(chars = text.len(), "model answered");
        Ok(text)
    }
}
