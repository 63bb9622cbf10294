//! [`SearchExtractor`]: the model-backed [`Assistant`].

use crate::{prompt, LlmError, TextGenerator};
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;
use trawl_core::{Assistant, ExtractionError, SearchIR};

fn fence() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json)?\s+(.*?)\s*```").expect("fence pattern is a valid regex")
    })
}

/// The body of the first fenced code block (optionally tagged `json`), or
/// the whole text when there is no fence. Always trimmed.
pub fn parse_json_block(text: &str) -> &str {
    match fence().captures(text).and_then(|c| c.get(1)) {
        Some(body) => body.as_str().trim(),
        None => text.trim(),
    }
}

pub struct SearchExtractor<G> {
    generator: G,
}

impl<G: TextGenerator> SearchExtractor<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    async fn complete(&self, rendered: String) -> Result<String, ExtractionError> {
        match self.generator.generate(&rendered).await {
            Ok(text) if text.trim().is_empty() => Err(ExtractionError::EmptyResponse),
            Ok(text) => Ok(text.trim().to_string()),
            Err(LlmError::EmptyResponse) => Err(ExtractionError::EmptyResponse),
            Err(err) => Err(ExtractionError::backend(err)),
        }
    }
}

#[async_trait]
impl<G: TextGenerator> Assistant for SearchExtractor<G> {
    async fn extract_search_ir(&self, text: &str) -> Result<SearchIR, ExtractionError> {
        let raw = self.complete(prompt::render_search(text)).await?;
        let body = parse_json_block(&raw);
        if body.is_empty() {
            return Err(ExtractionError::EmptyResponse);
        }
        tracing::debug!(%body, "model search IR");

        let mut ir: SearchIR = serde_json::from_str(body)?;
        // Models emit "" for "no value"; treat it as absent.
        for field in [
            &mut ir.service,
            &mut ir.operation,
            &mut ir.min_duration,
            &mut ir.max_duration,
            &mut ir.start_time,
            &mut ir.end_time,
        ] {
            if field.as_deref().is_some_and(str::is_empty) {
                *field = None;
            }
        }
        Ok(ir)
    }

    async fn explain_trace(&self, context: &str) -> Result<String, ExtractionError> {
        tracing::debug!(chars = context.len(), "explaining trace");
        self.complete(prompt::render_trace_explain(context)).await
    }

    async fn explain_span(&self, context: &str) -> Result<String, ExtractionError> {
        tracing::debug!(chars = context.len(), "explaining span");
        self.complete(prompt::render_span_explain(context)).await
    }
}
