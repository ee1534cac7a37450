//! Single-prompt text generation.
//!
//! Wraps an [`LlmProvider`] with the sampling options used for case
//! synthesis and reduces a chat response to plain text.

use std::sync::Arc;

use super::client::{GenerationRequest, LlmProvider, Message, DEFAULT_MODEL};
use crate::error::LlmError;

/// Default sampling temperature for case generation.
pub const DEFAULT_TEMPERATURE: f64 = 0.8;

/// Sampling options applied to every generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    /// Model identifier; empty defers to the provider's default.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Number of completions requested; only the first is used.
    pub n: u32,
    /// Optional completion length limit.
    pub max_tokens: Option<u32>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            n: 1,
            max_tokens: None,
        }
    }
}

impl GenerationOptions {
    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the temperature, clamped to 0.0 - 2.0.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    /// Set the completion length limit.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Sends one prompt as a user message and returns the completion text.
#[derive(Clone)]
pub struct GenerationClient {
    provider: Arc<dyn LlmProvider>,
    options: GenerationOptions,
}

impl std::fmt::Debug for GenerationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationClient")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl GenerationClient {
    /// Create a client over the given provider.
    pub fn new(provider: Arc<dyn LlmProvider>, options: GenerationOptions) -> Self {
        Self { provider, options }
    }

    /// The sampling options in use.
    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    /// Check that the backend is reachable.
    pub async fn probe(&self) -> Result<(), LlmError> {
        self.provider.probe().await
    }

    /// Generate a completion for `prompt`.
    ///
    /// Some backends echo the prompt before the completion; the echo is
    /// removed. The result may be empty, which callers treat as a failed
    /// attempt.
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let mut request = GenerationRequest::new(
            self.options.model.clone(),
            vec![Message::user(prompt)],
        )
        .with_temperature(self.options.temperature)
        .with_n(self.options.n);
        if let Some(max_tokens) = self.options.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        let response = self.provider.generate(request).await?;
        let content = response.first_content().unwrap_or_default();

        let text = content.strip_prefix(prompt).unwrap_or(content).trim();
        tracing::debug!(chars = text.chars().count(), "Generation completed");
        Ok(text.to_string())
    }
}
