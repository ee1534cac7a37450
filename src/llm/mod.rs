//! LLM integration for case-forge.
//!
//! [`ChatCompletionsClient`] speaks the OpenAI-compatible protocol served by
//! Ollama and similar local servers. [`GenerationClient`] sits on top of any
//! [`LlmProvider`] and turns a prompt into completion text.
//!
//! ```ignore
//! use case_forge::llm::{ChatCompletionsClient, GenerationClient, GenerationOptions};
//! use std::sync::Arc;
//!
//! let provider = Arc::new(ChatCompletionsClient::local()?);
//! let client = GenerationClient::new(provider, GenerationOptions::default());
//! client.probe().await?;
//! let text = client.generate("Write a training case as JSON").await?;
//! ```

pub mod client;
pub mod generation;

pub use client::{
    ChatCompletionsClient, Choice, GenerationRequest, GenerationResponse, LlmProvider, Message,
    Usage, DEFAULT_API_BASE, DEFAULT_API_KEY, DEFAULT_MODEL, DEFAULT_TIMEOUT,
};
pub use generation::{GenerationClient, GenerationOptions, DEFAULT_TEMPERATURE};
