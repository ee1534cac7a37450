//! case-forge: LLM-backed synthesis of corporate training cases.
//!
//! This library grows a tabular dataset of training cases by asking a
//! text-generation model for new cases modeled on an existing one, and falls
//! back to template generation when the model cannot be used.

// Core modules
pub mod cases;
pub mod cli;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod storage;
pub mod utils;

// Re-export commonly used error types
pub use error::{
    AttemptFailure, LlmError, ParseError, StoreError, SynthesisError, SynthesisResult,
    ValidationError,
};
