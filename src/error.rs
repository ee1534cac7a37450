//! Error types for case-forge operations.
//!
//! Defines the error types for each subsystem:
//! - LLM backend interactions
//! - Tabular record storage
//! - Parsing and validating generated cases
//! - The synthesis run itself

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing API base URL: CASE_FORGE_API_BASE environment variable not set")]
    MissingApiBase,

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse LLM response: {0}")]
    ParseError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },
}

/// Errors that can occur while loading or saving a dataset.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Dataset file '{}' not found", .0.display())]
    NotFound(PathBuf),

    #[error("Malformed dataset file '{}': {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("CSV error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while extracting a case from generated text.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    #[error("No JSON object found in response. Content starts with: '{content_preview}'")]
    NoJsonObject { content_preview: String },

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("JSON appears truncated: {unclosed_braces} unclosed braces, {unclosed_brackets} unclosed brackets")]
    Truncated {
        unclosed_braces: usize,
        unclosed_brackets: usize,
    },

    #[error("Expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("Missing required field '{0}'")]
    MissingField(&'static str),
}

/// Structural constraint violations of a generated case.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Field '{0}' must be a string")]
    NotAString(&'static str),

    #[error("Case id '{id}' does not start with '{prefix}'")]
    InvalidPrefix { id: String, prefix: String },

    #[error("Field '{field}' is too short: {len} < {min} characters")]
    TooShort {
        field: &'static str,
        len: usize,
        min: usize,
    },

    #[error("Field '{0}' must be a list")]
    NotAList(&'static str),
}

/// Why a single generation attempt produced no record.
///
/// Attempt failures are retried and logged, never propagated out of a run.
#[derive(Debug, Error)]
pub enum AttemptFailure {
    #[error("Generation failed: {0}")]
    Generation(#[from] LlmError),

    #[error("Backend returned an empty completion")]
    EmptyCompletion,

    #[error("Unparseable reply: {0}")]
    Parse(#[from] ParseError),

    #[error("Invalid case: {0}")]
    Validation(#[from] ValidationError),
}

impl AttemptFailure {
    /// Short label of the failure kind, for logs and telemetry.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Generation(_) => "generation",
            Self::EmptyCompletion => "empty_completion",
            Self::Parse(_) => "parse",
            Self::Validation(_) => "validation",
        }
    }
}

/// Errors that abort a synthesis run.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Input dataset '{}' is empty or could not be read", .0.display())]
    EmptyInput(PathBuf),

    #[error("Generation backend unavailable: {0}")]
    BackendUnavailable(#[source] LlmError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for synthesis runs.
pub type SynthesisResult<T> = Result<T, SynthesisError>;
