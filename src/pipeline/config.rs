//! Configuration for synthesis runs.
//!
//! A [`SynthesisConfig`] carries everything a run needs: file locations, the
//! number of records to generate, retry pacing, validation thresholds, the
//! generation backend and the tabular format. Defaults match a local Ollama
//! backend; a YAML file may override any subset of fields.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cases::prompt::DEFAULT_ORGANIZATION;
use crate::cases::validation::{DEFAULT_ID_PREFIX, DEFAULT_MIN_TEXT_CHARS};
use crate::error::LlmError;
use crate::llm::{
    ChatCompletionsClient, GenerationOptions, DEFAULT_API_BASE, DEFAULT_API_KEY, DEFAULT_MODEL,
    DEFAULT_TEMPERATURE,
};
use crate::storage::RecordStore;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// The configuration file is not valid YAML for this schema.
    #[error("Invalid configuration file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error while reading configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    fn invalid(key: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Generation backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the OpenAI-compatible API.
    pub api_base: String,
    /// Credential sent as a bearer token.
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature (0.0 - 2.0).
    pub temperature: f64,
    /// Optional completion length limit.
    pub max_tokens: Option<u32>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: Some(DEFAULT_API_KEY.to_string()),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            timeout_secs: 120,
        }
    }
}

impl BackendConfig {
    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Sampling options for the generation client.
    pub fn generation_options(&self) -> GenerationOptions {
        let options = GenerationOptions::default()
            .with_model(self.model.clone())
            .with_temperature(self.temperature);
        match self.max_tokens {
            Some(max_tokens) => options.with_max_tokens(max_tokens),
            None => options,
        }
    }

    /// Validates the backend values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base.is_empty() {
            return Err(ConfigError::invalid("backend.api_base", "cannot be empty"));
        }

        if self.model.is_empty() {
            return Err(ConfigError::invalid("backend.model", "cannot be empty"));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "backend.timeout_secs",
                "must be greater than 0",
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::invalid(
                "backend.temperature",
                "must be between 0.0 and 2.0",
            ));
        }

        Ok(())
    }

    /// Build the HTTP client for this backend.
    pub fn build_client(&self) -> Result<ChatCompletionsClient, LlmError> {
        ChatCompletionsClient::new(
            self.api_base.clone(),
            self.api_key.clone(),
            self.model.clone(),
            self.timeout(),
        )
    }
}

/// Delimiter and quote character of dataset files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabularFormat {
    /// Field delimiter; must be a single ASCII character.
    pub delimiter: char,
    /// Quote character; must be a single ASCII character.
    pub quote: char,
}

impl Default for TabularFormat {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote: '"',
        }
    }
}

impl TabularFormat {
    /// Record store reading and writing this format.
    pub fn store(&self) -> Result<RecordStore, ConfigError> {
        Ok(RecordStore::new(
            ascii_byte("format.delimiter", self.delimiter)?,
            ascii_byte("format.quote", self.quote)?,
        ))
    }
}

fn ascii_byte(key: &str, c: char) -> Result<u8, ConfigError> {
    if (c.is_ascii() && !c.is_ascii_control()) || c == '\t' {
        Ok(c as u8)
    } else {
        Err(ConfigError::invalid(
            key,
            format!("'{}' is not a printable ASCII character", c.escape_default()),
        ))
    }
}

/// Configuration of a synthesis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Dataset to read; its first row is the exemplar.
    pub input: PathBuf,
    /// Where the merged dataset is written.
    pub output: PathBuf,
    /// Number of new records to generate.
    pub count: usize,
    /// Skip the model and generate template records only.
    pub template_only: bool,
    /// Check backend reachability before generating.
    pub probe_backend: bool,
    /// Organizational prefix of case identifiers.
    pub id_prefix: String,
    /// Organization named in prompts and template texts.
    pub organization: String,
    /// Minimum scenario/solution length in characters.
    pub min_text_chars: usize,
    /// Generation attempts per record.
    pub max_attempts: u32,
    /// Pause after a failed attempt, in milliseconds.
    pub retry_delay_ms: u64,
    /// Pause between record indices, in milliseconds.
    pub record_delay_ms: u64,
    /// Number of the first template record.
    pub template_start_index: usize,
    /// Generation backend.
    pub backend: BackendConfig,
    /// Dataset file format.
    pub format: TabularFormat,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("cases.csv"),
            output: PathBuf::from("generated_cases.csv"),
            count: 38,
            template_only: false,
            probe_backend: true,
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            organization: DEFAULT_ORGANIZATION.to_string(),
            min_text_chars: DEFAULT_MIN_TEXT_CHARS,
            max_attempts: 3,
            retry_delay_ms: 1000,
            record_delay_ms: 1000,
            template_start_index: 100,
            backend: BackendConfig::default(),
            format: TabularFormat::default(),
        }
    }
}

impl SynthesisConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a YAML file. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, does not parse, or
    /// holds invalid values.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the run-level values: attempts, prefix and file format.
    ///
    /// Backend settings are checked separately by
    /// [`BackendConfig::validate`] on the model-backed path, so a bad backend
    /// value leads to template fallback instead of a rejected run.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::invalid(
                "max_attempts",
                "must be greater than 0",
            ));
        }

        if self.id_prefix.is_empty() {
            return Err(ConfigError::invalid("id_prefix", "cannot be empty"));
        }

        self.format.store()?;
        Ok(())
    }

    /// Pause after a failed attempt.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Pause between record indices.
    pub fn record_delay(&self) -> Duration {
        Duration::from_millis(self.record_delay_ms)
    }

    /// Builder method to set the input dataset.
    pub fn with_input(mut self, input: impl Into<PathBuf>) -> Self {
        self.input = input.into();
        self
    }

    /// Builder method to set the output dataset.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Builder method to set the number of records to generate.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Builder method to enable template-only mode.
    pub fn with_template_only(mut self, template_only: bool) -> Self {
        self.template_only = template_only;
        self
    }

    /// Builder method to enable or disable the backend probe.
    pub fn with_probe_backend(mut self, probe: bool) -> Self {
        self.probe_backend = probe;
        self
    }

    /// Builder method to set the identifier prefix.
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }

    /// Builder method to set the attempt cap.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Builder method to set both pauses.
    pub fn with_delays(mut self, retry_delay: Duration, record_delay: Duration) -> Self {
        self.retry_delay_ms = retry_delay.as_millis() as u64;
        self.record_delay_ms = record_delay.as_millis() as u64;
        self
    }

    /// Builder method to set the backend.
    pub fn with_backend(mut self, backend: BackendConfig) -> Self {
        self.backend = backend;
        self
    }
}
