//! Synthesis orchestrator.
//!
//! Drives a model-backed run: load the dataset, take its first row as the
//! exemplar, generate each requested record with bounded retries, then save
//! the originals followed by the accepted records.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use super::config::{ConfigError, SynthesisConfig};
use super::observer::{NoopObserver, SynthesisObserver};
use crate::cases::parser::parse_case;
use crate::cases::prompt::PromptBuilder;
use crate::cases::record::{CaseRecord, Dataset};
use crate::cases::validation::CaseValidator;
use crate::error::{AttemptFailure, SynthesisError, SynthesisResult};
use crate::llm::GenerationClient;
use crate::storage::RecordStore;

/// Outcome of a completed synthesis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesisReport {
    /// Merged dataset as saved: originals first, then new records.
    #[serde(skip)]
    pub dataset: Dataset,
    /// Number of rows in the input dataset.
    pub original_count: usize,
    /// Number of records requested.
    pub requested: usize,
    /// Indices (0-based) abandoned after exhausting their attempts.
    pub skipped: Vec<usize>,
}

impl SynthesisReport {
    /// Number of accepted new records.
    pub fn accepted(&self) -> usize {
        self.dataset.len().saturating_sub(self.original_count)
    }

    /// The accepted new records, in generation order.
    pub fn new_records(&self) -> &[CaseRecord] {
        self.dataset
            .records()
            .get(self.original_count..)
            .unwrap_or_default()
    }
}

/// Coordinates prompt building, generation, parsing, validation and storage.
pub struct SynthesisOrchestrator {
    store: RecordStore,
    prompts: PromptBuilder,
    client: GenerationClient,
    validator: CaseValidator,
    observer: Arc<dyn SynthesisObserver>,
    max_attempts: u32,
    retry_delay: Duration,
    record_delay: Duration,
    probe_backend: bool,
}

impl std::fmt::Debug for SynthesisOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesisOrchestrator")
            .field("client", &self.client)
            .field("max_attempts", &self.max_attempts)
            .field("retry_delay", &self.retry_delay)
            .field("record_delay", &self.record_delay)
            .finish_non_exhaustive()
    }
}

impl SynthesisOrchestrator {
    /// Create an orchestrator from a configuration and a generation client.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the run or backend configuration is invalid.
    pub fn new(config: &SynthesisConfig, client: GenerationClient) -> Result<Self, ConfigError> {
        config.validate()?;
        config.backend.validate()?;

        Ok(Self {
            store: config.format.store()?,
            prompts: PromptBuilder::new(config.organization.clone(), config.id_prefix.clone()),
            client,
            validator: CaseValidator::new(config.id_prefix.clone(), config.min_text_chars),
            observer: Arc::new(NoopObserver),
            max_attempts: config.max_attempts,
            retry_delay: config.retry_delay(),
            record_delay: config.record_delay(),
            probe_backend: config.probe_backend,
        })
    }

    /// Report progress to `observer` instead of discarding it.
    pub fn with_observer(mut self, observer: Arc<dyn SynthesisObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Generate `count` records modeled on the first row of `input` and save
    /// the merged dataset to `output`.
    ///
    /// # Errors
    ///
    /// - `BackendUnavailable` if the backend probe fails
    /// - `EmptyInput` if the input is missing, unreadable or has no rows
    /// - `Store` if the merged dataset cannot be written
    ///
    /// Per-record failures never surface here; they only lower the yield.
    pub async fn synthesize(
        &self,
        input: &Path,
        output: &Path,
        count: usize,
    ) -> SynthesisResult<SynthesisReport> {
        if self.probe_backend {
            self.client
                .probe()
                .await
                .map_err(SynthesisError::BackendUnavailable)?;
        }

        let original = self.store.load_or_empty(input);
        let Some(exemplar) = original.exemplar().cloned() else {
            return Err(SynthesisError::EmptyInput(input.to_path_buf()));
        };
        let original_count = original.len();

        self.observer.on_run_started(count, &exemplar.case_id);
        let prompt = self.prompts.build(&exemplar);
        debug!(chars = prompt.chars().count(), "Prompt built");

        let mut generated = Vec::with_capacity(count);
        let mut skipped = Vec::new();

        for index in 0..count {
            if index > 0 {
                pause(self.record_delay).await;
            }

            match self.generate_record(&prompt, index).await {
                Some(record) => {
                    self.observer.on_record_accepted(index, &record);
                    generated.push(record);
                }
                None => {
                    self.observer.on_record_skipped(index, self.max_attempts);
                    skipped.push(index);
                }
            }
        }

        let dataset = original.merged(generated);
        self.store.save(&dataset, output)?;
        info!(
            output = %output.display(),
            total = dataset.len(),
            "Merged dataset written"
        );

        let report = SynthesisReport {
            dataset,
            original_count,
            requested: count,
            skipped,
        };
        self.observer.on_run_finished(&report);
        Ok(report)
    }

    /// Run up to `max_attempts` attempts for record `index`.
    ///
    /// Returns `None` when every attempt failed.
    pub async fn generate_record(&self, prompt: &str, index: usize) -> Option<CaseRecord> {
        for attempt in 1..=self.max_attempts {
            match self.attempt(prompt).await {
                Ok(record) => return Some(record),
                Err(failure) => {
                    self.observer.on_attempt_failed(index, attempt, &failure);
                    if attempt < self.max_attempts {
                        pause(self.retry_delay).await;
                    }
                }
            }
        }
        None
    }

    async fn attempt(&self, prompt: &str) -> Result<CaseRecord, AttemptFailure> {
        let text = self.client.generate(prompt).await?;
        if text.is_empty() {
            return Err(AttemptFailure::EmptyCompletion);
        }
        let draft = parse_case(&text)?;
        Ok(self.validator.validate(&draft)?)
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
