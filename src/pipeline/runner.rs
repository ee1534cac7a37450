//! Run driver for a whole synthesis job.
//!
//! Chooses between the model-backed path and the template path. Any error
//! of the model-backed path, from building the client to saving the result,
//! switches the run to template generation so the job still produces a
//! dataset. Errors of the template path are returned to the caller.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use super::config::{ConfigError, SynthesisConfig};
use super::observer::{NoopObserver, SynthesisObserver};
use super::orchestrator::{SynthesisOrchestrator, SynthesisReport};
use crate::cases::template::TemplateSynthesizer;
use crate::error::SynthesisResult;
use crate::llm::{GenerationClient, LlmProvider};
use crate::storage::RecordStore;

/// How the records of a run were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Generated by the model.
    Model,
    /// Model path failed; records come from templates.
    TemplateFallback,
    /// Templates were requested explicitly.
    TemplateOnly,
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Model => write!(f, "model"),
            Self::TemplateFallback => write!(f, "template (fallback)"),
            Self::TemplateOnly => write!(f, "template"),
        }
    }
}

/// Summary of a finished run, printed by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Generation path that produced the new records.
    pub mode: RunMode,
    /// Model used, for model-backed runs.
    pub model: Option<String>,
    /// Input dataset.
    pub input: PathBuf,
    /// Output dataset.
    pub output: PathBuf,
    /// Rows in the input dataset.
    pub original_rows: usize,
    /// Records requested.
    pub requested: usize,
    /// New records written.
    pub generated: usize,
    /// Rows in the output dataset.
    pub total_rows: usize,
    /// Indices abandoned after exhausting their attempts.
    pub skipped: Vec<usize>,
    /// Why the model path was abandoned, for fallback runs.
    pub fallback_reason: Option<String>,
    /// Wall-clock duration of the run.
    pub duration_ms: u64,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

/// Runs a synthesis job described by a [`SynthesisConfig`].
pub struct SynthesisRunner {
    config: SynthesisConfig,
    store: RecordStore,
    observer: Arc<dyn SynthesisObserver>,
}

impl SynthesisRunner {
    /// Create a runner for a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is invalid.
    pub fn new(config: SynthesisConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            store: config.format.store()?,
            config,
            observer: Arc::new(NoopObserver),
        })
    }

    /// Report model-path progress to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn SynthesisObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Run against the configured HTTP backend, or templates only.
    pub async fn run(&self) -> SynthesisResult<RunSummary> {
        if self.config.template_only {
            return self.run_templates(RunMode::TemplateOnly, None, Instant::now());
        }

        if let Err(e) = self.config.backend.validate() {
            error!(error = %e, "Invalid backend configuration; using templates");
            return self.run_templates(RunMode::TemplateFallback, Some(e.to_string()), Instant::now());
        }

        match self.config.backend.build_client() {
            Ok(client) => self.run_with_provider(Arc::new(client)).await,
            Err(e) => {
                error!(error = %e, "Failed to create generation client; using templates");
                self.run_templates(RunMode::TemplateFallback, Some(e.to_string()), Instant::now())
            }
        }
    }

    /// Run the model-backed path with `provider`, falling back to templates
    /// on any error.
    pub async fn run_with_provider(
        &self,
        provider: Arc<dyn LlmProvider>,
    ) -> SynthesisResult<RunSummary> {
        let started = Instant::now();
        let client = GenerationClient::new(provider, self.config.backend.generation_options());

        let orchestrator = match SynthesisOrchestrator::new(&self.config, client) {
            Ok(orchestrator) => orchestrator.with_observer(self.observer.clone()),
            Err(e) => {
                error!(error = %e, "Invalid synthesis configuration; using templates");
                return self.run_templates(RunMode::TemplateFallback, Some(e.to_string()), started);
            }
        };

        match orchestrator
            .synthesize(&self.config.input, &self.config.output, self.config.count)
            .await
        {
            Ok(report) => Ok(self.model_summary(report, started)),
            Err(e) => {
                error!(error = %e, "Model-backed synthesis failed; using templates");
                self.run_templates(RunMode::TemplateFallback, Some(e.to_string()), started)
            }
        }
    }

    /// Append template records to the input dataset and save it.
    ///
    /// A header-only input is accepted; a missing or unreadable one is an
    /// error.
    pub fn run_templates(
        &self,
        mode: RunMode,
        fallback_reason: Option<String>,
        started: Instant,
    ) -> SynthesisResult<RunSummary> {
        let original = self.store.load(&self.config.input)?;
        let original_rows = original.len();

        let synthesizer =
            TemplateSynthesizer::new(self.config.id_prefix.clone(), self.config.organization.clone());
        let records =
            synthesizer.generate_batch(self.config.template_start_index, self.config.count);
        let generated = records.len();

        let dataset = original.merged(records);
        self.store.save(&dataset, &self.config.output)?;
        info!(
            output = %self.config.output.display(),
            generated,
            total = dataset.len(),
            "Template dataset written"
        );

        Ok(RunSummary {
            mode,
            model: None,
            input: self.config.input.clone(),
            output: self.config.output.clone(),
            original_rows,
            requested: self.config.count,
            generated,
            total_rows: dataset.len(),
            skipped: Vec::new(),
            fallback_reason,
            duration_ms: started.elapsed().as_millis() as u64,
            finished_at: Utc::now(),
        })
    }

    fn model_summary(&self, report: SynthesisReport, started: Instant) -> RunSummary {
        RunSummary {
            mode: RunMode::Model,
            model: Some(self.config.backend.model.clone()),
            input: self.config.input.clone(),
            output: self.config.output.clone(),
            original_rows: report.original_count,
            requested: report.requested,
            generated: report.accepted(),
            total_rows: report.dataset.len(),
            skipped: report.skipped,
            fallback_reason: None,
            duration_ms: started.elapsed().as_millis() as u64,
            finished_at: Utc::now(),
        }
    }
}
