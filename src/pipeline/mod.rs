//! Synthesis pipeline.
//!
//! # Architecture
//!
//! - **Config**: everything a run needs, with defaults and YAML loading
//! - **Orchestrator**: the model-backed loop over requested records
//! - **Runner**: chooses model or template generation and handles fallback
//! - **Observer**: progress notifications injected into the orchestrator
//!
//! # Pipeline Flow
//!
//! 1. **Probe**: the backend is checked for reachability
//! 2. **Load**: the input dataset is read; its first row is the exemplar
//! 3. **Generate**: for each requested record, prompt, generate, parse and
//!    validate with bounded retries
//! 4. **Merge and save**: originals first, then accepted records
//! 5. **Fallback**: if any of the above fails, template records are appended
//!    instead
//!
//! # Example
//!
//! ```rust,ignore
//! use case_forge::pipeline::{SynthesisConfig, SynthesisRunner, TracingObserver};
//! use std::sync::Arc;
//!
//! let config = SynthesisConfig::new()
//!     .with_input("cases.csv")
//!     .with_output("generated_cases.csv")
//!     .with_count(10);
//!
//! let summary = SynthesisRunner::new(config)?
//!     .with_observer(Arc::new(TracingObserver))
//!     .run()
//!     .await?;
//! println!("{} new cases ({})", summary.generated, summary.mode);
//! ```

pub mod config;
pub mod observer;
pub mod orchestrator;
pub mod runner;

pub use config::{BackendConfig, ConfigError, SynthesisConfig, TabularFormat};
pub use observer::{noop_observer, NoopObserver, SynthesisObserver, TracingObserver};
pub use orchestrator::{SynthesisOrchestrator, SynthesisReport};
pub use runner::{RunMode, RunSummary, SynthesisRunner};
