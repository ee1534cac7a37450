//! Run progress notifications.
//!
//! The orchestrator reports progress through an injected
//! [`SynthesisObserver`]. Every method has an empty default body, so
//! implementors pick the events they care about.

use std::sync::Arc;

use tracing::{info, warn};

use super::orchestrator::SynthesisReport;
use crate::cases::record::CaseRecord;
use crate::error::AttemptFailure;

/// Receives progress events of a synthesis run.
pub trait SynthesisObserver: Send + Sync {
    /// A run starts generating `requested` records from `exemplar_id`.
    fn on_run_started(&self, _requested: usize, _exemplar_id: &str) {}

    /// Attempt `attempt` (1-based) for record `index` failed.
    fn on_attempt_failed(&self, _index: usize, _attempt: u32, _failure: &AttemptFailure) {}

    /// Record `index` was accepted.
    fn on_record_accepted(&self, _index: usize, _record: &CaseRecord) {}

    /// Record `index` was skipped after `attempts` failed attempts.
    fn on_record_skipped(&self, _index: usize, _attempts: u32) {}

    /// The merged dataset was saved.
    fn on_run_finished(&self, _report: &SynthesisReport) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SynthesisObserver for NoopObserver {}

/// Observer that turns events into `tracing` log lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SynthesisObserver for TracingObserver {
    fn on_run_started(&self, requested: usize, exemplar_id: &str) {
        info!(requested, exemplar = %exemplar_id, "Starting case synthesis");
    }

    fn on_attempt_failed(&self, index: usize, attempt: u32, failure: &AttemptFailure) {
        warn!(index, attempt, kind = failure.kind(), error = %failure, "Generation attempt failed");
    }

    fn on_record_accepted(&self, index: usize, record: &CaseRecord) {
        info!(index, case_id = %record.case_id, "Case accepted");
    }

    fn on_record_skipped(&self, index: usize, attempts: u32) {
        warn!(index, attempts, "Giving up on case after repeated failures");
    }

    fn on_run_finished(&self, report: &SynthesisReport) {
        info!(
            original = report.original_count,
            requested = report.requested,
            accepted = report.accepted(),
            skipped = report.skipped.len(),
            "Case synthesis finished"
        );
    }
}

/// Shared no-op observer.
pub fn noop_observer() -> Arc<dyn SynthesisObserver> {
    Arc::new(NoopObserver)
}
