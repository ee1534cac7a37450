//! End-to-end tests of synthesis runs against scripted backends.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use case_forge::cases::{CaseRecord, CaseValidator, Dataset, ROLES, THEMES};
use case_forge::llm::{GenerationRequest, GenerationResponse, LlmProvider};
use case_forge::pipeline::{RunMode, SynthesisConfig, SynthesisRunner};
use case_forge::storage::RecordStore;
use case_forge::LlmError;
use serde_json::json;
use tempfile::TempDir;

/// Answers every request with the same text.
struct FixedProvider {
    reply: String,
    calls: Mutex<usize>,
}

impl FixedProvider {
    fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.calls.lock().expect("lock poisoned")
    }
}

#[async_trait]
impl LlmProvider for FixedProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        *self.calls.lock().expect("lock poisoned") += 1;
        Ok(GenerationResponse::from_content(request.model, self.reply.clone()))
    }
}

/// Numbers its replies so that every generated case is distinct.
struct CountingCaseProvider {
    calls: Mutex<usize>,
}

#[async_trait]
impl LlmProvider for CountingCaseProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        let mut calls = self.calls.lock().expect("lock poisoned");
        *calls += 1;
        let reply = json!({
            "case_id": format!("X5-LOGISTICS-OPTIMIZATION-{:03}", *calls + 1),
            "case_text": "A delivery truck arrives two hours late and the store shelves for dairy are almost empty.",
            "best_solution": "Re-plan the unloading order, inform the shift lead, and adjust the next delivery window with the depot.",
            "keywords": ["logistics", "delivery"],
            "skills": [{"skill": "Planning", "criterion": "Prioritization", "rubric": ["0 - chaotic", "5 - clear"], "recommendation": "Keep a backup schedule"}]
        });
        Ok(GenerationResponse::from_content(
            request.model,
            format!("Here is the case:\n```json\n{}\n```", reply),
        ))
    }
}

fn write_seed(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("cases.csv");
    let exemplar = CaseRecord::new(
        "X5-BARISTA-UPSELL-001",
        "Гость берёт американо навынос и торопится, а за ним уже выстроилась очередь из пяти человек.",
        "Коротко предложить выпечку к кофе, не задерживая гостя, и сразу принять следующий заказ.",
        &["апселл".to_string(), "кофе".to_string()],
        &[],
    )
    .expect("record should encode");
    RecordStore::default()
        .save(&Dataset::from(vec![exemplar]), &path)
        .expect("seed should save");
    path
}

fn config(dir: &TempDir, count: usize) -> SynthesisConfig {
    SynthesisConfig::default()
        .with_input(write_seed(dir))
        .with_output(dir.path().join("result").join("cases.csv"))
        .with_count(count)
        .with_delays(Duration::ZERO, Duration::ZERO)
}

#[tokio::test]
async fn test_single_exemplar_grows_to_three_rows() {
    let dir = TempDir::new().expect("temp dir");
    let runner = SynthesisRunner::new(config(&dir, 2)).expect("valid config");

    let summary = runner
        .run_with_provider(Arc::new(CountingCaseProvider {
            calls: Mutex::new(0),
        }))
        .await
        .expect("run should succeed");

    assert_eq!(summary.mode, RunMode::Model);
    assert_eq!(summary.total_rows, 3);
    assert_eq!(summary.generated, 2);

    let saved = RecordStore::default()
        .load(&runner.config().output)
        .expect("output should load");
    assert_eq!(saved.len(), 3);
    assert_eq!(saved.records()[0].case_id, "X5-BARISTA-UPSELL-001");
    assert_eq!(
        saved.records()[0].keyword_list().expect("keywords"),
        vec!["апселл", "кофе"]
    );

    let validator = CaseValidator::default();
    for record in &saved.records()[1..] {
        assert!(validator.validate_record(record).is_ok(), "{:?}", record);
    }
    assert_eq!(saved.records()[1].case_id, "X5-LOGISTICS-OPTIMIZATION-002");
}

#[tokio::test]
async fn test_always_empty_backend_keeps_dataset_size() {
    let dir = TempDir::new().expect("temp dir");
    let runner = SynthesisRunner::new(config(&dir, 3)).expect("valid config");
    let provider = Arc::new(FixedProvider::new(""));

    let summary = runner
        .run_with_provider(provider.clone())
        .await
        .expect("run should succeed");

    assert_eq!(summary.mode, RunMode::Model);
    assert_eq!(summary.total_rows, 1);
    assert_eq!(summary.generated, 0);
    assert_eq!(summary.skipped, vec![0, 1, 2]);
    assert_eq!(provider.calls(), 9);

    let saved = RecordStore::default()
        .load(&runner.config().output)
        .expect("output should load");
    assert_eq!(saved.len(), 1);
}

#[tokio::test]
async fn test_unreachable_backend_produces_template_cases() {
    let dir = TempDir::new().expect("temp dir");
    let mut config = config(&dir, 2);
    config.backend.api_base = "http://127.0.0.1:65535/v1".to_string();
    config.backend.timeout_secs = 5;

    let summary = SynthesisRunner::new(config)
        .expect("valid config")
        .run()
        .await
        .expect("fallback should succeed");

    assert_eq!(summary.mode, RunMode::TemplateFallback);
    assert_eq!(summary.total_rows, 3);

    let saved = RecordStore::default()
        .load(&dir.path().join("result").join("cases.csv"))
        .expect("output should load");
    let template = &saved.records()[1];
    let parts: Vec<&str> = template.case_id.split('-').collect();
    assert_eq!(parts[0], "X5");
    assert!(ROLES.contains(&parts[1]));
    assert!(THEMES.contains(&parts[2]));
    assert_eq!(parts[3], "100");
    assert!(CaseValidator::default().validate_record(template).is_ok());
}

#[tokio::test]
async fn test_template_only_run_numbers_from_start_index() {
    let dir = TempDir::new().expect("temp dir");
    let mut config = config(&dir, 3).with_template_only(true);
    config.template_start_index = 7;

    let summary = SynthesisRunner::new(config)
        .expect("valid config")
        .run()
        .await
        .expect("templates should succeed");

    assert_eq!(summary.mode, RunMode::TemplateOnly);
    let saved = RecordStore::default()
        .load(&summary.output)
        .expect("output should load");
    let suffixes: Vec<&str> = saved.records()[1..]
        .iter()
        .map(|r| r.case_id.rsplit('-').next().unwrap_or_default())
        .collect();
    assert_eq!(suffixes, vec!["007", "008", "009"]);
}
