//! Integration tests for the chat-completions client.
//!
//! The ignored tests make real calls to a local OpenAI-compatible server.
//! Run with: CASE_FORGE_API_BASE=http://localhost:11434/v1 cargo test --test llm_integration -- --ignored

use std::time::Duration;

use case_forge::cases::{parse_case, CaseRecord, CaseValidator, PromptBuilder};
use case_forge::llm::{
    ChatCompletionsClient, GenerationClient, GenerationOptions, GenerationRequest, LlmProvider,
    Message, DEFAULT_API_BASE, DEFAULT_API_KEY, DEFAULT_MODEL,
};
use case_forge::LlmError;

fn create_test_client() -> ChatCompletionsClient {
    let api_base =
        std::env::var("CASE_FORGE_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
    let model = std::env::var("CASE_FORGE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
    ChatCompletionsClient::new(
        api_base,
        Some(DEFAULT_API_KEY.to_string()),
        model,
        Duration::from_secs(300),
    )
    .expect("client should build")
}

#[tokio::test]
async fn test_connection_refused_is_request_failed() {
    let client = ChatCompletionsClient::new(
        "http://127.0.0.1:65535/v1",
        None,
        "any",
        Duration::from_secs(5),
    )
    .expect("client should build");

    let err = client.probe().await.expect_err("nothing listens there");
    assert!(matches!(err, LlmError::RequestFailed(_)));

    let generation = GenerationClient::new(std::sync::Arc::new(client), GenerationOptions::default());
    let err = generation.generate("hello").await.expect_err("nothing listens there");
    assert!(matches!(err, LlmError::RequestFailed(_)));
}

#[tokio::test]
#[ignore] // Run with: cargo test --test llm_integration -- --ignored
async fn test_probe_live_backend() {
    create_test_client()
        .probe()
        .await
        .expect("backend should be reachable");
}

#[tokio::test]
#[ignore]
async fn test_simple_generation() {
    let client = create_test_client();

    let request = GenerationRequest::new(
        "",
        vec![Message::user("What is 2 + 2? Reply with just the number.")],
    )
    .with_temperature(0.0)
    .with_n(1);

    let response = client
        .generate(request)
        .await
        .expect("Generation should succeed");
    let content = response.first_content().expect("Should have content");
    assert!(
        content.contains('4'),
        "Response should contain '4', got: {}",
        content
    );
}

#[tokio::test]
#[ignore]
async fn test_generate_case_from_exemplar() {
    let exemplar = CaseRecord {
        case_id: "X5-BARISTA-UPSELL-001".to_string(),
        case_text: "A guest orders a plain latte during the morning rush and seems open to suggestions."
            .to_string(),
        best_solution:
            "Offer a matching pastry in one friendly sentence and respect the answer either way."
                .to_string(),
        keywords: r#"["upsell","coffee"]"#.to_string(),
        skills: r#"[{"skill":"Sales","criterion":"Relevant offer","rubric":["0 - none","5 - natural"],"recommendation":"Learn the menu"}]"#
            .to_string(),
    };

    let client = GenerationClient::new(
        std::sync::Arc::new(create_test_client()),
        GenerationOptions::default(),
    );
    let prompt = PromptBuilder::default().build(&exemplar);
    let text = client.generate(&prompt).await.expect("Generation should succeed");

    let draft = parse_case(&text).expect("reply should hold a case object");
    let record = CaseValidator::default().validate(&draft);
    assert!(record.is_ok(), "generated case invalid: {:?}", record.err());
}
