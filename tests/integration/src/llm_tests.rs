//! LLM gateway integration tests
//!
//! Covers the generation endpoints in mock mode and against wiremock
//! provider APIs, the provider listing, and cost-router selection.

use crate::helpers::*;
use crate::mock_backends::MockOpenAiApi;
use gateway_providers::openai::{OpenAiConfig, OpenAiProvider};
use gateway_providers::LlmGateway;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use secrecy::SecretString;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;

#[tokio::test]
async fn test_generate_without_credentials_returns_mock() {
    let server = TestServer::with_defaults().await;

    let response = server
        .post_json(
            "/llm/generate",
            &json!({ "prompt": "Write about cats", "provider": "openai" }),
        )
        .await;
    assert_status(&response, 200);

    let body: Value = TestServer::json_body(response).await;
    assert!(body["content"].as_str().expect("content").contains("Mock"));
    assert_eq!(body["model"], "gpt-4o-mock");
    assert_eq!(body["provider"], "openai");

    // total == input + output even in mock mode
    let input = body["input_tokens"].as_u64().expect("input");
    let output = body["output_tokens"].as_u64().expect("output");
    assert_eq!(body["total_tokens"].as_u64(), Some(input + output));

    // Cost is a decimal string computed with the real formula
    let cost = Decimal::from_str(body["cost_usd"].as_str().expect("cost")).expect("decimal");
    assert!(cost > Decimal::ZERO);
}

#[tokio::test]
async fn test_generate_unknown_provider_is_400() {
    let server = TestServer::with_defaults().await;

    let response = server
        .post_json(
            "/llm/generate",
            &json!({ "prompt": "hello", "provider": "mistral" }),
        )
        .await;
    assert_status(&response, 400);

    let body: Value = TestServer::json_body(response).await;
    assert!(body["detail"].as_str().expect("detail").contains("mistral"));
}

#[tokio::test]
async fn test_generate_validation_errors_are_400() {
    let server = TestServer::with_defaults().await;

    let response = server
        .post_json("/llm/generate", &json!({ "prompt": "" }))
        .await;
    assert_status(&response, 400);

    let response = server
        .post_json(
            "/llm/generate",
            &json!({ "prompt": "hi", "temperature": 1.7 }),
        )
        .await;
    assert_status(&response, 400);
}

#[tokio::test]
async fn test_generate_against_live_provider_api() {
    let api = MockOpenAiApi::with_completion("Cats are wonderful.", 12, 6).await;
    let provider = OpenAiProvider::new(
        OpenAiConfig::new(Some(SecretString::new("test-key".to_string())))
            .with_base_url(api.url()),
    )
    .expect("provider");
    let llm_gateway = LlmGateway::new(vec![Arc::new(provider)]);

    let server = TestServer::builder()
        .with_llm_gateway(llm_gateway)
        .start()
        .await;

    let response = server
        .post_json(
            "/llm/generate",
            &json!({ "prompt": "Write about cats", "provider": "openai" }),
        )
        .await;
    assert_status(&response, 200);

    let body: Value = TestServer::json_body(response).await;
    assert_eq!(body["content"], "Cats are wonderful.");
    assert_eq!(body["input_tokens"], 12);
    assert_eq!(body["output_tokens"], 6);
    assert_eq!(body["total_tokens"], 18);

    // gpt-4o: 12/1000*0.0025 + 6/1000*0.01
    let cost = Decimal::from_str(body["cost_usd"].as_str().expect("cost")).expect("decimal");
    assert_eq!(cost, dec!(0.00003) + dec!(0.00006));
}

#[tokio::test]
async fn test_provider_failure_is_500_with_generic_detail() {
    let api = MockOpenAiApi::failing().await;
    let provider = OpenAiProvider::new(
        OpenAiConfig::new(Some(SecretString::new("test-key".to_string())))
            .with_base_url(api.url()),
    )
    .expect("provider");
    let llm_gateway = LlmGateway::new(vec![Arc::new(provider)]);

    let server = TestServer::builder()
        .with_llm_gateway(llm_gateway)
        .start()
        .await;

    let response = server
        .post_json(
            "/llm/generate",
            &json!({ "prompt": "hello", "provider": "openai" }),
        )
        .await;
    assert_status(&response, 500);

    // The upstream message is not exposed
    let body: Value = TestServer::json_body(response).await;
    assert_eq!(body["detail"], "Content generation failed");
}

#[tokio::test]
async fn test_list_providers_reports_availability() {
    let server = TestServer::with_defaults().await;

    let response = server.get("/llm/providers").await;
    assert_status(&response, 200);

    let body: Value = TestServer::json_body(response).await;
    let providers = body.as_array().expect("array");
    assert_eq!(providers.len(), 4);

    let names: Vec<&str> = providers
        .iter()
        .map(|p| p["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, vec!["openai", "anthropic", "google", "xai"]);

    for provider in providers {
        assert_eq!(provider["available"], false);
        assert!(!provider["models"].as_array().expect("models").is_empty());
        assert!(provider["default_model"].as_str().is_some());
    }
}

#[tokio::test]
async fn test_select_model_low_priority_within_budget() {
    let server = TestServer::with_defaults().await;

    let response = server
        .post_json(
            "/llm/select-model",
            &json!({ "priority": "low", "word_count": 2000, "max_budget_usd": 0.01 }),
        )
        .await;
    assert_status(&response, 200);

    let body: Value = TestServer::json_body(response).await;
    // Cheapest candidate fits: ~3000 est. tokens * $0.0003/1K well under a cent
    assert_eq!(body["provider"], "google");
    assert_eq!(body["model"], "gemini-1.5-flash");

    let per_1k =
        Decimal::from_str(body["estimated_cost_per_1k_tokens"].as_str().expect("cost"))
            .expect("decimal");
    let estimated = dec!(2000) * dec!(1.5) / dec!(1000) * per_1k;
    assert!(estimated <= dec!(0.01));
}

#[tokio::test]
async fn test_select_model_budget_overrides_priority_default() {
    let server = TestServer::with_defaults().await;

    let response = server
        .post_json(
            "/llm/select-model",
            &json!({ "priority": "high", "word_count": 2000, "max_budget_usd": 0.01 }),
        )
        .await;
    assert_status(&response, 200);

    let body: Value = TestServer::json_body(response).await;
    // gpt-4o at ~3000 tokens costs $0.03 > $0.01, so the budget drove the
    // selection off the priority default and the reason says so
    assert_ne!(body["model"], "gpt-4o");
    assert!(body["reason"]
        .as_str()
        .expect("reason")
        .contains("Budget-optimized"));
}

#[tokio::test]
async fn test_select_model_defaults_to_medium() {
    let server = TestServer::with_defaults().await;

    let response = server.post_json("/llm/select-model", &json!({})).await;
    assert_status(&response, 200);

    let body: Value = TestServer::json_body(response).await;
    assert_eq!(body["provider"], "anthropic");
    assert_eq!(body["model"], "claude-3-5-sonnet-20241022");
    assert!(body["reason"].as_str().expect("reason").contains("Default route"));
}
