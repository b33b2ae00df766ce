//! Mock backend services and provider APIs for integration testing
//!
//! Wiremock-based servers that stand in for the platform microservices
//! behind the proxy and for the third-party LLM APIs.

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A mock platform microservice sitting behind the proxy.
pub struct MockBackend {
    /// The wiremock server.
    pub server: MockServer,
}

impl MockBackend {
    /// Start a backend answering 200 with a JSON body on every path.
    pub async fn healthy(service: &str) -> Self {
        let server = MockServer::start().await;
        Mock::given(path_regex(".*"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "service": service, "ok": true })),
            )
            .mount(&server)
            .await;
        Self { server }
    }

    /// Start a backend that answers every request after a delay.
    pub async fn slow(delay: Duration) -> Self {
        let server = MockServer::start().await;
        Mock::given(path_regex(".*"))
            .respond_with(ResponseTemplate::new(200).set_delay(delay))
            .mount(&server)
            .await;
        Self { server }
    }

    /// Start a backend that returns the given status on every request.
    pub async fn with_status(status: u16) -> Self {
        let server = MockServer::start().await;
        Mock::given(path_regex(".*"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "detail": "backend says no"
            })))
            .mount(&server)
            .await;
        Self { server }
    }

    /// Base URL of the backend.
    pub fn url(&self) -> String {
        self.server.uri()
    }
}

/// Mock OpenAI-compatible chat completions API.
pub struct MockOpenAiApi {
    /// The wiremock server.
    pub server: MockServer,
}

impl MockOpenAiApi {
    /// Start a mock that returns a fixed completion with token usage.
    pub async fn with_completion(content: &str, prompt_tokens: u32, completion_tokens: u32) -> Self {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(wiremock::matchers::path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {"role": "assistant", "content": content},
                    "finish_reason": "stop"
                }],
                "usage": {
                    "prompt_tokens": prompt_tokens,
                    "completion_tokens": completion_tokens,
                    "total_tokens": prompt_tokens + completion_tokens
                }
            })))
            .mount(&server)
            .await;
        Self { server }
    }

    /// Start a mock that fails every completion with a 500.
    pub async fn failing() -> Self {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(wiremock::matchers::path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": {"message": "internal provider error"}
            })))
            .mount(&server)
            .await;
        Self { server }
    }

    /// Base URL of the API.
    pub fn url(&self) -> String {
        self.server.uri()
    }
}
