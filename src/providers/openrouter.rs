use std::time::Duration;
use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::Deserialize;

use crate::errors::ProviderError;
use crate::providers::{ChatBackend, ChatRequest, ChatResponse};

/// OpenRouter client for the chat-completions API
///
/// One client serves every configured model; the model slug travels in the
/// request body, so the consensus fan-out shares a single connection pool.
pub struct OpenRouter {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL (optional, defaults to the public API)
    endpoint: String,
    /// Per-request timeout in milliseconds, reported on timeout errors
    timeout_ms: u64,
}

impl std::fmt::Debug for OpenRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouter")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Error envelope returned by the API on failure
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

/// Error detail inside the envelope
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl OpenRouter {
    /// Create a new OpenRouter client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            timeout_ms: timeout_secs * 1000,
        }
    }

    fn completions_url(&self) -> String {
        let endpoint = if self.endpoint.is_empty() {
            "https://openrouter.ai/api/v1"
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{}/chat/completions", endpoint)
    }

    /// Pull the upstream error message out of a non-success response body
    fn extract_error_message(body: &str) -> String {
        serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .and_then(|envelope| envelope.error)
            .and_then(|error| error.message)
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}

#[async_trait]
impl ChatBackend for OpenRouter {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let response = self
            .client
            .post(self.completions_url())
            .header("Content-Type", "application/json")
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(self.timeout_ms)
                } else {
                    ProviderError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response body".to_string());
            let message = Self::extract_error_message(&body);
            error!("OpenRouter API error ({}): {}", status, message);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        response
            .json::<ChatResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completionsUrl_defaultEndpoint_shouldUsePublicApi() {
        let client = OpenRouter::new("sk-test", "", 30);
        assert_eq!(
            client.completions_url(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[test]
    fn test_completionsUrl_customEndpoint_shouldTrimSlash() {
        let client = OpenRouter::new("sk-test", "http://localhost:9999/v1/", 30);
        assert_eq!(client.completions_url(), "http://localhost:9999/v1/chat/completions");
    }

    #[test]
    fn test_extractErrorMessage_envelope_shouldReturnDetail() {
        let body = r#"{ "error": { "message": "model overloaded" } }"#;
        assert_eq!(OpenRouter::extract_error_message(body), "model overloaded");
    }

    #[test]
    fn test_extractErrorMessage_malformedBody_shouldFallBack() {
        assert_eq!(OpenRouter::extract_error_message("<html>"), "Unknown error");
        assert_eq!(OpenRouter::extract_error_message("{}"), "Unknown error");
    }
}
