/*!
 * Mock backend implementations for testing.
 *
 * This module provides a scripted backend that simulates different behaviors:
 * - `MockBackend::echo()` - Returns the user text unchanged
 * - `MockBackend::failing()` - Always fails with an error
 * - `MockBackend::failing_model(..)` - Fails only for one model slug
 * - `MockBackend::empty()` - Returns a response with no choices
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::{ChatBackend, ChatRequest, ChatResponse};

/// Behavior mode for the mock backend
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Returns the last user message text unchanged
    Echo,
    /// Returns a fixed completion text for every request
    Fixed(String),
    /// Always fails with an API error
    Failing,
    /// Fails for one model slug, echoes for all others
    FailingModel(String),
    /// Returns a response with no choices at all
    Empty,
    /// Sleeps before echoing (for timeout testing)
    Slow { delay_ms: u64 },
}

/// Mock chat backend for testing engine behavior
#[derive(Debug)]
pub struct MockBackend {
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of completed requests, shared across clones
    request_count: Arc<AtomicUsize>,
    /// Custom response generator (optional, overrides Echo)
    custom_response: Option<fn(&ChatRequest) -> String>,
}

impl MockBackend {
    /// Create a new mock backend with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            custom_response: None,
        }
    }

    /// Create a backend that echoes the user text back
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Create a backend that returns a fixed completion
    pub fn fixed(text: impl Into<String>) -> Self {
        Self::new(MockBehavior::Fixed(text.into()))
    }

    /// Create a backend that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a backend that errors only for the given model slug
    pub fn failing_model(model: impl Into<String>) -> Self {
        Self::new(MockBehavior::FailingModel(model.into()))
    }

    /// Create a backend that returns responses with no choices
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a backend that delays before echoing
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Set a custom response generator, applied instead of echoing
    pub fn with_custom_response(mut self, generator: fn(&ChatRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests completed so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    fn echo_text(&self, request: &ChatRequest) -> String {
        if let Some(generator) = self.custom_response {
            generator(request)
        } else {
            request.last_user_text().unwrap_or_default().to_string()
        }
    }
}

impl Clone for MockBackend {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior.clone(),
            request_count: Arc::clone(&self.request_count),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            MockBehavior::Echo => Ok(ChatResponse::from_text(self.echo_text(&request))),

            MockBehavior::Fixed(text) => Ok(ChatResponse::from_text(text.clone())),

            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated backend failure".to_string(),
            }),

            MockBehavior::FailingModel(model) => {
                if request.model == *model {
                    Err(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("Simulated failure for model {}", model),
                    })
                } else {
                    Ok(ChatResponse::from_text(self.echo_text(&request)))
                }
            }

            MockBehavior::Empty => Ok(ChatResponse { choices: Vec::new() }),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(*delay_ms)).await;
                Ok(ChatResponse::from_text(self.echo_text(&request)))
            }
        }
    }
}
