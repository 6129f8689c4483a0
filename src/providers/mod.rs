/*!
 * Backend implementations for chat-completion model APIs.
 *
 * This module defines the wire types shared by all backends and the
 * `ChatBackend` trait the gateways depend on:
 * - OpenRouter: the production multi-model API
 * - Mock: scripted backend for testing
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::errors::ProviderError;

/// A chat-completion request: model identifier plus ordered messages
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Backend model slug, e.g. "openai/gpt-4-turbo"
    pub model: String,

    /// Conversation messages in order
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    /// Create a request for the given model with no messages
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
        }
    }

    /// Add a plain-text message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage {
            role: role.into(),
            content: MessageContent::Text(content.into()),
        });
        self
    }

    /// Add a multi-part message (used for image + instruction payloads)
    pub fn add_parts_message(mut self, role: impl Into<String>, parts: Vec<ContentPart>) -> Self {
        self.messages.push(ChatMessage {
            role: role.into(),
            content: MessageContent::Parts(parts),
        });
        self
    }

    /// The text of the last user message, if any.
    ///
    /// Used by the mock backend to echo inputs; the production backend never
    /// reads its own requests.
    pub fn last_user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .and_then(|m| match &m.content {
                MessageContent::Text(text) => Some(text.as_str()),
                MessageContent::Parts(_) => None,
            })
    }
}

/// A single conversation message
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message
    pub content: MessageContent,
}

/// Message content: either a plain string or a list of typed parts
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain text content
    Text(String),
    /// Structured content parts (text and/or image references)
    Parts(Vec<ContentPart>),
}

/// One part of a structured message
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    /// A text fragment
    #[serde(rename = "text")]
    Text {
        /// The text itself
        text: String,
    },

    /// An inline image reference (data URL or remote URL)
    #[serde(rename = "image_url")]
    ImageUrl {
        /// The image reference
        image_url: ImageUrl,
    },
}

/// Image reference wrapper matching the chat-completions schema
#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    /// data: or https: URL of the image
    pub url: String,
}

/// A chat-completion response
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Completion candidates; the first one carries the answer
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

/// A single completion candidate
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    /// The generated assistant message
    pub message: ResponseMessage,
}

/// The assistant message inside a completion candidate
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    /// Generated text; absent for some malformed responses
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Extract the first completion's text, if present
    pub fn first_text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }

    /// Build a response carrying a single text completion (test helper)
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            choices: vec![ChatChoice {
                message: ResponseMessage {
                    content: Some(text.into()),
                },
            }],
        }
    }
}

/// Common trait for all chat-completion backends
///
/// The gateways hold backends as trait objects so the engine can run against
/// the production API or a scripted mock interchangeably.
#[async_trait]
pub trait ChatBackend: Send + Sync + Debug {
    /// Complete a chat request against this backend
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError>;
}

pub mod mock;
pub mod openrouter;
