/*!
 * Model Gateway: a single translation call against one backend model.
 *
 * Wraps a `ChatBackend` with the fixed translator prompt. The gateway is the
 * only place that knows how a translation request is phrased; the consensus
 * engine deals purely in text in, text out.
 */

use std::sync::Arc;

use crate::consensus::ModelId;
use crate::errors::ProviderError;
use crate::providers::{ChatBackend, ChatRequest};

/// Fixed system instruction for translation calls.
///
/// The target language is appended per call; everything else is constant so
/// forward and backward rounds are phrased identically.
const TRANSLATOR_SYSTEM_PROMPT: &str = "You are a professional translator. \
You must preserve the exact original formatting including line breaks, spacing, \
punctuation, capitalization style, and special characters. Only change the \
language of the words themselves. Do not add any explanations, notes, or \
additional text.";

/// Gateway for per-model translation calls
#[derive(Debug, Clone)]
pub struct ModelGateway {
    /// Shared chat backend; one client serves every model
    backend: Arc<dyn ChatBackend>,
}

impl ModelGateway {
    /// Create a new gateway over the given backend
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    /// The underlying backend, shared with the detector and extractor
    pub fn backend(&self) -> Arc<dyn ChatBackend> {
        Arc::clone(&self.backend)
    }

    /// Build the chat request for one translation call
    fn build_request(model: &ModelId, text: &str, target_language: &str) -> ChatRequest {
        ChatRequest::new(model.as_str())
            .add_message(
                "system",
                format!(
                    "{} Translate the user's message to {}.",
                    TRANSLATOR_SYSTEM_PROMPT, target_language
                ),
            )
            .add_message("user", text)
    }

    /// Translate `text` to `target_language` using the given model.
    ///
    /// A response with no completion text yields an empty string rather than
    /// an error: one odd response shape must not abort the whole fan-out, and
    /// an empty translation simply scores poorly.
    pub async fn translate(
        &self,
        model: &ModelId,
        text: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let request = Self::build_request(model, text, target_language);
        let response = self.backend.complete(request).await?;
        Ok(response.first_text().unwrap_or_default().to_string())
    }
}
