/*!
 * Source language detection.
 *
 * A single-shot classification call against a fixed model. Detection is
 * advisory: when the call fails or returns something unusable, the detector
 * falls back to "English" instead of failing the pipeline.
 */

use std::sync::Arc;
use log::warn;

use crate::providers::{ChatBackend, ChatRequest};

/// Language name used when detection cannot produce an answer
const FALLBACK_LANGUAGE: &str = "English";

/// Detects the source language of a text via a fixed classification model
#[derive(Debug, Clone)]
pub struct LanguageDetector {
    /// Shared chat backend
    backend: Arc<dyn ChatBackend>,
    /// Model used for the classification call
    model: String,
}

impl LanguageDetector {
    /// Create a new detector using the given backend and model slug
    pub fn new(backend: Arc<dyn ChatBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    /// Detect the language of `text`, returning its English name.
    ///
    /// Never fails: upstream errors and malformed responses degrade to
    /// "English" with a warning.
    pub async fn detect(&self, text: &str) -> String {
        let request = ChatRequest::new(&self.model).add_message(
            "user",
            format!(
                "Detect the language of this text and respond with ONLY the \
                 language name in English (e.g., \"English\", \"Spanish\", \"Japanese\"): \"{}\"",
                text
            ),
        );

        match self.backend.complete(request).await {
            Ok(response) => {
                let detected = response.first_text().map(str::trim).unwrap_or_default();
                if detected.is_empty() {
                    warn!("Language detection returned an empty response, defaulting to {}", FALLBACK_LANGUAGE);
                    FALLBACK_LANGUAGE.to_string()
                } else {
                    detected.to_string()
                }
            }
            Err(e) => {
                warn!("Language detection failed ({}), defaulting to {}", e, FALLBACK_LANGUAGE);
                FALLBACK_LANGUAGE.to_string()
            }
        }
    }
}
