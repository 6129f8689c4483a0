/*!
 * Common test utilities shared across the test suite.
 */

use std::sync::Arc;
use std::time::Duration;

use backtrans::consensus::{ConsensusEngine, ModelId, TranslationRequest};
use backtrans::detection::LanguageDetector;
use backtrans::gateway::ModelGateway;
use backtrans::providers::ChatBackend;

/// Build an engine over the given backend with the given model slugs
pub fn engine_with_models(backend: Arc<dyn ChatBackend>, models: &[&str]) -> ConsensusEngine {
    ConsensusEngine::new(
        ModelGateway::new(Arc::clone(&backend)),
        LanguageDetector::new(backend, "detect/model"),
        models.iter().map(|slug| ModelId::new(*slug)).collect(),
        Duration::from_secs(5),
    )
}

/// The four-model set used by most pipeline tests
pub fn default_models() -> Vec<&'static str> {
    vec!["model/one", "model/two", "model/three", "model/four"]
}

/// Build a translation request with an explicit source language
pub fn request(source_text: &str, target_language: &str, source_language: Option<&str>) -> TranslationRequest {
    TranslationRequest {
        source_text: source_text.to_string(),
        target_language: target_language.to_string(),
        source_language: source_language.map(|s| s.to_string()),
    }
}
