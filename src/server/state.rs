use std::sync::Arc;
use std::time::Duration;

use crate::app_config::Config;
use crate::consensus::{ConsensusEngine, ModelId};
use crate::detection::LanguageDetector;
use crate::extraction::TextExtractor;
use crate::gateway::ModelGateway;
use crate::providers::ChatBackend;
use crate::providers::openrouter::OpenRouter;

/// Shared state for the HTTP handlers
#[derive(Debug)]
pub struct ServerState {
    /// The consensus engine
    pub engine: ConsensusEngine,

    /// Image text extraction gateway
    pub extractor: TextExtractor,
}

impl ServerState {
    /// Wire up the engine and extractor from validated configuration.
    ///
    /// One OpenRouter client backs every gateway; the model slug is per-call.
    pub fn from_config(config: &Config) -> Self {
        let backend: Arc<dyn ChatBackend> = Arc::new(OpenRouter::new(
            &config.provider.api_key,
            &config.provider.endpoint,
            config.provider.timeout_secs,
        ));

        let gateway = ModelGateway::new(Arc::clone(&backend));
        let detector = LanguageDetector::new(Arc::clone(&backend), &config.consensus.detection_model);
        let extractor = TextExtractor::new(backend, &config.consensus.extraction_model);

        let models = config
            .consensus
            .models
            .iter()
            .map(|slug| ModelId::new(slug))
            .collect();

        let engine = ConsensusEngine::new(
            gateway,
            detector,
            models,
            Duration::from_secs(config.provider.timeout_secs),
        );

        Self { engine, extractor }
    }
}
