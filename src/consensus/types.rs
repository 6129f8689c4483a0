/*!
 * Data model for the consensus pipeline.
 *
 * All values here are immutable once built; the engine produces them and
 * transfers ownership to the caller. Serialization shape matches the HTTP
 * contract (camelCase keys).
 */

use serde::{Deserialize, Serialize};

/// Identifier of one translation backend model.
///
/// Drawn from the configured model set and used as the correlation key across
/// the forward and backward rounds of one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    /// Create a model identifier from a backend slug
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    /// The backend slug, e.g. "openai/gpt-4-turbo"
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ModelId {
    fn from(slug: &str) -> Self {
        Self::new(slug)
    }
}

/// One incoming translation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    /// Text to translate
    #[serde(rename = "query")]
    pub source_text: String,

    /// Language to translate into
    #[serde(rename = "targetLanguage")]
    pub target_language: String,

    /// Source language; absent triggers detection
    #[serde(rename = "sourceLanguage", default, skip_serializing_if = "Option::is_none")]
    pub source_language: Option<String>,
}

/// Result of one model's forward translation
#[derive(Debug, Clone)]
pub struct ForwardResult {
    /// Model that produced the translation
    pub model: ModelId,

    /// Forward translation text
    pub translation: String,

    /// Wall-clock duration of the forward call in milliseconds
    pub forward_ms: u64,
}

/// Result of one model's complete round trip
#[derive(Debug, Clone, Serialize)]
pub struct RoundTripResult {
    /// Model that ran this round trip
    pub model: ModelId,

    /// Forward translation text
    pub translation: String,

    /// Back-translation used as the fidelity probe
    #[serde(rename = "backTranslation")]
    pub back_translation: String,

    /// Forward call duration in milliseconds
    #[serde(rename = "forwardTime")]
    pub forward_ms: u64,

    /// Backward call duration in milliseconds
    #[serde(rename = "backwardTime")]
    pub backward_ms: u64,

    /// Sum of forward and backward durations in milliseconds
    #[serde(rename = "totalTime")]
    pub total_ms: u64,

    /// Similarity of the back-translation to the original text (0-100)
    #[serde(rename = "similarityScore")]
    pub similarity_score: f64,
}

/// Terminal artifact of a consensus run
#[derive(Debug, Clone, Serialize)]
pub struct ConsensusResult {
    /// The round trip with the highest similarity score
    pub best: RoundTripResult,

    /// Every successful round trip, sorted descending by similarity score
    #[serde(rename = "allResults")]
    pub all_results: Vec<RoundTripResult>,

    /// Wall-clock duration of the whole run in milliseconds
    #[serde(rename = "totalTime")]
    pub total_elapsed_ms: u64,

    /// The original source text
    #[serde(rename = "originalText")]
    pub original_text: String,
}

impl ConsensusResult {
    /// Check the ordering invariant: descending scores with best at the front
    pub fn is_ranked(&self) -> bool {
        if self.all_results.is_empty() {
            return false;
        }
        if self.best.model != self.all_results[0].model {
            return false;
        }
        self.all_results
            .windows(2)
            .all(|pair| pair[0].similarity_score >= pair[1].similarity_score)
    }
}
