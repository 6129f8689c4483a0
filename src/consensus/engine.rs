/*!
 * The Multi-Model Translation Consensus Engine.
 *
 * Drives the forward/backward translation rounds across all configured
 * models, scores each candidate's back-translation against the original
 * text, and selects the round trip with the highest similarity as the
 * consensus winner.
 *
 * Failure policy: a model whose forward or backward call fails (or times
 * out) is excluded from the results; the remaining models proceed. Only a
 * total fan-out failure fails the whole request.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use futures::future::join_all;
use log::{debug, warn};
use tokio::sync::Notify;
use tokio::time::timeout;

use crate::errors::{EngineError, ProviderError};
use crate::gateway::ModelGateway;
use crate::detection::LanguageDetector;
use crate::language_utils::resolve_language_name;
use crate::similarity::similarity;
use super::progress::{ProgressEvent, ProgressReporter};
use super::types::{ConsensusResult, ForwardResult, ModelId, RoundTripResult, TranslationRequest};

/// Caller-supplied cancellation signal.
///
/// Once triggered the engine stops emitting progress events, abandons
/// in-flight backend calls and returns `EngineError::Cancelled`.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

#[derive(Debug, Default)]
struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    /// Create a fresh, untriggered token
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger cancellation; wakes every pending `cancelled()` wait
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Whether cancellation has been triggered
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolve once cancellation is triggered
    pub async fn cancelled(&self) {
        while !self.is_cancelled() {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                break;
            }
            notified.await;
        }
    }
}

/// The consensus engine: fan-out, round trip, score, rank
#[derive(Debug, Clone)]
pub struct ConsensusEngine {
    /// Gateway for per-model translation calls
    gateway: ModelGateway,

    /// Source language detector
    detector: LanguageDetector,

    /// Fixed set of models fanned out to per request
    models: Vec<ModelId>,

    /// Deadline applied to every individual backend call
    call_timeout: Duration,
}

impl ConsensusEngine {
    /// Create a new engine over the given gateway and model set
    pub fn new(
        gateway: ModelGateway,
        detector: LanguageDetector,
        models: Vec<ModelId>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            gateway,
            detector,
            models,
            call_timeout,
        }
    }

    /// The configured model set
    pub fn models(&self) -> &[ModelId] {
        &self.models
    }

    /// Run a consensus translation without progress reporting
    pub async fn run(&self, request: &TranslationRequest) -> Result<ConsensusResult, EngineError> {
        self.run_with_progress(request, None, None).await
    }

    /// Run a consensus translation, optionally reporting progress and
    /// honoring a cancellation token.
    ///
    /// Progress events are emitted by this single writer in strictly
    /// increasing percent order; the terminal event carries the full result.
    /// On failure (other than cancellation) a terminal error event is emitted
    /// before the error is returned.
    pub async fn run_with_progress(
        &self,
        request: &TranslationRequest,
        reporter: Option<Arc<dyn ProgressReporter>>,
        cancel: Option<CancelToken>,
    ) -> Result<ConsensusResult, EngineError> {
        let result = self
            .run_inner(request, reporter.as_deref(), cancel.as_ref())
            .await;

        if let Err(e) = &result {
            if !matches!(e, EngineError::Cancelled) {
                emit(reporter.as_deref(), ProgressEvent::failed(e.to_string())).await;
            }
        }

        result
    }

    async fn run_inner(
        &self,
        request: &TranslationRequest,
        reporter: Option<&dyn ProgressReporter>,
        cancel: Option<&CancelToken>,
    ) -> Result<ConsensusResult, EngineError> {
        validate(request)?;

        let started = Instant::now();
        let source_text = request.source_text.as_str();
        let target_language = resolve_language_name(&request.target_language);

        emit(reporter, ProgressEvent::phase(5, "Starting translation")).await;

        // Phase 1: establish the source language, detecting it when absent
        let source_language = match request
            .source_language
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(supplied) => resolve_language_name(supplied),
            None => {
                let detected = self
                    .with_cancel(cancel, self.detector.detect(source_text))
                    .await?;
                resolve_language_name(&detected)
            }
        };
        emit(
            reporter,
            ProgressEvent::phase(13, format!("Source language: {}", source_language)),
        )
        .await;

        // Phase 2: forward fan-out; barrier until every call settles
        let forward_futures = self.models.iter().map(|model| {
            let gateway = self.gateway.clone();
            let target_language = target_language.clone();
            async move {
                let call_started = Instant::now();
                let outcome = self
                    .bounded(gateway.translate(model, source_text, &target_language))
                    .await;
                (model.clone(), outcome, elapsed_ms(call_started))
            }
        });
        let forward_outcomes = self.with_cancel(cancel, join_all(forward_futures)).await?;

        let mut forwards: Vec<ForwardResult> = Vec::with_capacity(self.models.len());
        let mut failures: Vec<String> = Vec::new();
        for (model, outcome, forward_ms) in forward_outcomes {
            match outcome {
                Ok(translation) => {
                    debug!("Forward translation from {} took {}ms", model, forward_ms);
                    forwards.push(ForwardResult {
                        model,
                        translation,
                        forward_ms,
                    });
                }
                Err(e) => {
                    warn!("Forward translation failed for {}: {}", model, e);
                    failures.push(format!("{}: {}", model, e));
                }
            }
        }

        if forwards.is_empty() {
            return Err(EngineError::AllModelsFailed(failures.join("; ")));
        }
        emit(
            reporter,
            ProgressEvent::phase(
                40,
                format!(
                    "Forward translations complete ({} of {} models)",
                    forwards.len(),
                    self.models.len()
                ),
            ),
        )
        .await;

        // Phase 3: back-translate every forward result with its own model
        let backward_futures = forwards.into_iter().map(|forward| {
            let gateway = self.gateway.clone();
            let source_language = source_language.clone();
            async move {
                let call_started = Instant::now();
                let outcome = self
                    .bounded(gateway.translate(&forward.model, &forward.translation, &source_language))
                    .await;
                (forward, outcome, elapsed_ms(call_started))
            }
        });
        let backward_outcomes = self.with_cancel(cancel, join_all(backward_futures)).await?;
        emit(reporter, ProgressEvent::phase(75, "Back-translations complete")).await;

        // Phase 4: score each surviving round trip against the original text
        let mut round_trips: Vec<RoundTripResult> = Vec::new();
        for (forward, outcome, backward_ms) in backward_outcomes {
            match outcome {
                Ok(back_translation) => {
                    let score = similarity(source_text, &back_translation);
                    round_trips.push(RoundTripResult {
                        model: forward.model,
                        translation: forward.translation,
                        back_translation,
                        forward_ms: forward.forward_ms,
                        backward_ms,
                        total_ms: forward.forward_ms + backward_ms,
                        similarity_score: score,
                    });
                }
                Err(e) => {
                    warn!("Back-translation failed for {}: {}", forward.model, e);
                    failures.push(format!("{}: {}", forward.model, e));
                }
            }
        }

        if round_trips.is_empty() {
            return Err(EngineError::AllModelsFailed(failures.join("; ")));
        }

        // Phase 5: rank, stable so ties keep model iteration order
        round_trips.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
        emit(
            reporter,
            ProgressEvent::phase(90, format!("Ranked {} candidates", round_trips.len())),
        )
        .await;

        let best = round_trips
            .first()
            .cloned()
            .ok_or_else(|| EngineError::Internal("Ranking produced no winner".to_string()))?;

        let result = ConsensusResult {
            best,
            all_results: round_trips,
            total_elapsed_ms: elapsed_ms(started),
            original_text: source_text.to_string(),
        };

        if let Some(token) = cancel {
            if token.is_cancelled() {
                return Err(EngineError::Cancelled);
            }
        }
        emit(reporter, ProgressEvent::completed(result.clone())).await;

        Ok(result)
    }

    /// Apply the per-call deadline; a timeout is treated like any other failure
    async fn bounded(
        &self,
        call: impl Future<Output = Result<String, ProviderError>>,
    ) -> Result<String, ProviderError> {
        match timeout(self.call_timeout, call).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ProviderError::Timeout(self.call_timeout.as_millis() as u64)),
        }
    }

    /// Race a future against the cancellation token
    async fn with_cancel<T>(
        &self,
        cancel: Option<&CancelToken>,
        fut: impl Future<Output = T>,
    ) -> Result<T, EngineError> {
        match cancel {
            Some(token) => {
                tokio::select! {
                    _ = token.cancelled() => Err(EngineError::Cancelled),
                    value = fut => Ok(value),
                }
            }
            None => Ok(fut.await),
        }
    }
}

fn validate(request: &TranslationRequest) -> Result<(), EngineError> {
    if request.source_text.trim().is_empty() {
        return Err(EngineError::Validation("query must not be empty".to_string()));
    }
    if request.target_language.trim().is_empty() {
        return Err(EngineError::Validation("targetLanguage must not be empty".to_string()));
    }
    Ok(())
}

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}

async fn emit(reporter: Option<&dyn ProgressReporter>, event: ProgressEvent) {
    if let Some(reporter) = reporter {
        reporter.emit(event).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ChatBackend;
    use crate::providers::mock::MockBackend;

    fn engine_with(backend: MockBackend) -> ConsensusEngine {
        let backend: Arc<dyn ChatBackend> = Arc::new(backend);
        ConsensusEngine::new(
            ModelGateway::new(Arc::clone(&backend)),
            LanguageDetector::new(backend, "detect/model"),
            vec![ModelId::new("model/a"), ModelId::new("model/b")],
            Duration::from_secs(5),
        )
    }

    fn request(source_language: Option<&str>) -> TranslationRequest {
        TranslationRequest {
            source_text: "Hello world".to_string(),
            target_language: "French".to_string(),
            source_language: source_language.map(|s| s.to_string()),
        }
    }

    #[tokio::test]
    async fn test_run_emptyQuery_shouldFailValidation() {
        let engine = engine_with(MockBackend::echo());
        let request = TranslationRequest {
            source_text: "   ".to_string(),
            target_language: "French".to_string(),
            source_language: None,
        };

        let result = engine.run(&request).await;
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[tokio::test]
    async fn test_run_emptyTargetLanguage_shouldFailValidation() {
        let engine = engine_with(MockBackend::echo());
        let request = TranslationRequest {
            source_text: "Hello".to_string(),
            target_language: "".to_string(),
            source_language: None,
        };

        let result = engine.run(&request).await;
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[tokio::test]
    async fn test_run_echoBackend_shouldScorePerfectRoundTrip() {
        let engine = engine_with(MockBackend::echo());
        let result = engine.run(&request(Some("English"))).await.unwrap();

        assert_eq!(result.all_results.len(), 2);
        assert_eq!(result.best.similarity_score, 100.0);
        assert!(result.is_ranked());
    }

    #[tokio::test]
    async fn test_run_allModelsFailing_shouldReturnAllModelsFailed() {
        let engine = engine_with(MockBackend::failing());
        let result = engine.run(&request(Some("English"))).await;
        assert!(matches!(result, Err(EngineError::AllModelsFailed(_))));
    }

    #[tokio::test]
    async fn test_run_preCancelledToken_shouldReturnCancelled() {
        let engine = engine_with(MockBackend::echo());
        let token = CancelToken::new();
        token.cancel();

        let result = engine
            .run_with_progress(&request(Some("English")), None, Some(token))
            .await;
        assert!(matches!(result, Err(EngineError::Cancelled)));
    }

    #[tokio::test]
    async fn test_run_slowBackendBeyondTimeout_shouldFailAllModels() {
        let backend: Arc<dyn ChatBackend> = Arc::new(MockBackend::slow(200));
        let engine = ConsensusEngine::new(
            ModelGateway::new(Arc::clone(&backend)),
            LanguageDetector::new(backend, "detect/model"),
            vec![ModelId::new("model/a")],
            Duration::from_millis(20),
        );

        let result = engine.run(&request(Some("English"))).await;
        assert!(matches!(result, Err(EngineError::AllModelsFailed(_))));
    }

    #[tokio::test]
    async fn test_cancelToken_cancelledWait_shouldResolve() {
        let token = CancelToken::new();
        let waiter = token.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });

        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("cancelled() should resolve after cancel()")
            .unwrap();
    }
}
