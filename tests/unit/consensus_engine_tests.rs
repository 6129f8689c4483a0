/*!
 * Tests for the consensus engine pipeline: fan-out, failure tolerance,
 * ranking and progress reporting.
 */

use std::sync::Arc;
use std::time::Duration;

use backtrans::consensus::{CancelToken, CollectingReporter, ModelId, ProgressReporter};
use backtrans::errors::EngineError;
use backtrans::providers::ChatRequest;
use backtrans::providers::mock::MockBackend;

use crate::common::{default_models, engine_with_models, request};

#[tokio::test]
async fn test_engine_fourEchoModels_shouldReturnFourPerfectResults() {
    let engine = engine_with_models(Arc::new(MockBackend::echo()), &default_models());

    let result = engine
        .run(&request("Hello world", "French", Some("English")))
        .await
        .unwrap();

    assert_eq!(result.all_results.len(), 4);
    assert_eq!(result.best.similarity_score, 100.0);
    assert_eq!(result.original_text, "Hello world");
    assert!(result.is_ranked());

    // Every configured model appears exactly once
    let mut models: Vec<&str> = result.all_results.iter().map(|r| r.model.as_str()).collect();
    models.sort_unstable();
    models.dedup();
    assert_eq!(models.len(), 4);
}

#[tokio::test]
async fn test_engine_tiedScores_shouldKeepModelIterationOrder() {
    // All echo round trips score 100; the stable sort must preserve the
    // configured model order
    let engine = engine_with_models(Arc::new(MockBackend::echo()), &default_models());

    let result = engine
        .run(&request("Hello world", "French", Some("English")))
        .await
        .unwrap();

    let order: Vec<&str> = result.all_results.iter().map(|r| r.model.as_str()).collect();
    assert_eq!(order, default_models());
    assert_eq!(result.best.model, ModelId::new("model/one"));
}

#[tokio::test]
async fn test_engine_oneFailingModel_shouldExcludeItAndKeepTheRest() {
    let engine = engine_with_models(
        Arc::new(MockBackend::failing_model("model/three")),
        &default_models(),
    );

    let result = engine
        .run(&request("Hello world", "French", Some("English")))
        .await
        .unwrap();

    assert_eq!(result.all_results.len(), 3);
    assert!(
        !result
            .all_results
            .iter()
            .any(|r| r.model.as_str() == "model/three")
    );
}

#[tokio::test]
async fn test_engine_allModelsFailing_shouldFailTheWholeRequest() {
    let engine = engine_with_models(Arc::new(MockBackend::failing()), &default_models());

    let result = engine
        .run(&request("Hello world", "French", Some("English")))
        .await;
    assert!(matches!(result, Err(EngineError::AllModelsFailed(_))));
}

fn degrading_responder(req: &ChatRequest) -> String {
    let text = req.last_user_text().unwrap_or_default();
    match req.model.as_str() {
        "model/one" => text.to_string(),
        "model/two" => format!("{}!", text),
        _ => format!("{}???", text),
    }
}

#[tokio::test]
async fn test_engine_degradedBackTranslations_shouldRankByDescendingSimilarity() {
    let backend = MockBackend::echo().with_custom_response(degrading_responder);
    let engine = engine_with_models(
        Arc::new(backend),
        &["model/three", "model/one", "model/two"],
    );

    let result = engine
        .run(&request("Hello world", "French", Some("English")))
        .await
        .unwrap();

    // model/one is lossless, model/two gains one char per round, model/three three
    let order: Vec<&str> = result.all_results.iter().map(|r| r.model.as_str()).collect();
    assert_eq!(order, vec!["model/one", "model/two", "model/three"]);
    assert_eq!(result.best.model, ModelId::new("model/one"));

    for pair in result.all_results.windows(2) {
        assert!(pair[0].similarity_score > pair[1].similarity_score);
    }
    assert_eq!(result.all_results[0].similarity_score, 100.0);
}

#[tokio::test]
async fn test_engine_missingSourceLanguage_shouldDetectAndComplete() {
    let engine = engine_with_models(Arc::new(MockBackend::echo()), &default_models());

    let result = engine.run(&request("Hello world", "French", None)).await.unwrap();
    assert_eq!(result.all_results.len(), 4);
}

#[tokio::test]
async fn test_engine_progressEvents_shouldStrictlyIncreaseAndEndAt100() {
    let engine = engine_with_models(Arc::new(MockBackend::echo()), &default_models());
    let reporter = Arc::new(CollectingReporter::new());

    engine
        .run_with_progress(
            &request("Hello world", "French", Some("English")),
            Some(reporter.clone() as Arc<dyn ProgressReporter>),
            None,
        )
        .await
        .unwrap();

    let events = reporter.events();
    assert!(events.len() >= 3);

    for pair in events.windows(2) {
        assert!(pair[0].progress < pair[1].progress);
    }

    let terminal = events.last().unwrap();
    assert_eq!(terminal.progress, 100);
    assert!(terminal.error.is_none());

    let result = terminal.result.as_ref().expect("terminal event carries the result");
    assert_eq!(result.all_results.len(), 4);
}

#[tokio::test]
async fn test_engine_totalFailureWithReporter_shouldEmitTerminalErrorEventLast() {
    let engine = engine_with_models(Arc::new(MockBackend::failing()), &default_models());
    let reporter = Arc::new(CollectingReporter::new());

    let outcome = engine
        .run_with_progress(
            &request("Hello world", "French", Some("English")),
            Some(reporter.clone() as Arc<dyn ProgressReporter>),
            None,
        )
        .await;
    assert!(outcome.is_err());

    let events = reporter.events();
    let terminal = events.last().unwrap();
    assert_eq!(terminal.progress, 100);
    assert!(terminal.error.is_some());
    assert!(terminal.result.is_none());

    // No successful terminal event anywhere in the stream
    assert!(events.iter().all(|e| e.result.is_none()));
}

#[tokio::test]
async fn test_engine_cancelledMidRun_shouldReturnCancelledWithoutTerminalEvent() {
    let engine = engine_with_models(Arc::new(MockBackend::slow(500)), &default_models());
    let reporter = Arc::new(CollectingReporter::new());
    let token = CancelToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let outcome = engine
        .run_with_progress(
            &request("Hello world", "French", Some("English")),
            Some(reporter.clone() as Arc<dyn ProgressReporter>),
            Some(token),
        )
        .await;
    assert!(matches!(outcome, Err(EngineError::Cancelled)));

    // Events emitted before cancellation are fine; nothing terminal follows
    let events = reporter.events();
    assert!(events.iter().all(|e| e.progress < 100));
}

#[tokio::test]
async fn test_engine_timingFields_shouldBeConsistent() {
    let engine = engine_with_models(Arc::new(MockBackend::slow(10)), &default_models());

    let result = engine
        .run(&request("Hello world", "French", Some("English")))
        .await
        .unwrap();

    for round_trip in &result.all_results {
        assert_eq!(round_trip.total_ms, round_trip.forward_ms + round_trip.backward_ms);
    }
}
