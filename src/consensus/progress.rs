/*!
 * Progress reporting for long-running consensus runs.
 *
 * The engine emits ordered `ProgressEvent` values through a `ProgressReporter`
 * sink. The engine is the only writer and awaits each emit before the next,
 * so events always arrive in strictly increasing progress order; transports
 * (server-sent events, channels) only have to flush them.
 */

use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Debug;
use tokio::sync::mpsc;

use super::types::ConsensusResult;

/// One progress update, consumed exactly once by the reporter
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    /// Progress percentage, 0-100
    pub progress: u8,

    /// Human-readable phase description
    pub message: String,

    /// Full result, present only on the terminal 100% event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ConsensusResult>,

    /// Error message, present only on a terminal error event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProgressEvent {
    /// A phase-transition event
    pub fn phase(progress: u8, message: impl Into<String>) -> Self {
        Self {
            progress,
            message: message.into(),
            result: None,
            error: None,
        }
    }

    /// The terminal event carrying the full result
    pub fn completed(result: ConsensusResult) -> Self {
        Self {
            progress: 100,
            message: "Translation complete".to_string(),
            result: Some(result),
            error: None,
        }
    }

    /// A terminal error event; no events may follow it
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            progress: 100,
            message: "Translation failed".to_string(),
            result: None,
            error: Some(error.into()),
        }
    }
}

/// Ordered sink for progress events
///
/// Implementations must flush each event before returning; the engine
/// serializes writes by awaiting every emit.
#[async_trait]
pub trait ProgressReporter: Send + Sync + Debug {
    /// Emit one event to the sink
    async fn emit(&self, event: ProgressEvent);
}

/// Reporter that forwards events into a tokio channel.
///
/// Used by the SSE endpoint: the handler keeps the receiver and streams
/// events to the client as they arrive. A closed receiver drops events
/// silently, matching a client that has gone away.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    sender: mpsc::Sender<ProgressEvent>,
}

impl ChannelReporter {
    /// Create a reporter and the receiving half of its channel
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<ProgressEvent>) {
        let (sender, receiver) = mpsc::channel(buffer);
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl ProgressReporter for ChannelReporter {
    async fn emit(&self, event: ProgressEvent) {
        let _ = self.sender.send(event).await;
    }
}

/// Reporter that records every event in memory, for tests
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: std::sync::Mutex<Vec<ProgressEvent>>,
}

impl CollectingReporter {
    /// Create an empty collecting reporter
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events emitted so far
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressReporter for CollectingReporter {
    async fn emit(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phaseEvent_shouldHaveNoResultOrError() {
        let event = ProgressEvent::phase(13, "Detecting source language");
        assert_eq!(event.progress, 13);
        assert!(event.result.is_none());
        assert!(event.error.is_none());
    }

    #[test]
    fn test_failedEvent_serialization_shouldSkipResult() {
        let event = ProgressEvent::failed("upstream exploded");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["progress"], 100);
        assert_eq!(json["error"], "upstream exploded");
        assert!(json.get("result").is_none());
    }

    #[tokio::test]
    async fn test_channelReporter_shouldDeliverEventsInOrder() {
        let (reporter, mut receiver) = ChannelReporter::new(8);

        reporter.emit(ProgressEvent::phase(13, "detect")).await;
        reporter.emit(ProgressEvent::phase(40, "forward")).await;

        assert_eq!(receiver.recv().await.unwrap().progress, 13);
        assert_eq!(receiver.recv().await.unwrap().progress, 40);
    }

    #[tokio::test]
    async fn test_channelReporter_closedReceiver_shouldNotPanic() {
        let (reporter, receiver) = ChannelReporter::new(1);
        drop(receiver);
        reporter.emit(ProgressEvent::phase(13, "detect")).await;
    }

    #[tokio::test]
    async fn test_collectingReporter_shouldRecordEvents() {
        let reporter = CollectingReporter::new();
        reporter.emit(ProgressEvent::phase(5, "start")).await;
        reporter.emit(ProgressEvent::phase(13, "detect")).await;

        let events = reporter.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].message, "detect");
    }
}
