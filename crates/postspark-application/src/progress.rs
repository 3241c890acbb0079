//! Staged progress events for one generation call.
//!
//! Stages are delivered in the fixed pipeline order with non-decreasing
//! percentages; `error` is emitted at the failing stage's percentage and
//! is never skipped when a failure occurs.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Named phase of the generation pipeline.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GenerationStage {
    Initializing,
    Analyzing,
    Generating,
    Optimizing,
    Finalizing,
    Completed,
    Error,
}

impl GenerationStage {
    /// Fixed progress percentage reached when this stage begins.
    pub fn percent(self) -> u8 {
        match self {
            Self::Initializing => 5,
            Self::Analyzing => 20,
            Self::Generating => 45,
            Self::Optimizing => 75,
            Self::Finalizing => 90,
            Self::Completed => 100,
            // Error reports the percentage of the stage that failed;
            // this value is only a fallback.
            Self::Error => 100,
        }
    }
}

/// One progress event, suitable for direct serialization to a frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: GenerationStage,
    pub percent: u8,
    pub detail: Option<String>,
}

impl ProgressUpdate {
    /// Event for entering a pipeline stage at its fixed percentage.
    pub fn stage(stage: GenerationStage) -> Self {
        Self {
            stage,
            percent: stage.percent(),
            detail: None,
        }
    }

    /// Attaches a human-readable detail line.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Error event frozen at the percentage the pipeline had reached.
    pub fn error(percent: u8, detail: impl Into<String>) -> Self {
        Self {
            stage: GenerationStage::Error,
            percent,
            detail: Some(detail.into()),
        }
    }
}

/// Receives progress events during a generation call.
pub trait ProgressSink: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// Channel-backed sink for streaming progress to a frontend.
///
/// Non-blocking send: if the receiver is dropped, events are discarded.
impl ProgressSink for mpsc::UnboundedSender<ProgressUpdate> {
    fn report(&self, update: ProgressUpdate) {
        let _ = self.send(update);
    }
}

/// Sink that discards every event.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&self, _update: ProgressUpdate) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_percents_are_monotonic() {
        let order = [
            GenerationStage::Initializing,
            GenerationStage::Analyzing,
            GenerationStage::Generating,
            GenerationStage::Optimizing,
            GenerationStage::Finalizing,
            GenerationStage::Completed,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].percent() < pair[1].percent());
        }
    }

    #[test]
    fn test_wire_names_are_snake_case() {
        assert_eq!(GenerationStage::Initializing.to_string(), "initializing");
        assert_eq!(GenerationStage::Error.to_string(), "error");
    }

    #[tokio::test]
    async fn test_channel_sink_delivers_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.report(ProgressUpdate::stage(GenerationStage::Initializing));
        tx.report(ProgressUpdate::stage(GenerationStage::Completed).with_detail("done"));

        assert_eq!(rx.recv().await.unwrap().stage, GenerationStage::Initializing);
        let last = rx.recv().await.unwrap();
        assert_eq!(last.percent, 100);
        assert_eq!(last.detail.as_deref(), Some("done"));
    }

    #[test]
    fn test_dropped_receiver_does_not_panic() {
        let (tx, rx) = mpsc::unbounded_channel::<ProgressUpdate>();
        drop(rx);
        tx.report(ProgressUpdate::error(45, "backend down"));
    }
}
