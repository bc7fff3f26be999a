use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use lenstext_core::{ImagePayload, RecognitionFailure, RecognitionResult, Recognizer};

/// A recognizer that returns a canned result.
///
/// Clones share the call counter and the gate, so a test can keep one handle
/// and hand the other to the workflow.
#[derive(Clone)]
pub struct MockRecognizer {
    name: String,
    outcome: Result<RecognitionResult, RecognitionFailure>,
    delay: Option<Duration>,
    gate: Option<Arc<Notify>>,
    calls: Arc<AtomicUsize>,
}

impl MockRecognizer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: Ok(RecognitionResult::new("Mock text")),
            delay: None,
            gate: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_response(mut self, text: impl Into<String>) -> Self {
        self.outcome = Ok(RecognitionResult::new(text));
        self
    }

    pub fn failing(mut self) -> Self {
        self.outcome = Err(RecognitionFailure::unavailable());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Hold every call until the returned handle is notified.
    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Recognizer for MockRecognizer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn recognize_text(
        &self,
        _payload: &ImagePayload,
    ) -> Result<RecognitionResult, RecognitionFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone()
    }
}
