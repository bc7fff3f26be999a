use std::fmt;
use std::sync::Arc;

use lenstext_core::{CycleId, ImagePayload, RecognitionFailure, RecognitionResult, Recognizer};

/// One pending recognition call, handed out when the workflow enters
/// Processing. Run it anywhere, then give the outcome back to the controller.
pub struct RecognitionJob {
    cycle: CycleId,
    payload: ImagePayload,
    recognizer: Arc<dyn Recognizer>,
}

impl RecognitionJob {
    pub(crate) fn new(cycle: CycleId, payload: ImagePayload, recognizer: Arc<dyn Recognizer>) -> Self {
        Self {
            cycle,
            payload,
            recognizer,
        }
    }

    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    pub fn payload(&self) -> &ImagePayload {
        &self.payload
    }

    /// Make the single recognition call for this cycle.
    pub async fn run(self) -> RecognitionOutcome {
        let result = self.recognizer.recognize_text(&self.payload).await;
        RecognitionOutcome {
            cycle: self.cycle,
            result,
        }
    }
}

impl fmt::Debug for RecognitionJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecognitionJob")
            .field("cycle", &self.cycle)
            .field("payload", &self.payload)
            .field("recognizer", &self.recognizer.name())
            .finish()
    }
}

/// What came back from a [`RecognitionJob`].
#[derive(Debug, Clone)]
pub struct RecognitionOutcome {
    pub cycle: CycleId,
    pub result: Result<RecognitionResult, RecognitionFailure>,
}
