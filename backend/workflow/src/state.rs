use lenstext_core::{CycleId, ImagePayload, RecognitionResult, WorkflowPhase};
use lenstext_media::CaptureSession;

/// The camera side of the Capturing state.
#[derive(Debug)]
pub enum CameraHandle {
    /// An open camera streaming frames.
    Live(CaptureSession),
    /// The camera could not be opened; holds the message to show. The only
    /// way out is cancel.
    Unavailable(String),
}

impl CameraHandle {
    pub fn is_live(&self) -> bool {
        matches!(self, CameraHandle::Live(session) if session.is_active())
    }

    /// Free the device, if one is held.
    pub fn release(&mut self) {
        if let CameraHandle::Live(session) = self {
            session.release();
        }
    }
}

/// Where the workflow is, with exactly the data valid there.
#[derive(Debug)]
pub enum WorkflowState {
    Idle {
        /// Message from the last failed cycle, shown until the next action.
        error: Option<String>,
    },
    Capturing {
        camera: CameraHandle,
    },
    Processing {
        cycle: CycleId,
        payload: ImagePayload,
    },
    Result {
        payload: ImagePayload,
        result: RecognitionResult,
    },
}

impl Default for WorkflowState {
    fn default() -> Self {
        WorkflowState::Idle { error: None }
    }
}

impl WorkflowState {
    pub fn phase(&self) -> WorkflowPhase {
        match self {
            WorkflowState::Idle { .. } => WorkflowPhase::Idle,
            WorkflowState::Capturing { .. } => WorkflowPhase::Capturing,
            WorkflowState::Processing { .. } => WorkflowPhase::Processing,
            WorkflowState::Result { .. } => WorkflowPhase::Result,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            WorkflowState::Idle { error } => error.as_deref(),
            WorkflowState::Capturing {
                camera: CameraHandle::Unavailable(message),
            } => Some(message),
            _ => None,
        }
    }

    /// The image of the current cycle, while Processing or showing a Result.
    pub fn payload(&self) -> Option<&ImagePayload> {
        match self {
            WorkflowState::Processing { payload, .. } | WorkflowState::Result { payload, .. } => {
                Some(payload)
            }
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&RecognitionResult> {
        match self {
            WorkflowState::Result { result, .. } => Some(result),
            _ => None,
        }
    }
}
