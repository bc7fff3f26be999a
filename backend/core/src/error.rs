use thiserror::Error;

use crate::traits::RecognitionFailure;
use crate::types::WorkflowPhase;

/// Top-level error type for LensText.
#[derive(Debug, Error)]
pub enum LensError {
    #[error("{0}")]
    CameraUnavailable(String),

    #[error("{0}")]
    RecognitionUnavailable(String),

    #[error("invalid image payload: {0}")]
    InvalidPayload(String),

    #[error("cannot {action} while {phase}")]
    InvalidTransition {
        phase: WorkflowPhase,
        action: &'static str,
    },

    #[error("a recognition call is still in flight")]
    RecognitionInFlight,

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<RecognitionFailure> for LensError {
    fn from(failure: RecognitionFailure) -> Self {
        LensError::RecognitionUnavailable(failure.message)
    }
}

impl LensError {
    /// Whether the error leaves the workflow untouched (a rejected command)
    /// rather than describing a failed acquisition or recognition.
    pub fn is_rejected_command(&self) -> bool {
        matches!(
            self,
            LensError::InvalidTransition { .. } | LensError::RecognitionInFlight
        )
    }
}
