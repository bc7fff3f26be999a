use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::payload::ImagePayload;

/// What the model is told to answer when an image has no text.
pub const NO_TEXT_SENTINEL: &str = "No text detected";

/// Substituted when the model answers with an empty text field.
pub const EMPTY_RESPONSE_FALLBACK: &str = "No text returned from model.";

/// The only message a caller ever sees for a failed recognition call.
pub const RECOGNITION_FAILED_MESSAGE: &str =
    "Failed to process image. Please check your internet connection and API Key.";

/// Text recognized in one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub text: String,
}

impl RecognitionResult {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Whether the model reported that the image holds no text.
    pub fn is_no_text(&self) -> bool {
        self.text.trim() == NO_TEXT_SENTINEL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecognitionFailureKind {
    /// Network, auth, quota, or malformed response. The remote service is
    /// opaque, so these are not told apart.
    RecognitionUnavailable,
}

/// A failed recognition call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RecognitionFailure {
    pub kind: RecognitionFailureKind,
    pub message: String,
}

impl RecognitionFailure {
    pub fn unavailable() -> Self {
        Self {
            kind: RecognitionFailureKind::RecognitionUnavailable,
            message: RECOGNITION_FAILED_MESSAGE.to_string(),
        }
    }
}

/// A remote service that turns an image into text.
///
/// Implementations make exactly one attempt per call and never surface the
/// underlying error to the caller.
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Service name (e.g., "gemini").
    fn name(&self) -> &str;

    async fn recognize_text(
        &self,
        payload: &ImagePayload,
    ) -> Result<RecognitionResult, RecognitionFailure>;
}
