pub mod error;
pub mod payload;
pub mod traits;
pub mod types;

pub use error::LensError;
pub use payload::{
    is_supported_mime, mime_from_data_url, strip_data_url_prefix, ImagePayload,
    SUPPORTED_MIME_TYPES,
};
pub use traits::{
    RecognitionFailure, RecognitionFailureKind, RecognitionResult, Recognizer,
    EMPTY_RESPONSE_FALLBACK, NO_TEXT_SENTINEL, RECOGNITION_FAILED_MESSAGE,
};
pub use types::{CycleId, WorkflowPhase};
