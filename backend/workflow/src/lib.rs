//! The recognition workflow: a four-state machine that owns the camera while
//! capturing and hands out one recognition job per cycle.

pub mod controller;
pub mod job;
pub mod state;

pub use controller::{WorkflowController, RECOGNITION_ERROR_MESSAGE};
pub use job::{RecognitionJob, RecognitionOutcome};
pub use state::{CameraHandle, WorkflowState};
