use std::mem;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use lenstext_core::{CycleId, ImagePayload, LensError, Recognizer, WorkflowPhase};
use lenstext_logging::{log_cycle_event, CycleEvent};
use lenstext_media::{load_from_file, CameraRequest, CameraSource, CAMERA_UNAVAILABLE_MESSAGE};

use crate::job::{RecognitionJob, RecognitionOutcome};
use crate::state::{CameraHandle, WorkflowState};

/// Shown in Idle after a failed recognition call.
pub const RECOGNITION_ERROR_MESSAGE: &str = "Failed to extract text. Please try again.";

/// Drives one recognition cycle at a time through
/// Idle → (Capturing) → Processing → Result → Idle.
///
/// Commands that don't fit the current state return
/// [`LensError::InvalidTransition`] and leave the state as it was.
pub struct WorkflowController {
    state: WorkflowState,
    camera: Arc<dyn CameraSource>,
    recognizer: Arc<dyn Recognizer>,
    camera_request: CameraRequest,
    /// Cycle of the capture session or recognition job in progress.
    cycle: Option<CycleId>,
    /// Recognition job handed out and not yet completed, including one whose
    /// cycle was abandoned by a reset.
    in_flight: Option<CycleId>,
}

impl WorkflowController {
    pub fn new(camera: Arc<dyn CameraSource>, recognizer: Arc<dyn Recognizer>) -> Self {
        Self {
            state: WorkflowState::default(),
            camera,
            recognizer,
            camera_request: CameraRequest::default(),
            cycle: None,
            in_flight: None,
        }
    }

    pub fn with_camera_request(mut self, request: CameraRequest) -> Self {
        self.camera_request = request;
        self
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.state.phase()
    }

    /// Whether a recognition call is outstanding.
    pub fn in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn recognizer_name(&self) -> &str {
        self.recognizer.name()
    }

    /// Idle → Capturing. Opens the camera.
    ///
    /// A camera that can't be opened still enters Capturing, holding the
    /// message, and returns `CameraUnavailable`; `cancel` leads back to Idle.
    pub async fn start_capture(&mut self) -> Result<(), LensError> {
        self.require_acquirable("start capture")?;
        let cycle = CycleId::new();
        self.cycle = Some(cycle);

        match self.camera.open(&self.camera_request).await {
            Ok(session) => {
                log_cycle_event(
                    &cycle.to_string(),
                    CycleEvent::CaptureStarted {
                        device: session.device().path.clone(),
                    },
                );
                self.state = WorkflowState::Capturing {
                    camera: CameraHandle::Live(session),
                };
                Ok(())
            }
            Err(e) => {
                let message = match &e {
                    LensError::CameraUnavailable(message) => message.clone(),
                    _ => CAMERA_UNAVAILABLE_MESSAGE.to_string(),
                };
                log_cycle_event(
                    &cycle.to_string(),
                    CycleEvent::CameraUnavailable {
                        detail: e.to_string(),
                    },
                );
                self.state = WorkflowState::Capturing {
                    camera: CameraHandle::Unavailable(message.clone()),
                };
                Err(LensError::CameraUnavailable(message))
            }
        }
    }

    /// Capturing → Idle, releasing the camera.
    pub fn cancel(&mut self) -> Result<(), LensError> {
        if self.phase() != WorkflowPhase::Capturing {
            return Err(self.invalid("cancel"));
        }
        self.leave_capturing();
        if let Some(cycle) = self.cycle.take() {
            log_cycle_event(&cycle.to_string(), CycleEvent::CaptureCancelled);
        }
        self.state = WorkflowState::Idle { error: None };
        Ok(())
    }

    /// Capturing → Processing. Takes a still from the live feed, releases the
    /// camera, and returns the recognition job for the frame.
    ///
    /// If the feed has died the camera is released and the workflow stays in
    /// Capturing with the unavailable message.
    pub async fn capture_frame(&mut self) -> Result<RecognitionJob, LensError> {
        let phase = self.phase();
        let captured = match &mut self.state {
            WorkflowState::Capturing {
                camera: CameraHandle::Live(session),
            } => session.capture_frame().await,
            WorkflowState::Capturing {
                camera: CameraHandle::Unavailable(message),
            } => return Err(LensError::CameraUnavailable(message.clone())),
            _ => {
                return Err(LensError::InvalidTransition {
                    phase,
                    action: "capture a frame",
                });
            }
        };
        self.leave_capturing();

        let cycle = self.cycle.unwrap_or_default();
        match captured {
            Ok(payload) => Ok(self.enter_processing(cycle, payload, "camera")),
            Err(e) => {
                log_cycle_event(
                    &cycle.to_string(),
                    CycleEvent::CameraUnavailable {
                        detail: e.to_string(),
                    },
                );
                self.state = WorkflowState::Capturing {
                    camera: CameraHandle::Unavailable(CAMERA_UNAVAILABLE_MESSAGE.to_string()),
                };
                Err(LensError::CameraUnavailable(
                    CAMERA_UNAVAILABLE_MESSAGE.to_string(),
                ))
            }
        }
    }

    /// Idle → Processing with an already-loaded image.
    pub fn select_file(&mut self, payload: ImagePayload) -> Result<RecognitionJob, LensError> {
        self.require_acquirable("select a file")?;
        Ok(self.enter_processing(CycleId::new(), payload, "file"))
    }

    /// Load an image file, then [`select_file`](Self::select_file).
    ///
    /// A file that can't be used leaves the workflow in Idle with the reason
    /// as its error.
    pub async fn select_path(&mut self, path: &Path) -> Result<RecognitionJob, LensError> {
        self.require_acquirable("select a file")?;
        match load_from_file(path).await {
            Ok(payload) => self.select_file(payload),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Image file rejected");
                self.state = WorkflowState::Idle {
                    error: Some(e.to_string()),
                };
                Err(e)
            }
        }
    }

    /// Processing → Result or Idle, from the outcome of a job this controller
    /// handed out. Returns false when the outcome belongs to an abandoned
    /// cycle and was dropped.
    pub fn complete(&mut self, outcome: RecognitionOutcome) -> bool {
        let RecognitionOutcome { cycle, result } = outcome;
        if self.in_flight == Some(cycle) {
            self.in_flight = None;
        }

        let current = matches!(
            &self.state,
            WorkflowState::Processing { cycle: active, .. } if *active == cycle
        );
        if !current {
            log_cycle_event(&cycle.to_string(), CycleEvent::StaleOutcomeDiscarded);
            return false;
        }

        let WorkflowState::Processing { payload, .. } = mem::take(&mut self.state) else {
            return false;
        };
        self.cycle = None;
        match result {
            Ok(result) => {
                log_cycle_event(
                    &cycle.to_string(),
                    CycleEvent::RecognitionSucceeded {
                        chars: result.text.chars().count(),
                        no_text: result.is_no_text(),
                    },
                );
                self.state = WorkflowState::Result { payload, result };
            }
            Err(failure) => {
                log_cycle_event(
                    &cycle.to_string(),
                    CycleEvent::RecognitionFailed {
                        detail: failure.message,
                    },
                );
                // The payload is dropped here; nothing of the cycle survives.
                self.state = WorkflowState::Idle {
                    error: Some(RECOGNITION_ERROR_MESSAGE.to_string()),
                };
            }
        }
        true
    }

    /// Run a job to completion and apply its outcome.
    pub async fn process(&mut self, job: RecognitionJob) -> &WorkflowState {
        let outcome = job.run().await;
        self.complete(outcome);
        &self.state
    }

    /// Back to a clean Idle from any state.
    ///
    /// From Capturing this releases the camera. From Processing the cycle is
    /// abandoned: the call keeps running and its outcome is discarded, and
    /// new acquisitions wait until it has been delivered.
    pub fn reset(&mut self) {
        let from = self.phase();
        if from == WorkflowPhase::Capturing {
            self.leave_capturing();
        }
        let cycle = self.cycle.take();
        self.state = WorkflowState::Idle { error: None };

        if from != WorkflowPhase::Idle {
            let label = cycle.map(|c| c.to_string()).unwrap_or_default();
            log_cycle_event(
                &label,
                CycleEvent::Reset {
                    from: from.to_string(),
                },
            );
        }
    }

    fn require_acquirable(&self, action: &'static str) -> Result<(), LensError> {
        if self.phase() != WorkflowPhase::Idle {
            return Err(self.invalid(action));
        }
        if self.in_flight.is_some() {
            debug!(action, "Refusing acquisition while a recognition call is outstanding");
            return Err(LensError::RecognitionInFlight);
        }
        Ok(())
    }

    fn enter_processing(
        &mut self,
        cycle: CycleId,
        payload: ImagePayload,
        source: &str,
    ) -> RecognitionJob {
        log_cycle_event(
            &cycle.to_string(),
            CycleEvent::PayloadAcquired {
                source: source.to_string(),
                mime_type: payload.mime_type().to_string(),
                bytes: payload.len(),
            },
        );
        info!(%cycle, recognizer = self.recognizer.name(), "Recognizing image");
        self.cycle = Some(cycle);
        self.in_flight = Some(cycle);
        self.state = WorkflowState::Processing {
            cycle,
            payload: payload.clone(),
        };
        RecognitionJob::new(cycle, payload, Arc::clone(&self.recognizer))
    }

    /// Release the camera held by the Capturing state, if any.
    fn leave_capturing(&mut self) {
        if let WorkflowState::Capturing { camera } = &mut self.state {
            camera.release();
        }
    }

    fn invalid(&self, action: &'static str) -> LensError {
        LensError::InvalidTransition {
            phase: self.phase(),
            action,
        }
    }
}

impl Drop for WorkflowController {
    fn drop(&mut self) {
        self.leave_capturing();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use lenstext_core::{RecognitionFailure, RecognitionResult, NO_TEXT_SENTINEL};
    use lenstext_media::StillCamera;
    use lenstext_understanding::MockRecognizer;

    fn controller(camera: StillCamera, recognizer: MockRecognizer) -> WorkflowController {
        WorkflowController::new(Arc::new(camera), Arc::new(recognizer))
    }

    fn png() -> ImagePayload {
        ImagePayload::new(vec![0x89, b'P', b'N', b'G'], "image/png").unwrap()
    }

    #[tokio::test]
    async fn starts_idle_without_error() {
        let c = controller(StillCamera::new(RgbImage::new(2, 2)), MockRecognizer::new("m"));
        assert_eq!(c.phase(), WorkflowPhase::Idle);
        assert!(c.state().error().is_none());
        assert!(!c.in_flight());
    }

    #[tokio::test]
    async fn select_file_enters_processing_with_the_payload() {
        let mut c = controller(StillCamera::new(RgbImage::new(2, 2)), MockRecognizer::new("m"));
        let job = c.select_file(png()).unwrap();
        assert_eq!(c.phase(), WorkflowPhase::Processing);
        assert_eq!(c.state().payload(), Some(&png()));
        assert_eq!(job.payload(), &png());
        assert!(c.in_flight());
    }

    #[tokio::test]
    async fn second_acquisition_is_refused_while_processing() {
        let camera = StillCamera::new(RgbImage::new(2, 2));
        let mut c = controller(camera.clone(), MockRecognizer::new("m"));
        let _job = c.select_file(png()).unwrap();

        let err = c.select_file(png()).unwrap_err();
        assert!(matches!(
            err,
            LensError::InvalidTransition {
                phase: WorkflowPhase::Processing,
                ..
            }
        ));
        assert!(c.start_capture().await.is_err());
        assert_eq!(camera.open_count(), 0);
        assert_eq!(c.phase(), WorkflowPhase::Processing);
    }

    #[tokio::test]
    async fn success_enters_result_with_payload_and_text() {
        let mut c = controller(
            StillCamera::new(RgbImage::new(2, 2)),
            MockRecognizer::new("m").with_response("INVOICE #42"),
        );
        let job = c.select_file(png()).unwrap();
        c.process(job).await;
        assert_eq!(c.phase(), WorkflowPhase::Result);
        assert_eq!(c.state().result().unwrap().text, "INVOICE #42");
        assert_eq!(c.state().payload(), Some(&png()));
        assert!(!c.in_flight());
    }

    #[tokio::test]
    async fn failure_returns_to_idle_with_fixed_message() {
        let mut c = controller(
            StillCamera::new(RgbImage::new(2, 2)),
            MockRecognizer::new("m").failing(),
        );
        let job = c.select_file(png()).unwrap();
        c.process(job).await;
        assert_eq!(c.phase(), WorkflowPhase::Idle);
        assert_eq!(c.state().error(), Some(RECOGNITION_ERROR_MESSAGE));
        assert!(c.state().payload().is_none());
        assert!(c.state().result().is_none());
    }

    #[tokio::test]
    async fn illegal_commands_leave_state_untouched() {
        let mut c = controller(StillCamera::new(RgbImage::new(2, 2)), MockRecognizer::new("m"));
        assert!(matches!(
            c.cancel(),
            Err(LensError::InvalidTransition {
                phase: WorkflowPhase::Idle,
                action: "cancel"
            })
        ));
        assert!(c.capture_frame().await.is_err());
        assert_eq!(c.phase(), WorkflowPhase::Idle);
    }

    #[tokio::test]
    async fn capture_releases_camera_before_recognition() {
        let camera = StillCamera::new(RgbImage::new(4, 4));
        let mut c = controller(camera.clone(), MockRecognizer::new("m").with_response(NO_TEXT_SENTINEL));
        c.start_capture().await.unwrap();
        assert!(camera.is_active());

        let job = c.capture_frame().await.unwrap();
        assert!(!camera.is_active());
        assert_eq!(job.payload().mime_type(), "image/jpeg");

        c.process(job).await;
        assert!(c.state().result().unwrap().is_no_text());
    }

    #[tokio::test]
    async fn unavailable_camera_holds_message_until_cancel() {
        let mut c = controller(StillCamera::unavailable(), MockRecognizer::new("m"));
        let err = c.start_capture().await.unwrap_err();
        assert!(matches!(err, LensError::CameraUnavailable(_)));
        assert_eq!(c.phase(), WorkflowPhase::Capturing);
        assert_eq!(c.state().error(), Some(CAMERA_UNAVAILABLE_MESSAGE));

        assert!(matches!(
            c.capture_frame().await,
            Err(LensError::CameraUnavailable(_))
        ));
        c.cancel().unwrap();
        assert_eq!(c.phase(), WorkflowPhase::Idle);
        assert!(c.state().error().is_none());
    }

    #[tokio::test]
    async fn outcome_for_reset_cycle_is_discarded() {
        let mut c = controller(
            StillCamera::new(RgbImage::new(2, 2)),
            MockRecognizer::new("m").with_response("late"),
        );
        let job = c.select_file(png()).unwrap();
        c.reset();
        assert_eq!(c.phase(), WorkflowPhase::Idle);
        assert!(matches!(c.select_file(png()), Err(LensError::RecognitionInFlight)));

        let outcome = job.run().await;
        assert!(!c.complete(outcome));
        assert_eq!(c.phase(), WorkflowPhase::Idle);
        assert!(c.state().result().is_none());
        assert!(!c.in_flight());
        assert!(c.select_file(png()).is_ok());
    }

    #[tokio::test]
    async fn failed_outcome_for_reset_cycle_leaves_idle_clean() {
        let mut c = controller(
            StillCamera::new(RgbImage::new(2, 2)),
            MockRecognizer::new("m").failing(),
        );
        let job = c.select_file(png()).unwrap();
        c.reset();

        let outcome = job.run().await;
        assert!(outcome.result.is_err());
        assert!(!c.complete(outcome));
        assert!(matches!(c.state(), WorkflowState::Idle { error: None }));
        assert!(!c.in_flight());
        assert!(c.select_file(png()).is_ok());
        assert_eq!(c.phase(), WorkflowPhase::Processing);
    }

    #[tokio::test]
    async fn foreign_outcome_is_ignored() {
        let mut c = controller(StillCamera::new(RgbImage::new(2, 2)), MockRecognizer::new("m"));
        let _job = c.select_file(png()).unwrap();
        let stray = RecognitionOutcome {
            cycle: CycleId::new(),
            result: Ok(RecognitionResult::new("stray")),
        };
        assert!(!c.complete(stray));
        assert_eq!(c.phase(), WorkflowPhase::Processing);
        assert!(c.in_flight());

        let failed = RecognitionOutcome {
            cycle: CycleId::new(),
            result: Err(RecognitionFailure::unavailable()),
        };
        assert!(!c.complete(failed));
        assert_eq!(c.phase(), WorkflowPhase::Processing);
    }

    #[tokio::test]
    async fn dropping_controller_releases_camera() {
        let camera = StillCamera::new(RgbImage::new(2, 2));
        {
            let mut c = controller(camera.clone(), MockRecognizer::new("m"));
            c.start_capture().await.unwrap();
            assert!(camera.is_active());
        }
        assert!(!camera.is_active());
    }
}
