//! TUI App State
//!
//! Owns the workflow controller and the Result screen. Recognition jobs run
//! on spawned tasks; their outcomes come back through the channel handed to
//! [`App::new`].

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use lenstext_core::{LensError, WorkflowPhase};
use lenstext_workflow::{RecognitionJob, RecognitionOutcome, WorkflowController, WorkflowState};

use crate::clipboard::Clipboard;
use crate::result_view::{COPIED_INDICATOR, ResultView};

/// Something the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    StartCapture,
    Capture,
    Cancel,
    OpenFile(PathBuf),
    Copy,
    Reset,
    ScrollUp,
    ScrollDown,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing a file path on the Idle screen.
    EnteringPath,
}

pub struct App {
    pub controller: WorkflowController,
    pub view: Option<ResultView>,
    pub input_mode: InputMode,
    pub path_input: String,
    /// Transient note for commands that were refused.
    pub notice: Option<String>,
    pub scroll: u16,
    pub should_quit: bool,
    clipboard: Box<dyn Clipboard>,
    indicator: Duration,
    outcomes: UnboundedSender<RecognitionOutcome>,
}

impl App {
    pub fn new(
        controller: WorkflowController,
        clipboard: Box<dyn Clipboard>,
        outcomes: UnboundedSender<RecognitionOutcome>,
    ) -> Self {
        Self {
            controller,
            view: None,
            input_mode: InputMode::Normal,
            path_input: String::new(),
            notice: None,
            scroll: 0,
            should_quit: false,
            clipboard,
            indicator: COPIED_INDICATOR,
            outcomes,
        }
    }

    pub fn with_indicator(mut self, indicator: Duration) -> Self {
        self.indicator = indicator;
        self
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.controller.phase()
    }

    pub async fn dispatch(&mut self, action: Action) {
        self.notice = None;
        match action {
            Action::StartCapture => {
                if let Err(e) = self.controller.start_capture().await {
                    self.note(e);
                }
            }
            Action::Capture => match self.controller.capture_frame().await {
                Ok(job) => self.spawn(job),
                Err(e) => self.note(e),
            },
            Action::Cancel => {
                if let Err(e) = self.controller.cancel() {
                    self.note(e);
                }
            }
            Action::OpenFile(path) => {
                self.input_mode = InputMode::Normal;
                self.path_input.clear();
                match self.controller.select_path(&path).await {
                    Ok(job) => self.spawn(job),
                    Err(e) => self.note(e),
                }
            }
            Action::Copy => {
                if let Some(view) = self.view.as_mut() {
                    view.copy(&mut *self.clipboard, Instant::now());
                }
            }
            Action::Reset => {
                self.controller.reset();
                self.view = None;
                self.scroll = 0;
            }
            Action::ScrollUp => self.scroll = self.scroll.saturating_sub(1),
            Action::ScrollDown => self.scroll = self.scroll.saturating_add(1),
            Action::Quit => self.should_quit = true,
        }
    }

    /// Apply a finished recognition call.
    pub fn on_outcome(&mut self, outcome: RecognitionOutcome) {
        if !self.controller.complete(outcome) {
            return;
        }
        if let WorkflowState::Result { payload, result } = self.controller.state() {
            self.view = Some(ResultView::new(result.clone(), payload).with_indicator(self.indicator));
            self.scroll = 0;
        }
    }

    fn spawn(&self, job: RecognitionJob) {
        let outcomes = self.outcomes.clone();
        tokio::spawn(async move {
            let outcome = job.run().await;
            // The UI may already be gone.
            let _ = outcomes.send(outcome);
        });
    }

    /// Errors that put the workflow somewhere already show through its state;
    /// refused commands get a transient notice.
    fn note(&mut self, error: LensError) {
        if error.is_rejected_command() {
            self.notice = Some(error.to_string());
        } else {
            debug!(error = %error, "Action failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use image::RgbImage;
    use lenstext_media::StillCamera;
    use lenstext_understanding::MockRecognizer;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn app(
        recognizer: MockRecognizer,
        clipboard: MemoryClipboard,
    ) -> (App, mpsc::UnboundedReceiver<RecognitionOutcome>) {
        let controller = WorkflowController::new(
            Arc::new(StillCamera::new(RgbImage::new(8, 8))),
            Arc::new(recognizer),
        );
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(controller, Box::new(clipboard), tx), rx)
    }

    #[tokio::test]
    async fn capture_copy_and_reset() {
        let clipboard = MemoryClipboard::new();
        let (mut app, mut rx) = app(MockRecognizer::new("m").with_response("ABC"), clipboard.clone());

        app.dispatch(Action::StartCapture).await;
        assert_eq!(app.phase(), WorkflowPhase::Capturing);
        app.dispatch(Action::Capture).await;
        assert_eq!(app.phase(), WorkflowPhase::Processing);

        let outcome = rx.recv().await.unwrap();
        app.on_outcome(outcome);
        assert_eq!(app.phase(), WorkflowPhase::Result);
        assert_eq!(app.view.as_ref().unwrap().text(), "ABC");

        app.dispatch(Action::Copy).await;
        assert_eq!(clipboard.contents().as_deref(), Some("ABC"));
        assert!(app.view.as_ref().unwrap().is_copied(Instant::now()));
        assert_eq!(app.phase(), WorkflowPhase::Result);

        app.dispatch(Action::Reset).await;
        assert_eq!(app.phase(), WorkflowPhase::Idle);
        assert!(app.view.is_none());
    }

    #[tokio::test]
    async fn refused_command_leaves_a_notice() {
        let (mut app, _rx) = app(MockRecognizer::new("m"), MemoryClipboard::new());
        app.dispatch(Action::Cancel).await;
        assert_eq!(app.phase(), WorkflowPhase::Idle);
        assert!(app.notice.as_deref().unwrap().contains("cancel"));

        app.dispatch(Action::Quit).await;
        assert!(app.notice.is_none());
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn outcome_after_reset_does_not_show_a_result() {
        let (recognizer, gate) = MockRecognizer::new("m").gated();
        let (mut app, mut rx) = app(recognizer, MemoryClipboard::new());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        RgbImage::new(4, 4).save(&path).unwrap();

        app.dispatch(Action::OpenFile(path)).await;
        assert_eq!(app.phase(), WorkflowPhase::Processing);
        app.dispatch(Action::Reset).await;

        gate.notify_one();
        app.on_outcome(rx.recv().await.unwrap());
        assert_eq!(app.phase(), WorkflowPhase::Idle);
        assert!(app.view.is_none());
    }
}
