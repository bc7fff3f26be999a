//! `lenstext scan` and `lenstext capture`: one recognition cycle, printed.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use lenstext_core::{ImagePayload, RecognitionResult};
use lenstext_tui::{Clipboard, ImageInfo, ResultView, SystemClipboard};
use lenstext_workflow::{CameraHandle, RecognitionJob, WorkflowController, WorkflowState};

use crate::terminal_output::{note_error, note_info, note_success, note_warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
    pub copy: bool,
}

/// Machine-readable form of a finished cycle.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOutput<'a> {
    pub text: &'a str,
    pub no_text: bool,
    pub mime_type: &'a str,
    pub bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl<'a> ScanOutput<'a> {
    pub fn new(result: &'a RecognitionResult, payload: &'a ImagePayload) -> Self {
        let info = ImageInfo::of(payload);
        Self {
            text: &result.text,
            no_text: result.is_no_text(),
            mime_type: payload.mime_type(),
            bytes: payload.len(),
            width: info.dimensions.map(|(w, _)| w),
            height: info.dimensions.map(|(_, h)| h),
        }
    }
}

/// Upload path: Idle → Processing → Result.
pub async fn scan(
    mut controller: WorkflowController,
    path: &Path,
    output: OutputOptions,
) -> Result<bool> {
    let job = match controller.select_path(path).await {
        Ok(job) => job,
        Err(e) => {
            note_error(&format!("{}: {e}", path.display()));
            return Ok(false);
        }
    };
    finish(&mut controller, job, output).await
}

/// Camera path: Idle → Capturing → Processing → Result.
///
/// Without `immediate`, waits for Enter before taking the frame; `q` cancels.
pub async fn capture(
    mut controller: WorkflowController,
    immediate: bool,
    output: OutputOptions,
) -> Result<bool> {
    if let Err(e) = controller.start_capture().await {
        note_error(&e.to_string());
        controller.cancel()?;
        return Ok(false);
    }
    if let WorkflowState::Capturing {
        camera: CameraHandle::Live(session),
    } = controller.state()
    {
        note_info(&format!("Camera ready: {}", session.device().label));
    }

    if !immediate {
        note_info("Press Enter to capture, or q then Enter to cancel.");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let line = lines.next_line().await.context("Failed to read stdin")?;
        let cancelled = match line.as_deref().map(str::trim) {
            None => true,
            Some(answer) => answer.eq_ignore_ascii_case("q"),
        };
        if cancelled {
            controller.cancel()?;
            note_warn("Capture cancelled");
            return Ok(false);
        }
    }

    let job = match controller.capture_frame().await {
        Ok(job) => job,
        Err(e) => {
            note_error(&e.to_string());
            controller.cancel()?;
            return Ok(false);
        }
    };
    finish(&mut controller, job, output).await
}

async fn finish(
    controller: &mut WorkflowController,
    job: RecognitionJob,
    output: OutputOptions,
) -> Result<bool> {
    info!(cycle = %job.cycle(), "Waiting for recognition");
    let state = controller.process(job).await;
    let (payload, result) = match state {
        WorkflowState::Result { payload, result } => (payload, result),
        other => {
            if let Some(error) = other.error() {
                note_error(error);
            }
            return Ok(false);
        }
    };

    if output.json {
        let out = ScanOutput::new(result, payload);
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", result.text);
    }

    if output.copy {
        let mut view = ResultView::new(result.clone(), payload);
        let mut clipboard = SystemClipboard::new();
        if copy_with(&mut view, &mut clipboard) {
            note_success("Copied to clipboard");
        } else {
            note_warn("Could not copy to clipboard");
        }
    }

    controller.reset();
    Ok(true)
}

fn copy_with(view: &mut ResultView, clipboard: &mut dyn Clipboard) -> bool {
    view.copy(clipboard, Instant::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use lenstext_core::NO_TEXT_SENTINEL;
    use lenstext_media::StillCamera;
    use lenstext_tui::MemoryClipboard;
    use lenstext_understanding::MockRecognizer;

    fn controller(recognizer: MockRecognizer) -> WorkflowController {
        WorkflowController::new(
            Arc::new(StillCamera::unavailable()),
            Arc::new(recognizer),
        )
    }

    #[test]
    fn json_output_shape() {
        let payload = ImagePayload::new(vec![1, 2, 3], "image/webp").unwrap();
        let result = RecognitionResult::new(NO_TEXT_SENTINEL);
        let value = serde_json::to_value(ScanOutput::new(&result, &payload)).unwrap();
        assert_eq!(value["text"], NO_TEXT_SENTINEL);
        assert_eq!(value["noText"], true);
        assert_eq!(value["mimeType"], "image/webp");
        assert_eq!(value["bytes"], 3);
        assert!(value.get("width").is_none());
    }

    #[tokio::test]
    async fn scan_of_missing_file_fails_cleanly() {
        let ok = scan(
            controller(MockRecognizer::new("m")),
            Path::new("/nonexistent/lenstext/page.png"),
            OutputOptions::default(),
        )
        .await
        .unwrap();
        assert!(!ok);
    }

    #[tokio::test]
    async fn scan_succeeds_and_resets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\n0000").unwrap();

        let ok = scan(
            controller(MockRecognizer::new("m").with_response("INVOICE #42")),
            &path,
            OutputOptions::default(),
        )
        .await
        .unwrap();
        assert!(ok);
    }

    #[tokio::test]
    async fn unavailable_camera_goes_back_to_idle() {
        let ok = capture(controller(MockRecognizer::new("m")), true, OutputOptions::default())
            .await
            .unwrap();
        assert!(!ok);
    }

    #[test]
    fn copy_goes_through_the_view() {
        let payload = ImagePayload::new(vec![1, 2, 3], "image/png").unwrap();
        let mut view = ResultView::new(RecognitionResult::new("ABC"), &payload);
        let mut clipboard = MemoryClipboard::new();
        assert!(copy_with(&mut view, &mut clipboard));
        assert_eq!(clipboard.contents().as_deref(), Some("ABC"));
    }
}
