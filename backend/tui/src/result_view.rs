//! The Result screen's own state: recognized text, a description of the
//! source image, and the transient "copied" indicator.

use std::io::Cursor;
use std::time::{Duration, Instant};

use lenstext_core::{ImagePayload, RecognitionResult};
use tracing::{info, warn};

use crate::clipboard::Clipboard;

/// How long the copied indicator stays on.
pub const COPIED_INDICATOR: Duration = Duration::from_millis(2000);

/// Summary of the image shown next to the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub mime_type: String,
    pub bytes: usize,
    /// Pixel size, when the image can be decoded here.
    pub dimensions: Option<(u32, u32)>,
}

impl ImageInfo {
    pub fn of(payload: &ImagePayload) -> Self {
        let dimensions = image::ImageReader::new(Cursor::new(payload.data().as_ref()))
            .with_guessed_format()
            .ok()
            .and_then(|reader| reader.into_dimensions().ok());
        Self {
            mime_type: payload.mime_type().to_string(),
            bytes: payload.len(),
            dimensions,
        }
    }

    pub fn describe(&self) -> String {
        let size = if self.bytes >= 1024 * 1024 {
            format!("{:.1} MiB", self.bytes as f64 / (1024.0 * 1024.0))
        } else if self.bytes >= 1024 {
            format!("{:.1} KiB", self.bytes as f64 / 1024.0)
        } else {
            format!("{} B", self.bytes)
        };
        match self.dimensions {
            Some((w, h)) => format!("{} · {}×{} · {}", self.mime_type, w, h, size),
            None => format!("{} · {}", self.mime_type, size),
        }
    }
}

#[derive(Debug)]
pub struct ResultView {
    result: RecognitionResult,
    image: ImageInfo,
    indicator: Duration,
    copied_at: Option<Instant>,
    copy_failed_at: Option<Instant>,
}

impl ResultView {
    pub fn new(result: RecognitionResult, payload: &ImagePayload) -> Self {
        Self {
            result,
            image: ImageInfo::of(payload),
            indicator: COPIED_INDICATOR,
            copied_at: None,
            copy_failed_at: None,
        }
    }

    pub fn with_indicator(mut self, indicator: Duration) -> Self {
        self.indicator = indicator;
        self
    }

    pub fn text(&self) -> &str {
        &self.result.text
    }

    pub fn image(&self) -> &ImageInfo {
        &self.image
    }

    /// Write the whole text to the clipboard. Returns whether it worked.
    pub fn copy(&mut self, clipboard: &mut dyn Clipboard, now: Instant) -> bool {
        match clipboard.set_text(&self.result.text) {
            Ok(()) => {
                info!(chars = self.result.text.chars().count(), "Copied text to clipboard");
                self.copied_at = Some(now);
                self.copy_failed_at = None;
                true
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Copy to clipboard failed");
                self.copied_at = None;
                self.copy_failed_at = Some(now);
                false
            }
        }
    }

    pub fn is_copied(&self, now: Instant) -> bool {
        self.within_indicator(self.copied_at, now)
    }

    pub fn copy_failed(&self, now: Instant) -> bool {
        self.within_indicator(self.copy_failed_at, now)
    }

    fn within_indicator(&self, since: Option<Instant>, now: Instant) -> bool {
        since.is_some_and(|at| now.saturating_duration_since(at) < self.indicator)
    }
}
