//! Camera acquisition.
//!
//! A [`CameraSource`] opens a [`CaptureSession`], which owns the live frame
//! stream for as long as the workflow is capturing. The session releases the
//! device on `release()` and on drop, so every exit from capturing frees it.

mod ffmpeg;
mod ppm;
mod still;

pub use ffmpeg::{FfmpegCamera, FfmpegCameraOptions};
pub use still::StillCamera;

use std::fmt;
use std::io::Cursor;

use async_trait::async_trait;
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use lenstext_core::{ImagePayload, LensError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The message shown when no camera can be opened.
pub const CAMERA_UNAVAILABLE_MESSAGE: &str =
    "Unable to access camera. Please ensure permissions are granted.";

/// Which way a camera points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    /// Outward / rear camera.
    Environment,
    /// Front / selfie camera.
    User,
    Unknown,
}

impl Facing {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "environment" | "rear" | "back" => Facing::Environment,
            "user" | "front" => Facing::User,
            _ => Facing::Unknown,
        }
    }

    /// Guess facing from a device label.
    pub fn from_label(label: &str) -> Self {
        let label = label.to_ascii_lowercase();
        if ["back", "rear", "environment", "world"]
            .iter()
            .any(|w| label.contains(w))
        {
            Facing::Environment
        } else if ["front", "user", "facetime", "integrated", "selfie"]
            .iter()
            .any(|w| label.contains(w))
        {
            Facing::User
        } else {
            Facing::Unknown
        }
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Facing::Environment => "environment",
            Facing::User => "user",
            Facing::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraDevice {
    /// Device identifier passed to the capture backend (e.g. `/dev/video0`).
    pub path: String,
    pub label: String,
    pub facing: Facing,
}

impl CameraDevice {
    pub fn new(path: impl Into<String>, label: impl Into<String>, facing: Facing) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
            facing,
        }
    }
}

/// What the caller wants from the camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraRequest {
    pub facing: Facing,
    pub audio: bool,
    /// Use this device regardless of facing.
    pub device: Option<String>,
}

impl Default for CameraRequest {
    fn default() -> Self {
        Self {
            facing: Facing::Environment,
            audio: false,
            device: None,
        }
    }
}

/// Pick the device for a request: an explicit device first, then one facing
/// the requested way, then whatever comes first.
pub fn select_device<'a>(
    devices: &'a [CameraDevice],
    request: &CameraRequest,
) -> Option<&'a CameraDevice> {
    if let Some(wanted) = &request.device {
        return devices.iter().find(|d| &d.path == wanted);
    }
    devices
        .iter()
        .find(|d| d.facing == request.facing)
        .or_else(|| devices.first())
}

/// A live stream of frames from one opened camera.
#[async_trait]
pub trait FrameStream: Send {
    fn device(&self) -> &CameraDevice;

    /// The most recent frame. Waits for the first one if none has arrived.
    async fn latest_frame(&mut self) -> Result<RgbImage, LensError>;

    /// Stop the stream and free the device. Must be idempotent.
    fn stop(&mut self);

    fn is_active(&self) -> bool;
}

/// Opens cameras.
#[async_trait]
pub trait CameraSource: Send + Sync {
    /// Cameras this source can open.
    async fn devices(&self) -> Result<Vec<CameraDevice>, LensError>;

    /// Open a camera and start streaming. Fails with `CameraUnavailable`.
    async fn open(&self, request: &CameraRequest) -> Result<CaptureSession, LensError>;
}

/// Scoped ownership of an open camera.
pub struct CaptureSession {
    stream: Box<dyn FrameStream>,
    jpeg_quality: u8,
}

impl CaptureSession {
    pub fn new(stream: Box<dyn FrameStream>, jpeg_quality: u8) -> Self {
        Self {
            stream,
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    pub fn device(&self) -> &CameraDevice {
        self.stream.device()
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_active()
    }

    /// Take a still from the live feed, encoded as JPEG.
    ///
    /// The session stays open; the caller decides when to release it.
    pub async fn capture_frame(&mut self) -> Result<ImagePayload, LensError> {
        if !self.stream.is_active() {
            return Err(LensError::CameraUnavailable(
                CAMERA_UNAVAILABLE_MESSAGE.to_string(),
            ));
        }
        let frame = self.stream.latest_frame().await?;
        let jpeg = encode_jpeg(&frame, self.jpeg_quality)?;
        debug!(
            device = %self.stream.device().path,
            width = frame.width(),
            height = frame.height(),
            bytes = jpeg.len(),
            "Captured frame"
        );
        ImagePayload::new(jpeg, "image/jpeg")
    }

    /// Stop the stream. Safe to call more than once.
    pub fn release(&mut self) {
        if self.stream.is_active() {
            debug!(device = %self.stream.device().path, "Releasing camera");
        }
        self.stream.stop();
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureSession")
            .field("device", self.stream.device())
            .field("active", &self.stream.is_active())
            .finish()
    }
}

/// Encode an RGB frame as JPEG at `quality` (1-100).
pub fn encode_jpeg(frame: &RgbImage, quality: u8) -> Result<Vec<u8>, LensError> {
    let mut out = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(frame)
        .map_err(|e| LensError::Other(anyhow::anyhow!("JPEG encoding failed: {e}")))?;
    Ok(out.into_inner())
}
