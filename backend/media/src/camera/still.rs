use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use image::RgbImage;
use lenstext_core::LensError;

use super::{
    CAMERA_UNAVAILABLE_MESSAGE, CameraDevice, CameraRequest, CameraSource, CaptureSession, Facing,
    FrameStream, select_device,
};

/// A camera that streams one fixed frame.
///
/// Stands in for real hardware in tests and demos. Clones share the same
/// counters, so a test can keep a handle and check whether the device is
/// still held.
#[derive(Clone)]
pub struct StillCamera {
    frame: Option<Arc<RgbImage>>,
    devices: Vec<CameraDevice>,
    active: Arc<AtomicBool>,
    opened: Arc<AtomicUsize>,
    jpeg_quality: u8,
}

impl StillCamera {
    pub fn new(frame: RgbImage) -> Self {
        Self {
            frame: Some(Arc::new(frame)),
            devices: vec![CameraDevice::new("still:0", "Still Camera", Facing::Environment)],
            active: Arc::new(AtomicBool::new(false)),
            opened: Arc::new(AtomicUsize::new(0)),
            jpeg_quality: 85,
        }
    }

    /// A camera whose every open fails, as when permission is denied.
    pub fn unavailable() -> Self {
        Self {
            frame: None,
            devices: Vec::new(),
            ..Self::new(RgbImage::new(1, 1))
        }
    }

    pub fn with_devices(mut self, devices: Vec<CameraDevice>) -> Self {
        self.devices = devices;
        self
    }

    /// Whether a session from this camera currently holds the device.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// How many sessions have been opened.
    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CameraSource for StillCamera {
    async fn devices(&self) -> Result<Vec<CameraDevice>, LensError> {
        Ok(self.devices.clone())
    }

    async fn open(&self, request: &CameraRequest) -> Result<CaptureSession, LensError> {
        let unavailable = || LensError::CameraUnavailable(CAMERA_UNAVAILABLE_MESSAGE.to_string());
        let frame = self.frame.clone().ok_or_else(unavailable)?;
        let device = select_device(&self.devices, request)
            .cloned()
            .ok_or_else(unavailable)?;

        self.active.store(true, Ordering::SeqCst);
        self.opened.fetch_add(1, Ordering::SeqCst);
        let stream = StillStream {
            device,
            frame,
            active: Arc::clone(&self.active),
        };
        Ok(CaptureSession::new(Box::new(stream), self.jpeg_quality))
    }
}

struct StillStream {
    device: CameraDevice,
    frame: Arc<RgbImage>,
    active: Arc<AtomicBool>,
}

#[async_trait]
impl FrameStream for StillStream {
    fn device(&self) -> &CameraDevice {
        &self.device
    }

    async fn latest_frame(&mut self) -> Result<RgbImage, LensError> {
        Ok(self.frame.as_ref().clone())
    }

    fn stop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[tokio::test]
    async fn capture_yields_jpeg_and_release_frees_device() {
        let camera = StillCamera::new(RgbImage::from_pixel(4, 4, Rgb([255, 255, 255])));
        let mut session = camera.open(&CameraRequest::default()).await.unwrap();
        assert!(camera.is_active());

        let payload = session.capture_frame().await.unwrap();
        assert_eq!(payload.mime_type(), "image/jpeg");

        session.release();
        assert!(!camera.is_active());
        assert!(session.capture_frame().await.is_err());
    }

    #[tokio::test]
    async fn drop_releases_device() {
        let camera = StillCamera::new(RgbImage::new(2, 2));
        {
            let _session = camera.open(&CameraRequest::default()).await.unwrap();
            assert!(camera.is_active());
        }
        assert!(!camera.is_active());
        assert_eq!(camera.open_count(), 1);
    }

    #[tokio::test]
    async fn unavailable_camera_fails_to_open() {
        let camera = StillCamera::unavailable();
        let err = camera.open(&CameraRequest::default()).await.unwrap_err();
        assert!(matches!(err, LensError::CameraUnavailable(m) if m == CAMERA_UNAVAILABLE_MESSAGE));
        assert!(!camera.is_active());
    }
}
