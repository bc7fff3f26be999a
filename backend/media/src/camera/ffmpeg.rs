//! Live camera capture through an `ffmpeg` child process.
//!
//! ffmpeg reads the device and writes raw PPM frames to stdout; a reader task
//! keeps only the newest frame in a `watch` channel. Stopping the stream kills
//! the child and aborts the reader.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::RgbImage;
use lenstext_core::LensError;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::ppm::read_ppm_frame;
use super::{
    CAMERA_UNAVAILABLE_MESSAGE, CameraDevice, CameraRequest, CameraSource, CaptureSession, Facing,
    FrameStream, select_device,
};

/// Frames per second requested from the device.
const STREAM_FPS: &str = "10";

type LatestFrame = Option<Arc<RgbImage>>;

#[derive(Debug, Clone)]
pub struct FfmpegCameraOptions {
    pub ffmpeg_path: String,
    /// ffmpeg input format (`v4l2`, `avfoundation`, `dshow`).
    pub input_format: String,
    /// Known devices. Empty means discover them.
    pub devices: Vec<CameraDevice>,
    pub startup_timeout: Duration,
    pub jpeg_quality: u8,
}

impl Default for FfmpegCameraOptions {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            input_format: "v4l2".to_string(),
            devices: Vec::new(),
            startup_timeout: Duration::from_secs(5),
            jpeg_quality: 85,
        }
    }
}

pub struct FfmpegCamera {
    options: FfmpegCameraOptions,
}

impl FfmpegCamera {
    pub fn new(options: FfmpegCameraOptions) -> Self {
        Self { options }
    }

    fn unavailable(detail: impl AsRef<str>) -> LensError {
        warn!(detail = %detail.as_ref(), "Camera unavailable");
        LensError::CameraUnavailable(CAMERA_UNAVAILABLE_MESSAGE.to_string())
    }

    fn spawn(&self, device: &CameraDevice, audio: bool) -> std::io::Result<Child> {
        let mut cmd = Command::new(&self.options.ffmpeg_path);
        cmd.args(["-hide_banner", "-loglevel", "error", "-nostdin"])
            .args(["-f", &self.options.input_format])
            .args(["-i", &device.path]);
        if !audio {
            cmd.arg("-an");
        }
        cmd.args(["-r", STREAM_FPS, "-f", "image2pipe", "-vcodec", "ppm", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd.spawn()
    }
}

#[async_trait]
impl CameraSource for FfmpegCamera {
    async fn devices(&self) -> Result<Vec<CameraDevice>, LensError> {
        if !self.options.devices.is_empty() {
            return Ok(self.options.devices.clone());
        }
        discover_devices().await
    }

    async fn open(&self, request: &CameraRequest) -> Result<CaptureSession, LensError> {
        let devices = self.devices().await?;
        let device = match select_device(&devices, request) {
            Some(d) => d.clone(),
            // An explicit device that discovery missed is still worth a try.
            None => match &request.device {
                Some(path) => CameraDevice::new(path.clone(), path.clone(), Facing::Unknown),
                None => return Err(Self::unavailable("no camera devices found")),
            },
        };

        info!(device = %device.path, label = %device.label, facing = %device.facing, "Opening camera");
        let mut child = self
            .spawn(&device, request.audio)
            .map_err(|e| Self::unavailable(format!("failed to start {}: {e}", self.options.ffmpeg_path)))?;

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            return Err(Self::unavailable("camera process has no output pipes"));
        };

        let (tx, rx) = watch::channel::<LatestFrame>(None);
        let reader = tokio::spawn(pump_frames(stdout, tx));
        let stderr_task = tokio::spawn(log_stderr(stderr, device.path.clone()));

        let mut stream = FfmpegStream {
            device,
            child: Some(child),
            reader: Some(reader),
            stderr_task: Some(stderr_task),
            frames: rx,
            startup_timeout: self.options.startup_timeout,
        };

        // Surface permission and device errors at open, not at capture.
        if let Err(e) = stream.wait_first_frame().await {
            stream.stop();
            return Err(e);
        }
        Ok(CaptureSession::new(Box::new(stream), self.options.jpeg_quality))
    }
}

struct FfmpegStream {
    device: CameraDevice,
    child: Option<Child>,
    reader: Option<JoinHandle<()>>,
    stderr_task: Option<JoinHandle<()>>,
    frames: watch::Receiver<LatestFrame>,
    startup_timeout: Duration,
}

impl FfmpegStream {
    /// The reader drops the sender once ffmpeg's stdout ends, which closes
    /// the channel while the last frame stays readable.
    fn feed_alive(&self) -> bool {
        self.frames.has_changed().is_ok()
    }

    async fn wait_first_frame(&mut self) -> Result<Arc<RgbImage>, LensError> {
        let waited = tokio::time::timeout(
            self.startup_timeout,
            self.frames.wait_for(|frame| frame.is_some()),
        )
        .await;
        match waited {
            Ok(Ok(frame)) => {
                let latest: LatestFrame = (*frame).clone();
                latest.ok_or_else(|| FfmpegCamera::unavailable("frame vanished"))
            }
            Ok(Err(_)) => Err(FfmpegCamera::unavailable(format!(
                "camera stream for {} ended before the first frame",
                self.device.path
            ))),
            Err(_) => Err(FfmpegCamera::unavailable(format!(
                "no frame from {} within {:?}",
                self.device.path, self.startup_timeout
            ))),
        }
    }
}

#[async_trait]
impl FrameStream for FfmpegStream {
    fn device(&self) -> &CameraDevice {
        &self.device
    }

    async fn latest_frame(&mut self) -> Result<RgbImage, LensError> {
        if !self.feed_alive() {
            self.stop();
            return Err(FfmpegCamera::unavailable(format!(
                "camera stream for {} has ended",
                self.device.path
            )));
        }
        let frame = self.wait_first_frame().await?;
        Ok(frame.as_ref().clone())
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.start_kill() {
                debug!(error = %e, "Camera process already exited");
            }
        }
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        if let Some(task) = self.stderr_task.take() {
            task.abort();
        }
    }

    fn is_active(&self) -> bool {
        self.child.is_some() && self.feed_alive()
    }
}

impl Drop for FfmpegStream {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn pump_frames(stdout: ChildStdout, tx: watch::Sender<LatestFrame>) {
    let mut reader = BufReader::new(stdout);
    loop {
        match read_ppm_frame(&mut reader).await {
            Ok(Some(frame)) => {
                if tx.send(Some(Arc::new(frame))).is_err() {
                    break;
                }
            }
            Ok(None) => {
                debug!("Camera stream ended");
                break;
            }
            Err(e) => {
                warn!(error = %e, "Camera stream unreadable");
                break;
            }
        }
    }
}

async fn log_stderr(stderr: ChildStderr, device: String) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        warn!(device = %device, "ffmpeg: {}", line);
    }
}

/// Enumerate V4L2 capture devices with labels from sysfs.
#[cfg(target_os = "linux")]
async fn discover_devices() -> Result<Vec<CameraDevice>, LensError> {
    let mut entries = match tokio::fs::read_dir("/dev").await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "Cannot list /dev");
            return Ok(Vec::new());
        }
    };

    let mut devices = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(index) = name.strip_prefix("video") else {
            continue;
        };
        if index.parse::<u32>().is_err() {
            continue;
        }
        let label = tokio::fs::read_to_string(format!("/sys/class/video4linux/{name}/name"))
            .await
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|_| name.clone());
        let facing = Facing::from_label(&label);
        devices.push(CameraDevice::new(format!("/dev/{name}"), label, facing));
    }
    devices.sort_by(|a, b| a.path.cmp(&b.path));
    debug!(count = devices.len(), "Discovered camera devices");
    Ok(devices)
}

#[cfg(not(target_os = "linux"))]
async fn discover_devices() -> Result<Vec<CameraDevice>, LensError> {
    // avfoundation addresses the default camera by index; dshow needs a
    // configured `video=<name>` device.
    Ok(vec![CameraDevice::new("0", "Default camera", Facing::Unknown)])
}
