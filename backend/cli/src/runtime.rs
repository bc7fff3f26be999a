//! Wiring from configuration to the workflow's parts.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, error, warn};

use lenstext_config::{config_dir, config_file_path, default_log_dir, load_and_prepare, LensTextConfig, ValidationReport};
use lenstext_logging::{init_logger, ConsoleOutput, LogSettings, WorkerGuard};
use lenstext_media::{CameraDevice, CameraRequest, Facing, FfmpegCamera, FfmpegCameraOptions};
use lenstext_understanding::GeminiRecognizer;
use lenstext_workflow::WorkflowController;

/// Loaded configuration, where it came from, and what validation found.
pub struct Runtime {
    pub config: LensTextConfig,
    pub config_path: PathBuf,
    pub report: ValidationReport,
}

impl Runtime {
    pub async fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => config_file_path(&config_dir()),
        };
        let (config, report) = load_and_prepare(&config_path).await?;
        Ok(Self {
            config,
            config_path,
            report,
        })
    }

    /// Log the load-time validation report. Call once logging is up.
    pub fn log_report(&self) {
        for warning in &self.report.warnings {
            warn!(path = %warning.path, message = %warning.message, "Config warning");
        }
        for e in &self.report.errors {
            error!(path = %e.path, message = %e.message, "Config error");
        }
    }

    /// Start logging. Hold the returned guard until exit.
    pub fn init_logging(&self, console: ConsoleOutput) -> Result<Option<WorkerGuard>> {
        let console = match console {
            ConsoleOutput::Stderr if self.config.logging.json() => ConsoleOutput::Json,
            other => other,
        };
        let dir = match &self.config.logging.dir {
            Some(dir) => PathBuf::from(dir),
            None => default_log_dir(&config_dir()),
        };
        init_logger(&LogSettings {
            level: self.config.logging.level().to_string(),
            dir: Some(dir),
            console,
        })
    }

    pub fn camera(&self) -> FfmpegCamera {
        FfmpegCamera::new(camera_options(&self.config))
    }

    pub fn camera_request(&self, device: Option<String>) -> CameraRequest {
        CameraRequest {
            device: device.or_else(|| self.config.camera.device.clone()),
            ..CameraRequest::default()
        }
    }

    pub fn recognizer(&self) -> GeminiRecognizer {
        GeminiRecognizer::from_config(&self.config.recognition)
    }

    pub fn controller(&self, device: Option<String>) -> WorkflowController {
        debug!(model = %self.config.recognition.model(), "Building workflow");
        WorkflowController::new(Arc::new(self.camera()), Arc::new(self.recognizer()))
            .with_camera_request(self.camera_request(device))
    }

    pub fn copied_indicator(&self) -> Duration {
        Duration::from_millis(self.config.presenter.copied_indicator_ms())
    }
}

pub fn camera_options(config: &LensTextConfig) -> FfmpegCameraOptions {
    let camera = &config.camera;
    let devices = camera
        .devices
        .iter()
        .map(|d| {
            let label = d.label.clone().unwrap_or_else(|| d.path.clone());
            let facing = match d.facing.as_deref() {
                Some(facing) => Facing::parse(facing),
                None => Facing::from_label(&label),
            };
            CameraDevice::new(d.path.clone(), label, facing)
        })
        .collect();
    FfmpegCameraOptions {
        ffmpeg_path: camera.ffmpeg_path().to_string(),
        input_format: camera.input_format().to_string(),
        devices,
        startup_timeout: Duration::from_millis(camera.startup_timeout_ms()),
        jpeg_quality: camera.jpeg_quality(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lenstext_config::CameraDeviceConfig;

    #[test]
    fn configured_devices_carry_facing() {
        let mut config = LensTextConfig::default();
        config.camera.devices = vec![
            CameraDeviceConfig {
                path: "/dev/video0".into(),
                label: Some("Integrated Webcam".into()),
                facing: None,
            },
            CameraDeviceConfig {
                path: "/dev/video4".into(),
                label: None,
                facing: Some("environment".into()),
            },
        ];
        config.camera.jpeg_quality = Some(70);

        let options = camera_options(&config);
        assert_eq!(options.devices[0].facing, Facing::User);
        assert_eq!(options.devices[1].facing, Facing::Environment);
        assert_eq!(options.devices[1].label, "/dev/video4");
        assert_eq!(options.jpeg_quality, 70);
        assert_eq!(options.ffmpeg_path, "ffmpeg");
    }

    #[test]
    fn flag_device_beats_config_device() {
        let mut config = LensTextConfig::default();
        config.camera.device = Some("/dev/video2".into());
        let runtime = Runtime {
            config,
            config_path: PathBuf::from("config.yaml"),
            report: ValidationReport::default(),
        };
        assert_eq!(runtime.camera_request(None).device.as_deref(), Some("/dev/video2"));
        assert_eq!(
            runtime.camera_request(Some("/dev/video9".into())).device.as_deref(),
            Some("/dev/video9")
        );
        assert_eq!(runtime.camera_request(None).facing, Facing::Environment);
    }

    #[tokio::test]
    async fn load_keeps_the_validation_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "recognition:\n  apiKey: AIza-test\n  temperature: 5\n").unwrap();

        let runtime = Runtime::load(Some(&path)).await.unwrap();
        assert!(!runtime.report.is_valid());
        assert!(runtime
            .report
            .errors
            .iter()
            .any(|e| e.path == "recognition.temperature"));
        runtime.log_report();
    }
}
