//! Config validation with field paths and user-facing messages.

use thiserror::Error;

use crate::schema::LensTextConfig;

#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// Errors and warnings found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    pub(crate) fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

pub fn validate(config: &LensTextConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_recognition(config, &mut report);
    validate_camera(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_recognition(config: &LensTextConfig, report: &mut ValidationReport) {
    let recognition = &config.recognition;
    if recognition.api_key().is_none() {
        // Not an error: a missing key only shows up as a failed recognition.
        report.warn(
            "recognition.apiKey",
            "No API key configured; set GEMINI_API_KEY or recognition.apiKey",
        );
    }
    if recognition.model().trim().is_empty() {
        report.error("recognition.model", "Model cannot be empty");
    }
    let base_url = recognition.base_url();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        report.error(
            "recognition.baseUrl",
            format!("'{base_url}' is not an http(s) URL"),
        );
    }
    let temperature = recognition.temperature();
    if !(0.0..=2.0).contains(&temperature) {
        report.error(
            "recognition.temperature",
            format!("temperature must be between 0 and 2, got {temperature}"),
        );
    }
}

fn validate_camera(config: &LensTextConfig, report: &mut ValidationReport) {
    let camera = &config.camera;
    let quality = camera.jpeg_quality();
    if quality == 0 || quality > 100 {
        report.error(
            "camera.jpegQuality",
            format!("jpegQuality must be 1-100, got {quality}"),
        );
    }
    if camera.startup_timeout_ms() == 0 {
        report.error("camera.startupTimeoutMs", "startupTimeoutMs must be > 0");
    }
    for (i, device) in camera.devices.iter().enumerate() {
        if device.path.trim().is_empty() {
            report.error(format!("camera.devices[{i}].path"), "Device path cannot be empty");
        }
        if let Some(facing) = &device.facing {
            if !matches!(facing.as_str(), "environment" | "user") {
                report.error(
                    format!("camera.devices[{i}].facing"),
                    format!("Unknown facing '{facing}'. Use 'environment' or 'user'"),
                );
            }
        }
    }
}

fn validate_logging(config: &LensTextConfig, report: &mut ValidationReport) {
    let level = config.logging.level();
    let known = ["trace", "debug", "info", "warn", "error", "off"];
    // Anything else is passed through as an env-filter directive.
    if !known.contains(&level) && !level.contains('=') {
        report.warn(
            "logging.level",
            format!("'{level}' is not a plain level; it will be used as a filter directive"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CameraDeviceConfig;

    #[test]
    fn default_config_only_warns_about_key() {
        let report = validate(&LensTextConfig::default());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].path, "recognition.apiKey");
    }

    #[test]
    fn bad_quality_is_error() {
        let mut cfg = LensTextConfig::default();
        cfg.camera.jpeg_quality = Some(0);
        let report = validate(&cfg);
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "camera.jpegQuality");
    }

    #[test]
    fn unknown_facing_is_error() {
        let mut cfg = LensTextConfig::default();
        cfg.camera.devices.push(CameraDeviceConfig {
            path: "/dev/video0".into(),
            label: None,
            facing: Some("sideways".into()),
        });
        let report = validate(&cfg);
        assert!(report.errors[0].path.contains("facing"));
    }

    #[test]
    fn non_http_base_url_is_error() {
        let mut cfg = LensTextConfig::default();
        cfg.recognition.base_url = Some("ftp://example.com".into());
        assert!(!validate(&cfg).is_valid());
    }
}
