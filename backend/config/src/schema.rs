//! LensText configuration schema, typed for serde YAML/JSON.
//!
//! Every field is optional in the file. Section accessors resolve a missing
//! field to its default, so callers never see an unset value.

use serde::{Deserialize, Serialize};

use crate::defaults::{
    DEFAULT_BASE_URL, DEFAULT_CAMERA_INPUT_FORMAT, DEFAULT_COPIED_INDICATOR_MS,
    DEFAULT_FFMPEG_PATH, DEFAULT_JPEG_QUALITY, DEFAULT_LOG_LEVEL, DEFAULT_MODEL,
    DEFAULT_STARTUP_TIMEOUT_MS, DEFAULT_TEMPERATURE,
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LensTextConfig {
    /// Remote recognition service
    #[serde(default)]
    pub recognition: RecognitionConfig,

    /// Camera acquisition
    #[serde(default)]
    pub camera: CameraConfig,

    /// Result presenter
    #[serde(default)]
    pub presenter: PresenterConfig,

    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Recognition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl RecognitionConfig {
    /// The API key, if one is set and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }
}

// ---------------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraConfig {
    /// Path to the ffmpeg binary used to read the camera.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ffmpeg_path: Option<String>,
    /// ffmpeg input format (`v4l2`, `avfoundation`, `dshow`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_format: Option<String>,
    /// Force a specific device instead of choosing one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// Known devices with their facing. Replaces discovery when non-empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub devices: Vec<CameraDeviceConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startup_timeout_ms: Option<u64>,
    /// JPEG quality for captured frames, 1-100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jpeg_quality: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraDeviceConfig {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// "environment" | "user"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facing: Option<String>,
}

impl CameraConfig {
    pub fn ffmpeg_path(&self) -> &str {
        self.ffmpeg_path.as_deref().unwrap_or(DEFAULT_FFMPEG_PATH)
    }

    pub fn input_format(&self) -> &str {
        self.input_format
            .as_deref()
            .unwrap_or(DEFAULT_CAMERA_INPUT_FORMAT)
    }

    pub fn startup_timeout_ms(&self) -> u64 {
        self.startup_timeout_ms.unwrap_or(DEFAULT_STARTUP_TIMEOUT_MS)
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality.unwrap_or(DEFAULT_JPEG_QUALITY)
    }
}

// ---------------------------------------------------------------------------
// Presenter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenterConfig {
    /// How long the "copied" indicator stays on after a copy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copied_indicator_ms: Option<u64>,
}

impl PresenterConfig {
    pub fn copied_indicator_ms(&self) -> u64 {
        self.copied_indicator_ms
            .unwrap_or(DEFAULT_COPIED_INDICATOR_MS)
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for the rolling log file. Defaults to `<config dir>/logs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    /// Emit JSON on the console instead of human-readable lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

impl LoggingConfig {
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn json(&self) -> bool {
        self.json.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_yaml() {
        let yaml = r#"
recognition:
  apiKey: abc
  model: gemini-2.0-flash
camera:
  ffmpegPath: /usr/bin/ffmpeg
  devices:
    - path: /dev/video2
      facing: environment
presenter:
  copiedIndicatorMs: 500
"#;
        let cfg: LensTextConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.recognition.api_key(), Some("abc"));
        assert_eq!(cfg.recognition.model(), "gemini-2.0-flash");
        assert_eq!(cfg.camera.ffmpeg_path(), "/usr/bin/ffmpeg");
        assert_eq!(cfg.camera.devices[0].facing.as_deref(), Some("environment"));
        assert_eq!(cfg.presenter.copied_indicator_ms(), 500);
    }

    #[test]
    fn empty_sections_resolve_to_defaults() {
        let cfg: LensTextConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg.recognition.model(), DEFAULT_MODEL);
        assert_eq!(cfg.recognition.temperature(), DEFAULT_TEMPERATURE);
        assert_eq!(cfg.camera.jpeg_quality(), DEFAULT_JPEG_QUALITY);
        assert_eq!(cfg.presenter.copied_indicator_ms(), DEFAULT_COPIED_INDICATOR_MS);
        assert!(cfg.recognition.api_key().is_none());
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let cfg = RecognitionConfig {
            api_key: Some("  ".into()),
            ..Default::default()
        };
        assert!(cfg.api_key().is_none());
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let cfg = RecognitionConfig {
            base_url: Some("http://localhost:9000/v1beta/".into()),
            ..Default::default()
        };
        assert_eq!(cfg.base_url(), "http://localhost:9000/v1beta");
    }
}
