//! Config defaults: applies default values to parsed config.

use crate::schema::LensTextConfig;

/// Vision model used for recognition.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Gemini REST API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Low temperature for near-deterministic transcription.
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

pub const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";

#[cfg(target_os = "macos")]
pub const DEFAULT_CAMERA_INPUT_FORMAT: &str = "avfoundation";
#[cfg(target_os = "windows")]
pub const DEFAULT_CAMERA_INPUT_FORMAT: &str = "dshow";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub const DEFAULT_CAMERA_INPUT_FORMAT: &str = "v4l2";

/// How long to wait for the first camera frame before giving up.
pub const DEFAULT_STARTUP_TIMEOUT_MS: u64 = 5_000;

/// Captured frames are encoded as JPEG at 0.85 quality.
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

pub const DEFAULT_COPIED_INDICATOR_MS: u64 = 2_000;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Fill every unset field with its default so the config can be shown or
/// written out in full.
pub fn apply_all_defaults(config: LensTextConfig) -> LensTextConfig {
    let config = apply_recognition_defaults(config);
    let config = apply_camera_defaults(config);
    let config = apply_presenter_defaults(config);
    apply_logging_defaults(config)
}

fn apply_recognition_defaults(mut config: LensTextConfig) -> LensTextConfig {
    let recognition = &mut config.recognition;
    recognition
        .model
        .get_or_insert_with(|| DEFAULT_MODEL.to_string());
    recognition
        .base_url
        .get_or_insert_with(|| DEFAULT_BASE_URL.to_string());
    recognition.temperature.get_or_insert(DEFAULT_TEMPERATURE);
    config
}

fn apply_camera_defaults(mut config: LensTextConfig) -> LensTextConfig {
    let camera = &mut config.camera;
    camera
        .ffmpeg_path
        .get_or_insert_with(|| DEFAULT_FFMPEG_PATH.to_string());
    camera
        .input_format
        .get_or_insert_with(|| DEFAULT_CAMERA_INPUT_FORMAT.to_string());
    camera
        .startup_timeout_ms
        .get_or_insert(DEFAULT_STARTUP_TIMEOUT_MS);
    camera.jpeg_quality.get_or_insert(DEFAULT_JPEG_QUALITY);
    config
}

fn apply_presenter_defaults(mut config: LensTextConfig) -> LensTextConfig {
    config
        .presenter
        .copied_indicator_ms
        .get_or_insert(DEFAULT_COPIED_INDICATOR_MS);
    config
}

fn apply_logging_defaults(mut config: LensTextConfig) -> LensTextConfig {
    config
        .logging
        .level
        .get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    config.logging.json.get_or_insert(false);
    config
}
