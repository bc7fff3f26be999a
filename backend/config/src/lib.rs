//! `lenstext-config`: LensText configuration management.
//!
//! Provides:
//! - Typed config schema (recognition, camera, presenter, logging)
//! - YAML read/write with an atomic rename
//! - `${ENV_VAR}` substitution and well-known env overrides
//! - Default value application
//! - Validation and redaction for display

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{apply_env_overrides, process_env, resolve_env_vars, MissingEnvVarError};
pub use io::{config_dir, config_file_path, default_log_dir, load_config, write_config};
pub use redact::redact;
pub use schema::{
    CameraConfig, CameraDeviceConfig, LensTextConfig, LoggingConfig, PresenterConfig,
    RecognitionConfig,
};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

/// Load a config file, substitute env vars, apply env overrides and defaults.
///
/// This is the main entry point at startup. Validation problems are not
/// errors; the report is handed back for the caller to log once logging is up.
pub async fn load_and_prepare(path: &Path) -> Result<(LensTextConfig, ValidationReport)> {
    let raw = load_config(path).await?;
    prepare(raw, &process_env())
}

/// The pure half of [`load_and_prepare`], with an explicit environment.
pub fn prepare(
    mut raw: LensTextConfig,
    env: &HashMap<String, String>,
) -> Result<(LensTextConfig, ValidationReport)> {
    // An unresolved key reference means "no key"; it fails at call time.
    let (api_key, unresolved_key) = match raw.recognition.api_key.take() {
        Some(key) => match resolve_env_vars(&Value::String(key), env) {
            Ok(Value::String(resolved)) => (Some(resolved), None),
            Ok(_) => (None, None),
            Err(e) => (None, Some(e.to_string())),
        },
        None => (None, None),
    };

    let value: Value =
        serde_json::to_value(&raw).context("Failed to serialize config for processing")?;
    let value = resolve_env_vars(&value, env).context("Failed to resolve env vars in config")?;
    let mut config: LensTextConfig = serde_json::from_value(value)
        .context("Failed to deserialize config after processing")?;
    config.recognition.api_key = api_key;

    let config = apply_env_overrides(config, env);
    let config = apply_all_defaults(config);

    let mut report = validate(&config);
    if let Some(reason) = unresolved_key {
        report.warn("recognition.apiKey", reason);
    }
    Ok((config, report))
}
