//! Environment variable substitution and overrides for config values.
//!
//! String values may reference `${VAR_NAME}`; only uppercase
//! `[A-Z_][A-Z0-9_]*` names are matched and `$${VAR}` escapes to a literal
//! `${VAR}`.

use std::collections::HashMap;

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

use crate::schema::LensTextConfig;

/// Optional escaping `$` followed by a `${NAME}` reference.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// API key variables, in lookup order.
pub const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

pub const MODEL_VAR: &str = "LENSTEXT_MODEL";
pub const FFMPEG_VAR: &str = "LENSTEXT_FFMPEG";
pub const CAMERA_DEVICE_VAR: &str = "LENSTEXT_CAMERA_DEVICE";

#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Snapshot of the process environment.
pub fn process_env() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// Substitute `${VAR}` references throughout a config value tree.
///
/// Fails on the first reference to a variable that is unset or empty.
pub fn resolve_env_vars(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                let child = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                out.insert(k.clone(), substitute_value(v, env, &child)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains("${") {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let out = ENV_VAR_PATTERN.replace_all(s, |caps: &Captures| {
        let name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{name}}}");
        }
        match env.get(name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(out.into_owned())
}

/// Apply well-known environment variables on top of the file config.
///
/// The API key is only taken from the environment when the file sets none.
pub fn apply_env_overrides(mut config: LensTextConfig, env: &HashMap<String, String>) -> LensTextConfig {
    let non_empty = |name: &str| env.get(name).filter(|v| !v.trim().is_empty()).cloned();

    if config.recognition.api_key().is_none() {
        if let Some(key) = API_KEY_VARS.iter().find_map(|name| non_empty(*name)) {
            config.recognition.api_key = Some(key);
        }
    }
    if let Some(model) = non_empty(MODEL_VAR) {
        config.recognition.model = Some(model);
    }
    if let Some(ffmpeg) = non_empty(FFMPEG_VAR) {
        config.camera.ffmpeg_path = Some(ffmpeg);
    }
    if let Some(device) = non_empty(CAMERA_DEVICE_VAR) {
        config.camera.device = Some(device);
    }
    config
}
