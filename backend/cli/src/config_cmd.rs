//! `lenstext config show|path|init`.

use std::path::Path;

use anyhow::{Context, Result};

use lenstext_config::{
    apply_all_defaults, redact, validate, write_config, LensTextConfig, ValidationReport,
};

use crate::terminal_output::{note_error, note_success, note_warn};

/// Print the effective config as YAML with secrets masked.
pub fn show(config: &LensTextConfig) -> Result<()> {
    println!("{}", render_redacted(config)?);
    print_report(&validate(config));
    Ok(())
}

pub fn path(config_path: &Path) {
    println!("{}", config_path.display());
}

/// Write a config file with every default filled in.
pub async fn init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        note_warn(&format!(
            "{} already exists; pass --force to overwrite",
            config_path.display()
        ));
        return Ok(());
    }
    let config = apply_all_defaults(LensTextConfig::default());
    write_config(&config, config_path).await?;
    note_success(&format!("Wrote {}", config_path.display()));
    note_warn("Set GEMINI_API_KEY or recognition.apiKey before scanning");
    Ok(())
}

fn render_redacted(config: &LensTextConfig) -> Result<String> {
    let value = serde_json::to_value(config).context("Failed to serialize config")?;
    serde_yaml::to_string(&redact(&value)).context("Failed to render config as YAML")
}

fn print_report(report: &ValidationReport) {
    for warning in &report.warnings {
        note_warn(&format!("{}: {}", warning.path, warning.message));
    }
    for error in &report.errors {
        note_error(&format!("{}: {}", error.path, error.message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shown_config_masks_api_key() {
        let mut config = LensTextConfig::default();
        config.recognition.api_key = Some("AIzaSyExampleExampleExample".into());
        let yaml = render_redacted(&config).unwrap();
        assert!(yaml.contains("AIza***"));
        assert!(!yaml.contains("ExampleExample"));
    }

    #[tokio::test]
    async fn init_writes_defaults_and_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        init(&path, false).await.unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("gemini-2.5-flash"));

        std::fs::write(&path, "recognition:\n  model: custom\n").unwrap();
        init(&path, false).await.unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("custom"));
    }
}
