//! `lenstext devices`: list cameras and show which one capture would use.

use anyhow::Result;

use lenstext_media::{select_device, CameraDevice, CameraRequest, CameraSource};

use crate::terminal_output::{note_warn, render_table, Column};

pub async fn run(camera: &dyn CameraSource, request: &CameraRequest, json: bool) -> Result<()> {
    let devices = camera.devices().await?;
    let chosen = select_device(&devices, request).map(|d| d.path.clone());

    if json {
        let value = serde_json::json!({
            "devices": devices,
            "selected": chosen,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if devices.is_empty() {
        note_warn("No camera devices found");
        return Ok(());
    }
    print!("{}", render(&devices, chosen.as_deref()));
    if chosen.is_none() {
        if let Some(wanted) = &request.device {
            note_warn(&format!("Configured device {wanted} was not found"));
        }
    }
    Ok(())
}

fn render(devices: &[CameraDevice], chosen: Option<&str>) -> String {
    let columns = [
        Column::new(""),
        Column::new("Device"),
        Column::new("Label"),
        Column::new("Facing"),
    ];
    let rows: Vec<Vec<String>> = devices
        .iter()
        .map(|d| {
            let mark = if chosen == Some(d.path.as_str()) { "*" } else { "" };
            vec![
                mark.to_string(),
                d.path.clone(),
                d.label.clone(),
                d.facing.to_string(),
            ]
        })
        .collect();
    render_table(&columns, &rows)
}
