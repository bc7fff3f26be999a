//! TUI Rendering
//!
//! Translates `App` into Ratatui widgets, one body per workflow state.

use std::time::Instant;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use lenstext_workflow::{CameraHandle, WorkflowState};

use crate::app::{App, InputMode};
use crate::result_view::ImageInfo;

pub fn draw_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(3),    // Body
            Constraint::Length(3), // Key help / path input
        ])
        .split(f.size());

    draw_body(f, app, chunks[0]);
    draw_footer(f, app, chunks[1]);
}

fn draw_body(f: &mut Frame, app: &App, area: Rect) {
    let title = format!("LensText · {}", app.phase());
    let block = Block::default().title(title).borders(Borders::ALL);

    let body = match app.controller.state() {
        WorkflowState::Idle { error } => {
            let mut lines = vec![Line::from("Capture a photo or open an image file to extract its text.")];
            if let Some(error) = error {
                lines.push(Line::from(""));
                lines.push(Line::styled(error.clone(), Style::default().fg(Color::Red)));
            }
            Paragraph::new(lines)
        }
        WorkflowState::Capturing {
            camera: CameraHandle::Live(session),
        } => {
            let device = session.device();
            Paragraph::new(vec![
                Line::from(format!("Camera live: {} ({})", device.label, device.path)),
                Line::from(""),
                Line::from("Point the camera at the text, then capture."),
            ])
        }
        WorkflowState::Capturing {
            camera: CameraHandle::Unavailable(message),
        } => Paragraph::new(Line::styled(message.clone(), Style::default().fg(Color::Red))),
        WorkflowState::Processing { payload, .. } => Paragraph::new(vec![
            Line::from("Extracting text…"),
            Line::from(""),
            Line::styled(
                ImageInfo::of(payload).describe(),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        WorkflowState::Result { .. } => {
            let Some(view) = &app.view else {
                return;
            };
            let mut lines = vec![
                Line::styled(view.image().describe(), Style::default().fg(Color::DarkGray)),
                Line::from(""),
            ];
            lines.extend(view.text().lines().map(|l| Line::from(l.to_string())));
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .scroll((app.scroll, 0))
        }
    };
    f.render_widget(body.block(block), area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    if app.input_mode == InputMode::EnteringPath {
        let input = Paragraph::new(app.path_input.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().title("Image path (Enter to open, Esc to go back)").borders(Borders::ALL));
        f.render_widget(input, area);
        return;
    }

    let now = Instant::now();
    let mut spans = vec![Span::raw(key_help(app))];
    if let Some(view) = &app.view {
        if view.is_copied(now) {
            spans.push(Span::styled(
                "  Copied!",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ));
        } else if view.copy_failed(now) {
            spans.push(Span::styled("  Copy failed", Style::default().fg(Color::Red)));
        }
    }
    if let Some(notice) = &app.notice {
        spans.push(Span::styled(format!("  {notice}"), Style::default().fg(Color::Yellow)));
    }

    let footer = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}

fn key_help(app: &App) -> &'static str {
    match app.controller.state() {
        WorkflowState::Idle { .. } => "[c] capture  [o] open file  [q] quit",
        WorkflowState::Capturing {
            camera: CameraHandle::Live(_),
        } => "[Enter] capture  [Esc] cancel",
        WorkflowState::Capturing {
            camera: CameraHandle::Unavailable(_),
        } => "[Esc] go back",
        WorkflowState::Processing { .. } => "[r] start over  [q] quit",
        WorkflowState::Result { .. } => "[y] copy  [r] new scan  [↑/↓] scroll  [q] quit",
    }
}
