//! Keyboard Input Handler
//!
//! Maps crossterm key events to [`Action`]s for the current screen. Editing
//! the path field happens here directly.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use lenstext_core::WorkflowPhase;

use crate::app::{Action, App, InputMode};

pub fn handle_key_event(key: KeyEvent, app: &mut App) -> Option<Action> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }

    if app.input_mode == InputMode::EnteringPath {
        return match key.code {
            KeyCode::Enter => {
                let path = app.path_input.trim();
                if path.is_empty() {
                    None
                } else {
                    Some(Action::OpenFile(PathBuf::from(path)))
                }
            }
            KeyCode::Esc => {
                app.input_mode = InputMode::Normal;
                app.path_input.clear();
                None
            }
            KeyCode::Backspace => {
                app.path_input.pop();
                None
            }
            KeyCode::Char(c) => {
                app.path_input.push(c);
                None
            }
            _ => None,
        };
    }

    match (app.phase(), key.code) {
        (WorkflowPhase::Idle, KeyCode::Char('c')) => Some(Action::StartCapture),
        (WorkflowPhase::Idle, KeyCode::Char('o')) => {
            app.input_mode = InputMode::EnteringPath;
            None
        }
        (WorkflowPhase::Capturing, KeyCode::Enter | KeyCode::Char(' ')) => Some(Action::Capture),
        (WorkflowPhase::Capturing, KeyCode::Esc) => Some(Action::Cancel),
        (WorkflowPhase::Processing, KeyCode::Char('r')) => Some(Action::Reset),
        (WorkflowPhase::Result, KeyCode::Char('y')) => Some(Action::Copy),
        (WorkflowPhase::Result, KeyCode::Char('r')) => Some(Action::Reset),
        (WorkflowPhase::Result, KeyCode::Up | KeyCode::Char('k')) => Some(Action::ScrollUp),
        (WorkflowPhase::Result, KeyCode::Down | KeyCode::Char('j')) => Some(Action::ScrollDown),
        (WorkflowPhase::Idle | WorkflowPhase::Result, KeyCode::Char('q') | KeyCode::Esc) => {
            Some(Action::Quit)
        }
        (WorkflowPhase::Processing, KeyCode::Char('q')) => Some(Action::Quit),
        _ => None,
    }
}
