//! TUI (Terminal User Interface) for LensText.
//!
//! Exposes the ratatui screens and app state behind `lenstext ui`, plus the
//! clipboard and Result view the CLI reuses.

pub mod app;
pub mod clipboard;
pub mod input;
pub mod render;
pub mod result_view;
pub mod terminal;

pub use app::{Action, App, InputMode};
pub use clipboard::{Clipboard, MemoryClipboard, SystemClipboard};
pub use input::handle_key_event;
pub use render::draw_ui;
pub use result_view::{COPIED_INDICATOR, ImageInfo, ResultView};
pub use terminal::run;
