//! Clipboard access.

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, anyhow};

pub trait Clipboard: Send {
    /// Replace the clipboard contents with `text`.
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// The desktop clipboard, opened on first use.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        if self.inner.is_none() {
            self.inner = Some(arboard::Clipboard::new().context("Clipboard is not available")?);
        }
        let clipboard = self
            .inner
            .as_mut()
            .ok_or_else(|| anyhow!("Clipboard is not available"))?;
        clipboard
            .set_text(text.to_owned())
            .context("Failed to write to clipboard")
    }
}

/// Keeps the last copied text in memory. Clones share contents.
#[derive(Clone, Default)]
pub struct MemoryClipboard {
    contents: Arc<Mutex<Option<String>>>,
    broken: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard whose every write fails.
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        if self.broken {
            return Err(anyhow!("Clipboard is not available"));
        }
        let mut contents = self
            .contents
            .lock()
            .map_err(|_| anyhow!("Clipboard lock poisoned"))?;
        *contents = Some(text.to_string());
        Ok(())
    }
}
