//! Clipboard Writer
//!
//! The content context never writes the clipboard directly. It arms a
//! one-shot interception with the generated text and then fires the platform
//! copy action once; the armed payload is consumed on first fire and never
//! retried. Firing with nothing armed lets the natural copy pass through
//! untouched.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{Error, Result};

/// Platform clipboard surface
#[cfg_attr(test, mockall::automock)]
pub trait ClipboardSink: Send + Sync {
    /// Replace the clipboard text
    fn write_text(&self, text: &str) -> Result<()>;
}

/// System clipboard sink
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| Error::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| Error::Clipboard(e.to_string()))?;
        Ok(())
    }
}

/// One-shot interception writer over a platform sink
pub struct ClipboardWriter {
    sink: Arc<dyn ClipboardSink>,
    armed: Mutex<Option<String>>,
}

impl ClipboardWriter {
    /// Writer over the given sink
    pub fn new(sink: Arc<dyn ClipboardSink>) -> Self {
        Self {
            sink,
            armed: Mutex::new(None),
        }
    }

    /// Arm the interception with replacement text
    ///
    /// A second arm before firing replaces the pending payload.
    pub fn arm(&self, text: &str) {
        *self.armed.lock() = Some(text.to_string());
    }

    /// Fire the copy action once, consuming the armed payload
    pub fn exec_copy(&self) -> Result<()> {
        match self.armed.lock().take() {
            Some(text) => self.sink.write_text(&text),
            None => {
                debug!("copy fired with no armed payload");
                Ok(())
            }
        }
    }

    /// Arm and fire in one step
    pub fn copy(&self, text: &str) -> Result<()> {
        self.arm(text);
        self.exec_copy()
    }
}

impl std::fmt::Debug for ClipboardWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipboardWriter")
            .field("armed", &self.armed.lock().is_some())
            .finish()
    }
}
