//! Scoped clipboard access.
//!
//! The engine only touches the clipboard through [`ClipboardMediator`],
//! which adds one semantic on top of raw read/write: restoring a snapshot
//! of `None` means clearing the clipboard, not leaving the current content
//! in place.
//!
//! [`SystemClipboard`] is the production implementation on top of arboard.
//! The OS clipboard can be transiently locked by another process, so every
//! operation is retried a small, bounded number of times.

use std::sync::Mutex;
use std::time::Duration;

use glossa_core::error::{GlossaError, Result};

/// Number of attempts per clipboard operation.
const RETRY_ATTEMPTS: usize = 3;
/// Delay between attempts.
const RETRY_DELAY_MS: u64 = 50;

/// Scoped read/write/clear access to the OS clipboard's text content.
pub trait ClipboardMediator: Send + Sync {
    /// Current text content, `None` when the clipboard holds no text.
    fn read_text(&self) -> Result<Option<String>>;

    /// Replace the clipboard content with `text`.
    fn write_text(&self, text: &str) -> Result<()>;

    /// Remove all clipboard content.
    fn clear(&self) -> Result<()>;

    /// Write a snapshot taken with [`read_text`](Self::read_text) back.
    ///
    /// A `None` snapshot means the clipboard was empty before the sequence
    /// began, so restoring it clears the clipboard.
    fn restore(&self, snapshot: Option<&str>) -> Result<()> {
        match snapshot {
            Some(text) => self.write_text(text),
            None => self.clear(),
        }
    }
}

/// The real OS clipboard.
///
/// arboard's `Clipboard` is not `Sync`, so a fresh handle is opened per
/// operation; each operation is short-lived and the engine serializes all
/// clipboard access anyway.
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }

    fn with_retry<T>(
        &self,
        mut op: impl FnMut(&mut arboard::Clipboard) -> std::result::Result<T, arboard::Error>,
    ) -> std::result::Result<T, arboard::Error> {
        let mut result = arboard::Clipboard::new().and_then(|mut c| op(&mut c));
        for attempt in 1..RETRY_ATTEMPTS {
            match &result {
                Ok(_) => break,
                // Empty clipboard, not a transient failure.
                Err(arboard::Error::ContentNotAvailable) => break,
                Err(e) => {
                    tracing::debug!(attempt, error = %e, "Clipboard busy; retrying");
                    std::thread::sleep(Duration::from_millis(RETRY_DELAY_MS));
                    result = arboard::Clipboard::new().and_then(|mut c| op(&mut c));
                }
            }
        }
        result
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardMediator for SystemClipboard {
    fn read_text(&self) -> Result<Option<String>> {
        match self.with_retry(|c| c.get_text()) {
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(GlossaError::Clipboard(e.to_string())),
        }
    }

    fn write_text(&self, text: &str) -> Result<()> {
        self.with_retry(|c| c.set_text(text.to_string()))
            .map_err(|e| GlossaError::Clipboard(e.to_string()))
    }

    fn clear(&self) -> Result<()> {
        self.with_retry(|c| c.clear())
            .map_err(|e| GlossaError::Clipboard(e.to_string()))
    }
}

/// In-memory clipboard for tests and headless runs.
///
/// Records every value the clipboard has held, so tests can assert what
/// was (and was never) visible on it.
#[derive(Default)]
pub struct MemoryClipboard {
    content: Mutex<Option<String>>,
    history: Mutex<Vec<Option<String>>>,
}

impl MemoryClipboard {
    pub fn new(initial: Option<&str>) -> Self {
        Self {
            content: Mutex::new(initial.map(str::to_string)),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Current content without going through the mediator trait.
    pub fn content(&self) -> Option<String> {
        self.content.lock().expect("clipboard mutex poisoned").clone()
    }

    /// Every value written (or cleared, as `None`) since creation.
    pub fn writes(&self) -> Vec<Option<String>> {
        self.history.lock().expect("clipboard mutex poisoned").clone()
    }

    fn record(&self, value: Option<String>) {
        let mut content = self.content.lock().expect("clipboard mutex poisoned");
        self.history
            .lock()
            .expect("clipboard mutex poisoned")
            .push(value.clone());
        *content = value;
    }
}

impl ClipboardMediator for MemoryClipboard {
    fn read_text(&self) -> Result<Option<String>> {
        Ok(self.content())
    }

    fn write_text(&self, text: &str) -> Result<()> {
        self.record(Some(text.to_string()));
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.record(None);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard_read_write() {
        let clipboard = MemoryClipboard::new(Some("initial"));
        assert_eq!(clipboard.read_text().unwrap().as_deref(), Some("initial"));

        clipboard.write_text("updated").unwrap();
        assert_eq!(clipboard.read_text().unwrap().as_deref(), Some("updated"));
    }

    #[test]
    fn test_memory_clipboard_clear() {
        let clipboard = MemoryClipboard::new(Some("text"));
        clipboard.clear().unwrap();
        assert_eq!(clipboard.read_text().unwrap(), None);
    }

    #[test]
    fn test_restore_some_writes_text() {
        let clipboard = MemoryClipboard::new(None);
        clipboard.restore(Some("saved")).unwrap();
        assert_eq!(clipboard.content().as_deref(), Some("saved"));
    }

    #[test]
    fn test_restore_none_clears() {
        let clipboard = MemoryClipboard::new(Some("leftover"));
        clipboard.restore(None).unwrap();
        assert_eq!(clipboard.content(), None);
    }

    #[test]
    fn test_history_records_all_writes() {
        let clipboard = MemoryClipboard::new(Some("start"));
        clipboard.write_text("one").unwrap();
        clipboard.clear().unwrap();
        clipboard.write_text("two").unwrap();

        assert_eq!(
            clipboard.writes(),
            vec![
                Some("one".to_string()),
                None,
                Some("two".to_string()),
            ]
        );
    }
}
