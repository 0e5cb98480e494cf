//! Plain-text clipboard access.

use crate::error::Result;

/// Destination for copied payloads, so tests can swap the system clipboard
/// for an in-memory one.
pub trait ClipboardSink {
    /// Replaces the clipboard content with `text`.
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// System clipboard implementation using the `arboard` crate.
#[cfg(feature = "system-clipboard")]
#[derive(Default, Clone, Copy)]
pub struct SystemClipboard;

#[cfg(feature = "system-clipboard")]
impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        use crate::error::Error;

        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| Error::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text.to_owned())
            .map_err(|e| Error::Clipboard(e.to_string()))?;
        log::debug!("copied {} bytes to the system clipboard", text.len());
        Ok(())
    }
}

/// Clipboard that keeps the last copied text in memory.
#[derive(Default, Clone, Debug)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
}

impl ClipboardSink for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.contents = Some(text.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard_overwrites() {
        let mut clipboard = MemoryClipboard::default();
        clipboard.set_text("first").unwrap();
        clipboard.set_text("second").unwrap();
        assert_eq!(clipboard.contents.as_deref(), Some("second"));
    }
}
