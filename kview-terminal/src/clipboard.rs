/// System clipboard access through the terminal's OSC 52 escape
use crossterm::{clipboard::CopyToClipboard, execute};
use kview_core::{Clipboard, ViewError};
use std::io::Write;

/// Sends copied text to the terminal, which forwards it to the clipboard
pub struct Osc52Clipboard<W: Write> {
    writer: W,
}

impl<W: Write> Osc52Clipboard<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> Clipboard for Osc52Clipboard<W> {
    fn set_text(&mut self, text: &str) -> kview_core::Result<()> {
        execute!(self.writer, CopyToClipboard::to_clipboard_from(text))
            .map_err(|e| ViewError::Clipboard(e.to_string()))
    }
}
