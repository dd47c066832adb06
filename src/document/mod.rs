//! The shared text document.
//!
//! Editors hold a [`DocumentRef`] and never inspect each other's content
//! directly; following another editor aliases its `DocumentRef`, so every
//! follower reads and writes the same underlying rope. The revision counter
//! lets consumers cheaply detect changes without diffing text.

use std::cell::RefCell;
use std::rc::Rc;

use ropey::Rope;

/// Shared handle to a [`Document`]. Cloning the handle aliases the document.
pub type DocumentRef = Rc<RefCell<Document>>;

/// A text buffer backed by a rope data structure.
///
/// Provides whole-text replacement plus char-indexed insertion and removal.
/// Every mutation bumps the revision, even when the resulting text is
/// identical to the previous content.
pub struct Document {
    rope: Rope,
    revision: u64,
}

impl Document {
    /// Create a document from a string.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            revision: 0,
        }
    }

    /// Create an empty document.
    pub fn new() -> Self {
        Self::from_text("")
    }

    /// Create an empty document behind a shared handle.
    pub fn shared(text: &str) -> DocumentRef {
        Rc::new(RefCell::new(Self::from_text(text)))
    }

    /// Monotonic change counter, starting at 0 for a fresh document.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the entire content.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.revision += 1;
    }

    /// Insert `text` at a char index, clamped to the document end.
    pub fn insert(&mut self, char_idx: usize, text: &str) {
        let at = char_idx.min(self.rope.len_chars());
        self.rope.insert(at, text);
        self.revision += 1;
    }

    /// Remove the chars in `start..end`, both clamped to the document end.
    pub fn remove(&mut self, start: usize, end: usize) {
        let len = self.rope.len_chars();
        let start = start.min(len);
        let end = end.clamp(start, len);
        self.rope.remove(start..end);
        self.revision += 1;
    }

    /// The full text content.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Get the content of a line (without trailing newline).
    pub fn line(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let line = self.rope.line(line_idx).to_string();
        Some(
            line.trim_end_matches('\n')
                .trim_end_matches('\r')
                .to_string(),
        )
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
