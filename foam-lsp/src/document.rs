//! Open document state with incremental edits.
//!
//! Only `\n` breaks lines, matching the analysis layer. Client positions are
//! UTF-16 code units. Positions past the end of a line clamp to the line end,
//! positions past the last line clamp to the end of the document.

use std::borrow::Cow;
use std::sync::Arc;

use ropey::Rope;
use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent};

#[derive(Debug, Clone)]
pub struct TextDocument {
    rope: Rope,
    version: i32,
}

/// Immutable copy of a document handed to the analysis layer.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    pub text: Arc<String>,
    pub version: i32,
}

impl TextDocument {
    pub fn new(text: &str, version: i32) -> Self {
        Self {
            rope: Rope::from_str(text),
            version,
        }
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            text: Arc::new(self.rope.to_string()),
            version: self.version,
        }
    }

    /// Apply changes in order. A change without a range replaces the text.
    pub fn apply_changes(&mut self, changes: &[TextDocumentContentChangeEvent], version: i32) {
        for change in changes {
            match change.range {
                Some(range) => {
                    let mut start = self.char_index(range.start);
                    let mut end = self.char_index(range.end);
                    if end < start {
                        std::mem::swap(&mut start, &mut end);
                    }
                    self.rope.remove(start..end);
                    self.rope.insert(start, &change.text);
                }
                None => self.rope = Rope::from_str(&change.text),
            }
        }
        self.version = version;
    }

    fn char_index(&self, position: Position) -> usize {
        let line = position.line as usize;
        if line >= self.rope.len_lines() {
            return self.rope.len_chars();
        }

        let line_start = self.rope.line_to_char(line);
        let line_text: Cow<str> = self.rope.line(line).into();
        let content = line_text.trim_end_matches(['\n', '\r']);

        let mut remaining = position.character as usize;
        let mut chars = 0;
        for ch in content.chars() {
            let width = ch.len_utf16();
            if remaining < width {
                break;
            }
            remaining -= width;
            chars += 1;
        }
        line_start + chars
    }
}
