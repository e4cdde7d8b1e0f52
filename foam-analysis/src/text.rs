//! Line and column helpers shared by the scanners.
//!
//! Lines are numbered the way editors number them: a trailing newline opens an
//! empty last line, and `\r\n` counts as a single break. Columns are UTF-16
//! code units, the default LSP position encoding.

use std::ops::Range;

/// Split `text` into lines, dropping one trailing `\r` from each.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Length of `text` in UTF-16 code units.
pub fn utf16_len(text: &str) -> u32 {
    text.encode_utf16().count() as u32
}

/// A single-line range in UTF-16 columns, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineRange {
    pub line: u32,
    pub start: u32,
    pub end: u32,
}

impl LineRange {
    pub fn new(line: u32, start: u32, end: u32) -> Self {
        Self { line, start, end }
    }

    /// The range covering every character of `text`.
    pub fn whole_line(line: u32, text: &str) -> Self {
        Self::new(line, 0, utf16_len(text))
    }
}

/// Maps byte offsets within one line to UTF-16 columns.
#[derive(Debug, Clone, Copy)]
pub struct LineColumns<'a> {
    line: &'a str,
    ascii: bool,
}

impl<'a> LineColumns<'a> {
    pub fn new(line: &'a str) -> Self {
        Self {
            line,
            ascii: line.is_ascii(),
        }
    }

    /// Column of the character starting at `byte_offset`.
    pub fn column(&self, byte_offset: usize) -> u32 {
        if self.ascii {
            byte_offset as u32
        } else {
            utf16_len(&self.line[..byte_offset])
        }
    }

    /// Start column and width of a byte range.
    pub fn span(&self, bytes: Range<usize>) -> (u32, u32) {
        let start = self.column(bytes.start);
        let end = self.column(bytes.end);
        (start, end - start)
    }
}
