//! Brace balance validation.
//!
//! Every `{` and `}` character is counted, including those inside comments and
//! string literals. A document therefore validates cleanly only when its brace
//! characters balance as raw text.

use lsp_types::DiagnosticSeverity;

use crate::text::{split_lines, LineRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BraceDiagnosticKind {
    /// A `}` took the depth below zero on this line.
    UnmatchedClose,
    /// The document ended with `count` braces still open.
    MissingClose { count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BraceDiagnostic {
    pub range: LineRange,
    pub kind: BraceDiagnosticKind,
}

impl BraceDiagnostic {
    pub fn severity(&self) -> DiagnosticSeverity {
        DiagnosticSeverity::ERROR
    }

    pub fn message(&self) -> String {
        match self.kind {
            BraceDiagnosticKind::UnmatchedClose => {
                "Unexpected closing brace '}': no matching opening brace.".to_string()
            }
            BraceDiagnosticKind::MissingClose { count } => {
                format!("Missing {count} closing brace(s) '}}'.")
            }
        }
    }
}

/// Check brace balance over the whole document.
///
/// The depth resets to zero after an unmatched close so one stray brace is
/// reported once instead of shifting every later line.
pub fn validate_braces(text: &str) -> Vec<BraceDiagnostic> {
    let mut diagnostics = Vec::new();
    let mut depth: i64 = 0;
    let mut last = LineRange::new(0, 0, 0);

    for (index, line) in split_lines(text).enumerate() {
        let range = LineRange::whole_line(index as u32, line);
        for ch in line.chars() {
            match ch {
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => {}
            }
        }

        if depth < 0 {
            diagnostics.push(BraceDiagnostic {
                range,
                kind: BraceDiagnosticKind::UnmatchedClose,
            });
            depth = 0;
        }
        last = range;
    }

    if depth > 0 {
        diagnostics.push(BraceDiagnostic {
            range: last,
            kind: BraceDiagnosticKind::MissingClose {
                count: depth as usize,
            },
        });
    }

    diagnostics
}
