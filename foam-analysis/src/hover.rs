use once_cell::sync::Lazy;
use regex::Regex;

use crate::catalog::Catalog;
use crate::text::{split_lines, LineColumns, LineRange};

// ASCII boundaries: a non-ASCII letter ends a word, as in the token scanner.
static IDENTIFIER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?-u:\b)[A-Za-z_][A-Za-z0-9_]*(?-u:\b)").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverResult {
    pub range: LineRange,
    pub contents: String,
}

/// Markdown shown for a documented identifier.
pub fn format_documentation(identifier: &str, documentation: &str) -> String {
    format!("**{identifier}**\n\n{documentation}")
}

/// Resolve the identifier under `character` on `line_text`.
///
/// A cursor sitting just past the last character of a word still resolves to
/// that word. Only the first word containing the cursor is considered.
pub fn hover(
    catalog: &Catalog,
    line_text: &str,
    line: u32,
    character: u32,
) -> Option<HoverResult> {
    let columns = LineColumns::new(line_text);
    let found = IDENTIFIER_PATTERN.find_iter(line_text).find(|found| {
        let (start, length) = columns.span(found.range());
        start <= character && character <= start + length
    })?;
    let (start, length) = columns.span(found.range());
    let identifier = found.as_str();
    let documentation = catalog.documentation(identifier)?;

    Some(HoverResult {
        range: LineRange::new(line, start, start + length),
        contents: format_documentation(identifier, documentation),
    })
}

/// Hover over a whole document; positions past the last line yield nothing.
pub fn hover_in_document(
    catalog: &Catalog,
    text: &str,
    line: u32,
    character: u32,
) -> Option<HoverResult> {
    let line_text = split_lines(text).nth(line as usize)?;
    hover(catalog, line_text, line, character)
}
