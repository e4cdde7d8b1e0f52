use once_cell::sync::Lazy;
use regex::Regex;

use crate::catalog::Catalog;
use crate::text::{split_lines, utf16_len, LineColumns};

const BLOCK_COMMENT_OPEN: &str = "/*";
const BLOCK_COMMENT_CLOSE: &str = "*/";
const LINE_COMMENT: &str = "//";

static NUMBER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u:\b)[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?(?-u:\b)").unwrap()
});

static STRING_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"\\]*(\\.[^"\\]*)*)""#).unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenCategory {
    /// Dictionary headers such as `FoamFile` or `boundaryField`.
    Namespace,
    /// List keywords from blockMeshDict (`blocks`, `vertices`, ...).
    Keyword,
    /// Assignable entries (`deltaT`, `tolerance`, ...).
    Type,
    Comment,
    Number,
    String,
    /// Right-hand values such as boundary condition names.
    Parameter,
}

impl TokenCategory {
    /// Returns the semantic token type string for LSP.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenCategory::Namespace => "namespace",
            TokenCategory::Keyword => "keyword",
            TokenCategory::Type => "type",
            TokenCategory::Comment => "comment",
            TokenCategory::Number => "number",
            TokenCategory::String => "string",
            TokenCategory::Parameter => "parameter",
        }
    }

    /// Index of this category in [`SEMANTIC_TOKEN_CATEGORIES`].
    pub fn legend_index(self) -> u32 {
        SEMANTIC_TOKEN_CATEGORIES
            .iter()
            .position(|category| *category == self)
            .unwrap_or(0) as u32
    }
}

/// Legend order advertised to the client.
pub const SEMANTIC_TOKEN_CATEGORIES: &[TokenCategory] = &[
    TokenCategory::Namespace,
    TokenCategory::Keyword,
    TokenCategory::Type,
    TokenCategory::Comment,
    TokenCategory::Number,
    TokenCategory::String,
    TokenCategory::Parameter,
];

/// A classified span on a single line. Columns are UTF-16 code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSpan {
    pub line: u32,
    pub start: u32,
    pub length: u32,
    pub category: TokenCategory,
}

/// Classify `text` against the builtin catalog.
pub fn collect_semantic_tokens(text: &str) -> Vec<TokenSpan> {
    classify_document(text, Catalog::builtin())
}

/// Scan `text` line by line and return its token spans ordered by position.
///
/// Number and string spans are layered over identifier spans and may overlap
/// them; clients should let the literal win when rendering.
pub fn classify_document(text: &str, catalog: &Catalog) -> Vec<TokenSpan> {
    let mut collector = TokenCollector::new(catalog);
    for (line, line_text) in split_lines(text).enumerate() {
        collector.process_line(line as u32, line_text);
    }
    collector.finish()
}

struct TokenCollector<'c> {
    catalog: &'c Catalog,
    tokens: Vec<TokenSpan>,
    inside_block_comment: bool,
}

impl<'c> TokenCollector<'c> {
    fn new(catalog: &'c Catalog) -> Self {
        Self {
            catalog,
            tokens: Vec::new(),
            inside_block_comment: false,
        }
    }

    fn finish(mut self) -> Vec<TokenSpan> {
        // Stable, so spans sharing a start keep emission order.
        self.tokens.sort_by_key(|token| (token.line, token.start));
        self.tokens
    }

    fn push(&mut self, line: u32, start: u32, length: u32, category: TokenCategory) {
        if length > 0 {
            self.tokens.push(TokenSpan {
                line,
                start,
                length,
                category,
            });
        }
    }

    fn push_whole_line(&mut self, line: u32, text: &str) {
        self.push(line, 0, utf16_len(text), TokenCategory::Comment);
    }

    fn process_line(&mut self, line: u32, text: &str) {
        if self.inside_block_comment {
            self.push_whole_line(line, text);
            if text.contains(BLOCK_COMMENT_CLOSE) {
                self.inside_block_comment = false;
            }
            return;
        }

        let trimmed = text.trim();
        if trimmed.starts_with(BLOCK_COMMENT_OPEN) {
            // The close marker is only looked for on following lines.
            self.inside_block_comment = true;
            self.push_whole_line(line, text);
            return;
        }
        if trimmed.starts_with(LINE_COMMENT) {
            self.push_whole_line(line, text);
            return;
        }

        let columns = LineColumns::new(text);
        self.process_words(line, text, &columns);
        self.process_pattern(line, text, &columns, &NUMBER_PATTERN, TokenCategory::Number);
        self.process_pattern(line, text, &columns, &STRING_PATTERN, TokenCategory::String);
    }

    fn process_words(&mut self, line: u32, text: &str, columns: &LineColumns<'_>) {
        let mut run_start: Option<usize> = None;
        for (offset, ch) in text.char_indices() {
            match (is_word_char(ch), run_start) {
                (true, None) => run_start = Some(offset),
                (false, Some(start)) => {
                    self.classify_word(line, text, columns, start..offset);
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            self.classify_word(line, text, columns, start..text.len());
        }
    }

    fn classify_word(
        &mut self,
        line: u32,
        text: &str,
        columns: &LineColumns<'_>,
        bytes: std::ops::Range<usize>,
    ) {
        if let Some(category) = self.catalog.classify(&text[bytes.clone()]) {
            let (start, length) = columns.span(bytes);
            self.push(line, start, length, category);
        }
    }

    fn process_pattern(
        &mut self,
        line: u32,
        text: &str,
        columns: &LineColumns<'_>,
        pattern: &Regex,
        category: TokenCategory,
    ) {
        for found in pattern.find_iter(text) {
            let (start, length) = columns.span(found.range());
            self.push(line, start, length, category);
        }
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn snippets(text: &str, tokens: &[TokenSpan], category: TokenCategory) -> Vec<String> {
        let lines: Vec<&str> = split_lines(text).collect();
        tokens
            .iter()
            .filter(|token| token.category == category)
            .map(|token| {
                let line = lines[token.line as usize];
                let start = token.start as usize;
                line[start..start + token.length as usize].to_string()
            })
            .collect()
    }

    const FV_SOLUTION: &str = r#"/*--------------------------------*- C++ -*----------------------------------*\
  =========                 |
  \\      /  F ield         | OpenFOAM: The Open Source CFD Toolbox
\*---------------------------------------------------------------------------*/
FoamFile
{
    format      ascii;
    class       dictionary;
    object      fvSolution;
}
// * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * //

solvers
{
    p
    {
        solver          PCG;
        preconditioner  DIC;
        tolerance       1e-06;
        relTol          0.05;
    }
}

PISO
{
    nCorrectors     2;
    pRefValue       -1.5;
    note            "solved // twice";
}
"#;

    #[test]
    fn dictionary_keyword_on_first_line() {
        let tokens = collect_semantic_tokens("boundaryField\n{\n}");
        assert_eq!(
            tokens,
            vec![TokenSpan {
                line: 0,
                start: 0,
                length: 13,
                category: TokenCategory::Namespace,
            }]
        );
    }

    #[test]
    fn header_block_comment_is_all_comment() {
        let tokens = collect_semantic_tokens(FV_SOLUTION);
        let header: Vec<&TokenSpan> = tokens.iter().filter(|t| t.line < 4).collect();
        assert_eq!(header.len(), 4);
        assert!(header.iter().all(|t| t.category == TokenCategory::Comment));
        assert!(header.iter().all(|t| t.start == 0));
        let first_line = FV_SOLUTION.lines().next().unwrap();
        assert_eq!(header[0].length, first_line.len() as u32);
        // `FoamFile` follows the closing line and is classified normally.
        assert!(tokens
            .iter()
            .any(|t| t.line == 4 && t.category == TokenCategory::Namespace));
    }

    #[test]
    fn classifies_by_catalog_category() {
        let tokens = collect_semantic_tokens(FV_SOLUTION);
        let namespaces = snippets(FV_SOLUTION, &tokens, TokenCategory::Namespace);
        assert_eq!(namespaces, vec!["FoamFile", "solvers", "p", "PISO"]);
        let types = snippets(FV_SOLUTION, &tokens, TokenCategory::Type);
        assert_eq!(
            types,
            vec![
                "format",
                "class",
                "object",
                "solver",
                "preconditioner",
                "tolerance",
                "relTol",
                "nCorrectors",
                "pRefValue"
            ]
        );
        let parameters = snippets(FV_SOLUTION, &tokens, TokenCategory::Parameter);
        assert_eq!(
            parameters,
            vec!["ascii", "dictionary", "fvSolution", "PCG", "DIC"]
        );
    }

    #[test]
    fn line_comment_covers_the_line() {
        let tokens = collect_semantic_tokens("  // solver PCG; 12 {\nsolver PCG;");
        assert_eq!(tokens[0].category, TokenCategory::Comment);
        assert_eq!((tokens[0].line, tokens[0].start, tokens[0].length), (0, 0, 21));
        assert!(tokens[1..].iter().all(|t| t.line == 1));
    }

    #[test]
    fn numbers_include_sign_and_exponent() {
        let text = "tolerance 1e-06; relTol 0.05; pRefValue -1.5; x+2;";
        let tokens = collect_semantic_tokens(text);
        let numbers = snippets(text, &tokens, TokenCategory::Number);
        // A sign only joins the literal after a word boundary.
        assert_eq!(numbers, vec!["1e-06", "0.05", "1.5", "+2"]);
    }

    #[test]
    fn numbers_end_at_non_ascii_letters() {
        let text = "value 10µm; Θ2 x";
        let tokens = collect_semantic_tokens(text);
        let numbers: Vec<(u32, u32)> = tokens
            .iter()
            .filter(|t| t.category == TokenCategory::Number)
            .map(|t| (t.start, t.length))
            .collect();
        assert_eq!(numbers, vec![(6, 2), (13, 1)]);
    }

    #[test]
    fn numbers_layer_over_identifiers() {
        let text = "hex (0 1 2 3 4 5 6 7) (10 10 1) simpleGrading (1 1 1)";
        let tokens = collect_semantic_tokens(text);
        let numbers = snippets(text, &tokens, TokenCategory::Number);
        assert_eq!(numbers.len(), 14);
        assert_eq!(
            snippets(text, &tokens, TokenCategory::Keyword),
            vec!["hex", "simpleGrading"]
        );
    }

    #[test]
    fn strings_allow_escaped_quotes() {
        let text = r#"location "sys\"tem"; note "a" "b";"#;
        let tokens = collect_semantic_tokens(text);
        let strings = snippets(text, &tokens, TokenCategory::String);
        assert_eq!(strings, vec![r#""sys\"tem""#, r#""a""#, r#""b""#]);
    }

    #[test]
    fn line_comment_marker_inside_string_is_not_a_comment() {
        let tokens = collect_semantic_tokens(FV_SOLUTION);
        let strings = snippets(FV_SOLUTION, &tokens, TokenCategory::String);
        assert_eq!(strings, vec!["\"solved // twice\""]);
    }

    #[test]
    fn unterminated_block_comment_runs_to_end_of_document() {
        let text = "deltaT 0.1;\n/* start\nendTime 5;\n\n  {";
        let tokens = collect_semantic_tokens(text);
        let after: Vec<&TokenSpan> = tokens.iter().filter(|t| t.line >= 1).collect();
        // The empty line has no characters and yields no span.
        assert_eq!(after.len(), 3);
        assert!(after.iter().all(|t| t.category == TokenCategory::Comment));
        assert_eq!(after[2].length, 3);
    }

    #[test]
    fn block_comment_closing_line_is_comment() {
        let text = "/* a\n b */ deltaT\ndeltaT";
        let tokens = collect_semantic_tokens(text);
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].category, TokenCategory::Comment);
        assert_eq!(tokens[2].category, TokenCategory::Type);
    }

    #[test]
    fn single_line_block_comment_still_opens_state() {
        let text = "/* banner */\ndeltaT 1;\nendTime 2; */\nstopAt endTime;";
        let tokens = collect_semantic_tokens(text);
        let comment_lines: Vec<u32> = tokens
            .iter()
            .filter(|t| t.category == TokenCategory::Comment)
            .map(|t| t.line)
            .collect();
        assert_eq!(comment_lines, vec![0, 1, 2]);
    }

    #[test]
    fn words_must_match_whole_runs() {
        let text = "pFinal pRefCell p_extra U2 Ux";
        let tokens = collect_semantic_tokens(text);
        assert_eq!(
            snippets(text, &tokens, TokenCategory::Namespace),
            vec!["pFinal"]
        );
        assert_eq!(snippets(text, &tokens, TokenCategory::Type), vec!["pRefCell"]);
    }

    #[test]
    fn columns_are_utf16_units() {
        let text = "// Θ\ndimensions [0 2 -2 0 0]; // Θ\n\"𝑥\" value";
        let tokens = collect_semantic_tokens(text);
        let value = tokens
            .iter()
            .find(|t| t.line == 2 && t.category == TokenCategory::Type)
            .unwrap();
        assert_eq!(value.start, 5);
        let string = tokens
            .iter()
            .find(|t| t.category == TokenCategory::String)
            .unwrap();
        assert_eq!(string.length, 4);
        assert_eq!(tokens[0].length, 4);
    }

    #[test]
    fn crlf_lines_do_not_count_carriage_returns() {
        let tokens = collect_semantic_tokens("// note\r\ndeltaT 1;\r\n");
        assert_eq!(tokens[0].length, 7);
        assert_eq!(tokens[1].line, 1);
    }

    #[test]
    fn legend_indices_follow_category_order() {
        let indices: Vec<u32> = SEMANTIC_TOKEN_CATEGORIES
            .iter()
            .map(|category| category.legend_index())
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(TokenCategory::Parameter.as_str(), "parameter");
    }

    #[test]
    fn empty_document_has_no_tokens() {
        assert!(collect_semantic_tokens("").is_empty());
    }

    proptest! {
        #[test]
        fn spans_are_ordered_and_rescans_are_identical(text in "[a-zA-Z0-9_ {}\"/*;.+\\-\n]{0,200}") {
            let first = collect_semantic_tokens(&text);
            let second = collect_semantic_tokens(&text);
            prop_assert_eq!(&first, &second);
            for pair in first.windows(2) {
                prop_assert!((pair[0].line, pair[0].start) <= (pair[1].line, pair[1].start));
            }
            prop_assert!(first.iter().all(|t| t.length > 0));
        }

        #[test]
        fn lines_inside_open_block_comment_are_fully_comment(body in proptest::collection::vec("[a-z0-9 {};\"]{1,30}", 1..10)) {
            let text = format!("/* open\n{}", body.join("\n"));
            let tokens = collect_semantic_tokens(&text);
            for (index, line) in body.iter().enumerate() {
                let line_no = index as u32 + 1;
                let on_line: Vec<&TokenSpan> = tokens.iter().filter(|t| t.line == line_no).collect();
                prop_assert_eq!(on_line.len(), 1);
                prop_assert_eq!(on_line[0].category, TokenCategory::Comment);
                prop_assert_eq!(on_line[0].length, line.len() as u32);
            }
        }
    }
}
