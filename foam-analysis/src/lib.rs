//! Language analysis for OpenFOAM case dictionaries.
//!
//!     This crate holds everything an editor integration needs that does not
//!     depend on a protocol runtime. Every entry point takes a text snapshot and
//!     returns fresh values; nothing is cached between calls, so rescanning
//!     unchanged text always yields identical output.
//!
//! Modules
//!
//!     catalog: identifier to category and documentation, loaded from
//!         `catalog/openfoam.yaml`.
//!     semantic_tokens: line-oriented classifier producing highlight spans.
//!     diagnostics: brace balance validation.
//!     hover / completion: catalog lookups for the cursor and for suggestions.
//!     text: line splitting and UTF-16 column arithmetic.
//!
//! Known limitations
//!
//!     The scanners work line by line. Braces inside comments and strings
//!     still count towards balance, and a `//` inside a string literal does not
//!     start a comment. Both are covered by tests so a change is visible.

pub mod catalog;
pub mod completion;
pub mod diagnostics;
pub mod hover;
pub mod semantic_tokens;
pub mod text;

pub use catalog::{Catalog, CatalogError, KeywordEntry};
pub use completion::{completion_items, CompletionCandidate};
pub use diagnostics::{validate_braces, BraceDiagnostic, BraceDiagnosticKind};
pub use hover::{hover, hover_in_document, HoverResult};
pub use semantic_tokens::{
    classify_document, collect_semantic_tokens, TokenCategory, TokenSpan,
    SEMANTIC_TOKEN_CATEGORIES,
};
pub use text::LineRange;
