//! Language Server Protocol (LSP) implementation for OpenFOAM dictionaries
//!
//!     This crate wires the analysis in `foam-analysis` to editors through tower-lsp. It serves
//!     the text-based case files under `system/`, `constant/` and the time directories
//!     (`controlDict`, `fvSolution`, `blockMeshDict`, `0/U`, ...).
//!
//! Feature Set
//!
//!     1. Semantic Tokens (textDocument/semanticTokens/full):
//!         - Catalog keywords as namespace, keyword, type or parameter
//!         - Comments, numbers and double-quoted strings
//!         - No range requests and no delta updates
//!
//!     2. Diagnostics (textDocument/publishDiagnostics):
//!         - Brace balance, recomputed on every open and change
//!         - Cleared when the document closes
//!
//!     3. Hover (textDocument/hover):
//!         - Markdown documentation for the identifier under the cursor
//!
//!     4. Completion (textDocument/completion):
//!         - Every documented keyword, unfiltered
//!
//! Architecture
//!
//!     LSP Layer (tower-lsp):
//!         - JSON-RPC transport, capability negotiation, request routing
//!
//!     Server Layer (this crate):
//!         - Implements the LanguageServer trait
//!         - Keeps open documents as ropes and applies incremental edits
//!         - Thin: hands text snapshots to a FeatureProvider and converts results to
//!           protocol types
//!
//!     Feature Layer (foam-analysis):
//!         - Stateless functions over text, with the dense unit tests
//!
//! Usage
//!
//!     $ foam-lsp [--config path/to/foam-lsp.toml] [--log-filter foam_lsp=debug]
//!
//!     Starts the language server on stdin/stdout. Logs go to stderr.

pub mod document;
pub mod server;

pub use server::{FoamLanguageServer, ServerSettings};
