use crate::catalog::Catalog;
use crate::hover::format_documentation;
use lsp_types::CompletionItemKind;

/// Detail label attached to every keyword candidate.
pub const COMPLETION_DETAIL: &str = "OpenFOAM keyword";

/// Shown for a candidate without documentation. The catalog only offers
/// documented identifiers, so this never appears with the builtin data.
pub const NO_DOCUMENTATION: &str = "No documentation available.";

/// Describes a semantic completion candidate that can be translated into protocol specific items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionCandidate {
    pub label: String,
    pub detail: Option<String>,
    pub kind: CompletionItemKind,
    /// Markdown.
    pub documentation: Option<String>,
}

impl CompletionCandidate {
    fn new(label: impl Into<String>, kind: CompletionItemKind) -> Self {
        Self {
            label: label.into(),
            detail: None,
            kind,
            documentation: None,
        }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }
}

/// Every documented identifier, in catalog order.
///
/// No prefix filtering happens here; clients narrow the list themselves.
pub fn completion_items(catalog: &Catalog) -> Vec<CompletionCandidate> {
    catalog
        .documented()
        .map(|(identifier, _)| {
            let documentation = catalog
                .documentation(identifier)
                .unwrap_or(NO_DOCUMENTATION);
            CompletionCandidate::new(identifier, CompletionItemKind::KEYWORD)
                .with_detail(COMPLETION_DETAIL)
                .with_documentation(format_documentation(identifier, documentation))
        })
        .collect()
}
