//! Main language server implementation

use std::collections::HashMap;
use std::sync::Arc;

use crate::document::{DocumentSnapshot, TextDocument};
use foam_analysis::completion::{completion_items, CompletionCandidate, COMPLETION_DETAIL};
use foam_analysis::diagnostics::{validate_braces, BraceDiagnostic};
use foam_analysis::hover::{hover_in_document, HoverResult};
use foam_analysis::semantic_tokens::{classify_document, TokenSpan, SEMANTIC_TOKEN_CATEGORIES};
use foam_analysis::{Catalog, LineRange};
use foam_config::FoamConfig;
use tokio::sync::RwLock;
use tower_lsp::async_trait;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    CompletionItem, CompletionOptions, CompletionParams, CompletionResponse, Diagnostic,
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    Documentation, Hover, HoverContents, HoverParams, HoverProviderCapability, InitializeParams,
    InitializeResult, InitializedParams, MarkupContent, MarkupKind, Position, Range,
    SemanticToken, SemanticTokenType, SemanticTokens, SemanticTokensFullOptions,
    SemanticTokensLegend, SemanticTokensOptions, SemanticTokensParams, SemanticTokensResult,
    SemanticTokensServerCapabilities, ServerCapabilities, ServerInfo, TextDocumentItem,
    TextDocumentSyncCapability, TextDocumentSyncKind, TextDocumentSyncOptions, Url,
    WorkDoneProgressOptions,
};
use tower_lsp::Client;

pub const SERVER_NAME: &str = "foam-lsp";

/// Outbound notifications the server sends to the editor.
#[async_trait]
pub trait LspClient: Send + Sync + Clone + 'static {
    async fn publish_diagnostics(
        &self,
        uri: Url,
        diagnostics: Vec<Diagnostic>,
        version: Option<i32>,
    );
}

#[async_trait]
impl LspClient for Client {
    async fn publish_diagnostics(
        &self,
        uri: Url,
        diagnostics: Vec<Diagnostic>,
        version: Option<i32>,
    ) {
        Client::publish_diagnostics(self, uri, diagnostics, version).await;
    }
}

pub trait FeatureProvider: Send + Sync + 'static {
    fn semantic_tokens(&self, text: &str) -> Vec<TokenSpan>;
    fn diagnostics(&self, text: &str) -> Vec<BraceDiagnostic>;
    fn hover(&self, text: &str, line: u32, character: u32) -> Option<HoverResult>;
    fn completions(&self) -> Vec<CompletionCandidate>;
}

pub struct DefaultFeatureProvider {
    catalog: &'static Catalog,
}

impl DefaultFeatureProvider {
    pub fn new() -> Self {
        Self::with_catalog(Catalog::builtin())
    }

    pub fn with_catalog(catalog: &'static Catalog) -> Self {
        Self { catalog }
    }
}

impl Default for DefaultFeatureProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureProvider for DefaultFeatureProvider {
    fn semantic_tokens(&self, text: &str) -> Vec<TokenSpan> {
        classify_document(text, self.catalog)
    }

    fn diagnostics(&self, text: &str) -> Vec<BraceDiagnostic> {
        validate_braces(text)
    }

    fn hover(&self, text: &str, line: u32, character: u32) -> Option<HoverResult> {
        hover_in_document(self.catalog, text, line, character)
    }

    fn completions(&self) -> Vec<CompletionCandidate> {
        completion_items(self.catalog)
    }
}

/// Knobs taken from [`FoamConfig`] that shape protocol responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub diagnostic_source: String,
    pub completion_detail: String,
    pub trigger_characters: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            diagnostic_source: "openfoam-lsp".to_string(),
            completion_detail: COMPLETION_DETAIL.to_string(),
            trigger_characters: vec![".".to_string(), "\"".to_string(), " ".to_string()],
        }
    }
}

impl From<&FoamConfig> for ServerSettings {
    fn from(config: &FoamConfig) -> Self {
        Self {
            diagnostic_source: config.diagnostics.source.clone(),
            completion_detail: config.completion.detail.clone(),
            trigger_characters: config.completion.trigger_characters.clone(),
        }
    }
}

#[derive(Default)]
struct DocumentStore {
    entries: RwLock<HashMap<Url, TextDocument>>,
}

impl DocumentStore {
    async fn open(&self, uri: Url, text: &str, version: i32) -> DocumentSnapshot {
        let document = TextDocument::new(text, version);
        let snapshot = document.snapshot();
        self.entries.write().await.insert(uri, document);
        snapshot
    }

    async fn change(
        &self,
        uri: &Url,
        params: &DidChangeTextDocumentParams,
    ) -> Option<DocumentSnapshot> {
        let mut entries = self.entries.write().await;
        let document = entries.get_mut(uri)?;
        document.apply_changes(&params.content_changes, params.text_document.version);
        Some(document.snapshot())
    }

    async fn get(&self, uri: &Url) -> Option<DocumentSnapshot> {
        self.entries.read().await.get(uri).map(TextDocument::snapshot)
    }

    async fn remove(&self, uri: &Url) {
        self.entries.write().await.remove(uri);
    }
}

fn semantic_tokens_legend() -> SemanticTokensLegend {
    SemanticTokensLegend {
        token_types: SEMANTIC_TOKEN_CATEGORIES
            .iter()
            .map(|category| SemanticTokenType::new(category.as_str()))
            .collect(),
        token_modifiers: Vec::new(),
    }
}

pub struct FoamLanguageServer<C = Client, P = DefaultFeatureProvider> {
    client: C,
    documents: DocumentStore,
    features: Arc<P>,
    settings: ServerSettings,
}

impl FoamLanguageServer<Client, DefaultFeatureProvider> {
    pub fn new(client: Client) -> Self {
        Self::with_settings(client, ServerSettings::default())
    }

    pub fn with_settings(client: Client, settings: ServerSettings) -> Self {
        Self::with_features(client, Arc::new(DefaultFeatureProvider::new()), settings)
    }
}

impl<C, P> FoamLanguageServer<C, P>
where
    C: LspClient,
    P: FeatureProvider,
{
    pub fn with_features(client: C, features: Arc<P>, settings: ServerSettings) -> Self {
        Self {
            client,
            documents: DocumentStore::default(),
            features,
            settings,
        }
    }

    /// Recompute the full diagnostic set for a snapshot and replace the
    /// editor's previous set.
    async fn publish_diagnostics(&self, uri: Url, snapshot: &DocumentSnapshot) {
        let diagnostics: Vec<Diagnostic> = self
            .features
            .diagnostics(&snapshot.text)
            .iter()
            .map(|diagnostic| to_lsp_diagnostic(diagnostic, &self.settings.diagnostic_source))
            .collect();
        tracing::trace!(%uri, count = diagnostics.len(), "publishing diagnostics");
        self.client
            .publish_diagnostics(uri, diagnostics, Some(snapshot.version))
            .await;
    }

    fn to_completion_item(&self, candidate: CompletionCandidate) -> CompletionItem {
        CompletionItem {
            label: candidate.label,
            kind: Some(candidate.kind),
            detail: Some(self.settings.completion_detail.clone()),
            documentation: candidate.documentation.map(|value| {
                Documentation::MarkupContent(MarkupContent {
                    kind: MarkupKind::Markdown,
                    value,
                })
            }),
            ..CompletionItem::default()
        }
    }
}

fn to_lsp_range(range: &LineRange) -> Range {
    Range::new(
        Position::new(range.line, range.start),
        Position::new(range.line, range.end),
    )
}

fn to_lsp_diagnostic(diagnostic: &BraceDiagnostic, source: &str) -> Diagnostic {
    Diagnostic {
        range: to_lsp_range(&diagnostic.range),
        severity: Some(diagnostic.severity()),
        source: Some(source.to_string()),
        message: diagnostic.message(),
        ..Diagnostic::default()
    }
}

/// Delta-encode spans that are already sorted by position and single-line.
fn encode_semantic_tokens(tokens: &[TokenSpan]) -> Vec<SemanticToken> {
    let mut data = Vec::with_capacity(tokens.len());
    let mut prev_line = 0u32;
    let mut prev_start = 0u32;

    for token in tokens {
        let delta_line = token.line.saturating_sub(prev_line);
        let delta_start = if delta_line == 0 {
            token.start.saturating_sub(prev_start)
        } else {
            token.start
        };
        data.push(SemanticToken {
            delta_line,
            delta_start,
            length: token.length,
            token_type: token.category.legend_index(),
            token_modifiers_bitset: 0,
        });
        prev_line = token.line;
        prev_start = token.start;
    }

    data
}

#[async_trait]
impl<C, P> tower_lsp::LanguageServer for FoamLanguageServer<C, P>
where
    C: LspClient,
    P: FeatureProvider,
{
    async fn initialize(&self, _: InitializeParams) -> Result<InitializeResult> {
        tracing::info!("initialize request received");
        let capabilities = ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Options(
                TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::INCREMENTAL),
                    ..TextDocumentSyncOptions::default()
                },
            )),
            hover_provider: Some(HoverProviderCapability::Simple(true)),
            completion_provider: Some(CompletionOptions {
                trigger_characters: Some(self.settings.trigger_characters.clone()),
                ..CompletionOptions::default()
            }),
            semantic_tokens_provider: Some(
                SemanticTokensServerCapabilities::SemanticTokensOptions(SemanticTokensOptions {
                    work_done_progress_options: WorkDoneProgressOptions::default(),
                    legend: semantic_tokens_legend(),
                    range: None,
                    full: Some(SemanticTokensFullOptions::Bool(true)),
                }),
            ),
            ..ServerCapabilities::default()
        };

        Ok(InitializeResult {
            capabilities,
            server_info: Some(ServerInfo {
                name: SERVER_NAME.to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        tracing::info!("server initialized");
    }

    async fn shutdown(&self) -> Result<()> {
        tracing::info!("shutdown requested");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let TextDocumentItem {
            uri, text, version, ..
        } = params.text_document;
        tracing::debug!(%uri, version, "document opened");
        let snapshot = self.documents.open(uri.clone(), &text, version).await;
        self.publish_diagnostics(uri, &snapshot).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri.clone();
        tracing::debug!(
            %uri,
            version = params.text_document.version,
            changes = params.content_changes.len(),
            "document changed"
        );
        match self.documents.change(&uri, &params).await {
            Some(snapshot) => self.publish_diagnostics(uri, &snapshot).await,
            None => tracing::warn!(%uri, "change for a document that is not open"),
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        tracing::debug!(%uri, "document closed");
        self.documents.remove(&uri).await;
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn semantic_tokens_full(
        &self,
        params: SemanticTokensParams,
    ) -> Result<Option<SemanticTokensResult>> {
        if let Some(snapshot) = self.documents.get(&params.text_document.uri).await {
            let tokens = self.features.semantic_tokens(&snapshot.text);
            tracing::trace!(count = tokens.len(), "semantic tokens computed");
            let data = encode_semantic_tokens(&tokens);
            Ok(Some(SemanticTokensResult::Tokens(SemanticTokens {
                result_id: None,
                data,
            })))
        } else {
            Ok(None)
        }
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let position = params.text_document_position_params.position;
        if let Some(snapshot) = self
            .documents
            .get(&params.text_document_position_params.text_document.uri)
            .await
        {
            if let Some(result) =
                self.features
                    .hover(&snapshot.text, position.line, position.character)
            {
                return Ok(Some(Hover {
                    contents: HoverContents::Markup(MarkupContent {
                        kind: MarkupKind::Markdown,
                        value: result.contents,
                    }),
                    range: Some(to_lsp_range(&result.range)),
                }));
            }
        }
        Ok(None)
    }

    async fn completion(&self, _: CompletionParams) -> Result<Option<CompletionResponse>> {
        let items: Vec<CompletionItem> = self
            .features
            .completions()
            .into_iter()
            .map(|candidate| self.to_completion_item(candidate))
            .collect();
        Ok(Some(CompletionResponse::Array(items)))
    }
}
