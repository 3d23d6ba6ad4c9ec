//! LSP server implementation

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use sdf_cst::{Parse, parse};
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};
use tracing::{debug, info, warn};

use crate::completion::{Candidate, CandidateKind, get_completions};
use crate::config::{ConfigOverrides, SdfUserConfig, load_config};
use crate::semantic_tokens::{compute_semantic_tokens, semantic_token_legend};
use crate::symbols::document_symbols;
use crate::type_index::TypeIndex;
use crate::typing::on_type;
use crate::workspace::scan_workspace;

/// Characters that open a completion popup.
const TRIGGER_CHARACTERS: &[&str] = &["@", "$", "<", "(", ":", "[", "=", " "];

/// Document state tracked by the server
struct DocumentState {
    /// Document content
    content: String,
    /// Parsed CST
    parse: Parse,
    /// Document version
    #[allow(dead_code)]
    version: i32,
}

/// The SDF language server
pub struct SdfLanguageServer {
    /// LSP client for sending notifications
    client: Client,
    /// Open documents
    documents: Arc<RwLock<HashMap<Url, DocumentState>>>,
    /// Declared types of the whole workspace, open documents included
    index: Arc<RwLock<TypeIndex>>,
    config: Arc<RwLock<SdfUserConfig>>,
    root: Arc<RwLock<Option<PathBuf>>>,
}

impl SdfLanguageServer {
    pub fn new(client: Client) -> Self {
        let config = match load_config() {
            Ok(config) => config.unwrap_or_default(),
            Err(e) => {
                warn!("{}", e);
                SdfUserConfig::default()
            }
        };

        Self {
            client,
            documents: Arc::new(RwLock::new(HashMap::new())),
            index: Arc::new(RwLock::new(TypeIndex::new())),
            config: Arc::new(RwLock::new(config)),
            root: Arc::new(RwLock::new(None)),
        }
    }

    /// Parse, index and store a document, then publish its diagnostics.
    async fn update_document(&self, uri: Url, content: String, version: i32) {
        let parsed = parse(&content);

        self.index.write().await.update(uri.clone(), &parsed);

        let diagnostics = compute_diagnostics(&content, &parsed);
        self.client
            .publish_diagnostics(uri.clone(), diagnostics, Some(version))
            .await;

        let mut docs = self.documents.write().await;
        docs.insert(
            uri,
            DocumentState {
                content,
                parse: parsed,
                version,
            },
        );
    }

    /// Index every schema file under the workspace root that isn't open.
    async fn index_workspace(&self) {
        let Some(root) = self.root.read().await.clone() else {
            debug!("No workspace root, skipping scan");
            return;
        };
        let config = self.config.read().await.clone();

        let scanned = tokio::task::spawn_blocking(move || scan_workspace(&root, &config)).await;
        let files = match scanned {
            Ok(Ok(files)) => files,
            Ok(Err(e)) => {
                warn!("{}", e);
                self.client
                    .log_message(MessageType::WARNING, format!("Workspace scan failed: {e}"))
                    .await;
                return;
            }
            Err(e) => {
                warn!("Workspace scan task failed: {}", e);
                return;
            }
        };

        let docs = self.documents.read().await;
        let mut index = self.index.write().await;
        for file in files {
            if docs.contains_key(&file.uri) {
                continue;
            }
            index.update(file.uri, &parse(&file.content));
        }
        if index.is_empty() {
            debug!("No schema files found in workspace");
        }
        info!(files = index.len(), "Indexed workspace");
    }
}

/// Compute diagnostics for document content
fn compute_diagnostics(content: &str, parsed: &Parse) -> Vec<Diagnostic> {
    parsed
        .errors()
        .iter()
        .map(|error| Diagnostic {
            range: Range {
                start: offset_to_position(content, error.offset as usize),
                end: offset_to_position(content, error.offset as usize + 1),
            },
            severity: Some(DiagnosticSeverity::ERROR),
            code: None,
            code_description: None,
            source: Some("sdf".to_string()),
            message: error.message.clone(),
            related_information: None,
            tags: None,
            data: None,
        })
        .collect()
}

/// Turn resolver output into LSP items, keeping the resolver's order.
fn completion_items(candidates: &[Candidate], limit: Option<usize>) -> Vec<CompletionItem> {
    let count = candidates.len().min(limit.unwrap_or(usize::MAX));
    // fixed width so the client's lexicographic sort keeps our order
    let width = count.saturating_sub(1).to_string().len();
    candidates
        .iter()
        .take(count)
        .enumerate()
        .map(|(i, candidate)| {
            let insert_text = candidate.insert_text();
            CompletionItem {
                label: candidate.label(),
                kind: Some(completion_kind(candidate.kind)),
                sort_text: Some(format!("{i:0width$}")),
                filter_text: Some(insert_text.clone()),
                insert_text: Some(insert_text),
                ..Default::default()
            }
        })
        .collect()
}

fn completion_kind(kind: CandidateKind) -> CompletionItemKind {
    match kind {
        CandidateKind::Keyword => CompletionItemKind::KEYWORD,
        CandidateKind::FieldKind => CompletionItemKind::ENUM_MEMBER,
        CandidateKind::Hook => CompletionItemKind::EVENT,
        CandidateKind::Annotation => CompletionItemKind::FUNCTION,
        CandidateKind::Parameter => CompletionItemKind::FIELD,
        CandidateKind::Value => CompletionItemKind::VALUE,
        CandidateKind::Type => CompletionItemKind::CLASS,
    }
}

#[allow(deprecated)]
fn workspace_root(params: &InitializeParams) -> Option<PathBuf> {
    params
        .workspace_folders
        .as_ref()
        .and_then(|folders| folders.first())
        .map(|folder| &folder.uri)
        .or(params.root_uri.as_ref())
        .and_then(|uri| uri.to_file_path().ok())
}

#[tower_lsp::async_trait]
impl LanguageServer for SdfLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        *self.root.write().await = workspace_root(&params);

        if let Some(options) = params.initialization_options {
            match serde_json::from_value::<ConfigOverrides>(options) {
                Ok(overrides) => {
                    let mut config = self.config.write().await;
                    *config = config.clone().with_overrides(overrides);
                }
                Err(e) => warn!("Ignoring malformed initializationOptions: {}", e),
            }
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                // Full document sync - we get the whole document on each change
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                semantic_tokens_provider: Some(
                    SemanticTokensServerCapabilities::SemanticTokensOptions(
                        SemanticTokensOptions {
                            work_done_progress_options: WorkDoneProgressOptions::default(),
                            legend: semantic_token_legend(),
                            range: Some(false),
                            full: Some(SemanticTokensFullOptions::Bool(true)),
                        },
                    ),
                ),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(
                        TRIGGER_CHARACTERS.iter().map(|c| c.to_string()).collect(),
                    ),
                    resolve_provider: Some(false),
                    ..Default::default()
                }),
                // Closing `>` after a modifier bracket is opened
                document_on_type_formatting_provider: Some(DocumentOnTypeFormattingOptions {
                    first_trigger_character: "<".to_string(),
                    more_trigger_character: None,
                }),
                document_symbol_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "sdf-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.index_workspace().await;
        self.client
            .log_message(MessageType::INFO, "SDF language server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        self.update_document(doc.uri, doc.text, doc.version).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        // With FULL sync, we get the entire document content
        if let Some(change) = params.content_changes.into_iter().next() {
            self.update_document(uri, change.text, version).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;

        self.documents.write().await.remove(&uri);

        // Fall back to what is on disk; unsaved edits are gone
        let on_disk = match uri.to_file_path() {
            Ok(path) => tokio::fs::read_to_string(path).await.ok(),
            Err(()) => None,
        };
        {
            let mut index = self.index.write().await;
            match on_disk {
                Some(content) => index.update(uri.clone(), &parse(&content)),
                None => {
                    index.remove(&uri);
                }
            }
        }

        // Clear diagnostics
        self.client.publish_diagnostics(uri, vec![], None).await;
    }

    async fn semantic_tokens_full(
        &self,
        params: SemanticTokensParams,
    ) -> Result<Option<SemanticTokensResult>> {
        let uri = params.text_document.uri;

        let docs = self.documents.read().await;
        let Some(doc) = docs.get(&uri) else {
            return Ok(None);
        };

        let tokens = compute_semantic_tokens(&doc.parse);

        Ok(Some(SemanticTokensResult::Tokens(SemanticTokens {
            result_id: None,
            data: tokens,
        })))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let docs = self.documents.read().await;
        let Some(doc) = docs.get(&uri) else {
            return Ok(None);
        };

        let offset = position_to_offset(&doc.content, position);
        let candidates = {
            let index = self.index.read().await;
            get_completions(&doc.content, offset, &*index)
        };
        debug!(%uri, offset, candidates = candidates.len(), "completion");

        let limit = self.config.read().await.max_completions;
        Ok(Some(CompletionResponse::Array(completion_items(
            &candidates,
            limit,
        ))))
    }

    async fn on_type_formatting(
        &self,
        params: DocumentOnTypeFormattingParams,
    ) -> Result<Option<Vec<TextEdit>>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let docs = self.documents.read().await;
        let Some(doc) = docs.get(&uri) else {
            return Ok(None);
        };
        let Some(ch) = params.ch.chars().next() else {
            return Ok(None);
        };

        let offset = position_to_offset(&doc.content, position);
        let edits: Vec<TextEdit> = on_type(&doc.content, offset, ch)
            .into_iter()
            .map(|edit| {
                let at = offset_to_position(&doc.content, edit.offset);
                TextEdit {
                    range: Range { start: at, end: at },
                    new_text: edit.insert,
                }
            })
            .collect();

        if edits.is_empty() {
            Ok(None)
        } else {
            Ok(Some(edits))
        }
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let uri = params.text_document.uri;

        let docs = self.documents.read().await;
        let Some(doc) = docs.get(&uri) else {
            return Ok(None);
        };

        let symbols = document_symbols(&doc.parse, &doc.content);

        if symbols.is_empty() {
            Ok(None)
        } else {
            Ok(Some(DocumentSymbolResponse::Nested(symbols)))
        }
    }
}

/// Convert a byte offset to an LSP position (UTF-16 columns).
pub(crate) fn offset_to_position(content: &str, offset: usize) -> Position {
    let mut offset = offset.min(content.len());
    while !content.is_char_boundary(offset) {
        offset -= 1;
    }
    let line_start = content[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line = content[..line_start].matches('\n').count() as u32;
    let character = content[line_start..offset]
        .chars()
        .map(|c| c.len_utf16() as u32)
        .sum();
    Position::new(line, character)
}

/// Convert an LSP position to a byte offset.
///
/// Columns past the end of the line clamp to the line break; lines past the
/// end clamp to the end of the text.
pub(crate) fn position_to_offset(content: &str, position: Position) -> usize {
    let mut line_start = 0;
    for _ in 0..position.line {
        match content[line_start..].find('\n') {
            Some(i) => line_start += i + 1,
            None => return content.len(),
        }
    }

    let mut column = 0u32;
    for (i, ch) in content[line_start..].char_indices() {
        if column >= position.character || ch == '\n' {
            return line_start + i;
        }
        column += ch.len_utf16() as u32;
    }
    content.len()
}

/// Run the LSP server on stdin/stdout
pub async fn run() -> eyre::Result<()> {
    // Set up logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(SdfLanguageServer::new);
    Server::new(stdin, stdout, socket).serve(service).await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::TagKind;

    #[test]
    fn test_position_roundtrip() {
        let content = "package é;\ntype A {\n  Id: int;\n}";
        let pos = offset_to_position(content, content.find("Id").unwrap());
        assert_eq!(pos, Position::new(2, 2));
        assert_eq!(position_to_offset(content, pos), content.find("Id").unwrap());

        // past the end of a line clamps to its newline
        let eol = position_to_offset(content, Position::new(0, 99));
        assert_eq!(&content[eol..eol + 1], "\n");
        assert_eq!(position_to_offset(content, Position::new(9, 0)), content.len());

        // columns count UTF-16 units
        let semi = content.find(';').unwrap();
        assert_eq!(offset_to_position(content, semi), Position::new(0, 9));
        assert_eq!(position_to_offset(content, Position::new(0, 9)), semi);
        let wide = "// 𝄞x";
        assert_eq!(offset_to_position(wide, wide.len() - 1), Position::new(0, 5));
    }

    #[test]
    fn test_diagnostics_carry_source() {
        let content = "type A {\n  Id int;\n}";
        let diagnostics = compute_diagnostics(content, &parse(content));
        assert!(!diagnostics.is_empty());
        assert!(diagnostics.iter().all(|d| d.source.as_deref() == Some("sdf")));
        assert_eq!(diagnostics[0].range.start.line, 1);
    }

    #[test]
    fn test_completion_items_keep_order_and_limit() {
        let candidates = vec![
            Candidate::plain("type", CandidateKind::Keyword),
            Candidate::tag("vue", TagKind::Annotation, false),
            Candidate::tag("set", TagKind::Hook, true),
        ];

        let items = completion_items(&candidates, None);
        let labels: Vec<_> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["type", "$vue", "@set"]);
        assert_eq!(items[1].insert_text.as_deref(), Some("$vue"));
        assert_eq!(items[2].insert_text.as_deref(), Some("set"));
        assert_eq!(items[2].kind, Some(CompletionItemKind::EVENT));

        let mut sorted = items.clone();
        sorted.sort_by(|a, b| a.sort_text.cmp(&b.sort_text));
        assert_eq!(sorted, items);

        assert_eq!(completion_items(&candidates, Some(2)).len(), 2);
    }

    #[test]
    fn test_sort_text_stays_ordered_past_four_digits() {
        let candidates: Vec<_> = (0..10_001)
            .map(|i| Candidate::plain(format!("T{i}"), CandidateKind::Type))
            .collect();

        let items = completion_items(&candidates, None);
        assert_eq!(items[0].sort_text.as_deref(), Some("00000"));
        assert_eq!(items[10_000].sort_text.as_deref(), Some("10000"));

        let mut sorted = items.clone();
        sorted.sort_by(|a, b| a.sort_text.cmp(&b.sort_text));
        assert_eq!(sorted, items);
    }
}
