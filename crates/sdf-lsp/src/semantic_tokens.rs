//! Semantic token computation for syntax highlighting

use sdf_cst::{Parse, SyntaxKind, SyntaxToken};
use tower_lsp::lsp_types::*;

/// Semantic token types we support
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TokenType {
    /// Comments and meta lines
    Comment = 0,
    /// Quoted strings
    String = 1,
    /// Numeric annotation values
    Number = 2,
    /// Keywords, modifier keywords and booleans
    Keyword = 3,
    /// Type names, declared or referenced
    Type = 4,
    /// Field names
    Property = 5,
    /// Method names
    Method = 6,
    /// Method parameters and annotation parameter names
    Parameter = 7,
    /// Hooks and annotations, sigil included
    Decorator = 8,
    /// Package names
    Namespace = 9,
    /// `=`, `!`, `...`
    Operator = 10,
}

impl TokenType {
    pub const ALL: [TokenType; 11] = [
        TokenType::Comment,
        TokenType::String,
        TokenType::Number,
        TokenType::Keyword,
        TokenType::Type,
        TokenType::Property,
        TokenType::Method,
        TokenType::Parameter,
        TokenType::Decorator,
        TokenType::Namespace,
        TokenType::Operator,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TokenType::Comment => "comment",
            TokenType::String => "string",
            TokenType::Number => "number",
            TokenType::Keyword => "keyword",
            TokenType::Type => "type",
            TokenType::Property => "property",
            TokenType::Method => "method",
            TokenType::Parameter => "parameter",
            TokenType::Decorator => "decorator",
            TokenType::Namespace => "namespace",
            TokenType::Operator => "operator",
        }
    }
}

/// Build the semantic token legend for LSP
pub fn semantic_token_legend() -> SemanticTokensLegend {
    SemanticTokensLegend {
        token_types: TokenType::ALL
            .iter()
            .map(|t| SemanticTokenType::new(t.as_str()))
            .collect(),
        token_modifiers: Vec::new(),
    }
}

/// A highlight span with byte range (for CLI/terminal output)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSpan {
    /// Byte offset where the span starts
    pub start: usize,
    /// Byte offset where the span ends (exclusive)
    pub end: usize,
    pub token_type: TokenType,
}

/// A semantic token before encoding
#[derive(Debug)]
struct RawToken {
    line: u32,
    start_char: u32,
    length: u32,
    token_type: TokenType,
}

/// Compute semantic tokens for a parsed document
pub fn compute_semantic_tokens(parse: &Parse) -> Vec<SemanticToken> {
    let root = parse.syntax();
    let content = root.to_string();

    // Tokens come out of a preorder walk, so they are already in document order.
    let raw_tokens: Vec<RawToken> = root
        .descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .filter_map(|token| {
            let token_type = classify_token(&token)?;
            Some(raw_token(&content, &token, token_type))
        })
        .collect();

    encode_tokens(&raw_tokens)
}

/// Compute highlight spans with byte ranges for terminal/CLI output
pub fn compute_highlight_spans(parse: &Parse) -> Vec<HighlightSpan> {
    parse
        .syntax()
        .descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .filter_map(|token| {
            let token_type = classify_token(&token)?;
            let range = token.text_range();
            Some(HighlightSpan {
                start: range.start().into(),
                end: range.end().into(),
                token_type,
            })
        })
        .collect()
}

/// The highlight for a token, if it gets one.
fn classify_token(token: &SyntaxToken) -> Option<TokenType> {
    let parent = token.parent().map(|p| p.kind());

    let token_type = match token.kind() {
        SyntaxKind::LINE_COMMENT | SyntaxKind::META_LINE => TokenType::Comment,
        SyntaxKind::STRING_VALUE => TokenType::String,
        SyntaxKind::NUMBER_VALUE => TokenType::Number,
        SyntaxKind::BOOL_VALUE => TokenType::Keyword,
        SyntaxKind::PRIMITIVE_TYPE | SyntaxKind::MAP_KW => TokenType::Type,
        kind if kind.is_keyword() => TokenType::Keyword,
        SyntaxKind::AT | SyntaxKind::DOLLAR => TokenType::Decorator,
        SyntaxKind::EQ if parent == Some(SyntaxKind::HOOK_TAG) => TokenType::Decorator,
        SyntaxKind::EQ | SyntaxKind::BANG | SyntaxKind::ELLIPSIS => TokenType::Operator,
        SyntaxKind::IDENT | SyntaxKind::QUALIFIED_NAME => match parent? {
            SyntaxKind::PACKAGE_DECLARATION => TokenType::Namespace,
            SyntaxKind::TYPE_DECLARATION
            | SyntaxKind::EXTENDS_CLAUSE
            | SyntaxKind::TYPE
            | SyntaxKind::ARRAY_TYPE
            | SyntaxKind::MAP_TYPE => TokenType::Type,
            SyntaxKind::FIELD => TokenType::Property,
            SyntaxKind::METHOD => TokenType::Method,
            SyntaxKind::PARAM | SyntaxKind::ANN_PARAM_NAME => TokenType::Parameter,
            SyntaxKind::ANNOTATION_TAG | SyntaxKind::HOOK_TAG => TokenType::Decorator,
            _ => return None,
        },
        _ => return None,
    };
    Some(token_type)
}

fn raw_token(content: &str, token: &SyntaxToken, token_type: TokenType) -> RawToken {
    let start: usize = token.text_range().start().into();
    let (line, start_char) = offset_to_line_col(content, start);

    RawToken {
        line,
        start_char,
        length: token.text().encode_utf16().count() as u32,
        token_type,
    }
}

/// Convert byte offset to (line, UTF-16 column)
fn offset_to_line_col(content: &str, offset: usize) -> (u32, u32) {
    let mut line = 0u32;
    let mut col = 0u32;

    for (i, ch) in content.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 0;
        } else {
            col += ch.len_utf16() as u32;
        }
    }

    (line, col)
}

/// Encode raw tokens as LSP semantic tokens (delta-encoded)
fn encode_tokens(raw_tokens: &[RawToken]) -> Vec<SemanticToken> {
    let mut result = Vec::with_capacity(raw_tokens.len());
    let mut prev_line = 0u32;
    let mut prev_start = 0u32;

    for token in raw_tokens {
        let delta_line = token.line - prev_line;
        let delta_start = if delta_line == 0 {
            token.start_char - prev_start
        } else {
            token.start_char
        };

        result.push(SemanticToken {
            delta_line,
            delta_start,
            length: token.length,
            token_type: token.token_type as u32,
            token_modifiers_bitset: 0,
        });

        prev_line = token.line;
        prev_start = token.start_char;
    }

    result
}
