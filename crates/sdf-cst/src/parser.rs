//! CST parser for SDF using rowan's GreenNodeBuilder.
//!
//! The parser is error-tolerant: a construct it cannot finish is closed where
//! it stands, an error is recorded, and parsing resumes. Every loop consumes at
//! least one token per iteration, so any input (including half-typed text in
//! an editor) produces a tree that reproduces the source exactly.

use rowan::GreenNode;
use sdf_tokenizer::{Token, TokenKind, Tokenizer};
use tracing::debug;

use crate::keywords;
use crate::syntax_kind::{SyntaxKind, SyntaxNode};

/// A parsed SDF document.
#[derive(Debug, Clone)]
pub struct Parse {
    green: GreenNode,
    errors: Vec<ParseError>,
}

impl Parse {
    /// Get the root syntax node.
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    /// Get parse errors.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Check if parsing succeeded without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the green node (for testing/debugging).
    pub fn green(&self) -> &GreenNode {
        &self.green
    }
}

/// A parse error with location information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Byte offset where the error occurred.
    pub offset: u32,
    /// Error message.
    pub message: String,
}

impl ParseError {
    fn new(offset: u32, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (at byte {})", self.message, self.offset)
    }
}

impl std::error::Error for ParseError {}

/// Parse SDF source into a CST.
pub fn parse(source: &str) -> Parse {
    let parser = CstParser::new(source);
    parser.parse()
}

/// CST parser that builds a green tree using rowan.
struct CstParser<'src> {
    /// All tokens, trivia included, without the trailing EOF.
    tokens: Vec<Token<'src>>,
    /// Index of the next unconsumed token.
    pos: usize,
    source_len: u32,
    builder: rowan::GreenNodeBuilder<'static>,
    errors: Vec<ParseError>,
}

impl<'src> CstParser<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            tokens: Tokenizer::new(source).collect(),
            pos: 0,
            source_len: source.len() as u32,
            builder: rowan::GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn parse(mut self) -> Parse {
        self.builder.start_node(SyntaxKind::SOURCE_FILE.into());
        loop {
            self.skip_trivia();
            let Some((kind, text)) = self.current() else {
                break;
            };
            match kind {
                TokenKind::Ident if text == "package" => self.parse_package(),
                TokenKind::Ident if text == "meta" => self.parse_meta(),
                TokenKind::Ident | TokenKind::At | TokenKind::Dollar => self.parse_declaration(),
                _ => {
                    self.error("expected a declaration");
                    self.bump();
                }
            }
        }
        self.builder.finish_node();

        if !self.errors.is_empty() {
            debug!(errors = self.errors.len(), "parsed with errors");
        }

        Parse {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    // ------------------------------------------------------------------
    // Token cursor
    // ------------------------------------------------------------------

    /// The next raw token, trivia included.
    fn current(&self) -> Option<(TokenKind, &'src str)> {
        self.tokens.get(self.pos).map(|t| (t.kind, t.text))
    }

    /// The `n`th token after the cursor that is not trivia.
    fn nth_significant(&self, n: usize) -> Option<(TokenKind, &'src str)> {
        self.tokens[self.pos..]
            .iter()
            .filter(|t| !t.kind.is_trivia())
            .nth(n)
            .map(|t| (t.kind, t.text))
    }

    /// Whether the next significant token has the given kind.
    fn at(&self, kind: TokenKind) -> bool {
        self.nth_significant(0).is_some_and(|(k, _)| k == kind)
    }

    /// Whether the next significant token is the given bare word.
    fn at_keyword(&self, word: &str) -> bool {
        self.nth_significant(0)
            .is_some_and(|(k, text)| k == TokenKind::Ident && text == word)
    }

    /// Whether the next significant token can serve as a name.
    fn at_name(&self) -> bool {
        self.nth_significant(0).is_some_and(|(k, _)| k.is_word())
    }

    /// Whether the very next token (no trivia in between) is a word.
    fn at_adjacent_word(&self) -> bool {
        self.current().is_some_and(|(k, _)| k.is_word())
    }

    /// Byte offset of the next significant token, for error reporting.
    fn significant_offset(&self) -> u32 {
        self.tokens[self.pos..]
            .iter()
            .find(|t| !t.kind.is_trivia())
            .map(|t| t.span.start)
            .unwrap_or(self.source_len)
    }

    /// Consume the current token with its natural kind.
    fn bump(&mut self) {
        if let Some((kind, _)) = self.current() {
            self.bump_as(SyntaxKind::from(kind));
        }
    }

    /// Consume the current token, recording it as `kind`.
    fn bump_as(&mut self, kind: SyntaxKind) {
        if let Some(token) = self.tokens.get(self.pos) {
            self.builder.token(kind.into(), token.text);
            self.pos += 1;
        }
    }

    /// Skip trivia (whitespace and line comments), adding them to the tree.
    fn skip_trivia(&mut self) {
        while self.current().is_some_and(|(k, _)| k.is_trivia()) {
            self.bump();
        }
    }

    /// Consume trivia and the next token if it has the given kind.
    /// Leaves trivia untouched otherwise, so it lands in the enclosing node.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.skip_trivia();
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error(format!("expected {what}"));
            false
        }
    }

    fn error(&mut self, message: impl Into<String>) {
        let offset = self.significant_offset();
        self.errors.push(ParseError::new(offset, message));
    }

    // ------------------------------------------------------------------
    // Top level
    // ------------------------------------------------------------------

    /// `package name;`
    fn parse_package(&mut self) {
        self.builder.start_node(SyntaxKind::PACKAGE_DECLARATION.into());
        self.bump_as(SyntaxKind::PACKAGE_KW);
        if self.at_name() {
            self.skip_trivia();
            self.bump();
        } else {
            self.error("expected package name");
        }
        self.expect(TokenKind::Semicolon, "';' after package name");
        self.builder.finish_node();
    }

    /// `meta(kind)` followed by `# ...` lines.
    fn parse_meta(&mut self) {
        self.builder.start_node(SyntaxKind::DECLARATION.into());
        self.builder.start_node(SyntaxKind::META_DECLARATION.into());
        self.bump_as(SyntaxKind::META_KW);
        if self.eat(TokenKind::LParen) {
            if self.at_name() {
                self.skip_trivia();
                self.bump();
            } else {
                self.error("expected meta kind");
            }
            self.expect(TokenKind::RParen, "')'");
        }
        while self.at(TokenKind::MetaLine) {
            self.skip_trivia();
            self.bump();
        }
        self.builder.finish_node();
        self.builder.finish_node();
    }

    /// A run of type modifiers, then a type declaration.
    ///
    /// The modifiers are only wrapped into a declaration once `type` shows
    /// up. A run that is not followed by `type` (the user is still typing it)
    /// stays as loose children of the root.
    fn parse_declaration(&mut self) {
        let checkpoint = self.builder.checkpoint();
        let mut modifiers = 0usize;

        while let Some((kind, text)) = self.nth_significant(0) {
            match kind {
                TokenKind::Ident if matches!(text, "type" | "package" | "meta") => break,
                TokenKind::Ident => {
                    self.skip_trivia();
                    if keywords::is_type_modifier(text) {
                        self.builder.start_node(SyntaxKind::TYPE_MODIFIER.into());
                        self.bump_as(SyntaxKind::TYPE_MODIFIER_KW);
                        self.builder.finish_node();
                    } else {
                        self.bump();
                    }
                }
                TokenKind::At => {
                    self.skip_trivia();
                    self.builder.start_node(SyntaxKind::TYPE_MODIFIER.into());
                    self.parse_hook_tag();
                    self.builder.finish_node();
                }
                TokenKind::Dollar => {
                    self.skip_trivia();
                    self.builder.start_node(SyntaxKind::TYPE_MODIFIER.into());
                    self.parse_annotation();
                    self.builder.finish_node();
                }
                _ => break,
            }
            modifiers += 1;
        }

        if self.at_keyword("type") {
            self.builder
                .start_node_at(checkpoint, SyntaxKind::DECLARATION.into());
            self.builder
                .start_node_at(checkpoint, SyntaxKind::TYPE_DECLARATION.into());
            if modifiers > 0 {
                self.builder
                    .start_node_at(checkpoint, SyntaxKind::TYPE_MODIFIERS.into());
                self.builder.finish_node();
            }
            self.parse_type_declaration_rest();
            self.builder.finish_node();
            self.builder.finish_node();
        } else if modifiers > 0 {
            self.error("expected 'type'");
        }
    }

    /// `type Name extends Base { entries }`, starting at `type`.
    fn parse_type_declaration_rest(&mut self) {
        self.skip_trivia();
        self.bump_as(SyntaxKind::TYPE_KW);

        if self.at_name() {
            self.skip_trivia();
            self.bump();
        } else {
            self.error("expected type name");
        }

        if self.at_keyword("extends") {
            self.skip_trivia();
            self.builder.start_node(SyntaxKind::EXTENDS_CLAUSE.into());
            self.bump_as(SyntaxKind::EXTENDS_KW);
            if self.at_name() {
                self.skip_trivia();
                self.bump();
            } else {
                self.error("expected base type name");
            }
            self.builder.finish_node();
        }

        if self.expect(TokenKind::LBrace, "'{'") {
            self.parse_type_body();
        }
    }

    /// Entries up to and including the closing `}`.
    fn parse_type_body(&mut self) {
        loop {
            let Some((kind, text)) = self.nth_significant(0) else {
                self.error("expected '}'");
                break;
            };
            match kind {
                TokenKind::RBrace => {
                    self.skip_trivia();
                    self.bump();
                    break;
                }
                TokenKind::Ellipsis => {
                    self.skip_trivia();
                    self.bump();
                }
                // `type Next` means the previous body was never closed
                TokenKind::Ident
                    if text == "type"
                        && self.nth_significant(1).is_some_and(|(k, _)| k.is_word()) =>
                {
                    self.error("expected '}'");
                    break;
                }
                TokenKind::Ident => {
                    self.skip_trivia();
                    self.parse_entry();
                }
                _ => {
                    self.error("unexpected token in type body");
                    self.skip_trivia();
                    self.builder.start_node(SyntaxKind::ERROR_NODE.into());
                    self.bump();
                    self.builder.finish_node();
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Entries
    // ------------------------------------------------------------------

    /// A field or method, its optional modifier bracket, and `;`.
    fn parse_entry(&mut self) {
        self.builder.start_node(SyntaxKind::ENTRY.into());

        if self
            .nth_significant(1)
            .is_some_and(|(k, _)| k == TokenKind::LParen)
        {
            self.parse_method();
        } else {
            self.parse_field();
        }

        if self.at(TokenKind::LAngle) {
            self.parse_attr_modifiers();
        }

        self.expect(TokenKind::Semicolon, "';' after entry");
        self.builder.finish_node();
    }

    /// `Name: type`
    fn parse_field(&mut self) {
        self.builder.start_node(SyntaxKind::FIELD.into());
        self.bump();
        if self.eat(TokenKind::Colon) {
            self.parse_type();
        } else {
            self.error("expected ':' after field name");
        }
        self.builder.finish_node();
    }

    /// `name(param: type, ...): type`
    fn parse_method(&mut self) {
        self.builder.start_node(SyntaxKind::METHOD.into());
        self.bump();
        self.skip_trivia();
        self.bump();

        if self.at_name() {
            self.builder.start_node(SyntaxKind::PARAMS.into());
            loop {
                self.skip_trivia();
                self.builder.start_node(SyntaxKind::PARAM.into());
                self.bump();
                if self.eat(TokenKind::Colon) {
                    self.parse_type();
                } else {
                    self.error("expected ':' after parameter name");
                }
                self.builder.finish_node();

                if !self.eat(TokenKind::Comma) {
                    break;
                }
                if !self.at_name() {
                    self.error("expected parameter");
                    break;
                }
            }
            self.builder.finish_node();
        }

        self.expect(TokenKind::RParen, "')'");
        if self.eat(TokenKind::Colon) {
            self.parse_type();
        }
        self.builder.finish_node();
    }

    /// A type expression: `int`, `Foo`, `pkg.Foo`, `[T]`, `map[K]V`, each
    /// optionally followed by `!`.
    fn parse_type(&mut self) {
        let Some((kind, text)) = self.nth_significant(0) else {
            self.error("expected a type");
            return;
        };
        if !matches!(
            kind,
            TokenKind::LBracket | TokenKind::Ident | TokenKind::QualifiedName
        ) {
            self.error("expected a type");
            return;
        }

        self.skip_trivia();
        self.builder.start_node(SyntaxKind::TYPE.into());
        match kind {
            TokenKind::LBracket => {
                self.builder.start_node(SyntaxKind::ARRAY_TYPE.into());
                self.bump();
                self.parse_type();
                self.expect(TokenKind::RBracket, "']'");
                self.builder.finish_node();
            }
            TokenKind::Ident
                if text == "map"
                    && self
                        .nth_significant(1)
                        .is_some_and(|(k, _)| k == TokenKind::LBracket) =>
            {
                self.parse_map_type();
            }
            TokenKind::Ident if keywords::is_primitive_type(text) => {
                self.bump_as(SyntaxKind::PRIMITIVE_TYPE);
            }
            _ => self.bump(),
        }
        self.eat(TokenKind::Bang);
        self.builder.finish_node();
    }

    /// `map[K]V`, starting at `map`.
    fn parse_map_type(&mut self) {
        self.builder.start_node(SyntaxKind::MAP_TYPE.into());
        self.bump_as(SyntaxKind::MAP_KW);
        self.skip_trivia();
        self.bump();

        match self.nth_significant(0) {
            Some((kind, key)) if kind.is_word() => {
                self.skip_trivia();
                if keywords::MAP_KEY_TYPES.contains(&key) {
                    self.bump_as(SyntaxKind::PRIMITIVE_TYPE);
                } else {
                    self.error("map keys must be int or string");
                    self.bump();
                }
            }
            _ => self.error("expected map key type"),
        }

        self.expect(TokenKind::RBracket, "']'");
        self.parse_type();
        self.builder.finish_node();
    }

    /// `< kind @hook $annotation(...) >`
    fn parse_attr_modifiers(&mut self) {
        self.skip_trivia();
        self.builder.start_node(SyntaxKind::ATTR_MODIFIERS.into());
        self.bump();

        loop {
            let Some((kind, text)) = self.nth_significant(0) else {
                self.error("expected '>'");
                break;
            };
            match kind {
                TokenKind::RAngle => {
                    self.skip_trivia();
                    self.bump();
                    break;
                }
                TokenKind::Ident | TokenKind::QualifiedName => {
                    self.skip_trivia();
                    self.builder.start_node(SyntaxKind::ATTR_MODIFIER.into());
                    if kind == TokenKind::Ident && keywords::is_field_kind(text) {
                        self.bump_as(SyntaxKind::ATTR_MODIFIER_KW);
                    } else {
                        self.bump();
                    }
                    self.builder.finish_node();
                }
                TokenKind::At => {
                    self.skip_trivia();
                    self.builder.start_node(SyntaxKind::ATTR_MODIFIER.into());
                    self.parse_hook_tag();
                    self.builder.finish_node();
                }
                TokenKind::Dollar => {
                    self.skip_trivia();
                    self.builder.start_node(SyntaxKind::ATTR_MODIFIER.into());
                    self.parse_annotation();
                    self.builder.finish_node();
                }
                _ => {
                    self.error("expected '>'");
                    break;
                }
            }
        }

        self.builder.finish_node();
    }

    // ------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------

    /// `@name`, `@name:spec`, `@name="value"`, starting at `@`.
    fn parse_hook_tag(&mut self) {
        self.builder.start_node(SyntaxKind::HOOK_TAG.into());
        self.bump();
        if self.at_adjacent_word() {
            self.bump();
            self.parse_tag_spec();
        } else {
            self.error("expected hook name after '@'");
        }
        if self.eat(TokenKind::Eq) {
            self.expect(TokenKind::String, "string value");
        }
        self.builder.finish_node();
    }

    /// `$name(values)`, starting at `$`.
    fn parse_annotation(&mut self) {
        self.builder.start_node(SyntaxKind::ANNOTATION.into());

        self.builder.start_node(SyntaxKind::ANNOTATION_TAG.into());
        self.bump();
        let named = self.at_adjacent_word();
        if named {
            self.bump();
        } else {
            self.error("expected annotation name after '$'");
        }
        self.builder.finish_node();

        if named {
            self.parse_tag_spec();
        }
        if self.at(TokenKind::LParen) {
            self.parse_annotation_values();
        }

        self.builder.finish_node();
    }

    /// Optional `:spec` glued to a tag name.
    fn parse_tag_spec(&mut self) {
        let glued_colon = self.current().is_some_and(|(k, _)| k == TokenKind::Colon);
        let word_follows = self
            .tokens
            .get(self.pos + 1)
            .is_some_and(|t| t.kind.is_word());
        if glued_colon && word_follows {
            self.bump();
            self.bump();
        }
    }

    /// `( value name=value ... )`
    fn parse_annotation_values(&mut self) {
        self.skip_trivia();
        self.builder.start_node(SyntaxKind::ANNOTATION_VALUES.into());
        self.bump();

        loop {
            let Some((kind, _)) = self.nth_significant(0) else {
                self.error("expected ')'");
                break;
            };
            let is_key = matches!(
                kind,
                TokenKind::Ident | TokenKind::QualifiedName | TokenKind::String
            );
            match kind {
                TokenKind::RParen => {
                    self.skip_trivia();
                    self.bump();
                    break;
                }
                TokenKind::Comma => {
                    self.skip_trivia();
                    self.bump();
                }
                _ if is_key
                    && self
                        .nth_significant(1)
                        .is_some_and(|(k, _)| k == TokenKind::Eq) =>
                {
                    self.skip_trivia();
                    self.parse_ann_param();
                }
                _ if is_value_start(kind) => {
                    self.skip_trivia();
                    self.builder.start_node(SyntaxKind::ANNOTATION_VALUE.into());
                    self.bump_value();
                    self.builder.finish_node();
                }
                _ => {
                    self.error("expected ')'");
                    break;
                }
            }
        }

        self.builder.finish_node();
    }

    /// `name=value` inside an annotation's argument list.
    fn parse_ann_param(&mut self) {
        self.builder.start_node(SyntaxKind::ANNOTATION_VALUE.into());
        self.builder.start_node(SyntaxKind::ANN_PARAM.into());

        self.builder.start_node(SyntaxKind::ANN_PARAM_NAME.into());
        self.bump();
        self.builder.finish_node();

        self.eat(TokenKind::Eq);

        match self.nth_significant(0) {
            Some((kind, _)) if is_value_start(kind) => {
                self.skip_trivia();
                self.builder.start_node(SyntaxKind::ANN_PARAM_VALUE.into());
                self.bump_value();
                self.builder.finish_node();
            }
            _ => self.error("expected value after '='"),
        }

        self.builder.finish_node();
        self.builder.finish_node();
    }

    /// Consume a literal or word, marking `true`/`false` as booleans.
    fn bump_value(&mut self) {
        match self.current() {
            Some((TokenKind::Ident, "true" | "false")) => self.bump_as(SyntaxKind::BOOL_VALUE),
            _ => self.bump(),
        }
    }
}

/// Tokens accepted as annotation values. Values are deliberately loose:
/// any word is accepted so that half-typed input still parses.
fn is_value_start(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Ident | TokenKind::QualifiedName | TokenKind::String | TokenKind::Number
    )
}
