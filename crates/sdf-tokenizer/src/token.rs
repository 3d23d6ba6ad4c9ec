//! Token types for the SDF lexer.

use crate::Span;

/// The kind of a token.
///
/// Keywords are not distinguished here: `type`, `package`, `dictionary` and
/// friends all come out as [`TokenKind::Ident`] and are classified by the CST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Delimiters
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `<` (opens a modifier bracket)
    LAngle,
    /// `>` (closes a modifier bracket)
    RAngle,

    // Punctuation
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `=`
    Eq,
    /// `!` (non-null marker after a type)
    Bang,
    /// `...` (open type body)
    Ellipsis,
    /// `@` (hook sigil)
    At,
    /// `$` (annotation sigil)
    Dollar,

    // Words and literals
    /// Identifier or keyword: `Foo`, `one-to-many`, `type`
    Ident,
    /// Dotted name: `sample.Foo`
    QualifiedName,
    /// Quoted string: `"Name"`
    String,
    /// Integer or decimal literal: `1`, `-2.5`
    Number,

    /// Raw line inside a `meta` block: `# ...`
    MetaLine,

    // Trivia
    /// Line comment: `// ...`
    LineComment,
    /// Spaces and tabs
    Whitespace,
    /// `\n` or `\r\n`
    Newline,

    // Special
    /// End of input
    Eof,
    /// Unrecognized input or unterminated string
    Error,
}

impl TokenKind {
    /// Whether this token is trivia (whitespace or comments).
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::Newline | TokenKind::LineComment
        )
    }

    /// Whether this token is a word the parser may treat as a name.
    pub fn is_word(&self) -> bool {
        matches!(self, TokenKind::Ident | TokenKind::QualifiedName)
    }
}

/// A token with its kind, span, and source text slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub span: Span,
    pub text: &'src str,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, span: Span, text: &'src str) -> Self {
        Self { kind, span, text }
    }
}
