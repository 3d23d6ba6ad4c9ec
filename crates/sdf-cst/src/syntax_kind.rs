//! Syntax node and token kinds for the SDF CST.

use sdf_tokenizer::TokenKind;

/// The kind of a syntax element (node or token).
///
/// Tokens are terminal elements (leaves), while nodes are non-terminal
/// (contain children). The distinction is made by value: tokens have
/// lower values than `__LAST_TOKEN`.
///
/// Keyword kinds are assigned by the parser from context: `type` is a
/// [`SyntaxKind::TYPE_KW`] at the start of a declaration but a plain
/// [`SyntaxKind::IDENT`] as an annotation parameter name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
#[allow(clippy::manual_non_exhaustive)] // __LAST_TOKEN is used for token/node distinction
pub enum SyntaxKind {
    // ========== TOKENS (terminals) ==========
    /// `{`
    L_BRACE = 0,
    /// `}`
    R_BRACE,
    /// `(`
    L_PAREN,
    /// `)`
    R_PAREN,
    /// `[`
    L_BRACKET,
    /// `]`
    R_BRACKET,
    /// `<`, opens a modifier bracket
    L_ANGLE,
    /// `>`, closes a modifier bracket
    R_ANGLE,
    /// `:`
    COLON,
    /// `;`
    SEMICOLON,
    /// `,`
    COMMA,
    /// `=`
    EQ,
    /// `!`
    BANG,
    /// `...`
    ELLIPSIS,
    /// `@`
    AT,
    /// `$`
    DOLLAR,
    /// Identifier that is not a keyword in its position
    IDENT,
    /// `pkg.Name`
    QUALIFIED_NAME,
    /// `"..."`
    STRING_VALUE,
    /// `42`, `-1.5`
    NUMBER_VALUE,
    /// `true` / `false` as an annotation value
    BOOL_VALUE,
    /// `package`
    PACKAGE_KW,
    /// `type`
    TYPE_KW,
    /// `extends`
    EXTENDS_KW,
    /// `meta`
    META_KW,
    /// `map` in type position
    MAP_KW,
    /// `int`, `float`, `bool`, `string`, `date` in type position
    PRIMITIVE_TYPE,
    /// `dictionary`, `singleton`, ... before `type`
    TYPE_MODIFIER_KW,
    /// `id`, `auto`, ... inside a field's modifier bracket
    ATTR_MODIFIER_KW,
    /// `# ...` line of a meta block
    META_LINE,
    /// `// ...`
    LINE_COMMENT,
    /// Spaces and tabs
    WHITESPACE,
    /// `\n` or `\r\n`
    NEWLINE,
    /// End of file
    EOF,
    /// Lexer error
    ERROR,

    // Marker for end of tokens
    #[doc(hidden)]
    __LAST_TOKEN,

    // ========== NODES (non-terminals) ==========
    /// Root node
    SOURCE_FILE,
    /// `package name;`
    PACKAGE_DECLARATION,
    /// Wrapper around a type or meta declaration
    DECLARATION,
    /// `modifiers type Name extends Base { ... }`
    TYPE_DECLARATION,
    /// The modifier run before `type`
    TYPE_MODIFIERS,
    /// One keyword, hook or annotation in a modifier run
    TYPE_MODIFIER,
    /// `extends Base`
    EXTENDS_CLAUSE,
    /// A field or method with its modifier bracket and `;`
    ENTRY,
    /// `Name: type`
    FIELD,
    /// `name(params): type`
    METHOD,
    /// Method parameter list
    PARAMS,
    /// `name: type`
    PARAM,
    /// Type expression slot
    TYPE,
    /// `[T]`
    ARRAY_TYPE,
    /// `map[K]V`
    MAP_TYPE,
    /// `< ... >` modifier bracket
    ATTR_MODIFIERS,
    /// One item in a modifier bracket
    ATTR_MODIFIER,
    /// `$tag(...)`
    ANNOTATION,
    /// `$tag`
    ANNOTATION_TAG,
    /// `( ... )` argument list
    ANNOTATION_VALUES,
    /// One argument
    ANNOTATION_VALUE,
    /// `name=value` argument
    ANN_PARAM,
    /// Name part of `name=value`
    ANN_PARAM_NAME,
    /// Value part of `name=value`
    ANN_PARAM_VALUE,
    /// `@hook` or `@hook="..."`
    HOOK_TAG,
    /// `meta(kind)` followed by `#` lines
    META_DECLARATION,
    /// Tokens the parser could not place
    ERROR_NODE,
}

impl SyntaxKind {
    /// Whether this is a token (terminal) kind.
    pub fn is_token(self) -> bool {
        (self as u16) < (Self::__LAST_TOKEN as u16)
    }

    /// Whether this is a node (non-terminal) kind.
    pub fn is_node(self) -> bool {
        (self as u16) > (Self::__LAST_TOKEN as u16)
    }

    /// Whether this is trivia (whitespace or comments).
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::NEWLINE | Self::LINE_COMMENT)
    }

    /// Whether this is horizontal or vertical whitespace.
    pub fn is_whitespace(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::NEWLINE)
    }

    /// Whether this token kind is a keyword.
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            Self::PACKAGE_KW
                | Self::TYPE_KW
                | Self::EXTENDS_KW
                | Self::META_KW
                | Self::MAP_KW
                | Self::TYPE_MODIFIER_KW
                | Self::ATTR_MODIFIER_KW
        )
    }
}

impl From<TokenKind> for SyntaxKind {
    fn from(kind: TokenKind) -> Self {
        match kind {
            TokenKind::LBrace => Self::L_BRACE,
            TokenKind::RBrace => Self::R_BRACE,
            TokenKind::LParen => Self::L_PAREN,
            TokenKind::RParen => Self::R_PAREN,
            TokenKind::LBracket => Self::L_BRACKET,
            TokenKind::RBracket => Self::R_BRACKET,
            TokenKind::LAngle => Self::L_ANGLE,
            TokenKind::RAngle => Self::R_ANGLE,
            TokenKind::Colon => Self::COLON,
            TokenKind::Semicolon => Self::SEMICOLON,
            TokenKind::Comma => Self::COMMA,
            TokenKind::Eq => Self::EQ,
            TokenKind::Bang => Self::BANG,
            TokenKind::Ellipsis => Self::ELLIPSIS,
            TokenKind::At => Self::AT,
            TokenKind::Dollar => Self::DOLLAR,
            TokenKind::Ident => Self::IDENT,
            TokenKind::QualifiedName => Self::QUALIFIED_NAME,
            TokenKind::String => Self::STRING_VALUE,
            TokenKind::Number => Self::NUMBER_VALUE,
            TokenKind::MetaLine => Self::META_LINE,
            TokenKind::LineComment => Self::LINE_COMMENT,
            TokenKind::Whitespace => Self::WHITESPACE,
            TokenKind::Newline => Self::NEWLINE,
            TokenKind::Eof => Self::EOF,
            TokenKind::Error => Self::ERROR,
        }
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        rowan::SyntaxKind(kind as u16)
    }
}

/// Language definition for SDF, used by rowan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SdfLanguage {}

impl rowan::Language for SdfLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        Self::Kind::from_raw(raw.0).expect("invalid SyntaxKind value from rowan")
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind as u16)
    }
}

impl SyntaxKind {
    /// Convert from a raw u16 value to SyntaxKind.
    /// Returns None if the value is out of range or corresponds to __LAST_TOKEN.
    pub const fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            0 => Some(Self::L_BRACE),
            1 => Some(Self::R_BRACE),
            2 => Some(Self::L_PAREN),
            3 => Some(Self::R_PAREN),
            4 => Some(Self::L_BRACKET),
            5 => Some(Self::R_BRACKET),
            6 => Some(Self::L_ANGLE),
            7 => Some(Self::R_ANGLE),
            8 => Some(Self::COLON),
            9 => Some(Self::SEMICOLON),
            10 => Some(Self::COMMA),
            11 => Some(Self::EQ),
            12 => Some(Self::BANG),
            13 => Some(Self::ELLIPSIS),
            14 => Some(Self::AT),
            15 => Some(Self::DOLLAR),
            16 => Some(Self::IDENT),
            17 => Some(Self::QUALIFIED_NAME),
            18 => Some(Self::STRING_VALUE),
            19 => Some(Self::NUMBER_VALUE),
            20 => Some(Self::BOOL_VALUE),
            21 => Some(Self::PACKAGE_KW),
            22 => Some(Self::TYPE_KW),
            23 => Some(Self::EXTENDS_KW),
            24 => Some(Self::META_KW),
            25 => Some(Self::MAP_KW),
            26 => Some(Self::PRIMITIVE_TYPE),
            27 => Some(Self::TYPE_MODIFIER_KW),
            28 => Some(Self::ATTR_MODIFIER_KW),
            29 => Some(Self::META_LINE),
            30 => Some(Self::LINE_COMMENT),
            31 => Some(Self::WHITESPACE),
            32 => Some(Self::NEWLINE),
            33 => Some(Self::EOF),
            34 => Some(Self::ERROR),
            // 35 is __LAST_TOKEN - skip it
            36 => Some(Self::SOURCE_FILE),
            37 => Some(Self::PACKAGE_DECLARATION),
            38 => Some(Self::DECLARATION),
            39 => Some(Self::TYPE_DECLARATION),
            40 => Some(Self::TYPE_MODIFIERS),
            41 => Some(Self::TYPE_MODIFIER),
            42 => Some(Self::EXTENDS_CLAUSE),
            43 => Some(Self::ENTRY),
            44 => Some(Self::FIELD),
            45 => Some(Self::METHOD),
            46 => Some(Self::PARAMS),
            47 => Some(Self::PARAM),
            48 => Some(Self::TYPE),
            49 => Some(Self::ARRAY_TYPE),
            50 => Some(Self::MAP_TYPE),
            51 => Some(Self::ATTR_MODIFIERS),
            52 => Some(Self::ATTR_MODIFIER),
            53 => Some(Self::ANNOTATION),
            54 => Some(Self::ANNOTATION_TAG),
            55 => Some(Self::ANNOTATION_VALUES),
            56 => Some(Self::ANNOTATION_VALUE),
            57 => Some(Self::ANN_PARAM),
            58 => Some(Self::ANN_PARAM_NAME),
            59 => Some(Self::ANN_PARAM_VALUE),
            60 => Some(Self::HOOK_TAG),
            61 => Some(Self::META_DECLARATION),
            62 => Some(Self::ERROR_NODE),
            _ => None,
        }
    }
}

/// A syntax node in the SDF CST.
pub type SyntaxNode = rowan::SyntaxNode<SdfLanguage>;

/// A syntax token in the SDF CST.
pub type SyntaxToken = rowan::SyntaxToken<SdfLanguage>;

/// A syntax element (either node or token) in the SDF CST.
pub type SyntaxElement = rowan::SyntaxElement<SdfLanguage>;

#[cfg(test)]
mod tests {
    use super::*;
    use rowan::Language;

    #[test]
    fn token_vs_node() {
        assert!(SyntaxKind::L_BRACE.is_token());
        assert!(SyntaxKind::ERROR.is_token());
        assert!(SyntaxKind::ATTR_MODIFIER_KW.is_token());

        assert!(SyntaxKind::SOURCE_FILE.is_node());
        assert!(SyntaxKind::ANN_PARAM_VALUE.is_node());
        assert!(SyntaxKind::ERROR_NODE.is_node());
    }

    #[test]
    fn trivia() {
        assert!(SyntaxKind::WHITESPACE.is_trivia());
        assert!(SyntaxKind::NEWLINE.is_trivia());
        assert!(SyntaxKind::LINE_COMMENT.is_trivia());

        assert!(!SyntaxKind::LINE_COMMENT.is_whitespace());
        assert!(!SyntaxKind::META_LINE.is_trivia());
    }

    #[test]
    fn token_kind_conversion() {
        assert_eq!(SyntaxKind::from(TokenKind::LAngle), SyntaxKind::L_ANGLE);
        assert_eq!(SyntaxKind::from(TokenKind::Dollar), SyntaxKind::DOLLAR);
        assert_eq!(SyntaxKind::from(TokenKind::String), SyntaxKind::STRING_VALUE);
    }

    #[test]
    fn every_raw_value_roundtrips() {
        for raw in 0..=SyntaxKind::ERROR_NODE as u16 {
            match SyntaxKind::from_raw(raw) {
                Some(kind) => {
                    assert_eq!(kind as u16, raw);
                    assert_eq!(SdfLanguage::kind_from_raw(SdfLanguage::kind_to_raw(kind)), kind);
                }
                None => assert_eq!(raw, SyntaxKind::__LAST_TOKEN as u16),
            }
        }
        assert_eq!(SyntaxKind::from_raw(SyntaxKind::ERROR_NODE as u16 + 1), None);
    }
}
