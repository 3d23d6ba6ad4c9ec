//! Tokenizer for SDF schema files.

use crate::{Span, Token, TokenKind};
use tracing::trace;

/// A tokenizer that produces tokens from SDF source text.
///
/// It never fails: anything it does not understand becomes an
/// [`TokenKind::Error`] token covering a single character, and the spans of
/// all produced tokens tile the input without gaps.
#[derive(Clone)]
pub struct Tokenizer<'src> {
    /// The source text being tokenized.
    source: &'src str,
    /// The remaining source text (suffix of `source`).
    remaining: &'src str,
    /// Current byte position in `source`.
    pos: u32,
}

impl<'src> Tokenizer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            remaining: source,
            pos: 0,
        }
    }

    /// Get the current byte position.
    #[inline]
    pub fn position(&self) -> u32 {
        self.pos
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.remaining.is_empty()
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.remaining.chars().next()
    }

    #[inline]
    fn peek_nth(&self, n: usize) -> Option<char> {
        self.remaining.chars().nth(n)
    }

    #[inline]
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8() as u32;
        self.remaining = &self.remaining[c.len_utf8()..];
        Some(c)
    }

    #[inline]
    fn starts_with(&self, prefix: &str) -> bool {
        self.remaining.starts_with(prefix)
    }

    /// Create a token from the given start position to current position.
    fn token(&self, kind: TokenKind, start: u32) -> Token<'src> {
        let span = Span::new(start, self.pos);
        let text = &self.source[start as usize..self.pos as usize];
        trace!("Token {:?} at {:?}: {:?}", kind, span, text);
        Token::new(kind, span, text)
    }

    /// Consume one character and produce a token of `kind` for it.
    fn single(&mut self, kind: TokenKind) -> Token<'src> {
        let start = self.pos;
        self.advance();
        self.token(kind, start)
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Token<'src> {
        let Some(c) = self.peek() else {
            return self.token(TokenKind::Eof, self.pos);
        };

        match c {
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            '<' => self.single(TokenKind::LAngle),
            '>' => self.single(TokenKind::RAngle),
            ':' => self.single(TokenKind::Colon),
            ';' => self.single(TokenKind::Semicolon),
            ',' => self.single(TokenKind::Comma),
            '=' => self.single(TokenKind::Eq),
            '!' => self.single(TokenKind::Bang),
            '@' => self.single(TokenKind::At),
            '$' => self.single(TokenKind::Dollar),

            '.' if self.starts_with("...") => {
                let start = self.pos;
                self.advance();
                self.advance();
                self.advance();
                self.token(TokenKind::Ellipsis, start)
            }

            '"' => self.tokenize_string(),

            '/' if self.starts_with("//") => self.tokenize_line_comment(),
            '#' => self.tokenize_meta_line(),

            ' ' | '\t' => self.tokenize_whitespace(),
            '\n' => self.single(TokenKind::Newline),
            '\r' if self.peek_nth(1) == Some('\n') => {
                let start = self.pos;
                self.advance();
                self.advance();
                self.token(TokenKind::Newline, start)
            }
            '\r' => self.single(TokenKind::Whitespace),

            '-' if self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.tokenize_number()
            }
            _ if c.is_ascii_digit() => self.tokenize_number(),
            _ if is_ident_start(c) => self.tokenize_word(),

            _ => self.single(TokenKind::Error),
        }
    }

    fn tokenize_whitespace(&mut self) -> Token<'src> {
        let start = self.pos;
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.advance();
        }
        self.token(TokenKind::Whitespace, start)
    }

    /// Tokenize an identifier or a dotted qualified name.
    fn tokenize_word(&mut self) -> Token<'src> {
        let start = self.pos;
        let mut kind = TokenKind::Ident;
        loop {
            while self.peek().is_some_and(is_ident_char) {
                self.advance();
            }
            // `pkg.Name` continues only when a name follows the dot
            if self.peek() == Some('.') && self.peek_nth(1).is_some_and(is_ident_start) {
                self.advance();
                kind = TokenKind::QualifiedName;
            } else {
                break;
            }
        }
        self.token(kind, start)
    }

    fn tokenize_number(&mut self) -> Token<'src> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.advance();
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some('.') && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }
        self.token(TokenKind::Number, start)
    }

    /// Tokenize a quoted string: `"..."`. Strings end at the closing quote or
    /// the end of the line; the latter yields an error token.
    fn tokenize_string(&mut self) -> Token<'src> {
        let start = self.pos;
        self.advance();

        loop {
            match self.peek() {
                None | Some('\n') => return self.token(TokenKind::Error, start),
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    if self.peek().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                }
                Some(_) => {
                    self.advance();
                }
            }
        }

        self.token(TokenKind::String, start)
    }

    fn tokenize_line_comment(&mut self) -> Token<'src> {
        let start = self.pos;
        self.skip_to_line_end();
        self.token(TokenKind::LineComment, start)
    }

    fn tokenize_meta_line(&mut self) -> Token<'src> {
        let start = self.pos;
        self.skip_to_line_end();
        self.token(TokenKind::MetaLine, start)
    }

    fn skip_to_line_end(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' || c == '\r' {
                break;
            }
            self.advance();
        }
    }
}

impl<'src> Iterator for Tokenizer<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

/// Check if a character can start an identifier.
pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Check if a character can continue an identifier. Dashes are allowed so
/// that `one-to-many` and `$qualified-by` stay single words.
pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tokenize(source: &str) -> Vec<(TokenKind, &str)> {
        Tokenizer::new(source).map(|t| (t.kind, t.text)).collect()
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(tokenize("{"), vec![(TokenKind::LBrace, "{")]);
        assert_eq!(tokenize("]"), vec![(TokenKind::RBracket, "]")]);
        assert_eq!(tokenize("<"), vec![(TokenKind::LAngle, "<")]);
        assert_eq!(tokenize(";"), vec![(TokenKind::Semicolon, ";")]);
        assert_eq!(tokenize("!"), vec![(TokenKind::Bang, "!")]);
        assert_eq!(tokenize("..."), vec![(TokenKind::Ellipsis, "...")]);
    }

    #[test]
    fn test_sigils_are_separate_tokens() {
        assert_eq!(
            tokenize("@create"),
            vec![(TokenKind::At, "@"), (TokenKind::Ident, "create")]
        );
        assert_eq!(
            tokenize("$qualified-by"),
            vec![(TokenKind::Dollar, "$"), (TokenKind::Ident, "qualified-by")]
        );
        assert_eq!(tokenize("$"), vec![(TokenKind::Dollar, "$")]);
    }

    #[test]
    fn test_words() {
        assert_eq!(tokenize("one-to-many"), vec![(TokenKind::Ident, "one-to-many")]);
        assert_eq!(tokenize("_deleted_"), vec![(TokenKind::Ident, "_deleted_")]);
        assert_eq!(
            tokenize("sample.Foo"),
            vec![(TokenKind::QualifiedName, "sample.Foo")]
        );
        // a trailing dot is not part of the name
        assert_eq!(
            tokenize("sample."),
            vec![(TokenKind::Ident, "sample"), (TokenKind::Error, ".")]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(tokenize("42"), vec![(TokenKind::Number, "42")]);
        assert_eq!(tokenize("-1.5"), vec![(TokenKind::Number, "-1.5")]);
        assert_eq!(
            tokenize("1."),
            vec![(TokenKind::Number, "1"), (TokenKind::Error, ".")]
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            tokenize(r#""@every 1m -> fnname""#),
            vec![(TokenKind::String, r#""@every 1m -> fnname""#)]
        );
        assert_eq!(
            tokenize(r#""with \"escapes\"""#),
            vec![(TokenKind::String, r#""with \"escapes\"""#)]
        );
        assert_eq!(
            tokenize("\"open\nnext"),
            vec![
                (TokenKind::Error, "\"open"),
                (TokenKind::Newline, "\n"),
                (TokenKind::Ident, "next")
            ]
        );
    }

    #[test]
    fn test_comments_and_newlines() {
        assert_eq!(
            tokenize("// header\r\npackage"),
            vec![
                (TokenKind::LineComment, "// header"),
                (TokenKind::Newline, "\r\n"),
                (TokenKind::Ident, "package")
            ]
        );
    }

    #[test]
    fn test_field_entry() {
        assert_eq!(
            tokenize("Id: int <auto>;"),
            vec![
                (TokenKind::Ident, "Id"),
                (TokenKind::Colon, ":"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Ident, "int"),
                (TokenKind::Whitespace, " "),
                (TokenKind::LAngle, "<"),
                (TokenKind::Ident, "auto"),
                (TokenKind::RAngle, ">"),
                (TokenKind::Semicolon, ";"),
            ]
        );
    }

    #[test]
    fn test_meta_lines() {
        assert_eq!(
            tokenize("# go:generate x\n"),
            vec![
                (TokenKind::MetaLine, "# go:generate x"),
                (TokenKind::Newline, "\n")
            ]
        );
    }

    #[test]
    fn test_unknown_characters() {
        assert_eq!(
            tokenize("%é"),
            vec![(TokenKind::Error, "%"), (TokenKind::Error, "é")]
        );
    }

    proptest! {
        #[test]
        fn tokens_tile_the_input(source in "\\PC{0,64}") {
            let mut pos = 0u32;
            for token in Tokenizer::new(&source) {
                prop_assert_eq!(token.span.start, pos);
                prop_assert!(!token.span.is_empty());
                pos = token.span.end;
            }
            prop_assert_eq!(pos as usize, source.len());
        }
    }
}
