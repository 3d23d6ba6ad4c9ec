//! Edits applied while typing.
//!
//! Typing `<` after a field or method type opens a modifier bracket; the
//! closing `>` is inserted right away, and the entry's `;` too when the
//! line doesn't have one yet.

/// Bracket pairs the editor should auto-close and match.
pub const BRACE_PAIRS: &[(char, char)] = &[('{', '}'), ('[', ']'), ('(', ')'), ('<', '>')];

/// Prefix of a line comment.
pub const COMMENT_PREFIX: &str = "//";

/// An insertion at a byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub offset: usize,
    pub insert: String,
}

/// Edits to apply after `ch` was typed; `offset` is the byte offset right
/// after the typed character.
pub fn on_type(text: &str, offset: usize, ch: char) -> Vec<Edit> {
    if ch != '<' || offset == 0 || offset > text.len() || !text.is_char_boundary(offset) {
        return Vec::new();
    }
    let lt = offset - 1;
    if !text[lt..].starts_with('<') {
        return Vec::new();
    }

    let line_start = text[..lt].rfind('\n').map_or(0, |i| i + 1);
    let line_end = text[offset..].find('\n').map_or(text.len(), |i| offset + i);
    let before = &text[line_start..lt];
    let after = &text[offset..line_end];

    if !follows_type(before) || after.trim_start().starts_with('>') {
        return Vec::new();
    }

    let mut insert = String::from(">");
    if after.trim().is_empty() && has_field_separator(before) {
        insert.push(';');
    }

    vec![Edit { offset, insert }]
}

/// Whether the line so far ends the way a field type or method signature does.
fn follows_type(before: &str) -> bool {
    if before.trim_start().starts_with(COMMENT_PREFIX) {
        return false;
    }
    before
        .trim_end()
        .chars()
        .next_back()
        .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ']' | ')' | '!'))
}

/// A `:` on the line that isn't preceded by a `}`.
fn has_field_separator(before: &str) -> bool {
    match before.find(':') {
        Some(colon) => !before[..colon].contains('}'),
        None => false,
    }
}
