//! Fixed keyword vocabularies of the schema language.
//!
//! The parser uses these to decide which identifiers become keyword tokens,
//! and the completion tables in `sdf-lsp` list them in this order.

/// Modifiers that may precede `type` in a declaration.
pub const TYPE_MODIFIERS: &[&str] = &[
    "dictionary",
    "abstract",
    "config",
    "transient",
    "embeddable",
    "singleton",
    "extern",
    "extendable",
];

/// Field kinds allowed inside a field's `< ... >` bracket.
pub const FIELD_KINDS: &[&str] = &[
    "id",
    "auto",
    "lookup",
    "embedded",
    "calculated",
    "ref-embedded",
    "one-to-many",
];

/// Built-in scalar types.
pub const PRIMITIVE_TYPES: &[&str] = &["int", "float", "bool", "string", "date"];

/// Key types accepted by `map[K]V`.
pub const MAP_KEY_TYPES: &[&str] = &["int", "string"];

pub fn is_type_modifier(word: &str) -> bool {
    TYPE_MODIFIERS.contains(&word)
}

pub fn is_field_kind(word: &str) -> bool {
    FIELD_KINDS.contains(&word)
}

pub fn is_primitive_type(word: &str) -> bool {
    PRIMITIVE_TYPES.contains(&word)
}
