//! Classification of a completion position.
//!
//! The classifier looks at the token under the cursor in a marked tree (see
//! [`super::CompletionCursor`]) and walks outward through its ancestors and
//! backward through its siblings. Rules are tried in a fixed order and the
//! first match wins:
//!
//! 1. a sigil (`@` or `$`) right before the cursor
//! 2. the start of a type declaration
//! 3. a type position (after `:` or `[`)
//! 4. a field's `< ... >` bracket, including annotation arguments
//! 5. a loose token at file level
//!
//! Anything else is [`CompletionContext::Unknown`].

use sdf_cst::{Direction, SyntaxKind, SyntaxNode, SyntaxToken};
use tracing::debug;

/// Which sigil a tag uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    /// `@name`
    Hook,
    /// `$name`
    Annotation,
}

impl TagKind {
    pub fn sigil(self) -> char {
        match self {
            TagKind::Hook => '@',
            TagKind::Annotation => '$',
        }
    }

    pub fn from_sigil(c: char) -> Option<Self> {
        match c {
            '@' => Some(TagKind::Hook),
            '$' => Some(TagKind::Annotation),
            _ => None,
        }
    }
}

/// Where a modifier is being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierLevel {
    /// Before `type`.
    Type,
    /// In a field's `< ... >` bracket.
    Field,
    /// In a method's `< ... >` bracket.
    Method,
}

/// What kind of token is expected at the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionContext {
    /// A declaration keyword or a type-level hook or annotation.
    TypeLevelModifier,
    /// A field kind, hook or annotation inside `< ... >`.
    FieldLevelModifier { method: bool },
    /// The name of a tag whose sigil was just typed.
    TypedModifier { level: ModifierLevel, kind: TagKind },
    /// A type name.
    TypeReference,
    /// A parameter name inside `$tag( ... )`.
    AnnotationParamName { tag: String },
    /// The value of `param=` inside `$tag( ... )`.
    AnnotationParamValue { tag: String, param: String },
    Unknown,
}

/// Classify the position of `token`.
///
/// `typed_sigil` is the sigil found right before the word being completed in
/// the unmarked text. When present it decides between hooks and annotations;
/// the tree only decides the level.
pub fn classify(token: &SyntaxToken, typed_sigil: Option<TagKind>) -> CompletionContext {
    let context = classify_token(token, typed_sigil);
    debug!(token = token.text(), kind = ?token.kind(), ?context, "classified completion position");
    context
}

fn classify_token(token: &SyntaxToken, typed_sigil: Option<TagKind>) -> CompletionContext {
    if is_opaque(token.kind()) {
        return CompletionContext::Unknown;
    }

    if let Some(tree_sigil) = sigil_before(token) {
        return CompletionContext::TypedModifier {
            level: modifier_level(token),
            kind: typed_sigil.unwrap_or(tree_sigil),
        };
    }

    if at_declaration_start(token) {
        if has_ancestor(token, SyntaxKind::ANNOTATION_VALUES) {
            return annotation_argument(token, SyntaxKind::TYPE_MODIFIER)
                .map_or(CompletionContext::Unknown, AnnotationArgument::into_context);
        }
        return CompletionContext::TypeLevelModifier;
    }

    if at_type_position(token) {
        return CompletionContext::TypeReference;
    }

    if let Some(bracket) = ancestor(token, SyntaxKind::ATTR_MODIFIERS) {
        let method = bracket.parent().is_some_and(|entry| is_method_entry(&entry));
        return match annotation_argument(token, SyntaxKind::ENTRY) {
            Some(argument) => argument.into_context(),
            None => CompletionContext::FieldLevelModifier { method },
        };
    }

    file_level_fallback(token)
}

/// Tokens whose content is free text.
fn is_opaque(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::LINE_COMMENT
            | SyntaxKind::STRING_VALUE
            | SyntaxKind::META_LINE
            | SyntaxKind::ERROR
    )
}

fn ancestor(token: &SyntaxToken, kind: SyntaxKind) -> Option<SyntaxNode> {
    token.parent_ancestors().find(|n| n.kind() == kind)
}

fn has_ancestor(token: &SyntaxToken, kind: SyntaxKind) -> bool {
    ancestor(token, kind).is_some()
}

fn parent_is(token: &SyntaxToken, kind: SyntaxKind) -> bool {
    token.parent().is_some_and(|p| p.kind() == kind)
}

fn is_method_entry(node: &SyntaxNode) -> bool {
    node.kind() == SyntaxKind::ENTRY
        && node
            .children()
            .next()
            .is_some_and(|first| first.kind() == SyntaxKind::METHOD)
}

/// The closest token before `token` that is not trivia.
fn previous_significant(token: &SyntaxToken) -> Option<SyntaxToken> {
    let mut current = token.prev_token();
    while let Some(prev) = current {
        if !prev.kind().is_trivia() {
            return Some(prev);
        }
        current = prev.prev_token();
    }
    None
}

// ----------------------------------------------------------------------------
// Rule 1: sigil
// ----------------------------------------------------------------------------

fn sigil_before(token: &SyntaxToken) -> Option<TagKind> {
    match token.prev_token()?.kind() {
        SyntaxKind::AT => Some(TagKind::Hook),
        SyntaxKind::DOLLAR => Some(TagKind::Annotation),
        _ => None,
    }
}

/// Inside `< ... >` means field or method level; reaching a declaration or
/// the file root first means type level.
fn modifier_level(token: &SyntaxToken) -> ModifierLevel {
    for node in token.parent_ancestors() {
        match node.kind() {
            SyntaxKind::ATTR_MODIFIERS => {
                return if node.parent().is_some_and(|entry| is_method_entry(&entry)) {
                    ModifierLevel::Method
                } else {
                    ModifierLevel::Field
                };
            }
            SyntaxKind::DECLARATION
            | SyntaxKind::TYPE_DECLARATION
            | SyntaxKind::TYPE_MODIFIERS
            | SyntaxKind::SOURCE_FILE => return ModifierLevel::Type,
            _ => {}
        }
    }
    ModifierLevel::Type
}

// ----------------------------------------------------------------------------
// Rule 2: declaration start
// ----------------------------------------------------------------------------

fn at_declaration_start(token: &SyntaxToken) -> bool {
    parent_is(token, SyntaxKind::DECLARATION)
        || token
            .parent_ancestors()
            .any(|n| matches!(n.kind(), SyntaxKind::TYPE_MODIFIERS | SyntaxKind::TYPE_MODIFIER))
        || token
            .siblings_with_tokens(Direction::Prev)
            .skip(1)
            .find(|e| !e.kind().is_whitespace())
            .is_some_and(|e| e.kind() == SyntaxKind::TYPE_MODIFIER)
}

// ----------------------------------------------------------------------------
// Rule 3: type position
// ----------------------------------------------------------------------------

fn at_type_position(token: &SyntaxToken) -> bool {
    if parent_is(token, SyntaxKind::TYPE) {
        return true;
    }
    // `:` also separates a tag from its spec (`@set:fn`), which is no type
    previous_significant(token).is_some_and(|prev| {
        matches!(prev.kind(), SyntaxKind::COLON | SyntaxKind::L_BRACKET)
            && !prev
                .parent()
                .is_some_and(|p| matches!(p.kind(), SyntaxKind::HOOK_TAG | SyntaxKind::ANNOTATION))
    })
}

// ----------------------------------------------------------------------------
// Rule 4: annotation arguments
// ----------------------------------------------------------------------------

/// The annotation whose argument list holds the cursor.
#[derive(Debug)]
struct AnnotationArgument {
    tag: String,
    /// Name of the parameter whose value is being written, if any.
    param: Option<String>,
}

impl AnnotationArgument {
    fn into_context(self) -> CompletionContext {
        match self.param {
            Some(param) => CompletionContext::AnnotationParamValue { tag: self.tag, param },
            None => CompletionContext::AnnotationParamName { tag: self.tag },
        }
    }
}

/// Walk up from `token` to the enclosing argument list, stopping at `stop`.
fn annotation_argument(token: &SyntaxToken, stop: SyntaxKind) -> Option<AnnotationArgument> {
    let mut in_param_name = false;
    let mut param = None;

    for node in token.parent_ancestors() {
        match node.kind() {
            SyntaxKind::ANN_PARAM_NAME => in_param_name = true,
            // the name itself is being typed, so there is no value slot yet
            SyntaxKind::ANN_PARAM if !in_param_name => {
                param = node
                    .children()
                    .find(|n| n.kind() == SyntaxKind::ANN_PARAM_NAME)
                    .map(|n| n.text().to_string().trim().to_string());
            }
            SyntaxKind::ANNOTATION_VALUES => {
                let tag = node
                    .parent()
                    .filter(|p| p.kind() == SyntaxKind::ANNOTATION)?
                    .children()
                    .find(|n| n.kind() == SyntaxKind::ANNOTATION_TAG)?
                    .text()
                    .to_string();
                return Some(AnnotationArgument { tag, param });
            }
            kind if kind == stop => return None,
            _ => {}
        }
    }
    None
}

// ----------------------------------------------------------------------------
// Rule 5: file level
// ----------------------------------------------------------------------------

/// Scan backward from a token sitting directly in the file root.
///
/// Two possibilities are tracked: the token may start a declaration (until a
/// `:` or an angle bracket is crossed) or it may be a type (only if the first
/// significant token before it is `:` or `[`). Reaching the start of the file
/// while a declaration is still possible counts as a declaration start.
fn file_level_fallback(token: &SyntaxToken) -> CompletionContext {
    if !parent_is(token, SyntaxKind::SOURCE_FILE) {
        return CompletionContext::Unknown;
    }

    let mut can_declare = true;
    let mut can_be_type = true;

    for element in token.siblings_with_tokens(Direction::Prev).skip(1) {
        let kind = element.kind();

        if can_declare
            && matches!(
                kind,
                SyntaxKind::TYPE_MODIFIER
                    | SyntaxKind::DECLARATION
                    | SyntaxKind::PACKAGE_DECLARATION
            )
        {
            return CompletionContext::TypeLevelModifier;
        }
        if matches!(kind, SyntaxKind::COLON | SyntaxKind::L_ANGLE | SyntaxKind::R_ANGLE) {
            can_declare = false;
        }

        if can_be_type {
            if matches!(kind, SyntaxKind::COLON | SyntaxKind::L_BRACKET) {
                return CompletionContext::TypeReference;
            }
            if !kind.is_whitespace() {
                can_be_type = false;
            }
        }

        if !can_declare && !can_be_type {
            return CompletionContext::Unknown;
        }
    }

    if can_declare {
        CompletionContext::TypeLevelModifier
    } else {
        CompletionContext::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::super::CompletionCursor;
    use super::*;

    /// Classify at the position of `|` in `source`.
    fn context_at(source: &str) -> CompletionContext {
        let offset = source.find('|').expect("source has a cursor marker");
        let text = source.replacen('|', "", 1);
        CompletionCursor::new(&text, offset).context()
    }

    fn value(tag: &str, param: &str) -> CompletionContext {
        CompletionContext::AnnotationParamValue {
            tag: tag.to_string(),
            param: param.to_string(),
        }
    }

    fn name(tag: &str) -> CompletionContext {
        CompletionContext::AnnotationParamName {
            tag: tag.to_string(),
        }
    }

    #[test]
    fn test_empty_file_is_declaration_start() {
        assert_eq!(context_at("|"), CompletionContext::TypeLevelModifier);
        assert_eq!(context_at("   |"), CompletionContext::TypeLevelModifier);
    }

    #[test]
    fn test_after_declarations() {
        assert_eq!(
            context_at("package sample;\n\n|"),
            CompletionContext::TypeLevelModifier
        );
        assert_eq!(
            context_at("type A {\n}\n|"),
            CompletionContext::TypeLevelModifier
        );
        assert_eq!(
            context_at("dictionary\n|"),
            CompletionContext::TypeLevelModifier
        );
        assert_eq!(
            context_at("dictionary\n|\ntype A {}"),
            CompletionContext::TypeLevelModifier
        );
        assert_eq!(
            context_at("|\ntype A {}"),
            CompletionContext::TypeLevelModifier
        );
        assert_eq!(context_at("sing|"), CompletionContext::TypeLevelModifier);
    }

    #[test]
    fn test_sigil_at_file_level() {
        let hook = CompletionContext::TypedModifier {
            level: ModifierLevel::Type,
            kind: TagKind::Hook,
        };
        assert_eq!(context_at("@|"), hook);
        assert_eq!(context_at("package p;\n@cr|"), hook);
        assert_eq!(context_at("@|\ntype A {}"), hook);
        assert_eq!(
            context_at("dictionary\n$|"),
            CompletionContext::TypedModifier {
                level: ModifierLevel::Type,
                kind: TagKind::Annotation,
            }
        );
    }

    #[test]
    fn test_sigil_in_bracket() {
        assert_eq!(
            context_at("type A {\n  Id: int <$|>;\n}"),
            CompletionContext::TypedModifier {
                level: ModifierLevel::Field,
                kind: TagKind::Annotation,
            }
        );
        assert_eq!(
            context_at("type A {\n  Id: int <id @re|"),
            CompletionContext::TypedModifier {
                level: ModifierLevel::Field,
                kind: TagKind::Hook,
            }
        );
        assert_eq!(
            context_at("type A {\n  load(): [A] <$|>;\n}"),
            CompletionContext::TypedModifier {
                level: ModifierLevel::Method,
                kind: TagKind::Annotation,
            }
        );
    }

    #[test]
    fn test_type_positions() {
        assert_eq!(context_at("type A {\n  Id: |"), CompletionContext::TypeReference);
        assert_eq!(context_at("type A {\n  Id: in|;\n}"), CompletionContext::TypeReference);
        assert_eq!(context_at("type A {\n  Ids: [|"), CompletionContext::TypeReference);
        assert_eq!(
            context_at("type A {\n  M: map[string]|"),
            CompletionContext::TypeReference
        );
        assert_eq!(
            context_at("type A {\n  find(q: |): A;\n}"),
            CompletionContext::TypeReference
        );
        assert_eq!(
            context_at("type A {\n  find(q: string): |\n}"),
            CompletionContext::TypeReference
        );
        assert_eq!(context_at("Id: |"), CompletionContext::TypeReference);
    }

    #[test]
    fn test_field_bracket() {
        assert_eq!(
            context_at("type A {\n  Id: int <|>;\n}"),
            CompletionContext::FieldLevelModifier { method: false }
        );
        assert_eq!(
            context_at("type A {\n  Id: int <id |"),
            CompletionContext::FieldLevelModifier { method: false }
        );
        assert_eq!(
            context_at("type A {\n  load(): A <|>;\n}"),
            CompletionContext::FieldLevelModifier { method: true }
        );
    }

    #[test]
    fn test_annotation_arguments_in_bracket() {
        assert_eq!(
            context_at("type A {\n  D: date <$vue(type=|)>;\n}"),
            value("$vue", "type")
        );
        assert_eq!(
            context_at("type A {\n  D: date <$vue(type=|"),
            value("$vue", "type")
        );
        assert_eq!(
            context_at("type A {\n  D: date <$find(field=_deleted_ type=l|)>;\n}"),
            value("$find", "type")
        );
        assert_eq!(context_at("type A {\n  D: date <$vue(|)>;\n}"), name("$vue"));
        assert_eq!(context_at("type A {\n  D: date <$vue(ty|=date)>;\n}"), name("$vue"));
        assert_eq!(
            context_at("type A {\n  D: date <$js(title |)>;\n}"),
            name("$js")
        );
    }

    #[test]
    fn test_annotation_arguments_on_types() {
        assert_eq!(context_at("$vue(|)\ntype A {}"), name("$vue"));
        assert_eq!(
            context_at("$historic(fields=|)\ntype A {}"),
            value("$historic", "fields")
        );
        assert_eq!(context_at("package p;\n$find(type=|"), value("$find", "type"));
    }

    #[test]
    fn test_unknown_positions() {
        assert_eq!(context_at("// comm|ent"), CompletionContext::Unknown);
        assert_eq!(context_at("type |"), CompletionContext::Unknown);
        assert_eq!(context_at("type A {\n  |"), CompletionContext::Unknown);
        assert_eq!(
            context_at("@time=\"@every |\"\ntype A {}"),
            CompletionContext::Unknown
        );
        assert_eq!(context_at("<id>\n|"), CompletionContext::Unknown);
    }
}
