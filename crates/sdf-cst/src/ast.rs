//! Typed AST wrappers over CST nodes.
//!
//! These provide a more ergonomic API for navigating the syntax tree
//! while still preserving access to the underlying CST for source locations.

use crate::syntax_kind::{SyntaxKind, SyntaxNode, SyntaxToken};

/// Trait for AST nodes that wrap CST nodes.
pub trait AstNode: Sized {
    /// Try to cast a syntax node to this AST type.
    fn cast(node: SyntaxNode) -> Option<Self>;

    /// Get the underlying syntax node.
    fn syntax(&self) -> &SyntaxNode;

    /// Get the source text of this node.
    fn text(&self) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Owned(self.syntax().to_string())
    }
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl AstNode for $name {
            fn cast(node: SyntaxNode) -> Option<Self> {
                if node.kind() == $kind {
                    Some(Self(node))
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

ast_node!(
    /// The root of a schema file.
    SourceFile,
    SyntaxKind::SOURCE_FILE
);

ast_node!(
    /// `package name;`
    PackageDeclaration,
    SyntaxKind::PACKAGE_DECLARATION
);

ast_node!(
    /// `modifiers type Name extends Base { ... }`
    TypeDeclaration,
    SyntaxKind::TYPE_DECLARATION
);

ast_node!(
    /// One type-level modifier: a keyword, a hook, or an annotation.
    TypeModifier,
    SyntaxKind::TYPE_MODIFIER
);

ast_node!(
    /// A field or method inside a type body.
    Entry,
    SyntaxKind::ENTRY
);

ast_node!(Field, SyntaxKind::FIELD);

ast_node!(Method, SyntaxKind::METHOD);

ast_node!(Param, SyntaxKind::PARAM);

ast_node!(
    /// A type expression.
    TypeRef,
    SyntaxKind::TYPE
);

ast_node!(
    /// One item inside a field's `< ... >` bracket.
    AttrModifier,
    SyntaxKind::ATTR_MODIFIER
);

ast_node!(
    /// `$name(values)`
    Annotation,
    SyntaxKind::ANNOTATION
);

ast_node!(
    /// `@name` or `@name="value"`
    HookTag,
    SyntaxKind::HOOK_TAG
);

ast_node!(
    /// `meta(kind)` and its `#` lines.
    MetaDeclaration,
    SyntaxKind::META_DECLARATION
);

/// First direct token child that names something.
fn name_token(node: &SyntaxNode) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| matches!(t.kind(), SyntaxKind::IDENT | SyntaxKind::QUALIFIED_NAME))
}

/// Strip the quotes from a string literal token's text.
fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(text)
}

// === SourceFile ===

impl SourceFile {
    /// The package declaration, if the file opens with one.
    pub fn package(&self) -> Option<PackageDeclaration> {
        self.0.children().next().and_then(PackageDeclaration::cast)
    }

    /// The package name, if declared.
    pub fn package_name(&self) -> Option<String> {
        self.package().and_then(|p| p.name())
    }

    /// Iterate over type declarations.
    pub fn types(&self) -> impl Iterator<Item = TypeDeclaration> {
        self.0
            .children()
            .filter(|n| n.kind() == SyntaxKind::DECLARATION)
            .filter_map(|n| n.children().find_map(TypeDeclaration::cast))
    }

    /// Iterate over meta declarations.
    pub fn metas(&self) -> impl Iterator<Item = MetaDeclaration> {
        self.0
            .children()
            .filter(|n| n.kind() == SyntaxKind::DECLARATION)
            .filter_map(|n| n.children().find_map(MetaDeclaration::cast))
    }
}

// === PackageDeclaration ===

impl PackageDeclaration {
    pub fn name_token(&self) -> Option<SyntaxToken> {
        name_token(&self.0)
    }

    pub fn name(&self) -> Option<String> {
        self.name_token().map(|t| t.text().to_string())
    }
}

// === TypeDeclaration ===

impl TypeDeclaration {
    /// The token holding the type's name.
    pub fn name_token(&self) -> Option<SyntaxToken> {
        name_token(&self.0)
    }

    /// Get the type's name.
    pub fn name(&self) -> Option<String> {
        self.name_token().map(|t| t.text().to_string())
    }

    /// Iterate over the modifiers written before `type`.
    pub fn modifiers(&self) -> impl Iterator<Item = TypeModifier> {
        self.0
            .children()
            .filter(|n| n.kind() == SyntaxKind::TYPE_MODIFIERS)
            .flat_map(|n| n.children())
            .filter_map(TypeModifier::cast)
    }

    /// Whether a modifier keyword (e.g. `dictionary`) is present.
    pub fn has_modifier(&self, keyword: &str) -> bool {
        self.modifiers()
            .any(|m| m.keyword().is_some_and(|k| k == keyword))
    }

    /// Name of the base type after `extends`.
    pub fn base_type(&self) -> Option<String> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::EXTENDS_CLAUSE)
            .and_then(|n| name_token(&n))
            .map(|t| t.text().to_string())
    }

    /// Iterate over entries in the body.
    pub fn entries(&self) -> impl Iterator<Item = Entry> {
        self.0.children().filter_map(Entry::cast)
    }

    /// Whether the body contains `...`, i.e. the type is declared elsewhere too.
    pub fn is_incomplete(&self) -> bool {
        self.0
            .children_with_tokens()
            .any(|e| e.kind() == SyntaxKind::ELLIPSIS)
    }
}

// === TypeModifier ===

impl TypeModifier {
    /// The modifier keyword, if this is one.
    pub fn keyword(&self) -> Option<String> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind() == SyntaxKind::TYPE_MODIFIER_KW)
            .map(|t| t.text().to_string())
    }

    pub fn annotation(&self) -> Option<Annotation> {
        self.0.children().find_map(Annotation::cast)
    }

    pub fn hook(&self) -> Option<HookTag> {
        self.0.children().find_map(HookTag::cast)
    }
}

// === Entry ===

impl Entry {
    pub fn field(&self) -> Option<Field> {
        self.0.children().find_map(Field::cast)
    }

    pub fn method(&self) -> Option<Method> {
        self.0.children().find_map(Method::cast)
    }

    /// Whether this entry declares a method.
    pub fn is_method(&self) -> bool {
        self.method().is_some()
    }

    /// The entry's name token, whether field or method.
    pub fn name_token(&self) -> Option<SyntaxToken> {
        match (self.field(), self.method()) {
            (Some(field), _) => field.name_token(),
            (_, Some(method)) => method.name_token(),
            _ => None,
        }
    }

    /// Items inside the `< ... >` bracket.
    pub fn modifiers(&self) -> impl Iterator<Item = AttrModifier> {
        self.0
            .children()
            .filter(|n| n.kind() == SyntaxKind::ATTR_MODIFIERS)
            .flat_map(|n| n.children())
            .filter_map(AttrModifier::cast)
    }
}

// === Field / Method / Param ===

impl Field {
    pub fn name_token(&self) -> Option<SyntaxToken> {
        name_token(&self.0)
    }

    pub fn name(&self) -> Option<String> {
        self.name_token().map(|t| t.text().to_string())
    }

    pub fn type_ref(&self) -> Option<TypeRef> {
        self.0.children().find_map(TypeRef::cast)
    }
}

impl Method {
    pub fn name_token(&self) -> Option<SyntaxToken> {
        name_token(&self.0)
    }

    pub fn name(&self) -> Option<String> {
        self.name_token().map(|t| t.text().to_string())
    }

    pub fn params(&self) -> impl Iterator<Item = Param> {
        self.0
            .children()
            .filter(|n| n.kind() == SyntaxKind::PARAMS)
            .flat_map(|n| n.children())
            .filter_map(Param::cast)
    }

    /// The type after the closing parenthesis.
    pub fn return_type(&self) -> Option<TypeRef> {
        self.0.children().find_map(TypeRef::cast)
    }
}

impl Param {
    pub fn name(&self) -> Option<String> {
        name_token(&self.0).map(|t| t.text().to_string())
    }

    pub fn type_ref(&self) -> Option<TypeRef> {
        self.0.children().find_map(TypeRef::cast)
    }
}

// === TypeRef ===

impl TypeRef {
    /// Whether the type is marked non-null with `!`.
    pub fn is_required(&self) -> bool {
        self.0
            .children_with_tokens()
            .any(|e| e.kind() == SyntaxKind::BANG)
    }

    /// The type as written, without surrounding trivia.
    pub fn display(&self) -> String {
        self.0
            .descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| !t.kind().is_trivia())
            .map(|t| t.text().to_string())
            .collect()
    }
}

// === AttrModifier ===

impl AttrModifier {
    /// The field kind keyword (`id`, `auto`, ...), if this is one.
    pub fn keyword(&self) -> Option<String> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind() == SyntaxKind::ATTR_MODIFIER_KW)
            .map(|t| t.text().to_string())
    }

    pub fn annotation(&self) -> Option<Annotation> {
        self.0.children().find_map(Annotation::cast)
    }

    pub fn hook(&self) -> Option<HookTag> {
        self.0.children().find_map(HookTag::cast)
    }
}

// === Annotation ===

impl Annotation {
    /// The tag including its sigil, e.g. `$vue`.
    pub fn tag(&self) -> Option<String> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::ANNOTATION_TAG)
            .map(|n| n.text().to_string())
    }

    /// Positional values, in order.
    pub fn values(&self) -> Vec<String> {
        self.value_nodes()
            .filter(|n| n.children().next().is_none())
            .map(|n| n.text().to_string())
            .collect()
    }

    /// `name=value` pairs, in order. Unquoted for string values.
    pub fn params(&self) -> Vec<(String, String)> {
        self.value_nodes()
            .flat_map(|n| n.children())
            .filter(|n| n.kind() == SyntaxKind::ANN_PARAM)
            .filter_map(|param| {
                let name = param
                    .children()
                    .find(|n| n.kind() == SyntaxKind::ANN_PARAM_NAME)?;
                let value = param
                    .children()
                    .find(|n| n.kind() == SyntaxKind::ANN_PARAM_VALUE)
                    .map(|n| unquote(n.text().to_string().trim()).to_string())
                    .unwrap_or_default();
                Some((unquote(name.text().to_string().trim()).to_string(), value))
            })
            .collect()
    }

    fn value_nodes(&self) -> impl Iterator<Item = SyntaxNode> {
        self.0
            .children()
            .filter(|n| n.kind() == SyntaxKind::ANNOTATION_VALUES)
            .flat_map(|n| n.children())
            .filter(|n| n.kind() == SyntaxKind::ANNOTATION_VALUE)
    }
}

// === HookTag ===

impl HookTag {
    /// The hook name including its sigil, e.g. `@create`.
    pub fn tag(&self) -> String {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .take_while(|t| t.kind() != SyntaxKind::EQ && !t.kind().is_trivia())
            .filter(|t| matches!(t.kind(), SyntaxKind::AT | SyntaxKind::IDENT | SyntaxKind::QUALIFIED_NAME))
            .take(2)
            .map(|t| t.text().to_string())
            .collect()
    }

    /// The string assigned with `=`, unquoted.
    pub fn value(&self) -> Option<String> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind() == SyntaxKind::STRING_VALUE)
            .map(|t| unquote(t.text()).to_string())
    }
}

// === MetaDeclaration ===

impl MetaDeclaration {
    /// The kind in parentheses, e.g. `go`.
    pub fn kind(&self) -> Option<String> {
        name_token(&self.0).map(|t| t.text().to_string())
    }

    /// Meta lines without the leading `#`.
    pub fn lines(&self) -> Vec<String> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind() == SyntaxKind::META_LINE)
            .map(|t| t.text().trim_start_matches('#').trim().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn source_file(source: &str) -> SourceFile {
        let parse = parse(source);
        assert!(parse.is_ok(), "parse errors: {:?}", parse.errors());
        SourceFile::cast(parse.syntax()).unwrap()
    }

    #[test]
    fn test_package_and_types() {
        let file = source_file(
            "package sample;\n\ndictionary\ntype Dict { Id: int <auto>; }\ntype Other extends Dict { ... }",
        );
        assert_eq!(file.package_name().as_deref(), Some("sample"));

        let types: Vec<_> = file.types().collect();
        assert_eq!(types.len(), 2);
        assert_eq!(types[0].name().as_deref(), Some("Dict"));
        assert!(types[0].has_modifier("dictionary"));
        assert!(!types[0].is_incomplete());
        assert_eq!(types[1].base_type().as_deref(), Some("Dict"));
        assert!(types[1].is_incomplete());
    }

    #[test]
    fn test_package_must_come_first() {
        let file = source_file("type A {}\npackage late;");
        assert_eq!(file.package_name(), None);
    }

    #[test]
    fn test_entries() {
        let file = source_file(
            "type A {\n  Name: [string]! <$js(title) @set>;\n  find(q: string, n: int): [A];\n}",
        );
        let ty = file.types().next().unwrap();
        let entries: Vec<_> = ty.entries().collect();
        assert_eq!(entries.len(), 2);

        let field = entries[0].field().unwrap();
        assert_eq!(field.name().as_deref(), Some("Name"));
        let ty_ref = field.type_ref().unwrap();
        assert_eq!(ty_ref.display(), "[string]!");
        assert!(ty_ref.is_required());

        let modifiers: Vec<_> = entries[0].modifiers().collect();
        assert_eq!(modifiers.len(), 2);
        let annotation = modifiers[0].annotation().unwrap();
        assert_eq!(annotation.tag().as_deref(), Some("$js"));
        assert_eq!(annotation.values(), vec!["title".to_string()]);
        assert_eq!(modifiers[1].hook().unwrap().tag(), "@set");

        assert!(entries[1].is_method());
        let method = entries[1].method().unwrap();
        let params: Vec<_> = method.params().filter_map(|p| p.name()).collect();
        assert_eq!(params, vec!["q", "n"]);
        assert_eq!(method.return_type().unwrap().display(), "[A]");
    }

    #[test]
    fn test_annotation_params() {
        let file = source_file(
            "$vue-tabs(first second)\ntype A { B: int <$vue-tab(first name=\"Name\" order=1)>; }",
        );
        let ty = file.types().next().unwrap();
        let modifier = ty.modifiers().next().unwrap();
        assert_eq!(
            modifier.annotation().unwrap().values(),
            vec!["first".to_string(), "second".to_string()]
        );

        let entry = ty.entries().next().unwrap();
        let annotation = entry.modifiers().find_map(|m| m.annotation()).unwrap();
        assert_eq!(
            annotation.params(),
            vec![
                ("name".to_string(), "Name".to_string()),
                ("order".to_string(), "1".to_string())
            ]
        );
    }

    #[test]
    fn test_hook_value_and_meta() {
        let file = source_file("meta(go)\n# import \"time\"\n@time=\"@every 1m -> tick\"\ntype A {}");
        let meta = file.metas().next().unwrap();
        assert_eq!(meta.kind().as_deref(), Some("go"));
        assert_eq!(meta.lines(), vec!["import \"time\"".to_string()]);

        let hook = file.types().next().unwrap().modifiers().next().unwrap().hook().unwrap();
        assert_eq!(hook.tag(), "@time");
        assert_eq!(hook.value().as_deref(), Some("@every 1m -> tick"));
    }
}
