//! Document outline: the package, its types and their members.

use sdf_cst::ast::{AstNode, Entry, SourceFile, TypeDeclaration};
use sdf_cst::{Parse, SyntaxToken, TextRange};
use tower_lsp::lsp_types::{DocumentSymbol, Range, SymbolKind};

use crate::server::offset_to_position;

/// Outline symbols for a parsed document, in source order.
pub fn document_symbols(parse: &Parse, content: &str) -> Vec<DocumentSymbol> {
    let Some(file) = SourceFile::cast(parse.syntax()) else {
        return Vec::new();
    };

    let mut symbols = Vec::new();

    if let Some(package) = file.package()
        && let Some(name) = package.name_token()
    {
        symbols.push(symbol(
            content,
            name.text().to_string(),
            None,
            SymbolKind::PACKAGE,
            package.syntax().text_range(),
            &name,
            Vec::new(),
        ));
    }

    symbols.extend(file.types().filter_map(|ty| type_symbol(&ty, content)));
    symbols
}

fn type_symbol(ty: &TypeDeclaration, content: &str) -> Option<DocumentSymbol> {
    let name = ty.name_token()?;
    let kind = if ty.has_modifier("dictionary") {
        SymbolKind::ENUM
    } else {
        SymbolKind::CLASS
    };
    let detail = ty.base_type().map(|base| format!("extends {base}"));
    let children = ty
        .entries()
        .filter_map(|entry| entry_symbol(&entry, content))
        .collect();

    Some(symbol(
        content,
        name.text().to_string(),
        detail,
        kind,
        ty.syntax().text_range(),
        &name,
        children,
    ))
}

fn entry_symbol(entry: &Entry, content: &str) -> Option<DocumentSymbol> {
    let name = entry.name_token()?;

    let (kind, detail) = if let Some(method) = entry.method() {
        let params: Vec<String> = method
            .params()
            .map(|p| {
                let ty = p.type_ref().map(|t| t.display()).unwrap_or_default();
                format!("{}: {}", p.name().unwrap_or_default(), ty)
            })
            .collect();
        let mut signature = format!("({})", params.join(", "));
        if let Some(ret) = method.return_type() {
            signature.push_str(": ");
            signature.push_str(&ret.display());
        }
        (SymbolKind::METHOD, Some(signature))
    } else {
        let ty = entry.field().and_then(|f| f.type_ref()).map(|t| t.display());
        (SymbolKind::FIELD, ty)
    };

    Some(symbol(
        content,
        name.text().to_string(),
        detail,
        kind,
        entry.syntax().text_range(),
        &name,
        Vec::new(),
    ))
}

fn symbol(
    content: &str,
    name: String,
    detail: Option<String>,
    kind: SymbolKind,
    range: TextRange,
    name_token: &SyntaxToken,
    children: Vec<DocumentSymbol>,
) -> DocumentSymbol {
    #[allow(deprecated)]
    DocumentSymbol {
        name,
        detail,
        kind,
        tags: None,
        deprecated: None,
        range: lsp_range(content, range),
        selection_range: lsp_range(content, name_token.text_range()),
        children: if children.is_empty() {
            None
        } else {
            Some(children)
        },
    }
}

fn lsp_range(content: &str, range: TextRange) -> Range {
    Range {
        start: offset_to_position(content, range.start().into()),
        end: offset_to_position(content, range.end().into()),
    }
}
