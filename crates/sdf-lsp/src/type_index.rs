//! Index of the types declared across a project.
//!
//! The index is incremental: each file's declarations are replaced whenever
//! that file is reparsed, and nothing is rescanned per query.

use std::collections::BTreeMap;

use sdf_cst::ast::{AstNode, SourceFile};
use sdf_cst::{Parse, SyntaxNode};
use tower_lsp::lsp_types::Url;
use tracing::debug;

/// A declared type, as seen by completion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    pub name: String,
    /// Package of the declaring file; empty when it declares none.
    pub package: String,
    pub is_extendable: bool,
    pub is_embeddable: bool,
    pub is_dictionary: bool,
}

impl TypeDescriptor {
    /// `package.Name`, or just `Name` without a package.
    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }
}

/// Source of declared types for completion.
pub trait TypeRegistry {
    /// All declared types, in a stable order.
    fn declared_types(&self) -> Vec<TypeDescriptor>;
}

impl TypeRegistry for [TypeDescriptor] {
    fn declared_types(&self) -> Vec<TypeDescriptor> {
        self.to_vec()
    }
}

impl TypeRegistry for Vec<TypeDescriptor> {
    fn declared_types(&self) -> Vec<TypeDescriptor> {
        self.clone()
    }
}

/// Declared types per file.
#[derive(Debug, Default)]
pub struct TypeIndex {
    files: BTreeMap<Url, Vec<TypeDescriptor>>,
}

impl TypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the declarations recorded for `uri`.
    pub fn update(&mut self, uri: Url, parse: &Parse) {
        let types = types_of(&parse.syntax());
        debug!(%uri, types = types.len(), "indexed file");
        self.files.insert(uri, types);
    }

    /// Forget a file. Returns whether it was indexed.
    pub fn remove(&mut self, uri: &Url) -> bool {
        self.files.remove(uri).is_some()
    }

    /// Number of indexed files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl TypeRegistry for TypeIndex {
    fn declared_types(&self) -> Vec<TypeDescriptor> {
        self.files.values().flatten().cloned().collect()
    }
}

/// The package a file declares, or an empty string.
///
/// Only a package declaration at the top of the file counts; comments before
/// it are fine.
pub fn package_of(root: &SyntaxNode) -> String {
    SourceFile::cast(root.clone())
        .and_then(|file| file.package_name())
        .unwrap_or_default()
}

/// Descriptors for every named type declared in a file.
pub fn types_of(root: &SyntaxNode) -> Vec<TypeDescriptor> {
    let Some(file) = SourceFile::cast(root.clone()) else {
        return Vec::new();
    };
    let package = file.package_name().unwrap_or_default();

    file.types()
        .filter_map(|ty| {
            Some(TypeDescriptor {
                name: ty.name()?,
                package: package.clone(),
                is_extendable: ty.has_modifier("extendable"),
                is_embeddable: ty.has_modifier("embeddable"),
                is_dictionary: ty.has_modifier("dictionary"),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(name: &str) -> Url {
        Url::parse(&format!("file:///project/{name}")).unwrap()
    }

    #[test]
    fn test_package_of() {
        let parse = sdf_cst::parse("// header\npackage sample;\ntype A {}");
        assert_eq!(package_of(&parse.syntax()), "sample");

        let parse = sdf_cst::parse("type A {}");
        assert_eq!(package_of(&parse.syntax()), "");
    }

    #[test]
    fn test_types_of_reads_flags() {
        let parse = sdf_cst::parse(
            "package sample;\n\ndictionary\ntype Color { Id: int <auto>; }\n\nextendable embeddable\ntype Base { ... }\n\ntype {}\n",
        );
        let types = types_of(&parse.syntax());
        assert_eq!(types.len(), 2);

        assert_eq!(types[0].name, "Color");
        assert_eq!(types[0].package, "sample");
        assert!(types[0].is_dictionary);
        assert!(!types[0].is_extendable);

        assert_eq!(types[1].qualified_name(), "sample.Base");
        assert!(types[1].is_extendable);
        assert!(types[1].is_embeddable);
    }

    #[test]
    fn test_update_replaces_and_remove_forgets() {
        let mut index = TypeIndex::new();
        index.update(uri("b.sdf"), &sdf_cst::parse("package b;\ntype B {}"));
        index.update(uri("a.sdf"), &sdf_cst::parse("package a;\ntype A1 {}\ntype A2 {}"));

        let names: Vec<_> = index
            .declared_types()
            .into_iter()
            .map(|t| t.qualified_name())
            .collect();
        assert_eq!(names, vec!["a.A1", "a.A2", "b.B"]);

        index.update(uri("a.sdf"), &sdf_cst::parse("package a;\ntype A3 {}"));
        let names: Vec<_> = index.declared_types().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["A3", "B"]);

        assert!(index.remove(&uri("a.sdf")));
        assert!(!index.remove(&uri("a.sdf")));
        assert_eq!(index.len(), 1);
        assert!(index.remove(&uri("b.sdf")));
        assert!(index.is_empty());
    }
}
