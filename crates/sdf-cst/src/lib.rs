//! Lossless Concrete Syntax Tree for SDF schema files.
//!
//! This crate provides a CST representation of SDF documents using the
//! [rowan](https://docs.rs/rowan) library. The tree preserves all source
//! information including whitespace, comments, and exact token positions,
//! and the parser always produces one, even for half-typed input. That makes
//! it the basis for the language server's completion and highlighting.
//!
//! # Example
//!
//! ```
//! use sdf_cst::{parse, ast::{AstNode, SourceFile}};
//!
//! let source = r#"
//! package sample;
//!
//! dictionary
//! type Color {
//!   Id: int <auto>;
//!   Name: string <$js(title)>;
//! }
//! "#;
//!
//! let parsed = parse(source);
//! assert!(parsed.is_ok());
//!
//! let file = SourceFile::cast(parsed.syntax()).unwrap();
//! assert_eq!(file.package_name().as_deref(), Some("sample"));
//! for ty in file.types() {
//!     println!("Found type: {:?}", ty.name());
//! }
//!
//! // Roundtrip: source can be exactly reconstructed
//! assert_eq!(parsed.syntax().to_string(), source);
//! ```

pub mod ast;
mod diagnostic;
pub mod keywords;
pub mod parser;
pub mod syntax_kind;

pub use parser::{Parse, ParseError, parse};
pub use syntax_kind::{SdfLanguage, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

// Re-export rowan types for convenience
pub use rowan::{Direction, TextRange, TextSize, TokenAtOffset};
