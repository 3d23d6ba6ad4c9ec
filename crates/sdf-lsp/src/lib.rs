//! Language server for SDF schema files.
//!
//! The heart of the crate is [`completion`]: given a document and a byte
//! offset it works out what kind of construct is being typed and offers the
//! matching keywords, hooks, annotations, parameters, values or declared
//! types. The rest wires that engine, and a few smaller editor features,
//! into a tower-lsp server.
//!
//! ```
//! use sdf_lsp::completion::{Candidate, get_completions};
//! use sdf_lsp::type_index::TypeDescriptor;
//!
//! let registry: Vec<TypeDescriptor> = Vec::new();
//! let text = "type Car {\n  Id: int <@>;\n}";
//! let offset = text.find('@').unwrap() + 1;
//! let labels: Vec<String> = get_completions(text, offset, &registry)
//!     .iter()
//!     .map(Candidate::label)
//!     .collect();
//! assert_eq!(labels, ["@set", "@resolve"]);
//! ```

pub mod completion;
pub mod config;
pub mod semantic_tokens;
mod server;
pub mod symbols;
pub mod type_index;
pub mod typing;
pub mod workspace;

pub use server::{SdfLanguageServer, run};
