//! Context-sensitive completion for SDF schema files.
//!
//! A request goes through three steps:
//!
//! - [`CompletionCursor`] splices a placeholder word into the text at the
//!   cursor and reparses, so there is always a concrete token to classify,
//!   even in an empty file or right after a sigil.
//! - [`classify`] turns that token into a [`CompletionContext`].
//! - [`resolve`] turns the context into candidates, consulting the fixed
//!   vocabulary in [`table`] and the declared types of the project.
//!
//! Nothing here fails: any position that cannot be classified yields no
//! candidates.

mod context;
mod resolve;
pub mod table;

pub use context::{CompletionContext, ModifierLevel, TagKind, classify};
pub use resolve::resolve;

use sdf_cst::{Parse, SyntaxToken, TextSize};

use crate::type_index::{TypeRegistry, package_of};

/// Placeholder spliced in at the cursor before reparsing.
pub const COMPLETION_MARKER: &str = "sdfCompletionMarker";

/// Category of a candidate, used to pick an editor icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateKind {
    Keyword,
    FieldKind,
    Hook,
    Annotation,
    Parameter,
    Value,
    Type,
}

/// One completion suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// The suggestion without any sigil.
    pub text: String,
    /// The sigil that belongs in front of `text`, if any.
    pub sigil: Option<TagKind>,
    /// Whether the user already typed the sigil.
    pub sigil_typed: bool,
    pub kind: CandidateKind,
}

impl Candidate {
    pub fn plain(text: impl Into<String>, kind: CandidateKind) -> Self {
        Self {
            text: text.into(),
            sigil: None,
            sigil_typed: false,
            kind,
        }
    }

    pub fn tag(text: impl Into<String>, sigil: TagKind, sigil_typed: bool) -> Self {
        let kind = match sigil {
            TagKind::Hook => CandidateKind::Hook,
            TagKind::Annotation => CandidateKind::Annotation,
        };
        Self {
            text: text.into(),
            sigil: Some(sigil),
            sigil_typed,
            kind,
        }
    }

    /// The suggestion as displayed, sigil included.
    pub fn label(&self) -> String {
        match self.sigil {
            Some(sigil) => format!("{}{}", sigil.sigil(), self.text),
            None => self.text.clone(),
        }
    }

    /// The text to insert: the label minus a sigil that is already there.
    pub fn insert_text(&self) -> String {
        if self.sigil_typed {
            self.text.clone()
        } else {
            self.label()
        }
    }
}

/// The position of a completion request, resolved against a marked tree.
pub struct CompletionCursor {
    marked: Parse,
    offset: usize,
    typed_sigil: Option<TagKind>,
}

impl CompletionCursor {
    /// Prepare a completion at byte `offset` of `text`.
    ///
    /// Offsets past the end clamp to the end; offsets inside a character snap
    /// back to its start.
    pub fn new(text: &str, offset: usize) -> Self {
        let offset = char_boundary_at_or_before(text, offset);

        let mut marked = String::with_capacity(text.len() + COMPLETION_MARKER.len());
        marked.push_str(&text[..offset]);
        marked.push_str(COMPLETION_MARKER);
        marked.push_str(&text[offset..]);

        Self {
            marked: sdf_cst::parse(&marked),
            offset,
            typed_sigil: sigil_before_word(text, offset),
        }
    }

    /// The token holding the placeholder.
    pub fn token(&self) -> Option<SyntaxToken> {
        let inside_marker = TextSize::from((self.offset + 1) as u32);
        self.marked
            .syntax()
            .token_at_offset(inside_marker)
            .right_biased()
    }

    pub fn context(&self) -> CompletionContext {
        self.token()
            .map_or(CompletionContext::Unknown, |token| {
                classify(&token, self.typed_sigil)
            })
    }
}

fn char_boundary_at_or_before(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Look at the raw text, not the tree: the character before the word that
/// ends at `offset`.
fn sigil_before_word(text: &str, offset: usize) -> Option<TagKind> {
    text[..offset]
        .trim_end_matches(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        .chars()
        .next_back()
        .and_then(TagKind::from_sigil)
}

/// Completion candidates at byte `offset` of `text`, in presentation order.
pub fn get_completions<R>(text: &str, offset: usize, registry: &R) -> Vec<Candidate>
where
    R: TypeRegistry + ?Sized,
{
    let cursor = CompletionCursor::new(text, offset);
    let context = cursor.context();
    let package = package_of(&sdf_cst::parse(text).syntax());
    resolve(&context, &package, registry)
}
