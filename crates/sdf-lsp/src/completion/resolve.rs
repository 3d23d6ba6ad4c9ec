//! Turning a completion context into candidates.

use super::table;
use super::{Candidate, CandidateKind, CompletionContext, ModifierLevel, TagKind};
use crate::type_index::TypeRegistry;

/// Candidates for `context`, fixed vocabulary first and declared types after.
///
/// `package` is the package of the file being edited; declared types from
/// other packages are offered qualified as `package.Name`.
pub fn resolve<R>(context: &CompletionContext, package: &str, registry: &R) -> Vec<Candidate>
where
    R: TypeRegistry + ?Sized,
{
    match context {
        CompletionContext::TypeLevelModifier => {
            let mut candidates = plain(table::DECLARATION_KEYWORDS, CandidateKind::Keyword);
            candidates.extend(tags(ModifierLevel::Type, TagKind::Annotation, false));
            candidates.extend(tags(ModifierLevel::Type, TagKind::Hook, false));
            candidates
        }
        CompletionContext::FieldLevelModifier { method } => {
            let level = if *method {
                ModifierLevel::Method
            } else {
                ModifierLevel::Field
            };
            let mut candidates = plain(table::FIELD_KINDS, CandidateKind::FieldKind);
            candidates.extend(tags(level, TagKind::Hook, false));
            candidates.extend(tags(level, TagKind::Annotation, false));
            candidates
        }
        CompletionContext::TypedModifier { level, kind } => tags(*level, *kind, true),
        CompletionContext::TypeReference => type_candidates(package, registry),
        CompletionContext::AnnotationParamName { tag } => {
            plain(table::params_for_tag(tag), CandidateKind::Parameter)
        }
        CompletionContext::AnnotationParamValue { tag, param } => {
            let values = table::values_for_tag_param(tag, param);
            if values.is_empty() && table::is_boolean_param(tag, param) {
                plain(table::BOOLEAN_VALUES, CandidateKind::Value)
            } else {
                plain(values, CandidateKind::Value)
            }
        }
        CompletionContext::Unknown => Vec::new(),
    }
}

fn plain(words: &[&str], kind: CandidateKind) -> Vec<Candidate> {
    words.iter().map(|word| Candidate::plain(*word, kind)).collect()
}

fn tags(level: ModifierLevel, kind: TagKind, sigil_typed: bool) -> Vec<Candidate> {
    table::modifier_tags(level, kind)
        .into_iter()
        .map(|tag| Candidate::tag(tag, kind, sigil_typed))
        .collect()
}

fn type_candidates<R>(package: &str, registry: &R) -> Vec<Candidate>
where
    R: TypeRegistry + ?Sized,
{
    let mut candidates = plain(table::PRIMITIVE_TYPES, CandidateKind::Keyword);
    candidates.extend(plain(table::COLLECTION_SHORTHANDS, CandidateKind::Keyword));

    for ty in registry.declared_types() {
        let text = if ty.package == package {
            ty.name
        } else {
            ty.qualified_name()
        };
        // a type split over several files with `...` is declared more than once
        if candidates
            .iter()
            .any(|c| c.kind == CandidateKind::Type && c.text == text)
        {
            continue;
        }
        candidates.push(Candidate::plain(text, CandidateKind::Type));
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_index::TypeDescriptor;

    fn labels(candidates: &[Candidate]) -> Vec<String> {
        candidates.iter().map(Candidate::label).collect()
    }

    fn descriptor(name: &str, package: &str) -> TypeDescriptor {
        TypeDescriptor {
            name: name.to_string(),
            package: package.to_string(),
            is_extendable: false,
            is_embeddable: false,
            is_dictionary: false,
        }
    }

    const NO_TYPES: &[TypeDescriptor] = &[];

    #[test]
    fn test_type_level_order() {
        let candidates = resolve(&CompletionContext::TypeLevelModifier, "", NO_TYPES);
        insta::assert_debug_snapshot!(labels(&candidates), @r#"
        [
            "type",
            "dictionary",
            "abstract",
            "config",
            "transient",
            "embeddable",
            "singleton",
            "extern",
            "extendable",
            "$vue",
            "$gql",
            "$db",
            "$mongo",
            "$find",
            "$go",
            "$js",
            "$gotags",
            "$config",
            "$deletable",
            "@create",
            "@change",
            "@start",
            "@time=\"@every 1m -> fnname\"",
        ]
        "#);
        assert!(candidates.iter().all(|c| c.insert_text() == c.label()));
    }

    #[test]
    fn test_field_level_set() {
        let candidates = resolve(
            &CompletionContext::FieldLevelModifier { method: false },
            "",
            NO_TYPES,
        );
        let labels = labels(&candidates);
        assert_eq!(labels.len(), 7 + 2 + 10);
        assert_eq!(&labels[..7], table::FIELD_KINDS);
        assert_eq!(&labels[7..9], &["@set", "@resolve"]);
        assert_eq!(labels[9], "$vue");
        assert!(!labels.contains(&"$call".to_string()));
    }

    #[test]
    fn test_method_level_set_adds_call() {
        let candidates = resolve(
            &CompletionContext::FieldLevelModifier { method: true },
            "",
            NO_TYPES,
        );
        let labels = labels(&candidates);
        assert_eq!(labels.last().map(String::as_str), Some("$call"));
        assert_eq!(labels.iter().filter(|l| *l == "$gql").count(), 1);
    }

    #[test]
    fn test_typed_modifier_omits_sigil_from_insert() {
        let candidates = resolve(
            &CompletionContext::TypedModifier {
                level: ModifierLevel::Field,
                kind: TagKind::Hook,
            },
            "",
            NO_TYPES,
        );
        assert_eq!(labels(&candidates), vec!["@set", "@resolve"]);
        let inserts: Vec<_> = candidates.iter().map(Candidate::insert_text).collect();
        assert_eq!(inserts, vec!["set", "resolve"]);
    }

    #[test]
    fn test_params_and_values() {
        let params = resolve(
            &CompletionContext::AnnotationParamName {
                tag: "$config".to_string(),
            },
            "",
            NO_TYPES,
        );
        assert_eq!(labels(&params), vec!["value", "group", "mutable"]);
        assert!(params.iter().all(|c| c.kind == CandidateKind::Parameter));

        let values = |tag: &str, param: &str| {
            labels(&resolve(
                &CompletionContext::AnnotationParamValue {
                    tag: tag.to_string(),
                    param: param.to_string(),
                },
                "",
                NO_TYPES,
            ))
        };
        assert_eq!(values("$historic", "fields"), vec!["timestamp", "uid", "uname", "source"]);
        assert_eq!(values("$find", "field"), vec!["_deleted_"]);
        assert_eq!(values("$config", "mutable"), vec!["true", "false"]);
        assert!(values("$js", "title").is_empty());
        assert!(values("$unknown", "type").is_empty());
    }

    #[test]
    fn test_every_param_resolves_without_panicking() {
        for tag in table::TYPE_ANNOTATIONS
            .iter()
            .chain(table::FIELD_ANNOTATIONS)
            .chain(table::METHOD_ANNOTATIONS)
        {
            let tag = format!("${tag}");
            for param in table::params_for_tag(&tag) {
                let context = CompletionContext::AnnotationParamValue {
                    tag: tag.clone(),
                    param: param.to_string(),
                };
                let first = resolve(&context, "", NO_TYPES);
                assert_eq!(first, resolve(&context, "", NO_TYPES));
            }
        }
    }

    #[test]
    fn test_type_reference_candidates() {
        let registry = vec![
            descriptor("Foo", "sample"),
            descriptor("Foo", "sample"),
            descriptor("Loose", ""),
            descriptor("Bar", "other"),
        ];
        let candidates = resolve(&CompletionContext::TypeReference, "sample", &registry);
        assert_eq!(
            labels(&candidates),
            vec![
                "int", "float", "bool", "string", "date", "map[]", "[]", "Foo", "Loose",
                "other.Bar"
            ]
        );
    }

    #[test]
    fn test_unknown_is_empty() {
        let registry = vec![descriptor("Foo", "sample")];
        assert!(resolve(&CompletionContext::Unknown, "sample", &registry).is_empty());
    }
}
