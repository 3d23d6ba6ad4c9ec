//! The fixed completion vocabulary: modifiers, hooks, annotation tags, and
//! the parameters and values each annotation accepts.
//!
//! Tags are stored without their sigil; lookups by tag take the tag as
//! written in source (`$vue`), sigil included.

use sdf_cst::keywords;

use super::{ModifierLevel, TagKind};

/// What may open a type declaration, in the order it is offered.
pub const DECLARATION_KEYWORDS: &[&str] = &[
    "type",
    "dictionary",
    "abstract",
    "config",
    "transient",
    "embeddable",
    "singleton",
    "extern",
    "extendable",
];

pub const TYPE_ANNOTATIONS: &[&str] = &[
    "vue", "gql", "db", "mongo", "find", "go", "js", "gotags", "config", "deletable",
];

pub const TYPE_HOOKS: &[&str] = &["create", "change", "start", "time=\"@every 1m -> fnname\""];

pub const FIELD_ANNOTATIONS: &[&str] = &[
    "vue",
    "gql",
    "historic",
    "db",
    "mongo",
    "js",
    "config",
    "find",
    "qualifier",
    "qualified-by",
];

pub const FIELD_HOOKS: &[&str] = &["set", "resolve"];

/// Annotations that only make sense on methods.
pub const METHOD_ANNOTATIONS: &[&str] = &["call", "gql"];

/// Field kinds offered inside `< ... >`.
pub const FIELD_KINDS: &[&str] = keywords::FIELD_KINDS;

pub const PRIMITIVE_TYPES: &[&str] = keywords::PRIMITIVE_TYPES;

pub const COLLECTION_SHORTHANDS: &[&str] = &["map[]", "[]"];

const TAG_PARAMS: &[(&str, &[&str])] = &[
    ("go", &["name", "attr-name"]),
    ("ghl", &["name", "skip"]),
    ("historic", &["fields"]),
    ("vue", &["ignore", "type"]),
    ("find", &["field", "type"]),
    ("call", &["name", "js"]),
    ("config", &["value", "group", "mutable"]),
    ("deletable", &["field", "ignore"]),
    ("js", &["name", "skip", "title", "icon", "force", "color"]),
];

const PARAM_VALUES: &[(&str, &str, &[&str])] = &[
    ("vue", "type", &["isodate", "date", "custom", "value"]),
    ("historic", "fields", &["timestamp", "uid", "uname", "source"]),
    ("find", "field", &["_deleted_"]),
    (
        "find",
        "type",
        &[
            "eq",
            "ne",
            "gt",
            "gte",
            "lt",
            "lte",
            "starts-with",
            "contains",
            "ignore",
            "is-null",
        ],
    ),
    ("call", "js", BOOLEAN_VALUES),
];

pub const BOOLEAN_VALUES: &[&str] = &["true", "false"];

/// Parameters that take a boolean by convention, without a table entry.
const BOOLEAN_PARAMS: &[(&str, &str)] = &[
    ("call", "js"),
    ("vue", "ignore"),
    ("js", "skip"),
    ("js", "force"),
    ("ghl", "skip"),
    ("config", "mutable"),
    ("deletable", "ignore"),
];

fn strip_sigil(tag: &str) -> &str {
    tag.strip_prefix('$').unwrap_or(tag)
}

/// Tags for a modifier of `kind` at `level`, without sigils.
pub fn modifier_tags(level: ModifierLevel, kind: TagKind) -> Vec<&'static str> {
    match (level, kind) {
        (ModifierLevel::Type, TagKind::Hook) => TYPE_HOOKS.to_vec(),
        (ModifierLevel::Type, TagKind::Annotation) => TYPE_ANNOTATIONS.to_vec(),
        (ModifierLevel::Field | ModifierLevel::Method, TagKind::Hook) => FIELD_HOOKS.to_vec(),
        (ModifierLevel::Field, TagKind::Annotation) => FIELD_ANNOTATIONS.to_vec(),
        (ModifierLevel::Method, TagKind::Annotation) => {
            let mut tags = FIELD_ANNOTATIONS.to_vec();
            for &tag in METHOD_ANNOTATIONS {
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
            }
            tags
        }
    }
}

/// Parameter names accepted by an annotation tag. Unknown tags have none.
pub fn params_for_tag(tag: &str) -> &'static [&'static str] {
    let tag = strip_sigil(tag);
    TAG_PARAMS
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, params)| *params)
        .unwrap_or(&[])
}

/// Suggested values for one parameter of an annotation tag.
pub fn values_for_tag_param(tag: &str, param: &str) -> &'static [&'static str] {
    let tag = strip_sigil(tag);
    PARAM_VALUES
        .iter()
        .find(|(t, p, _)| *t == tag && *p == param)
        .map(|(_, _, values)| *values)
        .unwrap_or(&[])
}

pub fn is_boolean_param(tag: &str, param: &str) -> bool {
    let tag = strip_sigil(tag);
    BOOLEAN_PARAMS.iter().any(|&(t, p)| t == tag && p == param)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_find_type_values() {
        assert_eq!(
            values_for_tag_param("$find", "type"),
            &[
                "eq",
                "ne",
                "gt",
                "gte",
                "lt",
                "lte",
                "starts-with",
                "contains",
                "ignore",
                "is-null"
            ]
        );
    }

    #[test]
    fn test_lookups_accept_either_tag_form() {
        assert_eq!(params_for_tag("$vue"), params_for_tag("vue"));
        assert_eq!(params_for_tag("$vue"), &["ignore", "type"]);
        assert!(params_for_tag("$unknown").is_empty());
        assert!(values_for_tag_param("$vue", "ignore").is_empty());
        assert!(values_for_tag_param("$nope", "type").is_empty());
    }

    #[test]
    fn test_every_valued_param_is_listed_for_its_tag() {
        for (tag, param, values) in PARAM_VALUES {
            assert!(
                params_for_tag(tag).contains(param),
                "{tag}.{param} has values but is not a parameter of {tag}"
            );
            assert!(!values.is_empty());
        }
        for (tag, param) in BOOLEAN_PARAMS {
            assert!(params_for_tag(tag).contains(param), "{tag}.{param}");
        }
    }

    #[test]
    fn test_tables_have_no_duplicates() {
        let lists: [&[&str]; 6] = [
            DECLARATION_KEYWORDS,
            TYPE_ANNOTATIONS,
            TYPE_HOOKS,
            FIELD_ANNOTATIONS,
            FIELD_HOOKS,
            FIELD_KINDS,
        ];
        for list in lists {
            let unique: HashSet<_> = list.iter().collect();
            assert_eq!(unique.len(), list.len(), "{list:?}");
        }
        for (_, values) in TAG_PARAMS {
            let unique: HashSet<_> = values.iter().collect();
            assert_eq!(unique.len(), values.len());
        }
        for (_, _, values) in PARAM_VALUES {
            let unique: HashSet<_> = values.iter().collect();
            assert_eq!(unique.len(), values.len());
        }
    }

    #[test]
    fn test_method_annotations_extend_field_set_once() {
        let tags = modifier_tags(ModifierLevel::Method, TagKind::Annotation);
        assert_eq!(tags.len(), FIELD_ANNOTATIONS.len() + 1);
        assert_eq!(tags.last(), Some(&"call"));
        assert_eq!(tags.iter().filter(|t| **t == "gql").count(), 1);
    }

    #[test]
    fn test_declaration_keywords_match_parser_modifiers() {
        for modifier in keywords::TYPE_MODIFIERS {
            assert!(DECLARATION_KEYWORDS.contains(modifier), "{modifier}");
        }
    }
}
