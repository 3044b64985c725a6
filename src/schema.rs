//! Schemas: tag handles, the tag table and implicit tag resolution.
//!
//! Three schemas are built in. The failsafe schema knows only strings, sequences and mappings.
//! The JSON schema adds null, bool, int and float and requires every plain scalar to be one of
//! them in strict JSON spelling. The core schema (the default) accepts the friendlier YAML
//! spellings and falls back to string.

use std::sync::LazyLock;

use ahash::AHashMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::node::{Node, NodeTag};
use crate::tags::{TAG_PREFIX, Tag};

/// Which built-in schema to load with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaKind {
    Failsafe,
    Json,
    #[default]
    Core,
}

static JSON_NULL: LazyLock<Regex> = LazyLock::new(|| regex(r"^null$"));
static JSON_BOOL: LazyLock<Regex> = LazyLock::new(|| regex(r"^(true|false)$"));
static JSON_INT: LazyLock<Regex> = LazyLock::new(|| regex(r"^-?(0|[1-9][0-9]*)$"));
static JSON_FLOAT: LazyLock<Regex> =
    LazyLock::new(|| regex(r"^-?(0|[1-9][0-9]*)(\.[0-9]*)?([eE][-+]?[0-9]+)?$"));

static CORE_NULL: LazyLock<Regex> = LazyLock::new(|| regex(r"^(null|Null|NULL|~)?$"));
static CORE_BOOL: LazyLock<Regex> = LazyLock::new(|| regex(r"^(true|True|TRUE|false|False|FALSE)$"));
static CORE_INT: LazyLock<Regex> =
    LazyLock::new(|| regex(r"^([-+]?[0-9]+|0o[0-7]+|0x[0-9a-fA-F]+)$"));
static CORE_FLOAT: LazyLock<Regex> = LazyLock::new(|| {
    regex(r"^([-+]?(\.[0-9]+|[0-9]+(\.[0-9]*)?)([eE][-+]?[0-9]+)?|[-+]?(\.inf|\.Inf|\.INF)|\.nan|\.NaN|\.NAN)$")
});

fn regex(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(err) => panic!("built-in pattern {pattern:?} is invalid: {err}"),
    }
}

/// A schema: default tag handles, known tags and the rules for untagged nodes.
#[derive(Clone, Debug)]
pub struct Schema {
    kind: SchemaKind,
    handles: Vec<(String, String)>,
    tags: &'static [Tag],
}

const FAILSAFE_TAGS: &[Tag] = &[Tag::Str, Tag::Seq, Tag::Map];
const JSON_TAGS: &[Tag] = &[Tag::Null, Tag::Bool, Tag::Int, Tag::Float, Tag::Str, Tag::Seq, Tag::Map];

impl Schema {
    pub fn new(kind: SchemaKind) -> Self {
        let tags = match kind {
            SchemaKind::Failsafe => FAILSAFE_TAGS,
            SchemaKind::Json | SchemaKind::Core => JSON_TAGS,
        };
        Self {
            kind,
            handles: vec![
                ("!".to_string(), "!".to_string()),
                ("!!".to_string(), TAG_PREFIX.to_string()),
            ],
            tags,
        }
    }

    pub fn failsafe() -> Self {
        Self::new(SchemaKind::Failsafe)
    }

    pub fn json() -> Self {
        Self::new(SchemaKind::Json)
    }

    pub fn core() -> Self {
        Self::new(SchemaKind::Core)
    }

    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    /// Handle to prefix pairs every document starts with.
    pub fn handles(&self) -> impl Iterator<Item = (&str, &str)> {
        self.handles.iter().map(|(h, p)| (h.as_str(), p.as_str()))
    }

    pub(crate) fn default_handles(&self) -> AHashMap<String, String> {
        self.handles.iter().cloned().collect()
    }

    /// Look up a fully expanded tag URI in the tag table.
    pub fn tag(&self, uri: &str) -> Option<Tag> {
        Tag::from_uri(uri).filter(|tag| self.tags.contains(tag))
    }

    /// Tag of `node`. `path` holds the ancestors of the node, outermost first; the built-in
    /// schemas resolve by node kind and content only.
    pub fn resolve(&self, tag: &NodeTag, _path: &[&Node], node: &Node) -> Result<Tag, String> {
        match (tag, node) {
            (_, Node::Alias { anchor, .. }) => Err(format!("alias \"{}\" has no tag of its own", anchor.name())),
            (NodeTag::Specific(tag), _) => Ok(*tag),
            (_, Node::Sequence { .. }) => Ok(Tag::Seq),
            (_, Node::Mapping { .. }) => Ok(Tag::Map),
            (NodeTag::NonSpecific, Node::Scalar { .. }) => Ok(Tag::Str),
            (NodeTag::Unspecified, Node::Scalar { content, .. }) => self.resolve_plain(content),
        }
    }

    fn resolve_plain(&self, content: &str) -> Result<Tag, String> {
        match self.kind {
            SchemaKind::Failsafe => Ok(Tag::Str),
            SchemaKind::Json => {
                // Only an empty node has empty plain content.
                if content.is_empty() || JSON_NULL.is_match(content) {
                    Ok(Tag::Null)
                } else if JSON_BOOL.is_match(content) {
                    Ok(Tag::Bool)
                } else if JSON_INT.is_match(content) {
                    Ok(Tag::Int)
                } else if JSON_FLOAT.is_match(content) {
                    Ok(Tag::Float)
                } else {
                    Err(format!("plain scalar {content:?} is not a JSON value"))
                }
            }
            SchemaKind::Core => {
                if CORE_NULL.is_match(content) {
                    Ok(Tag::Null)
                } else if CORE_BOOL.is_match(content) {
                    Ok(Tag::Bool)
                } else if CORE_INT.is_match(content) {
                    Ok(Tag::Int)
                } else if CORE_FLOAT.is_match(content) {
                    Ok(Tag::Float)
                } else {
                    Ok(Tag::Str)
                }
            }
        }
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::core()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;

    fn plain(content: &str) -> Node {
        Node::Scalar {
            content: content.to_string(),
            tag: NodeTag::Unspecified,
            location: Location::UNKNOWN,
        }
    }

    fn resolve(schema: &Schema, content: &str) -> Result<Tag, String> {
        schema.resolve(&NodeTag::Unspecified, &[], &plain(content))
    }

    #[test]
    fn core_implicit_types() {
        let core = Schema::core();
        assert_eq!(resolve(&core, ""), Ok(Tag::Null));
        assert_eq!(resolve(&core, "~"), Ok(Tag::Null));
        assert_eq!(resolve(&core, "True"), Ok(Tag::Bool));
        assert_eq!(resolve(&core, "0x1F"), Ok(Tag::Int));
        assert_eq!(resolve(&core, "0o17"), Ok(Tag::Int));
        assert_eq!(resolve(&core, "-.inf"), Ok(Tag::Float));
        assert_eq!(resolve(&core, ".5"), Ok(Tag::Float));
        assert_eq!(resolve(&core, "1e3"), Ok(Tag::Float));
        assert_eq!(resolve(&core, "yes"), Ok(Tag::Str));
        assert_eq!(resolve(&core, "0b101"), Ok(Tag::Str));
    }

    #[test]
    fn json_is_strict() {
        let json = Schema::json();
        assert_eq!(resolve(&json, "null"), Ok(Tag::Null));
        assert_eq!(resolve(&json, "-0"), Ok(Tag::Int));
        assert_eq!(resolve(&json, "1.5e3"), Ok(Tag::Float));
        assert!(resolve(&json, "True").is_err());
        assert_eq!(resolve(&json, ""), Ok(Tag::Null));
        assert!(resolve(&json, "hello").is_err());
    }

    #[test]
    fn failsafe_and_non_specific_are_strings() {
        assert_eq!(resolve(&Schema::failsafe(), "12"), Ok(Tag::Str));
        let quoted = Node::Scalar {
            content: "12".into(),
            tag: NodeTag::NonSpecific,
            location: Location::UNKNOWN,
        };
        assert_eq!(Schema::core().resolve(&NodeTag::NonSpecific, &[], &quoted), Ok(Tag::Str));
    }

    #[test]
    fn tag_table_depends_on_schema() {
        assert_eq!(Schema::failsafe().tag("tag:yaml.org,2002:int"), None);
        assert_eq!(Schema::json().tag("tag:yaml.org,2002:int"), Some(Tag::Int));
        assert_eq!(Schema::core().tag("tag:example.com,2000:app"), None);
    }
}
