//! The standard tags and their canonical forms.

use std::fmt;

use crate::parse_scalars::{is_null, parse_bool, parse_float, parse_int};
use crate::value::Value;
use crate::zmij_format::float_string;

/// Prefix the `!!` handle expands to.
pub const TAG_PREFIX: &str = "tag:yaml.org,2002:";

pub(crate) const TAG_NULL_CANONICAL: &str = "tag:yaml.org,2002:null";
pub(crate) const TAG_BOOL_CANONICAL: &str = "tag:yaml.org,2002:bool";
pub(crate) const TAG_INT_CANONICAL: &str = "tag:yaml.org,2002:int";
pub(crate) const TAG_FLOAT_CANONICAL: &str = "tag:yaml.org,2002:float";
pub(crate) const TAG_STR_CANONICAL: &str = "tag:yaml.org,2002:str";
pub(crate) const TAG_SEQ_CANONICAL: &str = "tag:yaml.org,2002:seq";
pub(crate) const TAG_MAP_CANONICAL: &str = "tag:yaml.org,2002:map";

/// A tag known to the built-in schemas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Seq,
    Map,
}

impl Tag {
    pub fn uri(self) -> &'static str {
        match self {
            Tag::Null => TAG_NULL_CANONICAL,
            Tag::Bool => TAG_BOOL_CANONICAL,
            Tag::Int => TAG_INT_CANONICAL,
            Tag::Float => TAG_FLOAT_CANONICAL,
            Tag::Str => TAG_STR_CANONICAL,
            Tag::Seq => TAG_SEQ_CANONICAL,
            Tag::Map => TAG_MAP_CANONICAL,
        }
    }

    pub fn from_uri(uri: &str) -> Option<Tag> {
        match uri {
            TAG_NULL_CANONICAL => Some(Tag::Null),
            TAG_BOOL_CANONICAL => Some(Tag::Bool),
            TAG_INT_CANONICAL => Some(Tag::Int),
            TAG_FLOAT_CANONICAL => Some(Tag::Float),
            TAG_STR_CANONICAL => Some(Tag::Str),
            TAG_SEQ_CANONICAL => Some(Tag::Seq),
            TAG_MAP_CANONICAL => Some(Tag::Map),
            _ => None,
        }
    }

    pub fn is_scalar(self) -> bool {
        !matches!(self, Tag::Seq | Tag::Map)
    }

    /// Canonical text of `content` under this tag. Two scalars with the same tag are equal
    /// exactly when their canonical forms are.
    pub fn canonical(self, content: &str) -> Result<String, String> {
        match self {
            Tag::Null => {
                if is_null(content) {
                    Ok("null".to_string())
                } else {
                    Err(format!("invalid null: `{content}`"))
                }
            }
            Tag::Bool => parse_bool(content).map(|b| b.to_string()),
            Tag::Int => parse_int(content).map(|i| i.to_string()),
            Tag::Float => parse_float(content).map(float_string),
            Tag::Str => Ok(content.to_string()),
            Tag::Seq | Tag::Map => Err(format!("{self} cannot be applied to a scalar")),
        }
    }

    /// Native value of a scalar with this tag.
    pub(crate) fn construct_scalar(self, content: &str) -> Result<Value, String> {
        match self {
            Tag::Null => {
                if is_null(content) {
                    Ok(Value::Null)
                } else {
                    Err(format!("invalid null: `{content}`"))
                }
            }
            Tag::Bool => parse_bool(content).map(Value::Bool),
            Tag::Int => parse_int(content).map(Value::Int),
            Tag::Float => parse_float(content).map(Value::Double),
            Tag::Str => Ok(Value::String(content.to_string())),
            Tag::Seq | Tag::Map => Err(format!("{self} cannot be applied to a scalar")),
        }
    }
}

impl fmt::Display for Tag {
    /// Shorthand form, e.g. `!!int`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let uri = self.uri();
        write!(f, "!!{}", &uri[TAG_PREFIX.len()..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_forms_unify_spellings() {
        assert_eq!(Tag::Int.canonical("0x10"), Tag::Int.canonical("16"));
        assert_eq!(Tag::Int.canonical("+16"), Ok("16".to_string()));
        assert_eq!(Tag::Bool.canonical("True"), Ok("true".to_string()));
        assert_eq!(Tag::Null.canonical("~"), Tag::Null.canonical(""));
        assert_eq!(Tag::Float.canonical("1e0"), Tag::Float.canonical("1.0"));
        assert_ne!(Tag::Str.canonical("1"), Tag::Str.canonical("01"));
    }

    #[test]
    fn collection_tags_reject_scalars() {
        assert!(Tag::Seq.canonical("x").is_err());
        assert!(Tag::Map.construct_scalar("x").is_err());
    }

    #[test]
    fn uri_round_trip() {
        for tag in [Tag::Null, Tag::Bool, Tag::Int, Tag::Float, Tag::Str, Tag::Seq, Tag::Map] {
            assert_eq!(Tag::from_uri(tag.uri()), Some(tag));
        }
        assert_eq!(Tag::Int.to_string(), "!!int");
    }
}
