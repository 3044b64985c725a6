//! Node tree produced by the grammar engine.
//!
//! A [`Node`] is the representation graph of one document before any schema is applied: scalar
//! content as text, collections as nested nodes, and aliases as shared handles to the anchored
//! node. Aliases make the graph a DAG (or a cyclic graph, which materialization rejects).

use std::cell::{Cell, OnceCell};
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::error::Error;
use crate::location::Location;
use crate::schema::Schema;
use crate::tags::Tag;

/// Tag attached to a node by the parser.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeTag {
    /// No tag written and the node is a plain scalar or a collection: the schema decides.
    Unspecified,
    /// The `!` tag, or a quoted or block scalar: resolved by node kind only.
    NonSpecific,
    /// An explicit tag resolved against the tag table of the schema.
    Specific(Tag),
}

/// One node of a document.
#[derive(Clone, Debug)]
pub enum Node {
    Scalar {
        content: String,
        tag: NodeTag,
        location: Location,
    },
    Sequence {
        items: Vec<Node>,
        tag: NodeTag,
        location: Location,
    },
    Mapping {
        entries: Vec<(Node, Node)>,
        tag: NodeTag,
        location: Location,
    },
    Alias {
        anchor: Rc<Anchor>,
        location: Location,
    },
}

impl Node {
    pub fn location(&self) -> Location {
        match self {
            Node::Scalar { location, .. }
            | Node::Sequence { location, .. }
            | Node::Mapping { location, .. }
            | Node::Alias { location, .. } => *location,
        }
    }

    /// Tag of the node, `None` for aliases.
    pub fn tag(&self) -> Option<&NodeTag> {
        match self {
            Node::Scalar { tag, .. } | Node::Sequence { tag, .. } | Node::Mapping { tag, .. } => Some(tag),
            Node::Alias { .. } => None,
        }
    }

    pub(crate) fn set_tag(&mut self, new_tag: NodeTag) {
        match self {
            Node::Scalar { tag, .. } | Node::Sequence { tag, .. } | Node::Mapping { tag, .. } => *tag = new_tag,
            Node::Alias { .. } => {}
        }
    }

    /// Follow aliases to the node they stand for.
    pub fn target(&self) -> Option<&Node> {
        let mut node = self;
        while let Node::Alias { anchor, .. } = node {
            node = anchor.node()?;
        }
        Some(node)
    }

    /// Node equality as used for duplicate keys: both nodes resolve to the same tag and have
    /// the same canonical form. Collections compare structurally, mappings regardless of order.
    pub fn equivalent(&self, other: &Node, schema: &Schema) -> Result<bool, Error> {
        Ok(self.key_repr(schema)? == other.key_repr(schema)?)
    }

    /// Canonical, hashable description of this node used to detect duplicate keys.
    pub(crate) fn key_repr(&self, schema: &Schema) -> Result<KeyRepr, Error> {
        match self {
            Node::Alias { anchor, location } => {
                let Some(target) = anchor.node() else {
                    return Err(Error::circular_alias(anchor.name()).with_location(*location));
                };
                if anchor.busy.replace(true) {
                    return Err(Error::circular_alias(anchor.name()).with_location(*location));
                }
                let result = target.key_repr(schema);
                anchor.busy.set(false);
                result
            }
            Node::Scalar { content, tag, location } => {
                let tag = schema
                    .resolve(tag, &[], self)
                    .map_err(|msg| Error::tag(msg).with_location(*location))?;
                let canonical = tag
                    .canonical(content)
                    .map_err(|msg| Error::tag(msg).with_location(*location))?;
                Ok(KeyRepr::Scalar(tag, canonical))
            }
            Node::Sequence { items, tag, location } => {
                let tag = schema
                    .resolve(tag, &[], self)
                    .map_err(|msg| Error::tag(msg).with_location(*location))?;
                let items = items.iter().map(|item| item.key_repr(schema)).collect::<Result<_, _>>()?;
                Ok(KeyRepr::Sequence(tag, items))
            }
            Node::Mapping { entries, tag, location } => {
                let tag = schema
                    .resolve(tag, &[], self)
                    .map_err(|msg| Error::tag(msg).with_location(*location))?;
                let mut pairs = entries
                    .iter()
                    .map(|(k, v)| Ok((k.key_repr(schema)?, v.key_repr(schema)?)))
                    .collect::<Result<Vec<_>, Error>>()?;
                pairs.sort();
                Ok(KeyRepr::Mapping(tag, pairs))
            }
        }
    }
}

/// Canonical form of a node: resolved tag plus canonical content.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum KeyRepr {
    Scalar(Tag, String),
    Sequence(Tag, Vec<KeyRepr>),
    Mapping(Tag, Vec<(KeyRepr, KeyRepr)>),
}

impl fmt::Display for KeyRepr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyRepr::Scalar(_, content) => write!(f, "{content:?}"),
            KeyRepr::Sequence(_, items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            KeyRepr::Mapping(_, pairs) => {
                f.write_str("{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// An anchored node, shared by every alias that refers to it.
///
/// The node is filled in once the anchored node is complete. An alias that appears inside its
/// own anchored node therefore finds the cell empty and is reported as a circular alias. Such a
/// node is never stored, so anchors and aliases cannot form an `Rc` cycle.
pub struct Anchor {
    name: String,
    location: Location,
    node: OnceCell<Node>,
    pub(crate) busy: Cell<bool>,
}

impl Anchor {
    pub(crate) fn new(name: String, location: Location) -> Self {
        Self {
            name,
            location,
            node: OnceCell::new(),
            busy: Cell::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the `&name` property was written.
    pub fn location(&self) -> Location {
        self.location
    }

    /// The anchored node, `None` while it is still being parsed.
    pub fn node(&self) -> Option<&Node> {
        self.node.get()
    }

    pub(crate) fn complete(&self, node: Node) {
        if self.is_aliased_within(&node) {
            return;
        }
        // Only the first completion counts; the parser completes each anchor exactly once.
        let _ = self.node.set(node);
    }

    /// Whether `node` contains an alias to this anchor, without following other aliases.
    fn is_aliased_within(&self, node: &Node) -> bool {
        match node {
            Node::Alias { anchor, .. } => std::ptr::eq(Rc::as_ptr(anchor), self),
            Node::Scalar { .. } => false,
            Node::Sequence { items, .. } => items.iter().any(|item| self.is_aliased_within(item)),
            Node::Mapping { entries, .. } => entries
                .iter()
                .any(|(k, v)| self.is_aliased_within(k) || self.is_aliased_within(v)),
        }
    }
}

impl fmt::Debug for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The anchored node may contain aliases back to this anchor.
        f.debug_struct("Anchor")
            .field("name", &self.name)
            .field("location", &self.location)
            .field("complete", &self.node.get().is_some())
            .finish()
    }
}

/// Anchors defined so far in the current document.
///
/// Definitions are appended in source order. Rewinding to an earlier length forgets everything
/// defined after it, which is how abandoned grammar alternatives drop their anchors. A name may
/// be defined more than once; lookups see the latest definition.
#[derive(Default)]
pub(crate) struct AnchorLog {
    entries: Vec<Rc<Anchor>>,
    index: AHashMap<String, SmallVec<[usize; 1]>>,
}

impl AnchorLog {
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn define(&mut self, anchor: Rc<Anchor>) {
        let at = self.entries.len();
        self.index.entry(anchor.name.clone()).or_default().push(at);
        self.entries.push(anchor);
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<&Rc<Anchor>> {
        let at = *self.index.get(name)?.last()?;
        self.entries.get(at)
    }

    pub(crate) fn rewind(&mut self, len: usize) {
        while self.entries.len() > len {
            let Some(anchor) = self.entries.pop() else { break };
            if let Some(slots) = self.index.get_mut(&anchor.name) {
                slots.pop();
                if slots.is_empty() {
                    self.index.remove(&anchor.name);
                }
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor(name: &str) -> Rc<Anchor> {
        Rc::new(Anchor::new(name.to_string(), Location::UNKNOWN))
    }

    #[test]
    fn rewind_restores_shadowed_anchor() {
        let mut log = AnchorLog::default();
        let first = anchor("a");
        log.define(first.clone());
        let mark = log.len();
        log.define(anchor("a"));
        log.define(anchor("b"));
        assert!(!Rc::ptr_eq(log.lookup("a").unwrap(), &first));
        log.rewind(mark);
        assert!(Rc::ptr_eq(log.lookup("a").unwrap(), &first));
        assert!(log.lookup("b").is_none());
    }

    #[test]
    fn incomplete_anchor_has_no_target() {
        let a = anchor("x");
        let alias = Node::Alias {
            anchor: a.clone(),
            location: Location::UNKNOWN,
        };
        assert!(alias.target().is_none());
        a.complete(Node::Scalar {
            content: "1".into(),
            tag: NodeTag::Unspecified,
            location: Location::UNKNOWN,
        });
        assert!(matches!(alias.target(), Some(Node::Scalar { content, .. }) if content == "1"));
    }

    #[test]
    fn self_referencing_node_is_not_stored() {
        let a = anchor("loop");
        let node = Node::Sequence {
            items: vec![Node::Alias {
                anchor: a.clone(),
                location: Location::UNKNOWN,
            }],
            tag: NodeTag::Unspecified,
            location: Location::UNKNOWN,
        };
        a.complete(node);
        assert!(a.node().is_none());
        assert_eq!(Rc::strong_count(&a), 1);
    }
}
