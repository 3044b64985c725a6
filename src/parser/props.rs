//! Node properties (tags and anchors) and alias nodes.

use std::rc::Rc;

use log::trace;

use super::chars::{Context, is_anchor_char, is_tag_char, is_uri_char, is_word_char};
use super::{PResult, Parser};
use crate::error::Error;
use crate::node::{Anchor, Node, NodeTag};

/// Tag and anchor written before a node.
#[derive(Default)]
pub(crate) struct Properties {
    tag: Option<NodeTag>,
    anchor: Option<Rc<Anchor>>,
}

impl Parser<'_> {
    /// `c-ns-properties(n,c)`: a tag and an anchor, in either order, each optional but not both.
    pub(crate) fn c_ns_properties(&mut self, n: i32, c: Context) -> PResult<Properties> {
        self.attempt(|p| {
            let mut props = Properties::default();
            match p.peek() {
                Some('!') => {
                    props.tag = Some(p.c_ns_tag_property()?);
                    props.anchor = p.opt(|p| {
                        p.s_separate(n, c)?;
                        p.c_ns_anchor_property()
                    })?;
                }
                Some('&') => {
                    props.anchor = Some(p.c_ns_anchor_property()?);
                    props.tag = p.opt(|p| {
                        p.s_separate(n, c)?;
                        p.c_ns_tag_property()
                    })?;
                }
                _ => return p.fail("node properties"),
            }
            Ok(props)
        })
    }

    /// Apply `props` to a finished node. The anchor is completed with the tagged node.
    pub(crate) fn finish_node(&self, props: Option<Properties>, mut node: Node) -> Node {
        if let Some(props) = props {
            if let Some(tag) = props.tag {
                node.set_tag(tag);
            }
            if let Some(anchor) = props.anchor {
                anchor.complete(node.clone());
            }
        }
        node
    }

    /// `c-ns-anchor-property`: `&name`. The anchor is visible from here on, including inside
    /// its own node.
    fn c_ns_anchor_property(&mut self) -> PResult<Rc<Anchor>> {
        let start = self.pos;
        self.expect('&', "anchor")?;
        let name = self.ns_anchor_name()?;
        let anchor = Rc::new(Anchor::new(name, self.location(start)));
        trace!("anchor &{} defined at {:?}", anchor.name(), anchor.location());
        self.anchors.define(anchor.clone());
        Ok(anchor)
    }

    fn ns_anchor_name(&mut self) -> PResult<String> {
        let start = self.pos;
        if self.eat_while(is_anchor_char) == 0 {
            return self.fail("anchor name");
        }
        Ok(self.text(start, self.pos))
    }

    /// `c-ns-alias-node`: `*name`, referring to the latest anchor of that name.
    pub(crate) fn c_ns_alias_node(&mut self) -> PResult<Node> {
        let start = self.pos;
        self.expect('*', "alias")?;
        let name = self.ns_anchor_name()?;
        match self.anchors.lookup(&name) {
            Some(anchor) => {
                trace!("alias *{name} resolved");
                Ok(Node::Alias {
                    anchor: anchor.clone(),
                    location: self.location(start),
                })
            }
            None => Err(self.hard_at(Error::unknown_alias(name), start)),
        }
    }

    /// `c-ns-tag-property`: verbatim, shorthand or non-specific tag, resolved to a [`NodeTag`].
    fn c_ns_tag_property(&mut self) -> PResult<NodeTag> {
        let start = self.pos;
        self.expect('!', "tag")?;

        if self.eat('<') {
            let uri = self.uri_chars(is_uri_char)?;
            if uri.is_empty() || !self.eat('>') {
                return Err(self.hard_at(Error::tag("malformed verbatim tag"), start));
            }
            return self.specific_tag(uri, start);
        }

        let save = self.pos;
        self.eat_while(is_word_char);
        let handle = if self.peek() == Some('!') {
            self.bump();
            self.text(start, self.pos)
        } else {
            self.pos = save;
            "!".to_string()
        };

        let suffix = self.uri_chars(is_tag_char)?;
        if suffix.is_empty() {
            if handle == "!" {
                return Ok(NodeTag::NonSpecific);
            }
            return Err(self.hard_at(Error::tag(format!("tag handle {handle} needs a suffix")), start));
        }
        let Some(prefix) = self.handles.get(&handle) else {
            return Err(self.hard_at(Error::tag(format!("undefined tag handle {handle}")), start));
        };
        let uri = format!("{prefix}{suffix}");
        self.specific_tag(uri, start)
    }

    fn specific_tag(&self, uri: String, start: usize) -> PResult<NodeTag> {
        match self.schema.tag(&uri) {
            Some(tag) => Ok(NodeTag::Specific(tag)),
            None => Err(self.hard_at(Error::tag(format!("unknown tag <{uri}>")), start)),
        }
    }

    /// Characters accepted by `allowed`, with `%XX` escapes decoded.
    pub(crate) fn uri_chars(&mut self, allowed: fn(char) -> bool) -> PResult<String> {
        let start = self.pos;
        let mut bytes = Vec::new();
        loop {
            match self.peek() {
                Some('%') => {
                    let hi = self.peek_at(1).and_then(|c| c.to_digit(16));
                    let lo = self.peek_at(2).and_then(|c| c.to_digit(16));
                    let (Some(hi), Some(lo)) = (hi, lo) else {
                        return Err(self.hard(Error::tag("invalid %-escape in tag")));
                    };
                    bytes.push((hi * 16 + lo) as u8);
                    self.pos += 3;
                }
                Some(c) if allowed(c) => {
                    let mut buf = [0u8; 4];
                    bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                    self.bump();
                }
                _ => break,
            }
        }
        String::from_utf8(bytes).map_err(|_| self.hard_at(Error::tag("tag is not valid UTF-8 after %-decoding"), start))
    }
}
