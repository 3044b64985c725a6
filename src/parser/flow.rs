//! Flow collections and flow nodes.

use super::chars::{Context, is_break, is_white};
use super::{IMPLICIT_KEY_LIMIT, MappingBuilder, PResult, Parser};
use crate::node::{Node, NodeTag};

impl Parser<'_> {
    fn scalar_node(&self, content: String, tag: NodeTag, start: usize) -> Node {
        Node::Scalar {
            content,
            tag,
            location: self.location(start),
        }
    }

    /// `ns-flow-yaml-content(n,c)`: a plain scalar.
    fn ns_flow_yaml_content(&mut self, n: i32, c: Context) -> PResult<Node> {
        let start = self.pos;
        let content = self.ns_plain(n, c)?;
        Ok(self.scalar_node(content, NodeTag::Unspecified, start))
    }

    /// `c-flow-json-content(n,c)`: content that starts with an indicator and ends unambiguously.
    fn c_flow_json_content(&mut self, n: i32, c: Context) -> PResult<Node> {
        let start = self.pos;
        match self.peek() {
            Some('[') => self.c_flow_sequence(n, c),
            Some('{') => self.c_flow_mapping(n, c),
            Some('\'') => {
                let content = self.c_single_quoted(n, c)?;
                Ok(self.scalar_node(content, NodeTag::NonSpecific, start))
            }
            Some('"') => {
                let content = self.c_double_quoted(n, c)?;
                Ok(self.scalar_node(content, NodeTag::NonSpecific, start))
            }
            _ => self.fail("flow collection or quoted scalar"),
        }
    }

    fn at_json_content(&self) -> bool {
        matches!(self.peek(), Some('[' | '{' | '\'' | '"'))
    }

    /// `ns-flow-content(n,c)`
    fn ns_flow_content(&mut self, n: i32, c: Context) -> PResult<Node> {
        if self.at_json_content() {
            self.c_flow_json_content(n, c)
        } else {
            self.ns_flow_yaml_content(n, c)
        }
    }

    /// Properties followed by `content`, or by nothing (an empty scalar).
    fn properties_then(
        &mut self,
        n: i32,
        c: Context,
        content: fn(&mut Self, i32, Context) -> PResult<Node>,
    ) -> PResult<Node> {
        self.attempt(|p| {
            let props = p.c_ns_properties(n, c)?;
            let node = match p.opt(|p| {
                p.s_separate(n, c)?;
                content(p, n, c)
            })? {
                Some(node) => node,
                None => p.empty_node(),
            };
            Ok(p.finish_node(Some(props), node))
        })
    }

    /// `ns-flow-yaml-node(n,c)`
    pub(crate) fn ns_flow_yaml_node(&mut self, n: i32, c: Context) -> PResult<Node> {
        match self.peek() {
            Some('*') => self.c_ns_alias_node(),
            Some('!' | '&') => self.properties_then(n, c, Self::ns_flow_yaml_content),
            _ => self.ns_flow_yaml_content(n, c),
        }
    }

    /// `c-flow-json-node(n,c)`
    pub(crate) fn c_flow_json_node(&mut self, n: i32, c: Context) -> PResult<Node> {
        self.attempt(|p| {
            let props = p.opt(|p| {
                let props = p.c_ns_properties(n, c)?;
                p.s_separate(n, c)?;
                Ok(props)
            })?;
            let node = p.c_flow_json_content(n, c)?;
            Ok(p.finish_node(props, node))
        })
    }

    /// `ns-flow-node(n,c)`
    pub(crate) fn ns_flow_node(&mut self, n: i32, c: Context) -> PResult<Node> {
        match self.peek() {
            Some('*') => self.c_ns_alias_node(),
            Some('!' | '&') => self.properties_then(n, c, Self::ns_flow_content),
            _ => self.ns_flow_content(n, c),
        }
    }

    /// `c-flow-sequence(n,c)`
    pub(crate) fn c_flow_sequence(&mut self, n: i32, c: Context) -> PResult<Node> {
        self.attempt(|p| {
            let start = p.pos;
            p.expect('[', "'['")?;
            p.nested(|p| {
                let c = c.in_flow();
                p.opt(|p| p.s_separate(n, c))?;
                let mut items = Vec::new();
                while !p.eat(']') {
                    items.push(p.ns_flow_seq_entry(n, c)?);
                    p.opt(|p| p.s_separate(n, c))?;
                    if p.eat(',') {
                        p.opt(|p| p.s_separate(n, c))?;
                    } else {
                        p.expect(']', "',' or ']'")?;
                        break;
                    }
                }
                Ok(Node::Sequence {
                    items,
                    tag: NodeTag::Unspecified,
                    location: p.location(start),
                })
            })
        })
    }

    /// `c-flow-mapping(n,c)`
    pub(crate) fn c_flow_mapping(&mut self, n: i32, c: Context) -> PResult<Node> {
        self.attempt(|p| {
            let start = p.pos;
            p.expect('{', "'{'")?;
            p.nested(|p| {
                let c = c.in_flow();
                p.opt(|p| p.s_separate(n, c))?;
                let mut builder = MappingBuilder::default();
                while !p.eat('}') {
                    let (key, value) = p.ns_flow_map_entry(n, c)?;
                    p.insert_entry(&mut builder, key, value)?;
                    p.opt(|p| p.s_separate(n, c))?;
                    if p.eat(',') {
                        p.opt(|p| p.s_separate(n, c))?;
                    } else {
                        p.expect('}', "',' or '}'")?;
                        break;
                    }
                }
                Ok(Node::Mapping {
                    entries: builder.into_entries(),
                    tag: NodeTag::Unspecified,
                    location: p.location(start),
                })
            })
        })
    }

    /// Zero-width check that a flow entry ends here: optional separation, then `,` or `close`.
    fn at_flow_entry_end(&mut self, n: i32, c: Context, close: char) -> PResult<()> {
        let save = self.checkpoint();
        self.opt(|p| p.s_separate(n, c))?;
        let ok = matches!(self.peek(), Some(ch) if ch == ',' || ch == close);
        self.restore(save);
        if ok { Ok(()) } else { self.fail("',' or end of flow collection") }
    }

    /// `ns-flow-seq-entry(n,c)`: a single-pair mapping or a node.
    fn ns_flow_seq_entry(&mut self, n: i32, c: Context) -> PResult<Node> {
        let start = self.pos;
        let pair = self.opt(|p| {
            let (key, value) = p.ns_flow_pair(n, c)?;
            p.at_flow_entry_end(n, c, ']')?;
            Ok((key, value))
        })?;
        if let Some((key, value)) = pair {
            let mut builder = MappingBuilder::default();
            self.insert_entry(&mut builder, key, value)?;
            return Ok(Node::Mapping {
                entries: builder.into_entries(),
                tag: NodeTag::Unspecified,
                location: self.location(start),
            });
        }
        self.ns_flow_node(n, c)
    }

    /// `?` followed by separation.
    fn explicit_key_indicator(&mut self, n: i32, c: Context) -> PResult<()> {
        self.attempt(|p| {
            p.expect('?', "'?'")?;
            p.s_separate(n, c)
        })
    }

    /// `ns-flow-map-entry(n,c)`
    fn ns_flow_map_entry(&mut self, n: i32, c: Context) -> PResult<(Node, Node)> {
        if self.opt(|p| p.explicit_key_indicator(n, c))?.is_some() {
            return self.ns_flow_map_explicit_entry(n, c, '}');
        }
        self.ns_flow_map_implicit_entry(n, c, '}')
    }

    /// `ns-flow-map-explicit-entry(n,c)`: an implicit entry, or nothing at all.
    fn ns_flow_map_explicit_entry(&mut self, n: i32, c: Context, close: char) -> PResult<(Node, Node)> {
        match self.opt(|p| p.ns_flow_map_implicit_entry(n, c, close))? {
            Some(entry) => Ok(entry),
            None => Ok((self.empty_node(), self.empty_node())),
        }
    }

    /// `ns-flow-map-implicit-entry(n,c)`. Each alternative must reach the end of the entry.
    fn ns_flow_map_implicit_entry(&mut self, n: i32, c: Context, close: char) -> PResult<(Node, Node)> {
        if let Some(entry) = self.opt(|p| {
            let entry = p.ns_flow_map_yaml_key_entry(n, c)?;
            p.at_flow_entry_end(n, c, close)?;
            Ok(entry)
        })? {
            return Ok(entry);
        }
        if let Some(entry) = self.opt(|p| {
            let entry = p.c_ns_flow_map_empty_key_entry(n, c)?;
            p.at_flow_entry_end(n, c, close)?;
            Ok(entry)
        })? {
            return Ok(entry);
        }
        self.attempt(|p| {
            let entry = p.c_ns_flow_map_json_key_entry(n, c)?;
            p.at_flow_entry_end(n, c, close)?;
            Ok(entry)
        })
    }

    /// `ns-flow-map-yaml-key-entry(n,c)`
    fn ns_flow_map_yaml_key_entry(&mut self, n: i32, c: Context) -> PResult<(Node, Node)> {
        self.attempt(|p| {
            let key = p.ns_flow_yaml_node(n, c)?;
            let value = p.opt(|p| {
                p.opt(|p| p.s_separate(n, c))?;
                p.c_ns_flow_map_separate_value(n, c)
            })?;
            let value = match value {
                Some(value) => value,
                None => p.empty_node(),
            };
            Ok((key, value))
        })
    }

    /// `c-ns-flow-map-empty-key-entry(n,c)`
    fn c_ns_flow_map_empty_key_entry(&mut self, n: i32, c: Context) -> PResult<(Node, Node)> {
        let key = self.empty_node();
        let value = self.c_ns_flow_map_separate_value(n, c)?;
        Ok((key, value))
    }

    /// `c-ns-flow-map-separate-value(n,c)`: `:` not followed by a plain-safe character.
    fn c_ns_flow_map_separate_value(&mut self, n: i32, c: Context) -> PResult<Node> {
        self.attempt(|p| {
            if p.peek() != Some(':') || p.peek_at(1).is_some_and(|next| super::chars::is_plain_safe(next, c)) {
                return p.fail("':'");
            }
            p.bump();
            let value = p.opt(|p| {
                p.s_separate(n, c)?;
                p.ns_flow_node(n, c)
            })?;
            Ok(match value {
                Some(value) => value,
                None => p.empty_node(),
            })
        })
    }

    /// `c-ns-flow-map-json-key-entry(n,c)`
    fn c_ns_flow_map_json_key_entry(&mut self, n: i32, c: Context) -> PResult<(Node, Node)> {
        self.attempt(|p| {
            let key = p.c_flow_json_node(n, c)?;
            let value = p.opt(|p| {
                p.opt(|p| p.s_separate(n, c))?;
                p.c_ns_flow_map_adjacent_value(n, c)
            })?;
            let value = match value {
                Some(value) => value,
                None => p.empty_node(),
            };
            Ok((key, value))
        })
    }

    /// `c-ns-flow-map-adjacent-value(n,c)`: after a JSON-like key `:` may touch the value.
    fn c_ns_flow_map_adjacent_value(&mut self, n: i32, c: Context) -> PResult<Node> {
        self.attempt(|p| {
            p.expect(':', "':'")?;
            let value = p.opt(|p| {
                p.opt(|p| p.s_separate(n, c))?;
                p.ns_flow_node(n, c)
            })?;
            Ok(match value {
                Some(value) => value,
                None => p.empty_node(),
            })
        })
    }

    /// `ns-flow-pair(n,c)`
    fn ns_flow_pair(&mut self, n: i32, c: Context) -> PResult<(Node, Node)> {
        if self.opt(|p| p.explicit_key_indicator(n, c))?.is_some() {
            return self.ns_flow_map_explicit_entry(n, c, ']');
        }
        self.ns_flow_pair_entry(n, c)
    }

    /// `ns-flow-pair-entry(n,c)`
    fn ns_flow_pair_entry(&mut self, n: i32, c: Context) -> PResult<(Node, Node)> {
        if let Some(entry) = self.opt(|p| {
            let key = p.ns_s_implicit_yaml_key(Context::FlowKey)?;
            let value = p.c_ns_flow_map_separate_value(n, c)?;
            Ok((key, value))
        })? {
            return Ok(entry);
        }
        if let Some(entry) = self.opt(|p| p.c_ns_flow_map_empty_key_entry(n, c))? {
            return Ok(entry);
        }
        self.attempt(|p| {
            let key = p.c_s_implicit_json_key(Context::FlowKey)?;
            let value = p.c_ns_flow_map_adjacent_value(n, c)?;
            Ok((key, value))
        })
    }

    /// `ns-s-implicit-yaml-key(c)`: a single-line key of limited length.
    pub(crate) fn ns_s_implicit_yaml_key(&mut self, c: Context) -> PResult<Node> {
        self.attempt(|p| {
            p.limited(IMPLICIT_KEY_LIMIT, |p| {
                let key = p.ns_flow_yaml_node(0, c)?;
                p.opt(|p| p.s_separate_in_line())?;
                Ok(key)
            })
        })
    }

    /// `c-s-implicit-json-key(c)`
    pub(crate) fn c_s_implicit_json_key(&mut self, c: Context) -> PResult<Node> {
        if !self.json_key_may_end_in_colon() {
            return self.fail("implicit key");
        }
        self.attempt(|p| {
            p.limited(IMPLICIT_KEY_LIMIT, |p| {
                let key = p.c_flow_json_node(0, c)?;
                p.opt(|p| p.s_separate_in_line())?;
                Ok(key)
            })
        })
    }

    /// Line-local scan ahead of `c-s-implicit-json-key`. Returns `false` only when the JSON-like
    /// node starting here certainly does not end on this line, within the key length limit,
    /// followed by `:`. Nested flow collections are then parsed once instead of once per
    /// enclosing level.
    fn json_key_may_end_in_colon(&self) -> bool {
        let visible = self.limit.min(self.chars.len()).min(self.pos.saturating_add(IMPLICIT_KEY_LIMIT));
        let chars = &self.chars[..visible];
        let mut i = self.pos;
        while matches!(chars.get(i), Some('!' | '&')) {
            while chars.get(i).is_some_and(|&ch| !is_white(ch) && !is_break(ch)) {
                i += 1;
            }
            while chars.get(i).copied().is_some_and(is_white) {
                i += 1;
            }
        }
        if !matches!(chars.get(i), Some('[' | '{' | '\'' | '"')) {
            return false;
        }

        let mut depth = 0usize;
        let mut prev = ' ';
        loop {
            let Some(&ch) = chars.get(i) else {
                return false;
            };
            let token_start = matches!(prev, '[' | '{' | ',' | ':' | '?' | ' ' | '\t');
            match ch {
                _ if is_break(ch) => return false,
                '[' | '{' => depth += 1,
                ']' | '}' => depth = depth.saturating_sub(1),
                '\'' | '"' if token_start => match closing_quote(chars, i) {
                    Some(close) => i = close,
                    None => return false,
                },
                // Verbatim tags may contain brackets.
                '!' if token_start && chars.get(i + 1) == Some(&'<') => {
                    match chars[i..].iter().position(|&c| c == '>') {
                        Some(offset) => i += offset,
                        None => return true,
                    }
                }
                _ => {}
            }
            prev = chars[i];
            i += 1;
            if depth == 0 {
                break;
            }
        }
        while chars.get(i).copied().is_some_and(is_white) {
            i += 1;
        }
        chars.get(i) == Some(&':')
    }
}

/// Index of the quote closing the one at `open`, if it is on the same line.
fn closing_quote(chars: &[char], open: usize) -> Option<usize> {
    let quote = chars[open];
    let mut i = open + 1;
    while let Some(&ch) = chars.get(i) {
        match ch {
            _ if is_break(ch) => return None,
            '\\' if quote == '"' => i += 1,
            '\'' if quote == '\'' && chars.get(i + 1) == Some(&'\'') => i += 1,
            _ if ch == quote => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}
