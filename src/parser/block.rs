//! Block nodes: indentation-delimited sequences and mappings, and the block scalar wrapper.

use super::chars::{Context, is_ns_char};
use super::{MappingBuilder, PResult, Parser};
use crate::node::{Node, NodeTag};

/// `seq-spaces(n,c)`: a sequence that is the value of a block mapping entry may start at the
/// indentation of its key.
fn seq_spaces(n: i32, c: Context) -> i32 {
    if c == Context::BlockOut { n - 1 } else { n }
}

impl Parser<'_> {
    /// `s-l+block-node(n,c)`
    pub(crate) fn s_l_block_node(&mut self, n: i32, c: Context) -> PResult<Node> {
        if let Some(node) = self.opt(|p| p.s_l_block_in_block(n, c))? {
            return Ok(node);
        }
        self.s_l_flow_in_block(n)
    }

    /// `s-l+flow-in-block(n)`
    fn s_l_flow_in_block(&mut self, n: i32) -> PResult<Node> {
        self.attempt(|p| {
            p.s_separate(n + 1, Context::FlowOut)?;
            let node = p.ns_flow_node(n + 1, Context::FlowOut)?;
            p.s_l_comments()?;
            Ok(node)
        })
    }

    /// `s-l+block-in-block(n,c)`
    fn s_l_block_in_block(&mut self, n: i32, c: Context) -> PResult<Node> {
        if let Some(node) = self.opt(|p| p.s_l_block_scalar(n, c))? {
            return Ok(node);
        }
        self.s_l_block_collection(n, c)
    }

    /// `s-l+block-scalar(n,c)`
    fn s_l_block_scalar(&mut self, n: i32, c: Context) -> PResult<Node> {
        self.attempt(|p| {
            p.s_separate(n + 1, c)?;
            let props = p.opt(|p| {
                let props = p.c_ns_properties(n + 1, c)?;
                p.s_separate(n + 1, c)?;
                Ok(props)
            })?;
            if !matches!(p.peek(), Some('|' | '>')) {
                return p.fail("block scalar");
            }
            let start = p.pos;
            let content = p.c_l_block_scalar(n)?;
            let node = Node::Scalar {
                content,
                tag: NodeTag::NonSpecific,
                location: p.location(start),
            };
            Ok(p.finish_node(props, node))
        })
    }

    /// `s-l+block-collection(n,c)`
    fn s_l_block_collection(&mut self, n: i32, c: Context) -> PResult<Node> {
        self.attempt(|p| {
            // Properties followed by more content on the same line belong to the first key.
            let props = p.opt(|p| {
                p.s_separate(n + 1, c)?;
                let props = p.c_ns_properties(n + 1, c)?;
                p.s_l_comments()?;
                Ok(props)
            })?;
            if props.is_none() {
                p.s_l_comments()?;
            }
            let node = match p.opt(|p| p.l_block_sequence(seq_spaces(n, c)))? {
                Some(node) => node,
                None => p.l_block_mapping(n)?,
            };
            Ok(p.finish_node(props, node))
        })
    }

    /// Indentation of the collection starting on this line, which must be deeper than `n`.
    fn detect_collection_indent(&mut self, n: i32) -> PResult<i32> {
        let k = self.count_spaces() as i32;
        if k <= n {
            return self.fail("more indented content");
        }
        Ok(k)
    }

    /// `l+block-sequence(n)`
    fn l_block_sequence(&mut self, n: i32) -> PResult<Node> {
        self.attempt(|p| {
            let k = p.detect_collection_indent(n)?;
            let location = p.location(p.pos + k as usize);
            p.nested(|p| {
                let items = p.many(|p| {
                    p.s_indent(k)?;
                    p.c_l_block_seq_entry(k)
                })?;
                if items.is_empty() {
                    return p.fail("'-'");
                }
                Ok(Node::Sequence {
                    items,
                    tag: NodeTag::Unspecified,
                    location,
                })
            })
        })
    }

    /// `c-l-block-seq-entry(n)`: `-` not followed by an `ns-char`.
    fn c_l_block_seq_entry(&mut self, n: i32) -> PResult<Node> {
        self.attempt(|p| {
            if p.peek() != Some('-') || p.peek_at(1).is_some_and(is_ns_char) {
                return p.fail("'-'");
            }
            p.bump();
            p.s_l_block_indented(n, Context::BlockIn)
        })
    }

    /// `s-l+block-indented(n,c)`: a compact collection on the same line, any block node, or
    /// nothing.
    fn s_l_block_indented(&mut self, n: i32, c: Context) -> PResult<Node> {
        let compact = self.opt(|p| {
            let m = p.count_spaces() as i32;
            p.s_indent(m)?;
            match p.opt(|p| p.ns_l_compact_sequence(n + 1 + m))? {
                Some(node) => Ok(node),
                None => p.ns_l_compact_mapping(n + 1 + m),
            }
        })?;
        if let Some(node) = compact {
            return Ok(node);
        }
        if let Some(node) = self.opt(|p| p.s_l_block_node(n, c))? {
            return Ok(node);
        }
        self.attempt(|p| {
            let node = p.empty_node();
            p.s_l_comments()?;
            Ok(node)
        })
    }

    /// `ns-l-compact-sequence(n)`: `- - a` style nesting.
    fn ns_l_compact_sequence(&mut self, n: i32) -> PResult<Node> {
        self.attempt(|p| {
            let location = p.location(p.pos);
            p.nested(|p| {
                let mut items = vec![p.c_l_block_seq_entry(n)?];
                items.extend(p.many(|p| {
                    p.s_indent(n)?;
                    p.c_l_block_seq_entry(n)
                })?);
                Ok(Node::Sequence {
                    items,
                    tag: NodeTag::Unspecified,
                    location,
                })
            })
        })
    }

    /// `l+block-mapping(n)`
    fn l_block_mapping(&mut self, n: i32) -> PResult<Node> {
        self.attempt(|p| {
            let k = p.detect_collection_indent(n)?;
            let location = p.location(p.pos + k as usize);
            p.nested(|p| {
                let mut builder = MappingBuilder::default();
                let count = p.skip_many(|p| {
                    p.s_indent(k)?;
                    let (key, value) = p.ns_l_block_map_entry(k)?;
                    p.insert_entry(&mut builder, key, value)
                })?;
                if count == 0 {
                    return p.fail("mapping entry");
                }
                Ok(Node::Mapping {
                    entries: builder.into_entries(),
                    tag: NodeTag::Unspecified,
                    location,
                })
            })
        })
    }

    /// `ns-l-compact-mapping(n)`: a mapping starting on the line of a `-` or `?`.
    fn ns_l_compact_mapping(&mut self, n: i32) -> PResult<Node> {
        self.attempt(|p| {
            let location = p.location(p.pos);
            p.nested(|p| {
                let mut builder = MappingBuilder::default();
                let (key, value) = p.ns_l_block_map_entry(n)?;
                p.insert_entry(&mut builder, key, value)?;
                p.skip_many(|p| {
                    p.s_indent(n)?;
                    let (key, value) = p.ns_l_block_map_entry(n)?;
                    p.insert_entry(&mut builder, key, value)
                })?;
                Ok(Node::Mapping {
                    entries: builder.into_entries(),
                    tag: NodeTag::Unspecified,
                    location,
                })
            })
        })
    }

    /// `ns-l-block-map-entry(n)`
    fn ns_l_block_map_entry(&mut self, n: i32) -> PResult<(Node, Node)> {
        if self.peek() == Some('?') && !self.peek_at(1).is_some_and(is_ns_char) {
            self.c_l_block_map_explicit_entry(n)
        } else {
            self.ns_l_block_map_implicit_entry(n)
        }
    }

    /// `c-l-block-map-explicit-entry(n)`: `? key` with an optional `: value` line.
    fn c_l_block_map_explicit_entry(&mut self, n: i32) -> PResult<(Node, Node)> {
        self.attempt(|p| {
            p.expect('?', "'?'")?;
            let key = p.s_l_block_indented(n, Context::BlockOut)?;
            let value = p.opt(|p| {
                p.s_indent(n)?;
                if p.peek() != Some(':') || p.peek_at(1).is_some_and(is_ns_char) {
                    return p.fail("':'");
                }
                p.bump();
                p.s_l_block_indented(n, Context::BlockOut)
            })?;
            let value = match value {
                Some(value) => value,
                None => p.empty_node(),
            };
            Ok((key, value))
        })
    }

    /// `ns-l-block-map-implicit-entry(n)`: a single-line key (possibly empty), `:` and value.
    fn ns_l_block_map_implicit_entry(&mut self, n: i32) -> PResult<(Node, Node)> {
        self.attempt(|p| {
            let key = match p.opt(|p| p.ns_s_block_map_implicit_key())? {
                Some(key) => key,
                None => p.empty_node(),
            };
            let value = p.c_l_block_map_implicit_value(n)?;
            Ok((key, value))
        })
    }

    /// `ns-s-block-map-implicit-key`
    fn ns_s_block_map_implicit_key(&mut self) -> PResult<Node> {
        if let Some(key) = self.opt(|p| p.c_s_implicit_json_key(Context::BlockKey))? {
            return Ok(key);
        }
        self.ns_s_implicit_yaml_key(Context::BlockKey)
    }

    /// `c-l-block-map-implicit-value(n)`
    fn c_l_block_map_implicit_value(&mut self, n: i32) -> PResult<Node> {
        self.expect(':', "':'")?;
        if let Some(node) = self.opt(|p| p.s_l_block_node(n, Context::BlockOut))? {
            return Ok(node);
        }
        self.attempt(|p| {
            let node = p.empty_node();
            p.s_l_comments()?;
            Ok(node)
        })
    }
}
