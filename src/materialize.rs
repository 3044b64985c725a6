//! Turning node trees into [`Value`]s.

use ahash::AHashMap;
use log::trace;

use crate::budget::BudgetEnforcer;
use crate::error::Error;
use crate::location::Source;
use crate::node::Node;
use crate::schema::Schema;
use crate::tags::Tag;
use crate::value::{Dictionary, Value};

/// Applies a schema to node trees.
///
/// The value built for an anchored node is remembered, so every alias of it gets a copy
/// without re-running tag resolution. Each copy still counts against the materialized-values
/// budget.
pub(crate) struct Materializer<'a> {
    schema: &'a Schema,
    source: Option<&'a Source>,
    budget: &'a mut BudgetEnforcer,
    /// Built value of each anchor, keyed by address, with the number of values it holds.
    memo: AHashMap<usize, (Value, usize)>,
}

impl<'a> Materializer<'a> {
    pub(crate) fn new(schema: &'a Schema, source: Option<&'a Source>, budget: &'a mut BudgetEnforcer) -> Self {
        Self {
            schema,
            source,
            budget,
            memo: AHashMap::new(),
        }
    }

    pub(crate) fn value(&mut self, node: &Node) -> Result<Value, Error> {
        let mut path = Vec::new();
        self.build(node, &mut path)
    }

    fn locate(&self, err: Error, node: &Node) -> Error {
        match self.source {
            Some(source) => err.at(source, node.location().offset() as usize),
            None => err.with_location(node.location()),
        }
    }

    fn count(&mut self, values: usize, node: &Node) -> Result<(), Error> {
        self.budget
            .observe_materialized(values)
            .map_err(|breach| self.locate(Error::budget(breach), node))
    }

    fn resolve(&self, node: &Node, path: &[&Node]) -> Result<Tag, Error> {
        let Some(tag) = node.tag() else {
            return Err(self.locate(Error::tag("alias has no tag"), node));
        };
        self.schema
            .resolve(tag, path, node)
            .map_err(|msg| self.locate(Error::tag(msg), node))
    }

    fn build<'n>(&mut self, node: &'n Node, path: &mut Vec<&'n Node>) -> Result<Value, Error> {
        match node {
            Node::Alias { anchor, .. } => {
                let key = std::rc::Rc::as_ptr(anchor) as usize;
                if let Some(size) = self.memo.get(&key).map(|(_, size)| *size) {
                    self.count(size, node)?;
                    trace!("alias *{} reused ({size} values)", anchor.name());
                    if let Some((value, _)) = self.memo.get(&key) {
                        return Ok(value.clone());
                    }
                }
                let Some(target) = anchor.node() else {
                    return Err(self.locate(Error::circular_alias(anchor.name()), node));
                };
                if anchor.busy.replace(true) {
                    return Err(self.locate(Error::circular_alias(anchor.name()), node));
                }
                let before = self.budget.report().materialized_values;
                let result = self.build(target, path);
                anchor.busy.set(false);
                let value = result?;
                let size = self.budget.report().materialized_values - before;
                self.memo.insert(key, (value.clone(), size));
                Ok(value)
            }
            Node::Scalar { content, .. } => {
                self.count(1, node)?;
                let tag = self.resolve(node, path)?;
                tag.construct_scalar(content)
                    .map_err(|msg| self.locate(Error::tag(msg), node))
            }
            Node::Sequence { items, .. } => {
                self.count(1, node)?;
                let tag = self.resolve(node, path)?;
                if tag != Tag::Seq {
                    return Err(self.locate(Error::tag(format!("{tag} cannot be applied to a sequence")), node));
                }
                path.push(node);
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.build(item, path)?);
                }
                path.pop();
                Ok(Value::Array(out))
            }
            Node::Mapping { entries, .. } => {
                self.count(1, node)?;
                let tag = self.resolve(node, path)?;
                if tag != Tag::Map {
                    return Err(self.locate(Error::tag(format!("{tag} cannot be applied to a mapping")), node));
                }
                path.push(node);
                let mut out = Dictionary::with_capacity_and_hasher(entries.len(), Default::default());
                for (key, value) in entries {
                    let key = self.build(key, path)?;
                    let value = self.build(value, path)?;
                    out.insert(key, value);
                }
                path.pop();
                Ok(Value::Dictionary(out))
            }
        }
    }
}
