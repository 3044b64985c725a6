//! Resource budget for a YAML load.
//!
//! The grammar engine is recursive and aliases may be expanded many times during
//! materialization, so a hostile stream can cost far more than its size suggests.
//! A [`Budget`] puts simple caps on the work performed for one stream.

use serde::{Deserialize, Serialize};

use crate::node::Node;

/// Budgets for loading one YAML stream.
///
/// The defaults are permissive for typical configuration files while stopping obvious
/// resource-amplifying inputs (deep nesting, alias bombs).
///
/// ```rust
/// let options = yaml_loader::options! {
///     budget: Some(yaml_loader::budget! {
///         max_documents: 1,
///     }),
/// };
///
/// let err = yaml_loader::load_all_with_options("a\n---\nb\n", options).unwrap_err();
/// assert!(matches!(err, yaml_loader::Error::Budget { .. }));
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Budget {
    /// Maximum structural nesting depth (sequences + mappings) while parsing.
    ///
    /// Every level costs several recursive grammar frames, so the default keeps an unoptimized
    /// build within a 2 MiB thread stack. Raise it only together with the stack size.
    ///
    /// Default: 64
    pub max_depth: usize,
    /// Maximum number of YAML documents in the stream.
    ///
    /// Default: 1,024
    pub max_documents: usize,
    /// Maximum number of nodes (scalars, sequences, mappings) across the stream.
    ///
    /// Default: 250,000
    pub max_nodes: usize,
    /// Maximal total number of anchors (`&anchor` definitions).
    ///
    /// Default: 50,000
    pub max_anchors: usize,
    /// Maximum number of alias (`*ref`) nodes allowed.
    ///
    /// Default: 50,000
    pub max_aliases: usize,
    /// Maximum total bytes of scalar contents.
    ///
    /// Default: 67,108,864 (64 MiB)
    pub max_total_scalar_bytes: usize,
    /// Maximum number of values created while materializing the node trees. Every value copied
    /// out of an alias counts again, which is what stops alias bombs.
    ///
    /// Default: 10,000,000
    pub max_materialized_values: usize,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            max_depth: 64,                            // fits a 2 MiB stack in debug builds
            max_documents: 1_024,                     // doc separator storms
            max_nodes: 250_000,                       // sequences + maps + scalars
            max_anchors: 50_000,
            max_aliases: 50_000,
            max_total_scalar_bytes: 64 * 1024 * 1024, // 64 MiB of scalar text
            max_materialized_values: 10_000_000,      // alias expansion
        }
    }
}

impl Budget {
    /// A budget that never trips. Used when [`crate::Options::budget`] is `None`.
    pub fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
            max_documents: usize::MAX,
            max_nodes: usize::MAX,
            max_anchors: usize::MAX,
            max_aliases: usize::MAX,
            max_total_scalar_bytes: usize::MAX,
            max_materialized_values: usize::MAX,
        }
    }
}

/// What tripped the budget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetBreach {
    /// The structural nesting depth exceeded [`Budget::max_depth`].
    Depth {
        /// Depth reached when the breach occurred.
        depth: usize,
    },

    /// The number of YAML documents exceeded [`Budget::max_documents`].
    Documents {
        /// Total documents observed at the moment of the breach.
        documents: usize,
    },

    /// The number of nodes exceeded [`Budget::max_nodes`].
    Nodes {
        /// Total nodes observed at the moment of the breach.
        nodes: usize,
    },

    /// The number of anchors exceeded [`Budget::max_anchors`].
    Anchors {
        /// Total anchors observed at the moment of the breach.
        anchors: usize,
    },

    /// The number of alias nodes exceeded [`Budget::max_aliases`].
    Aliases {
        /// Total aliases observed at the moment of the breach.
        aliases: usize,
    },

    /// The cumulative size of scalar contents exceeded [`Budget::max_total_scalar_bytes`].
    ScalarBytes {
        /// Sum of scalar content lengths seen so far.
        total_scalar_bytes: usize,
    },

    /// Materialization produced more than [`Budget::max_materialized_values`] values.
    MaterializedValues {
        /// Values produced at the moment of the breach.
        values: usize,
    },
}

/// Summary of the work done so far (even if no breach).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BudgetReport {
    /// `Some(..)` if a limit was exceeded; `None` if all budgets were respected.
    pub breached: Option<BudgetBreach>,
    /// Total number of YAML documents in the stream.
    pub documents: usize,
    /// Total number of nodes encountered.
    pub nodes: usize,
    /// Total number of anchors defined.
    pub anchors: usize,
    /// Total number of alias nodes.
    pub aliases: usize,
    /// Maximum nesting depth reached while parsing.
    pub max_depth: usize,
    /// Sum of bytes across all scalar contents, saturating on overflow.
    pub total_scalar_bytes: usize,
    /// Values produced by materialization, counting alias copies.
    pub materialized_values: usize,
}

/// Stateful helper that enforces a [`Budget`] over one stream.
#[derive(Debug)]
pub struct BudgetEnforcer {
    budget: Budget,
    report: BudgetReport,
}

impl BudgetEnforcer {
    /// Create a new enforcer for the provided `budget`.
    pub fn new(budget: Budget) -> Self {
        Self {
            budget,
            report: BudgetReport::default(),
        }
    }

    /// Counters accumulated so far.
    pub fn report(&self) -> &BudgetReport {
        &self.report
    }

    fn breach(&mut self, breach: BudgetBreach) -> Result<(), BudgetBreach> {
        self.report.breached = Some(breach.clone());
        Err(breach)
    }

    /// Called each time the parser enters a collection at nesting `depth`.
    pub(crate) fn check_depth(&mut self, depth: usize) -> Result<(), BudgetBreach> {
        if depth > self.report.max_depth {
            self.report.max_depth = depth;
        }
        if depth > self.budget.max_depth {
            return self.breach(BudgetBreach::Depth { depth });
        }
        Ok(())
    }

    /// Called before a new document is parsed.
    pub(crate) fn start_document(&mut self) -> Result<(), BudgetBreach> {
        self.report.documents += 1;
        if self.report.documents > self.budget.max_documents {
            let documents = self.report.documents;
            return self.breach(BudgetBreach::Documents { documents });
        }
        Ok(())
    }

    /// Account for a finished document: its node tree and the anchors it defined.
    pub(crate) fn observe_document(&mut self, root: &Node, anchors: usize) -> Result<(), BudgetBreach> {
        self.report.anchors = self.report.anchors.saturating_add(anchors);
        if self.report.anchors > self.budget.max_anchors {
            let anchors = self.report.anchors;
            return self.breach(BudgetBreach::Anchors { anchors });
        }
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            match node {
                Node::Alias { .. } => {
                    self.report.aliases += 1;
                    if self.report.aliases > self.budget.max_aliases {
                        let aliases = self.report.aliases;
                        return self.breach(BudgetBreach::Aliases { aliases });
                    }
                    continue;
                }
                Node::Scalar { content, .. } => {
                    self.report.total_scalar_bytes =
                        self.report.total_scalar_bytes.saturating_add(content.len());
                    if self.report.total_scalar_bytes > self.budget.max_total_scalar_bytes {
                        let total_scalar_bytes = self.report.total_scalar_bytes;
                        return self.breach(BudgetBreach::ScalarBytes { total_scalar_bytes });
                    }
                }
                Node::Sequence { items, .. } => stack.extend(items.iter()),
                Node::Mapping { entries, .. } => {
                    for (key, value) in entries {
                        stack.push(key);
                        stack.push(value);
                    }
                }
            }
            self.report.nodes += 1;
            if self.report.nodes > self.budget.max_nodes {
                let nodes = self.report.nodes;
                return self.breach(BudgetBreach::Nodes { nodes });
            }
        }
        Ok(())
    }

    /// Account for `count` values produced by materialization.
    pub(crate) fn observe_materialized(&mut self, count: usize) -> Result<(), BudgetBreach> {
        self.report.materialized_values = self.report.materialized_values.saturating_add(count);
        if self.report.materialized_values > self.budget.max_materialized_values {
            let values = self.report.materialized_values;
            return self.breach(BudgetBreach::MaterializedValues { values });
        }
        Ok(())
    }
}
