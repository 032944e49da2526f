//! Tree Builder
//!
//! Turns an unordered flat list of parent-referencing operation records into
//! a [`Forest`].
//!
//! # Algorithm
//! 1. Index every record by identifier (one pass).
//! 2. Attach every record, in input order, to the record its `parent_id`
//!    resolves to. Records without a parent become roots; records whose
//!    parent is missing become roots with an `Orphan` diagnostic.
//! 3. Any records still unreachable from a root sit on (or below) a parent
//!    cycle. One member per cycle is detached and promoted to root, so no
//!    record is dropped.
//!
//! Child order is input order. The identifier map is local to each call.

use crate::config::{DuplicatePolicy, TreeConfig};
use crate::diagnostic::TreeDiagnostic;
use crate::error::TreeError;
use crate::forest::{Forest, ForestNode, NodeIndex};
use crate::types::{Operation, OperationId};
use std::collections::{HashMap, HashSet};

/// Builds forests according to a [`TreeConfig`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeBuilder {
    config: TreeConfig,
}

impl TreeBuilder {
    /// Create a builder
    #[inline]
    #[must_use]
    pub fn new(config: TreeConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Build a forest from one discussion's operations
    ///
    /// # Errors
    /// Returns [`TreeError::DuplicateId`] when two records share an
    /// identifier and the duplicate policy is `Reject`.
    pub fn build(&self, operations: &[Operation]) -> Result<Forest, TreeError> {
        let mut diagnostics = Vec::new();
        let mut nodes: Vec<ForestNode> = operations.iter().cloned().map(ForestNode::new).collect();

        // Pass 1: identifier -> arena position.
        let mut by_id: HashMap<OperationId, NodeIndex> = HashMap::with_capacity(operations.len());
        for (i, op) in operations.iter().enumerate() {
            if by_id.insert(op.id, NodeIndex(i)).is_some() {
                match self.config.duplicate_policy {
                    DuplicatePolicy::Reject => return Err(TreeError::DuplicateId { id: op.id }),
                    DuplicatePolicy::LastWins => {
                        tracing::warn!(operation_id = %op.id, "Duplicate operation id, later record wins");
                        diagnostics.push(TreeDiagnostic::DuplicateId { operation_id: op.id });
                    }
                }
            }
        }

        // Pass 2: attach in input order.
        let mut roots = Vec::new();
        for (i, op) in operations.iter().enumerate() {
            let index = NodeIndex(i);
            match op.parent_id {
                None => roots.push(index),
                Some(parent_id) => match by_id.get(&parent_id) {
                    Some(&parent) => {
                        nodes[i].parent = Some(parent);
                        nodes[parent.0].children.push(index);
                    }
                    None => {
                        tracing::warn!(
                            operation_id = %op.id,
                            parent_id = %parent_id,
                            "Orphan operation found, treating as root"
                        );
                        diagnostics.push(TreeDiagnostic::Orphan {
                            operation_id: op.id,
                            missing_parent: parent_id,
                        });
                        roots.push(index);
                    }
                },
            }
        }

        let mut forest = Forest {
            nodes,
            roots,
            diagnostics,
        };
        break_cycles(&mut forest);

        tracing::debug!(
            nodes = forest.len(),
            roots = forest.roots.len(),
            diagnostics = forest.diagnostics.len(),
            "Built operation forest"
        );

        Ok(forest)
    }
}

/// Build a forest with the default configuration
///
/// # Errors
/// Returns [`TreeError::DuplicateId`] when two records share an identifier.
pub fn build_tree(operations: &[Operation]) -> Result<Forest, TreeError> {
    TreeBuilder::default().build(operations)
}

/// Promote one member of every unreachable parent cycle to root
fn break_cycles(forest: &mut Forest) {
    let mut reachable = vec![false; forest.nodes.len()];
    for root in forest.roots.clone() {
        mark_subtree(forest, root, &mut reachable);
    }

    for start in 0..forest.nodes.len() {
        if reachable[start] {
            continue;
        }

        // Unreachable means the parent chain never ends at a root, so walking
        // it must revisit a node; that node lies on the cycle.
        let mut seen = HashSet::new();
        let mut current = NodeIndex(start);
        while seen.insert(current) {
            match forest.nodes[current.0].parent {
                Some(parent) => current = parent,
                None => break,
            }
        }

        let Some(parent) = forest.nodes[current.0].parent.take() else {
            // Only roots lack a parent, and roots are reachable.
            continue;
        };
        forest.nodes[parent.0].children.retain(|&c| c != current);
        forest.roots.push(current);

        let operation_id = forest.nodes[current.0].operation.id;
        let former_parent = forest.nodes[parent.0].operation.id;
        tracing::warn!(
            operation_id = %operation_id,
            former_parent = %former_parent,
            "Operation is on a parent cycle, treating as root"
        );
        forest.diagnostics.push(TreeDiagnostic::CycleBroken {
            operation_id,
            former_parent,
        });

        mark_subtree(forest, current, &mut reachable);
    }
}

fn mark_subtree(forest: &Forest, from: NodeIndex, reachable: &mut [bool]) {
    let mut stack = vec![from];
    while let Some(index) = stack.pop() {
        if reachable[index.0] {
            continue;
        }
        reachable[index.0] = true;
        stack.extend(forest.nodes[index.0].children.iter().copied());
    }
}
