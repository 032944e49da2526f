//! Arena-backed operation forest
//!
//! Nodes live in a flat `Vec` in input order and refer to each other by
//! [`NodeIndex`]. Each node has at most one parent slot and owns an ordered
//! list of child indices, so the structure is a forest by construction and
//! never needs back-pointers into owned data.

use crate::diagnostic::TreeDiagnostic;
use crate::types::{Operation, OperationId, TreeOperation};
use crate::valuation::Valuation;

/// Position of a node in the forest arena (equals its input position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(pub(crate) usize);

impl NodeIndex {
    /// Raw arena position
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node in the arena
#[derive(Debug, Clone)]
pub struct ForestNode {
    pub(crate) operation: Operation,
    pub(crate) parent: Option<NodeIndex>,
    pub(crate) children: Vec<NodeIndex>,
}

impl ForestNode {
    pub(crate) fn new(operation: Operation) -> Self {
        Self {
            operation,
            parent: None,
            children: Vec::new(),
        }
    }

    /// The wrapped record
    #[inline]
    #[must_use]
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Resolved parent, `None` for roots
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    /// Children in input order
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }
}

/// Result of a tree build pass
#[derive(Debug, Clone, Default)]
pub struct Forest {
    pub(crate) nodes: Vec<ForestNode>,
    pub(crate) roots: Vec<NodeIndex>,
    pub(crate) diagnostics: Vec<TreeDiagnostic>,
}

impl Forest {
    /// Number of nodes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the forest has no nodes
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Root nodes, in the order they were placed
    #[inline]
    #[must_use]
    pub fn roots(&self) -> &[NodeIndex] {
        &self.roots
    }

    /// Node at `index`
    ///
    /// # Panics
    /// Panics if `index` does not come from this forest.
    #[inline]
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> &ForestNode {
        &self.nodes[index.0]
    }

    /// All nodes in input order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &ForestNode)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeIndex(i), node))
    }

    /// Diagnostics recorded during the build
    #[inline]
    #[must_use]
    pub fn diagnostics(&self) -> &[TreeDiagnostic] {
        &self.diagnostics
    }

    /// Identifiers of nodes promoted to root because their parent was missing
    pub fn orphans(&self) -> impl Iterator<Item = OperationId> + '_ {
        self.diagnostics.iter().filter_map(|d| match d {
            TreeDiagnostic::Orphan { operation_id, .. } => Some(*operation_id),
            _ => None,
        })
    }

    /// Last node carrying `id`, matching the lookup the build itself uses
    #[must_use]
    pub fn find(&self, id: OperationId) -> Option<NodeIndex> {
        self.nodes
            .iter()
            .rposition(|n| n.operation.id == id)
            .map(NodeIndex)
    }

    /// Nodes in depth-first pre-order; every parent precedes its children
    #[must_use]
    pub fn preorder(&self) -> Vec<NodeIndex> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeIndex> = self.roots.iter().rev().copied().collect();

        while let Some(index) = stack.pop() {
            order.push(index);
            stack.extend(self.nodes[index.0].children.iter().rev());
        }

        order
    }

    /// Depth of every node (roots are 0), indexed by arena position
    #[must_use]
    pub fn depths(&self) -> Vec<usize> {
        let mut depths = vec![0; self.nodes.len()];
        for index in self.preorder() {
            if let Some(parent) = self.nodes[index.0].parent {
                depths[index.0] = depths[parent.0] + 1;
            }
        }
        depths
    }

    /// Materialize the nested view, pairing each node with its running total
    ///
    /// # Panics
    /// Panics if `valuation` was derived from a different forest.
    #[must_use]
    pub fn to_tree_operations(&self, valuation: &Valuation) -> Vec<TreeOperation> {
        let mut built: Vec<Option<TreeOperation>> = vec![None; self.nodes.len()];

        // Reverse pre-order: children are finished before their parent.
        for index in self.preorder().into_iter().rev() {
            let node = &self.nodes[index.0];
            let children = node
                .children
                .iter()
                .filter_map(|child| built[child.0].take())
                .collect();
            let after_value = valuation.get(index).clone();

            built[index.0] = Some(TreeOperation {
                operation: node.operation.clone(),
                after_value,
                children,
            });
        }

        self.roots
            .iter()
            .filter_map(|root| built[root.0].take())
            .collect()
    }
}
