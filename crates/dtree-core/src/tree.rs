//! Build-and-value in one call
//!
//! This is the entry point most callers want: it runs the tree builder, derives
//! running totals and hands back the nested view together with whatever
//! diagnostics the build produced.

use crate::builder::TreeBuilder;
use crate::config::TreeConfig;
use crate::diagnostic::TreeDiagnostic;
use crate::error::TreeError;
use crate::types::{AfterValue, Operation, OperationId, TreeOperation};
use crate::valuation::derive_values;
use serde::{Deserialize, Serialize};

/// Valued operation forest, ready for rendering
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationTree {
    /// Root operations; children reachable by traversal
    pub roots: Vec<TreeOperation>,
    /// Structural irregularities recovered from during the build
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<TreeDiagnostic>,
}

impl OperationTree {
    /// Total number of nodes across all roots
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.iter().map(TreeOperation::subtree_len).sum()
    }

    /// Whether the forest has no nodes
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Find a node anywhere in the forest
    #[must_use]
    pub fn find(&self, id: OperationId) -> Option<&TreeOperation> {
        self.roots.iter().find_map(|root| root.find(id))
    }

    /// Running total of a node, if it exists
    #[must_use]
    pub fn after_value(&self, id: OperationId) -> Option<&AfterValue> {
        self.find(id).map(|node| &node.after_value)
    }

    /// Visit every node depth-first, parents before children
    pub fn walk(&self, mut visit: impl FnMut(&TreeOperation, usize)) {
        let mut stack: Vec<(&TreeOperation, usize)> =
            self.roots.iter().rev().map(|r| (r, 0)).collect();
        while let Some((node, depth)) = stack.pop() {
            visit(node, depth);
            stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
        }
    }
}

/// Build the forest for one discussion and derive every running total
///
/// # Errors
/// - [`TreeError::DuplicateId`] under `DuplicatePolicy::Reject`
/// - [`TreeError::Valuation`] under `ValuationPolicy::Abort`
pub fn build_operation_tree(
    operations: &[Operation],
    initial_value: f64,
    config: &TreeConfig,
) -> Result<OperationTree, TreeError> {
    let forest = TreeBuilder::new(*config).build(operations)?;
    let valuation = derive_values(&forest, initial_value, config.valuation_policy)?;

    Ok(OperationTree {
        roots: forest.to_tree_operations(&valuation),
        diagnostics: forest.diagnostics().to_vec(),
    })
}
