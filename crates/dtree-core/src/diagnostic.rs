//! Non-fatal findings recorded while assembling a forest

use crate::types::OperationId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A structural irregularity that was recovered from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TreeDiagnostic {
    /// Parent reference did not resolve; node promoted to root
    Orphan {
        /// The promoted node
        operation_id: OperationId,
        /// The parent it referenced
        missing_parent: OperationId,
    },

    /// Identifier seen more than once; the later record owns it
    DuplicateId {
        /// The colliding identifier
        operation_id: OperationId,
    },

    /// Node sat on a parent cycle; detached and promoted to root
    CycleBroken {
        /// The promoted node
        operation_id: OperationId,
        /// The parent it referenced
        former_parent: OperationId,
    },
}

impl TreeDiagnostic {
    /// Node the diagnostic is about
    #[inline]
    #[must_use]
    pub fn operation_id(&self) -> OperationId {
        match self {
            TreeDiagnostic::Orphan { operation_id, .. }
            | TreeDiagnostic::DuplicateId { operation_id }
            | TreeDiagnostic::CycleBroken { operation_id, .. } => *operation_id,
        }
    }

    /// Whether the node ended up as a root it did not ask to be
    #[inline]
    #[must_use]
    pub fn promoted_to_root(&self) -> bool {
        matches!(
            self,
            TreeDiagnostic::Orphan { .. } | TreeDiagnostic::CycleBroken { .. }
        )
    }
}

impl fmt::Display for TreeDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeDiagnostic::Orphan {
                operation_id,
                missing_parent,
            } => write!(
                f,
                "orphan operation {operation_id}: parent {missing_parent} not found, treating as root"
            ),
            TreeDiagnostic::DuplicateId { operation_id } => {
                write!(f, "duplicate operation id {operation_id}: later record wins")
            }
            TreeDiagnostic::CycleBroken {
                operation_id,
                former_parent,
            } => write!(
                f,
                "operation {operation_id} is on a parent cycle via {former_parent}, treating as root"
            ),
        }
    }
}
