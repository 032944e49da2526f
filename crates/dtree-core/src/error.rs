//! Error types for tree construction and valuation
//!
//! Structural problems (orphans, broken cycles) never surface here; they are
//! recovered locally and reported as diagnostics. Only duplicate identifiers
//! under the rejecting policy and numeric failures under the aborting policy
//! become errors.

use crate::types::OperationId;
use serde::{Deserialize, Serialize};

/// Tree construction errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TreeError {
    /// Two input records share an identifier
    #[error("duplicate operation id {id}")]
    DuplicateId {
        /// The colliding identifier
        id: OperationId,
    },

    /// Value derivation failed and the policy is to abort
    #[error("valuation failed: {0}")]
    Valuation(#[from] ValuationError),
}

impl TreeError {
    /// Operation the error is attributed to
    #[must_use]
    pub fn operation_id(&self) -> OperationId {
        match self {
            TreeError::DuplicateId { id } => *id,
            TreeError::Valuation(e) => e.operation_id(),
        }
    }
}

/// Text that names no operation type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operation type: {input}")]
pub struct ParseOperationTypeError {
    /// Rejected input
    pub input: String,
}

/// Numeric failures while deriving running totals
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ValuationError {
    /// A `DIVIDE` step with a zero operand
    #[error("division by zero at operation {operation_id}")]
    DivisionByZero {
        /// Offending operation
        operation_id: OperationId,
    },

    /// The step produced an infinite or NaN total
    #[error("non-finite result at operation {operation_id}")]
    NonFiniteResult {
        /// Offending operation
        operation_id: OperationId,
    },

    /// An ancestor has no value, so neither does this node
    #[error("ancestor operation {operation_id} has no value")]
    ParentUnavailable {
        /// The ancestor whose own step failed
        operation_id: OperationId,
    },
}

impl ValuationError {
    /// Operation the failure originated at
    #[inline]
    #[must_use]
    pub fn operation_id(&self) -> OperationId {
        match self {
            ValuationError::DivisionByZero { operation_id }
            | ValuationError::NonFiniteResult { operation_id }
            | ValuationError::ParentUnavailable { operation_id } => *operation_id,
        }
    }

    /// Error to attach to descendants of a node that failed with `self`
    #[must_use]
    pub fn propagated(&self) -> ValuationError {
        match self {
            ValuationError::ParentUnavailable { .. } => self.clone(),
            _ => ValuationError::ParentUnavailable {
                operation_id: self.operation_id(),
            },
        }
    }
}
