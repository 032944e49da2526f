//! Discussion Trees core
//!
//! A discussion is seeded with an initial value; participants append
//! arithmetic steps to any earlier step, forming a forest of running totals.
//! This crate:
//! - Assembles a forest from flat, parent-referencing operation records
//! - Recovers from orphans and parent cycles with diagnostics
//! - Derives the running total (`after_value`) of every node
//!
//! # Example
//!
//! ```rust
//! use dtree_core::{build_operation_tree, Operation, OperationId, OperationType, TreeConfig};
//!
//! let ops = vec![
//!     Operation::new(1, None, OperationType::Start, 0.0),
//!     Operation::new(2, Some(1), OperationType::Add, 5.0),
//! ];
//! let tree = build_operation_tree(&ops, 10.0, &TreeConfig::default()).unwrap();
//!
//! assert_eq!(tree.roots[0].children[0].after_value.value(), Some(15.0));
//! assert_eq!(tree.find(OperationId(2)).map(|n| n.children.len()), Some(0));
//! ```

#![warn(unreachable_pub)]

pub mod builder;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod forest;
pub mod tree;
pub mod types;
pub mod valuation;

pub use builder::{build_tree, TreeBuilder};
pub use config::{DuplicatePolicy, TreeConfig, ValuationPolicy};
pub use diagnostic::TreeDiagnostic;
pub use error::{ParseOperationTypeError, TreeError, ValuationError};
pub use forest::{Forest, ForestNode, NodeIndex};
pub use tree::{build_operation_tree, OperationTree};
pub use types::{
    AfterValue, DiscussionId, Operation, OperationId, OperationType, TreeOperation, UserId,
    UserRef,
};
pub use valuation::{apply, derive_values, Valuation};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with operation trees
    pub use crate::{
        build_operation_tree, build_tree, AfterValue, Operation, OperationId, OperationTree,
        OperationType, TreeConfig, TreeDiagnostic, TreeError, TreeOperation,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
