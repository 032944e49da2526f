//! Discussion Trees store and service
//!
//! Sits between request handlers and storage:
//! - [`DiscussionStore`] is the persistence boundary (async, pluggable)
//! - [`MemoryStore`] keeps everything in concurrent maps
//! - [`DiscussionService`] validates requests, enforces discussion
//!   lifecycle rules and builds valued operation trees on every read
//!
//! # Example
//!
//! ```rust,ignore
//! use dtree_store::{DiscussionService, NewDiscussion, NewOperation, ServiceConfig};
//! use dtree_core::OperationType;
//!
//! let service = DiscussionService::in_memory(ServiceConfig::default());
//! let alice = service.register_user("alice").await?;
//! let discussion = service
//!     .create_discussion(alice.id, NewDiscussion::new("Budget", 10.0))
//!     .await?;
//!
//! service
//!     .add_operation(
//!         alice.id,
//!         discussion.id,
//!         NewOperation::new(OperationType::Add, 5.0, discussion.start_id),
//!     )
//!     .await?;
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod memory;
pub mod service;
pub mod store;
pub mod types;

pub use config::ServiceConfig;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use service::DiscussionService;
pub use store::DiscussionStore;
pub use types::{
    current_value, Discussion, DiscussionDraft, DiscussionStatus, DiscussionSummary,
    DiscussionTree, NewDiscussion, NewOperation, OperationDraft, Page, PageQuery, User,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
