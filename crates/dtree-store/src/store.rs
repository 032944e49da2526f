//! Persistence boundary
//!
//! The service only talks to storage through [`DiscussionStore`]. Stores
//! assign identifiers and timestamps; they do not validate payloads.

use crate::error::StoreError;
use crate::types::{Discussion, DiscussionDraft, OperationDraft, User};
use async_trait::async_trait;
use dtree_core::{DiscussionId, Operation, OperationId, UserId};

/// Storage for users, discussions and operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DiscussionStore: Send + Sync {
    /// Persist a new user
    async fn insert_user(&self, name: String) -> Result<User, StoreError>;

    /// Look up a user
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Persist a new discussion together with its `START` operation
    ///
    /// Both records are written or neither is; the discussion is not
    /// visible to readers before its `START` is stored.
    async fn insert_discussion(&self, draft: DiscussionDraft) -> Result<Discussion, StoreError>;

    /// Look up a discussion
    async fn get_discussion(&self, id: DiscussionId) -> Result<Option<Discussion>, StoreError>;

    /// Replace a stored discussion
    async fn update_discussion(&self, discussion: Discussion) -> Result<(), StoreError>;

    /// Newest-first slice of discussions and the total count
    async fn list_discussions(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<Discussion>, usize), StoreError>;

    /// Persist a new operation
    async fn insert_operation(&self, draft: OperationDraft) -> Result<Operation, StoreError>;

    /// Look up an operation
    async fn get_operation(&self, id: OperationId) -> Result<Option<Operation>, StoreError>;

    /// Snapshot of a discussion's operations in creation order
    async fn operations_for(&self, discussion: DiscussionId) -> Result<Vec<Operation>, StoreError>;
}
