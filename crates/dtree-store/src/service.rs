//! Discussion service
//!
//! Validates requests, delegates persistence to a [`DiscussionStore`] and
//! produces the read models renderers consume:
//! - Discussion lists with current values and operation counts
//! - Filtered, paginated operation lists
//! - Valued operation trees

use crate::config::ServiceConfig;
use crate::error::StoreError;
use crate::memory::MemoryStore;
use crate::store::DiscussionStore;
use crate::types::{
    current_value, Discussion, DiscussionDraft, DiscussionStatus, DiscussionSummary,
    DiscussionTree, NewDiscussion, NewOperation, OperationDraft, Page, PageQuery, User,
};
use chrono::Utc;
use dtree_core::{
    build_operation_tree, DiscussionId, Operation, OperationId, OperationTree, OperationType,
    UserId,
};
use tokio::sync::Mutex;

/// Discussion service over a store
#[derive(Debug)]
pub struct DiscussionService<S> {
    store: S,
    config: ServiceConfig,
    /// Serializes check-then-write sequences (append, end)
    write_lock: Mutex<()>,
}

impl DiscussionService<MemoryStore> {
    /// Service backed by a fresh in-memory store
    #[must_use]
    pub fn in_memory(config: ServiceConfig) -> Self {
        Self::new(MemoryStore::new(), config)
    }
}

impl<S: DiscussionStore> DiscussionService<S> {
    /// Create a service
    #[must_use]
    pub fn new(store: S, config: ServiceConfig) -> Self {
        Self {
            store,
            config,
            write_lock: Mutex::new(()),
        }
    }

    /// Underlying store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Register a participant
    ///
    /// # Errors
    /// Rejects blank names.
    pub async fn register_user(&self, name: &str) -> Result<User, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::validation("name must not be empty"));
        }
        let user = self.store.insert_user(name.to_string()).await?;
        tracing::info!(user_id = %user.id, "Registered user");
        Ok(user)
    }

    /// Look up a participant
    ///
    /// # Errors
    /// `NotFound` for unknown IDs.
    pub async fn user(&self, id: UserId) -> Result<User, StoreError> {
        self.store
            .get_user(id)
            .await?
            .ok_or_else(|| StoreError::not_found("user", id))
    }

    /// Create a discussion and its `START` operation
    ///
    /// The store writes both as one unit; the returned record carries the
    /// `START` id in [`Discussion::start_id`].
    ///
    /// # Errors
    /// Rejects blank or over-long titles and non-finite seed values;
    /// `NotFound` for an unknown author.
    pub async fn create_discussion(
        &self,
        author: UserId,
        input: NewDiscussion,
    ) -> Result<Discussion, StoreError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(StoreError::validation("title must not be empty"));
        }
        if title.chars().count() > self.config.max_title_len {
            return Err(StoreError::validation(format!(
                "title must be at most {} characters",
                self.config.max_title_len
            )));
        }
        if !input.initial_value.is_finite() {
            return Err(StoreError::validation("initial value must be a finite number"));
        }

        let author = self.user(author).await?.to_ref();
        let discussion = self
            .store
            .insert_discussion(DiscussionDraft {
                title: title.to_string(),
                initial_value: input.initial_value,
                author,
            })
            .await?;

        tracing::info!(
            discussion_id = %discussion.id,
            start_id = %discussion.start_id,
            "Created discussion"
        );
        Ok(discussion)
    }

    /// Append an operation to an open discussion
    ///
    /// # Errors
    /// - `NotFound` for an unknown author, discussion or parent
    /// - `DiscussionEnded` once the discussion is closed
    /// - `Validation` for `START`, non-finite operands, a parent from another
    ///   discussion, or a parent that is an `END`
    pub async fn add_operation(
        &self,
        author: UserId,
        discussion_id: DiscussionId,
        input: NewOperation,
    ) -> Result<Operation, StoreError> {
        if input.operation_type == OperationType::Start {
            return Err(StoreError::validation(
                "a discussion has exactly one START operation",
            ));
        }
        if !input.value.is_finite() {
            return Err(StoreError::validation("value must be a finite number"));
        }

        let author = self.user(author).await?.to_ref();

        let _guard = self.write_lock.lock().await;

        let mut discussion = self.get_discussion(discussion_id).await?;
        if !discussion.is_open() {
            return Err(StoreError::DiscussionEnded(discussion_id));
        }

        let parent = self.get_operation(input.parent_id).await?;
        if parent.discussion_id != discussion_id {
            return Err(StoreError::validation(format!(
                "parent operation {} belongs to another discussion",
                parent.id
            )));
        }
        if parent.operation_type == OperationType::End {
            return Err(StoreError::validation(format!(
                "operation {} ends its branch and cannot be extended",
                parent.id
            )));
        }

        let operation = self
            .store
            .insert_operation(OperationDraft {
                discussion_id,
                parent_id: Some(parent.id),
                operation_type: input.operation_type,
                value: input.value,
                user: author,
            })
            .await?;

        discussion.updated_at = operation.created_at;
        self.store.update_discussion(discussion).await?;

        tracing::info!(
            discussion_id = %discussion_id,
            operation_id = %operation.id,
            operation_type = %operation.operation_type,
            "Appended operation"
        );
        Ok(operation)
    }

    /// Close a discussion to further operations
    ///
    /// # Errors
    /// `NotFound` for unknown IDs, `AlreadyEnded` if already closed.
    pub async fn end_discussion(&self, id: DiscussionId) -> Result<Discussion, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut discussion = self.get_discussion(id).await?;
        if !discussion.is_open() {
            return Err(StoreError::AlreadyEnded(id));
        }

        let now = Utc::now();
        discussion.status = DiscussionStatus::Ended;
        discussion.ended_at = Some(now);
        discussion.updated_at = now;
        self.store.update_discussion(discussion.clone()).await?;

        tracing::info!(discussion_id = %id, "Ended discussion");
        Ok(discussion)
    }

    /// Look up a discussion
    ///
    /// # Errors
    /// `NotFound` for unknown IDs.
    pub async fn get_discussion(&self, id: DiscussionId) -> Result<Discussion, StoreError> {
        self.store
            .get_discussion(id)
            .await?
            .ok_or_else(|| StoreError::not_found("discussion", id))
    }

    /// Look up an operation
    ///
    /// # Errors
    /// `NotFound` for unknown IDs.
    pub async fn get_operation(&self, id: OperationId) -> Result<Operation, StoreError> {
        self.store
            .get_operation(id)
            .await?
            .ok_or_else(|| StoreError::not_found("operation", id))
    }

    /// Page of discussions, newest first, with their card figures
    ///
    /// # Errors
    /// `Validation` for a zero page or limit; store failures.
    pub async fn list_discussions(
        &self,
        query: &PageQuery,
    ) -> Result<Page<DiscussionSummary>, StoreError> {
        let (page, limit) = self.normalize(query)?;
        let offset = (page as usize - 1) * limit as usize;
        let (discussions, total) = self.store.list_discussions(offset, limit as usize).await?;

        let mut items = Vec::with_capacity(discussions.len());
        for discussion in discussions {
            items.push(self.summarize(discussion).await?);
        }

        Ok(Page {
            items,
            page,
            limit,
            total,
        })
    }

    /// Page of a discussion's operations in creation order
    ///
    /// `query.operation_types` filters by kind when non-empty.
    ///
    /// # Errors
    /// `NotFound` for unknown discussions, `Validation` for a zero page or limit.
    pub async fn list_operations(
        &self,
        discussion_id: DiscussionId,
        query: &PageQuery,
    ) -> Result<Page<Operation>, StoreError> {
        let (page, limit) = self.normalize(query)?;
        self.get_discussion(discussion_id).await?;

        let matching: Vec<Operation> = self
            .store
            .operations_for(discussion_id)
            .await?
            .into_iter()
            .filter(|op| {
                query.operation_types.is_empty()
                    || query.operation_types.contains(&op.operation_type)
            })
            .collect();

        let total = matching.len();
        let items = matching
            .into_iter()
            .skip((page as usize - 1) * limit as usize)
            .take(limit as usize)
            .collect();

        Ok(Page {
            items,
            page,
            limit,
            total,
        })
    }

    /// A discussion with its valued operation forest
    ///
    /// # Errors
    /// `NotFound` for unknown discussions; `Tree` when the configured
    /// policies turn a build or valuation problem into an error.
    pub async fn discussion_tree(&self, id: DiscussionId) -> Result<DiscussionTree, StoreError> {
        let discussion = self.get_discussion(id).await?;
        let operations = self.store.operations_for(id).await?;
        let tree = build_operation_tree(&operations, discussion.initial_value, &self.config.tree)?;

        if !tree.diagnostics.is_empty() {
            tracing::warn!(
                discussion_id = %id,
                diagnostics = tree.diagnostics.len(),
                "Discussion tree has structural diagnostics"
            );
        }

        Ok(DiscussionTree {
            current_value: current_value(&operations, &tree),
            discussion,
            tree,
        })
    }

    async fn summarize(&self, discussion: Discussion) -> Result<DiscussionSummary, StoreError> {
        let operations = self.store.operations_for(discussion.id).await?;
        let tree = match build_operation_tree(
            &operations,
            discussion.initial_value,
            &self.config.tree,
        ) {
            Ok(tree) => tree,
            Err(e) => {
                tracing::warn!(discussion_id = %discussion.id, error = %e, "Cannot value discussion");
                OperationTree::default()
            }
        };

        Ok(DiscussionSummary {
            current_value: current_value(&operations, &tree),
            operation_count: operations.len(),
            discussion,
        })
    }

    fn normalize(&self, query: &PageQuery) -> Result<(u32, u32), StoreError> {
        let page = query.page.unwrap_or(1);
        if page == 0 {
            return Err(StoreError::validation("page must be positive"));
        }
        let limit = query.limit.unwrap_or(self.config.default_page_size);
        if limit == 0 {
            return Err(StoreError::validation("limit must be positive"));
        }
        Ok((page, limit.min(self.config.max_page_size)))
    }
}
