//! In-memory store
//!
//! Concurrent maps keyed by identifier, with atomic counters handing out
//! identifiers starting at 1. Suitable for tests, demos and single-process
//! deployments; nothing survives a restart.

use crate::error::StoreError;
use crate::store::DiscussionStore;
use crate::types::{Discussion, DiscussionDraft, DiscussionStatus, OperationDraft, User};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dtree_core::{DiscussionId, Operation, OperationId, OperationType, UserId};
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory [`DiscussionStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    next_user: AtomicU64,
    next_discussion: AtomicU64,
    next_operation: AtomicU64,
    users: DashMap<UserId, User>,
    discussions: DashMap<DiscussionId, Discussion>,
    operations: DashMap<OperationId, Operation>,
    by_discussion: DashMap<DiscussionId, Vec<OperationId>>,
}

impl MemoryStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored operations across all discussions
    #[inline]
    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    fn next(counter: &AtomicU64) -> u64 {
        counter.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl DiscussionStore for MemoryStore {
    async fn insert_user(&self, name: String) -> Result<User, StoreError> {
        let user = User {
            id: UserId(Self::next(&self.next_user)),
            name,
            created_at: Utc::now(),
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn insert_discussion(&self, draft: DiscussionDraft) -> Result<Discussion, StoreError> {
        let now = Utc::now();
        let id = DiscussionId(Self::next(&self.next_discussion));
        let start = Operation {
            id: OperationId(Self::next(&self.next_operation)),
            parent_id: None,
            discussion_id: id,
            operation_type: OperationType::Start,
            value: draft.initial_value,
            user: draft.author.clone(),
            created_at: now,
            updated_at: now,
        };
        let discussion = Discussion {
            id,
            start_id: start.id,
            title: draft.title,
            initial_value: draft.initial_value,
            status: DiscussionStatus::Open,
            author: draft.author,
            created_at: now,
            updated_at: now,
            ended_at: None,
        };

        self.by_discussion.insert(id, vec![start.id]);
        self.operations.insert(start.id, start);
        // Published last so readers never see a discussion without its root.
        self.discussions.insert(id, discussion.clone());
        Ok(discussion)
    }

    async fn get_discussion(&self, id: DiscussionId) -> Result<Option<Discussion>, StoreError> {
        Ok(self.discussions.get(&id).map(|d| d.clone()))
    }

    async fn update_discussion(&self, discussion: Discussion) -> Result<(), StoreError> {
        match self.discussions.get_mut(&discussion.id) {
            Some(mut entry) => {
                *entry = discussion;
                Ok(())
            }
            None => Err(StoreError::not_found("discussion", discussion.id)),
        }
    }

    async fn list_discussions(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<Discussion>, usize), StoreError> {
        let mut all: Vec<Discussion> = self.discussions.iter().map(|d| d.clone()).collect();
        all.sort_by(|a, b| b.id.cmp(&a.id));
        let total = all.len();
        let page = all.into_iter().skip(offset).take(limit).collect();
        Ok((page, total))
    }

    async fn insert_operation(&self, draft: OperationDraft) -> Result<Operation, StoreError> {
        if !self.discussions.contains_key(&draft.discussion_id) {
            return Err(StoreError::not_found("discussion", draft.discussion_id));
        }

        let now = Utc::now();
        let operation = Operation {
            id: OperationId(Self::next(&self.next_operation)),
            parent_id: draft.parent_id,
            discussion_id: draft.discussion_id,
            operation_type: draft.operation_type,
            value: draft.value,
            user: draft.user,
            created_at: now,
            updated_at: now,
        };

        self.operations.insert(operation.id, operation.clone());
        self.by_discussion
            .entry(operation.discussion_id)
            .or_default()
            .push(operation.id);

        Ok(operation)
    }

    async fn get_operation(&self, id: OperationId) -> Result<Option<Operation>, StoreError> {
        Ok(self.operations.get(&id).map(|o| o.clone()))
    }

    async fn operations_for(&self, discussion: DiscussionId) -> Result<Vec<Operation>, StoreError> {
        let mut ids = self
            .by_discussion
            .get(&discussion)
            .map(|ids| ids.clone())
            .unwrap_or_default();
        ids.sort_unstable();

        Ok(ids
            .into_iter()
            .filter_map(|id| self.operations.get(&id).map(|o| o.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtree_core::UserRef;

    fn draft(discussion_id: DiscussionId, parent: Option<OperationId>) -> OperationDraft {
        OperationDraft {
            discussion_id,
            parent_id: parent,
            operation_type: OperationType::Add,
            value: 1.0,
            user: UserRef::new(1, "alice"),
        }
    }

    async fn discussion(store: &MemoryStore) -> Discussion {
        store
            .insert_discussion(DiscussionDraft {
                title: "t".to_string(),
                initial_value: 1.0,
                author: UserRef::new(1, "alice"),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn ids_start_at_one_and_increase() {
        let store = MemoryStore::new();
        let a = store.insert_user("a".to_string()).await.unwrap();
        let b = store.insert_user("b".to_string()).await.unwrap();
        assert_eq!(a.id, UserId(1));
        assert_eq!(b.id, UserId(2));
    }

    #[tokio::test]
    async fn discussion_is_stored_with_its_start() {
        let store = MemoryStore::new();
        let d = discussion(&store).await;

        let ops = store.operations_for(d.id).await.unwrap();
        assert_eq!(ops.len(), 1);
        let start = &ops[0];
        assert_eq!(start.id, d.start_id);
        assert_eq!(start.operation_type, OperationType::Start);
        assert_eq!(start.parent_id, None);
        assert_eq!(start.value, d.initial_value);
        assert_eq!(start.user, d.author);
    }

    #[tokio::test]
    async fn operations_are_scoped_to_their_discussion() {
        let store = MemoryStore::new();
        let d1 = discussion(&store).await;
        let d2 = discussion(&store).await;

        let first = store
            .insert_operation(draft(d1.id, Some(d1.start_id)))
            .await
            .unwrap();
        store
            .insert_operation(draft(d2.id, Some(d2.start_id)))
            .await
            .unwrap();
        store
            .insert_operation(draft(d1.id, Some(first.id)))
            .await
            .unwrap();

        let ops = store.operations_for(d1.id).await.unwrap();
        assert_eq!(ops.len(), 3);
        assert_eq!(ops[0].id, d1.start_id);
        assert!(ops.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(store.operation_count(), 5);
    }

    #[tokio::test]
    async fn insert_operation_requires_discussion() {
        let store = MemoryStore::new();
        let err = store
            .insert_operation(draft(DiscussionId(42), None))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = MemoryStore::new();
        for _ in 0..3 {
            discussion(&store).await;
        }
        let (page, total) = store.list_discussions(1, 5).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(
            page.iter().map(|d| d.id.0).collect::<Vec<_>>(),
            vec![2, 1]
        );
    }
}
