//! Records owned by the persistence boundary
//!
//! - Users and discussions as stored
//! - Creation payloads validated by the service
//! - Pagination and the read models handed to renderers

use chrono::{DateTime, Utc};
use dtree_core::{
    DiscussionId, Operation, OperationId, OperationTree, OperationType, UserId, UserRef,
};
use serde::{Deserialize, Serialize};

/// A registered participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User ID
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Registration time
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Reference embedded in authored records
    #[inline]
    #[must_use]
    pub fn to_ref(&self) -> UserRef {
        UserRef {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// Whether a discussion still accepts operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscussionStatus {
    /// Accepting operations
    #[default]
    Open,
    /// Closed by its author
    Ended,
}

/// A discussion thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discussion {
    /// Discussion ID
    pub id: DiscussionId,
    /// The `START` operation written with the discussion
    pub start_id: OperationId,
    /// Title
    pub title: String,
    /// Seed value every running total starts from
    pub initial_value: f64,
    /// Open or ended
    pub status: DiscussionStatus,
    /// Creator
    pub author: UserRef,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last change, including appended operations
    pub updated_at: DateTime<Utc>,
    /// When the discussion was ended
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl Discussion {
    /// Whether new operations are accepted
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == DiscussionStatus::Open
    }
}

/// Payload for creating a discussion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDiscussion {
    /// Title
    pub title: String,
    /// Seed value
    pub initial_value: f64,
}

impl NewDiscussion {
    /// Create a payload
    #[inline]
    #[must_use]
    pub fn new(title: impl Into<String>, initial_value: f64) -> Self {
        Self {
            title: title.into(),
            initial_value,
        }
    }
}

/// Payload for appending an operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOperation {
    /// Kind of step
    #[serde(alias = "operation")]
    pub operation_type: OperationType,
    /// Operand
    pub value: f64,
    /// Step this one applies to
    pub parent_id: OperationId,
}

impl NewOperation {
    /// Create a payload
    #[inline]
    #[must_use]
    pub fn new(operation_type: OperationType, value: f64, parent_id: OperationId) -> Self {
        Self {
            operation_type,
            value,
            parent_id,
        }
    }
}

/// Discussion fields the store persists; the store assigns IDs and timestamps
/// and writes the discussion's `START` operation in the same unit
#[derive(Debug, Clone, PartialEq)]
pub struct DiscussionDraft {
    /// Title
    pub title: String,
    /// Seed value
    pub initial_value: f64,
    /// Creator
    pub author: UserRef,
}

/// Operation fields the store persists; the store assigns ID and timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDraft {
    /// Owning discussion
    pub discussion_id: DiscussionId,
    /// Parent step, `None` only for the discussion's `START`
    pub parent_id: Option<OperationId>,
    /// Kind of step
    pub operation_type: OperationType,
    /// Operand
    pub value: f64,
    /// Author
    pub user: UserRef,
}

/// Pagination and filtering for list endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageQuery {
    /// 1-based page number, defaults to 1
    pub page: Option<u32>,
    /// Page size, defaults to the service's configured size
    pub limit: Option<u32>,
    /// Only return these operation kinds (empty means all)
    pub operation_types: Vec<OperationType>,
}

impl PageQuery {
    /// Create an empty query
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With page number
    #[inline]
    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// With page size
    #[inline]
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// With operation kind filter
    #[inline]
    #[must_use]
    pub fn with_operation_types(mut self, types: impl IntoIterator<Item = OperationType>) -> Self {
        self.operation_types = types.into_iter().collect();
        self
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// 1-based page number
    pub page: u32,
    /// Page size used
    pub limit: u32,
    /// Total matching items across all pages
    pub total: usize,
}

impl<T> Page<T> {
    /// Number of pages needed for `total` items
    #[must_use]
    pub fn total_pages(&self) -> usize {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(self.limit as usize)
    }

    /// Whether a later page exists
    #[inline]
    #[must_use]
    pub fn has_next(&self) -> bool {
        (self.page as usize) < self.total_pages()
    }
}

/// Discussion plus the figures shown on its card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionSummary {
    /// The discussion
    #[serde(flatten)]
    pub discussion: Discussion,
    /// Running total after the most recent operation, if derivable
    pub current_value: Option<f64>,
    /// Number of operations, `START` included
    pub operation_count: usize,
}

/// Discussion with its valued operation forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionTree {
    /// The discussion
    pub discussion: Discussion,
    /// Running total after the most recent operation, if derivable
    pub current_value: Option<f64>,
    /// Valued forest
    #[serde(flatten)]
    pub tree: OperationTree,
}

/// Most recently created operation's running total
#[must_use]
pub fn current_value(operations: &[Operation], tree: &OperationTree) -> Option<f64> {
    let latest = operations.iter().max_by_key(|op| op.id)?;
    tree.after_value(latest.id).and_then(dtree_core::AfterValue::value)
}
