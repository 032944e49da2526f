//! Core types for discussion trees
//!
//! Defines the records the tree builder consumes and produces:
//! - Identifiers for operations, discussions and users
//! - Operation kinds and their display symbols
//! - Flat operation records and the nested `TreeOperation` view

use crate::error::{ParseOperationTypeError, ValuationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation identifier, assigned by the persistence layer
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct OperationId(pub u64);

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for OperationId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<OperationId> for u64 {
    fn from(value: OperationId) -> Self {
        value.0
    }
}

/// Discussion identifier
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DiscussionId(pub u64);

impl fmt::Display for DiscussionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for DiscussionId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<DiscussionId> for u64 {
    fn from(value: DiscussionId) -> Self {
        value.0
    }
}

/// User identifier
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UserId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<UserId> for u64 {
    fn from(value: UserId) -> Self {
        value.0
    }
}

/// Author reference carried on every operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserRef {
    /// Author ID
    pub id: UserId,
    /// Display name
    pub name: String,
}

impl UserRef {
    /// Create a user reference
    #[inline]
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: UserId(id),
            name: name.into(),
        }
    }
}

/// Kind of step an operation applies to its parent's running total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    /// Discussion seed; carries the initial value forward
    Start,
    /// Terminal marker; leaves the running total unchanged
    End,
    /// Addition
    Add,
    /// Subtraction
    Subtract,
    /// Multiplication
    Multiply,
    /// Division
    Divide,
}

impl OperationType {
    /// All operation kinds, in declaration order
    pub const ALL: [OperationType; 6] = [
        OperationType::Start,
        OperationType::End,
        OperationType::Add,
        OperationType::Subtract,
        OperationType::Multiply,
        OperationType::Divide,
    ];

    /// Symbol shown next to the operand when rendering
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            OperationType::Start => "START",
            OperationType::End => "END",
            OperationType::Add => "+",
            OperationType::Subtract => "−",
            OperationType::Multiply => "×",
            OperationType::Divide => "÷",
        }
    }

    /// Whether the operand participates in the arithmetic
    #[inline]
    #[must_use]
    pub fn is_arithmetic(self) -> bool {
        !matches!(self, OperationType::Start | OperationType::End)
    }

    /// Wire name (`ADD`, `DIVIDE`, ...)
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OperationType::Start => "START",
            OperationType::End => "END",
            OperationType::Add => "ADD",
            OperationType::Subtract => "SUBTRACT",
            OperationType::Multiply => "MULTIPLY",
            OperationType::Divide => "DIVIDE",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OperationType {
    type Err = ParseOperationTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperationType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseOperationTypeError {
                input: s.to_string(),
            })
    }
}

/// A single step in a discussion, as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Operation ID
    pub id: OperationId,
    /// Operation this one applies to, `None` for a root
    #[serde(default)]
    pub parent_id: Option<OperationId>,
    /// Owning discussion
    #[serde(default)]
    pub discussion_id: DiscussionId,
    /// Kind of step
    #[serde(alias = "operation")]
    pub operation_type: OperationType,
    /// Operand supplied by the author
    pub value: f64,
    /// Author
    #[serde(default)]
    pub user: UserRef,
    /// Creation time
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    /// Last update time
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl Operation {
    /// Create an operation with default author and timestamps
    #[must_use]
    pub fn new(id: u64, parent_id: Option<u64>, operation_type: OperationType, value: f64) -> Self {
        Self {
            id: OperationId(id),
            parent_id: parent_id.map(OperationId),
            discussion_id: DiscussionId::default(),
            operation_type,
            value,
            user: UserRef::default(),
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
        }
    }

    /// With author
    #[inline]
    #[must_use]
    pub fn with_user(mut self, user: UserRef) -> Self {
        self.user = user;
        self
    }

    /// With owning discussion
    #[inline]
    #[must_use]
    pub fn in_discussion(mut self, discussion_id: DiscussionId) -> Self {
        self.discussion_id = discussion_id;
        self
    }

    /// With creation and update timestamps set to `at`
    #[inline]
    #[must_use]
    pub fn at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self.updated_at = at;
        self
    }

    /// Whether this record declares no parent
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Running total at a node
///
/// Serializes as a bare number when computed, so renderers can treat
/// `afterValue` as numeric and fall back on the `reason` object otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AfterValue {
    /// Value derived successfully
    Computed(f64),
    /// Value could not be derived for this node
    Unavailable {
        /// Why derivation failed
        reason: ValuationError,
    },
}

impl AfterValue {
    /// The computed value, if any
    #[inline]
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self {
            AfterValue::Computed(v) => Some(*v),
            AfterValue::Unavailable { .. } => None,
        }
    }

    /// Failure reason, if derivation failed
    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<&ValuationError> {
        match self {
            AfterValue::Computed(_) => None,
            AfterValue::Unavailable { reason } => Some(reason),
        }
    }

    /// Whether a value was computed
    #[inline]
    #[must_use]
    pub fn is_computed(&self) -> bool {
        matches!(self, AfterValue::Computed(_))
    }
}

impl From<Result<f64, ValuationError>> for AfterValue {
    fn from(value: Result<f64, ValuationError>) -> Self {
        match value {
            Ok(v) => AfterValue::Computed(v),
            Err(reason) => AfterValue::Unavailable { reason },
        }
    }
}

impl fmt::Display for AfterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AfterValue::Computed(v) => write!(f, "{v:.2}"),
            AfterValue::Unavailable { reason } => write!(f, "unavailable ({reason})"),
        }
    }
}

/// An operation with its running total and ordered children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeOperation {
    /// The underlying record
    #[serde(flatten)]
    pub operation: Operation,
    /// Running total after this step
    pub after_value: AfterValue,
    /// Children, in input order
    pub children: Vec<TreeOperation>,
}

impl TreeOperation {
    /// Operation ID
    #[inline]
    #[must_use]
    pub fn id(&self) -> OperationId {
        self.operation.id
    }

    /// Number of nodes in this subtree, including `self`
    #[must_use]
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Find a node by ID within this subtree (pre-order)
    #[must_use]
    pub fn find(&self, id: OperationId) -> Option<&TreeOperation> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.id() == id {
                return Some(node);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn operation_type_parses_case_insensitively() {
        assert_eq!(OperationType::from_str("add").unwrap(), OperationType::Add);
        assert_eq!(
            OperationType::from_str(" DIVIDE ").unwrap(),
            OperationType::Divide
        );
        assert_eq!(
            OperationType::from_str("modulo").unwrap_err(),
            ParseOperationTypeError {
                input: "modulo".to_string()
            }
        );
    }

    #[test]
    fn operation_accepts_source_field_names() {
        let json = r#"{"id":2,"parentId":1,"operation":"ADD","value":5}"#;
        let op: Operation = serde_json::from_str(json).unwrap();
        assert_eq!(op.operation_type, OperationType::Add);
        assert_eq!(op.parent_id, Some(OperationId(1)));
        assert_eq!(op.user, UserRef::default());
    }

    #[test]
    fn null_parent_is_root() {
        let json = r#"{"id":1,"parentId":null,"operationType":"START","value":0}"#;
        let op: Operation = serde_json::from_str(json).unwrap();
        assert!(op.is_root());
    }

    #[test]
    fn after_value_serializes_as_number_when_computed() {
        let json = serde_json::to_string(&AfterValue::Computed(15.0)).unwrap();
        assert_eq!(json, "15.0");

        let unavailable = AfterValue::Unavailable {
            reason: ValuationError::DivisionByZero {
                operation_id: OperationId(4),
            },
        };
        let json = serde_json::to_value(&unavailable).unwrap();
        assert_eq!(json["reason"]["kind"], "divisionByZero");
    }

    #[test]
    fn subtree_len_and_find() {
        let leaf = TreeOperation {
            operation: Operation::new(2, Some(1), OperationType::Add, 1.0),
            after_value: AfterValue::Computed(2.0),
            children: vec![],
        };
        let root = TreeOperation {
            operation: Operation::new(1, None, OperationType::Start, 0.0),
            after_value: AfterValue::Computed(1.0),
            children: vec![leaf],
        };
        assert_eq!(root.subtree_len(), 2);
        assert!(root.find(OperationId(2)).is_some());
        assert!(root.find(OperationId(3)).is_none());
    }
}
