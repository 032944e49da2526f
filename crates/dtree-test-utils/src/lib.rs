//! Testing utilities for the Discussion Trees workspace
//!
//! Shared operation builders and seeded services.

#![allow(missing_docs)]

use dtree_core::{Operation, OperationId, OperationType};
use dtree_store::{DiscussionService, MemoryStore, NewDiscussion, NewOperation, ServiceConfig};

pub fn op(id: u64, parent: Option<u64>, kind: OperationType, value: f64) -> Operation {
    Operation::new(id, parent, kind, value)
}

pub fn start(id: u64) -> Operation {
    op(id, None, OperationType::Start, 0.0)
}

pub fn add(id: u64, parent: u64, value: f64) -> Operation {
    op(id, Some(parent), OperationType::Add, value)
}

pub fn subtract(id: u64, parent: u64, value: f64) -> Operation {
    op(id, Some(parent), OperationType::Subtract, value)
}

pub fn multiply(id: u64, parent: u64, value: f64) -> Operation {
    op(id, Some(parent), OperationType::Multiply, value)
}

pub fn divide(id: u64, parent: u64, value: f64) -> Operation {
    op(id, Some(parent), OperationType::Divide, value)
}

pub fn end(id: u64, parent: u64) -> Operation {
    op(id, Some(parent), OperationType::End, 0.0)
}

/// `START` followed by a chain of `ADD 1` steps, ids `1..=len`
pub fn chain(len: u64) -> Vec<Operation> {
    (1..=len)
        .map(|id| if id == 1 { start(1) } else { add(id, id - 1, 1.0) })
        .collect()
}

/// Identifiers produced by [`seeded_service`]
#[derive(Debug, Clone, Copy)]
pub struct Seeded {
    pub alice: dtree_core::UserId,
    pub bob: dtree_core::UserId,
    pub discussion: dtree_core::DiscussionId,
    pub start: OperationId,
    pub plus_five: OperationId,
    pub times_two: OperationId,
    pub divide_by_zero: OperationId,
}

/// In-memory service with one discussion:
///
/// ```text
/// START (10)
/// ├─ + 5 = 15
/// │  └─ × 2 = 30
/// └─ ÷ 0 = unavailable
/// ```
pub async fn seeded_service() -> (DiscussionService<MemoryStore>, Seeded) {
    let service = DiscussionService::in_memory(ServiceConfig::default());

    let alice = service.register_user("alice").await.unwrap();
    let bob = service.register_user("bob").await.unwrap();
    let discussion = service
        .create_discussion(alice.id, NewDiscussion::new("Road to thirty", 10.0))
        .await
        .unwrap();
    let start = discussion.start_id;

    let plus_five = service
        .add_operation(
            bob.id,
            discussion.id,
            NewOperation::new(OperationType::Add, 5.0, start),
        )
        .await
        .unwrap();
    let times_two = service
        .add_operation(
            alice.id,
            discussion.id,
            NewOperation::new(OperationType::Multiply, 2.0, plus_five.id),
        )
        .await
        .unwrap();
    let divide_by_zero = service
        .add_operation(
            bob.id,
            discussion.id,
            NewOperation::new(OperationType::Divide, 0.0, start),
        )
        .await
        .unwrap();

    let seeded = Seeded {
        alice: alice.id,
        bob: bob.id,
        discussion: discussion.id,
        start,
        plus_five: plus_five.id,
        times_two: times_two.id,
        divide_by_zero: divide_by_zero.id,
    };
    (service, seeded)
}
