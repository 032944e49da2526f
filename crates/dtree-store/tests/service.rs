use dtree_core::{AfterValue, OperationId, OperationType, TreeDiagnostic, UserId, ValuationError};
use dtree_store::{
    DiscussionService, DiscussionStatus, NewDiscussion, NewOperation, PageQuery, ServiceConfig,
    StoreError,
};
use dtree_test_utils::seeded_service;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn seeded_tree_has_expected_totals() {
    let (service, seeded) = seeded_service().await;
    let view = service.discussion_tree(seeded.discussion).await.unwrap();

    assert_eq!(view.tree.len(), 4);
    assert_eq!(view.tree.roots.len(), 1);
    assert!(view.tree.diagnostics.is_empty());

    let value = |id| view.tree.after_value(id).cloned();
    assert_eq!(value(seeded.start), Some(AfterValue::Computed(10.0)));
    assert_eq!(value(seeded.plus_five), Some(AfterValue::Computed(15.0)));
    assert_eq!(value(seeded.times_two), Some(AfterValue::Computed(30.0)));
    assert_eq!(
        value(seeded.divide_by_zero).as_ref().and_then(AfterValue::error),
        Some(&ValuationError::DivisionByZero {
            operation_id: seeded.divide_by_zero
        })
    );

    // Root children follow creation order.
    let children: Vec<_> = view.tree.roots[0].children.iter().map(|c| c.id()).collect();
    assert_eq!(children, vec![seeded.plus_five, seeded.divide_by_zero]);
}

#[tokio::test]
async fn new_discussion_is_rooted_at_its_start() {
    let (service, seeded) = seeded_service().await;
    let discussion = service
        .create_discussion(seeded.bob, NewDiscussion::new("Fresh", -2.5))
        .await
        .unwrap();

    let start = service.get_operation(discussion.start_id).await.unwrap();
    assert_eq!(start.operation_type, OperationType::Start);
    assert_eq!(start.discussion_id, discussion.id);
    assert_eq!(start.user.id, seeded.bob);

    let view = service.discussion_tree(discussion.id).await.unwrap();
    assert_eq!(view.tree.roots.len(), 1);
    assert_eq!(view.tree.roots[0].id(), discussion.start_id);
    assert_eq!(view.current_value, Some(-2.5));
}

#[tokio::test]
async fn current_value_tracks_latest_operation() {
    let (service, seeded) = seeded_service().await;

    // Latest operation is the division by zero.
    let view = service.discussion_tree(seeded.discussion).await.unwrap();
    assert_eq!(view.current_value, None);

    service
        .add_operation(
            seeded.alice,
            seeded.discussion,
            NewOperation::new(OperationType::Subtract, 4.0, seeded.times_two),
        )
        .await
        .unwrap();

    let view = service.discussion_tree(seeded.discussion).await.unwrap();
    assert_eq!(view.current_value, Some(26.0));
}

#[tokio::test]
async fn discussion_list_carries_card_figures() {
    let (service, seeded) = seeded_service().await;
    let other = service
        .create_discussion(seeded.bob, NewDiscussion::new("Fresh", 3.0))
        .await
        .unwrap();

    let page = service.list_discussions(&PageQuery::new()).await.unwrap();

    assert_eq!(page.total, 2);
    assert_eq!(page.items[0].discussion.id, other.id);
    assert_eq!(page.items[0].operation_count, 1);
    assert_eq!(page.items[0].current_value, Some(3.0));
    assert_eq!(page.items[1].discussion.id, seeded.discussion);
    assert_eq!(page.items[1].operation_count, 4);
}

#[tokio::test]
async fn operations_filter_by_type_and_paginate() {
    let (service, seeded) = seeded_service().await;

    let arithmetic = service
        .list_operations(
            seeded.discussion,
            &PageQuery::new().with_operation_types([OperationType::Add, OperationType::Divide]),
        )
        .await
        .unwrap();
    let ids: Vec<_> = arithmetic.items.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![seeded.plus_five, seeded.divide_by_zero]);
    assert_eq!(arithmetic.total, 2);

    let second = service
        .list_operations(
            seeded.discussion,
            &PageQuery::new().with_page(2).with_limit(3),
        )
        .await
        .unwrap();
    assert_eq!(second.total, 4);
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].id, seeded.divide_by_zero);
    assert!(!second.has_next());
}

#[tokio::test]
async fn ended_discussion_rejects_operations() {
    let (service, seeded) = seeded_service().await;

    let ended = service.end_discussion(seeded.discussion).await.unwrap();
    assert_eq!(ended.status, DiscussionStatus::Ended);
    assert!(ended.ended_at.is_some());

    let err = service
        .add_operation(
            seeded.bob,
            seeded.discussion,
            NewOperation::new(OperationType::Add, 1.0, seeded.start),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::DiscussionEnded(id) if id == seeded.discussion));

    let err = service.end_discussion(seeded.discussion).await.unwrap_err();
    assert!(matches!(err, StoreError::AlreadyEnded(_)));

    // Reads still work once ended.
    let view = service.discussion_tree(seeded.discussion).await.unwrap();
    assert_eq!(view.tree.len(), 4);
}

#[tokio::test]
async fn parent_must_belong_to_the_same_discussion() {
    let (service, seeded) = seeded_service().await;
    let other = service
        .create_discussion(seeded.alice, NewDiscussion::new("Elsewhere", 1.0))
        .await
        .unwrap();

    let err = service
        .add_operation(
            seeded.alice,
            other.id,
            NewOperation::new(OperationType::Add, 1.0, seeded.plus_five),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[tokio::test]
async fn end_operation_closes_its_branch() {
    let (service, seeded) = seeded_service().await;
    let end = service
        .add_operation(
            seeded.bob,
            seeded.discussion,
            NewOperation::new(OperationType::End, 0.0, seeded.times_two),
        )
        .await
        .unwrap();

    let view = service.discussion_tree(seeded.discussion).await.unwrap();
    assert_eq!(view.tree.after_value(end.id), Some(&AfterValue::Computed(30.0)));

    let err = service
        .add_operation(
            seeded.bob,
            seeded.discussion,
            NewOperation::new(OperationType::Add, 1.0, end.id),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[tokio::test]
async fn unknown_references_are_not_found() {
    let (service, seeded) = seeded_service().await;

    let err = service
        .add_operation(
            UserId(404),
            seeded.discussion,
            NewOperation::new(OperationType::Add, 1.0, seeded.start),
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = service
        .add_operation(
            seeded.alice,
            seeded.discussion,
            NewOperation::new(OperationType::Add, 1.0, OperationId(404)),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound {
            entity: "operation",
            id: 404
        }
    ));

    let err = service
        .discussion_tree(dtree_core::DiscussionId(404))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(err.is_client_error());
}

#[tokio::test]
async fn invalid_payloads_are_rejected() {
    let service = DiscussionService::in_memory(ServiceConfig::default());
    let alice = service.register_user("alice").await.unwrap();

    assert!(service.register_user("   ").await.is_err());

    let blank = service
        .create_discussion(alice.id, NewDiscussion::new("  ", 1.0))
        .await;
    assert!(matches!(blank, Err(StoreError::Validation(_))));

    let long = service
        .create_discussion(alice.id, NewDiscussion::new("x".repeat(201), 1.0))
        .await;
    assert!(matches!(long, Err(StoreError::Validation(_))));

    let infinite = service
        .create_discussion(alice.id, NewDiscussion::new("Inf", f64::INFINITY))
        .await;
    assert!(matches!(infinite, Err(StoreError::Validation(_))));
}

#[tokio::test]
async fn strict_service_surfaces_valuation_errors() {
    let config = ServiceConfig::new().with_tree(dtree_core::TreeConfig::strict());
    let service = DiscussionService::in_memory(config);
    let alice = service.register_user("alice").await.unwrap();
    let discussion = service
        .create_discussion(alice.id, NewDiscussion::new("Strict", 10.0))
        .await
        .unwrap();
    let start = discussion.start_id;

    service
        .add_operation(
            alice.id,
            discussion.id,
            NewOperation::new(OperationType::Divide, 0.0, start),
        )
        .await
        .unwrap();

    let err = service.discussion_tree(discussion.id).await.unwrap_err();
    assert!(matches!(err, StoreError::Tree(_)));

    // Listing degrades to an unknown value instead of failing.
    let page = service.list_discussions(&PageQuery::new()).await.unwrap();
    assert_eq!(page.items[0].current_value, None);
}

#[tokio::test]
async fn tree_serializes_in_camel_case() {
    let (service, seeded) = seeded_service().await;
    let view = service.discussion_tree(seeded.discussion).await.unwrap();
    let json = serde_json::to_value(&view).unwrap();

    assert_eq!(json["discussion"]["initialValue"], 10.0);
    assert_eq!(json["discussion"]["status"], "OPEN");
    assert!(json.get("diagnostics").is_none());

    let root = &json["roots"][0];
    assert_eq!(root["operationType"], "START");
    assert_eq!(root["afterValue"], 10.0);
    assert_eq!(root["children"][0]["afterValue"], 15.0);
    assert_eq!(
        root["children"][1]["afterValue"]["reason"]["kind"],
        "divisionByZero"
    );
}

#[tokio::test]
async fn concurrent_appends_all_land() {
    let (service, seeded) = seeded_service().await;
    let service = std::sync::Arc::new(service);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .add_operation(
                        seeded.bob,
                        seeded.discussion,
                        NewOperation::new(OperationType::Add, f64::from(i), seeded.times_two),
                    )
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let view = service.discussion_tree(seeded.discussion).await.unwrap();
    assert_eq!(view.tree.len(), 20);
    let times_two = view.tree.find(seeded.times_two).unwrap();
    assert_eq!(times_two.children.len(), 16);
    assert!(view
        .tree
        .diagnostics
        .iter()
        .all(|d| !matches!(d, TreeDiagnostic::Orphan { .. })));
}
