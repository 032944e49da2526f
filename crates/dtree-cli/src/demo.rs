//! Sample discussion on an in-memory service

use dtree_core::OperationType;
use dtree_store::{
    DiscussionService, DiscussionSummary, DiscussionTree, MemoryStore, NewDiscussion,
    NewOperation, PageQuery, ServiceConfig, StoreError,
};
use serde::Serialize;

/// Output of [`run_demo`]
#[derive(Debug, Clone, Serialize)]
pub struct DemoOutput {
    /// Card for the sample discussion
    pub summary: DiscussionSummary,
    /// Its valued tree
    pub tree: DiscussionTree,
}

/// Seed a fresh in-memory service and read the result back
///
/// Three participants branch off one seed value; one branch divides by
/// zero and another is closed with `END`.
///
/// # Errors
/// Propagates service errors, which only occur for invalid `config`.
pub async fn run_demo(config: ServiceConfig) -> Result<DemoOutput, StoreError> {
    let service: DiscussionService<MemoryStore> = DiscussionService::in_memory(config);

    let ana = service.register_user("ana").await?;
    let ben = service.register_user("ben").await?;
    let chloe = service.register_user("chloe").await?;

    let discussion = service
        .create_discussion(ana.id, NewDiscussion::new("Split the grocery bill", 120.0))
        .await?;
    let start = discussion.start_id;

    let step = |kind, value, parent| NewOperation::new(kind, value, parent);

    let tip = service
        .add_operation(ben.id, discussion.id, step(OperationType::Multiply, 1.1, start))
        .await?;
    let shared = service
        .add_operation(chloe.id, discussion.id, step(OperationType::Divide, 3.0, tip.id))
        .await?;
    service
        .add_operation(ana.id, discussion.id, step(OperationType::End, 0.0, shared.id))
        .await?;
    let coupon = service
        .add_operation(chloe.id, discussion.id, step(OperationType::Subtract, 20.0, start))
        .await?;
    service
        .add_operation(ben.id, discussion.id, step(OperationType::Divide, 0.0, coupon.id))
        .await?;
    service
        .add_operation(ana.id, discussion.id, step(OperationType::Add, 4.5, coupon.id))
        .await?;

    let tree = service.discussion_tree(discussion.id).await?;
    let summary = service
        .list_discussions(&PageQuery::new())
        .await?
        .items
        .into_iter()
        .find(|s| s.discussion.id == discussion.id)
        .ok_or_else(|| StoreError::not_found("discussion", discussion.id))?;

    tracing::debug!(discussion_id = %discussion.id, operations = summary.operation_count, "Demo seeded");
    Ok(DemoOutput { summary, tree })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtree_core::AfterValue;

    #[tokio::test]
    async fn demo_tree_mixes_values_and_failures() {
        let output = run_demo(ServiceConfig::default()).await.unwrap();
        let tree = &output.tree.tree;

        assert_eq!(tree.len(), 7);
        assert_eq!(output.summary.operation_count, 7);
        // Latest step: 120 - 20 + 4.5
        assert_eq!(output.summary.current_value, Some(104.5));

        let unavailable = tree
            .roots[0]
            .children
            .iter()
            .flat_map(|c| c.children.iter())
            .filter(|n| matches!(n.after_value, AfterValue::Unavailable { .. }))
            .count();
        assert_eq!(unavailable, 1);
    }
}
