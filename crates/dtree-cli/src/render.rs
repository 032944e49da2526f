//! Plain-text rendering of valued trees and discussion cards

use dtree_core::{OperationTree, TreeOperation};
use dtree_store::{DiscussionStatus, DiscussionSummary};
use std::fmt::Write;

const INDENT: &str = "  ";

/// One line per operation, children indented under their parent,
/// followed by any diagnostics
///
/// ```text
/// #1 START = 10.00 (alice)
///   #2 + 5 = 15.00 (bob)
/// ```
#[must_use]
pub fn render_tree(tree: &OperationTree) -> String {
    let mut out = String::new();

    tree.walk(|node, depth| {
        let _ = writeln!(out, "{}{}", INDENT.repeat(depth), render_node(node));
    });

    for diagnostic in &tree.diagnostics {
        let _ = writeln!(out, "warning: {diagnostic}");
    }
    out
}

/// A single node without indentation
#[must_use]
pub fn render_node(node: &TreeOperation) -> String {
    let op = &node.operation;
    let kind = op.operation_type;
    let step = if kind.is_arithmetic() {
        format!("{} {}", kind.symbol(), op.value)
    } else {
        kind.symbol().to_string()
    };

    let mut line = format!("#{} {step} = {}", op.id, node.after_value);
    if !op.user.name.is_empty() {
        let _ = write!(line, " ({})", op.user.name);
    }
    line
}

/// Discussion card: title, status, current value and size
#[must_use]
pub fn render_summary(summary: &DiscussionSummary) -> String {
    let discussion = &summary.discussion;
    let status = match discussion.status {
        DiscussionStatus::Open => "open",
        DiscussionStatus::Ended => "ended",
    };
    let current = summary
        .current_value
        .map_or_else(|| "unavailable".to_string(), |v| format!("{v:.2}"));

    format!(
        "{} [{status}] by {}: current {current}, {} operation{}",
        discussion.title,
        discussion.author.name,
        summary.operation_count,
        if summary.operation_count == 1 { "" } else { "s" }
    )
}
