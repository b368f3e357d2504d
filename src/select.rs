//! Tree traversal with [`Match`] predicates.
//!
//! All three entry points share one pre-order walk. Only element nodes are
//! tested, and a matching element is treated as consumed: its children are
//! not visited. When a container and a nested container both satisfy the
//! predicate, only the outer one is reported.
//!
//! A predicate with no constraints would match every element; the entry
//! points treat it as a caller mistake and report no matches.

use std::ops::ControlFlow;

use crate::matcher::Match;
use crate::tree::{NodeId, Tree};

/// Returns the first element under `root` (inclusive) that satisfies `m`.
///
/// Stops the walk at the first match.
#[must_use]
pub fn find_first(tree: &Tree, root: NodeId, m: &Match) -> Option<NodeId> {
    let mut found = None;
    walk(tree, root, m, |id| {
        found = Some(id);
        ControlFlow::Break(())
    });
    found
}

/// Returns every outermost element under `root` (inclusive) that satisfies
/// `m`, in document order.
#[must_use]
pub fn find_all(tree: &Tree, root: NodeId, m: &Match) -> Vec<NodeId> {
    let mut found = Vec::new();
    for_each_match(tree, root, m, |id| found.push(id));
    found
}

/// Calls `visitor` for each match `find_all` would return, in the same order.
pub fn for_each_match<F>(tree: &Tree, root: NodeId, m: &Match, mut visitor: F)
where
    F: FnMut(NodeId),
{
    walk(tree, root, m, |id| {
        visitor(id);
        ControlFlow::Continue(())
    });
}

fn walk<F>(tree: &Tree, root: NodeId, m: &Match, mut on_match: F)
where
    F: FnMut(NodeId) -> ControlFlow<()>,
{
    if m.is_empty() {
        tracing::debug!("refusing to walk with an unconstrained predicate");
        return;
    }

    let mut stack = vec![root];
    let mut visited = 0usize;

    while let Some(node) = stack.pop() {
        visited += 1;

        if tree.is_element(node) && m.matches(tree, node) {
            if on_match(node).is_break() {
                break;
            }
            continue;
        }

        // Push in reverse so the first child is popped first.
        let mut child = tree.last_child(node);
        while let Some(c) = child {
            stack.push(c);
            child = tree.prev_sibling(c);
        }
    }

    tracing::trace!(visited, "selector walk finished");
}
