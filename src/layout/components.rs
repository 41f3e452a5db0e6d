//! Connected components over the attachment adjacency
//!
//! Group membership is re-derived from scratch after an edge removal rather
//! than patched incrementally: removing the middle of a chain A-B-C must
//! leave A and C in different components.

use std::collections::{BTreeSet, HashSet, VecDeque};

use super::types::WidgetId;

/// One connected component, members in discovery order
pub type Component = Vec<WidgetId>;

/// Split `members` into connected components using breadth-first search.
///
/// `neighbors` returns the direct adjacency of a widget. Neighbours that are
/// not in `members` are ignored, so the traversal never leaves the subgraph.
/// Components come back in the order their first member appears in
/// `members`, which keeps group id assignment deterministic.
pub fn recompute_groups<'a, F>(members: &[WidgetId], neighbors: F) -> Vec<Component>
where
    F: Fn(&WidgetId) -> Option<&'a BTreeSet<WidgetId>>,
{
    let in_scope: HashSet<&WidgetId> = members.iter().collect();
    let mut visited: HashSet<&WidgetId> = HashSet::with_capacity(members.len());
    let mut components = Vec::new();
    let mut queue = VecDeque::new();

    for start in members {
        if !visited.insert(start) {
            continue;
        }
        let mut component = Vec::new();
        queue.push_back(start);

        while let Some(id) = queue.pop_front() {
            component.push(id.clone());
            let Some(adjacent) = neighbors(id) else {
                continue;
            };
            for next in adjacent {
                if let Some(&next) = in_scope.get(next) {
                    if visited.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        components.push(component);
    }

    components
}
