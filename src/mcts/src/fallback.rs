use crate::{tree::SearchTree, working};
use fxhash::FxHashMap;
use itertools::Itertools;
use log::debug;
use pocket_core::{Action, CubeState};
use std::collections::VecDeque;

/// Breadth-first search from `root` over the edges recorded in `tree`,
/// expanding up to `batch_size` queued states at a time. Returns the shortest
/// action sequence reaching a solved state among those edges, or `None` if
/// the explored part of the tree contains no solved state. The oracle is
/// never consulted.
pub fn shortest_path(
    tree: &SearchTree,
    root: &CubeState,
    batch_size: usize,
) -> Option<Vec<Action>> {
    if root.is_solved() {
        return Some(vec![]);
    }
    let batch_size = batch_size.max(1);

    // Doubles as the visited set
    let mut parents: FxHashMap<CubeState, Option<(CubeState, Action)>> = FxHashMap::default();
    parents.insert(*root, None);
    let mut queue = VecDeque::from([*root]);
    let mut batches = 0_usize;

    while !queue.is_empty() {
        let batch = queue.drain(..batch_size.min(queue.len())).collect_vec();
        batches += 1;
        debug!(
            working!("Fallback batch {} of {} states, {} visited"),
            batches,
            batch.len(),
            parents.len()
        );
        for state in batch {
            let Some(children) = tree.children(&state) else {
                continue;
            };
            for (action, child) in Action::ALL.into_iter().zip(children) {
                if parents.contains_key(child) {
                    continue;
                }
                parents.insert(*child, Some((state, action)));
                if child.is_solved() {
                    return Some(trace_back(&parents, child));
                }
                queue.push_back(*child);
            }
        }
    }
    debug!("Fallback search exhausted {} states", parents.len());
    None
}

fn trace_back(
    parents: &FxHashMap<CubeState, Option<(CubeState, Action)>>,
    goal: &CubeState,
) -> Vec<Action> {
    let mut path = vec![];
    let mut state = *goal;
    while let Some(&Some((parent, action))) = parents.get(&state) {
        path.push(action);
        state = parent;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpanded_root_is_not_found() {
        let root = CubeState::SOLVED.apply(Action::B);
        assert_eq!(shortest_path(&SearchTree::new(), &root, 10), None);
    }

    #[test]
    fn solved_root_needs_no_moves() {
        assert_eq!(
            shortest_path(&SearchTree::new(), &CubeState::SOLVED, 10),
            Some(vec![])
        );
    }
}
