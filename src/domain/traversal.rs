//! Post-order ("reverse backward") traversals over a [`NodeArena`].
//!
//! Every child is visited before its parent, siblings in stored order.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use crate::domain::arena::{NodeArena, NodeId};
use crate::domain::error::{DomainError, DomainResult};

/// Selects the implementation used by [`ReverseBackwardTraversal::traverse_with_callback`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalMethod {
    Recursive,
    #[default]
    Iterative,
}

impl fmt::Display for TraversalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraversalMethod::Recursive => f.write_str("recursive"),
            TraversalMethod::Iterative => f.write_str("iterative"),
        }
    }
}

impl FromStr for TraversalMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recursive" => Ok(TraversalMethod::Recursive),
            "iterative" => Ok(TraversalMethod::Iterative),
            other => Err(DomainError::InvalidMethod(other.to_string())),
        }
    }
}

/// Post-order traversals of the tree stored in an arena.
///
/// All operations take the subtree root as `Option<NodeId>`; `None` yields an
/// empty result and a stale handle fails with [`DomainError::NodeNotFound`].
#[derive(Debug, Clone, Copy)]
pub struct ReverseBackwardTraversal<'a, T> {
    arena: &'a NodeArena<T>,
}

impl<'a, T> ReverseBackwardTraversal<'a, T> {
    pub fn new(arena: &'a NodeArena<T>) -> Self {
        Self { arena }
    }

    /// Calls `callback` with each value in post-order.
    #[instrument(level = "debug", skip(self, callback))]
    pub fn traverse_with_callback<F>(
        &self,
        root: Option<NodeId>,
        mut callback: F,
        method: TraversalMethod,
    ) -> DomainResult<()>
    where
        F: FnMut(&T),
    {
        let Some(root) = root else {
            return Ok(());
        };
        match method {
            TraversalMethod::Recursive => self.walk_recursive(root, &mut callback),
            TraversalMethod::Iterative => self.walk_iterative(root, &mut callback),
        }
    }

    fn walk_recursive<F>(&self, idx: NodeId, callback: &mut F) -> DomainResult<()>
    where
        F: FnMut(&T),
    {
        let node = self.arena.require(idx)?;
        for &child in &node.children {
            self.walk_recursive(child, callback)?;
        }
        callback(&node.value);
        Ok(())
    }

    /// Explicit work stack: a node is emitted once all of its children have been.
    fn walk_iterative<F>(&self, root: NodeId, callback: &mut F) -> DomainResult<()>
    where
        F: FnMut(&T),
    {
        let mut stack = vec![root];
        let mut emitted: HashSet<NodeId> = HashSet::new();

        while let Some(&idx) = stack.last() {
            let node = self.arena.require(idx)?;
            let pending: Vec<NodeId> = node
                .children
                .iter()
                .rev()
                .filter(|child| !emitted.contains(*child))
                .copied()
                .collect();

            if pending.is_empty() {
                stack.pop();
                emitted.insert(idx);
                callback(&node.value);
            } else {
                trace!("deferring {:?} behind {} children", idx, pending.len());
                stack.extend(pending);
            }
        }

        Ok(())
    }
}

impl<'a, T: Clone> ReverseBackwardTraversal<'a, T> {
    #[instrument(level = "debug", skip(self))]
    pub fn traverse_recursive(&self, root: Option<NodeId>) -> DomainResult<Vec<T>> {
        self.collect(root, TraversalMethod::Recursive)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn traverse_iterative(&self, root: Option<NodeId>) -> DomainResult<Vec<T>> {
        self.collect(root, TraversalMethod::Iterative)
    }

    fn collect(&self, root: Option<NodeId>, method: TraversalMethod) -> DomainResult<Vec<T>> {
        let mut values = Vec::new();
        self.traverse_with_callback(root, |value: &T| values.push(value.clone()), method)?;
        Ok(values)
    }

    /// Groups values by distance from `root`, deepest group first.
    #[instrument(level = "debug", skip(self))]
    pub fn traverse_by_depth(&self, root: Option<NodeId>) -> DomainResult<Vec<Vec<T>>> {
        let mut groups: Vec<Vec<T>> = Vec::new();
        let mut queue = std::collections::VecDeque::new();
        queue.extend(root.map(|root| (root, 0usize)));

        while let Some((idx, depth)) = queue.pop_front() {
            let node = self.arena.require(idx)?;
            if depth == groups.len() {
                groups.push(Vec::new());
            }
            groups[depth].push(node.value.clone());
            queue.extend(node.children.iter().map(|&child| (child, depth + 1)));
        }

        groups.reverse();
        Ok(groups)
    }
}

/// Builds the sample tree used in demos and tests.
///
/// ```text
///         1
///        / \
///       2   3
///      / \   \
///     4   5   6
/// ```
pub fn build_example_tree() -> (NodeArena<i32>, NodeId) {
    let mut arena = NodeArena::new();
    let root = arena.insert_node(1, None);
    let two = arena.insert_node(2, Some(root));
    let three = arena.insert_node(3, Some(root));
    arena.insert_node(4, Some(two));
    arena.insert_node(5, Some(two));
    arena.insert_node(6, Some(three));
    (arena, root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_tree_post_order() {
        let (arena, root) = build_example_tree();
        let traversal = ReverseBackwardTraversal::new(&arena);

        assert_eq!(
            traversal.traverse_recursive(Some(root)).unwrap(),
            vec![4, 5, 2, 6, 3, 1]
        );
        assert_eq!(
            traversal.traverse_iterative(Some(root)).unwrap(),
            vec![4, 5, 2, 6, 3, 1]
        );
    }

    #[test]
    fn test_example_tree_by_depth() {
        let (arena, root) = build_example_tree();
        let traversal = ReverseBackwardTraversal::new(&arena);
        assert_eq!(
            traversal.traverse_by_depth(Some(root)).unwrap(),
            vec![vec![4, 5, 6], vec![2, 3], vec![1]]
        );
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!(
            "recursive".parse::<TraversalMethod>().unwrap(),
            TraversalMethod::Recursive
        );
        assert_eq!(
            "bogus".parse::<TraversalMethod>(),
            Err(DomainError::InvalidMethod("bogus".to_string()))
        );
    }
}
