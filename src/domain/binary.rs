//! Binary tree with level-order and reverse depth-first traversals.
//!
//! Depth-first traversals use an explicit stack, so tree height is not bounded
//! by the call stack. The `*_recursive` variants are reference implementations.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use tracing::instrument;

use crate::domain::error::DomainError;

/// Single node of a binary tree. Children are owned, so cycles cannot be built.
///
/// `Clone`, `PartialEq`, `Debug` and `Drop` walk the subtree with an explicit
/// stack instead of recursing once per level.
pub struct BinaryTreeNode<T> {
    pub value: T,
    pub left: Option<Box<BinaryTreeNode<T>>>,
    pub right: Option<Box<BinaryTreeNode<T>>>,
}

impl<T> BinaryTreeNode<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            left: None,
            right: None,
        }
    }

    pub fn with_children(
        value: T,
        left: Option<BinaryTreeNode<T>>,
        right: Option<BinaryTreeNode<T>>,
    ) -> Self {
        Self {
            value,
            left: left.map(Box::new),
            right: right.map(Box::new),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Swaps the left and right children of every node in this subtree, in place.
    pub fn mirror(&mut self) {
        let mut stack: Vec<&mut BinaryTreeNode<T>> = vec![self];
        while let Some(node) = stack.pop() {
            std::mem::swap(&mut node.left, &mut node.right);
            if let Some(left) = node.left.as_deref_mut() {
                stack.push(left);
            }
            if let Some(right) = node.right.as_deref_mut() {
                stack.push(right);
            }
        }
    }
}

// Detach descendants first so each box drops without recursing.
impl<T> Drop for BinaryTreeNode<T> {
    fn drop(&mut self) {
        let mut stack: Vec<Box<BinaryTreeNode<T>>> =
            self.left.take().into_iter().chain(self.right.take()).collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}

impl<T: Clone> Clone for BinaryTreeNode<T> {
    fn clone(&self) -> Self {
        let mut copy = BinaryTreeNode::new(self.value.clone());
        {
            let mut stack: Vec<(&BinaryTreeNode<T>, &mut BinaryTreeNode<T>)> =
                vec![(self, &mut copy)];
            while let Some((source, target)) = stack.pop() {
                let BinaryTreeNode { left, right, .. } = target;
                if let Some(child) = source.left.as_deref() {
                    let slot: &mut BinaryTreeNode<T> =
                        left.insert(Box::new(BinaryTreeNode::new(child.value.clone())));
                    stack.push((child, slot));
                }
                if let Some(child) = source.right.as_deref() {
                    let slot: &mut BinaryTreeNode<T> =
                        right.insert(Box::new(BinaryTreeNode::new(child.value.clone())));
                    stack.push((child, slot));
                }
            }
        }
        copy
    }
}

impl<T: PartialEq> PartialEq for BinaryTreeNode<T> {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((a, b)) = stack.pop() {
            if a.value != b.value {
                return false;
            }
            for (x, y) in [(&a.left, &b.left), (&a.right, &b.right)] {
                match (x.as_deref(), y.as_deref()) {
                    (Some(x), Some(y)) => stack.push((x, y)),
                    (None, None) => {}
                    _ => return false,
                }
            }
        }
        true
    }
}

impl<T: Eq> Eq for BinaryTreeNode<T> {}

enum DebugToken<'a, T> {
    Node(&'a BinaryTreeNode<T>),
    Text(&'static str),
}

fn debug_child<T>(side: &Option<Box<BinaryTreeNode<T>>>) -> DebugToken<'_, T> {
    side.as_deref().map_or(DebugToken::Text("_"), DebugToken::Node)
}

/// Compact `value(left, right)` form; `_` marks a missing child.
impl<T: fmt::Debug> fmt::Debug for BinaryTreeNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![DebugToken::Node(self)];
        while let Some(token) = stack.pop() {
            match token {
                DebugToken::Text(text) => f.write_str(text)?,
                DebugToken::Node(node) => {
                    write!(f, "{:?}", node.value)?;
                    if !node.is_leaf() {
                        stack.push(DebugToken::Text(")"));
                        stack.push(debug_child(&node.right));
                        stack.push(DebugToken::Text(", "));
                        stack.push(debug_child(&node.left));
                        stack.push(DebugToken::Text("("));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Names the nine traversal orders supported by [`BinaryTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalOrder {
    LevelOrderLeftToRight,
    LevelOrderRightToLeft,
    ReverseLevelOrder,
    ReverseLevelOrderRightToLeft,
    ReverseEvenLevels,
    ZigzagLevelOrder,
    ReverseInorder,
    ReversePreorder,
    ReversePostorder,
}

impl TraversalOrder {
    pub const ALL: [TraversalOrder; 9] = [
        TraversalOrder::LevelOrderLeftToRight,
        TraversalOrder::LevelOrderRightToLeft,
        TraversalOrder::ReverseLevelOrder,
        TraversalOrder::ReverseLevelOrderRightToLeft,
        TraversalOrder::ReverseEvenLevels,
        TraversalOrder::ZigzagLevelOrder,
        TraversalOrder::ReverseInorder,
        TraversalOrder::ReversePreorder,
        TraversalOrder::ReversePostorder,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TraversalOrder::LevelOrderLeftToRight => "level-order-left-to-right",
            TraversalOrder::LevelOrderRightToLeft => "level-order-right-to-left",
            TraversalOrder::ReverseLevelOrder => "reverse-level-order",
            TraversalOrder::ReverseLevelOrderRightToLeft => "reverse-level-order-right-to-left",
            TraversalOrder::ReverseEvenLevels => "reverse-even-levels",
            TraversalOrder::ZigzagLevelOrder => "zigzag-level-order",
            TraversalOrder::ReverseInorder => "reverse-inorder",
            TraversalOrder::ReversePreorder => "reverse-preorder",
            TraversalOrder::ReversePostorder => "reverse-postorder",
        }
    }

    /// Level-order variants group values by depth.
    pub fn is_level_order(&self) -> bool {
        !matches!(
            self,
            TraversalOrder::ReverseInorder
                | TraversalOrder::ReversePreorder
                | TraversalOrder::ReversePostorder
        )
    }
}

impl fmt::Display for TraversalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TraversalOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        TraversalOrder::ALL
            .into_iter()
            .find(|order| order.name() == normalized)
            .ok_or_else(|| DomainError::InvalidTraversal(s.to_string()))
    }
}

/// Output of [`BinaryTree::traverse`]: a flat sequence or values grouped by level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Traversal<T> {
    Flat(Vec<T>),
    Levels(Vec<Vec<T>>),
}

impl<T> Traversal<T> {
    pub fn len(&self) -> usize {
        match self {
            Traversal::Flat(values) => values.len(),
            Traversal::Levels(levels) => levels.iter().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Binary tree owning its nodes from `root`. An empty tree has no root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryTree<T> {
    pub root: Option<Box<BinaryTreeNode<T>>>,
}

impl<T> Default for BinaryTree<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> From<BinaryTreeNode<T>> for BinaryTree<T> {
    fn from(root: BinaryTreeNode<T>) -> Self {
        Self::new(Some(root))
    }
}

impl<T> BinaryTree<T> {
    pub fn new(root: Option<BinaryTreeNode<T>>) -> Self {
        Self {
            root: root.map(Box::new),
        }
    }

    pub fn empty() -> Self {
        Self { root: None }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Takes the root out of the tree, leaving it empty.
    pub fn into_root(mut self) -> Option<Box<BinaryTreeNode<T>>> {
        self.root.take()
    }

    #[instrument(level = "trace", skip(self))]
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<&BinaryTreeNode<T>> = self.root.as_deref().into_iter().collect();
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.left.as_deref());
            stack.extend(node.right.as_deref());
        }
        count
    }

    /// Number of levels; 0 for an empty tree.
    #[instrument(level = "trace", skip(self))]
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut queue: VecDeque<(&BinaryTreeNode<T>, usize)> =
            self.root.as_deref().map(|root| (root, 1)).into_iter().collect();
        while let Some((node, depth)) = queue.pop_front() {
            height = height.max(depth);
            for child in [node.left.as_deref(), node.right.as_deref()].into_iter().flatten() {
                queue.push_back((child, depth + 1));
            }
        }
        height
    }

    /// Mirrors the tree in place and returns the same root.
    #[instrument(level = "debug", skip(self))]
    pub fn mirror(&mut self) -> Option<&mut BinaryTreeNode<T>> {
        if let Some(root) = self.root.as_deref_mut() {
            root.mirror();
        }
        self.root.as_deref_mut()
    }
}

impl<T: Clone> BinaryTree<T> {
    #[instrument(level = "debug", skip(self))]
    pub fn traverse(&self, order: TraversalOrder) -> Traversal<T> {
        match order {
            TraversalOrder::LevelOrderLeftToRight => {
                Traversal::Levels(self.level_order_left_to_right())
            }
            TraversalOrder::LevelOrderRightToLeft => {
                Traversal::Levels(self.level_order_right_to_left())
            }
            TraversalOrder::ReverseLevelOrder => Traversal::Levels(self.reverse_level_order()),
            TraversalOrder::ReverseLevelOrderRightToLeft => {
                Traversal::Levels(self.reverse_level_order_right_to_left())
            }
            TraversalOrder::ReverseEvenLevels => Traversal::Levels(self.reverse_even_levels()),
            TraversalOrder::ZigzagLevelOrder => Traversal::Levels(self.zigzag_level_order()),
            TraversalOrder::ReverseInorder => Traversal::Flat(self.reverse_inorder()),
            TraversalOrder::ReversePreorder => Traversal::Flat(self.reverse_preorder()),
            TraversalOrder::ReversePostorder => Traversal::Flat(self.reverse_postorder()),
        }
    }

    /// Breadth-first collection of levels, each left to right.
    fn collect_levels(&self) -> Vec<Vec<T>> {
        let mut levels = Vec::new();
        let mut queue: VecDeque<&BinaryTreeNode<T>> = self.root.as_deref().into_iter().collect();

        while !queue.is_empty() {
            let level_size = queue.len();
            let mut level = Vec::with_capacity(level_size);
            for _ in 0..level_size {
                let Some(node) = queue.pop_front() else {
                    break;
                };
                level.push(node.value.clone());
                queue.extend(node.left.as_deref());
                queue.extend(node.right.as_deref());
            }
            levels.push(level);
        }

        levels
    }

    #[instrument(level = "trace", skip(self))]
    pub fn level_order_left_to_right(&self) -> Vec<Vec<T>> {
        self.collect_levels()
    }

    #[instrument(level = "trace", skip(self))]
    pub fn level_order_right_to_left(&self) -> Vec<Vec<T>> {
        let mut levels = self.collect_levels();
        for level in &mut levels {
            level.reverse();
        }
        levels
    }

    #[instrument(level = "trace", skip(self))]
    pub fn reverse_level_order(&self) -> Vec<Vec<T>> {
        let mut levels = self.collect_levels();
        levels.reverse();
        levels
    }

    #[instrument(level = "trace", skip(self))]
    pub fn reverse_level_order_right_to_left(&self) -> Vec<Vec<T>> {
        let mut levels = self.reverse_level_order();
        for level in &mut levels {
            level.reverse();
        }
        levels
    }

    /// Reverses levels at even index, including the single-element root level.
    #[instrument(level = "trace", skip(self))]
    pub fn reverse_even_levels(&self) -> Vec<Vec<T>> {
        let mut levels = self.collect_levels();
        for level in levels.iter_mut().step_by(2) {
            level.reverse();
        }
        levels
    }

    #[instrument(level = "trace", skip(self))]
    pub fn zigzag_level_order(&self) -> Vec<Vec<T>> {
        let mut levels = self.collect_levels();
        for level in levels.iter_mut().skip(1).step_by(2) {
            level.reverse();
        }
        levels
    }

    /// Right subtree, node, left subtree.
    #[instrument(level = "trace", skip(self))]
    pub fn reverse_inorder(&self) -> Vec<T> {
        let mut result = Vec::new();
        let mut stack: Vec<&BinaryTreeNode<T>> = Vec::new();
        let mut current = self.root.as_deref();

        loop {
            while let Some(node) = current {
                stack.push(node);
                current = node.right.as_deref();
            }
            match stack.pop() {
                Some(node) => {
                    result.push(node.value.clone());
                    current = node.left.as_deref();
                }
                None => break,
            }
        }

        result
    }

    /// Node, right subtree, left subtree.
    #[instrument(level = "trace", skip(self))]
    pub fn reverse_preorder(&self) -> Vec<T> {
        let mut result = Vec::new();
        let mut stack: Vec<&BinaryTreeNode<T>> = self.root.as_deref().into_iter().collect();

        while let Some(node) = stack.pop() {
            result.push(node.value.clone());
            // left is pushed first so the right subtree is popped first
            stack.extend(node.left.as_deref());
            stack.extend(node.right.as_deref());
        }

        result
    }

    /// Right subtree, left subtree, node.
    #[instrument(level = "trace", skip(self))]
    pub fn reverse_postorder(&self) -> Vec<T> {
        let mut result = Vec::new();
        let mut stack: Vec<(&BinaryTreeNode<T>, bool)> =
            self.root.as_deref().map(|root| (root, false)).into_iter().collect();

        while let Some((node, visited)) = stack.pop() {
            if visited {
                result.push(node.value.clone());
            } else {
                stack.push((node, true));
                if let Some(left) = node.left.as_deref() {
                    stack.push((left, false));
                }
                if let Some(right) = node.right.as_deref() {
                    stack.push((right, false));
                }
            }
        }

        result
    }

    pub fn reverse_inorder_recursive(&self) -> Vec<T> {
        fn visit<T: Clone>(node: Option<&BinaryTreeNode<T>>, result: &mut Vec<T>) {
            if let Some(node) = node {
                visit(node.right.as_deref(), result);
                result.push(node.value.clone());
                visit(node.left.as_deref(), result);
            }
        }
        let mut result = Vec::new();
        visit(self.root.as_deref(), &mut result);
        result
    }

    pub fn reverse_preorder_recursive(&self) -> Vec<T> {
        fn visit<T: Clone>(node: Option<&BinaryTreeNode<T>>, result: &mut Vec<T>) {
            if let Some(node) = node {
                result.push(node.value.clone());
                visit(node.right.as_deref(), result);
                visit(node.left.as_deref(), result);
            }
        }
        let mut result = Vec::new();
        visit(self.root.as_deref(), &mut result);
        result
    }

    pub fn reverse_postorder_recursive(&self) -> Vec<T> {
        fn visit<T: Clone>(node: Option<&BinaryTreeNode<T>>, result: &mut Vec<T>) {
            if let Some(node) = node {
                visit(node.right.as_deref(), result);
                visit(node.left.as_deref(), result);
                result.push(node.value.clone());
            }
        }
        let mut result = Vec::new();
        visit(self.root.as_deref(), &mut result);
        result
    }
}

/// Complete tree of the given height, values numbered in level order from 1.
///
/// Heights above 30 overflow the `i32` numbering.
///
/// ```text
///         1
///       /   \
///      2     3
///     / \   / \
///    4   5 6   7
/// ```
pub fn complete_tree(height: usize) -> BinaryTree<i32> {
    fn build(value: i32, remaining: usize) -> Option<BinaryTreeNode<i32>> {
        (remaining > 0).then(|| {
            BinaryTreeNode::with_children(
                value,
                build(value * 2, remaining - 1),
                build(value * 2 + 1, remaining - 1),
            )
        })
    }
    BinaryTree::new(build(1, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_tree() -> BinaryTree<i32> {
        complete_tree(3)
    }

    #[test]
    fn test_full_tree_traversals() {
        let tree = full_tree();
        assert_eq!(
            tree.level_order_left_to_right(),
            vec![vec![1], vec![2, 3], vec![4, 5, 6, 7]]
        );
        assert_eq!(
            tree.reverse_level_order(),
            vec![vec![4, 5, 6, 7], vec![2, 3], vec![1]]
        );
        assert_eq!(tree.reverse_inorder(), vec![7, 3, 6, 1, 5, 2, 4]);
        assert_eq!(tree.reverse_preorder(), vec![1, 3, 7, 6, 2, 5, 4]);
        assert_eq!(tree.reverse_postorder(), vec![7, 6, 3, 5, 4, 2, 1]);
        assert_eq!(
            tree.reverse_even_levels(),
            vec![vec![1], vec![2, 3], vec![7, 6, 5, 4]]
        );
    }

    #[test]
    fn test_len_and_height() {
        let tree = full_tree();
        assert_eq!(tree.len(), 7);
        assert_eq!(tree.height(), 3);
        assert_eq!(BinaryTree::<i32>::empty().height(), 0);
    }

    #[test]
    fn test_traversal_order_parses_kebab_and_snake_case() {
        assert_eq!(
            "zigzag-level-order".parse::<TraversalOrder>().unwrap(),
            TraversalOrder::ZigzagLevelOrder
        );
        assert_eq!(
            "reverse_inorder".parse::<TraversalOrder>().unwrap(),
            TraversalOrder::ReverseInorder
        );
        assert!(matches!(
            "sideways".parse::<TraversalOrder>(),
            Err(DomainError::InvalidTraversal(_))
        ));
    }

    #[test]
    fn test_mirror_returns_same_root() {
        let mut tree = full_tree();
        let root_value = tree.mirror().map(|root| root.value);
        assert_eq!(root_value, Some(1));
        assert_eq!(
            tree.level_order_left_to_right(),
            vec![vec![1], vec![3, 2], vec![7, 6, 5, 4]]
        );
    }

    #[test]
    fn test_debug_marks_missing_children() {
        let node = BinaryTreeNode::with_children(
            1,
            Some(BinaryTreeNode::with_children(2, None, Some(BinaryTreeNode::new(4)))),
            Some(BinaryTreeNode::new(3)),
        );
        assert_eq!(format!("{node:?}"), "1(2(_, 4), 3)");
    }

    #[test]
    fn test_clone_is_structurally_equal_and_independent() {
        let tree = full_tree();
        let mut copy = tree.clone();
        assert_eq!(copy, tree);

        copy.mirror();
        assert_ne!(copy, tree);
        assert_eq!(tree.reverse_inorder(), vec![7, 3, 6, 1, 5, 2, 4]);
    }
}
