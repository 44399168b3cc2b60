//! Rendering of trees and traversal results for display.

use std::fmt::Display;

use generational_arena::Index;
use itertools::Itertools;
use termtree::Tree;

use crate::domain::{BinaryTree, BinaryTreeNode, NodeArena, Traversal};

/// Placeholder shown for a missing child whose sibling exists.
pub const EMPTY_SLOT: &str = "∅";

pub trait TreeRender {
    fn to_tree_string(&self) -> Tree<String>;
}

impl<T: Display> TreeRender for BinaryTree<T> {
    fn to_tree_string(&self) -> Tree<String> {
        fn build<T: Display>(node: &BinaryTreeNode<T>) -> Tree<String> {
            let mut tree = Tree::new(node.value.to_string());
            if !node.is_leaf() {
                for child in [node.left.as_deref(), node.right.as_deref()] {
                    match child {
                        Some(child) => tree.push(build(child)),
                        None => tree.push(Tree::new(EMPTY_SLOT.to_string())),
                    };
                }
            }
            tree
        }

        match self.root.as_deref() {
            Some(root) => build(root),
            None => Tree::new("Empty tree".to_string()),
        }
    }
}

impl<T: Display> TreeRender for NodeArena<T> {
    fn to_tree_string(&self) -> Tree<String> {
        fn build<T: Display>(arena: &NodeArena<T>, node_idx: Index, parent_tree: &mut Tree<String>) {
            if let Some(node) = arena.get_node(node_idx) {
                for &child_idx in &node.children {
                    if let Some(child) = arena.get_node(child_idx) {
                        let mut child_tree = Tree::new(child.value.to_string());
                        build(arena, child_idx, &mut child_tree);
                        parent_tree.push(child_tree);
                    }
                }
            }
        }

        match self.root().and_then(|idx| self.get_node(idx).map(|node| (idx, node))) {
            Some((root_idx, root)) => {
                let mut tree = Tree::new(root.value.to_string());
                build(self, root_idx, &mut tree);
                tree
            }
            None => Tree::new("Empty tree".to_string()),
        }
    }
}

/// `[1, 2, 3]`
pub fn format_sequence<T: Display>(values: &[T]) -> String {
    format!("[{}]", values.iter().join(", "))
}

/// `[[1], [2, 3]]`
pub fn format_levels<T: Display>(levels: &[Vec<T>]) -> String {
    format!(
        "[{}]",
        levels.iter().map(|level| format_sequence(level)).join(", ")
    )
}

pub fn format_traversal<T: Display>(traversal: &Traversal<T>) -> String {
    match traversal {
        Traversal::Flat(values) => format_sequence(values),
        Traversal::Levels(levels) => format_levels(levels),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_levels() {
        assert_eq!(format_levels(&[vec![1], vec![2, 3]]), "[[1], [2, 3]]");
        assert_eq!(format_levels::<i32>(&[]), "[]");
    }

    #[test]
    fn test_binary_render_marks_missing_sibling() {
        let tree = BinaryTree::from(BinaryTreeNode::with_children(
            1,
            None,
            Some(BinaryTreeNode::new(3)),
        ));
        let rendered = tree.to_tree_string().to_string();
        assert!(rendered.starts_with("1\n"));
        assert!(rendered.contains(EMPTY_SLOT));
        assert!(rendered.contains('3'));
    }

    #[test]
    fn test_empty_arena_render() {
        let arena: NodeArena<i32> = NodeArena::new();
        assert_eq!(arena.to_tree_string().root, "Empty tree");
    }
}
