//! Domain layer: tree and graph structures and their traversals
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod binary;
pub mod error;
pub mod graph;
pub mod traversal;

pub use arena::{ArenaNode, NodeArena, NodeId};
pub use binary::{complete_tree, BinaryTree, BinaryTreeNode, Traversal, TraversalOrder};
pub use error::{DomainError, DomainResult};
pub use graph::{ComputationGraph, GraphNode, Operation};
pub use traversal::{build_example_tree, ReverseBackwardTraversal, TraversalMethod};
