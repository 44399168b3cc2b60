use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};

/// Handle of a node in a [`NodeArena`].
///
/// Node equality is identity: two handles are equal only if they name the
/// same arena slot, regardless of the payloads stored there.
pub type NodeId = Index;

/// Tree node in the arena-based N-ary hierarchy.
#[derive(Debug)]
pub struct ArenaNode<T> {
    /// Payload of this node
    pub value: T,
    /// Index of parent node in the arena, None for root or detached nodes
    pub parent: Option<NodeId>,
    /// Indices of child nodes in the arena, in insertion order
    pub children: Vec<NodeId>,
}

/// Arena-based general tree.
///
/// Uses generational arena for memory-safe node references and O(1) lookups.
/// Parent links are non-owning back-references; the arena owns every node.
#[derive(Debug)]
pub struct NodeArena<T> {
    /// Arena storage for all tree nodes
    arena: Arena<ArenaNode<T>>,
    /// Index of the root node, None for empty trees
    root: Option<NodeId>,
}

impl<T> Default for NodeArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> NodeArena<T> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Inserts a node, attached below `parent` when given.
    ///
    /// The first node inserted without a parent becomes the root. A stale
    /// `parent` handle leaves the new node detached.
    #[instrument(level = "trace", skip(self, value))]
    pub fn insert_node(&mut self, value: T, parent: Option<NodeId>) -> NodeId {
        let parent = parent.filter(|&idx| self.arena.contains(idx));
        let node = ArenaNode {
            value,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        match parent {
            Some(parent_idx) => {
                if let Some(parent) = self.arena.get_mut(parent_idx) {
                    parent.children.push(node_idx);
                }
            }
            None => {
                if self.root.is_none() {
                    self.root = Some(node_idx);
                }
            }
        }

        node_idx
    }

    #[instrument(level = "trace", skip(self))]
    pub fn set_root(&mut self, root: Option<NodeId>) -> DomainResult<()> {
        if let Some(idx) = root {
            self.require(idx)?;
        }
        self.root = root;
        Ok(())
    }

    /// Appends `child` to the children of `parent`.
    ///
    /// A child attached elsewhere is detached from its former parent first.
    #[instrument(level = "debug", skip(self))]
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> DomainResult<()> {
        self.require(parent)?;
        self.require(child)?;

        if self.children(parent)?.contains(&child) {
            return Err(DomainError::DuplicateChild { parent, child });
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(DomainError::CycleDetected { parent, child });
        }

        if let Some(old_parent) = self.parent(child)? {
            self.remove_child(old_parent, child)?;
        }
        if self.root == Some(child) {
            self.root = None;
        }

        if let Some(node) = self.arena.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.arena.get_mut(parent) {
            node.children.push(child);
        }
        Ok(())
    }

    /// Detaches `child` from `parent`. The child stays in the arena.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomainResult<()> {
        let parent_node = self
            .arena
            .get_mut(parent)
            .ok_or(DomainError::NodeNotFound(parent))?;
        let position = parent_node
            .children
            .iter()
            .position(|&idx| idx == child)
            .ok_or(DomainError::ChildNotFound { parent, child })?;
        parent_node.children.remove(position);

        if let Some(node) = self.arena.get_mut(child) {
            node.parent = None;
        }
        Ok(())
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node(&self, idx: NodeId) -> Option<&ArenaNode<T>> {
        self.arena.get(idx)
    }

    pub fn value(&self, idx: NodeId) -> DomainResult<&T> {
        self.require(idx).map(|node| &node.value)
    }

    pub fn children(&self, idx: NodeId) -> DomainResult<&[NodeId]> {
        self.require(idx).map(|node| node.children.as_slice())
    }

    pub fn parent(&self, idx: NodeId) -> DomainResult<Option<NodeId>> {
        self.require(idx).map(|node| node.parent)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub(crate) fn require(&self, idx: NodeId) -> DomainResult<&ArenaNode<T>> {
        self.arena.get(idx).ok_or(DomainError::NodeNotFound(idx))
    }

    /// True if `candidate` is `node` or lies on the parent chain above it.
    fn is_ancestor_or_self(&self, candidate: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(idx) = current {
            if idx == candidate {
                return true;
            }
            current = self.arena.get(idx).and_then(|n| n.parent);
        }
        false
    }

    /// Number of levels below and including the root; 0 for an empty tree.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|root| (root, 1)).into_iter().collect();

        while let Some((idx, depth)) = stack.pop() {
            if let Some(node) = self.get_node(idx) {
                max_depth = max_depth.max(depth);
                stack.extend(node.children.iter().map(|&child| (child, depth + 1)));
            }
        }

        max_depth
    }

    /// Collects the values of all leaf nodes (nodes with no children), left to right.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_values(&self) -> Vec<&T> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| &node.value)
            .collect()
    }

    /// Pre-order iterator starting at the root.
    pub fn iter(&self) -> TreeIterator<'_, T> {
        TreeIterator::new(self, self.root)
    }

    /// Post-order iterator starting at the root.
    pub fn iter_postorder(&self) -> PostOrderIterator<'_, T> {
        PostOrderIterator::new(self, self.root)
    }

    /// Post-order iterator over the subtree rooted at `root`.
    pub fn iter_postorder_from(&self, root: Option<NodeId>) -> PostOrderIterator<'_, T> {
        PostOrderIterator::new(self, root)
    }
}

pub struct TreeIterator<'a, T> {
    arena: &'a NodeArena<T>,
    stack: Vec<NodeId>,
}

impl<'a, T> TreeIterator<'a, T> {
    fn new(arena: &'a NodeArena<T>, root: Option<NodeId>) -> Self {
        Self {
            arena,
            stack: root.into_iter().collect(),
        }
    }
}

impl<'a, T> Iterator for TreeIterator<'a, T> {
    type Item = (NodeId, &'a ArenaNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children.iter().rev());
                return Some((current_idx, node));
            }
        }
        None
    }
}

/// Yields every child before its parent, children in stored order.
pub struct PostOrderIterator<'a, T> {
    arena: &'a NodeArena<T>,
    stack: Vec<(NodeId, bool)>,
}

impl<'a, T> PostOrderIterator<'a, T> {
    fn new(arena: &'a NodeArena<T>, root: Option<NodeId>) -> Self {
        Self {
            arena,
            stack: root.map(|root| (root, false)).into_iter().collect(),
        }
    }
}

impl<'a, T> Iterator for PostOrderIterator<'a, T> {
    type Item = (NodeId, &'a ArenaNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if visited {
                    return Some((current_idx, node));
                }
                self.stack.push((current_idx, true));
                self.stack
                    .extend(node.children.iter().rev().map(|&child| (child, false)));
            }
        }
        None
    }
}
