//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::arena::NodeId;

/// Domain errors represent violated tree or graph invariants.
/// These are independent of file loading and CLI concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("node not found in arena: {0:?}")]
    NodeNotFound(NodeId),

    #[error("child {child:?} is already in the children of {parent:?}")]
    DuplicateChild { parent: NodeId, child: NodeId },

    #[error("child {child:?} is not in the children of {parent:?}")]
    ChildNotFound { parent: NodeId, child: NodeId },

    #[error("attaching {child:?} below {parent:?} would create a cycle")]
    CycleDetected { parent: NodeId, child: NodeId },

    #[error("method must be 'recursive' or 'iterative', got '{0}'")]
    InvalidMethod(String),

    #[error("unknown traversal order: '{0}'")]
    InvalidTraversal(String),

    #[error("unknown operation: '{0}'")]
    InvalidOperation(String),

    #[error("node '{0}' already exists in graph")]
    NodeExists(String),

    #[error("node '{0}' does not exist in graph")]
    UnknownNode(String),

    #[error("{operation} requires exactly {expected} input(s), node '{name}' has {actual}")]
    ArityMismatch {
        name: String,
        operation: String,
        expected: usize,
        actual: usize,
    },

    #[error("input node '{0}' has no value")]
    MissingInput(String),

    #[error("forward pass must run before reverse pass")]
    ForwardPassRequired,
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
