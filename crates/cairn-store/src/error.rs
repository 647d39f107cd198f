use cairn_types::{NodeId, TypeError};

/// Errors from content store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No node exists at the requested path.
    #[error("no node at path: {0}")]
    PathNotFound(String),

    /// The node handle does not address a node visible to the caller.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// A sibling with the same name is already visible under the parent.
    #[error("duplicate name {name:?} under {parent}")]
    DuplicateName { parent: String, name: String },

    /// Committing would clash with a node committed by another session.
    #[error("commit conflict at {path}: {reason}")]
    Conflict { path: String, reason: String },

    /// A name, path or type tag failed validation.
    #[error("invalid name: {0}")]
    InvalidName(#[from] TypeError),

    /// The backing store is offline.
    #[error("store is unavailable")]
    Unavailable,

    /// A lock guarding the workspace was poisoned by a panicking writer.
    #[error("workspace lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
