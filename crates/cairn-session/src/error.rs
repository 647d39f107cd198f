use thiserror::Error;

use cairn_store::StoreError;
use cairn_types::TypeError;

use crate::security::Permission;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session is closed")]
    SessionClosed,

    #[error("user {user:?} lacks {permission} permission to {action}")]
    PermissionDenied {
        user: String,
        permission: Permission,
        action: String,
    },

    #[error("no node at path: {0}")]
    NotFound(String),

    #[error("duplicate name {name:?} under {parent}")]
    DuplicateName { parent: String, name: String },

    #[error("commit failed: {0}")]
    CommitFailed(#[source] StoreError),

    #[error("invalid name or path: {0}")]
    InvalidName(#[from] TypeError),

    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::PathNotFound(path) => Self::NotFound(path),
            StoreError::NodeNotFound(id) => Self::NotFound(id.to_string()),
            StoreError::DuplicateName { parent, name } => Self::DuplicateName { parent, name },
            StoreError::InvalidName(e) => Self::InvalidName(e),
            other => Self::Store(other),
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
