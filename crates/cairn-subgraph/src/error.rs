use std::fmt;

use cairn_session::SessionError;
use thiserror::Error;

use crate::shape::Shape;

/// Errors from building, traversing or predicting a subgraph.
#[derive(Debug, Error)]
pub enum SubgraphError {
    /// Shape parameters outside their domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A build or traversal count disagreed with the oracle.
    #[error("expected {expected} nodes but counted {actual}")]
    CountMismatch { expected: u64, actual: u64 },

    #[error(transparent)]
    Session(#[from] SessionError),
}

pub type SubgraphResult<T> = Result<T, SubgraphError>;

/// Phase of a verification run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Build,
    Traverse,
    Commit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build => f.write_str("build"),
            Self::Traverse => f.write_str("traverse"),
            Self::Commit => f.write_str("commit"),
        }
    }
}

/// A failed run, tagged with the stage and shape needed to reproduce it.
#[derive(Debug, Error)]
#[error("{stage} failed for {shape}: {source}")]
pub struct RunError {
    pub stage: Stage,
    pub shape: Shape,
    #[source]
    pub source: SubgraphError,
}

impl RunError {
    pub fn new(stage: Stage, shape: Shape, source: impl Into<SubgraphError>) -> Self {
        Self {
            stage,
            shape,
            source: source.into(),
        }
    }
}
