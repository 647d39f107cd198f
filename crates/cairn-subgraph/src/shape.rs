use std::fmt;

use serde::Serialize;

use crate::error::{SubgraphError, SubgraphResult};

/// Parameters of one generated tree.
///
/// `branching` and `depth` are at least 1; a shape is never constructed
/// otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Shape {
    branching: u32,
    depth: u32,
    properties_per_node: u32,
}

impl Shape {
    pub fn new(branching: u32, depth: u32, properties_per_node: u32) -> SubgraphResult<Self> {
        if branching < 1 {
            return Err(SubgraphError::InvalidArgument(format!(
                "branching factor must be at least 1, got {branching}"
            )));
        }
        if depth < 1 {
            return Err(SubgraphError::InvalidArgument(format!(
                "depth must be at least 1, got {depth}"
            )));
        }
        Ok(Self {
            branching,
            depth,
            properties_per_node,
        })
    }

    pub fn branching(&self) -> u32 {
        self.branching
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn properties_per_node(&self) -> u32 {
        self.properties_per_node
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} tree with {} properties per node",
            self.branching, self.depth, self.properties_per_node
        )
    }
}
