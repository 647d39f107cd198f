use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::names::validate_node_name;

/// Type tag carried by every node.
///
/// Type tags are namespaced names such as `nt:unstructured`. The store does
/// not interpret them beyond validation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeType(String);

impl NodeType {
    /// Tag of the workspace root node.
    pub const ROOT: &'static str = "rep:root";

    /// Structural tag used for generated subgraph nodes.
    pub const UNSTRUCTURED: &'static str = "nt:unstructured";

    /// Create a validated type tag.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        validate_node_name(&name).map_err(|_| TypeError::InvalidNodeType(name.clone()))?;
        Ok(Self(name))
    }

    /// The root node type.
    pub fn root() -> Self {
        Self(Self::ROOT.to_string())
    }

    /// The `nt:unstructured` node type.
    pub fn unstructured() -> Self {
        Self(Self::UNSTRUCTURED.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for NodeType {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NodeType> for String {
    fn from(value: NodeType) -> Self {
        value.0
    }
}
