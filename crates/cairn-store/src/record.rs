use std::collections::BTreeMap;

use cairn_types::{NodeId, NodeType, PropertyValue, SessionId};

/// A node as stored in the workspace arena.
#[derive(Debug, Clone)]
pub struct NodeRecord {
    pub name: String,
    pub node_type: NodeType,
    /// Index of the parent node, `None` for the workspace root.
    pub parent: Option<NodeId>,
    /// Children in creation order, including pending ones of any session.
    pub children: Vec<NodeId>,
    /// Committed properties only.
    pub properties: BTreeMap<String, PropertyValue>,
    /// The session that created this node and has not committed it yet.
    pub pending: Option<SessionId>,
}

impl NodeRecord {
    pub fn new(name: impl Into<String>, node_type: NodeType, parent: Option<NodeId>) -> Self {
        Self {
            name: name.into(),
            node_type,
            parent,
            children: Vec::new(),
            properties: BTreeMap::new(),
            pending: None,
        }
    }

    /// Returns `true` if `session` may see this node.
    pub fn is_visible_to(&self, session: SessionId) -> bool {
        match self.pending {
            None => true,
            Some(owner) => owner == session,
        }
    }

    pub fn is_committed(&self) -> bool {
        self.pending.is_none()
    }
}

/// Read-only description of a node, as returned to sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInfo {
    pub id: NodeId,
    pub name: String,
    pub node_type: NodeType,
    pub parent: Option<NodeId>,
    /// `false` while the node only exists in the caller's change set.
    pub committed: bool,
}
