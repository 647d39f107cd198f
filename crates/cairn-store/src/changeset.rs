//! The staged change set of a session.
//!
//! A [`ChangeSet`] records which pending nodes a session has created and which
//! property writes it has staged. It is handed to [`ContentStore::apply`] as
//! one unit; nothing in it becomes visible to other sessions before that.
//!
//! [`ContentStore::apply`]: crate::traits::ContentStore::apply

use std::collections::BTreeMap;

use cairn_types::{NodeId, PropertyValue, SessionId};
use serde::{Deserialize, Serialize};

/// Pending mutations of one session.
#[derive(Clone, Debug, PartialEq)]
pub struct ChangeSet {
    session: SessionId,
    created: Vec<NodeId>,
    properties: BTreeMap<NodeId, BTreeMap<String, PropertyValue>>,
}

impl ChangeSet {
    /// Create an empty change set owned by `session`.
    pub fn new(session: SessionId) -> Self {
        Self {
            session,
            created: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Returns `true` if nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.properties.is_empty()
    }

    /// Record a node the owning session has created, in creation order.
    pub fn record_created(&mut self, node: NodeId) {
        self.created.push(node);
    }

    /// Nodes created by the owning session, in creation order.
    pub fn created(&self) -> &[NodeId] {
        &self.created
    }

    /// Returns `true` if `node` was created by this change set.
    pub fn is_created(&self, node: NodeId) -> bool {
        self.created.contains(&node)
    }

    /// Stage a property write. A later write to the same name overwrites the
    /// earlier one.
    pub fn set_property(&mut self, node: NodeId, name: impl Into<String>, value: PropertyValue) {
        self.properties
            .entry(node)
            .or_default()
            .insert(name.into(), value);
    }

    /// The staged value of one property, if any.
    pub fn property(&self, node: NodeId, name: &str) -> Option<&PropertyValue> {
        self.properties.get(&node).and_then(|props| props.get(name))
    }

    /// All staged properties of one node.
    pub fn properties_of(&self, node: NodeId) -> Option<&BTreeMap<String, PropertyValue>> {
        self.properties.get(&node)
    }

    /// Iterate over `(node, staged properties)` pairs.
    pub fn property_writes(
        &self,
    ) -> impl Iterator<Item = (NodeId, &BTreeMap<String, PropertyValue>)> {
        self.properties.iter().map(|(node, props)| (*node, props))
    }

    /// Number of nodes created.
    pub fn node_count(&self) -> usize {
        self.created.len()
    }

    /// Number of individual property writes staged (after overwrites).
    pub fn property_count(&self) -> usize {
        self.properties.values().map(BTreeMap::len).sum()
    }

    /// Drop everything staged, keeping the owner.
    pub fn clear(&mut self) {
        self.created.clear();
        self.properties.clear();
    }
}

/// Outcome of a successful apply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReceipt {
    /// The session whose change set was applied.
    pub session: SessionId,
    /// Workspace revision after the apply. Unchanged for an empty change set.
    pub revision: u64,
    pub nodes_created: usize,
    pub properties_written: usize,
}
