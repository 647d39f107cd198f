use std::fmt;

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Handle of a node inside a workspace arena.
///
/// A `NodeId` stays valid for as long as the node exists. Slots freed by a
/// discarded session are reused with a new generation, so a stale handle never
/// aliases a newer node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Index);

impl NodeId {
    /// Wrap a raw arena index.
    pub fn from_index(index: Index) -> Self {
        Self(index)
    }

    /// The underlying arena index.
    pub fn index(&self) -> Index {
        self.0
    }
}

impl From<Index> for NodeId {
    fn from(index: Index) -> Self {
        Self(index)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({self})")
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "{slot}v{generation}")
    }
}

/// Identifier of a session, used to tag the nodes it has staged but not yet
/// committed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new time-ordered session id.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
