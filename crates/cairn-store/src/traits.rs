use std::collections::BTreeMap;

use cairn_types::{NodeId, NodePath, NodeType, PropertyValue, SessionId};

use crate::changeset::{ChangeSet, CommitReceipt};
use crate::error::StoreResult;
use crate::record::NodeInfo;

/// Storage backend holding one workspace tree.
///
/// Every read takes the calling session's id and only reports nodes visible to
/// it: committed nodes plus the session's own pending nodes. Implementations
/// must satisfy these invariants:
///
/// - `create_node` rejects a name already used by a visible sibling.
/// - `children` enumerates every visible child exactly once.
/// - `apply` is atomic: either the whole change set becomes committed or
///   nothing changes.
/// - `discard` removes every pending node the change set created. If it
///   fails, the nodes stay invisible to every other session and are removed
///   once the store can be written again.
pub trait ContentStore: Send + Sync {
    /// Name of the workspace this store holds.
    fn workspace(&self) -> &str;

    /// Handle of the workspace root.
    fn root(&self) -> NodeId;

    /// Resolve a path to the node visible to `session` at that path.
    ///
    /// Returns `Err(PathNotFound)` if any segment is missing or hidden.
    fn resolve(&self, session: SessionId, path: &NodePath) -> StoreResult<NodeId>;

    /// Describe a visible node.
    fn node(&self, session: SessionId, id: NodeId) -> StoreResult<NodeInfo>;

    /// Absolute path of a visible node.
    fn path_of(&self, session: SessionId, id: NodeId) -> StoreResult<NodePath>;

    /// Visible children of a node, in creation order.
    fn children(&self, session: SessionId, id: NodeId) -> StoreResult<Vec<NodeId>>;

    /// Committed properties of a visible node. Staged writes are not included.
    fn properties(
        &self,
        session: SessionId,
        id: NodeId,
    ) -> StoreResult<BTreeMap<String, PropertyValue>>;

    /// Create a pending child owned by `session`.
    fn create_node(
        &self,
        session: SessionId,
        parent: NodeId,
        name: &str,
        node_type: NodeType,
    ) -> StoreResult<NodeId>;

    /// Atomically commit a change set.
    fn apply(&self, changes: &ChangeSet) -> StoreResult<CommitReceipt>;

    /// Drop every pending node of a change set. Returns how many were removed.
    ///
    /// The owning session is closed from the store's point of view even when
    /// this fails; its leftover pending nodes are purged on the next
    /// successful write.
    fn discard(&self, changes: &ChangeSet) -> StoreResult<usize>;

    /// Current committed revision. Starts at 0 and grows by one per non-empty
    /// apply.
    fn revision(&self) -> StoreResult<u64>;
}
