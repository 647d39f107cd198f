use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use cairn_types::{
    validate_node_name, NodeId, NodePath, NodeType, PropertyValue, SessionId,
};
use generational_arena::Arena;
use tracing::{debug, warn};

use crate::changeset::{ChangeSet, CommitReceipt};
use crate::error::{StoreError, StoreResult};
use crate::record::{NodeInfo, NodeRecord};
use crate::traits::ContentStore;

/// Default workspace name.
pub const DEFAULT_WORKSPACE: &str = "workspace1";

/// In-memory, arena-backed content store.
///
/// Intended for tests and embedding. The whole workspace tree lives behind one
/// `RwLock`; readers share it, `create_node`, `apply` and `discard` take it
/// exclusively. The store can be switched offline to simulate a backend
/// outage, after which every operation fails with [`StoreError::Unavailable`].
///
/// A session whose discard fails is queued as abandoned; its pending nodes are
/// purged by the next successful write, or when the store comes back online.
pub struct InMemoryContentStore {
    workspace: String,
    root: NodeId,
    inner: RwLock<WorkspaceTree>,
    abandoned: Mutex<Vec<SessionId>>,
    online: AtomicBool,
}

struct WorkspaceTree {
    arena: Arena<NodeRecord>,
    revision: u64,
}

impl InMemoryContentStore {
    /// Create a store holding an empty workspace called `workspace1`.
    pub fn new() -> Self {
        Self::with_workspace(DEFAULT_WORKSPACE)
    }

    /// Create a store holding an empty workspace with the given name.
    pub fn with_workspace(workspace: impl Into<String>) -> Self {
        let mut arena = Arena::new();
        let root = NodeId::from(arena.insert(NodeRecord::new("", NodeType::root(), None)));
        Self {
            workspace: workspace.into(),
            root,
            inner: RwLock::new(WorkspaceTree { arena, revision: 0 }),
            abandoned: Mutex::new(Vec::new()),
            online: AtomicBool::new(true),
        }
    }

    /// Take the store offline or bring it back.
    ///
    /// Coming back online purges the pending nodes of abandoned sessions.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
        if !online {
            warn!(workspace = %self.workspace, "content store taken offline");
        } else if let Err(e) = self.write() {
            warn!(workspace = %self.workspace, error = %e, "purge after reconnect failed");
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Number of committed nodes, including the root.
    pub fn committed_count(&self) -> StoreResult<usize> {
        let tree = self.read()?;
        Ok(tree
            .arena
            .iter()
            .filter(|(_, record)| record.is_committed())
            .count())
    }

    /// Number of stored nodes, pending ones of every session included.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.arena.len())
    }

    /// Returns `true` if the workspace holds only its root.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? <= 1)
    }

    fn ensure_online(&self) -> StoreResult<()> {
        if self.is_online() {
            Ok(())
        } else {
            Err(StoreError::Unavailable)
        }
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, WorkspaceTree>> {
        self.ensure_online()?;
        self.inner
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    /// Exclusive access, with abandoned sessions purged first.
    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, WorkspaceTree>> {
        self.ensure_online()?;
        let mut tree = self
            .inner
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        let abandoned = std::mem::take(
            &mut *self
                .abandoned
                .lock()
                .map_err(|e| StoreError::LockPoisoned(e.to_string()))?,
        );
        if !abandoned.is_empty() {
            let removed = tree.purge(&abandoned);
            debug!(sessions = abandoned.len(), removed, "purged abandoned pending nodes");
        }
        Ok(tree)
    }

    fn abandon(&self, session: SessionId) {
        let mut queue = match self.abandoned.lock() {
            Ok(queue) => queue,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !queue.contains(&session) {
            queue.push(session);
        }
    }
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkspaceTree {
    fn visible(&self, session: SessionId, id: NodeId) -> StoreResult<&NodeRecord> {
        self.arena
            .get(id.index())
            .filter(|record| record.is_visible_to(session))
            .ok_or(StoreError::NodeNotFound(id))
    }

    fn path_of(&self, session: SessionId, id: NodeId) -> StoreResult<NodePath> {
        let mut segments = Vec::new();
        let mut current = self.visible(session, id)?;
        while let Some(parent) = current.parent {
            segments.push(current.name.clone());
            current = self.visible(session, parent)?;
        }
        segments.reverse();
        Ok(NodePath::from_segments(segments)?)
    }

    fn visible_child_named(
        &self,
        session: SessionId,
        parent: &NodeRecord,
        name: &str,
    ) -> Option<NodeId> {
        parent.children.iter().copied().find(|child| {
            self.arena
                .get(child.index())
                .is_some_and(|record| record.is_visible_to(session) && record.name == name)
        })
    }

    /// Remove every pending node owned by one of `sessions`.
    ///
    /// Pending nodes only ever hang below their own session's nodes or
    /// committed ones, so unlinking each from its parent leaves no dangling
    /// child entries.
    fn purge(&mut self, sessions: &[SessionId]) -> usize {
        let doomed: Vec<NodeId> = self
            .arena
            .iter()
            .filter(|(_, record)| record.pending.is_some_and(|s| sessions.contains(&s)))
            .map(|(index, _)| NodeId::from(index))
            .collect();
        for &id in &doomed {
            let Some(record) = self.arena.remove(id.index()) else {
                continue;
            };
            if let Some(parent) = record.parent {
                if let Some(parent) = self.arena.get_mut(parent.index()) {
                    parent.children.retain(|&child| child != id);
                }
            }
        }
        doomed.len()
    }

    /// Check a change set against the current tree without touching it.
    fn validate(&self, changes: &ChangeSet) -> StoreResult<()> {
        let session = changes.session();

        for &id in changes.created() {
            let record = self
                .arena
                .get(id.index())
                .ok_or(StoreError::NodeNotFound(id))?;
            if record.pending != Some(session) {
                return Err(StoreError::Conflict {
                    path: id.to_string(),
                    reason: "node is not pending in this session".into(),
                });
            }

            let Some(parent_id) = record.parent else {
                continue;
            };
            let parent = self.visible(session, parent_id)?;
            let clash = parent.children.iter().any(|&sibling| {
                sibling != id
                    && self.arena.get(sibling.index()).is_some_and(|other| {
                        other.is_committed() && other.name == record.name
                    })
            });
            if clash {
                return Err(StoreError::Conflict {
                    path: self.path_of(session, id)?.to_string(),
                    reason: "a sibling with this name was committed by another session".into(),
                });
            }
        }

        for (id, _) in changes.property_writes() {
            self.visible(session, id)?;
        }

        Ok(())
    }
}

impl ContentStore for InMemoryContentStore {
    fn workspace(&self) -> &str {
        &self.workspace
    }

    fn root(&self) -> NodeId {
        self.root
    }

    fn resolve(&self, session: SessionId, path: &NodePath) -> StoreResult<NodeId> {
        let tree = self.read()?;
        let mut current = self.root;
        for segment in path.segments() {
            let record = tree.visible(session, current)?;
            current = tree
                .visible_child_named(session, record, segment)
                .ok_or_else(|| StoreError::PathNotFound(path.to_string()))?;
        }
        Ok(current)
    }

    fn node(&self, session: SessionId, id: NodeId) -> StoreResult<NodeInfo> {
        let tree = self.read()?;
        let record = tree.visible(session, id)?;
        Ok(NodeInfo {
            id,
            name: record.name.clone(),
            node_type: record.node_type.clone(),
            parent: record.parent,
            committed: record.is_committed(),
        })
    }

    fn path_of(&self, session: SessionId, id: NodeId) -> StoreResult<NodePath> {
        self.read()?.path_of(session, id)
    }

    fn children(&self, session: SessionId, id: NodeId) -> StoreResult<Vec<NodeId>> {
        let tree = self.read()?;
        let record = tree.visible(session, id)?;
        Ok(record
            .children
            .iter()
            .copied()
            .filter(|child| {
                tree.arena
                    .get(child.index())
                    .is_some_and(|c| c.is_visible_to(session))
            })
            .collect())
    }

    fn properties(
        &self,
        session: SessionId,
        id: NodeId,
    ) -> StoreResult<BTreeMap<String, PropertyValue>> {
        let tree = self.read()?;
        Ok(tree.visible(session, id)?.properties.clone())
    }

    fn create_node(
        &self,
        session: SessionId,
        parent: NodeId,
        name: &str,
        node_type: NodeType,
    ) -> StoreResult<NodeId> {
        validate_node_name(name)?;
        let mut tree = self.write()?;

        let parent_record = tree.visible(session, parent)?;
        if tree.visible_child_named(session, parent_record, name).is_some() {
            return Err(StoreError::DuplicateName {
                parent: tree.path_of(session, parent)?.to_string(),
                name: name.to_string(),
            });
        }

        let mut record = NodeRecord::new(name, node_type, Some(parent));
        record.pending = Some(session);
        let id = NodeId::from(tree.arena.insert(record));
        if let Some(parent_record) = tree.arena.get_mut(parent.index()) {
            parent_record.children.push(id);
        }

        debug!(%session, %parent, node = %id, name, "staged node");
        Ok(id)
    }

    fn apply(&self, changes: &ChangeSet) -> StoreResult<CommitReceipt> {
        let session = changes.session();
        let mut tree = self.write()?;

        if changes.is_empty() {
            return Ok(CommitReceipt {
                session,
                revision: tree.revision,
                nodes_created: 0,
                properties_written: 0,
            });
        }

        tree.validate(changes)?;

        for &id in changes.created() {
            if let Some(record) = tree.arena.get_mut(id.index()) {
                record.pending = None;
            }
        }
        for (id, props) in changes.property_writes() {
            if let Some(record) = tree.arena.get_mut(id.index()) {
                record
                    .properties
                    .extend(props.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
        tree.revision += 1;

        let receipt = CommitReceipt {
            session,
            revision: tree.revision,
            nodes_created: changes.node_count(),
            properties_written: changes.property_count(),
        };
        debug!(
            %session,
            revision = receipt.revision,
            nodes = receipt.nodes_created,
            properties = receipt.properties_written,
            "change set applied"
        );
        Ok(receipt)
    }

    fn discard(&self, changes: &ChangeSet) -> StoreResult<usize> {
        let session = changes.session();
        let mut tree = match self.write() {
            Ok(tree) => tree,
            Err(e) => {
                warn!(%session, error = %e, "discard failed; pending nodes queued for purge");
                self.abandon(session);
                return Err(e);
            }
        };
        let mut removed = 0;

        // Reverse creation order removes descendants before their parents.
        for &id in changes.created().iter().rev() {
            let owned = tree
                .arena
                .get(id.index())
                .is_some_and(|record| record.pending == Some(session));
            if !owned {
                continue;
            }
            let Some(record) = tree.arena.remove(id.index()) else {
                continue;
            };
            if let Some(parent) = record.parent {
                if let Some(parent) = tree.arena.get_mut(parent.index()) {
                    parent.children.retain(|&child| child != id);
                }
            }
            removed += 1;
        }

        if removed > 0 {
            debug!(%session, removed, "discarded pending nodes");
        }
        Ok(removed)
    }

    fn revision(&self) -> StoreResult<u64> {
        Ok(self.read()?.revision)
    }
}

impl std::fmt::Debug for InMemoryContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryContentStore")
            .field("workspace", &self.workspace)
            .field("root", &self.root)
            .field("online", &self.is_online())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unstructured() -> NodeType {
        NodeType::unstructured()
    }

    fn path(s: &str) -> NodePath {
        NodePath::parse(s).unwrap()
    }

    // -----------------------------------------------------------------------
    // Creation and visibility
    // -----------------------------------------------------------------------

    #[test]
    fn new_store_has_only_root() {
        let store = InMemoryContentStore::new();
        assert_eq!(store.workspace(), "workspace1");
        assert!(store.is_empty().unwrap());
        assert_eq!(store.committed_count().unwrap(), 1);
        assert_eq!(store.revision().unwrap(), 0);

        let s = SessionId::new();
        assert_eq!(store.resolve(s, &NodePath::root()).unwrap(), store.root());
        assert!(store.children(s, store.root()).unwrap().is_empty());
        let info = store.node(s, store.root()).unwrap();
        assert_eq!(info.node_type, NodeType::root());
        assert_eq!(info.parent, None);
    }

    #[test]
    fn pending_node_visible_only_to_creator() {
        let store = InMemoryContentStore::new();
        let mine = SessionId::new();
        let other = SessionId::new();

        let a = store.create_node(mine, store.root(), "a", unstructured()).unwrap();

        assert_eq!(store.resolve(mine, &path("/a")).unwrap(), a);
        assert!(!store.node(mine, a).unwrap().committed);
        assert!(matches!(
            store.resolve(other, &path("/a")),
            Err(StoreError::PathNotFound(_))
        ));
        assert!(matches!(store.node(other, a), Err(StoreError::NodeNotFound(_))));
        assert!(store.children(other, store.root()).unwrap().is_empty());
    }

    #[test]
    fn duplicate_sibling_rejected() {
        let store = InMemoryContentStore::new();
        let s = SessionId::new();
        store.create_node(s, store.root(), "a", unstructured()).unwrap();

        let err = store
            .create_node(s, store.root(), "a", unstructured())
            .unwrap_err();
        match err {
            StoreError::DuplicateName { parent, name } => {
                assert_eq!(parent, "/");
                assert_eq!(name, "a");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn same_name_under_different_parents_is_fine() {
        let store = InMemoryContentStore::new();
        let s = SessionId::new();
        let a = store.create_node(s, store.root(), "a", unstructured()).unwrap();
        let b = store.create_node(s, store.root(), "b", unstructured()).unwrap();
        store.create_node(s, a, "x", unstructured()).unwrap();
        store.create_node(s, b, "x", unstructured()).unwrap();
        assert_eq!(store.path_of(s, b).unwrap().to_string(), "/b");
        assert!(store.resolve(s, &path("/b/x")).is_ok());
    }

    #[test]
    fn invalid_name_rejected() {
        let store = InMemoryContentStore::new();
        let err = store
            .create_node(SessionId::new(), store.root(), "a/b", unstructured())
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidName(_)));
    }

    // -----------------------------------------------------------------------
    // Apply
    // -----------------------------------------------------------------------

    #[test]
    fn apply_commits_nodes_and_properties() {
        let store = InMemoryContentStore::new();
        let s = SessionId::new();
        let mut changes = ChangeSet::new(s);

        let a = store.create_node(s, store.root(), "a", unstructured()).unwrap();
        changes.record_created(a);
        let b = store.create_node(s, a, "b", unstructured()).unwrap();
        changes.record_created(b);
        changes.set_property(b, "colour", "red".into());

        let receipt = store.apply(&changes).unwrap();
        assert_eq!(receipt.revision, 1);
        assert_eq!(receipt.nodes_created, 2);
        assert_eq!(receipt.properties_written, 1);

        let other = SessionId::new();
        assert_eq!(store.resolve(other, &path("/a/b")).unwrap(), b);
        assert_eq!(
            store.properties(other, b).unwrap().get("colour"),
            Some(&PropertyValue::from("red"))
        );
        assert_eq!(store.committed_count().unwrap(), 3);
    }

    #[test]
    fn empty_apply_keeps_revision() {
        let store = InMemoryContentStore::new();
        let receipt = store.apply(&ChangeSet::new(SessionId::new())).unwrap();
        assert_eq!(receipt.revision, 0);
        assert_eq!(store.revision().unwrap(), 0);
    }

    #[test]
    fn conflicting_commit_is_rejected_atomically() {
        let store = InMemoryContentStore::new();
        let first = SessionId::new();
        let second = SessionId::new();

        let mut first_changes = ChangeSet::new(first);
        first_changes.record_created(
            store.create_node(first, store.root(), "a", unstructured()).unwrap(),
        );

        let mut second_changes = ChangeSet::new(second);
        let ok = store.create_node(second, store.root(), "z", unstructured()).unwrap();
        second_changes.record_created(ok);
        let clash = store.create_node(second, store.root(), "a", unstructured()).unwrap();
        second_changes.record_created(clash);
        second_changes.set_property(ok, "p", 1i64.into());

        store.apply(&first_changes).unwrap();
        let err = store.apply(&second_changes).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));

        // Nothing of the failed change set leaked.
        let observer = SessionId::new();
        assert!(store.resolve(observer, &path("/z")).is_err());
        assert_eq!(store.revision().unwrap(), 1);
        assert!(!store.node(second, ok).unwrap().committed);
        assert!(store.properties(second, ok).unwrap().is_empty());
    }

    #[test]
    fn property_write_on_hidden_node_fails() {
        let store = InMemoryContentStore::new();
        let owner = SessionId::new();
        let a = store.create_node(owner, store.root(), "a", unstructured()).unwrap();

        let mut foreign = ChangeSet::new(SessionId::new());
        foreign.set_property(a, "p", "v".into());
        assert!(matches!(store.apply(&foreign), Err(StoreError::NodeNotFound(_))));
    }

    #[test]
    fn apply_while_offline_changes_nothing() {
        let store = InMemoryContentStore::new();
        let s = SessionId::new();
        let mut changes = ChangeSet::new(s);
        changes.record_created(store.create_node(s, store.root(), "a", unstructured()).unwrap());

        store.set_online(false);
        assert!(matches!(store.apply(&changes), Err(StoreError::Unavailable)));
        assert!(matches!(store.revision(), Err(StoreError::Unavailable)));

        store.set_online(true);
        assert_eq!(store.revision().unwrap(), 0);
        assert_eq!(store.committed_count().unwrap(), 1);
        store.apply(&changes).unwrap();
        assert_eq!(store.committed_count().unwrap(), 2);
    }

    // -----------------------------------------------------------------------
    // Discard
    // -----------------------------------------------------------------------

    #[test]
    fn discard_removes_pending_subtree() {
        let store = InMemoryContentStore::new();
        let s = SessionId::new();
        let mut changes = ChangeSet::new(s);
        let a = store.create_node(s, store.root(), "a", unstructured()).unwrap();
        changes.record_created(a);
        changes.record_created(store.create_node(s, a, "b", unstructured()).unwrap());

        assert_eq!(store.discard(&changes).unwrap(), 2);
        assert!(store.is_empty().unwrap());
        assert!(store.children(s, store.root()).unwrap().is_empty());

        // The name is free again.
        store.create_node(s, store.root(), "a", unstructured()).unwrap();
    }

    #[test]
    fn discard_never_removes_committed_nodes() {
        let store = InMemoryContentStore::new();
        let s = SessionId::new();
        let mut changes = ChangeSet::new(s);
        changes.record_created(store.create_node(s, store.root(), "a", unstructured()).unwrap());
        store.apply(&changes).unwrap();

        assert_eq!(store.discard(&changes).unwrap(), 0);
        assert_eq!(store.committed_count().unwrap(), 2);
    }

    #[test]
    fn failed_discard_is_purged_once_back_online() {
        let store = InMemoryContentStore::new();
        let gone = SessionId::new();
        let alive = SessionId::new();
        let mut changes = ChangeSet::new(gone);
        let a = store.create_node(gone, store.root(), "a", unstructured()).unwrap();
        changes.record_created(a);
        changes.record_created(store.create_node(gone, a, "b", unstructured()).unwrap());
        let kept = store.create_node(alive, store.root(), "kept", unstructured()).unwrap();

        store.set_online(false);
        assert!(matches!(store.discard(&changes), Err(StoreError::Unavailable)));
        store.set_online(true);

        assert_eq!(store.len().unwrap(), 2);
        assert_eq!(store.children(alive, store.root()).unwrap(), vec![kept]);
        assert!(matches!(store.node(gone, a), Err(StoreError::NodeNotFound(_))));
        store.create_node(alive, store.root(), "a", unstructured()).unwrap();
    }

    #[test]
    fn stale_handle_does_not_alias_reused_slot() {
        let store = InMemoryContentStore::new();
        let s = SessionId::new();
        let mut changes = ChangeSet::new(s);
        let old = store.create_node(s, store.root(), "a", unstructured()).unwrap();
        changes.record_created(old);
        store.discard(&changes).unwrap();

        let new = store.create_node(s, store.root(), "b", unstructured()).unwrap();
        assert_ne!(old, new);
        assert!(matches!(store.node(s, old), Err(StoreError::NodeNotFound(_))));
    }
}
