//! Unit-of-work sessions.
//!
//! A [`Session`] reads through the store with its own visibility (committed
//! nodes plus its own pending ones) and stages every mutation in a
//! [`ChangeSet`]. [`Session::save`] hands that change set to the store in one
//! atomic apply. [`Session::logout`] discards whatever is still pending.

use std::collections::BTreeMap;
use std::sync::Arc;

use cairn_store::{ChangeSet, CommitReceipt, ContentStore, NodeInfo};
use cairn_types::{
    validate_property_name, NodeId, NodePath, NodeType, PropertyValue, SessionId,
};
use tracing::{debug, info, warn};

use crate::error::{SessionError, SessionResult};
use crate::security::{Permission, SecurityContext};

/// A live or closed unit of work against one workspace.
pub struct Session {
    id: SessionId,
    context: SecurityContext,
    store: Arc<dyn ContentStore>,
    changes: ChangeSet,
    live: bool,
}

impl Session {
    pub(crate) fn open(store: Arc<dyn ContentStore>, context: SecurityContext) -> Self {
        let id = SessionId::new();
        Self {
            id,
            context,
            store,
            changes: ChangeSet::new(id),
            live: true,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn user(&self) -> &str {
        &self.context.username
    }

    pub fn security_context(&self) -> &SecurityContext {
        &self.context
    }

    pub fn workspace(&self) -> &str {
        self.store.workspace()
    }

    /// Returns `true` until [`Session::logout`] is called.
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Returns `true` if there are staged changes not yet saved.
    pub fn has_pending_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// The staged change set.
    pub fn pending_changes(&self) -> &ChangeSet {
        &self.changes
    }

    // ---------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------

    /// Handle of the workspace root.
    pub fn root_node(&self) -> SessionResult<NodeId> {
        self.check_read("read the root node")?;
        Ok(self.store.root())
    }

    /// Resolve a path string (`""` and `"/"` are the root).
    pub fn node_at(&self, path: &str) -> SessionResult<NodeId> {
        let path = NodePath::parse(path)?;
        self.node_at_path(&path)
    }

    /// Resolve a parsed path.
    pub fn node_at_path(&self, path: &NodePath) -> SessionResult<NodeId> {
        self.check_read("resolve a path")?;
        Ok(self.store.resolve(self.id, path)?)
    }

    pub fn node(&self, node: NodeId) -> SessionResult<NodeInfo> {
        self.check_read("read a node")?;
        Ok(self.store.node(self.id, node)?)
    }

    /// Absolute path of a node.
    pub fn path(&self, node: NodeId) -> SessionResult<NodePath> {
        self.check_read("read a path")?;
        Ok(self.store.path_of(self.id, node)?)
    }

    /// Direct children of a node, each exactly once.
    pub fn children(&self, node: NodeId) -> SessionResult<Vec<NodeId>> {
        self.check_read("list children")?;
        Ok(self.store.children(self.id, node)?)
    }

    /// One property, staged value first, then the committed one.
    pub fn property(&self, node: NodeId, name: &str) -> SessionResult<Option<PropertyValue>> {
        self.check_read("read a property")?;
        if let Some(staged) = self.changes.property(node, name) {
            return Ok(Some(staged.clone()));
        }
        let mut committed = self.store.properties(self.id, node)?;
        Ok(committed.remove(name))
    }

    /// All properties of a node, staged writes overlaid on committed values.
    pub fn properties(&self, node: NodeId) -> SessionResult<BTreeMap<String, PropertyValue>> {
        self.check_read("read properties")?;
        let mut props = self.store.properties(self.id, node)?;
        if let Some(staged) = self.changes.properties_of(node) {
            props.extend(staged.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Ok(props)
    }

    // ---------------------------------------------------------------
    // Writes
    // ---------------------------------------------------------------

    /// Create a child node under `parent`. The node is pending until saved.
    pub fn add_node(
        &mut self,
        parent: NodeId,
        name: &str,
        node_type: NodeType,
    ) -> SessionResult<NodeId> {
        self.check_write("add node")?;
        let id = self.store.create_node(self.id, parent, name, node_type)?;
        self.changes.record_created(id);
        Ok(id)
    }

    /// Stage a property write, overwriting any earlier value of that name.
    pub fn set_property(
        &mut self,
        node: NodeId,
        name: &str,
        value: impl Into<PropertyValue>,
    ) -> SessionResult<()> {
        self.check_write("set property")?;
        validate_property_name(name)?;
        // The node must exist for this session before a write is staged.
        self.store.node(self.id, node)?;
        self.changes.set_property(node, name, value.into());
        Ok(())
    }

    /// Atomically apply every staged change.
    ///
    /// On failure nothing is applied and the change set is kept, so the
    /// session stays live and may be logged out to discard it.
    pub fn save(&mut self) -> SessionResult<CommitReceipt> {
        self.ensure_live()?;
        let receipt = self
            .store
            .apply(&self.changes)
            .map_err(SessionError::CommitFailed)?;
        self.changes.clear();
        info!(
            session = %self.id,
            revision = receipt.revision,
            nodes = receipt.nodes_created,
            properties = receipt.properties_written,
            "session saved"
        );
        Ok(receipt)
    }

    /// Close the session, discarding unsaved changes. Idempotent.
    pub fn logout(&mut self) {
        if !self.live {
            return;
        }
        self.live = false;

        if !self.changes.is_empty() {
            warn!(
                session = %self.id,
                nodes = self.changes.node_count(),
                properties = self.changes.property_count(),
                "logging out with unsaved changes; discarding"
            );
            if let Err(e) = self.store.discard(&self.changes) {
                // The store purges them on its next successful write.
                warn!(session = %self.id, error = %e, "failed to discard pending nodes");
            }
            self.changes.clear();
        }
        debug!(session = %self.id, "logout");
    }

    // ---------------------------------------------------------------
    // Checks
    // ---------------------------------------------------------------

    fn ensure_live(&self) -> SessionResult<()> {
        if self.live {
            Ok(())
        } else {
            Err(SessionError::SessionClosed)
        }
    }

    fn check(&self, permission: Permission, action: &str) -> SessionResult<()> {
        self.ensure_live()?;
        if self.context.has(permission) {
            Ok(())
        } else {
            Err(SessionError::PermissionDenied {
                user: self.context.username.clone(),
                permission,
                action: action.to_string(),
            })
        }
    }

    fn check_read(&self, action: &str) -> SessionResult<()> {
        self.check(Permission::Read, action)
    }

    fn check_write(&self, action: &str) -> SessionResult<()> {
        self.check(Permission::Write, action)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.logout();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("user", &self.context.username)
            .field("live", &self.live)
            .field("pending_nodes", &self.changes.node_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::Repository;
    use cairn_store::{InMemoryContentStore, StoreError};

    fn unstructured() -> NodeType {
        NodeType::unstructured()
    }

    fn writer(repo: &Repository) -> Session {
        repo.login(SecurityContext::read_write("testuser"))
    }

    // -----------------------------------------------------------------------
    // Path resolution and node creation
    // -----------------------------------------------------------------------

    #[test]
    fn root_resolves_from_empty_and_slash() {
        let repo = Repository::in_memory();
        let session = writer(&repo);
        let root = session.root_node().unwrap();
        assert_eq!(session.node_at("").unwrap(), root);
        assert_eq!(session.node_at("/").unwrap(), root);
    }

    #[test]
    fn missing_path_is_not_found() {
        let repo = Repository::in_memory();
        let session = writer(&repo);
        assert!(matches!(
            session.node_at("/nope"),
            Err(SessionError::NotFound(p)) if p == "/nope"
        ));
    }

    #[test]
    fn malformed_path_is_invalid() {
        let repo = Repository::in_memory();
        let session = writer(&repo);
        assert!(matches!(
            session.node_at("relative"),
            Err(SessionError::InvalidName(_))
        ));
    }

    #[test]
    fn add_node_then_resolve() {
        let repo = Repository::in_memory();
        let mut session = writer(&repo);
        let root = session.root_node().unwrap();
        let a = session.add_node(root, "a", unstructured()).unwrap();
        let b = session.add_node(a, "b", unstructured()).unwrap();

        assert_eq!(session.node_at("/a/b").unwrap(), b);
        assert_eq!(session.path(b).unwrap().to_string(), "/a/b");
        assert_eq!(session.children(root).unwrap(), vec![a]);
        let info = session.node(b).unwrap();
        assert_eq!(info.name, "b");
        assert_eq!(info.node_type, unstructured());
        assert_eq!(info.parent, Some(a));
        assert!(session.has_pending_changes());
    }

    #[test]
    fn duplicate_name_reported() {
        let repo = Repository::in_memory();
        let mut session = writer(&repo);
        let root = session.root_node().unwrap();
        session.add_node(root, "a", unstructured()).unwrap();
        assert!(matches!(
            session.add_node(root, "a", unstructured()),
            Err(SessionError::DuplicateName { .. })
        ));
    }

    #[test]
    fn read_only_session_cannot_write() {
        let repo = Repository::in_memory();
        let mut session = repo.login(SecurityContext::read_only("reader"));
        let root = session.root_node().unwrap();

        assert!(matches!(
            session.add_node(root, "a", unstructured()),
            Err(SessionError::PermissionDenied { permission: Permission::Write, .. })
        ));
        assert!(matches!(
            session.set_property(root, "p", "v"),
            Err(SessionError::PermissionDenied { .. })
        ));
        assert!(!session.has_pending_changes());
    }

    #[test]
    fn write_only_context_can_still_read() {
        let repo = Repository::in_memory();
        let session = repo.login(SecurityContext::new("w", [Permission::Write]));
        assert!(session.root_node().is_ok());
    }

    #[test]
    fn context_without_permissions_cannot_read() {
        let repo = Repository::in_memory();
        let session = repo.login(SecurityContext::new("nobody", std::iter::empty()));
        assert!(matches!(
            session.root_node(),
            Err(SessionError::PermissionDenied { permission: Permission::Read, .. })
        ));
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    #[test]
    fn properties_overwrite_per_name() {
        let repo = Repository::in_memory();
        let mut session = writer(&repo);
        let root = session.root_node().unwrap();
        let a = session.add_node(root, "a", unstructured()).unwrap();

        session.set_property(a, "one", "1").unwrap();
        session.set_property(a, "two", "2").unwrap();
        session.set_property(a, "one", "uno").unwrap();

        assert_eq!(session.property(a, "one").unwrap(), Some(PropertyValue::from("uno")));
        assert_eq!(session.property(a, "two").unwrap(), Some(PropertyValue::from("2")));
        assert_eq!(session.property(a, "three").unwrap(), None);
        assert_eq!(session.properties(a).unwrap().len(), 2);
    }

    #[test]
    fn staged_write_overlays_committed_value() {
        let repo = Repository::in_memory();
        let mut session = writer(&repo);
        let root = session.root_node().unwrap();
        let a = session.add_node(root, "a", unstructured()).unwrap();
        session.set_property(a, "p", 1i64).unwrap();
        session.set_property(a, "q", 2i64).unwrap();
        session.save().unwrap();

        session.set_property(a, "p", 10i64).unwrap();
        let props = session.properties(a).unwrap();
        assert_eq!(props.get("p"), Some(&PropertyValue::Long(10)));
        assert_eq!(props.get("q"), Some(&PropertyValue::Long(2)));

        let other = writer(&repo);
        assert_eq!(other.property(a, "p").unwrap(), Some(PropertyValue::Long(1)));
    }

    #[test]
    fn property_on_unknown_node_fails() {
        let repo = Repository::in_memory();
        let mut owner = writer(&repo);
        let root = owner.root_node().unwrap();
        let hidden = owner.add_node(root, "a", unstructured()).unwrap();

        let mut other = writer(&repo);
        assert!(matches!(
            other.set_property(hidden, "p", "v"),
            Err(SessionError::NotFound(_))
        ));
    }

    #[test]
    fn invalid_property_name() {
        let repo = Repository::in_memory();
        let mut session = writer(&repo);
        let root = session.root_node().unwrap();
        assert!(matches!(
            session.set_property(root, "a/b", "v"),
            Err(SessionError::InvalidName(_))
        ));
    }

    // -----------------------------------------------------------------------
    // Save and isolation
    // -----------------------------------------------------------------------

    #[test]
    fn save_publishes_to_other_sessions() {
        let repo = Repository::in_memory();
        let mut session = writer(&repo);
        let observer = writer(&repo);
        let root = session.root_node().unwrap();
        let a = session.add_node(root, "a", unstructured()).unwrap();
        session.set_property(a, "p", "v").unwrap();

        assert!(observer.node_at("/a").is_err());

        let receipt = session.save().unwrap();
        assert_eq!(receipt.nodes_created, 1);
        assert_eq!(receipt.properties_written, 1);
        assert!(!session.has_pending_changes());

        assert_eq!(observer.node_at("/a").unwrap(), a);
        assert_eq!(observer.property(a, "p").unwrap(), Some(PropertyValue::from("v")));
    }

    #[test]
    fn save_after_logout_fails() {
        let repo = Repository::in_memory();
        let mut session = writer(&repo);
        let root = session.root_node().unwrap();
        session.add_node(root, "a", unstructured()).unwrap();
        session.logout();

        assert!(!session.is_live());
        assert!(matches!(session.save(), Err(SessionError::SessionClosed)));
        assert!(matches!(session.root_node(), Err(SessionError::SessionClosed)));
    }

    #[test]
    fn logout_is_idempotent() {
        let repo = Repository::in_memory();
        let mut session = writer(&repo);
        session.logout();
        session.logout();
        assert!(!session.is_live());
    }

    #[test]
    fn logout_discards_pending_nodes() {
        let store = Arc::new(InMemoryContentStore::new());
        let repo = Repository::new(store.clone());
        let mut session = writer(&repo);
        let root = session.root_node().unwrap();
        let a = session.add_node(root, "a", unstructured()).unwrap();
        session.add_node(a, "b", unstructured()).unwrap();
        assert_eq!(store.len().unwrap(), 3);

        session.logout();
        assert_eq!(store.len().unwrap(), 1);

        let next = writer(&repo);
        assert!(next.node_at("/a").is_err());
    }

    #[test]
    fn dropping_a_session_discards_pending_nodes() {
        let store = Arc::new(InMemoryContentStore::new());
        let repo = Repository::new(store.clone());
        {
            let mut session = writer(&repo);
            let root = session.root_node().unwrap();
            session.add_node(root, "a", unstructured()).unwrap();
        }
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn logout_while_offline_still_drops_pending_nodes() {
        let store = Arc::new(InMemoryContentStore::new());
        let repo = Repository::new(store.clone());
        let mut session = writer(&repo);
        let root = session.root_node().unwrap();
        session.add_node(root, "a", unstructured()).unwrap();

        store.set_online(false);
        session.logout();
        assert!(!session.is_live());
        store.set_online(true);

        assert_eq!(store.len().unwrap(), 1);
        let mut next = writer(&repo);
        assert!(next.node_at("/a").is_err());
        let root = next.root_node().unwrap();
        assert!(next.children(root).unwrap().is_empty());
        next.add_node(root, "a", unstructured()).unwrap();
    }

    #[test]
    fn failed_save_keeps_changes_and_store_unchanged() {
        let store = Arc::new(InMemoryContentStore::new());
        let repo = Repository::new(store.clone());
        let mut session = writer(&repo);
        let root = session.root_node().unwrap();
        session.add_node(root, "a", unstructured()).unwrap();

        store.set_online(false);
        let err = session.save().unwrap_err();
        assert!(matches!(err, SessionError::CommitFailed(StoreError::Unavailable)));
        assert!(session.is_live());
        assert!(session.has_pending_changes());

        store.set_online(true);
        assert_eq!(store.committed_count().unwrap(), 1);
        session.save().unwrap();
        assert_eq!(store.committed_count().unwrap(), 2);
    }
}
