use std::sync::Arc;

use cairn_store::{ContentStore, InMemoryContentStore};
use tracing::debug;

use crate::security::SecurityContext;
use crate::session::Session;

/// Entry point to one workspace.
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn ContentStore>,
}

impl Repository {
    /// A repository over a fresh in-memory workspace named `workspace1`.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryContentStore::new()))
    }

    /// A repository over an existing store.
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub fn workspace(&self) -> &str {
        self.store.workspace()
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    /// Open a live session for the given identity.
    pub fn login(&self, context: SecurityContext) -> Session {
        let session = Session::open(Arc::clone(&self.store), context);
        debug!(
            session = %session.id(),
            user = %session.user(),
            workspace = self.workspace(),
            "login"
        );
        session
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("workspace", &self.workspace())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_workspace_name() {
        let repo = Repository::in_memory();
        assert_eq!(repo.workspace(), "workspace1");
    }

    #[test]
    fn custom_workspace() {
        let repo = Repository::new(Arc::new(InMemoryContentStore::with_workspace("drafts")));
        assert_eq!(repo.workspace(), "drafts");
    }

    #[test]
    fn sessions_are_distinct_and_live() {
        let repo = Repository::in_memory();
        let a = repo.login(SecurityContext::read_write("a"));
        let b = repo.login(SecurityContext::read_write("b"));
        assert_ne!(a.id(), b.id());
        assert!(a.is_live());
        assert!(b.is_live());
    }
}
