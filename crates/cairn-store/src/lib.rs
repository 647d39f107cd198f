//! Workspace node storage for Cairn.
//!
//! A workspace is a single tree of nodes rooted at `/`. Nodes live in a
//! generational arena and reference their children by [`NodeId`], so the tree
//! never holds ownership cycles.
//!
//! # Visibility
//!
//! Nodes created by a session are stored immediately but tagged with the
//! creating [`SessionId`]. Until that session's [`ChangeSet`] is applied they
//! are visible to that session only. Property writes are never stored before
//! apply; they stay in the change set and are overlaid by the session.
//!
//! # Storage Backends
//!
//! All backends implement the [`ContentStore`] trait:
//!
//! - [`InMemoryContentStore`] -- `RwLock`-guarded arena for tests and embedding
//!
//! # Design Rules
//!
//! 1. [`ContentStore::apply`] is all-or-nothing: the change set is validated
//!    in full under the write lock before the first mutation.
//! 2. A failed apply leaves both the store and the change set untouched.
//! 3. Discarding a change set removes every pending node it created.
//! 4. All errors are propagated, never silently ignored.

pub mod changeset;
pub mod error;
pub mod memory;
pub mod record;
pub mod traits;

pub use changeset::{ChangeSet, CommitReceipt};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryContentStore;
pub use record::{NodeInfo, NodeRecord};
pub use traits::ContentStore;

pub use cairn_types::{NodeId, SessionId};
