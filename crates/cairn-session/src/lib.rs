//! Session layer for Cairn.
//!
//! A [`Repository`] fronts one [`ContentStore`] workspace. Logging in with a
//! [`SecurityContext`] yields a [`Session`], the unit of work through which the
//! tree is read and mutated. Mutations are staged in the session's change set
//! and only become visible to other sessions on [`Session::save`].
//!
//! [`ContentStore`]: cairn_store::ContentStore

pub mod error;
pub mod repository;
pub mod security;
pub mod session;

pub use error::{SessionError, SessionResult};
pub use repository::Repository;
pub use security::{Permission, SecurityContext};
pub use session::Session;

pub use cairn_store::CommitReceipt;
pub use cairn_types::{NodeId, NodePath, NodeType, PropertyValue};
