use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A right a session may hold over the workspace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Read,
    Write,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Write => f.write_str("write"),
        }
    }
}

/// Identity and rights presented at login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityContext {
    pub username: String,
    pub permissions: BTreeSet<Permission>,
}

impl SecurityContext {
    pub fn new(username: impl Into<String>, permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            username: username.into(),
            permissions: permissions.into_iter().collect(),
        }
    }

    /// A context holding both read and write permission.
    pub fn read_write(username: impl Into<String>) -> Self {
        Self::new(username, [Permission::Read, Permission::Write])
    }

    /// A context holding read permission only.
    pub fn read_only(username: impl Into<String>) -> Self {
        Self::new(username, [Permission::Read])
    }

    /// Returns `true` if the context grants `permission`. Write implies read.
    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
            || (permission == Permission::Read && self.permissions.contains(&Permission::Write))
    }
}
