use serde::{Deserialize, Serialize};

use crate::{RoleId, SquadId, UserId};

/// User record as exposed by the host directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    /// Stable user identifier.
    pub id: UserId,
    /// Display name shown in reports.
    pub name: String,
}

impl DirectoryUser {
    /// Creates a user record.
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Squad record as exposed by the host directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySquad {
    /// Stable squad identifier.
    pub id: SquadId,
    /// Squad name.
    pub name: String,
}

impl DirectorySquad {
    /// Creates a squad record.
    #[must_use]
    pub fn new(id: SquadId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Role record as exposed by the host directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryRole {
    /// Stable role identifier.
    pub id: RoleId,
    /// Human readable role title.
    pub title: String,
}

impl DirectoryRole {
    /// Creates a role record.
    #[must_use]
    pub fn new(id: RoleId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}
