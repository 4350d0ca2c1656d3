//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod directory;
mod identifiers;
mod role_diff;
mod settings;

pub use directory::{DirectoryRole, DirectorySquad, DirectoryUser};
pub use identifiers::{RoleId, SquadId, UserId};
pub use role_diff::{RoleChangeKind, RoleDiff};
pub use settings::{
    SquadRoleMapping, SyncSettings, parse_ignore_role_ids, parse_inactive_role_id,
};
