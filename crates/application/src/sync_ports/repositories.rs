use async_trait::async_trait;

use squadsync_core::AppResult;
use squadsync_domain::{DirectoryRole, DirectorySquad, DirectoryUser, RoleId, SquadId, UserId};

use super::settings::RawSyncSettings;

/// Port over the host's user directory and role-assignment relation.
#[async_trait]
pub trait MembershipDirectory: Send + Sync {
    /// Lists every user in a stable order.
    async fn list_users(&self) -> AppResult<Vec<DirectoryUser>>;

    /// Lists every squad known to the host.
    async fn list_squads(&self) -> AppResult<Vec<DirectorySquad>>;

    /// Lists squads the user is a member of.
    async fn list_squad_ids_for_user(&self, user_id: UserId) -> AppResult<Vec<SquadId>>;

    /// Lists roles currently assigned to the user.
    async fn list_role_ids_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleId>>;

    /// Assigns a role to the user. Assigning a held role is a no-op.
    async fn attach_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()>;

    /// Removes a role assignment from the user.
    async fn detach_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()>;
}

/// Port for reading role records.
#[async_trait]
pub trait RoleCatalog: Send + Sync {
    /// Lists every role known to the host.
    async fn list_roles(&self) -> AppResult<Vec<DirectoryRole>>;

    /// Returns the roles matching `role_ids`. Unknown ids are omitted.
    async fn find_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<DirectoryRole>>;
}

/// Port over the host's settings storage.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Reads the stored synchronization settings.
    async fn load_raw_settings(&self) -> AppResult<RawSyncSettings>;

    /// Replaces the stored synchronization settings.
    async fn save_raw_settings(&self, settings: RawSyncSettings) -> AppResult<()>;
}
