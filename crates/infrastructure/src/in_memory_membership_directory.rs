use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use squadsync_application::{MembershipDirectory, RoleCatalog};
use squadsync_core::{AppError, AppResult};
use squadsync_domain::{DirectoryRole, DirectorySquad, DirectoryUser, RoleId, SquadId, UserId};
use tokio::sync::RwLock;

/// In-memory user directory and role-assignment store.
///
/// Users are listed in ascending id order.
#[derive(Debug, Default)]
pub struct InMemoryMembershipDirectory {
    users: RwLock<BTreeMap<UserId, DirectoryUser>>,
    squads: RwLock<BTreeMap<SquadId, DirectorySquad>>,
    roles: RwLock<BTreeMap<RoleId, DirectoryRole>>,
    squad_members: RwLock<BTreeSet<(UserId, SquadId)>>,
    role_assignments: RwLock<BTreeSet<(UserId, RoleId)>>,
}

impl InMemoryMembershipDirectory {
    /// Creates an empty in-memory directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a user record.
    pub async fn save_user(&self, user: DirectoryUser) {
        self.users.write().await.insert(user.id, user);
    }

    /// Inserts or replaces a squad record.
    pub async fn save_squad(&self, squad: DirectorySquad) {
        self.squads.write().await.insert(squad.id, squad);
    }

    /// Inserts or replaces a role record.
    pub async fn save_role(&self, role: DirectoryRole) {
        self.roles.write().await.insert(role.id, role);
    }

    /// Adds a user to a squad. Both records must exist.
    pub async fn add_squad_member(&self, user_id: UserId, squad_id: SquadId) -> AppResult<()> {
        self.ensure_user(user_id).await?;
        if !self.squads.read().await.contains_key(&squad_id) {
            return Err(AppError::NotFound(format!("squad '{squad_id}' was not found")));
        }

        self.squad_members.write().await.insert((user_id, squad_id));
        Ok(())
    }

    /// Removes a user from a squad.
    pub async fn remove_squad_member(&self, user_id: UserId, squad_id: SquadId) {
        self.squad_members.write().await.remove(&(user_id, squad_id));
    }

    /// Returns every assignment as `(user, role)` pairs.
    pub async fn role_assignments(&self) -> BTreeSet<(UserId, RoleId)> {
        self.role_assignments.read().await.clone()
    }

    async fn ensure_user(&self, user_id: UserId) -> AppResult<()> {
        if self.users.read().await.contains_key(&user_id) {
            return Ok(());
        }

        Err(AppError::NotFound(format!("user '{user_id}' was not found")))
    }
}

#[async_trait]
impl MembershipDirectory for InMemoryMembershipDirectory {
    async fn list_users(&self) -> AppResult<Vec<DirectoryUser>> {
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn list_squads(&self) -> AppResult<Vec<DirectorySquad>> {
        Ok(self.squads.read().await.values().cloned().collect())
    }

    async fn list_squad_ids_for_user(&self, user_id: UserId) -> AppResult<Vec<SquadId>> {
        self.ensure_user(user_id).await?;

        Ok(self
            .squad_members
            .read()
            .await
            .iter()
            .filter_map(|(member_id, squad_id)| (*member_id == user_id).then_some(*squad_id))
            .collect())
    }

    async fn list_role_ids_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleId>> {
        self.ensure_user(user_id).await?;

        Ok(self
            .role_assignments
            .read()
            .await
            .iter()
            .filter_map(|(holder_id, role_id)| (*holder_id == user_id).then_some(*role_id))
            .collect())
    }

    async fn attach_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        self.ensure_user(user_id).await?;
        if !self.roles.read().await.contains_key(&role_id) {
            return Err(AppError::NotFound(format!("role '{role_id}' was not found")));
        }

        self.role_assignments.write().await.insert((user_id, role_id));
        Ok(())
    }

    async fn detach_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        if !self.role_assignments.write().await.remove(&(user_id, role_id)) {
            return Err(AppError::NotFound(format!(
                "role assignment '{user_id}:{role_id}' was not found"
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl RoleCatalog for InMemoryMembershipDirectory {
    async fn list_roles(&self) -> AppResult<Vec<DirectoryRole>> {
        Ok(self.roles.read().await.values().cloned().collect())
    }

    async fn find_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<DirectoryRole>> {
        let roles = self.roles.read().await;

        Ok(role_ids
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter_map(|role_id| roles.get(role_id).cloned())
            .collect())
    }
}
