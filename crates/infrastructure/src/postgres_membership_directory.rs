use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::debug;

use squadsync_application::{MembershipDirectory, RoleCatalog};
use squadsync_core::{AppError, AppResult};
use squadsync_domain::{DirectoryRole, DirectorySquad, DirectoryUser, RoleId, SquadId, UserId};

/// PostgreSQL-backed view over the host's users, squads and role assignments.
#[derive(Clone)]
pub struct PostgresMembershipDirectory {
    pool: PgPool,
}

impl PostgresMembershipDirectory {
    /// Creates a directory with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    name: String,
}

#[derive(Debug, FromRow)]
struct SquadRow {
    id: i64,
    name: String,
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: i64,
    title: String,
}

impl From<RoleRow> for DirectoryRole {
    fn from(row: RoleRow) -> Self {
        DirectoryRole::new(RoleId::new(row.id), row.title)
    }
}

#[async_trait]
impl MembershipDirectory for PostgresMembershipDirectory {
    async fn list_users(&self) -> AppResult<Vec<DirectoryUser>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list users: {error}")))?;

        Ok(rows
            .into_iter()
            .map(|row| DirectoryUser::new(UserId::new(row.id), row.name))
            .collect())
    }

    async fn list_squads(&self) -> AppResult<Vec<DirectorySquad>> {
        let rows = sqlx::query_as::<_, SquadRow>(
            r#"
            SELECT id, name
            FROM squads
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list squads: {error}")))?;

        Ok(rows
            .into_iter()
            .map(|row| DirectorySquad::new(SquadId::new(row.id), row.name))
            .collect())
    }

    async fn list_squad_ids_for_user(&self, user_id: UserId) -> AppResult<Vec<SquadId>> {
        let squad_ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT squad_id
            FROM squad_member
            WHERE user_id = $1
            ORDER BY squad_id
            "#,
        )
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list squad memberships for user '{user_id}': {error}"
            ))
        })?;

        Ok(squad_ids.into_iter().map(SquadId::new).collect())
    }

    async fn list_role_ids_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleId>> {
        let role_ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT role_id
            FROM role_user
            WHERE user_id = $1
            ORDER BY role_id
            "#,
        )
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list role assignments for user '{user_id}': {error}"
            ))
        })?;

        Ok(role_ids.into_iter().map(RoleId::new).collect())
    }

    async fn attach_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO role_user (role_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (role_id, user_id) DO NOTHING
            "#,
        )
        .bind(role_id.value())
        .bind(user_id.value())
        .execute(&self.pool)
        .await
        .map_err(|error| map_attach_error(error, user_id, role_id))?;

        debug!(user_id = %user_id, role_id = %role_id, "role attached");
        Ok(())
    }

    async fn detach_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM role_user
            WHERE role_id = $1
                AND user_id = $2
            "#,
        )
        .bind(role_id.value())
        .bind(user_id.value())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to detach role: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "role assignment '{user_id}:{role_id}' was not found"
            )));
        }

        debug!(user_id = %user_id, role_id = %role_id, "role detached");
        Ok(())
    }
}

#[async_trait]
impl RoleCatalog for PostgresMembershipDirectory {
    async fn list_roles(&self) -> AppResult<Vec<DirectoryRole>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, title
            FROM roles
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        Ok(rows.into_iter().map(DirectoryRole::from).collect())
    }

    async fn find_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<DirectoryRole>> {
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids = role_ids.iter().map(RoleId::value).collect::<Vec<_>>();
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, title
            FROM roles
            WHERE id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve roles: {error}")))?;

        Ok(rows.into_iter().map(DirectoryRole::from).collect())
    }
}

fn map_attach_error(error: sqlx::Error, user_id: UserId, role_id: RoleId) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23503")
    {
        return AppError::NotFound(format!(
            "cannot attach role '{role_id}' to user '{user_id}': user or role does not exist"
        ));
    }

    AppError::Internal(format!("failed to attach role: {error}"))
}
