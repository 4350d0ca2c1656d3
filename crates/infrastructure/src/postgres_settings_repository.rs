use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use squadsync_application::{
    IGNORE_ROLE_IDS_SETTING, INACTIVE_ROLE_ID_SETTING, ROLE_SQUAD_MAP_SETTING, RawSyncSettings,
    SettingsRepository,
};
use squadsync_core::{AppError, AppResult};

/// PostgreSQL-backed settings storage using the host's `global_settings` table.
#[derive(Clone)]
pub struct PostgresSettingsRepository {
    pool: PgPool,
}

impl PostgresSettingsRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SettingRow {
    name: String,
    value: String,
}

#[async_trait]
impl SettingsRepository for PostgresSettingsRepository {
    async fn load_raw_settings(&self) -> AppResult<RawSyncSettings> {
        let names = vec![
            ROLE_SQUAD_MAP_SETTING.to_owned(),
            INACTIVE_ROLE_ID_SETTING.to_owned(),
            IGNORE_ROLE_IDS_SETTING.to_owned(),
        ];

        let rows = sqlx::query_as::<_, SettingRow>(
            r#"
            SELECT name, value
            FROM global_settings
            WHERE name = ANY($1)
            "#,
        )
        .bind(names)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load settings: {error}")))?;

        let mut settings = RawSyncSettings::default();
        for row in rows {
            match row.name.as_str() {
                ROLE_SQUAD_MAP_SETTING => settings.role_squad_map = Some(row.value),
                INACTIVE_ROLE_ID_SETTING => settings.inactive_role_id = Some(row.value),
                IGNORE_ROLE_IDS_SETTING => settings.ignore_role_ids = Some(row.value),
                _ => {}
            }
        }

        Ok(settings)
    }

    async fn save_raw_settings(&self, settings: RawSyncSettings) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        for (name, value) in [
            (ROLE_SQUAD_MAP_SETTING, settings.role_squad_map),
            (INACTIVE_ROLE_ID_SETTING, settings.inactive_role_id),
            (IGNORE_ROLE_IDS_SETTING, settings.ignore_role_ids),
        ] {
            let result = match value {
                Some(value) => {
                    sqlx::query(
                        r#"
                        INSERT INTO global_settings (name, value)
                        VALUES ($1, $2)
                        ON CONFLICT (name) DO UPDATE
                        SET value = EXCLUDED.value,
                            updated_at = now()
                        "#,
                    )
                    .bind(name)
                    .bind(value)
                    .execute(&mut *transaction)
                    .await
                }
                None => {
                    sqlx::query(
                        r#"
                        DELETE FROM global_settings
                        WHERE name = $1
                        "#,
                    )
                    .bind(name)
                    .execute(&mut *transaction)
                    .await
                }
            };

            result.map_err(|error| {
                AppError::Internal(format!("failed to save setting '{name}': {error}"))
            })?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(())
    }
}
