use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use squadsync_core::{AppError, AppResult};
use squadsync_domain::{DirectoryRole, DirectorySquad, DirectoryUser, RoleId, SquadId, UserId};

use crate::sync_ports::{MembershipDirectory, RawSyncSettings, RoleCatalog, SettingsRepository};

use super::{SettingsService, SettingsUpdateInput};

struct FakeDirectory {
    squads: Vec<DirectorySquad>,
}

#[async_trait]
impl MembershipDirectory for FakeDirectory {
    async fn list_users(&self) -> AppResult<Vec<DirectoryUser>> {
        Ok(Vec::new())
    }

    async fn list_squads(&self) -> AppResult<Vec<DirectorySquad>> {
        Ok(self.squads.clone())
    }

    async fn list_squad_ids_for_user(&self, _user_id: UserId) -> AppResult<Vec<SquadId>> {
        Ok(Vec::new())
    }

    async fn list_role_ids_for_user(&self, _user_id: UserId) -> AppResult<Vec<RoleId>> {
        Ok(Vec::new())
    }

    async fn attach_role(&self, _user_id: UserId, _role_id: RoleId) -> AppResult<()> {
        Ok(())
    }

    async fn detach_role(&self, _user_id: UserId, _role_id: RoleId) -> AppResult<()> {
        Ok(())
    }
}

struct FakeRoleCatalog {
    roles: Vec<DirectoryRole>,
}

#[async_trait]
impl RoleCatalog for FakeRoleCatalog {
    async fn list_roles(&self) -> AppResult<Vec<DirectoryRole>> {
        Ok(self.roles.clone())
    }

    async fn find_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<DirectoryRole>> {
        Ok(self
            .roles
            .iter()
            .filter(|role| role_ids.contains(&role.id))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct FakeSettingsRepository {
    settings: Mutex<RawSyncSettings>,
    saves: Mutex<usize>,
}

#[async_trait]
impl SettingsRepository for FakeSettingsRepository {
    async fn load_raw_settings(&self) -> AppResult<RawSyncSettings> {
        Ok(self.settings.lock().await.clone())
    }

    async fn save_raw_settings(&self, settings: RawSyncSettings) -> AppResult<()> {
        *self.settings.lock().await = settings;
        *self.saves.lock().await += 1;
        Ok(())
    }
}

fn service() -> (SettingsService, Arc<FakeSettingsRepository>) {
    let repository = Arc::new(FakeSettingsRepository::default());
    let service = SettingsService::new(
        repository.clone(),
        Arc::new(FakeDirectory {
            squads: vec![
                DirectorySquad::new(SquadId::new(10), "Pilots"),
                DirectorySquad::new(SquadId::new(11), "Fleet Commanders"),
            ],
        }),
        Arc::new(FakeRoleCatalog {
            roles: vec![
                DirectoryRole::new(RoleId::new(100), "Line Member"),
                DirectoryRole::new(RoleId::new(200), "Fleet Commander"),
                DirectoryRole::new(RoleId::new(500), "Director"),
                DirectoryRole::new(RoleId::new(999), "Inactive"),
            ],
        }),
    );
    (service, repository)
}

fn input(mapping: &str, inactive: Option<&str>, ignore: Option<&str>) -> SettingsUpdateInput {
    SettingsUpdateInput {
        role_squad_map: mapping.to_owned(),
        inactive_role_id: inactive.map(str::to_owned),
        ignore_role_ids: ignore.map(str::to_owned),
    }
}

#[tokio::test]
async fn update_stores_normalized_settings() {
    let (service, repository) = service();

    let result = service
        .update_sync_settings(input(
            r#"{"11": "200", "10": 100}"#,
            Some(" 999 "),
            Some("500"),
        ))
        .await;

    assert!(result.is_ok());
    let stored = repository.settings.lock().await.clone();
    assert_eq!(
        stored,
        RawSyncSettings {
            role_squad_map: Some(r#"{"10":100,"11":200}"#.to_owned()),
            inactive_role_id: Some("999".to_owned()),
            ignore_role_ids: Some("[500]".to_owned()),
        }
    );

    let reloaded = service.load_sync_settings().await;
    assert!(matches!(reloaded, Ok(settings) if settings.inactive_role_id() == Some(RoleId::new(999))));
}

#[tokio::test]
async fn update_rejects_unknown_squads_and_roles() {
    let (service, repository) = service();

    let result = service
        .update_sync_settings(input(r#"{"10": 100, "12": 300}"#, Some("998"), None))
        .await;

    let Err(AppError::Validation(message)) = result else {
        panic!("expected validation error");
    };
    assert!(message.contains("squad '12' does not exist"));
    assert!(message.contains("mapped role '300' does not exist"));
    assert!(message.contains("inactive role '998' does not exist"));
    assert_eq!(*repository.saves.lock().await, 0);
}

#[tokio::test]
async fn update_rejects_sealed_roles_used_as_mapping_targets() {
    let (service, repository) = service();

    let result = service
        .update_sync_settings(input(
            r#"{"10": 999, "11": 500}"#,
            Some("999"),
            Some("[500]"),
        ))
        .await;

    let Err(AppError::Validation(message)) = result else {
        panic!("expected validation error");
    };
    assert!(message.contains("inactive role '999' must not be a mapping target"));
    assert!(message.contains("ignored role '500' must not be a mapping target"));
    assert_eq!(*repository.saves.lock().await, 0);
}

#[tokio::test]
async fn update_reports_malformed_mapping_as_validation_error() {
    let (service, _) = service();

    let result = service
        .update_sync_settings(input("[1, 2, 3]", None, None))
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn load_without_stored_mapping_is_a_configuration_error() {
    let (service, _) = service();

    let result = service.load_sync_settings().await;

    assert!(matches!(result, Err(AppError::Configuration(_))));
}
