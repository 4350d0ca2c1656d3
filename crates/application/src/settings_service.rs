use std::collections::BTreeSet;
use std::sync::Arc;

use squadsync_core::{AppError, AppResult};
use squadsync_domain::{RoleId, SquadId, SyncSettings};
use tracing::info;

use crate::sync_ports::{MembershipDirectory, RawSyncSettings, RoleCatalog, SettingsRepository};

/// Input payload submitted by an administrator to replace the settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsUpdateInput {
    /// JSON object text mapping squad ids to role ids.
    pub role_squad_map: String,
    /// Optional inactive role id.
    pub inactive_role_id: Option<String>,
    /// Optional JSON array of ignored role ids.
    pub ignore_role_ids: Option<String>,
}

/// Application service that reads and updates synchronization settings.
#[derive(Clone)]
pub struct SettingsService {
    repository: Arc<dyn SettingsRepository>,
    directory: Arc<dyn MembershipDirectory>,
    role_catalog: Arc<dyn RoleCatalog>,
}

impl SettingsService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        repository: Arc<dyn SettingsRepository>,
        directory: Arc<dyn MembershipDirectory>,
        role_catalog: Arc<dyn RoleCatalog>,
    ) -> Self {
        Self {
            repository,
            directory,
            role_catalog,
        }
    }

    /// Returns the settings exactly as stored.
    pub async fn load_raw_settings(&self) -> AppResult<RawSyncSettings> {
        self.repository.load_raw_settings().await
    }

    /// Loads and parses the stored settings for a reconciliation run.
    ///
    /// Missing, empty or malformed values yield [`AppError::Configuration`].
    pub async fn load_sync_settings(&self) -> AppResult<SyncSettings> {
        let raw = self.repository.load_raw_settings().await?;

        SyncSettings::from_raw(
            raw.role_squad_map.as_deref(),
            raw.inactive_role_id.as_deref(),
            raw.ignore_role_ids.as_deref(),
        )
    }

    /// Validates and stores new settings.
    ///
    /// Every referenced squad and role must exist, and neither the inactive
    /// role nor an ignored role may be a mapping target.
    pub async fn update_sync_settings(
        &self,
        input: SettingsUpdateInput,
    ) -> AppResult<SyncSettings> {
        let settings = SyncSettings::from_raw(
            Some(input.role_squad_map.as_str()),
            input.inactive_role_id.as_deref(),
            input.ignore_role_ids.as_deref(),
        )
        .map_err(|error| match error {
            AppError::Configuration(message) => AppError::Validation(message),
            other => other,
        })?;

        let known_squads = self
            .directory
            .list_squads()
            .await?
            .into_iter()
            .map(|squad| squad.id)
            .collect::<BTreeSet<SquadId>>();
        let known_roles = self
            .role_catalog
            .list_roles()
            .await?
            .into_iter()
            .map(|role| role.id)
            .collect::<BTreeSet<RoleId>>();

        let violations = collect_violations(&settings, &known_squads, &known_roles);
        if !violations.is_empty() {
            return Err(AppError::Validation(violations.join("; ")));
        }

        self.repository
            .save_raw_settings(to_raw_settings(&settings))
            .await?;

        info!(
            mapped_squads = settings.mapping().len(),
            inactive_role_id = ?settings.inactive_role_id().map(|role_id| role_id.value()),
            ignored_roles = settings.ignore_role_ids().len(),
            "squad role sync settings updated"
        );

        Ok(settings)
    }
}

fn collect_violations(
    settings: &SyncSettings,
    known_squads: &BTreeSet<SquadId>,
    known_roles: &BTreeSet<RoleId>,
) -> Vec<String> {
    let mut violations = Vec::new();
    let mapped_roles = settings.mapping().role_ids();

    for squad_id in settings.mapping().squad_ids() {
        if !known_squads.contains(&squad_id) {
            violations.push(format!("squad '{squad_id}' does not exist"));
        }
    }

    for role_id in &mapped_roles {
        if !known_roles.contains(role_id) {
            violations.push(format!("mapped role '{role_id}' does not exist"));
        }
    }

    if let Some(inactive_role_id) = settings.inactive_role_id() {
        if !known_roles.contains(&inactive_role_id) {
            violations.push(format!("inactive role '{inactive_role_id}' does not exist"));
        }
        if mapped_roles.contains(&inactive_role_id) {
            violations.push(format!(
                "inactive role '{inactive_role_id}' must not be a mapping target"
            ));
        }
    }

    for role_id in settings.ignore_role_ids() {
        if !known_roles.contains(role_id) {
            violations.push(format!("ignored role '{role_id}' does not exist"));
        }
        if mapped_roles.contains(role_id) {
            violations.push(format!("ignored role '{role_id}' must not be a mapping target"));
        }
    }

    violations
}

fn to_raw_settings(settings: &SyncSettings) -> RawSyncSettings {
    let ignore_role_ids = settings
        .ignore_role_ids()
        .iter()
        .map(|role_id| role_id.value())
        .collect::<Vec<_>>();

    RawSyncSettings {
        role_squad_map: Some(settings.mapping().to_json()),
        inactive_role_id: settings.inactive_role_id().map(|role_id| role_id.to_string()),
        ignore_role_ids: Some(serde_json::Value::from(ignore_role_ids).to_string()),
    }
}

#[cfg(test)]
mod tests;
