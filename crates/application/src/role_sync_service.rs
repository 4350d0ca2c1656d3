use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use squadsync_core::AppResult;
use squadsync_domain::{DirectoryUser, RoleChangeKind, RoleDiff, RoleId, SyncSettings};
use tracing::{debug, info, warn};

use crate::SettingsService;
use crate::sync_ports::{
    MembershipDirectory, ReconciliationReport, RoleCatalog, RoleChange, RoleChangeOutcome,
    SyncMode, UserSyncEntry,
};

/// Application service that reconciles squad memberships with role assignments.
///
/// A run is a single sequential pass over the directory. Every attempted
/// change is recorded and counted, including one whose write fails. A failed
/// write stops processing of that user only; earlier writes are not rolled
/// back.
#[derive(Clone)]
pub struct RoleSyncService {
    directory: Arc<dyn MembershipDirectory>,
    role_catalog: Arc<dyn RoleCatalog>,
    settings_service: SettingsService,
}

impl RoleSyncService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        directory: Arc<dyn MembershipDirectory>,
        role_catalog: Arc<dyn RoleCatalog>,
        settings_service: SettingsService,
    ) -> Self {
        Self {
            directory,
            role_catalog,
            settings_service,
        }
    }

    /// Loads the stored settings and reconciles every user.
    ///
    /// Configuration errors abort before any user is read.
    pub async fn run(&self, mode: SyncMode) -> AppResult<ReconciliationReport> {
        let settings = self.settings_service.load_sync_settings().await?;
        self.reconcile(&settings, mode).await
    }

    /// Reconciles every user against explicit settings.
    pub async fn reconcile(
        &self,
        settings: &SyncSettings,
        mode: SyncMode,
    ) -> AppResult<ReconciliationReport> {
        let started_at = Utc::now();
        let users = self.directory.list_users().await?;

        info!(
            users = users.len(),
            mapped_squads = settings.mapping().len(),
            dry_run = mode.is_dry_run(),
            "starting squad role synchronization"
        );

        let mut entries = Vec::new();
        let mut total_changes = 0_usize;

        for user in &users {
            let entry = match self.plan_for_user(settings, user).await {
                Ok(diff) if diff.is_empty() => continue,
                Ok(diff) => self.apply_diff(settings, user, &diff, mode).await,
                Err(error) => {
                    warn!(
                        user_id = %user.id,
                        error = %error,
                        "failed to read memberships for user"
                    );
                    UserSyncEntry {
                        user_id: user.id,
                        user_name: user.name.clone(),
                        changes: Vec::new(),
                        failure: Some(error.to_string()),
                    }
                }
            };

            total_changes = total_changes.saturating_add(entry.changes.len());
            entries.push(entry);
        }

        let report = ReconciliationReport {
            mode,
            settings: settings.clone(),
            started_at,
            finished_at: Utc::now(),
            users_processed: users.len(),
            total_changes,
            entries,
        };

        info!(
            users_processed = report.users_processed,
            total_changes = report.total_changes,
            failed_users = report.failed_users(),
            dry_run = mode.is_dry_run(),
            "squad role synchronization finished"
        );

        Ok(report)
    }

    async fn plan_for_user(
        &self,
        settings: &SyncSettings,
        user: &DirectoryUser,
    ) -> AppResult<RoleDiff> {
        let squad_ids = self.directory.list_squad_ids_for_user(user.id).await?;
        let role_ids = self.directory.list_role_ids_for_user(user.id).await?;

        Ok(settings.plan(squad_ids, role_ids))
    }

    async fn apply_diff(
        &self,
        settings: &SyncSettings,
        user: &DirectoryUser,
        diff: &RoleDiff,
        mode: SyncMode,
    ) -> UserSyncEntry {
        let titles = self.resolve_role_titles(diff).await;
        let mut entry = UserSyncEntry {
            user_id: user.id,
            user_name: user.name.clone(),
            changes: Vec::with_capacity(diff.len()),
            failure: None,
        };

        for (kind, role_id) in diff.changes() {
            if settings.is_sealed(role_id) {
                debug!(user_id = %user.id, role_id = %role_id, "skipping sealed role");
                continue;
            }

            let role_title = titles
                .get(&role_id)
                .cloned()
                .unwrap_or_else(|| role_id.to_string());

            let outcome = if mode.is_dry_run() {
                RoleChangeOutcome::Simulated
            } else {
                match self.write_change(user, kind, role_id).await {
                    Ok(()) => RoleChangeOutcome::Applied,
                    Err(error) => RoleChangeOutcome::Failed {
                        reason: error.to_string(),
                    },
                }
            };

            info!(
                user_id = %user.id,
                role_id = %role_id,
                change = kind.as_str(),
                dry_run = mode.is_dry_run(),
                "role change recorded"
            );

            let failure = match &outcome {
                RoleChangeOutcome::Failed { reason } => Some(reason.clone()),
                RoleChangeOutcome::Applied | RoleChangeOutcome::Simulated => None,
            };

            entry.changes.push(RoleChange {
                role_id,
                role_title,
                kind,
                outcome,
            });

            if let Some(reason) = failure {
                warn!(
                    user_id = %user.id,
                    role_id = %role_id,
                    change = kind.as_str(),
                    error = %reason,
                    "role change failed; skipping remaining changes for user"
                );
                entry.failure = Some(reason);
                break;
            }
        }

        entry
    }

    async fn write_change(
        &self,
        user: &DirectoryUser,
        kind: RoleChangeKind,
        role_id: RoleId,
    ) -> AppResult<()> {
        match kind {
            RoleChangeKind::Add => self.directory.attach_role(user.id, role_id).await,
            RoleChangeKind::Remove => self.directory.detach_role(user.id, role_id).await,
        }
    }

    async fn resolve_role_titles(&self, diff: &RoleDiff) -> HashMap<RoleId, String> {
        let role_ids = diff.changes().map(|(_, role_id)| role_id).collect::<Vec<_>>();

        match self.role_catalog.find_roles(&role_ids).await {
            Ok(roles) => roles
                .into_iter()
                .map(|role| (role.id, role.title))
                .collect(),
            Err(error) => {
                warn!(error = %error, "failed to resolve role titles; reporting bare ids");
                HashMap::new()
            }
        }
    }
}
