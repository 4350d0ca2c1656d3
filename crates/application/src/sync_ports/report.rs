use chrono::{DateTime, Utc};
use serde::Serialize;

use squadsync_domain::{RoleChangeKind, RoleId, SyncSettings, UserId};

/// Whether a run writes to the role-assignment store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Attach and detach roles.
    Apply,
    /// Compute and report changes without writing.
    DryRun,
}

impl SyncMode {
    /// Builds the mode from a `--dry-run` style flag.
    #[must_use]
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run { Self::DryRun } else { Self::Apply }
    }

    /// Returns true when no writes are performed.
    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        matches!(self, Self::DryRun)
    }
}

/// Result of a single attach or detach decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RoleChangeOutcome {
    /// The store accepted the write.
    Applied,
    /// Dry run; nothing was written.
    Simulated,
    /// The store rejected the write.
    Failed {
        /// Error reported by the store.
        reason: String,
    },
}

/// One reported role change for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleChange {
    /// Role being attached or detached.
    pub role_id: RoleId,
    /// Role title, or the bare id when the role record is missing.
    pub role_title: String,
    /// Change direction.
    pub kind: RoleChangeKind,
    /// Write outcome.
    pub outcome: RoleChangeOutcome,
}

/// Changes recorded for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSyncEntry {
    /// User identifier.
    pub user_id: UserId,
    /// User display name.
    pub user_name: String,
    /// Changes in the order they were attempted.
    pub changes: Vec<RoleChange>,
    /// Error that stopped processing this user, if any.
    pub failure: Option<String>,
}

impl UserSyncEntry {
    /// Returns true when processing this user stopped on an error.
    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.failure.is_some()
    }
}

/// Summary of one reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    /// Run mode.
    pub mode: SyncMode,
    /// Settings the run reconciled against.
    pub settings: SyncSettings,
    /// Run start time.
    pub started_at: DateTime<Utc>,
    /// Run completion time.
    pub finished_at: DateTime<Utc>,
    /// Number of users evaluated.
    pub users_processed: usize,
    /// Number of recorded add and remove actions.
    pub total_changes: usize,
    /// Per-user entries, only for users with changes or failures.
    pub entries: Vec<UserSyncEntry>,
}

impl ReconciliationReport {
    /// Returns the number of users whose processing stopped on an error.
    #[must_use]
    pub fn failed_users(&self) -> usize {
        self.entries.iter().filter(|entry| entry.has_failed()).count()
    }

    /// Iterates every recorded change with its user.
    pub fn changes(&self) -> impl Iterator<Item = (&UserSyncEntry, &RoleChange)> {
        self.entries
            .iter()
            .flat_map(|entry| entry.changes.iter().map(move |change| (entry, change)))
    }
}
