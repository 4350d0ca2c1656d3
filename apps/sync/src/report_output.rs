//! Human readable rendering of settings and reconciliation reports.

use std::fmt::Write as _;

use squadsync_application::{ReconciliationReport, RoleChangeOutcome};
use squadsync_core::{AppError, AppResult};
use squadsync_domain::{RoleChangeKind, SyncSettings};

pub const DRY_RUN_BANNER: &str = "DRY RUN MODE - No changes will be made";
pub const DRY_RUN_FOOTER: &str = "DRY RUN MODE - No actual changes were made";

pub fn render_settings(settings: &SyncSettings) -> String {
    let inactive = settings
        .inactive_role_id()
        .map_or_else(|| "Not set".to_owned(), |role_id| role_id.to_string());
    let ignored = if settings.ignore_role_ids().is_empty() {
        "None".to_owned()
    } else {
        settings
            .ignore_role_ids()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "Squad-Role Mapping: {}\nInactive Role ID: {inactive}\nIgnore Role IDs: {ignored}\n",
        settings.mapping().to_json()
    )
}

pub fn render_report(report: &ReconciliationReport) -> String {
    let mut output = String::new();

    for entry in &report.entries {
        let _ = writeln!(output, "User: {} (ID: {})", entry.user_name, entry.user_id);

        for change in &entry.changes {
            let (prefix, verb) = match change.kind {
                RoleChangeKind::Add => ('+', "Add"),
                RoleChangeKind::Remove => ('-', "Remove"),
            };
            let _ = writeln!(
                output,
                "  {prefix} {verb} role: {} (ID: {})",
                change.role_title, change.role_id
            );
            if let RoleChangeOutcome::Failed { reason } = &change.outcome {
                let _ = writeln!(output, "  ! Failed: {reason}");
            }
        }

        if entry.changes.is_empty()
            && let Some(failure) = &entry.failure
        {
            let _ = writeln!(output, "  ! Skipped: {failure}");
        }

        output.push('\n');
    }

    output.push_str("Synchronization complete!\n");
    let _ = writeln!(output, "Total users processed: {}", report.users_processed);
    let _ = writeln!(output, "Total changes: {}", report.total_changes);
    if report.failed_users() > 0 {
        let _ = writeln!(output, "Users with failed changes: {}", report.failed_users());
    }

    output
}

pub fn render_json(report: &ReconciliationReport) -> AppResult<String> {
    serde_json::to_string_pretty(report)
        .map_err(|error| AppError::Internal(format!("failed to serialize report: {error}")))
}
