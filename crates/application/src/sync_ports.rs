mod repositories;
mod report;
mod settings;

pub use repositories::{MembershipDirectory, RoleCatalog, SettingsRepository};
pub use report::{ReconciliationReport, RoleChange, RoleChangeOutcome, SyncMode, UserSyncEntry};
pub use settings::{
    IGNORE_ROLE_IDS_SETTING, INACTIVE_ROLE_ID_SETTING, ROLE_SQUAD_MAP_SETTING, RawSyncSettings,
};
