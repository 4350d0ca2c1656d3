//! Application services and ports.

#![forbid(unsafe_code)]

mod role_sync_service;
mod settings_service;
mod sync_ports;

pub use role_sync_service::RoleSyncService;
pub use settings_service::{SettingsService, SettingsUpdateInput};
pub use sync_ports::{
    IGNORE_ROLE_IDS_SETTING, INACTIVE_ROLE_ID_SETTING, MembershipDirectory,
    ROLE_SQUAD_MAP_SETTING, RawSyncSettings, ReconciliationReport, RoleCatalog, RoleChange,
    RoleChangeOutcome, SettingsRepository, SyncMode, UserSyncEntry,
};
