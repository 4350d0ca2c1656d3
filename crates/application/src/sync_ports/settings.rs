/// Setting name holding the squad to role mapping JSON object.
pub const ROLE_SQUAD_MAP_SETTING: &str = "squad-sync.role_id_squad_id_map";

/// Setting name holding the inactive role id.
pub const INACTIVE_ROLE_ID_SETTING: &str = "squad-sync.inactive_role_id";

/// Setting name holding the ignored role ids JSON array.
pub const IGNORE_ROLE_IDS_SETTING: &str = "squad-sync.ignore_role_ids";

/// Settings exactly as stored by the host, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSyncSettings {
    /// JSON object text mapping squad ids to role ids.
    pub role_squad_map: Option<String>,
    /// Inactive role id text.
    pub inactive_role_id: Option<String>,
    /// JSON array text of ignored role ids.
    pub ignore_role_ids: Option<String>,
}
