//! Typed synchronization settings.
//!
//! Settings are stored by the host as loosely typed text. They are parsed
//! here once per run and handed to the reconciliation as a value object.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::{Map, Value};
use squadsync_core::{AppError, AppResult};

use crate::{RoleDiff, RoleId, SquadId};

/// Squad to role mapping. Each squad grants at most one role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SquadRoleMapping(BTreeMap<SquadId, RoleId>);

impl SquadRoleMapping {
    /// Builds a mapping from entries. Later entries win on duplicate squads.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = (SquadId, RoleId)>) -> Self {
        Self(entries.into_iter().collect())
    }

    /// Parses the stored JSON object text, e.g. `{"10": 100, "11": "200"}`.
    ///
    /// Keys that spell the same squad differently (`"10"`, `"010"`, `"+10"`)
    /// are rejected rather than silently merged.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let value = serde_json::from_str::<Value>(raw).map_err(|error| {
            AppError::Configuration(format!("invalid squad-role mapping: {error}"))
        })?;

        let Value::Object(object) = value else {
            return Err(AppError::Configuration(
                "invalid squad-role mapping: expected a JSON object".to_owned(),
            ));
        };

        let mut entries = BTreeMap::new();
        for (squad_key, role_value) in &object {
            let squad_id = squad_key.parse::<SquadId>().map_err(|_| {
                AppError::Configuration(format!(
                    "invalid squad-role mapping key '{squad_key}': expected a positive squad id"
                ))
            })?;
            let role_id = RoleId::from_json(role_value).map_err(|_| {
                AppError::Configuration(format!(
                    "invalid squad-role mapping value '{role_value}' for squad '{squad_key}': expected a positive role id"
                ))
            })?;
            if entries.insert(squad_id, role_id).is_some() {
                return Err(AppError::Configuration(format!(
                    "invalid squad-role mapping: squad '{squad_id}' is mapped more than once"
                )));
            }
        }

        Ok(Self(entries))
    }

    /// Returns the role granted by a squad.
    #[must_use]
    pub fn role_for(&self, squad_id: SquadId) -> Option<RoleId> {
        self.0.get(&squad_id).copied()
    }

    /// Returns every squad referenced by the mapping.
    #[must_use]
    pub fn squad_ids(&self) -> BTreeSet<SquadId> {
        self.0.keys().copied().collect()
    }

    /// Returns every role referenced by the mapping.
    #[must_use]
    pub fn role_ids(&self) -> BTreeSet<RoleId> {
        self.0.values().copied().collect()
    }

    /// Returns the number of mapped squads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no squad is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serializes the mapping back into its stored JSON form.
    #[must_use]
    pub fn to_json(&self) -> String {
        let object = self
            .0
            .iter()
            .map(|(squad_id, role_id)| (squad_id.to_string(), Value::from(role_id.value())))
            .collect::<Map<String, Value>>();

        Value::Object(object).to_string()
    }
}

/// Parses the stored inactive role setting.
///
/// Blank text and `0` mean the setting is unset.
pub fn parse_inactive_role_id(raw: Option<&str>) -> AppResult<Option<RoleId>> {
    let Some(text) = raw.map(str::trim).filter(|text| !text.is_empty()) else {
        return Ok(None);
    };

    let text = text.trim_matches('"');
    if text == "0" {
        return Ok(None);
    }

    text.parse::<RoleId>().map(Some).map_err(|_| {
        AppError::Configuration(format!(
            "invalid inactive role id '{text}': expected a positive role id"
        ))
    })
}

/// Parses the stored ignore role setting.
///
/// Accepts a JSON array of ids or a single bare id.
pub fn parse_ignore_role_ids(raw: Option<&str>) -> AppResult<BTreeSet<RoleId>> {
    let Some(text) = raw.map(str::trim).filter(|text| !text.is_empty()) else {
        return Ok(BTreeSet::new());
    };

    // Plain text that is not JSON is read as a single id.
    let value = serde_json::from_str::<Value>(text)
        .unwrap_or_else(|_| Value::String(text.to_owned()));

    let parse_entry = |value: &Value| {
        RoleId::from_json(value).map_err(|_| {
            AppError::Configuration(format!(
                "invalid ignore role id '{value}': expected a positive role id"
            ))
        })
    };

    match value {
        Value::Null => Ok(BTreeSet::new()),
        Value::Array(values) => values.iter().map(parse_entry).collect(),
        single @ (Value::Number(_) | Value::String(_)) => {
            parse_entry(&single).map(|role_id| BTreeSet::from([role_id]))
        }
        other => Err(AppError::Configuration(format!(
            "invalid ignore role ids: expected a JSON array, got '{other}'"
        ))),
    }
}

/// Validated settings for one reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncSettings {
    mapping: SquadRoleMapping,
    inactive_role_id: Option<RoleId>,
    ignore_role_ids: BTreeSet<RoleId>,
}

impl SyncSettings {
    /// Creates settings from typed values. An empty mapping is rejected.
    pub fn new(
        mapping: SquadRoleMapping,
        inactive_role_id: Option<RoleId>,
        ignore_role_ids: BTreeSet<RoleId>,
    ) -> AppResult<Self> {
        if mapping.is_empty() {
            return Err(AppError::Configuration(
                "no squad-role mapping configured".to_owned(),
            ));
        }

        Ok(Self {
            mapping,
            inactive_role_id,
            ignore_role_ids,
        })
    }

    /// Parses the three stored settings values.
    pub fn from_raw(
        mapping: Option<&str>,
        inactive_role_id: Option<&str>,
        ignore_role_ids: Option<&str>,
    ) -> AppResult<Self> {
        let Some(mapping) = mapping.map(str::trim).filter(|text| !text.is_empty()) else {
            return Err(AppError::Configuration(
                "no squad-role mapping configured".to_owned(),
            ));
        };

        Self::new(
            SquadRoleMapping::parse(mapping)?,
            parse_inactive_role_id(inactive_role_id)?,
            parse_ignore_role_ids(ignore_role_ids)?,
        )
    }

    /// Returns the squad to role mapping.
    #[must_use]
    pub fn mapping(&self) -> &SquadRoleMapping {
        &self.mapping
    }

    /// Returns the role that marks inactive users, when configured.
    #[must_use]
    pub fn inactive_role_id(&self) -> Option<RoleId> {
        self.inactive_role_id
    }

    /// Returns roles that synchronization never touches.
    #[must_use]
    pub fn ignore_role_ids(&self) -> &BTreeSet<RoleId> {
        &self.ignore_role_ids
    }

    /// Returns true for the inactive role and every ignored role.
    #[must_use]
    pub fn is_sealed(&self, role_id: RoleId) -> bool {
        self.inactive_role_id == Some(role_id) || self.ignore_role_ids.contains(&role_id)
    }

    /// Returns the roles a member of `squad_ids` should hold.
    ///
    /// Unmapped squads contribute nothing and sealed roles are never targets.
    #[must_use]
    pub fn target_roles(&self, squad_ids: impl IntoIterator<Item = SquadId>) -> BTreeSet<RoleId> {
        squad_ids
            .into_iter()
            .filter_map(|squad_id| self.mapping.role_for(squad_id))
            .filter(|role_id| !self.is_sealed(*role_id))
            .collect()
    }

    /// Returns the subset of current assignments that synchronization compares.
    #[must_use]
    pub fn comparable_roles(
        &self,
        current_role_ids: impl IntoIterator<Item = RoleId>,
    ) -> BTreeSet<RoleId> {
        current_role_ids
            .into_iter()
            .filter(|role_id| !self.is_sealed(*role_id))
            .collect()
    }

    /// Computes the role changes for a user with the given memberships.
    #[must_use]
    pub fn plan(
        &self,
        squad_ids: impl IntoIterator<Item = SquadId>,
        current_role_ids: impl IntoIterator<Item = RoleId>,
    ) -> RoleDiff {
        let target = self.target_roles(squad_ids);
        let current = self.comparable_roles(current_role_ids);

        RoleDiff::between(&target, &current)
    }
}

#[cfg(test)]
mod tests;
