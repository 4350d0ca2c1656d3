//! Integer identifiers used by the host platform's user directory.
//!
//! Every identifier is a positive 64-bit integer. String and JSON inputs are
//! converted once at the settings boundary so the reconciliation never
//! compares ids of mixed representation.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use squadsync_core::{AppError, AppResult};

/// Identifier of a user record in the host directory.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Creates a user identifier from its raw value.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw integer value.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Identifier of a squad.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SquadId(i64);

impl SquadId {
    /// Creates a squad identifier from its raw value.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw integer value.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl Display for SquadId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for SquadId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        parse_positive_id(value, "squad id").map(Self)
    }
}

/// Identifier of an access-control role.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoleId(i64);

impl RoleId {
    /// Creates a role identifier from its raw value.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw integer value.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Converts a JSON number or numeric string into a role identifier.
    ///
    /// The administrative form stores ids either way, so both are accepted.
    pub fn from_json(value: &Value) -> AppResult<Self> {
        match value {
            Value::Number(number) => number
                .as_i64()
                .filter(|id| *id > 0)
                .map(Self)
                .ok_or_else(|| {
                    AppError::Configuration(format!(
                        "role id must be a positive integer, got '{number}'"
                    ))
                }),
            Value::String(text) => text.parse(),
            other => Err(AppError::Configuration(format!(
                "role id must be a number or numeric string, got '{other}'"
            ))),
        }
    }
}

impl Display for RoleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for RoleId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        parse_positive_id(value, "role id").map(Self)
    }
}

fn parse_positive_id(value: &str, label: &str) -> AppResult<i64> {
    let trimmed = value.trim();
    match trimmed.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        Ok(_) => Err(AppError::Configuration(format!(
            "{label} must be a positive integer, got '{trimmed}'"
        ))),
        Err(error) => Err(AppError::Configuration(format!(
            "invalid {label} '{trimmed}': {error}"
        ))),
    }
}
