use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::RoleId;

/// Direction of a single role membership change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleChangeKind {
    /// The role is attached to the user.
    Add,
    /// The role is detached from the user.
    Remove,
}

impl RoleChangeKind {
    /// Returns a stable label for this change kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
        }
    }
}

/// Set difference between the roles a user should hold and the roles they hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleDiff {
    /// Roles present in the target set but not currently assigned.
    pub to_add: BTreeSet<RoleId>,
    /// Roles currently assigned but absent from the target set.
    pub to_remove: BTreeSet<RoleId>,
}

impl RoleDiff {
    /// Computes `target - current` and `current - target`.
    #[must_use]
    pub fn between(target: &BTreeSet<RoleId>, current: &BTreeSet<RoleId>) -> Self {
        Self {
            to_add: target.difference(current).copied().collect(),
            to_remove: current.difference(target).copied().collect(),
        }
    }

    /// Returns true when no change is required.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Returns the number of planned changes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.to_add.len() + self.to_remove.len()
    }

    /// Iterates additions in ascending role order, then removals in ascending role order.
    pub fn changes(&self) -> impl Iterator<Item = (RoleChangeKind, RoleId)> + '_ {
        self.to_add
            .iter()
            .map(|role_id| (RoleChangeKind::Add, *role_id))
            .chain(
                self.to_remove
                    .iter()
                    .map(|role_id| (RoleChangeKind::Remove, *role_id)),
            )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{RoleChangeKind, RoleDiff};
    use crate::RoleId;

    fn roles(values: &[i64]) -> BTreeSet<RoleId> {
        values.iter().copied().map(RoleId::new).collect()
    }

    #[test]
    fn diff_lists_adds_before_removes() {
        let diff = RoleDiff::between(&roles(&[3, 1]), &roles(&[1, 2]));

        let changes = diff.changes().collect::<Vec<_>>();
        assert_eq!(
            changes,
            vec![
                (RoleChangeKind::Add, RoleId::new(3)),
                (RoleChangeKind::Remove, RoleId::new(2)),
            ]
        );
        assert_eq!(diff.len(), 2);
    }

    #[test]
    fn identical_sets_produce_empty_diff() {
        let diff = RoleDiff::between(&roles(&[1, 2]), &roles(&[2, 1]));
        assert!(diff.is_empty());
    }
}
