use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;
use squadsync_core::AppError;

use super::{SquadRoleMapping, SyncSettings, parse_ignore_role_ids, parse_inactive_role_id};
use crate::{RoleChangeKind, RoleId, SquadId};

fn roles(values: &[i64]) -> BTreeSet<RoleId> {
    values.iter().copied().map(RoleId::new).collect()
}

fn squads(values: &[i64]) -> Vec<SquadId> {
    values.iter().copied().map(SquadId::new).collect()
}

fn example_settings() -> SyncSettings {
    match SyncSettings::from_raw(Some(r#"{"10": 100, "11": 200}"#), Some("999"), Some("[500]")) {
        Ok(settings) => settings,
        Err(error) => panic!("example settings should parse: {error}"),
    }
}

#[test]
fn mapping_accepts_numeric_string_values() {
    let mapping = SquadRoleMapping::parse(r#"{"10": "100", "11": 200}"#);

    let Ok(mapping) = mapping else {
        panic!("mapping should parse");
    };
    assert_eq!(mapping.role_for(SquadId::new(10)), Some(RoleId::new(100)));
    assert_eq!(mapping.role_for(SquadId::new(11)), Some(RoleId::new(200)));
    assert_eq!(mapping.role_for(SquadId::new(12)), None);
}

#[test]
fn mapping_rejects_non_object_json() {
    for raw in ["[1, 2]", "42", "\"text\"", "not json"] {
        let result = SquadRoleMapping::parse(raw);
        assert!(
            matches!(result, Err(AppError::Configuration(_))),
            "expected configuration error for {raw}"
        );
    }
}

#[test]
fn mapping_rejects_non_numeric_keys_and_values() {
    assert!(matches!(
        SquadRoleMapping::parse(r#"{"alpha": 100}"#),
        Err(AppError::Configuration(_))
    ));
    assert!(matches!(
        SquadRoleMapping::parse(r#"{"10": {"role": 100}}"#),
        Err(AppError::Configuration(_))
    ));
}

#[test]
fn mapping_rejects_keys_naming_the_same_squad() {
    for raw in [
        r#"{"+10": 300, " 10": 400}"#,
        r#"{"10": 100, "010": 200}"#,
        r#"{"010": 200, "10": 100}"#,
    ] {
        let result = SquadRoleMapping::parse(raw);

        let Err(AppError::Configuration(message)) = result else {
            panic!("expected configuration error for {raw}");
        };
        assert!(message.contains("squad '10' is mapped more than once"), "{message}");
    }
}

#[test]
fn mapping_keeps_distinct_squads_with_padded_keys() {
    let mapping = SquadRoleMapping::parse(r#"{"010": 100, "11": 200}"#);

    let Ok(mapping) = mapping else {
        panic!("mapping should parse");
    };
    assert_eq!(mapping.role_for(SquadId::new(10)), Some(RoleId::new(100)));
    assert_eq!(mapping.len(), 2);
}

#[test]
fn mapping_round_trips_through_stored_json() {
    let mapping = SquadRoleMapping::from_entries([
        (SquadId::new(11), RoleId::new(200)),
        (SquadId::new(10), RoleId::new(100)),
    ]);

    assert_eq!(mapping.to_json(), r#"{"10":100,"11":200}"#);
}

#[test]
fn missing_or_empty_mapping_is_a_configuration_error() {
    for raw in [None, Some(""), Some("   "), Some("{}")] {
        let result = SyncSettings::from_raw(raw, None, None);
        assert!(
            matches!(result, Err(AppError::Configuration(_))),
            "expected configuration error for {raw:?}"
        );
    }
}

#[test]
fn inactive_role_id_treats_blank_and_zero_as_unset() {
    assert_eq!(parse_inactive_role_id(None).ok(), Some(None));
    assert_eq!(parse_inactive_role_id(Some("  ")).ok(), Some(None));
    assert_eq!(parse_inactive_role_id(Some("0")).ok(), Some(None));
    assert_eq!(
        parse_inactive_role_id(Some("\"999\"")).ok(),
        Some(Some(RoleId::new(999)))
    );
    assert!(parse_inactive_role_id(Some("inactive")).is_err());
}

#[test]
fn ignore_role_ids_accept_arrays_and_single_ids() {
    assert_eq!(parse_ignore_role_ids(None).ok(), Some(BTreeSet::new()));
    assert_eq!(parse_ignore_role_ids(Some("[]")).ok(), Some(BTreeSet::new()));
    assert_eq!(
        parse_ignore_role_ids(Some(r#"[500, "501", 500]"#)).ok(),
        Some(roles(&[500, 501]))
    );
    assert_eq!(parse_ignore_role_ids(Some("500")).ok(), Some(roles(&[500])));
    assert!(parse_ignore_role_ids(Some(r#"{"500": true}"#)).is_err());
    assert!(parse_ignore_role_ids(Some("[\"x\"]")).is_err());
}

#[test]
fn member_of_two_squads_gains_missing_role() {
    let settings = example_settings();

    let diff = settings.plan(squads(&[10, 11]), roles(&[100, 999]));

    assert_eq!(
        diff.changes().collect::<Vec<_>>(),
        vec![(RoleChangeKind::Add, RoleId::new(200))]
    );
}

#[test]
fn member_of_one_squad_loses_unmapped_role_and_keeps_ignored_role() {
    let settings = example_settings();

    let diff = settings.plan(squads(&[10]), roles(&[100, 200, 500]));

    assert_eq!(
        diff.changes().collect::<Vec<_>>(),
        vec![(RoleChangeKind::Remove, RoleId::new(200))]
    );
}

#[test]
fn accidentally_mapped_inactive_role_is_never_a_target() {
    let settings = match SyncSettings::from_raw(Some(r#"{"10": 999}"#), Some("999"), None) {
        Ok(settings) => settings,
        Err(error) => panic!("settings should parse: {error}"),
    };

    assert!(settings.target_roles(squads(&[10])).is_empty());
    assert!(settings.plan(squads(&[10]), roles(&[])).is_empty());
    assert!(settings.plan(squads(&[]), roles(&[999])).is_empty());
}

proptest! {
    #[test]
    fn target_roles_follow_set_semantics(
        mapping in prop::collection::btree_map(1_i64..20, 1_i64..15, 1..10),
        memberships in prop::collection::vec(1_i64..25, 0..12),
        inactive in prop::option::of(1_i64..15),
        ignored in prop::collection::btree_set(1_i64..15, 0..4),
    ) {
        let settings = SyncSettings::new(
            SquadRoleMapping::from_entries(
                mapping.iter().map(|(squad, role)| (SquadId::new(*squad), RoleId::new(*role))),
            ),
            inactive.map(RoleId::new),
            ignored.iter().copied().map(RoleId::new).collect(),
        );
        let Ok(settings) = settings else {
            return Err(TestCaseError::fail("non-empty mapping must be accepted"));
        };

        let expected = memberships
            .iter()
            .filter_map(|squad| mapping.get(squad).copied())
            .filter(|role| Some(*role) != inactive && !ignored.contains(role))
            .map(RoleId::new)
            .collect::<BTreeSet<_>>();

        let forward = settings.target_roles(memberships.iter().copied().map(SquadId::new));
        let reversed = settings.target_roles(memberships.iter().rev().copied().map(SquadId::new));

        prop_assert_eq!(&forward, &expected);
        prop_assert_eq!(&reversed, &expected);
    }

    #[test]
    fn sealed_roles_never_appear_in_a_plan(
        mapping in prop::collection::btree_map(1_i64..20, 1_i64..15, 1..10),
        memberships in prop::collection::btree_set(1_i64..25, 0..12),
        current in prop::collection::btree_set(1_i64..15, 0..10),
        inactive in 1_i64..15,
        ignored in prop::collection::btree_set(1_i64..15, 0..4),
    ) {
        let entries: BTreeMap<SquadId, RoleId> = mapping
            .iter()
            .map(|(squad, role)| (SquadId::new(*squad), RoleId::new(*role)))
            .collect();
        let Ok(settings) = SyncSettings::new(
            SquadRoleMapping::from_entries(entries),
            Some(RoleId::new(inactive)),
            ignored.iter().copied().map(RoleId::new).collect(),
        ) else {
            return Err(TestCaseError::fail("non-empty mapping must be accepted"));
        };

        let diff = settings.plan(
            memberships.iter().copied().map(SquadId::new),
            current.iter().copied().map(RoleId::new),
        );

        for (_, role_id) in diff.changes() {
            prop_assert_ne!(role_id, RoleId::new(inactive));
            prop_assert!(!ignored.contains(&role_id.value()));
        }
    }
}
