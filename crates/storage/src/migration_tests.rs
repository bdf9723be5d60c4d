// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

struct BumpDescription;

impl Migration for BumpDescription {
    fn source_version(&self) -> u32 {
        1
    }

    fn target_version(&self) -> u32 {
        2
    }

    fn migrate(&self, snapshot: &mut Value) -> Result<(), MigrationError> {
        if let Some(obj) = snapshot.as_object_mut() {
            obj.entry("migrated").or_insert(json!(true));
        }
        Ok(())
    }
}

#[test]
fn migrate_to_same_version_is_a_no_op() {
    let registry = MigrationRegistry::new();
    let snapshot = json!({"version": 1, "seq": 0});
    let out = registry.migrate_to(snapshot.clone(), 1).unwrap();
    assert_eq!(out, snapshot);
}

#[test]
fn migrate_to_newer_than_supported_errors() {
    let registry = MigrationRegistry::new();
    let snapshot = json!({"version": 5, "seq": 0});
    let err = registry.migrate_to(snapshot, 1).unwrap_err();
    assert!(matches!(err, MigrationError::TooNew(5, 1)));
}

#[test]
fn missing_migration_path_errors() {
    let registry = MigrationRegistry::new();
    let snapshot = json!({"version": 1, "seq": 0});
    let err = registry.migrate_to(snapshot, 2).unwrap_err();
    assert!(matches!(err, MigrationError::NoPath(1, 2)));
}

#[test]
fn registered_migration_runs_and_bumps_version() {
    let registry = MigrationRegistry {
        migrations: vec![Box::new(BumpDescription)],
    };
    let snapshot = json!({"version": 1, "seq": 3});
    let out = registry.migrate_to(snapshot, 2).unwrap();
    assert_eq!(out["version"], json!(2));
    assert_eq!(out["migrated"], json!(true));
}

#[test]
fn missing_version_field_defaults_to_one() {
    let registry = MigrationRegistry::new();
    let snapshot = json!({"seq": 0});
    let out = registry.migrate_to(snapshot, 1).unwrap();
    assert_eq!(out["seq"], json!(0));
}
