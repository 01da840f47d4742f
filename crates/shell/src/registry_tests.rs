// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn add_and_get_round_trip() {
    let registry = ProcessRegistry::new();
    let id = registry.add("sleep 5", 4242);

    let session = registry.get(id).unwrap();
    assert_eq!(session.pid, 4242);
    assert_eq!(session.command, "sleep 5");
    assert!(session.exit_code.is_none());
    assert!(session.exited_at.is_none());
}

#[test]
fn output_accumulates() {
    let registry = ProcessRegistry::new();
    let id = registry.add("echo hi", 1);
    registry.append_output(id, "hi\n");
    registry.append_output(id, "bye\n");
    assert_eq!(registry.get(id).unwrap().output, "hi\nbye\n");
}

#[test]
fn mark_exited_records_code_and_time() {
    let registry = ProcessRegistry::new();
    let id = registry.add("true", 1);
    registry.mark_exited(id, Some(0));

    let session = registry.get(id).unwrap();
    assert_eq!(session.exit_code, Some(0));
    assert!(session.exited_at.is_some());
}

#[test]
fn unknown_id_mutations_are_noops() {
    let registry = ProcessRegistry::new();
    registry.mark_exited(Uuid::new_v4(), Some(1));
    registry.append_output(Uuid::new_v4(), "x");
    assert!(registry.is_empty());
}

#[test]
fn sweep_evicts_only_expired_sessions() {
    let registry = ProcessRegistry::new();
    let old = registry.add("old", 1);
    let fresh = registry.add("fresh", 2);
    registry.backdate(old, PROCESS_SESSION_TTL + Duration::from_secs(1));

    registry.sweep();

    assert!(registry.get(old).is_none());
    assert!(registry.get(fresh).is_some());
}

#[test]
fn list_is_oldest_first() {
    let registry = ProcessRegistry::new();
    let a = registry.add("a", 1);
    let b = registry.add("b", 2);
    registry.backdate(a, Duration::from_secs(60));

    let listed = registry.list();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, a);
    assert_eq!(listed[1].id, b);
}

#[test]
fn clear_empties_the_registry() {
    let registry = ProcessRegistry::new();
    registry.add("a", 1);
    registry.clear();
    assert!(registry.is_empty());
}
