// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn error_and_final_states_report_is_final() {
    let err = State::new("boom", StateKind::Error, 0);
    let fin = State::new("done", StateKind::Final, 0);
    let mid = State::new("working", StateKind::Intermediate, 0);
    assert!(err.is_final());
    assert!(fin.is_final());
    assert!(!mid.is_final());
}

#[test]
fn with_metadata_does_not_mutate_prior_clone() {
    let base = State::new("s0", StateKind::Initial, 0);
    let before = base.clone();
    let after = base.with_metadata("owner", "team-a");
    assert!(before.metadata.is_empty());
    assert_eq!(after.metadata.get("owner"), Some(&"team-a".to_string()));
}
