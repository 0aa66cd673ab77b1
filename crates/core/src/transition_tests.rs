// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::state::StateId;

#[test]
fn manual_kind_is_manual() {
    let t = Transition::new(TransitionKind::Manual, StateId::new(), StateId::new(), 0);
    assert!(t.kind.is_manual());
    assert!(!TransitionKind::Automatic.is_manual());
}

#[test]
fn builder_chain_sets_all_fields() {
    let cond = ConditionId::new();
    let t = Transition::new(TransitionKind::Conditional, StateId::new(), StateId::new(), 0)
        .with_condition(cond)
        .with_priority(5);
    assert_eq!(t.condition_id, Some(cond));
    assert_eq!(t.priority, 5);
}
