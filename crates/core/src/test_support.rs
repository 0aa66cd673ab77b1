// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test builders shared across crates (gated behind `test-support`).
//!
//! Small factory functions other crates' tests pull in instead of
//! hand-rolling definitions inline.

use crate::condition::{Condition, ConditionId, ConditionKind};
use crate::context::{Context, ContextScope};
use crate::definition::{DefinitionStatus, WorkflowDefinition};
use crate::state::{State, StateId, StateKind};
use crate::state_machine::StateMachine;
use crate::transition::{Transition, TransitionKind};

/// `s0` (initial) --automatic--> `s1` (final).
pub fn trivial_two_state_definition() -> (WorkflowDefinition, StateId, StateId) {
    let s0 = State::new("s0", StateKind::Initial, 0);
    let s1 = State::new("s1", StateKind::Final, 0);
    let t = Transition::new(TransitionKind::Automatic, s0.id, s1.id, 0);
    let sm = StateMachine::new(vec![s0.clone(), s1.clone()], vec![t]);
    let def = WorkflowDefinition::new("trivial", sm, s0.id, vec![s1.id], 0)
        .with_status(DefinitionStatus::Active, 0);
    (def, s0.id, s1.id)
}

/// Guarded branch `s0 -> {s1, s2}` on `ctx["x"]`.
pub fn guarded_branch_definition() -> (WorkflowDefinition, StateId, StateId, StateId, ConditionId, ConditionId) {
    let s0 = State::new("s0", StateKind::Initial, 0);
    let s1 = State::new("s1", StateKind::Final, 0);
    let s2 = State::new("s2", StateKind::Final, 0);

    let cond_x1 = Condition::new(
        ConditionKind::KeyEqualsValue { key: "x".into(), value: "1".into() },
        0,
    );
    let cond_x2 = Condition::new(
        ConditionKind::KeyEqualsValue { key: "x".into(), value: "2".into() },
        0,
    );

    let t1 = Transition::new(TransitionKind::Conditional, s0.id, s1.id, 0).with_condition(cond_x1.id);
    let t2 = Transition::new(TransitionKind::Conditional, s0.id, s2.id, 0).with_condition(cond_x2.id);

    let cond_x1_id = cond_x1.id;
    let cond_x2_id = cond_x2.id;

    let sm = StateMachine::new(vec![s0.clone(), s1.clone(), s2.clone()], vec![t1, t2]);
    let def = WorkflowDefinition::new("guarded-branch", sm, s0.id, vec![s1.id, s2.id], 0)
        .with_conditions(vec![cond_x1, cond_x2])
        .with_status(DefinitionStatus::Active, 0);

    (def, s0.id, s1.id, s2.id, cond_x1_id, cond_x2_id)
}

/// An empty workflow-scoped context, for tests that don't care about data.
pub fn empty_context() -> Context {
    Context::new(ContextScope::Workflow, 0)
}
