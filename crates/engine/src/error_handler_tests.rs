// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use wf_core::test_support::trivial_two_state_definition;
use wf_core::{State, StateKind, Transition, TransitionKind};

#[test]
fn classify_wraps_as_executor_failure() {
    let handler = ErrorHandler::new();
    let err = handler.classify("plugin", "boom");
    assert_eq!(err.kind, ErrorKind::ExecutorFailure);
    assert!(err.retriable);
}

#[test]
fn should_retry_only_executor_failure_and_timeout() {
    let handler = ErrorHandler::new();
    assert!(handler.should_retry(&WorkflowError::executor_failure("x", "y")));
    assert!(handler.should_retry(&WorkflowError::timeout("x", "y")));
    assert!(!handler.should_retry(&WorkflowError::invalid_configuration("x", "y")));
    assert!(!handler.should_retry(&WorkflowError::executor_failure("x", "y").non_retriable()));
}

#[test]
fn preferred_error_transition_finds_error_state_edge() {
    let (mut def, s0, _s1) = {
        let (def, s0, s1) = trivial_two_state_definition();
        (def, s0, s1)
    };
    let error_state = State::new("err", StateKind::Error, 0);
    let to_error = Transition::new(TransitionKind::Automatic, s0, error_state.id, 0);
    def.state_machine = wf_core::StateMachine::new(
        def.state_machine.states().cloned().chain(std::iter::once(error_state.clone())).collect(),
        def.state_machine.transitions().cloned().chain(std::iter::once(to_error)).collect(),
    );
    def.final_state_ids.push(error_state.id);

    let handler = ErrorHandler::new();
    let current = def.state_machine.state(s0).unwrap();
    let candidates = handler.preferred_error_transition(current, &def.state_machine);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].target_state_id, error_state.id);
}
