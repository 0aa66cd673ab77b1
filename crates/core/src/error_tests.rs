// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    executor_failure = { ErrorKind::ExecutorFailure, true },
    timeout           = { ErrorKind::Timeout, true },
    invalid_definition = { ErrorKind::InvalidDefinition, false },
    invalid_configuration = { ErrorKind::InvalidConfiguration, false },
    cancelled         = { ErrorKind::Cancelled, false },
    plugin_lifecycle  = { ErrorKind::PluginLifecycle, false },
    stuck             = { ErrorKind::Stuck, false },
    persistence_failure = { ErrorKind::PersistenceFailure, false },
)]
fn kind_retriability_matches_the_closed_set_in_the_core_contract(kind: ErrorKind, retriable: bool) {
    assert_eq!(kind.is_retriable_kind(), retriable);
    assert_eq!(WorkflowError::new(kind, "source", "message").retriable, retriable);
}

#[yare::parameterized(
    invalid_definition = { ErrorKind::InvalidDefinition, "invalid-definition" },
    invalid_configuration = { ErrorKind::InvalidConfiguration, "invalid-configuration" },
    cancelled         = { ErrorKind::Cancelled, "cancelled" },
    timeout           = { ErrorKind::Timeout, "timeout" },
    executor_failure  = { ErrorKind::ExecutorFailure, "executor-failure" },
    plugin_lifecycle  = { ErrorKind::PluginLifecycle, "plugin-lifecycle" },
    stuck             = { ErrorKind::Stuck, "stuck" },
    persistence_failure = { ErrorKind::PersistenceFailure, "persistence-failure" },
)]
fn kind_display_matches_spec_vocabulary(kind: ErrorKind, rendered: &str) {
    assert_eq!(kind.to_string(), rendered);
}

#[test]
fn non_retriable_overrides_default_classification() {
    let err = WorkflowError::executor_failure("executor", "fatal").non_retriable();
    assert!(!err.retriable);
    assert_eq!(err.kind, ErrorKind::ExecutorFailure);
}

#[test]
fn new_errors_default_to_a_single_attempt() {
    assert_eq!(WorkflowError::executor_failure("executor", "boom").attempts, 1);
}

#[test]
fn with_attempts_records_the_final_attempt_count() {
    let err = WorkflowError::executor_failure("registry", "exhausted").with_attempts(3);
    assert_eq!(err.attempts, 3);
}
