// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Classifies raw executor/framework errors into the structured
//! [`WorkflowError`] taxonomy, and decides whether the runtime should
//! prefer a defined error transition over failing the instance outright.

use wf_core::{ErrorKind, State, WorkflowError};

/// Consulted by the retry wrapper (via [`WorkflowError::retriable`] directly)
/// and by the runtime when a step fails.
#[derive(Default, Clone, Copy)]
pub struct ErrorHandler;

impl ErrorHandler {
    pub fn new() -> Self {
        Self
    }

    /// Wraps an arbitrary error surfaced by an executor body that did not
    /// already produce a [`WorkflowError`] (e.g. a panic caught at the
    /// boundary, or a foreign error type from a plugin).
    pub fn classify(&self, source: &str, message: impl Into<String>) -> WorkflowError {
        WorkflowError::executor_failure(source, message)
    }

    /// Whether the runtime should re-attempt the failed operation, per the
    /// propagation policy: only `executor-failure` and `timeout` are
    /// retried, and only while the error's own `retriable` flag agrees.
    pub fn should_retry(&self, error: &WorkflowError) -> bool {
        error.retriable && matches!(error.kind, ErrorKind::ExecutorFailure | ErrorKind::Timeout)
    }

    /// Given the state a failing step was in, finds an outgoing transition
    /// from `current` whose guard can be checked without context (i.e. an
    /// automatic or already-satisfied conditional transition into an error
    /// or compensating state) — the runtime prefers that path over raising
    /// the error to the instance status. Returns `None` when no such
    /// transition exists, in which case the caller should fail the
    /// instance.
    pub fn preferred_error_transition<'a>(
        &self,
        current: &'a State,
        state_machine: &'a wf_core::StateMachine,
    ) -> Vec<&'a wf_core::Transition> {
        state_machine
            .outgoing(current.id)
            .into_iter()
            .filter(|t| {
                let target = state_machine.state(t.target_state_id);
                target.map(|s| matches!(s.kind, wf_core::StateKind::Error | wf_core::StateKind::Compensating)).unwrap_or(false)
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "error_handler_tests.rs"]
mod tests;
