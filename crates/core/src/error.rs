// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The error taxonomy shared by the state machine, registry, and runtime.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of error kinds surfaced to callers and to the error handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Structural failure before instantiation; fatal to the call.
    InvalidDefinition,
    /// Schema or parse failure on a work item; never retried.
    InvalidConfiguration,
    /// Token-driven abort.
    Cancelled,
    /// Per-call deadline exceeded.
    Timeout,
    /// Runtime error raised from an executor body.
    ExecutorFailure,
    /// Plugin initialization, shutdown, or health-check failure.
    PluginLifecycle,
    /// No eligible outgoing transition and the state is not final.
    Stuck,
    /// Storage could not save/load an instance.
    PersistenceFailure,
}

crate::simple_display! {
    ErrorKind {
        InvalidDefinition => "invalid-definition",
        InvalidConfiguration => "invalid-configuration",
        Cancelled => "cancelled",
        Timeout => "timeout",
        ExecutorFailure => "executor-failure",
        PluginLifecycle => "plugin-lifecycle",
        Stuck => "stuck",
        PersistenceFailure => "persistence-failure",
    }
}

impl ErrorKind {
    /// Whether the retry wrapper should re-attempt an operation that failed
    /// with this kind. Only `executor-failure` and `timeout` are retriable;
    /// every other kind short-circuits immediately.
    pub fn is_retriable_kind(&self) -> bool {
        matches!(self, ErrorKind::ExecutorFailure | ErrorKind::Timeout)
    }
}

/// A structured, classified error: kind, retriable flag, originating
/// component, and a human-readable message.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{source}: {message} ({kind})")]
pub struct WorkflowError {
    pub kind: ErrorKind,
    pub retriable: bool,
    /// Which component raised the error, e.g. "registry", "runtime", "plugin-loader".
    pub source: String,
    pub message: String,
    /// How many executor invocations preceded this error. `1` for errors
    /// raised outside the registry's retry loop; the registry overwrites
    /// this via [`WorkflowError::with_attempts`] once an attempt count is
    /// known.
    #[serde(default = "default_attempts")]
    pub attempts: u32,
}

fn default_attempts() -> u32 {
    1
}

impl WorkflowError {
    pub fn new(kind: ErrorKind, source: impl Into<String>, message: impl Into<String>) -> Self {
        let retriable = kind.is_retriable_kind();
        Self { kind, retriable, source: source.into(), message: message.into(), attempts: 1 }
    }

    pub fn invalid_definition(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidDefinition, source, message)
    }

    pub fn invalid_configuration(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidConfiguration, source, message)
    }

    pub fn cancelled(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, source, message)
    }

    pub fn timeout(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, source, message)
    }

    pub fn executor_failure(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExecutorFailure, source, message)
    }

    pub fn plugin_lifecycle(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PluginLifecycle, source, message)
    }

    pub fn stuck(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Stuck, source, message)
    }

    pub fn persistence_failure(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PersistenceFailure, source, message)
    }

    /// Mark an otherwise-retriable error as terminal. Used by executors that
    /// know a particular failure will never succeed on retry.
    pub fn non_retriable(mut self) -> Self {
        self.retriable = false;
        self
    }

    /// Records how many executor invocations preceded this error. Called by
    /// the registry's retry wrapper once the final attempt count is known.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
