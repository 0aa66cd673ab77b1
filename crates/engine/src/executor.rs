// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The executor contract: one operation per work kind, dispatched by the
//! registry. Built-in executors and plugin-adapted executors both implement
//! this trait, so the registry treats them uniformly.

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use wf_core::{Context, Work, WorkflowError};

/// Severity of a single log line captured during execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// One ordered log entry captured during an executor call.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LogEntry {
    pub timestamp_ms: u64,
    pub level: LogLevel,
    pub message: String,
    /// Which executor (or sub-component) produced the line.
    pub source: String,
}

/// Start/end/duration and resource counters for one executor call.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ExecutionMetrics {
    pub started_at_ms: u64,
    pub ended_at_ms: u64,
    pub duration_ms: u64,
    #[serde(default)]
    pub resource_counters: std::collections::HashMap<String, u64>,
}

/// Outcome of a single `Execute` call.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    #[serde(default)]
    pub output: Value,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
    pub metrics: ExecutionMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// How many executor invocations the registry needed before this result
    /// was produced. `1` until the registry's retry wrapper overwrites it
    /// via [`ExecutionResult::with_attempts`].
    #[serde(default = "default_attempts")]
    pub attempts: u32,
}

fn default_attempts() -> u32 {
    1
}

impl ExecutionResult {
    pub fn success(output: Value, metrics: ExecutionMetrics) -> Self {
        Self { success: true, output, logs: Vec::new(), metrics, error_message: None, attempts: 1 }
    }

    pub fn failure(message: impl Into<String>, metrics: ExecutionMetrics) -> Self {
        Self {
            success: false,
            output: Value::Null,
            logs: Vec::new(),
            metrics,
            error_message: Some(message.into()),
            attempts: 1,
        }
    }

    pub fn with_logs(mut self, logs: Vec<LogEntry>) -> Self {
        self.logs = logs;
        self
    }

    /// Records how many executor invocations the registry needed to produce
    /// this result. Called by the registry's retry wrapper once the final
    /// attempt count is known.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }
}

/// A configuration schema document plus example work definitions, returned
/// by `GetSchema` for self-description.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ExecutorSchema {
    pub schema: Value,
    #[serde(default)]
    pub examples: Vec<Value>,
}

/// The four-operation contract a work executor (built-in or plugin-adapted)
/// must implement.
#[async_trait]
pub trait WorkExecutor: Send + Sync {
    /// The work kind this executor claims, e.g. `"shell"`.
    fn kind(&self) -> &str;

    fn can_execute(&self, kind: &str) -> bool {
        kind == self.kind()
    }

    /// Static, cheap: confirms the work kind is supported and the
    /// configuration parses against [`WorkExecutor::schema`]. The schema
    /// describes `work.configuration` as a whole (it is the document that
    /// declares the `executor_config` key itself), not the value nested
    /// under that key.
    fn validate(&self, work: &Work) -> Result<(), WorkflowError> {
        if !self.can_execute(&work.kind) {
            return Err(WorkflowError::invalid_configuration(
                self.kind().to_string(),
                format!("executor does not support work kind {:?}", work.kind),
            ));
        }
        if work.executor_config().is_none() {
            return Err(WorkflowError::invalid_configuration(
                self.kind().to_string(),
                "missing required executor_config key",
            ));
        }
        crate::schema::validate_configuration(&self.schema().schema, &work.configuration, self.kind())
    }

    /// Returns the executor's configuration schema and self-description.
    fn schema(&self) -> ExecutorSchema;

    /// Executes `work` against `context`, honouring `cancellation` by
    /// aborting as soon as control returns to the caller.
    async fn execute(
        &self,
        work: &Work,
        context: &Context,
        cancellation: CancellationToken,
    ) -> Result<ExecutionResult, WorkflowError>;
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
