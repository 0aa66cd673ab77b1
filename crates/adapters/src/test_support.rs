// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process reference executors and plugins shared across crates' tests
//! (gated behind `test-support`), so `wf-engine` and the workspace-level
//! `wf-specs` integration tests don't each hand-roll the same fakes.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wf_core::{Context, Work, WorkflowError};
use wf_engine::{ExecutionMetrics, ExecutionResult, ExecutorSchema, WorkExecutor};

use crate::plugin::{Plugin, PluginInfo};

/// Echoes the `executor_config.message` field back as output. The minimal
/// executor used wherever a test just needs *some* successful work.
pub struct EchoExecutor {
    kind: String,
}

impl EchoExecutor {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }
}

#[async_trait]
impl WorkExecutor for EchoExecutor {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn schema(&self) -> ExecutorSchema {
        ExecutorSchema { schema: json!({ "required": ["executor_config"] }), examples: vec![] }
    }

    async fn execute(
        &self,
        work: &Work,
        _context: &Context,
        _cancellation: CancellationToken,
    ) -> Result<ExecutionResult, WorkflowError> {
        let message = work.executor_config().and_then(|c| c.get("message")).cloned().unwrap_or(Value::Null);
        Ok(ExecutionResult::success(message, ExecutionMetrics::default()))
    }
}

/// Fails `failures_before_success` times, then succeeds. Grounds seed
/// scenario 3 ("Retry to success") and retry-exhaustion tests.
pub struct FlakyExecutor {
    kind: String,
    failures_before_success: u32,
    calls: AtomicU32,
}

impl FlakyExecutor {
    pub fn new(kind: impl Into<String>, failures_before_success: u32) -> Self {
        Self { kind: kind.into(), failures_before_success, calls: AtomicU32::new(0) }
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WorkExecutor for FlakyExecutor {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn schema(&self) -> ExecutorSchema {
        ExecutorSchema { schema: json!({ "required": ["executor_config"] }), examples: vec![] }
    }

    async fn execute(
        &self,
        _work: &Work,
        _context: &Context,
        _cancellation: CancellationToken,
    ) -> Result<ExecutionResult, WorkflowError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures_before_success {
            return Err(WorkflowError::executor_failure(self.kind.clone(), format!("attempt {call} failed")));
        }
        Ok(ExecutionResult::success(json!({ "attempt": call }), ExecutionMetrics::default()))
    }
}

/// Sleeps for `duration` while polling `cancellation`, returning `cancelled`
/// as soon as the token fires. Grounds seed scenario 5 ("Cancellation
/// mid-work").
pub struct SlowExecutor {
    kind: String,
    duration: Duration,
    cancelled: std::sync::atomic::AtomicBool,
}

impl SlowExecutor {
    pub fn new(kind: impl Into<String>, duration: Duration) -> Self {
        Self { kind: kind.into(), duration, cancelled: std::sync::atomic::AtomicBool::new(false) }
    }

    /// Whether a prior `execute` call observed cancellation before its sleep
    /// completed.
    pub fn observed_cancellation(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WorkExecutor for SlowExecutor {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn schema(&self) -> ExecutorSchema {
        ExecutorSchema { schema: json!({ "required": ["executor_config"] }), examples: vec![] }
    }

    async fn execute(
        &self,
        _work: &Work,
        _context: &Context,
        cancellation: CancellationToken,
    ) -> Result<ExecutionResult, WorkflowError> {
        tokio::select! {
            _ = tokio::time::sleep(self.duration) => {
                Ok(ExecutionResult::success(Value::Null, ExecutionMetrics::default()))
            }
            _ = cancellation.cancelled() => {
                self.cancelled.store(true, Ordering::SeqCst);
                Err(WorkflowError::cancelled(self.kind.clone(), "observed cancellation before completion"))
            }
        }
    }
}

/// A plugin wrapping [`EchoExecutor`] plus a no-op lifecycle, for exercising
/// [`crate::plugin::PluginLoader`] without a real external plugin binary.
pub struct NoopPlugin {
    inner: EchoExecutor,
    info: PluginInfo,
    fail_initialize: bool,
}

impl NoopPlugin {
    pub fn new(kind: impl Into<String>) -> Self {
        let kind = kind.into();
        Self {
            info: PluginInfo {
                name: kind.clone(),
                version: "0.1.0".into(),
                work_kinds: vec![kind.clone()],
                author: "test-support".into(),
                api_version: "1".into(),
            },
            inner: EchoExecutor::new(kind),
            fail_initialize: false,
        }
    }

    /// Returns a plugin whose `initialize` always fails, for exercising the
    /// `Loaded -> Error` transition.
    pub fn failing_to_initialize(kind: impl Into<String>) -> Self {
        Self { fail_initialize: true, ..Self::new(kind) }
    }
}

#[async_trait]
impl WorkExecutor for NoopPlugin {
    fn kind(&self) -> &str {
        self.inner.kind()
    }

    fn schema(&self) -> ExecutorSchema {
        self.inner.schema()
    }

    async fn execute(
        &self,
        work: &Work,
        context: &Context,
        cancellation: CancellationToken,
    ) -> Result<ExecutionResult, WorkflowError> {
        self.inner.execute(work, context, cancellation).await
    }
}

#[async_trait]
impl Plugin for NoopPlugin {
    async fn initialize(&self, _config: Value) -> Result<(), WorkflowError> {
        if self.fail_initialize {
            return Err(WorkflowError::plugin_lifecycle(self.kind().to_string(), "configured to fail initialization"));
        }
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), WorkflowError> {
        Ok(())
    }

    async fn health_check(&self) -> Result<(), WorkflowError> {
        Ok(())
    }

    fn plugin_info(&self) -> PluginInfo {
        self.info.clone()
    }
}
