// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps work kinds (opaque string tags) to exactly one executor, and wraps
//! every call in schema validation, retry/backoff, and a per-call timeout.

use crate::executor::{ExecutionResult, ExecutorSchema, WorkExecutor};
use parking_lot::RwLock;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wf_core::{Context, ErrorKind, Work, WorkflowError};

/// A thread-safe dispatch table of work kind -> executor. Registration is
/// rejected if the kind is already claimed; many lookups proceed in
/// parallel, registrations serialise on the write lock.
#[derive(Default, Clone)]
pub struct WorkExecutorRegistry {
    executors: Arc<RwLock<HashMap<String, Arc<dyn WorkExecutor>>>>,
}

impl WorkExecutorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, executor: Arc<dyn WorkExecutor>) -> Result<(), WorkflowError> {
        let kind = executor.kind().to_string();
        let mut executors = self.executors.write();
        if executors.contains_key(&kind) {
            return Err(WorkflowError::invalid_configuration(
                "registry",
                format!("work kind {kind:?} is already registered"),
            ));
        }
        executors.insert(kind, executor);
        Ok(())
    }

    pub fn unregister(&self, kind: &str) {
        self.executors.write().remove(kind);
    }

    pub fn can_execute(&self, kind: &str) -> bool {
        self.executors.read().contains_key(kind)
    }

    pub fn schema_for(&self, kind: &str) -> Option<ExecutorSchema> {
        self.executors.read().get(kind).map(|e| e.schema())
    }

    fn lookup(&self, kind: &str) -> Result<Arc<dyn WorkExecutor>, WorkflowError> {
        self.executors
            .read()
            .get(kind)
            .cloned()
            .ok_or_else(|| WorkflowError::invalid_configuration("registry", format!("no executor registered for kind {kind:?}")))
    }

    /// Runs `work` to completion: schema validation, then up to
    /// `work.retry_policy.max_attempts` attempts, each wrapped in the work's
    /// configured timeout (if any) and the caller's cancellation token.
    ///
    /// Schema-validation failures bypass retries entirely. Retries stop on
    /// success, on attempt exhaustion, on cancellation, or when the executor
    /// reports a non-retriable error.
    pub async fn execute(
        &self,
        work: &Work,
        context: &Context,
        cancellation: CancellationToken,
    ) -> Result<ExecutionResult, WorkflowError> {
        let executor = self.lookup(&work.kind)?;
        executor.validate(work)?;

        let max_attempts = work.retry_policy.max_attempts.max(1);
        let mut attempt = 0u32;
        let mut last_error = None;

        loop {
            attempt += 1;
            if cancellation.is_cancelled() {
                return Err(WorkflowError::cancelled("registry", "cancelled before executor invocation").with_attempts(attempt));
            }

            let call = executor.execute(work, context, cancellation.child_token());
            let outcome = match work.timeout {
                Some(timeout) => match tokio::time::timeout(timeout, call).await {
                    Ok(result) => result,
                    Err(_) => Err(WorkflowError::timeout("registry", format!("executor call exceeded {timeout:?}"))),
                },
                None => call.await,
            };

            match outcome {
                Ok(result) if result.success => return Ok(result.with_attempts(attempt)),
                Ok(result) => {
                    let message = result.error_message.clone().unwrap_or_else(|| "executor reported failure".into());
                    last_error = Some(WorkflowError::executor_failure("registry", message));
                }
                Err(err) => {
                    last_error = Some(err);
                }
            }

            let Some(err) = last_error.clone() else {
                return Err(WorkflowError::executor_failure("registry", "executor produced no result and no error")
                    .with_attempts(attempt));
            };
            if !err.retriable || err.kind == ErrorKind::Cancelled {
                return Err(err.with_attempts(attempt));
            }
            if attempt >= max_attempts {
                return Err(WorkflowError::executor_failure(
                    "registry",
                    format!("exhausted {attempt} attempt(s): {}", err.message),
                )
                .with_attempts(attempt));
            }

            let delay = jittered_delay(&work.retry_policy, attempt);
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancellation.cancelled() => {
                    return Err(WorkflowError::cancelled("registry", "cancelled during retry back-off").with_attempts(attempt));
                }
            }
        }
    }
}

/// Applies the retry policy's jitter flag to the un-jittered delay for
/// `attempt`. Jitter, when enabled, perturbs the delay by a uniform
/// symmetric factor in `[-10%, +10%]`.
fn jittered_delay(policy: &wf_core::RetryPolicy, attempt: u32) -> Duration {
    let base = policy.base_delay_for_attempt(attempt);
    if !policy.jitter {
        return base;
    }
    let factor = rand::thread_rng().gen_range(-0.10..=0.10);
    let jittered = base.as_secs_f64() * (1.0 + factor);
    Duration::from_secs_f64(jittered.max(0.0))
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
