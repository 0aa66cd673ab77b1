// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A unit of side-effectful execution owned by a state.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

crate::define_id! {
    /// Unique identifier for a work item.
    pub struct WorkId("wk-");
}

/// Lifecycle status of a work item. Terminal once `Completed`, `Failed`, or
/// `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
    Compensating,
}

crate::simple_display! {
    WorkStatus {
        Pending => "pending",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
        Compensating => "compensating",
    }
}

impl WorkStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkStatus::Completed | WorkStatus::Failed | WorkStatus::Cancelled)
    }
}

/// Retry policy owned by the registry's call wrapper. Delays compound as
/// `delay_n = min(initial * multiplier^(n-1), max_delay)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    #[serde(with = "duration_ms")]
    pub initial_delay: Duration,
    #[serde(with = "duration_ms")]
    pub max_delay: Duration,
    pub multiplier: f64,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::from_millis(0),
            max_delay: Duration::from_millis(0),
            multiplier: 1.0,
            jitter: false,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration, max_delay: Duration, multiplier: f64) -> Self {
        Self { max_attempts, initial_delay, max_delay, multiplier, jitter: false }
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Un-jittered delay for the given 1-indexed attempt number.
    /// `attempt` of 1 yields `initial_delay`.
    pub fn base_delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::from_millis(0);
        }
        let exp = (attempt - 1) as i32;
        let scaled = self.initial_delay.as_secs_f64() * self.multiplier.powi(exp);
        let capped = scaled.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped.max(0.0))
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        (d.as_millis() as u64).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let ms = u64::deserialize(d)?;
        Ok(Duration::from_millis(ms))
    }
}

/// A unit of side-effectful execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Work {
    pub id: WorkId,
    /// Opaque tag dispatched against the work-executor registry, e.g. "shell".
    pub kind: String,
    #[serde(default)]
    pub priority: i32,
    /// Opaque executor-specific configuration, validated by the engine
    /// before execution rather than by this type.
    pub configuration: Value,
    #[serde(default)]
    pub input: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub retry_policy: RetryPolicy,
    /// Per-call timeout; `None` means no deadline beyond the instance token.
    #[serde(default, with = "duration_ms_opt")]
    pub timeout: Option<Duration>,
    pub status: WorkStatus,
    pub attempts: u32,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

mod duration_ms_opt {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        d.map(|d| d.as_millis() as u64).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let ms: Option<u64> = Option::deserialize(d)?;
        Ok(ms.map(Duration::from_millis))
    }
}

impl Work {
    pub fn new(kind: impl Into<String>, configuration: Value, epoch_ms: u64) -> Self {
        Self {
            id: WorkId::new(),
            kind: kind.into(),
            priority: 0,
            configuration,
            input: Value::Null,
            output: None,
            error: None,
            retry_policy: RetryPolicy::default(),
            timeout: None,
            status: WorkStatus::Pending,
            attempts: 0,
            created_at_ms: epoch_ms,
            updated_at_ms: epoch_ms,
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Extracts the required `executor_config` blob, if present.
    pub fn executor_config(&self) -> Option<&Value> {
        self.configuration.get("executor_config")
    }

    /// Returns a new `Work` with status/output/error/updated_at set; the
    /// receiver is left untouched.
    pub fn with_status(&self, status: WorkStatus, epoch_ms: u64) -> Self {
        let mut next = self.clone();
        next.status = status;
        next.updated_at_ms = epoch_ms;
        next
    }
}

#[cfg(test)]
#[path = "work_tests.rs"]
mod tests;
