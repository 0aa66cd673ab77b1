// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A live traversal of a [`crate::definition::WorkflowDefinition`].

use crate::context::Context;
use crate::definition::DefinitionId;
use crate::state::StateId;
use crate::transition::TransitionId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

crate::define_id! {
    /// Unique identifier for a workflow instance.
    pub struct InstanceId("ins-");
}

/// Instance-status state machine:
///
/// ```text
/// created --start--> running --pause--> paused
///                       |                 |
///                       | resume <--------+
///                       |--cancel--> cancelled (terminal)
///                       |--fail----> failed    (terminal)
///                       +--done----> completed (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    Created,
    Running,
    Paused,
    Completed,
    Failed,
    Cancelled,
}

crate::simple_display! {
    InstanceStatus {
        Created => "created",
        Running => "running",
        Paused => "paused",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

impl InstanceStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, InstanceStatus::Completed | InstanceStatus::Failed | InstanceStatus::Cancelled)
    }

    /// Whether `self -> next` is a legal edge on the instance-status machine.
    pub fn can_transition_to(&self, next: InstanceStatus) -> bool {
        use InstanceStatus::*;
        matches!(
            (self, next),
            (Created, Running)
                | (Running, Paused)
                | (Paused, Running)
                | (Running, Cancelled)
                | (Paused, Cancelled)
                | (Running, Failed)
                | (Running, Completed)
        )
    }
}

/// Outcome recorded for a single traversed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    Succeeded,
    Suspended,
    Failed,
}

/// One entry in an instance's ordered history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub state_id: StateId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_id: Option<TransitionId>,
    pub timestamp_ms: u64,
    pub outcome: StepOutcome,
    /// True when this step was taken while following a compensation path;
    /// compensating steps are traversed like any other but flagged here so
    /// history readers can tell the two apart.
    #[serde(default)]
    pub compensating: bool,
}

/// A live traversal of a definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowInstance {
    pub id: InstanceId,
    pub definition_id: DefinitionId,
    pub current_state_id: StateId,
    pub context: Context,
    pub status: InstanceStatus,
    pub history: Vec<HistoryEntry>,
    /// Per-work retry attempt counters, keyed by work id as a string (kept
    /// string-keyed so the instance stays serializable without importing
    /// `wf_core::work::WorkId` as a map key type into every consumer).
    #[serde(default)]
    pub retry_counters: HashMap<String, u32>,
    /// Number of times each state has been entered, used by callers that
    /// want a circuit breaker over runaway cycles; the core does not
    /// enforce a limit itself.
    #[serde(default)]
    pub state_visits: HashMap<String, u32>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl WorkflowInstance {
    pub fn new(definition_id: DefinitionId, current_state_id: StateId, context: Context, epoch_ms: u64) -> Self {
        Self {
            id: InstanceId::new(),
            definition_id,
            current_state_id,
            context,
            status: InstanceStatus::Created,
            history: Vec::new(),
            retry_counters: HashMap::new(),
            state_visits: HashMap::new(),
            created_at_ms: epoch_ms,
            updated_at_ms: epoch_ms,
        }
    }

    /// Returns a new instance with `status` applied, if the transition is
    /// legal on the instance-status machine. Leaves the receiver untouched.
    pub fn with_status(&self, status: InstanceStatus, epoch_ms: u64) -> Result<Self, crate::error::WorkflowError> {
        if !self.status.can_transition_to(status) {
            return Err(crate::error::WorkflowError::invalid_definition(
                "instance",
                format!("illegal instance status transition {} -> {}", self.status, status),
            ));
        }
        let mut next = self.clone();
        next.status = status;
        next.updated_at_ms = epoch_ms;
        Ok(next)
    }

    /// Appends a history entry and advances `current_state_id`, returning a
    /// new instance.
    pub fn with_step(&self, entry: HistoryEntry, new_state_id: StateId, epoch_ms: u64) -> Self {
        let mut next = self.clone();
        *next.state_visits.entry(new_state_id.to_string()).or_insert(0) += 1;
        next.history.push(entry);
        next.current_state_id = new_state_id;
        next.updated_at_ms = epoch_ms;
        next
    }

    pub fn with_context(&self, context: Context, epoch_ms: u64) -> Self {
        let mut next = self.clone();
        next.context = context;
        next.updated_at_ms = epoch_ms;
        next
    }

    /// Invariant check: status consistent with history.
    pub fn status_consistent_with_history(&self) -> bool {
        match self.status {
            InstanceStatus::Completed | InstanceStatus::Failed => self
                .history
                .last()
                .map(|e| matches!(e.outcome, StepOutcome::Succeeded | StepOutcome::Failed))
                .unwrap_or(false),
            _ => true,
        }
    }
}

#[cfg(test)]
#[path = "instance_tests.rs"]
mod tests;
