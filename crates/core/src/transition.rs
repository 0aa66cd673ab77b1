// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A directed edge between two states, guarded by an optional condition.

use crate::condition::ConditionId;
use crate::state::StateId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a transition.
    pub struct TransitionId("tr-");
}

/// What triggers a transition once its guard is satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// Fires as soon as its guard holds; guard defaults to constant true.
    Automatic,
    /// Guard holding only makes the transition eligible; the runtime
    /// suspends and waits for an external `SignalTransition` call.
    Manual,
    /// Guard is (implicitly) a deadline; evaluated like any other condition.
    Timed,
    /// Guard is an explicit [`crate::condition::Condition`].
    Conditional,
    /// Exists to roll back prior work on failure.
    Compensating,
}

crate::simple_display! {
    TransitionKind {
        Automatic => "automatic",
        Manual => "manual",
        Timed => "timed",
        Conditional => "conditional",
        Compensating => "compensating",
    }
}

impl TransitionKind {
    pub fn is_manual(&self) -> bool {
        matches!(self, TransitionKind::Manual)
    }
}

/// A directed edge with a guard and trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub id: TransitionId,
    pub kind: TransitionKind,
    pub source_state_id: StateId,
    pub target_state_id: StateId,
    /// Guard condition. `None` means "always eligible" — valid for
    /// `Automatic` transitions; every other kind must supply one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_id: Option<ConditionId>,
    /// Higher priority wins; ties are broken by lexicographic id order.
    #[serde(default)]
    pub priority: i32,
    pub created_at_ms: u64,
}

impl Transition {
    pub fn new(
        kind: TransitionKind,
        source_state_id: StateId,
        target_state_id: StateId,
        epoch_ms: u64,
    ) -> Self {
        Self {
            id: TransitionId::new(),
            kind,
            source_state_id,
            target_state_id,
            condition_id: None,
            priority: 0,
            created_at_ms: epoch_ms,
        }
    }

    pub fn with_id(mut self, id: TransitionId) -> Self {
        self.id = id;
        self
    }

    pub fn with_condition(mut self, condition_id: ConditionId) -> Self {
        self.condition_id = Some(condition_id);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

#[cfg(test)]
#[path = "transition_tests.rs"]
mod tests;
