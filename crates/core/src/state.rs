// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A named halt point in a [`crate::state_machine::StateMachine`].

use crate::work::Work;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

crate::define_id! {
    /// Unique identifier for a state within a state machine.
    pub struct StateId("st-");
}

/// What role a state plays in the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    Initial,
    Intermediate,
    Final,
    Error,
    Compensating,
}

crate::simple_display! {
    StateKind {
        Initial => "initial",
        Intermediate => "intermediate",
        Final => "final",
        Error => "error",
        Compensating => "compensating",
    }
}

impl StateKind {
    pub fn is_final(&self) -> bool {
        matches!(self, StateKind::Final | StateKind::Error)
    }
}

/// Policy run when an instance enters or leaves a state.
///
/// Currently a placeholder tag set (the core ships no entry/exit side
/// effects of its own — those are expressed as [`crate::work::Work`] items
/// owned by the state); kept as a first-class field so a caller can attach
/// declarative hooks without changing the `State` shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatePolicy {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// A named halt point with a kind. Immutable once built; `with_*` methods
/// return a new value with an updated `updated_at` stamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub id: StateId,
    pub name: String,
    pub kind: StateKind,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub entry_policy: StatePolicy,
    #[serde(default)]
    pub exit_policy: StatePolicy,
    /// Work items owned by this state, executed in order on entry. May be
    /// empty — a state is not required to own any work.
    #[serde(default)]
    pub work: Vec<Work>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl State {
    pub fn new(name: impl Into<String>, kind: StateKind, epoch_ms: u64) -> Self {
        Self {
            id: StateId::new(),
            name: name.into(),
            kind,
            metadata: HashMap::new(),
            entry_policy: StatePolicy::default(),
            exit_policy: StatePolicy::default(),
            work: Vec::new(),
            created_at_ms: epoch_ms,
            updated_at_ms: epoch_ms,
        }
    }

    pub fn with_id(mut self, id: StateId) -> Self {
        self.id = id;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_work(mut self, work: Vec<Work>) -> Self {
        self.work = work;
        self
    }

    pub fn is_final(&self) -> bool {
        self.kind.is_final()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
