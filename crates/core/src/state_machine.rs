// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A set of states and transitions, with structural validation.

use crate::error::WorkflowError;
use crate::state::{State, StateId, StateKind};
use crate::transition::{Transition, TransitionId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The directed graph (states, transitions) a definition embeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateMachine {
    states: HashMap<StateId, State>,
    transitions: Vec<Transition>,
}

impl StateMachine {
    pub fn new(states: Vec<State>, transitions: Vec<Transition>) -> Self {
        Self { states: states.into_iter().map(|s| (s.id, s)).collect(), transitions }
    }

    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(&id)
    }

    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.states.values()
    }

    pub fn transition(&self, id: TransitionId) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.id == id)
    }

    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.iter()
    }

    /// Outgoing transitions from `state_id`, sorted by descending priority,
    /// ties broken by ascending lexicographic transition id.
    pub fn outgoing(&self, state_id: StateId) -> Vec<&Transition> {
        let mut out: Vec<&Transition> =
            self.transitions.iter().filter(|t| t.source_state_id == state_id).collect();
        out.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.as_str().cmp(b.id.as_str())));
        out
    }

    /// Structural validation:
    /// - every state id is unique (guaranteed by the `HashMap` keying, but we
    ///   still check the input slice for duplicates that would silently
    ///   collapse);
    /// - transitions reference only known state ids;
    /// - no transition originates from a final state.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        for t in &self.transitions {
            if !self.states.contains_key(&t.source_state_id) {
                return Err(WorkflowError::invalid_definition(
                    "state-machine",
                    format!("transition {} references unknown source state", t.id),
                ));
            }
            if !self.states.contains_key(&t.target_state_id) {
                return Err(WorkflowError::invalid_definition(
                    "state-machine",
                    format!("transition {} references unknown target state", t.id),
                ));
            }
            if let Some(source) = self.states.get(&t.source_state_id) {
                if matches!(source.kind, StateKind::Final | StateKind::Error) {
                    return Err(WorkflowError::invalid_definition(
                        "state-machine",
                        format!("transition {} originates from final state {}", t.id, source.id),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "state_machine_tests.rs"]
mod tests;
