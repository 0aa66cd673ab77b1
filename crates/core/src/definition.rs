// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compiled, versioned, published workflow blueprint.

use crate::condition::{Condition, ConditionId};
use crate::error::WorkflowError;
use crate::state::StateId;
use crate::state_machine::StateMachine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

crate::define_id! {
    /// Unique identifier for a workflow definition.
    pub struct DefinitionId("def-");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionStatus {
    Draft,
    Active,
    Deprecated,
    Archived,
}

crate::simple_display! {
    DefinitionStatus {
        Draft => "draft",
        Active => "active",
        Deprecated => "deprecated",
        Archived => "archived",
    }
}

/// Named, versioned, composed of a state machine, initial state, final
/// states, and global configuration. Published once; the runtime treats it
/// as read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub id: DefinitionId,
    pub name: String,
    pub version: u32,
    pub status: DefinitionStatus,
    pub state_machine: StateMachine,
    pub initial_state_id: StateId,
    pub final_state_ids: Vec<StateId>,
    /// Catalog of conditions referenced by `condition_id` from this
    /// definition's transitions. Kept alongside the state machine rather
    /// than inside `Transition` itself so conditions can be shared by
    /// multiple transitions and evaluated without threading a second
    /// lookup table through the runtime.
    #[serde(default)]
    pub conditions: HashMap<ConditionId, Condition>,
    #[serde(default)]
    pub global_config: Value,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl WorkflowDefinition {
    pub fn new(
        name: impl Into<String>,
        state_machine: StateMachine,
        initial_state_id: StateId,
        final_state_ids: Vec<StateId>,
        epoch_ms: u64,
    ) -> Self {
        Self {
            id: DefinitionId::new(),
            name: name.into(),
            version: 1,
            status: DefinitionStatus::Draft,
            state_machine,
            initial_state_id,
            final_state_ids,
            conditions: HashMap::new(),
            global_config: Value::Null,
            created_at_ms: epoch_ms,
            updated_at_ms: epoch_ms,
        }
    }

    pub fn with_conditions(mut self, conditions: Vec<Condition>) -> Self {
        self.conditions = conditions.into_iter().map(|c| (c.id, c)).collect();
        self
    }

    pub fn condition(&self, id: ConditionId) -> Option<&Condition> {
        self.conditions.get(&id)
    }

    pub fn with_status(mut self, status: DefinitionStatus, epoch_ms: u64) -> Self {
        self.status = status;
        self.updated_at_ms = epoch_ms;
        self
    }

    pub fn with_global_config(mut self, config: Value) -> Self {
        self.global_config = config;
        self
    }

    /// Full structural validation:
    /// - state machine is internally consistent (delegated);
    /// - exactly one initial state exists and matches `initial_state_id`;
    /// - `final_state_ids` is a non-empty subset of the defined states, and
    ///   every state tagged `Final`/`Error` is present in it;
    /// - `status == Active` is required before a runtime may instantiate it.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        self.state_machine.validate()?;

        let initials: Vec<_> =
            self.state_machine.states().filter(|s| s.kind == crate::state::StateKind::Initial).collect();
        if initials.len() != 1 {
            return Err(WorkflowError::invalid_definition(
                "definition",
                format!("expected exactly one initial state, found {}", initials.len()),
            ));
        }
        if initials[0].id != self.initial_state_id {
            return Err(WorkflowError::invalid_definition(
                "definition",
                "initial_state_id does not match the state tagged Initial",
            ));
        }

        if self.final_state_ids.is_empty() {
            return Err(WorkflowError::invalid_definition(
                "definition",
                "final_state_ids must be a non-empty subset of the defined states",
            ));
        }
        let final_set: HashSet<StateId> = self.final_state_ids.iter().copied().collect();
        for id in &self.final_state_ids {
            if self.state_machine.state(*id).is_none() {
                return Err(WorkflowError::invalid_definition(
                    "definition",
                    format!("final_state_ids references unknown state {id}"),
                ));
            }
        }
        for state in self.state_machine.states() {
            if state.is_final() && !final_set.contains(&state.id) {
                return Err(WorkflowError::invalid_definition(
                    "definition",
                    format!("state {} is final/error but missing from final_state_ids", state.id),
                ));
            }
        }

        Ok(())
    }

    /// Validate *and* require `status == Active`: a definition must be
    /// published before a runtime will instantiate it.
    pub fn validate_for_instantiation(&self) -> Result<(), WorkflowError> {
        self.validate()?;
        if self.status != DefinitionStatus::Active {
            return Err(WorkflowError::invalid_definition(
                "definition",
                format!("definition status is {}, expected active", self.status),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "definition_tests.rs"]
mod tests;
