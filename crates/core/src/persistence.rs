// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The narrow interface the runtime calls to persist and load instances.
//! Lives in this crate (rather than alongside an implementation) so both
//! the runtime and any storage backend can depend on the trait without a
//! circular crate dependency — the same reason [`crate::clock::Clock`]
//! lives here instead of next to `SystemClock`'s eventual callers.

use crate::definition::DefinitionId;
use crate::instance::{InstanceId, InstanceStatus, WorkflowInstance};
use crate::error::WorkflowError;
use async_trait::async_trait;

/// A lightweight projection of an instance, cheap to produce in bulk for
/// `List` without materializing every instance's context and history.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InstanceSummary {
    pub id: InstanceId,
    pub status: InstanceStatus,
    pub definition_id: DefinitionId,
    pub updated_at_ms: u64,
}

/// Filter applied by `List`. `None` in either field means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub status: Option<InstanceStatus>,
    pub definition_id: Option<DefinitionId>,
}

impl ListFilter {
    pub fn matches(&self, summary: &InstanceSummary) -> bool {
        self.status.map(|s| s == summary.status).unwrap_or(true)
            && self.definition_id.map(|d| d == summary.definition_id).unwrap_or(true)
    }
}

/// Upsert-by-id persistence for workflow instances. Implementations must
/// make `Save` atomic with respect to a concurrent `Load` on the same id.
/// `List` returns a lazy, finite stream so a store holding a very large
/// population is never forced to materialize it all in memory.
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    async fn save(&self, instance: &WorkflowInstance) -> Result<(), WorkflowError>;

    async fn load(&self, id: InstanceId) -> Result<Option<WorkflowInstance>, WorkflowError>;

    async fn delete(&self, id: InstanceId) -> Result<(), WorkflowError>;

    /// Returns summaries matching `filter`. Implementations that hold a huge
    /// population should stream rather than collect eagerly; this trait
    /// does not mandate a particular batching strategy.
    async fn list(&self, filter: ListFilter) -> Result<Vec<InstanceSummary>, WorkflowError>;
}

#[cfg(test)]
#[path = "persistence_tests.rs"]
mod tests;
