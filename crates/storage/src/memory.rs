// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory reference implementation of [`PersistenceStore`].
//!
//! A single `parking_lot::Mutex` guards the whole map, matching the core
//! contract's "the in-memory reference implementation serialises on a
//! single mutex" — `Save` is atomic with respect to a concurrent `Load` on
//! the same id because both take the same lock, held only for the
//! duration of the map operation, never across an `.await`.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use wf_core::{InstanceId, InstanceSummary, ListFilter, PersistenceStore, WorkflowError, WorkflowInstance};

use crate::cursor::InstanceCursor;

/// Holds every saved instance in a `HashMap` behind one mutex. Intended as
/// a drop-in store for tests and single-process deployments; the
/// [`InstanceCursor`] returned by [`InMemoryStore::cursor`] is how a caller
/// avoids materializing the whole population for a single `List` call.
#[derive(Default)]
pub struct InMemoryStore {
    instances: Mutex<HashMap<InstanceId, WorkflowInstance>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.instances.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.lock().is_empty()
    }

    /// A lazy, page-at-a-time view over the current population matching
    /// `filter`, for callers that want to avoid collecting the whole
    /// result set (the ~2.5x10^8-record target capacity the core interface
    /// must not preclude). Each page is a fresh snapshot taken under the
    /// lock only for the duration of the copy, never held across an
    /// `.await`.
    pub fn cursor(&self, filter: ListFilter, page_size: usize) -> InstanceCursor<'_> {
        InstanceCursor::new(self, filter, page_size)
    }

    pub(crate) fn summaries_after(&self, filter: &ListFilter, after_id: Option<&str>, page_size: usize) -> Vec<InstanceSummary> {
        let guard = self.instances.lock();
        let mut matching: Vec<InstanceSummary> = guard
            .values()
            .map(InstanceSummary::from)
            .filter(|s| filter.matches(s))
            .collect();
        drop(guard);
        matching.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        let start = match after_id {
            Some(after) => matching.partition_point(|s| s.id.as_str() <= after),
            None => 0,
        };
        matching.into_iter().skip(start).take(page_size).collect()
    }
}

impl From<&WorkflowInstance> for InstanceSummary {
    fn from(instance: &WorkflowInstance) -> Self {
        InstanceSummary {
            id: instance.id,
            status: instance.status,
            definition_id: instance.definition_id,
            updated_at_ms: instance.updated_at_ms,
        }
    }
}

#[async_trait]
impl PersistenceStore for InMemoryStore {
    async fn save(&self, instance: &WorkflowInstance) -> Result<(), WorkflowError> {
        tracing::debug!(instance_id = %instance.id, status = %instance.status, "persisted workflow instance");
        self.instances.lock().insert(instance.id, instance.clone());
        Ok(())
    }

    async fn load(&self, id: InstanceId) -> Result<Option<WorkflowInstance>, WorkflowError> {
        let found = self.instances.lock().get(&id).cloned();
        if found.is_none() {
            tracing::debug!(instance_id = %id, "load found no persisted instance");
        }
        Ok(found)
    }

    async fn delete(&self, id: InstanceId) -> Result<(), WorkflowError> {
        tracing::debug!(instance_id = %id, "deleted workflow instance");
        self.instances.lock().remove(&id);
        Ok(())
    }

    /// Eager full-population scan, sorted by id for determinism. Callers
    /// holding a very large population should prefer [`InMemoryStore::cursor`].
    async fn list(&self, filter: ListFilter) -> Result<Vec<InstanceSummary>, WorkflowError> {
        let guard = self.instances.lock();
        let mut matching: Vec<InstanceSummary> =
            guard.values().map(InstanceSummary::from).filter(|s| filter.matches(s)).collect();
        drop(guard);
        matching.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        Ok(matching)
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
