// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fan-out dispatcher for named lifecycle events. Dispatch is synchronous
//! with respect to the runtime loop, so subscribers must be cheap; a
//! subscriber that wants to do slow work should queue it on its own task.

use std::sync::Arc;
use wf_core::{ConditionId, InstanceId, StateId, TransitionId, WorkId};

/// Payload carried by `BeforeTransition`/`AfterTransition`.
#[derive(Debug, Clone)]
pub struct TransitionPayload {
    pub transition_id: TransitionId,
    pub from_state: StateId,
    pub to_state: StateId,
}

/// Payload carried by `WorkStarted`/`WorkCompleted`/`WorkFailed`.
#[derive(Debug, Clone)]
pub struct WorkPayload {
    pub work_id: WorkId,
    pub state_id: StateId,
    #[allow(dead_code)]
    pub attempt: u32,
}

/// Payload carried by `StuckState`.
#[derive(Debug, Clone)]
pub struct StuckStatePayload {
    pub state_id: StateId,
    pub evaluated_condition_ids: Vec<ConditionId>,
}

/// One named lifecycle notification, always stamped with the instance it
/// concerns and the epoch time it was emitted.
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    InstanceCreated { instance_id: InstanceId, timestamp_ms: u64 },
    InstanceStarted { instance_id: InstanceId, timestamp_ms: u64 },
    BeforeTransition { instance_id: InstanceId, timestamp_ms: u64, payload: TransitionPayload },
    AfterTransition { instance_id: InstanceId, timestamp_ms: u64, payload: TransitionPayload },
    WorkStarted { instance_id: InstanceId, timestamp_ms: u64, payload: WorkPayload },
    WorkCompleted { instance_id: InstanceId, timestamp_ms: u64, payload: WorkPayload },
    WorkFailed { instance_id: InstanceId, timestamp_ms: u64, payload: WorkPayload, error: String },
    InstancePaused { instance_id: InstanceId, timestamp_ms: u64 },
    InstanceResumed { instance_id: InstanceId, timestamp_ms: u64 },
    InstanceCompleted { instance_id: InstanceId, timestamp_ms: u64 },
    InstanceFailed { instance_id: InstanceId, timestamp_ms: u64, reason: String },
    InstanceCancelled { instance_id: InstanceId, timestamp_ms: u64 },
    StuckState { instance_id: InstanceId, timestamp_ms: u64, payload: StuckStatePayload },
}

impl LifecycleEvent {
    pub fn instance_id(&self) -> InstanceId {
        match self {
            LifecycleEvent::InstanceCreated { instance_id, .. }
            | LifecycleEvent::InstanceStarted { instance_id, .. }
            | LifecycleEvent::BeforeTransition { instance_id, .. }
            | LifecycleEvent::AfterTransition { instance_id, .. }
            | LifecycleEvent::WorkStarted { instance_id, .. }
            | LifecycleEvent::WorkCompleted { instance_id, .. }
            | LifecycleEvent::WorkFailed { instance_id, .. }
            | LifecycleEvent::InstancePaused { instance_id, .. }
            | LifecycleEvent::InstanceResumed { instance_id, .. }
            | LifecycleEvent::InstanceCompleted { instance_id, .. }
            | LifecycleEvent::InstanceFailed { instance_id, .. }
            | LifecycleEvent::InstanceCancelled { instance_id, .. }
            | LifecycleEvent::StuckState { instance_id, .. } => *instance_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::InstanceCreated { .. } => "InstanceCreated",
            LifecycleEvent::InstanceStarted { .. } => "InstanceStarted",
            LifecycleEvent::BeforeTransition { .. } => "BeforeTransition",
            LifecycleEvent::AfterTransition { .. } => "AfterTransition",
            LifecycleEvent::WorkStarted { .. } => "WorkStarted",
            LifecycleEvent::WorkCompleted { .. } => "WorkCompleted",
            LifecycleEvent::WorkFailed { .. } => "WorkFailed",
            LifecycleEvent::InstancePaused { .. } => "InstancePaused",
            LifecycleEvent::InstanceResumed { .. } => "InstanceResumed",
            LifecycleEvent::InstanceCompleted { .. } => "InstanceCompleted",
            LifecycleEvent::InstanceFailed { .. } => "InstanceFailed",
            LifecycleEvent::InstanceCancelled { .. } => "InstanceCancelled",
            LifecycleEvent::StuckState { .. } => "StuckState",
        }
    }
}

/// A subscriber receives events synchronously on the runtime's calling
/// thread; it must not block. Subscribers that need to do slow work should
/// hand the event off to their own task/queue.
pub trait LifecycleSubscriber: Send + Sync {
    fn on_event(&self, event: &LifecycleEvent);
}

impl<F> LifecycleSubscriber for F
where
    F: Fn(&LifecycleEvent) + Send + Sync,
{
    fn on_event(&self, event: &LifecycleEvent) {
        self(event)
    }
}

/// Fan-out dispatcher: holds a list of subscribers and calls each in
/// registration order whenever `publish` is invoked.
#[derive(Default, Clone)]
pub struct LifecycleManager {
    subscribers: Arc<parking_lot::RwLock<Vec<Arc<dyn LifecycleSubscriber>>>>,
}

impl LifecycleManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, subscriber: Arc<dyn LifecycleSubscriber>) {
        self.subscribers.write().push(subscriber);
    }

    pub fn publish(&self, event: LifecycleEvent) {
        tracing::debug!(event = event.name(), instance_id = %event.instance_id(), "lifecycle event");
        for subscriber in self.subscribers.read().iter() {
            subscriber.on_event(&event);
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
