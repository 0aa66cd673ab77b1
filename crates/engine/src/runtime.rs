// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Owns live instances in memory and drives their progression through a
//! state machine: the transition loop, pause/resume/cancel, and manual
//! transition signalling described by the runtime component.

use crate::condition_eval::ConditionEvaluator;
use crate::error_handler::ErrorHandler;
use crate::executor::ExecutionResult;
use crate::lifecycle::{LifecycleEvent, LifecycleManager, StuckStatePayload, TransitionPayload, WorkPayload};
use crate::registry::WorkExecutorRegistry;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;
use wf_core::{
    Clock, Condition, DefinitionId, HistoryEntry, InstanceId, InstanceStatus, PersistenceStore, State, StepOutcome,
    Transition, TransitionId, TransitionKind, WorkflowDefinition, WorkflowError, WorkflowInstance,
};

type InstanceCell = Arc<AsyncMutex<WorkflowInstance>>;

/// What one iteration of the transition loop accomplished.
enum StepResult {
    /// A transition was taken; the new state is not final, keep looping.
    Advanced,
    /// A manual transition is eligible; the instance is now paused awaiting
    /// `signal_transition`.
    Suspended,
    /// The instance reached a terminal status.
    Finished(InstanceStatus),
}

/// Result of committing one concrete transition (as opposed to evaluating
/// which one, if any, applies).
enum TransitionOutcome {
    Advanced,
    Finished(InstanceStatus),
}

/// Drives workflow instances through their definitions. Cheap to clone —
/// every field is an `Arc` or a small `Copy`/`Clone` handle, so the same
/// runtime can be shared across worker tasks.
pub struct Runtime<P: PersistenceStore, C: Clock> {
    store: Arc<P>,
    registry: WorkExecutorRegistry,
    conditions: ConditionEvaluator,
    lifecycle: LifecycleManager,
    error_handler: ErrorHandler,
    clock: C,
    definitions: Arc<RwLock<HashMap<DefinitionId, WorkflowDefinition>>>,
    instances: Arc<RwLock<HashMap<InstanceId, InstanceCell>>>,
    tokens: Arc<RwLock<HashMap<InstanceId, CancellationToken>>>,
}

impl<P: PersistenceStore, C: Clock> Clone for Runtime<P, C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            registry: self.registry.clone(),
            conditions: self.conditions.clone(),
            lifecycle: self.lifecycle.clone(),
            error_handler: self.error_handler,
            clock: self.clock.clone(),
            definitions: self.definitions.clone(),
            instances: self.instances.clone(),
            tokens: self.tokens.clone(),
        }
    }
}

impl<P: PersistenceStore, C: Clock> Runtime<P, C> {
    pub fn new(
        store: Arc<P>,
        registry: WorkExecutorRegistry,
        conditions: ConditionEvaluator,
        lifecycle: LifecycleManager,
        clock: C,
    ) -> Self {
        Self {
            store,
            registry,
            conditions,
            lifecycle,
            error_handler: ErrorHandler::new(),
            clock,
            definitions: Arc::new(RwLock::new(HashMap::new())),
            instances: Arc::new(RwLock::new(HashMap::new())),
            tokens: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn lifecycle(&self) -> &LifecycleManager {
        &self.lifecycle
    }

    pub fn error_handler(&self) -> ErrorHandler {
        self.error_handler
    }

    /// Validates `definition`, constructs an instance in status `created`,
    /// persists it, and returns its id.
    pub async fn start_workflow(
        &self,
        definition: WorkflowDefinition,
        initial_context: wf_core::Context,
    ) -> Result<InstanceId, WorkflowError> {
        definition.validate_for_instantiation()?;
        let epoch = self.clock.epoch_ms();
        let instance = WorkflowInstance::new(definition.id, definition.initial_state_id, initial_context, epoch);
        self.store.save(&instance).await?;

        self.definitions.write().insert(definition.id, definition);
        self.instances.write().insert(instance.id, Arc::new(AsyncMutex::new(instance.clone())));
        self.tokens.write().insert(instance.id, CancellationToken::new());

        self.lifecycle.publish(LifecycleEvent::InstanceCreated { instance_id: instance.id, timestamp_ms: epoch });
        Ok(instance.id)
    }

    pub async fn get_workflow_status(&self, instance_id: InstanceId) -> Result<InstanceStatus, WorkflowError> {
        let cell = self.instance_cell(instance_id)?;
        Ok(cell.lock().await.status)
    }

    /// Moves the instance through its state machine until it suspends on a
    /// manual transition, is paused, or reaches a terminal status.
    pub async fn execute_workflow(&self, instance_id: InstanceId) -> Result<InstanceStatus, WorkflowError> {
        let cell = self.instance_cell(instance_id)?;
        let token = self.token(instance_id)?;
        let mut instance = cell.lock().await;

        let definition = self
            .definitions
            .read()
            .get(&instance.definition_id)
            .cloned()
            .ok_or_else(|| WorkflowError::invalid_definition("runtime", "instance references an unknown definition"))?;

        if instance.status == InstanceStatus::Created {
            let epoch = self.clock.epoch_ms();
            *instance = instance.with_status(InstanceStatus::Running, epoch)?;
            self.store.save(&instance).await?;
            self.lifecycle.publish(LifecycleEvent::InstanceStarted { instance_id, timestamp_ms: epoch });
        }

        loop {
            if token.is_cancelled() {
                let epoch = self.clock.epoch_ms();
                *instance = instance.with_status(InstanceStatus::Cancelled, epoch)?;
                self.store.save(&instance).await?;
                self.lifecycle.publish(LifecycleEvent::InstanceCancelled { instance_id, timestamp_ms: epoch });
                return Ok(instance.status);
            }
            if instance.status == InstanceStatus::Paused || instance.status.is_terminal() {
                return Ok(instance.status);
            }

            match self.step_once(&mut instance, &definition, &token).await? {
                StepResult::Advanced => continue,
                StepResult::Suspended => return Ok(instance.status),
                StepResult::Finished(status) => return Ok(status),
            }
        }
    }

    pub async fn pause_workflow(&self, instance_id: InstanceId) -> Result<InstanceStatus, WorkflowError> {
        let cell = self.instance_cell(instance_id)?;
        let mut instance = cell.lock().await;
        if instance.status != InstanceStatus::Running {
            return Ok(instance.status);
        }
        let epoch = self.clock.epoch_ms();
        *instance = instance.with_status(InstanceStatus::Paused, epoch)?;
        self.store.save(&instance).await?;
        self.lifecycle.publish(LifecycleEvent::InstancePaused { instance_id, timestamp_ms: epoch });
        Ok(instance.status)
    }

    pub async fn resume_workflow(&self, instance_id: InstanceId) -> Result<InstanceStatus, WorkflowError> {
        let cell = self.instance_cell(instance_id)?;
        let mut instance = cell.lock().await;
        if instance.status != InstanceStatus::Paused {
            return Ok(instance.status);
        }
        let epoch = self.clock.epoch_ms();
        *instance = instance.with_status(InstanceStatus::Running, epoch)?;
        self.store.save(&instance).await?;
        self.lifecycle.publish(LifecycleEvent::InstanceResumed { instance_id, timestamp_ms: epoch });
        Ok(instance.status)
    }

    /// Cancels the instance's token (propagating into any in-flight
    /// executor call) and, if it is currently running or paused, marks it
    /// cancelled immediately.
    pub async fn cancel_workflow(&self, instance_id: InstanceId) -> Result<InstanceStatus, WorkflowError> {
        let token = self.token(instance_id)?;
        token.cancel();

        let cell = self.instance_cell(instance_id)?;
        let mut instance = cell.lock().await;
        if !matches!(instance.status, InstanceStatus::Running | InstanceStatus::Paused) {
            return Ok(instance.status);
        }
        let epoch = self.clock.epoch_ms();
        *instance = instance.with_status(InstanceStatus::Cancelled, epoch)?;
        self.store.save(&instance).await?;
        self.lifecycle.publish(LifecycleEvent::InstanceCancelled { instance_id, timestamp_ms: epoch });
        Ok(instance.status)
    }

    /// Resolves a suspended manual transition. The instance must be paused
    /// at the transition's source state; on success the runtime resumes the
    /// loop from the new state.
    pub async fn signal_transition(
        &self,
        instance_id: InstanceId,
        transition_id: TransitionId,
    ) -> Result<InstanceStatus, WorkflowError> {
        let cell = self.instance_cell(instance_id)?;
        {
            let mut instance = cell.lock().await;
            let definition = self
                .definitions
                .read()
                .get(&instance.definition_id)
                .cloned()
                .ok_or_else(|| WorkflowError::invalid_definition("runtime", "instance references an unknown definition"))?;

            if instance.status != InstanceStatus::Paused {
                return Err(WorkflowError::invalid_configuration(
                    "runtime",
                    format!("instance {instance_id} is not paused, cannot signal a transition"),
                ));
            }
            let transition = definition.state_machine.transition(transition_id).ok_or_else(|| {
                WorkflowError::invalid_configuration("runtime", format!("unknown transition {transition_id}"))
            })?;
            if transition.source_state_id != instance.current_state_id {
                return Err(WorkflowError::invalid_configuration(
                    "runtime",
                    format!("transition {transition_id} does not originate from the instance's current state"),
                ));
            }

            let epoch = self.clock.epoch_ms();
            *instance = instance.with_status(InstanceStatus::Running, epoch)?;
            self.apply_transition(&mut instance, &definition, transition);
            self.store.save(&instance).await?;
        }

        self.execute_workflow(instance_id).await
    }

    fn instance_cell(&self, instance_id: InstanceId) -> Result<InstanceCell, WorkflowError> {
        self.instances
            .read()
            .get(&instance_id)
            .cloned()
            .ok_or_else(|| WorkflowError::invalid_configuration("runtime", format!("unknown instance {instance_id}")))
    }

    fn token(&self, instance_id: InstanceId) -> Result<CancellationToken, WorkflowError> {
        self.tokens
            .read()
            .get(&instance_id)
            .cloned()
            .ok_or_else(|| WorkflowError::invalid_configuration("runtime", format!("unknown instance {instance_id}")))
    }

    async fn step_once(
        &self,
        instance: &mut WorkflowInstance,
        definition: &WorkflowDefinition,
        token: &CancellationToken,
    ) -> Result<StepResult, WorkflowError> {
        let current = definition.state_machine.state(instance.current_state_id).ok_or_else(|| {
            WorkflowError::invalid_definition(
                "runtime",
                format!("instance references unknown state {}", instance.current_state_id),
            )
        })?;

        self.execute_owned_work(instance, current, token).await?;

        if current.is_final() {
            return self.finish_at_current_state(instance, current).await;
        }

        let candidates = definition.state_machine.outgoing(instance.current_state_id);
        let now = self.clock.epoch_ms();
        let winner = self.find_winning_transition(&candidates, instance, definition, now)?;

        let Some(transition) = winner else {
            return self.mark_stuck(instance, current, &candidates).await;
        };

        if transition.kind.is_manual() {
            let epoch = self.clock.epoch_ms();
            *instance = instance.with_status(InstanceStatus::Paused, epoch)?;
            self.store.save(instance).await?;
            return Ok(StepResult::Suspended);
        }

        let outcome = self.apply_transition(instance, definition, transition);
        self.store.save(instance).await?;
        Ok(match outcome {
            TransitionOutcome::Advanced => StepResult::Advanced,
            TransitionOutcome::Finished(status) => StepResult::Finished(status),
        })
    }

    async fn execute_owned_work(
        &self,
        instance: &mut WorkflowInstance,
        state: &State,
        token: &CancellationToken,
    ) -> Result<(), WorkflowError> {
        for work in &state.work {
            if work.status.is_terminal() {
                continue;
            }
            let epoch = self.clock.epoch_ms();
            // The registry retries internally, so the first (and only
            // externally visible) invocation always starts as attempt 1;
            // the real count is only known once the registry call returns.
            self.lifecycle.publish(LifecycleEvent::WorkStarted {
                instance_id: instance.id,
                timestamp_ms: epoch,
                payload: WorkPayload { work_id: work.id, state_id: state.id, attempt: 1 },
            });

            let outcome = self.registry.execute(work, &instance.context, token.child_token()).await;
            let epoch = self.clock.epoch_ms();

            match outcome {
                Ok(result) => {
                    instance.retry_counters.insert(work.id.to_string(), result.attempts);
                    instance.context = self.record_output(&instance.context, work.id, &result, epoch);
                    self.lifecycle.publish(LifecycleEvent::WorkCompleted {
                        instance_id: instance.id,
                        timestamp_ms: epoch,
                        payload: WorkPayload { work_id: work.id, state_id: state.id, attempt: result.attempts },
                    });
                }
                Err(err) => {
                    instance.retry_counters.insert(work.id.to_string(), err.attempts);
                    self.lifecycle.publish(LifecycleEvent::WorkFailed {
                        instance_id: instance.id,
                        timestamp_ms: epoch,
                        payload: WorkPayload { work_id: work.id, state_id: state.id, attempt: err.attempts },
                        error: err.message.clone(),
                    });
                    if err.kind == wf_core::ErrorKind::Cancelled {
                        return Err(err);
                    }
                    // A failed work item does not itself fail the instance:
                    // the transition loop may still find a compensating or
                    // error-guarded transition. The failure is recorded in
                    // context so guards can observe it.
                    instance.context = instance.context.set(format!("work:{}:error", work.id), err.message.clone(), epoch);
                }
            }
        }
        Ok(())
    }

    fn record_output(
        &self,
        context: &wf_core::Context,
        work_id: wf_core::WorkId,
        result: &ExecutionResult,
        epoch_ms: u64,
    ) -> wf_core::Context {
        context.set(format!("work:{work_id}:output"), result.output.clone(), epoch_ms)
    }

    fn find_winning_transition<'a>(
        &self,
        candidates: &[&'a Transition],
        instance: &WorkflowInstance,
        definition: &'a WorkflowDefinition,
        now_epoch_ms: u64,
    ) -> Result<Option<&'a Transition>, WorkflowError> {
        for transition in candidates {
            let eligible = match transition.condition_id {
                Some(condition_id) => {
                    let condition: &Condition = definition.condition(condition_id).ok_or_else(|| {
                        WorkflowError::invalid_definition(
                            "runtime",
                            format!("transition {} references unknown condition {condition_id}", transition.id),
                        )
                    })?;
                    self.conditions.evaluate(condition, &instance.context, &definition.conditions, now_epoch_ms)?
                }
                None => matches!(transition.kind, TransitionKind::Automatic),
            };
            if eligible {
                return Ok(Some(transition));
            }
        }
        Ok(None)
    }

    /// Commits `transition`: publishes Before/AfterTransition, appends
    /// history, advances `current_state_id`, and settles a terminal status
    /// if the new state is final.
    fn apply_transition(
        &self,
        instance: &mut WorkflowInstance,
        definition: &WorkflowDefinition,
        transition: &Transition,
    ) -> TransitionOutcome {
        let epoch = self.clock.epoch_ms();
        self.lifecycle.publish(LifecycleEvent::BeforeTransition {
            instance_id: instance.id,
            timestamp_ms: epoch,
            payload: TransitionPayload {
                transition_id: transition.id,
                from_state: transition.source_state_id,
                to_state: transition.target_state_id,
            },
        });

        let entry = HistoryEntry {
            state_id: transition.target_state_id,
            transition_id: Some(transition.id),
            timestamp_ms: epoch,
            outcome: StepOutcome::Succeeded,
            compensating: transition.kind == TransitionKind::Compensating,
        };
        *instance = instance.with_step(entry, transition.target_state_id, epoch);

        self.lifecycle.publish(LifecycleEvent::AfterTransition {
            instance_id: instance.id,
            timestamp_ms: epoch,
            payload: TransitionPayload {
                transition_id: transition.id,
                from_state: transition.source_state_id,
                to_state: transition.target_state_id,
            },
        });

        let Some(new_state) = definition.state_machine.state(transition.target_state_id) else {
            return TransitionOutcome::Advanced;
        };
        if !new_state.is_final() {
            return TransitionOutcome::Advanced;
        }

        let final_status =
            if new_state.kind == wf_core::StateKind::Error { InstanceStatus::Failed } else { InstanceStatus::Completed };
        let epoch = self.clock.epoch_ms();
        if let Ok(next) = instance.with_status(final_status, epoch) {
            *instance = next;
        }
        match final_status {
            InstanceStatus::Completed => {
                self.lifecycle.publish(LifecycleEvent::InstanceCompleted { instance_id: instance.id, timestamp_ms: epoch })
            }
            InstanceStatus::Failed => self.lifecycle.publish(LifecycleEvent::InstanceFailed {
                instance_id: instance.id,
                timestamp_ms: epoch,
                reason: format!("reached error state {}", new_state.id),
            }),
            _ => {}
        }
        TransitionOutcome::Finished(instance.status)
    }

    /// The instance has arrived at (or started on) a final/error state with
    /// no transition having fired — this is the immediate-completion case,
    /// not a stuck one: a definition whose initial state is itself final
    /// must settle in one history entry rather than fall through to
    /// `mark_stuck`.
    async fn finish_at_current_state(
        &self,
        instance: &mut WorkflowInstance,
        current: &State,
    ) -> Result<StepResult, WorkflowError> {
        let epoch = self.clock.epoch_ms();
        let entry = HistoryEntry {
            state_id: current.id,
            transition_id: None,
            timestamp_ms: epoch,
            outcome: StepOutcome::Succeeded,
            compensating: false,
        };
        *instance = instance.with_step(entry, current.id, epoch);

        let final_status =
            if current.kind == wf_core::StateKind::Error { InstanceStatus::Failed } else { InstanceStatus::Completed };
        let epoch = self.clock.epoch_ms();
        if let Ok(next) = instance.with_status(final_status, epoch) {
            *instance = next;
        }
        self.store.save(instance).await?;
        match final_status {
            InstanceStatus::Completed => {
                self.lifecycle.publish(LifecycleEvent::InstanceCompleted { instance_id: instance.id, timestamp_ms: epoch })
            }
            InstanceStatus::Failed => self.lifecycle.publish(LifecycleEvent::InstanceFailed {
                instance_id: instance.id,
                timestamp_ms: epoch,
                reason: format!("reached error state {} with no intervening transition", current.id),
            }),
            _ => {}
        }
        Ok(StepResult::Finished(instance.status))
    }

    async fn mark_stuck(
        &self,
        instance: &mut WorkflowInstance,
        current: &State,
        evaluated: &[&Transition],
    ) -> Result<StepResult, WorkflowError> {
        let epoch = self.clock.epoch_ms();
        let evaluated_condition_ids = evaluated.iter().filter_map(|t| t.condition_id).collect();
        self.lifecycle.publish(LifecycleEvent::StuckState {
            instance_id: instance.id,
            timestamp_ms: epoch,
            payload: StuckStatePayload { state_id: current.id, evaluated_condition_ids },
        });
        *instance = instance.with_status(InstanceStatus::Failed, epoch)?;
        self.store.save(instance).await?;
        self.lifecycle.publish(LifecycleEvent::InstanceFailed {
            instance_id: instance.id,
            timestamp_ms: epoch,
            reason: format!("stuck: no eligible outgoing transition from state {}", current.id),
        });
        Ok(StepResult::Finished(InstanceStatus::Failed))
    }

    /// Cancels every active instance token. Draining in-flight workers and
    /// shutting down plugins is the composition root's responsibility (it
    /// owns the plugin loader, which this crate does not depend on).
    pub fn shutdown(&self) {
        for token in self.tokens.read().values() {
            token.cancel();
        }
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
