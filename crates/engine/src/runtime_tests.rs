// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::executor::{ExecutionMetrics, ExecutionResult, ExecutorSchema, WorkExecutor};
use async_trait::async_trait;
use parking_lot::Mutex as SyncMutex;
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use wf_core::test_support::empty_context;
use wf_core::{
    test_support::{guarded_branch_definition, trivial_two_state_definition},
    Condition, ConditionKind, DefinitionStatus, ErrorKind, InstanceSummary, ListFilter, RetryPolicy, State, StateKind,
    Transition, TransitionKind, Work, WorkflowDefinition,
};

struct TestStore {
    instances: SyncMutex<HashMap<InstanceId, WorkflowInstance>>,
}

impl TestStore {
    fn new() -> Self {
        Self { instances: SyncMutex::new(HashMap::new()) }
    }
}

#[async_trait]
impl PersistenceStore for TestStore {
    async fn save(&self, instance: &WorkflowInstance) -> Result<(), WorkflowError> {
        self.instances.lock().insert(instance.id, instance.clone());
        Ok(())
    }

    async fn load(&self, id: InstanceId) -> Result<Option<WorkflowInstance>, WorkflowError> {
        Ok(self.instances.lock().get(&id).cloned())
    }

    async fn delete(&self, id: InstanceId) -> Result<(), WorkflowError> {
        self.instances.lock().remove(&id);
        Ok(())
    }

    async fn list(&self, filter: ListFilter) -> Result<Vec<InstanceSummary>, WorkflowError> {
        Ok(self
            .instances
            .lock()
            .values()
            .map(|i| InstanceSummary { id: i.id, status: i.status, definition_id: i.definition_id, updated_at_ms: i.updated_at_ms })
            .filter(|s| filter.matches(s))
            .collect())
    }
}

struct EchoExecutor;

#[async_trait]
impl WorkExecutor for EchoExecutor {
    fn kind(&self) -> &str {
        "echo"
    }

    fn schema(&self) -> ExecutorSchema {
        ExecutorSchema { schema: json!({"type": "object"}), examples: vec![] }
    }

    async fn execute(
        &self,
        work: &Work,
        _context: &wf_core::Context,
        _cancellation: CancellationToken,
    ) -> Result<ExecutionResult, WorkflowError> {
        Ok(ExecutionResult::success(work.input.clone(), ExecutionMetrics::default()))
    }
}

/// Fails the first `fail_times` calls with a retriable executor-failure,
/// then succeeds.
struct FlakyExecutor {
    fail_times: u32,
    calls: AtomicU32,
}

#[async_trait]
impl WorkExecutor for FlakyExecutor {
    fn kind(&self) -> &str {
        "flaky"
    }

    fn schema(&self) -> ExecutorSchema {
        ExecutorSchema { schema: json!({"type": "object"}), examples: vec![] }
    }

    async fn execute(
        &self,
        _work: &Work,
        _context: &wf_core::Context,
        _cancellation: CancellationToken,
    ) -> Result<ExecutionResult, WorkflowError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.fail_times {
            return Err(WorkflowError::executor_failure("flaky", "not yet"));
        }
        Ok(ExecutionResult::success(json!("done"), ExecutionMetrics::default()))
    }
}

/// Sleeps until cancelled, then reports cancellation.
struct SleepExecutor;

#[async_trait]
impl WorkExecutor for SleepExecutor {
    fn kind(&self) -> &str {
        "sleep"
    }

    fn schema(&self) -> ExecutorSchema {
        ExecutorSchema { schema: json!({"type": "object"}), examples: vec![] }
    }

    async fn execute(
        &self,
        _work: &Work,
        _context: &wf_core::Context,
        cancellation: CancellationToken,
    ) -> Result<ExecutionResult, WorkflowError> {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(30)) => {
                Ok(ExecutionResult::success(json!(null), ExecutionMetrics::default()))
            }
            _ = cancellation.cancelled() => {
                Err(WorkflowError::cancelled("sleep", "cancelled mid-sleep"))
            }
        }
    }

    fn can_execute(&self, kind: &str) -> bool {
        kind == "sleep"
    }
}

fn new_runtime() -> Runtime<TestStore, wf_core::FakeClock> {
    let store = Arc::new(TestStore::new());
    let registry = WorkExecutorRegistry::new();
    registry.register(Arc::new(EchoExecutor)).expect("register echo");
    registry.register(Arc::new(FlakyExecutor { fail_times: 2, calls: AtomicU32::new(0) })).expect("register flaky");
    registry.register(Arc::new(SleepExecutor)).expect("register sleep");
    Runtime::new(store, registry, ConditionEvaluator::new(), LifecycleManager::new(), wf_core::FakeClock::new())
}

fn work_for(kind: &str) -> Work {
    Work::new(kind, json!({"executor_config": {}}), 0)
}

#[tokio::test]
async fn trivial_two_state_runs_to_completion() {
    let runtime = new_runtime();
    let (definition, _s0, _s1) = trivial_two_state_definition();

    let instance_id = runtime.start_workflow(definition, empty_context()).await.expect("start");
    let status = runtime.execute_workflow(instance_id).await.expect("execute");

    assert_eq!(status, InstanceStatus::Completed);
}

#[tokio::test]
async fn guarded_branch_follows_matching_condition() {
    let runtime = new_runtime();
    let (definition, _s0, _s1, s2, _c1, _c2) = guarded_branch_definition();

    let ctx = empty_context().set("x", "2", 0);
    let instance_id = runtime.start_workflow(definition, ctx).await.expect("start");
    let status = runtime.execute_workflow(instance_id).await.expect("execute");

    assert_eq!(status, InstanceStatus::Completed);
    let cell = runtime.instance_cell(instance_id).expect("cell");
    assert_eq!(cell.lock().await.current_state_id, s2);
}

#[tokio::test]
async fn manual_transition_suspends_until_signalled() {
    let s0 = State::new("s0", StateKind::Initial, 0);
    let s1 = State::new("s1", StateKind::Final, 0);
    let manual = Transition::new(TransitionKind::Manual, s0.id, s1.id, 0);
    let manual_id = manual.id;
    let sm = wf_core::StateMachine::new(vec![s0.clone(), s1.clone()], vec![manual]);
    let definition =
        WorkflowDefinition::new("manual", sm, s0.id, vec![s1.id], 0).with_status(DefinitionStatus::Active, 0);

    let runtime = new_runtime();
    let instance_id = runtime.start_workflow(definition, empty_context()).await.expect("start");

    let status = runtime.execute_workflow(instance_id).await.expect("execute");
    assert_eq!(status, InstanceStatus::Paused);

    let status = runtime.signal_transition(instance_id, manual_id).await.expect("signal");
    assert_eq!(status, InstanceStatus::Completed);
}

#[tokio::test]
async fn signalling_an_unpaused_instance_is_rejected() {
    let (definition, _s0, _s1) = trivial_two_state_definition();
    let runtime = new_runtime();
    let instance_id = runtime.start_workflow(definition, empty_context()).await.expect("start");

    let bogus = wf_core::TransitionId::new();
    let err = runtime.signal_transition(instance_id, bogus).await.expect_err("not paused");
    assert_eq!(err.kind, ErrorKind::InvalidConfiguration);
}

#[tokio::test]
async fn work_is_retried_until_it_succeeds() {
    let retried_work = work_for("flaky").with_retry_policy(RetryPolicy::new(
        5,
        Duration::from_millis(1),
        Duration::from_millis(5),
        1.0,
    ));
    let s0 = State::new("s0", StateKind::Initial, 0).with_work(vec![retried_work]);
    let s1 = State::new("s1", StateKind::Final, 0);
    let t = Transition::new(TransitionKind::Automatic, s0.id, s1.id, 0);
    let sm = wf_core::StateMachine::new(vec![s0.clone(), s1.clone()], vec![t]);
    let definition = WorkflowDefinition::new("flaky-flow", sm, s0.id, vec![s1.id], 0)
        .with_status(DefinitionStatus::Active, 0);

    let store = Arc::new(TestStore::new());
    let registry = WorkExecutorRegistry::new();
    registry
        .register(Arc::new(FlakyExecutor { fail_times: 2, calls: AtomicU32::new(0) }))
        .expect("register flaky");
    let runtime = Runtime::new(store, registry, ConditionEvaluator::new(), LifecycleManager::new(), wf_core::FakeClock::new());

    let work_id = s0.work[0].id;

    let instance_id = runtime.start_workflow(definition, empty_context()).await.expect("start");
    let status = runtime.execute_workflow(instance_id).await.expect("execute");
    assert_eq!(status, InstanceStatus::Completed);

    let instance = runtime.store.load(instance_id).await.expect("load").expect("present");
    assert_eq!(
        instance.retry_counters.get(&work_id.to_string()),
        Some(&3),
        "retry counters should record the real attempt count (2 failures + 1 success), not a constant 1"
    );
}

#[tokio::test]
async fn stuck_state_with_no_eligible_transition_fails_the_instance() {
    let s0 = State::new("s0", StateKind::Initial, 0);
    let s1 = State::new("s1", StateKind::Final, 0);
    let never = Condition::new(ConditionKind::AlwaysFalse, 0);
    let never_id = never.id;
    let t = Transition::new(TransitionKind::Conditional, s0.id, s1.id, 0).with_condition(never_id);
    let sm = wf_core::StateMachine::new(vec![s0.clone(), s1.clone()], vec![t]);
    let definition = WorkflowDefinition::new("dead-end", sm, s0.id, vec![s1.id], 0)
        .with_conditions(vec![never])
        .with_status(DefinitionStatus::Active, 0);

    let runtime = new_runtime();
    let instance_id = runtime.start_workflow(definition, empty_context()).await.expect("start");
    let status = runtime.execute_workflow(instance_id).await.expect("execute");

    assert_eq!(status, InstanceStatus::Failed);
}

#[tokio::test]
async fn cancelling_mid_work_stops_the_instance() {
    let s0 = State::new("s0", StateKind::Initial, 0).with_work(vec![work_for("sleep")]);
    let s1 = State::new("s1", StateKind::Final, 0);
    let t = Transition::new(TransitionKind::Automatic, s0.id, s1.id, 0);
    let sm = wf_core::StateMachine::new(vec![s0.clone(), s1.clone()], vec![t]);
    let definition =
        WorkflowDefinition::new("cancel-me", sm, s0.id, vec![s1.id], 0).with_status(DefinitionStatus::Active, 0);

    let runtime = new_runtime();
    let instance_id = runtime.start_workflow(definition, empty_context()).await.expect("start");

    let handle = {
        let runtime = runtime.clone();
        tokio::spawn(async move { runtime.execute_workflow(instance_id).await })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    let cancel_status = runtime.cancel_workflow(instance_id).await.expect("cancel");
    assert_eq!(cancel_status, InstanceStatus::Cancelled);

    let _ = handle.await.expect("task joined");
    let final_status = runtime.get_workflow_status(instance_id).await.expect("status");
    assert_eq!(final_status, InstanceStatus::Cancelled);
}

#[tokio::test]
async fn pause_then_resume_lets_execution_continue() {
    let (definition, s0, _s1) = trivial_two_state_definition();
    let runtime = new_runtime();
    let instance_id = runtime.start_workflow(definition, empty_context()).await.expect("start");

    // Force the instance into Running before pausing (Created can't pause).
    {
        let cell = runtime.instance_cell(instance_id).expect("cell");
        let mut instance = cell.lock().await;
        *instance = instance.with_status(InstanceStatus::Running, 0).expect("created->running");
    }
    let paused = runtime.pause_workflow(instance_id).await.expect("pause");
    assert_eq!(paused, InstanceStatus::Paused);

    let resumed = runtime.resume_workflow(instance_id).await.expect("resume");
    assert_eq!(resumed, InstanceStatus::Running);

    let status = runtime.execute_workflow(instance_id).await.expect("execute");
    assert_eq!(status, InstanceStatus::Completed);
    let _ = s0;
}
