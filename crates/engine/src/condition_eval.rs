// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatch table mapping a [`ConditionKind`] to the code that evaluates it
//! against an instance's context.

use std::collections::HashMap;
use std::sync::Arc;
use wf_core::{Condition, ConditionId, CompositeOp, ConditionKind, Context, WorkflowError};

/// A registered custom evaluator. Receives the condition's parameter bag and
/// the live context; side-effect-free by contract.
pub trait CustomEvaluator: Send + Sync {
    fn evaluate(&self, condition: &Condition, context: &Context) -> Result<bool, WorkflowError>;
}

impl<F> CustomEvaluator for F
where
    F: Fn(&Condition, &Context) -> Result<bool, WorkflowError> + Send + Sync,
{
    fn evaluate(&self, condition: &Condition, context: &Context) -> Result<bool, WorkflowError> {
        self(condition, context)
    }
}

/// Evaluates built-in condition kinds and dispatches `Custom` conditions to
/// registered tag-keyed evaluators. Stateless aside from the registration
/// table; safe to share across instances.
#[derive(Default, Clone)]
pub struct ConditionEvaluator {
    custom: HashMap<String, Arc<dyn CustomEvaluator>>,
}

impl ConditionEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a custom evaluator under `tag`. A later registration with
    /// the same tag replaces the earlier one.
    pub fn register_custom(&mut self, tag: impl Into<String>, evaluator: Arc<dyn CustomEvaluator>) {
        self.custom.insert(tag.into(), evaluator);
    }

    /// Evaluates `condition` against `context`, resolving `Composite`
    /// operand ids through `catalog`. `now_epoch_ms` is the evaluation time,
    /// used only by `TimeWindow`.
    pub fn evaluate(
        &self,
        condition: &Condition,
        context: &Context,
        catalog: &HashMap<ConditionId, Condition>,
        now_epoch_ms: u64,
    ) -> Result<bool, WorkflowError> {
        match &condition.kind {
            ConditionKind::AlwaysTrue => Ok(true),
            ConditionKind::AlwaysFalse => Ok(false),
            ConditionKind::KeyPresentInContext { key } => Ok(context.contains_key(key)),
            ConditionKind::KeyEqualsValue { key, value } => {
                let (actual, present) = context.get_string(key);
                Ok(present && &actual == value)
            }
            ConditionKind::TimeWindow { start_epoch_ms, end_epoch_ms } => {
                Ok(now_epoch_ms >= *start_epoch_ms && now_epoch_ms < *end_epoch_ms)
            }
            ConditionKind::Composite { op, operand_ids } => {
                self.evaluate_composite(*op, operand_ids, context, catalog, now_epoch_ms)
            }
            ConditionKind::Custom { tag } => {
                let evaluator = self.custom.get(tag).ok_or_else(|| {
                    WorkflowError::invalid_configuration(
                        "condition-evaluator",
                        format!("no custom evaluator registered for tag {tag:?}"),
                    )
                })?;
                evaluator.evaluate(condition, context)
            }
        }
    }

    fn evaluate_composite(
        &self,
        op: CompositeOp,
        operand_ids: &[ConditionId],
        context: &Context,
        catalog: &HashMap<ConditionId, Condition>,
        now_epoch_ms: u64,
    ) -> Result<bool, WorkflowError> {
        let resolve = |id: &ConditionId| -> Result<&Condition, WorkflowError> {
            catalog.get(id).ok_or_else(|| {
                WorkflowError::invalid_configuration(
                    "condition-evaluator",
                    format!("composite condition references unknown operand {id}"),
                )
            })
        };

        match op {
            CompositeOp::Not => {
                let [id] = operand_ids else {
                    return Err(WorkflowError::invalid_configuration(
                        "condition-evaluator",
                        "NOT requires exactly one operand",
                    ));
                };
                let operand = resolve(id)?;
                Ok(!self.evaluate(operand, context, catalog, now_epoch_ms)?)
            }
            CompositeOp::And => {
                for id in operand_ids {
                    let operand = resolve(id)?;
                    if !self.evaluate(operand, context, catalog, now_epoch_ms)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            CompositeOp::Or => {
                for id in operand_ids {
                    let operand = resolve(id)?;
                    if self.evaluate(operand, context, catalog, now_epoch_ms)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
#[path = "condition_eval_tests.rs"]
mod tests;
