// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A testable predicate, evaluated on demand against an instance's context.
//!
//! `Condition` is the atomic value object; dispatch (mapping a
//! [`ConditionKind`] to the code that evaluates it) lives in
//! `wf_engine::condition_eval` since it is a compositional-layer concern.

use serde::{Deserialize, Serialize};
use serde_json::Value;

crate::define_id! {
    /// Unique identifier for a condition.
    pub struct ConditionId("cd-");
}

/// The built-in condition kinds. `Custom` carries a caller-chosen tag that a
/// registered evaluator must recognize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConditionKind {
    AlwaysTrue,
    AlwaysFalse,
    /// True iff `context.get(key)` is present.
    KeyPresentInContext { key: String },
    /// True iff `context.get(key) == value` (string comparison).
    KeyEqualsValue { key: String, value: String },
    /// True iff the evaluation time falls within `[start_epoch_ms, end_epoch_ms)`.
    TimeWindow { start_epoch_ms: u64, end_epoch_ms: u64 },
    /// AND/OR/NOT over sub-condition ids.
    Composite { op: CompositeOp, operand_ids: Vec<ConditionId> },
    /// Dispatched to a registered custom evaluator by `tag`.
    Custom { tag: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeOp {
    And,
    Or,
    Not,
}

/// A testable predicate: an id, its kind, and an opaque parameter bag that
/// custom evaluators may use in addition to (or instead of) the kind's
/// typed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub id: ConditionId,
    pub kind: ConditionKind,
    #[serde(default)]
    pub parameters: Value,
    pub created_at_ms: u64,
}

impl Condition {
    pub fn new(kind: ConditionKind, epoch_ms: u64) -> Self {
        Self { id: ConditionId::new(), kind, parameters: Value::Null, created_at_ms: epoch_ms }
    }

    pub fn with_id(mut self, id: ConditionId) -> Self {
        self.id = id;
        self
    }

    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = parameters;
        self
    }
}

#[cfg(test)]
#[path = "condition_tests.rs"]
mod tests;
