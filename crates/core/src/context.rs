// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Immutable, scoped key-value context carried across state transitions.
//!
//! Every mutating operation returns a new [`Context`]; the receiver is left
//! untouched. The data map is held behind an `Arc` so cloning a `Context` to
//! pass it across a concurrency boundary is cheap, while
//! each mutator still does a clone-and-mutate of the underlying map before
//! publishing a new `Arc` — readers that already hold a `Context` value never
//! observe another thread's in-flight write because there is nothing shared
//! to tear: the old `Arc<HashMap>` is immutable and the new one is a
//! distinct allocation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

crate::define_id! {
    /// Unique identifier for a context value.
    pub struct ContextId("ctx-");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextScope {
    Global,
    Workflow,
    State,
    Work,
}

crate::simple_display! {
    ContextScope {
        Global => "global",
        Workflow => "workflow",
        State => "state",
        Work => "work",
    }
}

/// A scoped, immutable key -> value bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub id: ContextId,
    pub scope: ContextScope,
    data: Arc<HashMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ContextId>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl Context {
    pub fn new(scope: ContextScope, epoch_ms: u64) -> Self {
        Self {
            id: ContextId::new(),
            scope,
            data: Arc::new(HashMap::new()),
            parent_id: None,
            created_at_ms: epoch_ms,
            updated_at_ms: epoch_ms,
        }
    }

    pub fn with_id(mut self, id: ContextId) -> Self {
        self.id = id;
        self
    }

    pub fn with_parent(mut self, parent_id: ContextId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw (untyped) lookup.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// String accessor. Absence and type mismatch are both reported as
    /// `present = false`.
    pub fn get_string(&self, key: &str) -> (String, bool) {
        match self.data.get(key).and_then(Value::as_str) {
            Some(s) => (s.to_string(), true),
            None => (String::new(), false),
        }
    }

    pub fn get_int(&self, key: &str) -> (i64, bool) {
        match self.data.get(key).and_then(Value::as_i64) {
            Some(v) => (v, true),
            None => (0, false),
        }
    }

    pub fn get_bool(&self, key: &str) -> (bool, bool) {
        match self.data.get(key).and_then(Value::as_bool) {
            Some(v) => (v, true),
            None => (false, false),
        }
    }

    pub fn get_float(&self, key: &str) -> (f64, bool) {
        match self.data.get(key).and_then(Value::as_f64) {
            Some(v) => (v, true),
            None => (0.0, false),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    /// Returns a new `Context` with `key` set to `value`.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>, epoch_ms: u64) -> Self {
        let mut data = (*self.data).clone();
        data.insert(key.into(), value.into());
        self.published(data, epoch_ms)
    }

    /// Returns a new `Context` with `key` removed.
    pub fn delete(&self, key: &str, epoch_ms: u64) -> Self {
        let mut data = (*self.data).clone();
        data.remove(key);
        self.published(data, epoch_ms)
    }

    /// Returns a new, empty `Context` (same id/scope/parent).
    pub fn clear(&self, epoch_ms: u64) -> Self {
        self.published(HashMap::new(), epoch_ms)
    }

    /// Merges `other` into `self`: keys in `other` overwrite keys in
    /// `self`; id and parentage come from `self` (the receiver).
    pub fn merge(&self, other: &Context, epoch_ms: u64) -> Self {
        let mut data = (*self.data).clone();
        for (k, v) in other.data.iter() {
            data.insert(k.clone(), v.clone());
        }
        self.published(data, epoch_ms)
    }

    /// Independent copy suitable for passing across a concurrency boundary.
    /// Since the data map is immutable once published, this is just a clone
    /// of the `Context` value (cheap `Arc` bump) — no deep copy is needed
    /// for correctness, but callers that want a guaranteed-independent
    /// allocation (e.g. before handing a context to untrusted plugin code)
    /// can force one via [`Context::deep_clone`].
    pub fn deep_clone(&self) -> Self {
        Self { data: Arc::new((*self.data).clone()), ..self.clone() }
    }

    fn published(&self, data: HashMap<String, Value>, epoch_ms: u64) -> Self {
        Self {
            id: self.id,
            scope: self.scope,
            data: Arc::new(data),
            parent_id: self.parent_id,
            created_at_ms: self.created_at_ms,
            updated_at_ms: epoch_ms,
        }
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
