// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The plugin contract, the adapter that presents an initialized plugin as
//! a normal [`WorkExecutor`], and the loader that owns the plugin map.
//!
//! The loader is concurrency-safe the way the core specification demands:
//! lookups take a read lock, `register`/`initialize`/`shutdown` take the
//! write lock and hold it across the plugin's own async call — `tokio::sync::RwLock`
//! rather than `parking_lot` is deliberate here, since `parking_lot` guards
//! cannot be held across an `.await` point.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use wf_core::{Context, Work, WorkflowError};
use wf_engine::{ExecutionResult, ExecutorSchema, WorkExecutor};

/// Self-description a plugin returns from `GetPluginInfo`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub work_kinds: Vec<String>,
    pub author: String,
    pub api_version: String,
}

/// Lifecycle status of a registered plugin. Only `Initialized` plugins are
/// callable; `Error` is terminal until a caller re-initializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginStatus {
    Loaded,
    Initialized,
    Error,
}

/// An externally supplied executor plus a small lifecycle surface. Built-in
/// executors never implement this trait; only plugins do.
#[async_trait]
pub trait Plugin: WorkExecutor {
    async fn initialize(&self, config: Value) -> Result<(), WorkflowError>;
    async fn shutdown(&self) -> Result<(), WorkflowError>;
    async fn health_check(&self) -> Result<(), WorkflowError>;
    fn plugin_info(&self) -> PluginInfo;
}

/// Status and last-error, shared between a [`PluginLoader`] entry and any
/// [`PluginAdapter`] built from it, so the adapter's synchronous
/// `validate`/`schema` calls never need to round-trip through the loader's
/// async lock.
#[derive(Default)]
struct PluginState {
    status: parking_lot::RwLock<PluginStatus>,
    last_error: parking_lot::RwLock<Option<String>>,
}

impl Default for PluginStatus {
    fn default() -> Self {
        PluginStatus::Loaded
    }
}

struct PluginEntry {
    plugin: Arc<dyn Plugin>,
    state: Arc<PluginState>,
}

/// Presents an (initialized, or once-initialized-now-errored) plugin as a
/// normal [`WorkExecutor`] to a `wf_engine::WorkExecutorRegistry`. A call
/// made while the plugin is not `Initialized` fails with
/// `invalid-configuration`: once a plugin becomes unavailable, work routed
/// to it should fail the same way a misconfigured built-in executor would.
#[derive(Clone)]
pub struct PluginAdapter {
    plugin: Arc<dyn Plugin>,
    state: Arc<PluginState>,
}

impl PluginAdapter {
    fn require_initialized(&self) -> Result<(), WorkflowError> {
        if *self.state.status.read() == PluginStatus::Initialized {
            Ok(())
        } else {
            Err(WorkflowError::invalid_configuration(
                self.plugin.kind().to_string(),
                format!("plugin for work kind {:?} is not initialized", self.plugin.kind()),
            ))
        }
    }
}

#[async_trait]
impl WorkExecutor for PluginAdapter {
    fn kind(&self) -> &str {
        self.plugin.kind()
    }

    fn can_execute(&self, kind: &str) -> bool {
        self.plugin.can_execute(kind)
    }

    fn schema(&self) -> ExecutorSchema {
        self.plugin.schema()
    }

    fn validate(&self, work: &Work) -> Result<(), WorkflowError> {
        self.require_initialized()?;
        self.plugin.validate(work)
    }

    async fn execute(
        &self,
        work: &Work,
        context: &Context,
        cancellation: CancellationToken,
    ) -> Result<ExecutionResult, WorkflowError> {
        self.require_initialized()?;
        self.plugin.execute(work, context, cancellation).await
    }
}

/// Owns the plugin map: registration, initialization, lookup by work kind,
/// shutdown, and unregistration. See the module docs for why the map is
/// guarded by a `tokio::sync::RwLock` rather than `parking_lot`.
#[derive(Default, Clone)]
pub struct PluginLoader {
    plugins: Arc<RwLock<HashMap<String, PluginEntry>>>,
}

impl PluginLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `plugin` under `name` in status `Loaded`. Rejects a name
    /// that is already claimed.
    pub async fn register(&self, name: impl Into<String>, plugin: Arc<dyn Plugin>) -> Result<(), WorkflowError> {
        let name = name.into();
        let registration_id = Uuid::new_v4();
        let mut plugins = self.plugins.write().await;
        if plugins.contains_key(&name) {
            return Err(WorkflowError::invalid_configuration(
                "plugin-loader",
                format!("plugin {name:?} is already registered"),
            ));
        }
        tracing::info!(plugin = %name, %registration_id, "plugin registered");
        plugins.insert(name, PluginEntry { plugin, state: Arc::new(PluginState::default()) });
        Ok(())
    }

    /// Calls `Initialize` on the named plugin's configuration bag,
    /// transitioning it from `Loaded` to `Initialized`. On failure the
    /// plugin moves to `Error` and the cause is recorded; the loader's
    /// write lock is held for the whole call so a concurrent lookup never
    /// observes a half-initialized plugin.
    pub async fn initialize(&self, name: &str, config: Value) -> Result<(), WorkflowError> {
        let plugins = self.plugins.write().await;
        let entry = plugins
            .get(name)
            .ok_or_else(|| WorkflowError::plugin_lifecycle("plugin-loader", format!("unknown plugin {name:?}")))?;

        match entry.plugin.initialize(config).await {
            Ok(()) => {
                *entry.state.status.write() = PluginStatus::Initialized;
                *entry.state.last_error.write() = None;
                tracing::info!(plugin = %name, "plugin initialized");
                Ok(())
            }
            Err(err) => {
                *entry.state.status.write() = PluginStatus::Error;
                *entry.state.last_error.write() = Some(err.message.clone());
                tracing::warn!(plugin = %name, error = %err.message, "plugin initialization failed");
                Err(err)
            }
        }
    }

    /// Builds a [`PluginAdapter`] for the first registered plugin whose
    /// declared work kind matches, regardless of its current status — the
    /// adapter itself enforces "only initialized plugins are callable" on
    /// every call, so a transient lookup during re-initialization still
    /// fails safely rather than panicking on a stale handle.
    pub async fn get_plugin_for_work_kind(&self, kind: &str) -> Option<PluginAdapter> {
        let plugins = self.plugins.read().await;
        plugins
            .values()
            .find(|entry| entry.plugin.kind() == kind)
            .map(|entry| PluginAdapter { plugin: entry.plugin.clone(), state: entry.state.clone() })
    }

    pub async fn health_check(&self, name: &str) -> Result<(), WorkflowError> {
        let plugin = {
            let plugins = self.plugins.read().await;
            plugins
                .get(name)
                .ok_or_else(|| WorkflowError::plugin_lifecycle("plugin-loader", format!("unknown plugin {name:?}")))?
                .plugin
                .clone()
        };
        plugin.health_check().await
    }

    pub async fn plugin_info(&self, name: &str) -> Option<PluginInfo> {
        self.plugins.read().await.get(name).map(|e| e.plugin.plugin_info())
    }

    pub async fn status(&self, name: &str) -> Option<PluginStatus> {
        self.plugins.read().await.get(name).map(|e| *e.state.status.read())
    }

    /// Calls `Shutdown` if the plugin is currently initialized. Errors are
    /// logged but never block deregistration.
    pub async fn shutdown(&self, name: &str) -> Result<(), WorkflowError> {
        let plugins = self.plugins.write().await;
        let entry = plugins
            .get(name)
            .ok_or_else(|| WorkflowError::plugin_lifecycle("plugin-loader", format!("unknown plugin {name:?}")))?;
        if *entry.state.status.read() == PluginStatus::Initialized {
            if let Err(err) = entry.plugin.shutdown().await {
                tracing::warn!(plugin = %name, error = %err.message, "plugin shutdown failed");
            }
        }
        Ok(())
    }

    /// Shuts down (best-effort) and removes `name` from the map.
    pub async fn unregister(&self, name: &str) {
        let _ = self.shutdown(name).await;
        self.plugins.write().await.remove(name);
    }

    /// Shuts down every currently initialized plugin. Used by the
    /// composition root's shutdown sequence; errors are logged, never
    /// propagated, so one misbehaving plugin cannot stop the others from
    /// draining.
    pub async fn shutdown_all(&self) {
        let names: Vec<String> = self.plugins.read().await.keys().cloned().collect();
        for name in names {
            let _ = self.shutdown(&name).await;
        }
    }
}

#[cfg(test)]
#[path = "plugin_tests.rs"]
mod tests;
