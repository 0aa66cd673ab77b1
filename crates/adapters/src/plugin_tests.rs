// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::NoopPlugin;
use serde_json::json;
use wf_core::test_support::empty_context;

#[tokio::test]
async fn register_rejects_duplicate_names() {
    let loader = PluginLoader::new();
    loader.register("calc", Arc::new(NoopPlugin::new("calc"))).await.unwrap();
    let err = loader.register("calc", Arc::new(NoopPlugin::new("calc"))).await.unwrap_err();
    assert_eq!(err.kind, wf_core::ErrorKind::InvalidConfiguration);
}

#[tokio::test]
async fn newly_registered_plugin_is_loaded_not_initialized() {
    let loader = PluginLoader::new();
    loader.register("calc", Arc::new(NoopPlugin::new("calc"))).await.unwrap();
    assert_eq!(loader.status("calc").await, Some(PluginStatus::Loaded));
}

#[tokio::test]
async fn initialize_transitions_to_initialized() {
    let loader = PluginLoader::new();
    loader.register("calc", Arc::new(NoopPlugin::new("calc"))).await.unwrap();
    loader.initialize("calc", json!({})).await.unwrap();
    assert_eq!(loader.status("calc").await, Some(PluginStatus::Initialized));
}

#[tokio::test]
async fn failed_initialize_transitions_to_error() {
    let loader = PluginLoader::new();
    loader.register("calc", Arc::new(NoopPlugin::failing_to_initialize("calc"))).await.unwrap();
    let err = loader.initialize("calc", json!({})).await.unwrap_err();
    assert_eq!(err.kind, wf_core::ErrorKind::PluginLifecycle);
    assert_eq!(loader.status("calc").await, Some(PluginStatus::Error));
}

#[tokio::test]
async fn adapter_rejects_calls_before_initialization() {
    let loader = PluginLoader::new();
    loader.register("calc", Arc::new(NoopPlugin::new("calc"))).await.unwrap();
    let adapter = loader.get_plugin_for_work_kind("calc").await.unwrap();

    let work = Work::new("calc", json!({ "executor_config": {} }), 0);
    let err = adapter.execute(&work, &empty_context(), CancellationToken::new()).await.unwrap_err();
    assert_eq!(err.kind, wf_core::ErrorKind::InvalidConfiguration);
}

#[tokio::test]
async fn adapter_delegates_once_initialized() {
    let loader = PluginLoader::new();
    loader.register("calc", Arc::new(NoopPlugin::new("calc"))).await.unwrap();
    loader.initialize("calc", json!({})).await.unwrap();
    let adapter = loader.get_plugin_for_work_kind("calc").await.unwrap();

    let work = Work::new("calc", json!({ "executor_config": { "message": "ok" } }), 0);
    let result = adapter.execute(&work, &empty_context(), CancellationToken::new()).await.unwrap();
    assert!(result.success);
    assert_eq!(result.output, json!("ok"));
}

#[tokio::test]
async fn get_plugin_for_unknown_kind_is_none() {
    let loader = PluginLoader::new();
    assert!(loader.get_plugin_for_work_kind("nope").await.is_none());
}

#[tokio::test]
async fn unregister_removes_the_plugin_even_if_shutdown_errors() {
    let loader = PluginLoader::new();
    loader.register("calc", Arc::new(NoopPlugin::new("calc"))).await.unwrap();
    loader.initialize("calc", json!({})).await.unwrap();

    loader.unregister("calc").await;
    assert_eq!(loader.status("calc").await, None);
}

#[tokio::test]
async fn plugin_info_reports_declared_work_kinds() {
    let loader = PluginLoader::new();
    loader.register("calc", Arc::new(NoopPlugin::new("calc"))).await.unwrap();
    let info = loader.plugin_info("calc").await.unwrap();
    assert_eq!(info.work_kinds, vec!["calc".to_string()]);
}

#[tokio::test]
async fn shutdown_all_is_best_effort_across_multiple_plugins() {
    let loader = PluginLoader::new();
    loader.register("a", Arc::new(NoopPlugin::new("a"))).await.unwrap();
    loader.register("b", Arc::new(NoopPlugin::new("b"))).await.unwrap();
    loader.initialize("a", json!({})).await.unwrap();
    loader.initialize("b", json!({})).await.unwrap();

    loader.shutdown_all().await;
    // Shutdown does not itself unregister; both entries remain, whatever
    // status their plugin's `Shutdown` left them in.
    assert!(loader.status("a").await.is_some());
    assert!(loader.status("b").await.is_some());
}
