// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wf-adapters: bridges externally supplied plugins to the `wf_engine`
//! executor contract. A plugin is an ordinary [`wf_engine::WorkExecutor`]
//! plus a small `Initialize`/`Shutdown`/`HealthCheck`/`GetPluginInfo`
//! lifecycle surface; [`plugin::PluginLoader`] owns the plugin registry and
//! [`plugin::PluginAdapter`] presents an initialized plugin back to
//! `wf_engine::WorkExecutorRegistry` uniformly with any built-in executor.
//!
//! [`discovery`] is the optional file-system sweep: given a directory, load
//! shared-library files and probe a well-known factory symbol, skipping
//! non-matching files and reporting load failures per-file.

pub mod discovery;
pub mod plugin;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use plugin::{Plugin, PluginAdapter, PluginInfo, PluginLoader, PluginStatus};
