// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-system plugin discovery: given a directory, probe every file
//! matching a configurable extension for a well-known factory symbol.
//! Non-matching files are skipped; a load failure is reported per-file and
//! does not abort the sweep.
//!
//! This module proves a shared-library file *can* be loaded and exports the
//! expected symbol. Instantiating a [`crate::Plugin`] from that symbol and
//! handing it to a [`crate::PluginLoader`] is the composition root's job —
//! the symbol's concrete function signature is outside the core contract.

use libloading::{Library, Symbol};
use std::path::{Path, PathBuf};

/// The symbol every plugin shared library must export. Its signature is a
/// contract between the composition root and its plugins, not something
/// this crate enforces beyond confirming the symbol resolves.
pub const FACTORY_SYMBOL: &[u8] = b"wf_plugin_factory\0";

/// One file that failed to load or did not export [`FACTORY_SYMBOL`].
#[derive(Debug, Clone)]
pub struct DiscoveryFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of one sweep: every file that resolved the factory symbol, and
/// every file that was a candidate (matched the extension) but failed.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryReport {
    pub loaded: Vec<PathBuf>,
    pub failures: Vec<DiscoveryFailure>,
}

impl DiscoveryReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Scans `dir` (non-recursively) for files whose extension matches
/// `extension` (no leading dot, e.g. `"so"`), probing each for
/// [`FACTORY_SYMBOL`]. Files that don't match the extension are skipped
/// silently; a read-directory failure on `dir` itself is reported as a
/// single failure entry rather than a hard error, matching "load failures
/// are reported per-file and do not abort the sweep".
pub fn discover(dir: &Path, extension: &str) -> DiscoveryReport {
    let mut report = DiscoveryReport::default();

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            report.failures.push(DiscoveryFailure { path: dir.to_path_buf(), message: err.to_string() });
            return report;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(extension) {
            continue;
        }
        match probe_factory_symbol(&path) {
            Ok(()) => report.loaded.push(path),
            Err(message) => report.failures.push(DiscoveryFailure { path, message }),
        }
    }

    report
}

fn probe_factory_symbol(path: &Path) -> Result<(), String> {
    // SAFETY: loading an arbitrary shared library is inherently unsafe —
    // there is no way to verify its initializers are well-behaved before
    // running them. This sweep only establishes that the expected symbol
    // resolves; it never calls through it.
    let library = unsafe { Library::new(path) }.map_err(|err| format!("failed to load library: {err}"))?;
    // SAFETY: `get` just resolves a symbol name against the loaded image;
    // we never call the resolved function pointer.
    let symbol: Symbol<'_, *const ()> =
        unsafe { library.get(FACTORY_SYMBOL) }.map_err(|err| format!("missing factory symbol: {err}"))?;
    if symbol.is_null() {
        return Err("factory symbol resolved to a null pointer".to_string());
    }
    drop(symbol);
    // Deliberately leak `library` instead of letting it drop: unloading a
    // shared object whose symbol we've only probed (and which a caller may
    // still instantiate a plugin from) is undefined behaviour if any
    // plugin instance outlives the unload.
    std::mem::forget(library);
    Ok(())
}

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod tests;
