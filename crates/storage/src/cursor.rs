// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A lazy, page-at-a-time walk over an [`InMemoryStore`]'s population,
//! so a caller never has to materialize every persisted instance to list
//! a filtered subset of it.

use wf_core::{InstanceSummary, ListFilter};

use crate::memory::InMemoryStore;

/// Yields pages of [`InstanceSummary`] in ascending id order. Exhausted once
/// a page comes back shorter than `page_size`.
pub struct InstanceCursor<'a> {
    store: &'a InMemoryStore,
    filter: ListFilter,
    page_size: usize,
    last_id: Option<String>,
    done: bool,
}

impl<'a> InstanceCursor<'a> {
    pub(crate) fn new(store: &'a InMemoryStore, filter: ListFilter, page_size: usize) -> Self {
        Self { store, filter, page_size: page_size.max(1), last_id: None, done: false }
    }

    /// Returns the next page, or an empty vec once the cursor is exhausted.
    /// Never blocks on I/O longer than a single in-memory lock acquisition,
    /// so it is safe to call repeatedly from an async context without
    /// starving other tasks.
    pub async fn next_page(&mut self) -> Vec<InstanceSummary> {
        if self.done {
            return Vec::new();
        }
        let page = self.store.summaries_after(&self.filter, self.last_id.as_deref(), self.page_size);
        if page.len() < self.page_size {
            self.done = true;
        }
        if let Some(last) = page.last() {
            self.last_id = Some(last.id.as_str().to_string());
        }
        page
    }

    pub fn is_exhausted(&self) -> bool {
        self.done
    }
}

#[cfg(test)]
#[path = "cursor_tests.rs"]
mod tests;
