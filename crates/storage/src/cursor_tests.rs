// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::memory::InMemoryStore;
use wf_core::test_support::{empty_context, trivial_two_state_definition};
use wf_core::{ListFilter, PersistenceStore, WorkflowInstance};

#[tokio::test]
async fn cursor_pages_through_the_whole_population_without_duplicates() {
    let store = InMemoryStore::new();
    let (def, s0, _s1) = trivial_two_state_definition();
    for _ in 0..25 {
        store.save(&WorkflowInstance::new(def.id, s0, empty_context(), 0)).await.unwrap();
    }

    let mut cursor = store.cursor(ListFilter::default(), 10);
    let mut seen = std::collections::HashSet::new();
    loop {
        let page = cursor.next_page().await;
        if page.is_empty() {
            break;
        }
        for summary in page {
            assert!(seen.insert(summary.id), "cursor yielded {:?} twice", summary.id);
        }
        if cursor.is_exhausted() {
            break;
        }
    }
    assert_eq!(seen.len(), 25);
}

#[tokio::test]
async fn cursor_over_empty_store_yields_no_pages() {
    let store = InMemoryStore::new();
    let mut cursor = store.cursor(ListFilter::default(), 10);
    assert!(cursor.next_page().await.is_empty());
    assert!(cursor.is_exhausted());
}

#[tokio::test]
async fn cursor_respects_the_filter() {
    let store = InMemoryStore::new();
    let (def, s0, _s1) = trivial_two_state_definition();
    let other_def = wf_core::DefinitionId::new();
    for _ in 0..5 {
        store.save(&WorkflowInstance::new(def.id, s0, empty_context(), 0)).await.unwrap();
    }
    store.save(&WorkflowInstance::new(other_def, s0, empty_context(), 0)).await.unwrap();

    let mut cursor = store.cursor(ListFilter { status: None, definition_id: Some(def.id) }, 2);
    let mut total = 0;
    loop {
        let page = cursor.next_page().await;
        total += page.len();
        if cursor.is_exhausted() {
            break;
        }
    }
    assert_eq!(total, 5);
}
