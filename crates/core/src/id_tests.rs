// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

crate::define_id! {
    /// Test ID type for macro verification.
    pub struct TestId("tst-");
}

#[test]
fn define_id_hash_map_lookup_by_str() {
    let id = TestId::new();
    let mut map = HashMap::new();
    map.insert(id, 42);
    assert_eq!(map.get(id.as_str()), Some(&42));
}

#[test]
fn define_id_round_trips_through_string() {
    let id = TestId::new();
    let s = id.to_string();
    let parsed = TestId::from_string(&s);
    assert_eq!(id, parsed);
}

#[test]
fn define_id_suffix_strips_prefix() {
    let id = TestId::from_string("tst-abc123");
    assert_eq!(id.suffix(), "abc123");
}

#[test]
fn define_id_two_news_are_unique() {
    assert_ne!(TestId::new(), TestId::new());
}

#[test]
fn idbuf_hash_matches_str_hash_for_borrow_lookup() {
    let mut map: HashMap<IdBuf, i32> = HashMap::new();
    map.insert(IdBuf::new("abc"), 1);
    assert_eq!(map.get("abc"), Some(&1));
}
