// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::instance::InstanceStatus;

#[test]
fn list_filter_matches_on_status_and_definition() {
    let def_id = DefinitionId::new();
    let other_def_id = DefinitionId::new();
    let summary = InstanceSummary { id: InstanceId::new(), status: InstanceStatus::Running, definition_id: def_id, updated_at_ms: 0 };

    assert!(ListFilter::default().matches(&summary));
    assert!(ListFilter { status: Some(InstanceStatus::Running), definition_id: None }.matches(&summary));
    assert!(!ListFilter { status: Some(InstanceStatus::Paused), definition_id: None }.matches(&summary));
    assert!(!ListFilter { status: None, definition_id: Some(other_def_id) }.matches(&summary));
    assert!(ListFilter { status: Some(InstanceStatus::Running), definition_id: Some(def_id) }.matches(&summary));
}
