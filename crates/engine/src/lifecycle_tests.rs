// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use parking_lot::Mutex;
use wf_core::InstanceId;

#[test]
fn publish_fans_out_to_every_subscriber_in_order() {
    let manager = LifecycleManager::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let seen_a = seen.clone();
    manager.subscribe(Arc::new(move |e: &LifecycleEvent| seen_a.lock().push(format!("a:{}", e.name()))));
    let seen_b = seen.clone();
    manager.subscribe(Arc::new(move |e: &LifecycleEvent| seen_b.lock().push(format!("b:{}", e.name()))));

    manager.publish(LifecycleEvent::InstanceCreated { instance_id: InstanceId::new(), timestamp_ms: 0 });

    assert_eq!(*seen.lock(), vec!["a:InstanceCreated", "b:InstanceCreated"]);
}

#[test]
fn event_name_and_instance_id_accessors() {
    let id = InstanceId::new();
    let event = LifecycleEvent::InstancePaused { instance_id: id, timestamp_ms: 5 };
    assert_eq!(event.name(), "InstancePaused");
    assert_eq!(event.instance_id(), id);
}
