use juju_charm_examples::charms::push_nested::{
    self, CONTENT, ELSEWHERE_PATH, MOUNTED_PATH, PushNestedCharm, WORKLOAD,
};
use juju_charm_examples::core::error::CharmError;
use juju_charm_examples::core::testing::Harness;

#[test]
fn pushes_and_reads_back_both_paths() {
    let mut harness = Harness::new(PushNestedCharm, "push-nested", 0);
    harness.set_can_connect(WORKLOAD, true);

    harness.update_config(serde_json::json!({})).unwrap();

    let workloads = harness.workloads();
    for path in [MOUNTED_PATH, ELSEWHERE_PATH] {
        assert_eq!(
            workloads.file(WORKLOAD, path),
            Some(CONTENT.as_bytes().to_vec())
        );
    }
    for dir in [
        "/mounted-storage",
        "/mounted-storage/somewhere",
        "/mounted-storage/somewhere/over",
        "/mounted-storage/somewhere/over/the",
        "/somewhere",
        "/somewhere/over/the",
    ] {
        assert!(workloads.has_dir(WORKLOAD, dir), "missing {}", dir);
    }
    assert_eq!(workloads.push_count(WORKLOAD), 2);
    assert_eq!(workloads.pull_count(WORKLOAD), 2);

    let messages = harness.tools().log_messages();
    let attempts: Vec<&String> = messages
        .iter()
        .filter(|m| m.starts_with("Attempting to push to"))
        .collect();
    assert_eq!(
        attempts,
        vec![
            &format!("Attempting to push to {}", MOUNTED_PATH),
            &format!("Attempting to push to {}", ELSEWHERE_PATH),
        ]
    );
}

#[test]
fn unreachable_container_is_skipped_silently() {
    let mut harness = Harness::new(PushNestedCharm, "push-nested", 0);

    harness.update_config(serde_json::json!({})).unwrap();

    assert_eq!(harness.workloads().push_count(WORKLOAD), 0);
    assert_eq!(harness.workloads().pull_count(WORKLOAD), 0);
    assert!(
        harness
            .tools()
            .log_messages()
            .iter()
            .all(|m| !m.contains("push"))
    );
}

#[test]
fn initial_hooks_push_once_workload_is_reachable() {
    let mut harness = Harness::new(PushNestedCharm, "push-nested", 0);
    harness.set_leader(true);
    harness.begin_with_initial_hooks().unwrap();
    assert_eq!(harness.workloads().push_count(WORKLOAD), 0);

    harness.container_pebble_ready(WORKLOAD).unwrap();
    harness.update_config(serde_json::json!({"unused": true})).unwrap();

    assert!(harness.workloads().file(WORKLOAD, MOUNTED_PATH).is_some());
}

#[test]
fn pull_of_missing_file_is_none() {
    let harness = Harness::new(PushNestedCharm, "push-nested", 0);
    harness.set_can_connect(WORKLOAD, true);
    let container = harness.model().container(WORKLOAD);

    assert_eq!(push_nested::pull(&container, "/not/there").unwrap(), None);
}

#[test]
fn pull_of_non_utf8_content_is_none() {
    let harness = Harness::new(PushNestedCharm, "push-nested", 0);
    harness.set_can_connect(WORKLOAD, true);
    harness
        .workloads()
        .put_file(WORKLOAD, "/bin/blob", &[0xff, 0xfe, 0x00, 0x80]);
    let container = harness.model().container(WORKLOAD);

    assert_eq!(push_nested::pull(&container, "/bin/blob").unwrap(), None);
    assert_eq!(harness.workloads().pull_count(WORKLOAD), 1);
}

#[test]
fn pull_of_denied_path_is_none() {
    let harness = Harness::new(PushNestedCharm, "push-nested", 0);
    harness.set_can_connect(WORKLOAD, true);
    harness.workloads().put_file(WORKLOAD, "/root/secret", b"hidden");
    harness.workloads().deny(WORKLOAD, "/root/secret");
    let container = harness.model().container(WORKLOAD);

    assert_eq!(push_nested::pull(&container, "/root/secret").unwrap(), None);
}

#[test]
fn pull_from_unreachable_container_is_none() {
    let harness = Harness::new(PushNestedCharm, "push-nested", 0);
    let container = harness.model().container(WORKLOAD);

    assert_eq!(push_nested::pull(&container, MOUNTED_PATH).unwrap(), None);
}

#[test]
fn push_to_unreachable_container_fails() {
    let harness = Harness::new(PushNestedCharm, "push-nested", 0);
    let container = harness.model().container(WORKLOAD);

    let err = push_nested::push(&container, MOUNTED_PATH, CONTENT).unwrap_err();
    assert!(matches!(err, CharmError::PebbleError(_)));
}

#[test]
fn push_creates_parents() {
    let harness = Harness::new(PushNestedCharm, "push-nested", 0);
    harness.set_can_connect(WORKLOAD, true);
    let container = harness.model().container(WORKLOAD);

    push_nested::push(&container, "/a/b/c/d.txt", "deep").unwrap();

    assert!(harness.workloads().has_dir(WORKLOAD, "/a/b/c"));
    assert_eq!(
        push_nested::pull(&container, "/a/b/c/d.txt").unwrap().as_deref(),
        Some("deep")
    );
}
