use juju_charm_examples::charms::relation_departed::{
    BlankCharm, FOLLOWER_KEY, PROVIDER_KEY, PROVIDER_VALUE, ProviderCharm, RELATION,
    REQUIRER_KEY, RequirerCharm, WORKLOAD,
};
use juju_charm_examples::core::hooktools::RelationMember;
use juju_charm_examples::core::status::UnitStatus;
use juju_charm_examples::core::testing::Harness;

fn provider_app() -> RelationMember {
    RelationMember::App("provider".to_string())
}

fn requirer_app() -> RelationMember {
    RelationMember::App("requirer".to_string())
}

#[test]
fn leader_reads_absent_key_then_writes_its_own() {
    let mut harness = Harness::new(ProviderCharm::default(), "provider", 0);
    harness.set_leader(true);
    let rel = harness.add_relation(RELATION, "requirer");

    harness.remove_relation_unit(&rel, "requirer/0").unwrap();

    assert_eq!(harness.charm().last_read, None);
    let bag = harness.tools().relation_bag(rel.id, &provider_app());
    assert_eq!(bag.get(PROVIDER_KEY).map(String::as_str), Some(PROVIDER_VALUE));
    let leader_lines: Vec<String> = harness
        .tools()
        .log_messages()
        .into_iter()
        .filter(|m| m.starts_with("Leader"))
        .collect();
    assert_eq!(
        leader_lines,
        vec![
            "Leader attempts to read remote app relation data...",
            "Leader read remote app relation data",
            "Leader attempts to write its own relation app data...",
            "Leader wrote its own relation data",
        ]
    );
}

#[test]
fn leader_reads_before_writing() {
    let mut harness = Harness::new(ProviderCharm::default(), "provider", 0);
    harness.set_leader(true);
    let rel = harness.add_relation(RELATION, "requirer");
    harness.update_relation_data(&rel, &requirer_app(), REQUIRER_KEY, "hello");

    harness.remove_relation_unit(&rel, "requirer/0").unwrap();

    assert_eq!(harness.charm().last_read.as_deref(), Some("hello"));
    let calls = harness.tools().calls();
    let read = calls
        .iter()
        .position(|c| c.starts_with("relation-get") && c.contains("--app - requirer"))
        .unwrap();
    let write = calls
        .iter()
        .position(|c| c.starts_with("relation-set") && c.contains("--app"))
        .unwrap();
    assert!(read < write);
}

#[test]
fn non_leader_reads_but_never_writes() {
    let mut harness = Harness::new(ProviderCharm::default(), "provider", 1);
    harness.set_leader(false);
    let rel = harness.add_relation(RELATION, "requirer");
    harness.update_relation_data(&rel, &requirer_app(), FOLLOWER_KEY, "v1");

    harness.remove_relation_unit(&rel, "requirer/0").unwrap();

    assert_eq!(harness.charm().last_read.as_deref(), Some("v1"));
    assert!(
        harness
            .tools()
            .calls()
            .iter()
            .all(|c| !c.starts_with("relation-set"))
    );
    assert!(
        harness
            .tools()
            .relation_bag(rel.id, &provider_app())
            .is_empty()
    );
    assert!(
        harness
            .tools()
            .log_messages()
            .contains(&"Non-leader read remote app relation data".to_string())
    );
}

#[test]
fn other_relations_are_ignored() {
    let mut harness = Harness::new(ProviderCharm::default(), "provider", 0);
    harness.set_leader(true);
    let rel = harness.add_relation("ingress", "traefik");

    harness.remove_relation_unit(&rel, "traefik/0").unwrap();

    assert!(
        harness
            .tools()
            .calls()
            .iter()
            .all(|c| !c.starts_with("relation-"))
    );
}

#[test]
fn status_is_active_after_pebble_ready_regardless_of_departed() {
    let mut harness = Harness::new(ProviderCharm::default(), "provider", 1);
    harness.set_leader(false);
    let rel = harness.add_relation(RELATION, "requirer");
    harness.remove_relation_unit(&rel, "requirer/0").unwrap();

    harness.container_pebble_ready(WORKLOAD).unwrap();

    assert_eq!(harness.unit_status(), Some(UnitStatus::active()));
}

#[test]
fn requirer_goes_active_on_pebble_ready() {
    let mut harness = Harness::new(RequirerCharm, "requirer", 0);
    harness.set_leader(true);
    harness.begin_with_initial_hooks().unwrap();
    harness.container_pebble_ready(WORKLOAD).unwrap();

    assert_eq!(harness.unit_status(), Some(UnitStatus::active()));
}

#[test]
fn requirer_only_logs_on_departed() {
    let mut harness = Harness::new(RequirerCharm, "requirer", 0);
    let rel = harness.add_relation(RELATION, "provider");

    harness.remove_relation_unit(&rel, "provider/0").unwrap();

    assert!(
        harness
            .tools()
            .log_messages()
            .contains(&"Requirer in relation departed".to_string())
    );
    assert!(
        harness
            .tools()
            .calls()
            .iter()
            .all(|c| !c.starts_with("relation-"))
    );
}

#[test]
fn blank_charm_is_active_after_initial_hooks() {
    let mut harness = Harness::new(BlankCharm, "blank", 0);
    harness.begin_with_initial_hooks().unwrap();

    assert_eq!(harness.unit_status(), Some(UnitStatus::active()));
}
