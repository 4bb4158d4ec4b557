use juju_charm_examples::charms::bare::{self, NOTHING_SET_MESSAGE};
use juju_charm_examples::core::env::Invocation;
use juju_charm_examples::core::error::CharmError;
use juju_charm_examples::core::hooktools::{HookTools, JujuLogLevel, RelationMember};
use juju_charm_examples::core::relation::Relation;
use juju_charm_examples::core::status::UnitStatus;
use juju_charm_examples::core::testing::FakeHookTools;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[test]
fn hook_name_produces_exactly_one_hook_line() {
    let tools = FakeHookTools::new("bare", 0);
    let inv = Invocation::new([("JUJU_HOOK_NAME", "install")]);

    bare::run(&inv, &tools).unwrap();

    let logs = tools.logs();
    assert_eq!(logs, vec![(JujuLogLevel::Info, "Hook: install".to_string())]);
    assert!(!logs.iter().any(|(_, m)| m.starts_with("Action:")));
}

#[test]
fn action_name_is_logged_when_no_hook() {
    let tools = FakeHookTools::new("bare", 0);
    let inv = Invocation::new([("JUJU_ACTION_NAME", "backup")]);

    bare::run(&inv, &tools).unwrap();

    assert_eq!(
        tools.logs(),
        vec![(JujuLogLevel::Info, "Action: backup".to_string())]
    );
}

#[test]
fn hook_wins_when_both_are_set() {
    let tools = FakeHookTools::new("bare", 0);
    let inv = Invocation::new([
        ("JUJU_HOOK_NAME", "update-status"),
        ("JUJU_ACTION_NAME", "backup"),
    ]);

    bare::run(&inv, &tools).unwrap();

    assert_eq!(tools.log_messages(), vec!["Hook: update-status"]);
}

#[test]
fn neither_set_produces_one_error_line() {
    let tools = FakeHookTools::new("bare", 0);

    bare::run(&Invocation::default(), &tools).unwrap();

    let logs = tools.logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].0, JujuLogLevel::Error);
    assert_eq!(logs[0].1, NOTHING_SET_MESSAGE);
}

#[test]
fn dispatch_path_alone_is_not_an_identification() {
    let tools = FakeHookTools::new("bare", 0);
    let inv = Invocation::new([("JUJU_DISPATCH_PATH", "hooks/install")]);

    bare::run(&inv, &tools).unwrap();

    assert_eq!(
        tools.logs(),
        vec![(JujuLogLevel::Error, NOTHING_SET_MESSAGE.to_string())]
    );
    assert_eq!(
        tools.status(),
        Some(UnitStatus::active_with(bare::ACTIVE_MESSAGE))
    );
}

#[test]
fn status_is_always_set_after_logging() {
    for inv in [
        Invocation::new([("JUJU_HOOK_NAME", "start")]),
        Invocation::new([("JUJU_ACTION_NAME", "snapshot")]),
        Invocation::default(),
    ] {
        let tools = FakeHookTools::new("bare", 0);
        bare::run(&inv, &tools).unwrap();
        assert_eq!(tools.status(), Some(UnitStatus::active_with("Woohoo!")));
        let calls = tools.calls();
        assert!(calls.last().unwrap().starts_with("status-set active"));
    }
}

/// Hook tools whose `juju-log` always fails.
struct BrokenLog {
    inner: FakeHookTools,
}

impl HookTools for BrokenLog {
    fn juju_log(&self, _level: JujuLogLevel, _message: &str) -> Result<(), CharmError> {
        Err(CharmError::HookToolError {
            tool: "juju-log".to_string(),
            code: Some(1),
            stderr: "no agent".to_string(),
        })
    }

    fn status_set(&self, status: &UnitStatus) -> Result<(), CharmError> {
        self.inner.status_set(status)
    }

    fn is_leader(&self) -> Result<bool, CharmError> {
        self.inner.is_leader()
    }

    fn relation_ids(&self, name: &str) -> Result<Vec<u32>, CharmError> {
        self.inner.relation_ids(name)
    }

    fn relation_get(
        &self,
        relation: &Relation,
        member: &RelationMember,
    ) -> Result<BTreeMap<String, String>, CharmError> {
        self.inner.relation_get(relation, member)
    }

    fn relation_set(
        &self,
        relation: &Relation,
        app: bool,
        key: &str,
        value: &str,
    ) -> Result<(), CharmError> {
        self.inner.relation_set(relation, app, key, value)
    }

    fn config_get(&self) -> Result<Map<String, Value>, CharmError> {
        self.inner.config_get()
    }
}

#[test]
fn log_failure_still_sets_status_then_propagates() {
    let tools = BrokenLog {
        inner: FakeHookTools::new("bare", 0),
    };
    let inv = Invocation::new([("JUJU_HOOK_NAME", "install")]);

    let err = bare::run(&inv, &tools).unwrap_err();

    assert!(matches!(err, CharmError::HookToolError { ref tool, .. } if tool == "juju-log"));
    assert_eq!(
        tools.inner.status(),
        Some(UnitStatus::active_with("Woohoo!"))
    );
}
