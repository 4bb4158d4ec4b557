//! In-process stand-ins for Juju and Pebble, plus a [`Harness`] that drives a
//! charm through events against them.
//!
//! The fakes behave like the real collaborators where the example charms can
//! observe a difference: Juju rejects application-scoped relation writes from
//! non-leaders, Pebble reports `not-found` for missing files and refuses to
//! create a file under a missing directory unless asked to make parents, and
//! nothing is reachable in a container until it is marked connectable.

use crate::core::container::{PushOptions, WorkloadFiles, WorkloadProvider};
use crate::core::dispatch::{Charm, dispatch};
use crate::core::env::{HookEvent, JujuContext, RelationEvent, RelationPhase};
use crate::core::error::{CharmError, PebbleError};
use crate::core::hooktools::{HookTools, JujuLogLevel, RelationMember};
use crate::core::logging;
use crate::core::model::Model;
use crate::core::relation::Relation;
use crate::core::status::UnitStatus;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

type Bag = BTreeMap<String, String>;

#[derive(Debug, Default)]
struct FakeRelation {
    name: String,
    app_bags: BTreeMap<String, Bag>,
    unit_bags: BTreeMap<String, Bag>,
}

#[derive(Debug, Default)]
struct FakeJuju {
    leader: bool,
    status: Option<UnitStatus>,
    logs: Vec<(JujuLogLevel, String)>,
    calls: Vec<String>,
    relations: BTreeMap<u32, FakeRelation>,
    config: Map<String, Value>,
}

/// Hook tools backed by memory.
#[derive(Debug)]
pub struct FakeHookTools {
    app: String,
    unit: String,
    state: Mutex<FakeJuju>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl FakeHookTools {
    pub fn new(app: &str, unit: u32) -> Self {
        Self {
            app: app.to_string(),
            unit: format!("{}/{}", app, unit),
            state: Mutex::new(FakeJuju::default()),
        }
    }

    pub fn set_leader(&self, leader: bool) {
        lock(&self.state).leader = leader;
    }

    pub fn set_config(&self, config: Value) {
        lock(&self.state).config = match config {
            Value::Object(map) => map,
            _ => Map::new(),
        };
    }

    pub fn add_relation(&self, relation: &Relation) {
        lock(&self.state)
            .relations
            .entry(relation.id)
            .or_insert_with(|| FakeRelation {
                name: relation.name.clone(),
                ..FakeRelation::default()
            });
    }

    /// Sets a key in any member's bag, bypassing leadership checks.
    pub fn update_relation_data(&self, id: u32, member: &RelationMember, key: &str, value: &str) {
        let mut state = lock(&self.state);
        let Some(rel) = state.relations.get_mut(&id) else {
            return;
        };
        let bags = match member {
            RelationMember::App(_) => &mut rel.app_bags,
            RelationMember::Unit(_) => &mut rel.unit_bags,
        };
        bags.entry(member.name().to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    pub fn relation_bag(&self, id: u32, member: &RelationMember) -> Bag {
        let state = lock(&self.state);
        state
            .relations
            .get(&id)
            .and_then(|rel| match member {
                RelationMember::App(n) => rel.app_bags.get(n),
                RelationMember::Unit(n) => rel.unit_bags.get(n),
            })
            .cloned()
            .unwrap_or_default()
    }

    pub fn status(&self) -> Option<UnitStatus> {
        lock(&self.state).status.clone()
    }

    pub fn logs(&self) -> Vec<(JujuLogLevel, String)> {
        lock(&self.state).logs.clone()
    }

    pub fn log_messages(&self) -> Vec<String> {
        self.logs().into_iter().map(|(_, m)| m).collect()
    }

    /// Every tool invocation so far, rendered as a command line.
    pub fn calls(&self) -> Vec<String> {
        lock(&self.state).calls.clone()
    }

    fn record(&self, call: String) {
        lock(&self.state).calls.push(call);
    }
}

fn tool_error(tool: &str, stderr: String) -> CharmError {
    CharmError::HookToolError {
        tool: tool.to_string(),
        code: Some(1),
        stderr,
    }
}

impl HookTools for FakeHookTools {
    fn juju_log(&self, level: JujuLogLevel, message: &str) -> Result<(), CharmError> {
        let mut state = lock(&self.state);
        state.calls.push(format!("juju-log -l {} {}", level, message));
        state.logs.push((level, message.to_string()));
        Ok(())
    }

    fn status_set(&self, status: &UnitStatus) -> Result<(), CharmError> {
        let mut state = lock(&self.state);
        state.calls.push(match status.message() {
            Some(msg) => format!("status-set {} {}", status.name(), msg),
            None => format!("status-set {}", status.name()),
        });
        state.status = Some(status.clone());
        Ok(())
    }

    fn is_leader(&self) -> Result<bool, CharmError> {
        self.record("is-leader".to_string());
        Ok(lock(&self.state).leader)
    }

    fn relation_ids(&self, name: &str) -> Result<Vec<u32>, CharmError> {
        self.record(format!("relation-ids {}", name));
        let state = lock(&self.state);
        Ok(state
            .relations
            .iter()
            .filter(|(_, rel)| rel.name == name)
            .map(|(id, _)| *id)
            .collect())
    }

    fn relation_get(
        &self,
        relation: &Relation,
        member: &RelationMember,
    ) -> Result<Bag, CharmError> {
        let scope = if matches!(member, RelationMember::App(_)) {
            " --app"
        } else {
            ""
        };
        self.record(format!(
            "relation-get -r {}{} - {}",
            relation.tool_id(),
            scope,
            member.name()
        ));
        if !lock(&self.state).relations.contains_key(&relation.id) {
            return Err(tool_error(
                "relation-get",
                format!("relation {} not found", relation.tool_id()),
            ));
        }
        Ok(self.relation_bag(relation.id, member))
    }

    fn relation_set(
        &self,
        relation: &Relation,
        app: bool,
        key: &str,
        value: &str,
    ) -> Result<(), CharmError> {
        let scope = if app { " --app" } else { "" };
        self.record(format!(
            "relation-set -r {}{} {}={}",
            relation.tool_id(),
            scope,
            key,
            value
        ));

        let mut state = lock(&self.state);
        if app && !state.leader {
            return Err(tool_error(
                "relation-set",
                "cannot write relation settings: unit is not the leader".to_string(),
            ));
        }
        let rel = state.relations.get_mut(&relation.id).ok_or_else(|| {
            tool_error(
                "relation-set",
                format!("relation {} not found", relation.tool_id()),
            )
        })?;
        let (bags, owner) = if app {
            (&mut rel.app_bags, self.app.clone())
        } else {
            (&mut rel.unit_bags, self.unit.clone())
        };
        bags.entry(owner)
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn config_get(&self) -> Result<Map<String, Value>, CharmError> {
        self.record("config-get".to_string());
        Ok(lock(&self.state).config.clone())
    }
}

#[derive(Debug, Default)]
struct FakeFilesystem {
    connectable: bool,
    files: BTreeMap<String, Vec<u8>>,
    dirs: BTreeSet<String>,
    denied: BTreeSet<String>,
    pushes: usize,
    pulls: usize,
}

type Filesystems = Arc<Mutex<BTreeMap<String, FakeFilesystem>>>;

/// In-memory container filesystems, keyed by container name.
#[derive(Debug, Clone, Default)]
pub struct FakeWorkloads {
    filesystems: Filesystems,
}

impl FakeWorkloads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_can_connect(&self, container: &str, connectable: bool) {
        lock(&self.filesystems)
            .entry(container.to_string())
            .or_default()
            .connectable = connectable;
    }

    /// Places `content` at `path` directly, bypassing push accounting.
    pub fn put_file(&self, container: &str, path: &str, content: &[u8]) {
        lock(&self.filesystems)
            .entry(container.to_string())
            .or_default()
            .files
            .insert(path.to_string(), content.to_vec());
    }

    /// Makes reads of `path` fail with Pebble's `permission-denied`.
    pub fn deny(&self, container: &str, path: &str) {
        lock(&self.filesystems)
            .entry(container.to_string())
            .or_default()
            .denied
            .insert(path.to_string());
    }

    pub fn file(&self, container: &str, path: &str) -> Option<Vec<u8>> {
        lock(&self.filesystems)
            .get(container)
            .and_then(|fs| fs.files.get(path).cloned())
    }

    pub fn has_dir(&self, container: &str, path: &str) -> bool {
        lock(&self.filesystems)
            .get(container)
            .is_some_and(|fs| fs.dirs.contains(path))
    }

    pub fn push_count(&self, container: &str) -> usize {
        lock(&self.filesystems)
            .get(container)
            .map_or(0, |fs| fs.pushes)
    }

    pub fn pull_count(&self, container: &str) -> usize {
        lock(&self.filesystems)
            .get(container)
            .map_or(0, |fs| fs.pulls)
    }
}

impl WorkloadProvider for FakeWorkloads {
    fn files(&self, container: &str) -> Arc<dyn WorkloadFiles> {
        Arc::new(FakeContainerFiles {
            container: container.to_string(),
            filesystems: self.filesystems.clone(),
        })
    }
}

struct FakeContainerFiles {
    container: String,
    filesystems: Filesystems,
}

fn unreachable_error(container: &str) -> CharmError {
    CharmError::PebbleError(PebbleError::Connection(io::Error::new(
        io::ErrorKind::ConnectionRefused,
        format!("container '{}' is not connectable", container),
    )))
}

fn path_error(path: &str, kind: &str, message: &str) -> CharmError {
    CharmError::PebbleError(PebbleError::Path {
        path: path.to_string(),
        kind: kind.to_string(),
        message: message.to_string(),
    })
}

impl WorkloadFiles for FakeContainerFiles {
    fn can_connect(&self) -> bool {
        lock(&self.filesystems)
            .get(&self.container)
            .is_some_and(|fs| fs.connectable)
    }

    fn push(&self, path: &str, content: &[u8], options: &PushOptions) -> Result<(), CharmError> {
        let mut all = lock(&self.filesystems);
        let fs = all.entry(self.container.clone()).or_default();
        if !fs.connectable {
            return Err(unreachable_error(&self.container));
        }
        fs.pushes += 1;
        if !path.starts_with('/') {
            return Err(path_error(path, "generic-file-error", "paths must be absolute"));
        }

        let parents: Vec<String> = Path::new(path)
            .ancestors()
            .skip(1)
            .map(|p| p.to_string_lossy().to_string())
            .filter(|p| p != "/" && !p.is_empty())
            .collect();
        let missing: Vec<&String> = parents.iter().filter(|p| !fs.dirs.contains(*p)).collect();
        if !missing.is_empty() {
            if !options.make_dirs {
                return Err(path_error(
                    path,
                    "not-found",
                    "parent directory does not exist",
                ));
            }
            let created: Vec<String> = missing.into_iter().cloned().collect();
            fs.dirs.extend(created);
        }
        fs.files.insert(path.to_string(), content.to_vec());
        Ok(())
    }

    fn pull(&self, path: &str) -> Result<Vec<u8>, CharmError> {
        let mut all = lock(&self.filesystems);
        let fs = all.entry(self.container.clone()).or_default();
        if !fs.connectable {
            return Err(unreachable_error(&self.container));
        }
        fs.pulls += 1;
        if fs.denied.contains(path) {
            return Err(path_error(
                path,
                "permission-denied",
                &format!("open {}: permission denied", path),
            ));
        }
        fs.files
            .get(path)
            .cloned()
            .ok_or_else(|| path_error(path, "not-found", "no such file or directory"))
    }
}

/// Drives a charm through events against [`FakeHookTools`] and
/// [`FakeWorkloads`], forwarding its `tracing` output into the fake Juju log.
pub struct Harness<C: Charm> {
    charm: C,
    context: JujuContext,
    tools: Arc<FakeHookTools>,
    workloads: FakeWorkloads,
    next_relation_id: u32,
}

impl<C: Charm> Harness<C> {
    pub fn new(charm: C, app: &str, unit: u32) -> Self {
        Self {
            charm,
            context: JujuContext {
                model: "test-model".to_string(),
                model_uuid: "00000000-0000-4000-8000-000000000000".to_string(),
                app_name: app.to_string(),
                unit,
                juju_version: "3.4.2".to_string(),
                charm_dir: None,
            },
            tools: Arc::new(FakeHookTools::new(app, unit)),
            workloads: FakeWorkloads::new(),
            next_relation_id: 0,
        }
    }

    pub fn charm(&self) -> &C {
        &self.charm
    }

    pub fn tools(&self) -> &FakeHookTools {
        &self.tools
    }

    pub fn workloads(&self) -> &FakeWorkloads {
        &self.workloads
    }

    pub fn model(&self) -> Model {
        Model::new(
            self.context.clone(),
            self.tools.clone(),
            Arc::new(self.workloads.clone()),
        )
    }

    pub fn unit_status(&self) -> Option<UnitStatus> {
        self.tools.status()
    }

    pub fn set_leader(&self, leader: bool) {
        self.tools.set_leader(leader);
    }

    pub fn set_can_connect(&self, container: &str, connectable: bool) {
        self.workloads.set_can_connect(container, connectable);
    }

    pub fn fire(&mut self, event: HookEvent) -> Result<(), CharmError> {
        let model = self.model();
        let subscriber = logging::subscriber(self.tools.clone(), "debug");
        tracing::subscriber::with_default(subscriber, || {
            dispatch(&mut self.charm, &event, &model)
        })
    }

    /// install, leader-elected (or leader-settings-changed), config-changed, start.
    pub fn begin_with_initial_hooks(&mut self) -> Result<(), CharmError> {
        self.fire(HookEvent::Install)?;
        if self.tools.is_leader()? {
            self.fire(HookEvent::LeaderElected)?;
        } else {
            self.fire(HookEvent::LeaderSettingsChanged)?;
        }
        self.fire(HookEvent::ConfigChanged)?;
        self.fire(HookEvent::Start)
    }

    pub fn container_pebble_ready(&mut self, container: &str) -> Result<(), CharmError> {
        self.set_can_connect(container, true);
        self.fire(HookEvent::PebbleReady {
            workload: container.to_string(),
        })
    }

    pub fn update_config(&mut self, config: Value) -> Result<(), CharmError> {
        self.tools.set_config(config);
        self.fire(HookEvent::ConfigChanged)
    }

    pub fn add_relation(&mut self, name: &str, remote_app: &str) -> Relation {
        self.next_relation_id += 1;
        let relation = Relation {
            name: name.to_string(),
            id: self.next_relation_id,
            remote_app: Some(remote_app.to_string()),
        };
        self.tools.add_relation(&relation);
        relation
    }

    pub fn update_relation_data(
        &self,
        relation: &Relation,
        member: &RelationMember,
        key: &str,
        value: &str,
    ) {
        self.tools
            .update_relation_data(relation.id, member, key, value);
    }

    /// Fires `<relation>-relation-departed` for `unit` leaving.
    pub fn remove_relation_unit(
        &mut self,
        relation: &Relation,
        unit: &str,
    ) -> Result<(), CharmError> {
        self.fire(HookEvent::Relation(RelationEvent {
            phase: RelationPhase::Departed,
            relation: relation.clone(),
            remote_unit: Some(unit.to_string()),
            departing_unit: Some(unit.to_string()),
        }))
    }
}
