//! Invocation context: what Juju handed this process.
//!
//! Juju starts one process per event and describes the event entirely through
//! environment variables. Everything here works on an [`Invocation`] snapshot
//! taken once at startup, so parsing is a pure function of that snapshot.

use crate::core::error::CharmError;
use crate::core::relation::Relation;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

pub const HOOK_NAME_ENV: &str = "JUJU_HOOK_NAME";
pub const ACTION_NAME_ENV: &str = "JUJU_ACTION_NAME";
pub const DISPATCH_PATH_ENV: &str = "JUJU_DISPATCH_PATH";
pub const UNIT_NAME_ENV: &str = "JUJU_UNIT_NAME";
pub const MODEL_NAME_ENV: &str = "JUJU_MODEL_NAME";
pub const MODEL_UUID_ENV: &str = "JUJU_MODEL_UUID";
pub const VERSION_ENV: &str = "JUJU_VERSION";
pub const CHARM_DIR_ENV: &str = "JUJU_CHARM_DIR";
pub const WORKLOAD_NAME_ENV: &str = "JUJU_WORKLOAD_NAME";
pub const RELATION_ENV: &str = "JUJU_RELATION";
pub const RELATION_ID_ENV: &str = "JUJU_RELATION_ID";
pub const REMOTE_APP_ENV: &str = "JUJU_REMOTE_APP";
pub const REMOTE_UNIT_ENV: &str = "JUJU_REMOTE_UNIT";
pub const DEPARTING_UNIT_ENV: &str = "JUJU_DEPARTING_UNIT";

static RELATION_HOOK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>.+)-relation-(?P<phase>created|joined|changed|departed|broken)$")
        .expect("relation hook pattern")
});

static PEBBLE_READY_HOOK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<workload>.+)-pebble-ready$").expect("pebble hook pattern"));

/// Environment and argv of one process invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    vars: BTreeMap<String, String>,
    args: Vec<String>,
}

impl Invocation {
    /// Snapshot of the current process. Non-UTF-8 names, values and
    /// arguments are converted lossily.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars_os()
                .map(|(k, v)| {
                    (
                        k.to_string_lossy().into_owned(),
                        v.to_string_lossy().into_owned(),
                    )
                })
                .collect(),
            args: std::env::args_os()
                .map(|a| a.to_string_lossy().into_owned())
                .collect(),
        }
    }

    pub fn new<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Value of `key`, treating an empty string as unset.
    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn require(&self, key: &str) -> Result<&str, CharmError> {
        self.var(key)
            .ok_or_else(|| CharmError::ContextError(format!("{} is not set", key)))
    }

    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Which kind of invocation this is, with hooks taking precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Hook(String),
    Action(String),
    Unknown,
}

impl Dispatch {
    pub fn from_invocation(inv: &Invocation) -> Self {
        let dispatch_path = inv.var(DISPATCH_PATH_ENV);
        let from_path = |prefix: &str| {
            dispatch_path
                .and_then(|p| p.strip_prefix(prefix))
                .filter(|name| !name.is_empty())
                .map(str::to_string)
        };

        if let Some(hook) = inv.var(HOOK_NAME_ENV) {
            Dispatch::Hook(hook.to_string())
        } else if let Some(hook) = from_path("hooks/") {
            Dispatch::Hook(hook)
        } else if let Some(action) = inv.var(ACTION_NAME_ENV) {
            Dispatch::Action(action.to_string())
        } else if let Some(action) = from_path("actions/") {
            Dispatch::Action(action)
        } else {
            Dispatch::Unknown
        }
    }

    /// Like [`Dispatch::from_invocation`], but only from `JUJU_HOOK_NAME` and
    /// `JUJU_ACTION_NAME`; the dispatch path is ignored.
    pub fn from_names(inv: &Invocation) -> Self {
        if let Some(hook) = inv.var(HOOK_NAME_ENV) {
            Dispatch::Hook(hook.to_string())
        } else if let Some(action) = inv.var(ACTION_NAME_ENV) {
            Dispatch::Action(action.to_string())
        } else {
            Dispatch::Unknown
        }
    }
}

/// Model-level context present on every hook and action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JujuContext {
    pub model: String,
    pub model_uuid: String,
    pub app_name: String,
    pub unit: u32,
    pub juju_version: String,
    pub charm_dir: Option<String>,
}

impl JujuContext {
    pub fn from_invocation(inv: &Invocation) -> Result<Self, CharmError> {
        let (app_name, unit) = split_unit_name(inv.require(UNIT_NAME_ENV)?)?;
        Ok(Self {
            model: inv.require(MODEL_NAME_ENV)?.to_string(),
            model_uuid: inv.require(MODEL_UUID_ENV)?.to_string(),
            app_name,
            unit,
            juju_version: inv.require(VERSION_ENV)?.to_string(),
            charm_dir: inv.var(CHARM_DIR_ENV).map(str::to_string),
        })
    }

    pub fn unit_name(&self) -> String {
        format!("{}/{}", self.app_name, self.unit)
    }
}

/// Splits `app/N` into the application name and unit number.
pub fn split_unit_name(unit: &str) -> Result<(String, u32), CharmError> {
    let (app, num) = unit
        .rsplit_once('/')
        .ok_or_else(|| CharmError::ContextError(format!("malformed unit name '{}'", unit)))?;
    let num = num
        .parse::<u32>()
        .map_err(|_| CharmError::ContextError(format!("malformed unit number in '{}'", unit)))?;
    if app.is_empty() {
        return Err(CharmError::ContextError(format!(
            "malformed unit name '{}'",
            unit
        )));
    }
    Ok((app.to_string(), num))
}

/// Parses a relation id in either `name:N` or bare `N` form.
pub fn parse_relation_id(raw: &str) -> Result<u32, CharmError> {
    let num = raw.rsplit_once(':').map(|(_, n)| n).unwrap_or(raw);
    num.parse::<u32>()
        .map_err(|_| CharmError::ContextError(format!("malformed relation id '{}'", raw)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationPhase {
    Created,
    Joined,
    Changed,
    Departed,
    Broken,
}

impl RelationPhase {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(Self::Created),
            "joined" => Some(Self::Joined),
            "changed" => Some(Self::Changed),
            "departed" => Some(Self::Departed),
            "broken" => Some(Self::Broken),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Joined => "joined",
            Self::Changed => "changed",
            Self::Departed => "departed",
            Self::Broken => "broken",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationEvent {
    pub phase: RelationPhase,
    pub relation: Relation,
    pub remote_unit: Option<String>,
    pub departing_unit: Option<String>,
}

/// A lifecycle event, typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookEvent {
    Install,
    Start,
    Stop,
    Remove,
    UpgradeCharm,
    ConfigChanged,
    UpdateStatus,
    LeaderElected,
    LeaderSettingsChanged,
    PebbleReady { workload: String },
    Relation(RelationEvent),
    Action { name: String },
    Other(String),
}

impl HookEvent {
    pub fn from_invocation(inv: &Invocation) -> Result<Self, CharmError> {
        match Dispatch::from_invocation(inv) {
            Dispatch::Hook(name) => Self::from_hook_name(&name, inv),
            Dispatch::Action(name) => Ok(HookEvent::Action { name }),
            Dispatch::Unknown => Err(CharmError::ContextError(format!(
                "neither {} nor {} is set",
                HOOK_NAME_ENV, ACTION_NAME_ENV
            ))),
        }
    }

    fn from_hook_name(name: &str, inv: &Invocation) -> Result<Self, CharmError> {
        let event = match name {
            "install" => HookEvent::Install,
            "start" => HookEvent::Start,
            "stop" => HookEvent::Stop,
            "remove" => HookEvent::Remove,
            "upgrade-charm" => HookEvent::UpgradeCharm,
            "config-changed" => HookEvent::ConfigChanged,
            "update-status" => HookEvent::UpdateStatus,
            "leader-elected" => HookEvent::LeaderElected,
            "leader-settings-changed" => HookEvent::LeaderSettingsChanged,
            _ => {
                if let Some(caps) = RELATION_HOOK.captures(name) {
                    return relation_event(&caps["name"], &caps["phase"], inv);
                }
                if let Some(caps) = PEBBLE_READY_HOOK.captures(name) {
                    let workload = inv.require(WORKLOAD_NAME_ENV)?;
                    if workload != &caps["workload"] {
                        return Err(CharmError::ContextError(format!(
                            "hook '{}' does not match workload '{}'",
                            name, workload
                        )));
                    }
                    return Ok(HookEvent::PebbleReady {
                        workload: workload.to_string(),
                    });
                }
                HookEvent::Other(name.to_string())
            }
        };
        Ok(event)
    }
}

fn relation_event(name: &str, phase: &str, inv: &Invocation) -> Result<HookEvent, CharmError> {
    let phase = RelationPhase::parse(phase)
        .ok_or_else(|| CharmError::ContextError(format!("unknown relation phase '{}'", phase)))?;
    let relation_name = inv.require(RELATION_ENV)?;
    if relation_name != name {
        return Err(CharmError::ContextError(format!(
            "hook for relation '{}' but {} is '{}'",
            name, RELATION_ENV, relation_name
        )));
    }
    let id = parse_relation_id(inv.require(RELATION_ID_ENV)?)?;
    Ok(HookEvent::Relation(RelationEvent {
        phase,
        relation: Relation {
            name: relation_name.to_string(),
            id,
            remote_app: inv.var(REMOTE_APP_ENV).map(str::to_string),
        },
        remote_unit: inv.var(REMOTE_UNIT_ENV).map(str::to_string),
        departing_unit: inv.var(DEPARTING_UNIT_ENV).map(str::to_string),
    }))
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookEvent::Install => write!(f, "install"),
            HookEvent::Start => write!(f, "start"),
            HookEvent::Stop => write!(f, "stop"),
            HookEvent::Remove => write!(f, "remove"),
            HookEvent::UpgradeCharm => write!(f, "upgrade-charm"),
            HookEvent::ConfigChanged => write!(f, "config-changed"),
            HookEvent::UpdateStatus => write!(f, "update-status"),
            HookEvent::LeaderElected => write!(f, "leader-elected"),
            HookEvent::LeaderSettingsChanged => write!(f, "leader-settings-changed"),
            HookEvent::PebbleReady { workload } => write!(f, "{}-pebble-ready", workload),
            HookEvent::Relation(ev) => {
                write!(f, "{}-relation-{}", ev.relation.name, ev.phase.as_str())
            }
            HookEvent::Action { name } => write!(f, "action {}", name),
            HookEvent::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Full context for tools that want to show everything: a parsed event, or
/// the reason parsing failed alongside the raw environment.
#[derive(Debug, Clone)]
pub enum HookContext {
    Hook(HookEvent, JujuContext),
    Invalid {
        reason: String,
        environment: BTreeMap<String, String>,
    },
}

impl HookContext {
    pub fn from_invocation(inv: &Invocation) -> Self {
        let juju = match JujuContext::from_invocation(inv) {
            Ok(ctx) => ctx,
            Err(e) => {
                return HookContext::Invalid {
                    reason: format!("invalid Juju context: {}", e),
                    environment: inv.vars().clone(),
                };
            }
        };
        match HookEvent::from_invocation(inv) {
            Ok(event) => HookContext::Hook(event, juju),
            Err(e) => HookContext::Invalid {
                reason: format!("Juju context present but hook context absent: {}", e),
                environment: inv.vars().clone(),
            },
        }
    }
}
