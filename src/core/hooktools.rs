//! Juju hook tools: the process boundary to the unit agent.
//!
//! Every interaction with Juju (logging, status, leadership, relation data,
//! charm config) is an invocation of a small command the agent puts on `PATH`
//! for the duration of a hook. [`HookTools`] is the seam; [`ProcessHookTools`]
//! runs the real commands.

use crate::core::error::CharmError;
use crate::core::relation::Relation;
use crate::core::status::UnitStatus;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum JujuLogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl JujuLogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            JujuLogLevel::Debug => "DEBUG",
            JujuLogLevel::Info => "INFO",
            JujuLogLevel::Warning => "WARNING",
            JujuLogLevel::Error => "ERROR",
            JujuLogLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for JujuLogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whose bag to read on a relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationMember {
    App(String),
    Unit(String),
}

impl RelationMember {
    pub fn name(&self) -> &str {
        match self {
            RelationMember::App(n) | RelationMember::Unit(n) => n,
        }
    }
}

pub trait HookTools: Send + Sync {
    fn juju_log(&self, level: JujuLogLevel, message: &str) -> Result<(), CharmError>;

    fn status_set(&self, status: &UnitStatus) -> Result<(), CharmError>;

    fn is_leader(&self) -> Result<bool, CharmError>;

    /// Ids of the established relations on endpoint `name`.
    fn relation_ids(&self, name: &str) -> Result<Vec<u32>, CharmError>;

    fn relation_get(
        &self,
        relation: &Relation,
        member: &RelationMember,
    ) -> Result<BTreeMap<String, String>, CharmError>;

    /// Writes one key into the local unit's bag, or the local application's
    /// bag when `app` is set.
    fn relation_set(
        &self,
        relation: &Relation,
        app: bool,
        key: &str,
        value: &str,
    ) -> Result<(), CharmError>;

    fn config_get(&self) -> Result<Map<String, Value>, CharmError>;
}

/// Runs hook tools as child processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessHookTools {
    tools_dir: Option<PathBuf>,
}

impl ProcessHookTools {
    pub fn new(tools_dir: Option<PathBuf>) -> Self {
        Self { tools_dir }
    }

    fn command_path(&self, tool: &str) -> PathBuf {
        match &self.tools_dir {
            Some(dir) => dir.join(tool),
            None => PathBuf::from(tool),
        }
    }

    fn run(&self, tool: &str, args: &[&str]) -> Result<String, CharmError> {
        let output = Command::new(self.command_path(tool))
            .args(args)
            .output()
            .map_err(CharmError::IoError)?;
        Self::finish(tool, output)
    }

    /// Runs `tool` with `input` on its stdin.
    fn run_with_input(&self, tool: &str, args: &[&str], input: &[u8]) -> Result<String, CharmError> {
        let mut child = Command::new(self.command_path(tool))
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(input)?;
        }
        let output = child.wait_with_output()?;
        Self::finish(tool, output)
    }

    fn finish(tool: &str, output: Output) -> Result<String, CharmError> {
        if !output.status.success() {
            return Err(CharmError::HookToolError {
                tool: tool.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl HookTools for ProcessHookTools {
    fn juju_log(&self, level: JujuLogLevel, message: &str) -> Result<(), CharmError> {
        self.run("juju-log", &["-l", level.as_str(), message])
            .map(|_| ())
    }

    fn status_set(&self, status: &UnitStatus) -> Result<(), CharmError> {
        let mut args = vec![status.name()];
        if let Some(msg) = status.message() {
            args.push(msg);
        }
        self.run("status-set", &args).map(|_| ())
    }

    fn is_leader(&self) -> Result<bool, CharmError> {
        let out = self.run("is-leader", &["--format=json"])?;
        parse_is_leader(&out)
    }

    fn relation_ids(&self, name: &str) -> Result<Vec<u32>, CharmError> {
        let out = self.run("relation-ids", &["--format=json", name])?;
        parse_relation_ids(&out)
    }

    fn relation_get(
        &self,
        relation: &Relation,
        member: &RelationMember,
    ) -> Result<BTreeMap<String, String>, CharmError> {
        let rel_id = relation.tool_id();
        let mut args = vec!["--format=json", "-r", rel_id.as_str()];
        if matches!(member, RelationMember::App(_)) {
            args.push("--app");
        }
        args.push("-");
        args.push(member.name());
        let out = self.run("relation-get", &args)?;
        parse_relation_bag(&out)
    }

    fn relation_set(
        &self,
        relation: &Relation,
        app: bool,
        key: &str,
        value: &str,
    ) -> Result<(), CharmError> {
        let rel_id = relation.tool_id();
        let mut args = vec!["-r", rel_id.as_str()];
        if app {
            args.push("--app");
        }
        args.extend(["--file", "-"]);
        let payload = relation_set_payload(key, value);
        self.run_with_input("relation-set", &args, payload.as_bytes())
            .map(|_| ())
    }

    fn config_get(&self) -> Result<Map<String, Value>, CharmError> {
        let out = self.run("config-get", &["--format=json"])?;
        parse_config(&out)
    }
}

/// `relation-set --file -` input: a JSON object holding the one setting.
pub(crate) fn relation_set_payload(key: &str, value: &str) -> String {
    let mut data = Map::new();
    data.insert(key.to_string(), Value::String(value.to_string()));
    Value::Object(data).to_string()
}

pub(crate) fn parse_is_leader(out: &str) -> Result<bool, CharmError> {
    Ok(serde_json::from_str::<bool>(out.trim())?)
}

pub(crate) fn parse_relation_ids(out: &str) -> Result<Vec<u32>, CharmError> {
    let raw: Option<Vec<String>> = serde_json::from_str(out.trim())?;
    raw.unwrap_or_default()
        .iter()
        .map(|id| crate::core::env::parse_relation_id(id))
        .collect()
}

/// `relation-get` prints `null` (or nothing) for an empty bag.
pub(crate) fn parse_relation_bag(out: &str) -> Result<BTreeMap<String, String>, CharmError> {
    let trimmed = out.trim();
    if trimmed.is_empty() {
        return Ok(BTreeMap::new());
    }
    let bag: Option<BTreeMap<String, String>> = serde_json::from_str(trimmed)?;
    Ok(bag.unwrap_or_default())
}

pub(crate) fn parse_config(out: &str) -> Result<Map<String, Value>, CharmError> {
    let trimmed = out.trim();
    if trimmed.is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(trimmed)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(CharmError::ValidationError(format!(
            "config-get returned a non-object: {}",
            other
        ))),
    }
}
