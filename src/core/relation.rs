//! Relation data access.
//!
//! A relation carries one key/value bag per application side (plus one per
//! unit). The local side may always be read; the local application bag may
//! only be written by the leader, and [`RelationData::local_app_set`] refuses
//! to issue the write without a leader [`Leadership`] token.

use crate::core::error::CharmError;
use crate::core::hooktools::{HookTools, RelationMember};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub name: String,
    pub id: u32,
    pub remote_app: Option<String>,
}

impl Relation {
    /// The `name:N` form hook tools expect after `-r`.
    pub fn tool_id(&self) -> String {
        format!("{}:{}", self.name, self.id)
    }
}

/// Capability token for writing application-scoped relation data.
///
/// Only obtainable from [`Model::leadership`](crate::core::model::Model::leadership),
/// which asks Juju via `is-leader`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leadership {
    is_leader: bool,
}

impl Leadership {
    pub(crate) fn from_is_leader(is_leader: bool) -> Self {
        Self { is_leader }
    }

    pub fn is_leader(&self) -> bool {
        self.is_leader
    }
}

pub struct RelationData<'a> {
    tools: &'a dyn HookTools,
    relation: &'a Relation,
    local_app: &'a str,
    local_unit: String,
}

impl<'a> RelationData<'a> {
    pub(crate) fn new(
        tools: &'a dyn HookTools,
        relation: &'a Relation,
        local_app: &'a str,
        local_unit: String,
    ) -> Self {
        Self {
            tools,
            relation,
            local_app,
            local_unit,
        }
    }

    pub fn remote_app_bag(&self) -> Result<BTreeMap<String, String>, CharmError> {
        match &self.relation.remote_app {
            Some(app) => self
                .tools
                .relation_get(self.relation, &RelationMember::App(app.clone())),
            None => Ok(BTreeMap::new()),
        }
    }

    /// Absent keys (and relations with no known remote app) read as `None`.
    pub fn remote_app_get(&self, key: &str) -> Result<Option<String>, CharmError> {
        Ok(self.remote_app_bag()?.remove(key))
    }

    pub fn local_app_get(&self, key: &str) -> Result<Option<String>, CharmError> {
        let mut bag = self.tools.relation_get(
            self.relation,
            &RelationMember::App(self.local_app.to_string()),
        )?;
        Ok(bag.remove(key))
    }

    pub fn local_app_set(
        &self,
        leadership: &Leadership,
        key: &str,
        value: &str,
    ) -> Result<(), CharmError> {
        if !leadership.is_leader() {
            return Err(CharmError::NotLeader(self.relation.tool_id()));
        }
        self.tools.relation_set(self.relation, true, key, value)
    }

    pub fn local_unit_get(&self, key: &str) -> Result<Option<String>, CharmError> {
        let mut bag = self.tools.relation_get(
            self.relation,
            &RelationMember::Unit(self.local_unit.clone()),
        )?;
        Ok(bag.remove(key))
    }

    pub fn local_unit_set(&self, key: &str, value: &str) -> Result<(), CharmError> {
        self.tools.relation_set(self.relation, false, key, value)
    }
}
