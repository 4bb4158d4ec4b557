//! The charm's view of its unit, application and relations for one hook.

use crate::core::container::{Container, WorkloadProvider};
use crate::core::env::JujuContext;
use crate::core::error::CharmError;
use crate::core::hooktools::HookTools;
use crate::core::relation::{Leadership, Relation, RelationData};
use crate::core::status::UnitStatus;
use serde_json::{Map, Value};
use std::sync::Arc;

pub struct Model {
    context: JujuContext,
    tools: Arc<dyn HookTools>,
    workloads: Arc<dyn WorkloadProvider>,
}

impl Model {
    pub fn new(
        context: JujuContext,
        tools: Arc<dyn HookTools>,
        workloads: Arc<dyn WorkloadProvider>,
    ) -> Self {
        Self {
            context,
            tools,
            workloads,
        }
    }

    pub fn context(&self) -> &JujuContext {
        &self.context
    }

    pub fn app_name(&self) -> &str {
        &self.context.app_name
    }

    pub fn unit_name(&self) -> String {
        self.context.unit_name()
    }

    pub fn tools(&self) -> &dyn HookTools {
        self.tools.as_ref()
    }

    pub fn set_status(&self, status: UnitStatus) -> Result<(), CharmError> {
        self.tools.status_set(&status)
    }

    pub fn is_leader(&self) -> Result<bool, CharmError> {
        self.tools.is_leader()
    }

    /// Asks Juju once and returns the answer as a write capability.
    pub fn leadership(&self) -> Result<Leadership, CharmError> {
        Ok(Leadership::from_is_leader(self.tools.is_leader()?))
    }

    /// A handle for a relation known by id, e.g. one named in a hook's context.
    pub fn relation(&self, name: &str, id: u32, remote_app: Option<&str>) -> Relation {
        Relation {
            name: name.to_string(),
            id,
            remote_app: remote_app.map(str::to_string),
        }
    }

    pub fn relations(&self, name: &str) -> Result<Vec<Relation>, CharmError> {
        Ok(self
            .tools
            .relation_ids(name)?
            .into_iter()
            .map(|id| Relation {
                name: name.to_string(),
                id,
                remote_app: None,
            })
            .collect())
    }

    pub fn relation_data<'a>(&'a self, relation: &'a Relation) -> RelationData<'a> {
        RelationData::new(
            self.tools.as_ref(),
            relation,
            &self.context.app_name,
            self.unit_name(),
        )
    }

    pub fn config(&self) -> Result<CharmConfig, CharmError> {
        Ok(CharmConfig(self.tools.config_get()?))
    }

    pub fn container(&self, name: &str) -> Container {
        Container::new(name, self.workloads.files(name))
    }
}

/// Charm configuration as returned by `config-get`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharmConfig(pub Map<String, Value>);

impl CharmConfig {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Value::as_i64)
    }
}
