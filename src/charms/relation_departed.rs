//! Provider/requirer pair exercising application relation data on
//! `relation-departed`, plus the blank charm used as their scaffold.

use crate::core::dispatch::{Charm, run_charm};
use crate::core::env::{Invocation, RelationEvent};
use crate::core::error::CharmError;
use crate::core::model::Model;
use crate::core::status::UnitStatus;

pub const WORKLOAD: &str = "workload";
pub const RELATION: &str = "some-regular-relation";

/// Key the leader reads from the requirer's application bag.
pub const REQUIRER_KEY: &str = "requirer-key";
/// Key a non-leader reads from the requirer's application bag.
pub const FOLLOWER_KEY: &str = "key";
pub const PROVIDER_KEY: &str = "provider-key";
pub const PROVIDER_VALUE: &str = "value";

#[derive(Debug, Default)]
pub struct ProviderCharm {
    /// What the last departed handler read from the remote app.
    pub last_read: Option<String>,
}

impl Charm for ProviderCharm {
    fn on_pebble_ready(&mut self, model: &Model, workload: &str) -> Result<(), CharmError> {
        if workload != WORKLOAD {
            return Ok(());
        }
        model.set_status(UnitStatus::active())
    }

    fn on_relation_departed(
        &mut self,
        model: &Model,
        event: &RelationEvent,
    ) -> Result<(), CharmError> {
        if event.relation.name != RELATION {
            return Ok(());
        }
        let data = model.relation_data(&event.relation);
        let leadership = model.leadership()?;

        if leadership.is_leader() {
            tracing::info!("Leader attempts to read remote app relation data...");
            self.last_read = data.remote_app_get(REQUIRER_KEY)?;
            tracing::info!("Leader read remote app relation data");

            tracing::info!("Leader attempts to write its own relation app data...");
            data.local_app_set(&leadership, PROVIDER_KEY, PROVIDER_VALUE)?;
            tracing::info!("Leader wrote its own relation data");
        } else {
            tracing::info!("Non-leader attempts to read remote app relation data...");
            self.last_read = data.remote_app_get(FOLLOWER_KEY)?;
            tracing::info!("Non-leader read remote app relation data");
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RequirerCharm;

impl Charm for RequirerCharm {
    fn on_pebble_ready(&mut self, model: &Model, workload: &str) -> Result<(), CharmError> {
        if workload != WORKLOAD {
            return Ok(());
        }
        model.set_status(UnitStatus::active())
    }

    fn on_relation_departed(
        &mut self,
        _model: &Model,
        event: &RelationEvent,
    ) -> Result<(), CharmError> {
        if event.relation.name == RELATION {
            tracing::info!("Requirer in relation departed");
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct BlankCharm;

impl Charm for BlankCharm {
    fn on_start(&mut self, model: &Model) -> Result<(), CharmError> {
        model.set_status(UnitStatus::active())
    }
}

pub fn provider_main(inv: &Invocation) -> Result<(), CharmError> {
    run_charm(&mut ProviderCharm::default(), inv)
}

pub fn requirer_main(inv: &Invocation) -> Result<(), CharmError> {
    run_charm(&mut RequirerCharm, inv)
}

pub fn blank_main(inv: &Invocation) -> Result<(), CharmError> {
    run_charm(&mut BlankCharm, inv)
}
