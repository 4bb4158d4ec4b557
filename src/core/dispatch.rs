//! Event dispatch: one event in, one handler called.
//!
//! A charm implements [`Charm`] and overrides the handlers it cares about;
//! every other event is a no-op. [`dispatch`] routes a parsed [`HookEvent`]
//! to its handler, and [`run_charm`] wires the real hook tools, Pebble
//! sockets and log forwarding around a single invocation.

use crate::core::container::PebbleSockets;
use crate::core::env::{HookEvent, Invocation, JujuContext, RelationEvent, RelationPhase};
use crate::core::error::CharmError;
use crate::core::hooktools::{HookTools, ProcessHookTools};
use crate::core::logging;
use crate::core::model::Model;
use crate::core::settings::Settings;
use std::sync::Arc;

#[allow(unused_variables)]
pub trait Charm {
    fn on_install(&mut self, model: &Model) -> Result<(), CharmError> {
        Ok(())
    }

    fn on_start(&mut self, model: &Model) -> Result<(), CharmError> {
        Ok(())
    }

    fn on_stop(&mut self, model: &Model) -> Result<(), CharmError> {
        Ok(())
    }

    fn on_remove(&mut self, model: &Model) -> Result<(), CharmError> {
        Ok(())
    }

    fn on_upgrade_charm(&mut self, model: &Model) -> Result<(), CharmError> {
        Ok(())
    }

    fn on_config_changed(&mut self, model: &Model) -> Result<(), CharmError> {
        Ok(())
    }

    fn on_update_status(&mut self, model: &Model) -> Result<(), CharmError> {
        Ok(())
    }

    fn on_leader_elected(&mut self, model: &Model) -> Result<(), CharmError> {
        Ok(())
    }

    fn on_leader_settings_changed(&mut self, model: &Model) -> Result<(), CharmError> {
        Ok(())
    }

    fn on_pebble_ready(&mut self, model: &Model, workload: &str) -> Result<(), CharmError> {
        Ok(())
    }

    fn on_relation_created(&mut self, model: &Model, event: &RelationEvent) -> Result<(), CharmError> {
        Ok(())
    }

    fn on_relation_joined(&mut self, model: &Model, event: &RelationEvent) -> Result<(), CharmError> {
        Ok(())
    }

    fn on_relation_changed(&mut self, model: &Model, event: &RelationEvent) -> Result<(), CharmError> {
        Ok(())
    }

    fn on_relation_departed(
        &mut self,
        model: &Model,
        event: &RelationEvent,
    ) -> Result<(), CharmError> {
        Ok(())
    }

    fn on_relation_broken(&mut self, model: &Model, event: &RelationEvent) -> Result<(), CharmError> {
        Ok(())
    }

    fn on_action(&mut self, model: &Model, name: &str) -> Result<(), CharmError> {
        Ok(())
    }

    /// Hooks without a typed event (storage, secrets, ...).
    fn on_other(&mut self, model: &Model, hook: &str) -> Result<(), CharmError> {
        Ok(())
    }
}

pub fn dispatch<C: Charm + ?Sized>(
    charm: &mut C,
    event: &HookEvent,
    model: &Model,
) -> Result<(), CharmError> {
    tracing::debug!("Emitting Juju event {}.", event);
    match event {
        HookEvent::Install => charm.on_install(model),
        HookEvent::Start => charm.on_start(model),
        HookEvent::Stop => charm.on_stop(model),
        HookEvent::Remove => charm.on_remove(model),
        HookEvent::UpgradeCharm => charm.on_upgrade_charm(model),
        HookEvent::ConfigChanged => charm.on_config_changed(model),
        HookEvent::UpdateStatus => charm.on_update_status(model),
        HookEvent::LeaderElected => charm.on_leader_elected(model),
        HookEvent::LeaderSettingsChanged => charm.on_leader_settings_changed(model),
        HookEvent::PebbleReady { workload } => charm.on_pebble_ready(model, workload),
        HookEvent::Relation(ev) => match ev.phase {
            RelationPhase::Created => charm.on_relation_created(model, ev),
            RelationPhase::Joined => charm.on_relation_joined(model, ev),
            RelationPhase::Changed => charm.on_relation_changed(model, ev),
            RelationPhase::Departed => charm.on_relation_departed(model, ev),
            RelationPhase::Broken => charm.on_relation_broken(model, ev),
        },
        HookEvent::Action { name } => charm.on_action(model, name),
        HookEvent::Other(hook) => charm.on_other(model, hook),
    }
}

/// Handles one real invocation end to end.
pub fn run_charm<C: Charm + ?Sized>(charm: &mut C, inv: &Invocation) -> Result<(), CharmError> {
    let context = JujuContext::from_invocation(inv)?;
    let event = HookEvent::from_invocation(inv)?;

    let settings = Settings::from_invocation(inv);
    let tools: Arc<dyn HookTools> =
        Arc::new(ProcessHookTools::new(settings.hook_tools_dir.clone()));
    logging::init(tools.clone(), &settings.log_filter);

    let model = Model::new(context, tools, Arc::new(PebbleSockets::new(settings)));
    dispatch(charm, &event, &model)
}
