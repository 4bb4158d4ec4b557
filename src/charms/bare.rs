//! The bare charm: no framework, just hook tools.
//!
//! Logs which hook or action fired, then reports itself active.

use crate::core::env::{Dispatch, Invocation};
use crate::core::error::CharmError;
use crate::core::hooktools::{HookTools, JujuLogLevel, ProcessHookTools};
use crate::core::settings::Settings;
use crate::core::status::UnitStatus;

pub const ACTIVE_MESSAGE: &str = "Woohoo!";
pub const NOTHING_SET_MESSAGE: &str = "This is odd: JUJU_HOOK_NAME nor JUJU_ACTION_NAME are set!";

pub fn main(inv: &Invocation) -> Result<(), CharmError> {
    let settings = Settings::from_invocation(inv);
    run(inv, &ProcessHookTools::new(settings.hook_tools_dir))
}

/// Status is set even when logging failed; the first error wins.
pub fn run(inv: &Invocation, tools: &dyn HookTools) -> Result<(), CharmError> {
    let logged = identify(inv, tools);
    tools.status_set(&UnitStatus::active_with(ACTIVE_MESSAGE))?;
    logged
}

pub fn identify(inv: &Invocation, tools: &dyn HookTools) -> Result<(), CharmError> {
    match Dispatch::from_names(inv) {
        Dispatch::Hook(name) => tools.juju_log(JujuLogLevel::Info, &format!("Hook: {}", name)),
        Dispatch::Action(name) => {
            tools.juju_log(JujuLogLevel::Info, &format!("Action: {}", name))
        }
        Dispatch::Unknown => tools.juju_log(JujuLogLevel::Error, NOTHING_SET_MESSAGE),
    }
}
