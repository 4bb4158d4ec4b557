//! Prints whatever Juju told this process, parsed as far as it will go.

use crate::core::env::{HookContext, HookEvent, Invocation};
use crate::core::error::CharmError;
use std::io::{self, Write};

pub fn main(inv: &Invocation) -> Result<(), CharmError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(inv, &mut out)
}

pub fn run(inv: &Invocation, out: &mut dyn Write) -> Result<(), CharmError> {
    let ctx = HookContext::from_invocation(inv);
    if let HookContext::Hook(HookEvent::Install, _) = &ctx {
        writeln!(out, "Custom on_install hook")?;
    }

    match &ctx {
        HookContext::Hook(event, juju) => {
            writeln!(out, "Hello Juju: {} on {} ({:?})", event, juju.unit_name(), ctx)?;
        }
        HookContext::Invalid {
            reason,
            environment,
        } => {
            writeln!(out, "Hello Juju: {}", reason)?;
            for (key, value) in environment {
                writeln!(out, "  env {}={}", key, value)?;
            }
            for (i, arg) in inv.args().iter().enumerate() {
                writeln!(out, "  argv[{}]={}", i, arg)?;
            }
        }
    }
    Ok(())
}
