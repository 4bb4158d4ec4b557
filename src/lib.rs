//! Example charms for Juju, written against a small Rust charm framework.
//!
//! Juju runs a charm once per lifecycle event: it starts a process, describes
//! the event through `JUJU_*` environment variables, and expects the process
//! to talk back through hook tools (`juju-log`, `status-set`, `relation-get`,
//! ...) and, on Kubernetes, through the Pebble daemon of each workload
//! container. Each invocation handles exactly one event and exits.
//!
//! # Charms
//!
//! - `bare`: logs `Hook: <name>` / `Action: <name>` via `juju-log`, then
//!   sets `active` status.
//! - `hook-printer`: prints the parsed hook context (or the raw environment).
//! - `provider` / `requirer` / `blank`: leader-gated application relation
//!   data on `relation-departed`, active status on workload ready.
//! - `push-nested-subdirs`: pushes files into not-yet-existing directories of
//!   the workload container and reads them back.
//!
//! # Usage
//!
//! ```bash
//! # dispatch script of a packaged charm
//! exec ./bin/juju-charm-examples run provider
//!
//! # what is available
//! juju-charm-examples list
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: environment parsing, hook tools, relation data, Pebble, dispatch
//! - [`charms`]: the example charms
//! - [`registry`]: charm name → entry point

pub mod charms;
mod cli;
pub mod core;
pub mod registry;

use clap::Parser;
use cli::{Cli, Command};
use colored::Colorize;
use crate::core::env::Invocation;
use crate::core::error::CharmError;

pub fn run() -> Result<(), CharmError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run { charm } => {
            let entry = registry::find(&charm)
                .ok_or_else(|| CharmError::ValidationError(format!("unknown charm '{}'", charm)))?;
            (entry.run)(&Invocation::from_process())
        }
        Command::List => {
            for entry in registry::CHARMS {
                println!("{:<22} {}", entry.name.bold(), entry.summary);
            }
            Ok(())
        }
    }
}
