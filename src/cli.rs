//! CLI struct definitions. Dispatch logic lives in `lib.rs`.

use crate::registry;
use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[clap(
    name = "juju-charm-examples",
    version = env!("CARGO_PKG_VERSION"),
    about = "Example Juju charms. A charm's dispatch script runs `juju-charm-examples run <charm>`."
)]
pub(crate) struct Cli {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Handle the current hook or action as the named charm
    Run {
        #[clap(value_parser = PossibleValuesParser::new(registry::names()))]
        charm: String,
    },
    /// List the available charms
    List,
}
