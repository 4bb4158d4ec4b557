//! Charm registration: maps the name a `dispatch` shim passes to the entry
//! point that handles the invocation.
//!
//! Adding a charm: append one entry to `CHARMS`.

use crate::charms::{bare, hook_printer, push_nested, relation_departed};
use crate::core::env::Invocation;
use crate::core::error::CharmError;

pub struct CharmEntry {
    pub name: &'static str,
    pub summary: &'static str,
    pub run: fn(&Invocation) -> Result<(), CharmError>,
}

pub const CHARMS: &[CharmEntry] = &[
    CharmEntry {
        name: "bare",
        summary: "Log the hook or action name via juju-log, then set active status",
        run: bare::main,
    },
    CharmEntry {
        name: "hook-printer",
        summary: "Print the parsed hook context, or the raw environment if it does not parse",
        run: hook_printer::main,
    },
    CharmEntry {
        name: "provider",
        summary: "Leader-gated application relation data on relation-departed",
        run: relation_departed::provider_main,
    },
    CharmEntry {
        name: "requirer",
        summary: "Counterpart of provider; logs relation-departed",
        run: relation_departed::requirer_main,
    },
    CharmEntry {
        name: "blank",
        summary: "Goes active on start and does nothing else",
        run: relation_departed::blank_main,
    },
    CharmEntry {
        name: "push-nested-subdirs",
        summary: "Push files into nested, not-yet-existing workload directories and read them back",
        run: push_nested::main,
    },
];

pub fn find(name: &str) -> Option<&'static CharmEntry> {
    CHARMS.iter().find(|c| c.name == name)
}

pub fn names() -> impl Iterator<Item = &'static str> {
    CHARMS.iter().map(|c| c.name)
}
