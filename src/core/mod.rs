//! Framework glue shared by every example charm.
//!
//! Environment parsing, hook tools, relation data, the Pebble file bridge,
//! event dispatch, log forwarding and the in-process test harness.

pub mod container;
pub mod dispatch;
pub mod env;
pub mod error;
pub mod hooktools;
pub mod logging;
pub mod model;
pub mod pebble;
pub mod relation;
pub mod settings;
pub mod status;
pub mod testing;
