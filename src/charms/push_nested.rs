//! Pushes files into a workload container, creating parent directories, and
//! reads them back.

use crate::core::container::Container;
use crate::core::dispatch::{Charm, run_charm};
use crate::core::env::Invocation;
use crate::core::error::CharmError;
use crate::core::model::Model;

pub const WORKLOAD: &str = "workload";
pub const CONTENT: &str = "Way up high";
pub const MOUNTED_PATH: &str = "/mounted-storage/somewhere/over/the/rainbow.txt";
pub const ELSEWHERE_PATH: &str = "/somewhere/over/the/rainbow.txt";

#[derive(Debug, Default)]
pub struct PushNestedCharm;

impl Charm for PushNestedCharm {
    fn on_config_changed(&mut self, model: &Model) -> Result<(), CharmError> {
        let container = model.container(WORKLOAD);
        if !container.can_connect() {
            return Ok(());
        }
        attempt_push(&container)
    }
}

pub fn attempt_push(container: &Container) -> Result<(), CharmError> {
    for path in [MOUNTED_PATH, ELSEWHERE_PATH] {
        tracing::info!("Attempting to push to {}", path);
        push(container, path, CONTENT)?;
        let pulled = pull(container, path)?;
        if pulled.as_deref() != Some(CONTENT) {
            return Err(CharmError::ValidationError(format!(
                "read back {:?} from {}, expected {:?}",
                pulled, path, CONTENT
            )));
        }
    }
    Ok(())
}

/// Text content of `path`, or `None` on any Pebble failure: missing file,
/// unreadable path, undecodable content or an unreachable socket.
pub fn pull(container: &Container, path: &str) -> Result<Option<String>, CharmError> {
    match container.pull_text(path) {
        Ok(content) => Ok(Some(content)),
        Err(CharmError::PebbleError(e)) => {
            tracing::debug!("pull {} from {}: {}", path, container.name(), e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

pub fn push(container: &Container, path: &str, content: &str) -> Result<(), CharmError> {
    tracing::info!("Pushing with make_dirs: {}", path);
    container.push_text(path, content, true)
}

pub fn main(inv: &Invocation) -> Result<(), CharmError> {
    run_charm(&mut PushNestedCharm, inv)
}
