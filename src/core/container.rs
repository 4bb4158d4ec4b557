//! Workload containers and the file bridge into them.

use crate::core::error::{CharmError, PebbleError};
use crate::core::pebble::PebbleClient;
use crate::core::settings::Settings;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushOptions {
    /// Create missing parent directories.
    pub make_dirs: bool,
    /// Unix permission bits for the new file.
    pub permissions: Option<u32>,
}

/// File access into one workload container.
pub trait WorkloadFiles: Send + Sync {
    fn can_connect(&self) -> bool;

    fn push(&self, path: &str, content: &[u8], options: &PushOptions) -> Result<(), CharmError>;

    fn pull(&self, path: &str) -> Result<Vec<u8>, CharmError>;
}

/// Resolves a container name to its file bridge.
pub trait WorkloadProvider: Send + Sync {
    fn files(&self, container: &str) -> Arc<dyn WorkloadFiles>;
}

/// Pebble sockets laid out as `<dir>/<container>/pebble.socket`.
#[derive(Debug, Clone)]
pub struct PebbleSockets {
    settings: Settings,
}

impl PebbleSockets {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

impl WorkloadProvider for PebbleSockets {
    fn files(&self, container: &str) -> Arc<dyn WorkloadFiles> {
        Arc::new(PebbleClient::new(
            self.settings.pebble_socket(container),
            self.settings.pebble_timeout,
        ))
    }
}

#[derive(Clone)]
pub struct Container {
    name: String,
    files: Arc<dyn WorkloadFiles>,
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container").field("name", &self.name).finish()
    }
}

impl Container {
    pub fn new(name: impl Into<String>, files: Arc<dyn WorkloadFiles>) -> Self {
        Self {
            name: name.into(),
            files,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn can_connect(&self) -> bool {
        self.files.can_connect()
    }

    pub fn push(&self, path: &str, content: &[u8], options: &PushOptions) -> Result<(), CharmError> {
        self.files.push(path, content, options)
    }

    pub fn push_text(&self, path: &str, content: &str, make_dirs: bool) -> Result<(), CharmError> {
        let options = PushOptions {
            make_dirs,
            ..PushOptions::default()
        };
        self.files.push(path, content.as_bytes(), &options)
    }

    pub fn pull(&self, path: &str) -> Result<Vec<u8>, CharmError> {
        self.files.pull(path)
    }

    pub fn pull_text(&self, path: &str) -> Result<String, CharmError> {
        let bytes = self.files.pull(path)?;
        String::from_utf8(bytes).map_err(|_| {
            CharmError::PebbleError(PebbleError::Decode {
                path: path.to_string(),
            })
        })
    }
}
