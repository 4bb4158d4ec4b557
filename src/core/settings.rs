//! Runtime settings, read from environment knobs.

use crate::core::env::Invocation;
use std::path::PathBuf;
use std::time::Duration;

pub const HOOK_TOOLS_DIR_ENV: &str = "CHARM_HOOK_TOOLS_DIR";
pub const PEBBLE_SOCKET_DIR_ENV: &str = "CHARM_PEBBLE_SOCKET_DIR";
pub const PEBBLE_TIMEOUT_SECS_ENV: &str = "CHARM_PEBBLE_TIMEOUT_SECS";
pub const LOG_FILTER_ENV: &str = "JUJU_CHARM_LOG";

pub const DEFAULT_PEBBLE_SOCKET_DIR: &str = "/charm/containers";
pub const DEFAULT_PEBBLE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_FILTER: &str = "debug";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Where to find hook tools; `None` means rely on `PATH`.
    pub hook_tools_dir: Option<PathBuf>,
    /// Parent of `<container>/pebble.socket`.
    pub pebble_socket_dir: PathBuf,
    pub pebble_timeout: Duration,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hook_tools_dir: None,
            pebble_socket_dir: PathBuf::from(DEFAULT_PEBBLE_SOCKET_DIR),
            pebble_timeout: Duration::from_secs(DEFAULT_PEBBLE_TIMEOUT_SECS),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Settings {
    /// Unparseable values fall back to the defaults.
    pub fn from_invocation(inv: &Invocation) -> Self {
        let defaults = Settings::default();
        Self {
            hook_tools_dir: inv.var(HOOK_TOOLS_DIR_ENV).map(PathBuf::from),
            pebble_socket_dir: inv
                .var(PEBBLE_SOCKET_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.pebble_socket_dir),
            pebble_timeout: inv
                .var(PEBBLE_TIMEOUT_SECS_ENV)
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.pebble_timeout),
            log_filter: inv
                .var(LOG_FILTER_ENV)
                .map(str::to_string)
                .unwrap_or(defaults.log_filter),
        }
    }

    pub fn pebble_socket(&self, container: &str) -> PathBuf {
        self.pebble_socket_dir.join(container).join("pebble.socket")
    }
}
