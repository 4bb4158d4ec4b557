use std::env;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CharmError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Environment variable error: {0}")]
    EnvVarError(#[from] env::VarError),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Hook tool '{tool}' failed (exit code {code:?}): {stderr}")]
    HookToolError {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("Invalid hook context: {0}")]
    ContextError(String),
    #[error("Unit is not the leader; refusing to write application data on relation '{0}'")]
    NotLeader(String),
    #[error("Pebble error: {0}")]
    PebbleError(#[from] PebbleError),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Failures reported by (or while talking to) a workload's Pebble daemon.
#[derive(Error, Debug)]
pub enum PebbleError {
    /// The socket could not be reached or the exchange broke off midway.
    #[error("cannot connect to Pebble: {0}")]
    Connection(#[source] io::Error),
    /// A non-2xx response with Pebble's error envelope.
    #[error("API error {status_code} ({kind}): {message}")]
    Api {
        status_code: u16,
        kind: String,
        message: String,
    },
    /// A per-path failure inside an otherwise successful files request.
    #[error("{kind} on {path}: {message}")]
    Path {
        path: String,
        kind: String,
        message: String,
    },
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("cannot decode {path} as UTF-8")]
    Decode { path: String },
}

impl PebbleError {
    pub fn is_not_found(&self) -> bool {
        match self {
            PebbleError::Path { kind, .. } | PebbleError::Api { kind, .. } => kind == "not-found",
            _ => false,
        }
    }
}
