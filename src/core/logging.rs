//! Routes `tracing` events to the Juju debug log.
//!
//! Charm code logs with the ordinary `tracing` macros; [`JujuLogLayer`]
//! forwards each event to `juju-log` at the matching level, so the output
//! lands in `juju debug-log` next to the agent's own messages.

use crate::core::hooktools::{HookTools, JujuLogLevel};
use crate::core::settings::DEFAULT_LOG_FILTER;
use std::fmt::{self, Write as _};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::Registry;

pub struct JujuLogLayer {
    tools: Arc<dyn HookTools>,
}

impl JujuLogLayer {
    pub fn new(tools: Arc<dyn HookTools>) -> Self {
        Self { tools }
    }
}

impl<S: Subscriber> Layer<S> for JujuLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        // A failing juju-log has nowhere better to report to.
        let _ = self
            .tools
            .juju_log(juju_level(event.metadata().level()), &visitor.finish());
    }
}

pub fn juju_level(level: &Level) -> JujuLogLevel {
    match *level {
        Level::ERROR => JujuLogLevel::Error,
        Level::WARN => JujuLogLevel::Warning,
        Level::INFO => JujuLogLevel::Info,
        _ => JujuLogLevel::Debug,
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.trim_start().to_string()
        } else {
            format!("{}{}", self.message, self.fields)
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

/// A subscriber that filters with `filter` (an `EnvFilter` directive string)
/// and forwards what passes to `juju-log`.
pub fn subscriber(
    tools: Arc<dyn HookTools>,
    filter: &str,
) -> impl Subscriber + Send + Sync + use<> {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    Registry::default()
        .with(filter)
        .with(JujuLogLayer::new(tools))
}

/// Installs the forwarding subscriber for the rest of the process.
pub fn init(tools: Arc<dyn HookTools>, filter: &str) {
    if tracing::subscriber::set_global_default(subscriber(tools, filter)).is_err() {
        tracing::debug!("log forwarding already installed");
    }
}
