//! Forward `tracing` events into a [`Logger`]
//!
//! Only the `message` field is kept; other fields are dropped. Levels map
//! TRACE/DEBUG to debug, INFO/WARN to info and ERROR to error. Events from
//! this crate are skipped so the engine's own diagnostics cannot loop back.

use std::fmt;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::format::Caller;
use crate::logger::Logger;
use crate::severity::Severity;

/// Target of this crate's own events
const OWN_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Whether `target` is this crate or one of its modules, not a crate that
/// merely shares the name as a prefix
fn is_own_target(target: &str) -> bool {
    match target.strip_prefix(OWN_TARGET) {
        Some(rest) => rest.is_empty() || rest.starts_with("::"),
        None => false,
    }
}

/// A `tracing_subscriber` layer writing events through a [`Logger`]
#[derive(Debug, Clone)]
pub struct LevelogLayer {
    logger: Arc<Logger>,
}

impl LevelogLayer {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        }
    }
}

impl<S: Subscriber> Layer<S> for LevelogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if is_own_target(metadata.target()) {
            return;
        }

        let severity = Severity::from(*metadata.level());
        if !self.logger.enabled(severity) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let Some(message) = visitor.message else {
            return;
        };

        let caller = Caller {
            file: metadata.file(),
            line: metadata.line(),
            function: metadata.module_path(),
        };
        // Already formatted by tracing: no placeholder arguments
        self.logger.dispatch(severity, &caller, &message, &[]);
    }
}
