//! Debug diagnostic channel.
//!
//! Non-fatal problems (unknown names, rejected transitions) are reported
//! here instead of as errors. Reports are dropped unless the machine was
//! built with `debug(true)`; when enabled they are logged through
//! `tracing` and forwarded to an optional host sink.

use crate::events::Family;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// A non-fatal problem noticed by the machine.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Diagnostic {
    #[error("Unknown {family} '{name}'")]
    UnknownTarget { family: Family, name: String },

    #[error("Invalid event id '{id}': {reason}")]
    InvalidEventId { id: String, reason: String },

    #[error("Action '{action}' is not permitted from state '{state}'")]
    TransitionRejected { action: String, state: String },

    #[error("Action '{action}' rejected while another transition is in progress")]
    TransitionInFlight { action: String },

    #[error("No action leads from '{from}' to '{to}'")]
    NoRoute { from: String, to: String },

    #[error("Unknown state '{state}'")]
    UnknownState { state: String },

    #[error("Cannot {operation}: no transition in progress")]
    NotTransitioning { operation: String },
}

/// Host callback receiving diagnostics.
pub type DiagnosticSink = Arc<dyn Fn(&Diagnostic) + Send + Sync>;

/// Diagnostic channel configured at construction.
#[derive(Clone, Default)]
pub struct Diagnostics {
    debug: bool,
    sink: Option<DiagnosticSink>,
}

impl Diagnostics {
    pub fn new(debug: bool, sink: Option<DiagnosticSink>) -> Self {
        Self { debug, sink }
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn report(&self, diagnostic: Diagnostic) {
        if !self.debug {
            return;
        }
        tracing::warn!(%diagnostic, "state machine diagnostic");
        if let Some(sink) = &self.sink {
            sink(&diagnostic);
        }
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("debug", &self.debug)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn collector() -> (Arc<Mutex<Vec<Diagnostic>>>, DiagnosticSink) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let sink: DiagnosticSink = Arc::new(move |d: &Diagnostic| {
            sink_seen.lock().unwrap().push(d.clone());
        });
        (seen, sink)
    }

    #[test]
    fn silent_unless_debug() {
        let (seen, sink) = collector();
        let diagnostics = Diagnostics::new(false, Some(sink));

        diagnostics.report(Diagnostic::UnknownState {
            state: "nowhere".to_string(),
        });

        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn debug_forwards_to_sink() {
        let (seen, sink) = collector();
        let diagnostics = Diagnostics::new(true, Some(sink));

        diagnostics.report(Diagnostic::NoRoute {
            from: "a".to_string(),
            to: "c".to_string(),
        });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].to_string(), "No action leads from 'a' to 'c'");
    }

    #[test]
    fn debug_without_sink_only_logs() {
        let diagnostics = Diagnostics::new(true, None);
        diagnostics.report(Diagnostic::UnknownTarget {
            family: Family::State,
            name: "x".to_string(),
        });
        assert!(diagnostics.is_debug());
    }

    #[test]
    fn messages_name_the_family() {
        let diagnostic = Diagnostic::UnknownTarget {
            family: Family::Action,
            name: "skip".to_string(),
        };
        assert_eq!(diagnostic.to_string(), "Unknown action 'skip'");
    }
}
