//! Errors raised while compiling a machine configuration.

use crate::events::EventIdError;
use thiserror::Error;

/// Errors that abort construction of a machine.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("No events defined. Add at least one transition rule")]
    NoEvents,

    #[error("Malformed rule '{rule}': {reason}")]
    MalformedRule { rule: String, reason: String },

    #[error("Initial state '{state}' is not declared by any rule")]
    UnknownInitialState { state: String },

    #[error("Invalid handler id '{id}': {source}")]
    InvalidHandlerId {
        id: String,
        #[source]
        source: EventIdError,
    },

    #[error("Invalid definition: {0}")]
    Definition(#[from] serde_json::Error),
}
