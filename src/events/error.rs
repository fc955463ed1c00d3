//! Event-id parse errors.

use thiserror::Error;

/// Errors produced when an event id cannot be turned into a subscription.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EventIdError {
    #[error("Event id is empty")]
    Empty,

    #[error("Unknown event family '{family}', expected system, action, state or transition")]
    UnknownFamily { family: String },

    #[error("Unknown event type '{kind}'")]
    UnknownType { kind: String },

    #[error("Event type '{kind}' does not belong to family '{family}'")]
    TypeNotInFamily { family: String, kind: String },

    #[error("'{name}' is neither an event type nor a known state or action")]
    Unresolved { name: String },

    #[error("Event '{id}' does not take targets")]
    UnexpectedTargets { id: String },

    #[error("Malformed target list '{targets}'")]
    MalformedTargets { targets: String },

    #[error("Malformed event id '{id}'")]
    Malformed { id: String },
}
