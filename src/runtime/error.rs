//! Runtime errors of a machine.

use crate::builder::BuildError;
use crate::events::EventIdError;
use thiserror::Error;

/// Errors returned by machine commands.
///
/// Rejected transitions are not errors; `do_action` and `go` report them
/// by returning `Ok(false)`.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("Invalid event id '{id}': {source}")]
    InvalidEventId {
        id: String,
        #[source]
        source: EventIdError,
    },

    #[error("Resolver for action '{action}' failed: {reason}")]
    ResolverFailed { action: String, reason: String },

    #[error("Resolver for action '{action}' returned unknown state '{state}'")]
    UnresolvedState { action: String, state: String },

    #[error(transparent)]
    Build(#[from] BuildError),
}
