//! Runtime of a compiled machine.
//!
//! - [`Machine`] owns the current state, the compiled tables, the handler
//!   registry and at most one in-flight [`Transition`]
//! - A transition runs its phases synchronously and may be paused,
//!   resumed, cancelled or forced to end between handler invocations
//!
//! Dispatch order of a transition that runs to completion:
//!
//! 1. `transition.start`
//! 2. `state.<from>.leave`, then `state.*.leave`
//! 3. `action.<action>.start`, then `action.*.start`
//! 4. the target state is committed
//! 5. `state.<to>.enter`, then `state.*.enter`
//! 6. `action.<action>.end`, then `action.*.end`
//! 7. `system.change`, and `system.complete` if the target is final

mod error;
mod machine;
mod transition;

pub use error::MachineError;
pub use machine::{Handler, Machine};
pub use transition::{Phase, Transition};
