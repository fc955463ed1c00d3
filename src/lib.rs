//! Statewise: an event-driven finite state machine for workflows
//!
//! A machine is configured with named actions that move it between named
//! states. Hosts observe and steer every transition through lifecycle
//! events, and a transition can be paused, resumed, cancelled or forced to
//! end from inside its own handlers.
//!
//! # Core Concepts
//!
//! - **Rules**: shorthand strings such as `"next: intro > form > done"` or
//!   explicit `{name, from, to}` records
//! - **Events**: `system`, `action`, `state` and `transition` lifecycle
//!   events, subscribed to with compact ids like `"form"`, `"@next"` or
//!   `"state.enter: form done"`
//! - **Transitions**: at most one in flight; its handlers run one at a time
//! - **History**: immutable log of committed transitions
//!
//! # Example
//!
//! ```rust
//! use statewise::MachineBuilder;
//! use std::sync::{Arc, Mutex};
//!
//! let log = Arc::new(Mutex::new(Vec::new()));
//! let events = Arc::clone(&log);
//!
//! let mut machine = MachineBuilder::new()
//!     .event("next: intro > form > done")
//!     .event("back: intro < form")
//!     .final_state("done")
//!     .handler("form", move |_, event| {
//!         events.lock().unwrap().push(event.path());
//!     })
//!     .build()
//!     .unwrap();
//!
//! machine.do_action("next", vec![]).unwrap();
//! machine.do_action("back", vec![]).unwrap();
//!
//! assert_eq!(machine.state(), "intro");
//! assert_eq!(*log.lock().unwrap(), vec!["state.form.leave"]);
//! assert_eq!(machine.history().get_path(), vec!["intro", "form", "intro"]);
//! ```

pub mod builder;
pub mod core;
pub mod diagnostics;
pub mod events;
pub mod runtime;

// Re-export commonly used types
pub use builder::{BuildError, Definition, MachineBuilder, Rule};
pub use crate::core::{ActionTarget, Resolver, StateHistory, TransitionRecord};
pub use diagnostics::Diagnostic;
pub use events::{Event, EventId, EventType, Family, TransitionInfo};
pub use runtime::{Handler, Machine, MachineError, Phase, Transition};
