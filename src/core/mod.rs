//! Data model of the state machine.
//!
//! This module contains the pieces the configuration compiler produces and
//! the machine consults at runtime:
//! - `StateSet`: declared states in first-seen order
//! - `ActionTarget` / `Resolver`: fixed or dynamically resolved targets
//! - `Tables`: actions and transitions lookup tables
//! - `StateHistory`: log of committed transitions

mod history;
mod state;
mod tables;
mod target;

pub use history::{StateHistory, TransitionRecord};
pub use state::StateSet;
pub use tables::{ActionTable, Tables, TransitionTable};
pub use target::{ActionTarget, Resolver};
