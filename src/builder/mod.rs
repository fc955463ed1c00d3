//! Builder API for machine construction.
//!
//! Rules are written either as shorthand strings (`"next: a > b > c"`) or
//! as explicit [`Rule`] records, compiled into lookup tables and handed to
//! a [`Machine`](crate::runtime::Machine) by [`MachineBuilder`].

pub mod definition;
pub mod error;
pub mod machine;
pub mod rule;
pub mod shorthand;

pub use definition::{Definition, RuleDefinition};
pub use error::BuildError;
pub use machine::MachineBuilder;
pub use rule::{compile, Rule};
pub use shorthand::{Operator, Shorthand};
