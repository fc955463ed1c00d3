//! Lifecycle events and subscriptions.
//!
//! Events are addressed by a structured key made of a family (`system`,
//! `action`, `state`, `transition`), a type and, for state and action
//! events, a target name or the `*` wildcard. Hosts subscribe with compact
//! textual ids which [`EventId::parse`] turns into those keys.

mod error;
mod event;
mod id;
mod registry;

pub use error::EventIdError;
pub use event::{Event, EventKey, EventTarget, EventType, Family, TransitionInfo};
pub use id::{EventId, Lexicon};
pub(crate) use id::is_name;
pub use registry::HandlerRegistry;
