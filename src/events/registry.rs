//! Ordered handler storage keyed by [`EventKey`].

use super::event::{EventKey, EventType, Family};
use std::collections::HashMap;

/// Multimap from event key to handlers in registration order.
///
/// Wildcard and literal keys are distinct: handlers registered on
/// `state.*.leave` are never returned by `get` for `state.intro.leave`.
/// [`HandlerRegistry::matching`] collects both in dispatch order.
///
/// The registry is generic over the handler type so it can store any
/// cloneable callable, typically an `Arc<dyn Fn(..)>`.
///
/// # Example
///
/// ```rust
/// use statewise::events::{EventKey, EventType, Family, HandlerRegistry};
///
/// let mut registry: HandlerRegistry<&str> = HandlerRegistry::new();
/// let key = EventKey::named(Family::State, EventType::Leave, "intro");
///
/// registry.register(key.clone(), "first");
/// registry.register(key.clone(), "second");
///
/// assert_eq!(registry.get(&key), &["first", "second"]);
/// ```
#[derive(Clone, Debug)]
pub struct HandlerRegistry<H> {
    entries: HashMap<EventKey, Vec<H>>,
}

impl<H> Default for HandlerRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> HandlerRegistry<H> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Append a handler to the list at `key`, creating the list if absent.
    pub fn register(&mut self, key: EventKey, handler: H) {
        self.entries.entry(key).or_default().push(handler);
    }

    /// Handlers registered at exactly `key`.
    pub fn get(&self, key: &EventKey) -> &[H] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of registered handlers across all keys.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<H: Clone> HandlerRegistry<H> {
    /// Owned copy of the handlers at `key`.
    ///
    /// Dispatching from a snapshot lets handlers mutate whatever owns the
    /// registry while they run.
    pub fn snapshot(&self, key: &EventKey) -> Vec<H> {
        self.get(key).to_vec()
    }

    /// Handlers to run for one concrete event, in dispatch order.
    ///
    /// For a targeted event the handlers at the literal key come first,
    /// then those at the wildcard key. Events without a target only use
    /// the wildcard key.
    pub fn matching(&self, family: Family, kind: EventType, target: Option<&str>) -> Vec<H> {
        let mut handlers = match target {
            Some(name) => self.snapshot(&EventKey::named(family, kind, name)),
            None => Vec::new(),
        };
        handlers.extend_from_slice(self.get(&EventKey::any(family, kind)));
        handlers
    }
}
