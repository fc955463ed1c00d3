//! Ordered set of declared state names.
//!
//! States are opaque names discovered while compiling transition rules.
//! The set keeps first-seen order, which also decides the default initial
//! state of a machine.

use serde::{Deserialize, Serialize};

/// Ordered, duplicate-free collection of state names.
///
/// # Example
///
/// ```rust
/// use statewise::core::StateSet;
///
/// let mut states = StateSet::new();
/// assert!(states.insert("intro"));
/// assert!(states.insert("form"));
/// assert!(!states.insert("intro"));
///
/// assert_eq!(states.first(), Some("intro"));
/// assert_eq!(states.as_slice(), &["intro".to_string(), "form".to_string()]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateSet {
    names: Vec<String>,
}

impl StateSet {
    pub fn new() -> Self {
        Self { names: Vec::new() }
    }

    /// Add a state, returning `true` if it was not already present.
    ///
    /// Existing states keep their original position.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.names.push(name);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// The first discovered state, used as the default initial state.
    pub fn first(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
