//! Compiled lookup tables of a machine.
//!
//! - [`ActionTable`] maps `(action, from)` to an [`ActionTarget`]
//! - [`TransitionTable`] maps a state to the actions permitted from it
//! - [`Tables`] bundles both with the discovered [`StateSet`]

use super::state::StateSet;
use super::target::ActionTarget;
use crate::events::Lexicon;
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ActionKey {
    action: String,
    from: String,
}

/// Mapping from `(action, from)` to the action's target.
///
/// Inserting an existing key replaces its target (last write wins).
#[derive(Clone, Debug, Default)]
pub struct ActionTable {
    targets: HashMap<ActionKey, ActionTarget>,
    names: Vec<String>,
}

impl ActionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, action: &str, from: &str, target: ActionTarget) {
        if !self.contains(action) {
            self.names.push(action.to_string());
        }
        self.targets.insert(
            ActionKey {
                action: action.to_string(),
                from: from.to_string(),
            },
            target,
        );
    }

    pub fn get(&self, action: &str, from: &str) -> Option<&ActionTarget> {
        self.targets.get(&ActionKey {
            action: action.to_string(),
            from: from.to_string(),
        })
    }

    /// Whether any rule declares this action name.
    pub fn contains(&self, action: &str) -> bool {
        self.names.iter().any(|n| n == action)
    }

    /// Declared action names in first-seen order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Mapping from state to the ordered list of actions permitted from it.
///
/// The list tolerates duplicates: [`TransitionTable::add`] always appends.
#[derive(Clone, Debug, Default)]
pub struct TransitionTable {
    actions: HashMap<String, Vec<String>>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, state: &str, action: &str) {
        self.actions
            .entry(state.to_string())
            .or_default()
            .push(action.to_string());
    }

    /// Actions permitted from `state`, in insertion order.
    pub fn actions_for(&self, state: &str) -> &[String] {
        self.actions.get(state).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn permits(&self, state: &str, action: &str) -> bool {
        self.actions_for(state).iter().any(|a| a == action)
    }
}

/// The states, actions and transitions of a compiled machine.
#[derive(Clone, Debug, Default)]
pub struct Tables {
    pub states: StateSet,
    pub actions: ActionTable,
    pub transitions: TransitionTable,
}

impl Tables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one directed rule `action: from -> target`.
    ///
    /// Returns the states this rule introduced, in discovery order.
    pub fn insert_edge(&mut self, action: &str, from: &str, target: ActionTarget) -> Vec<String> {
        let mut discovered = Vec::new();
        if self.states.insert(from) {
            discovered.push(from.to_string());
        }
        if let Some(to) = target.fixed() {
            if self.states.insert(to) {
                discovered.push(to.to_string());
            }
        }
        self.actions.insert(action, from, target);
        self.transitions.add(from, action);
        discovered
    }
}

impl Lexicon for Tables {
    fn is_state(&self, name: &str) -> bool {
        self.states.contains(name)
    }

    fn is_action(&self, name: &str) -> bool {
        self.actions.contains(name)
    }
}
