//! Serializable machine definitions.
//!
//! Definitions use a JSON format:
//!
//! ```json
//! {
//!   "events": [
//!     "next: intro > form > done",
//!     "back: intro < form",
//!     {"name": "restart", "from": ["form", "done"], "to": "intro"}
//!   ],
//!   "initial": "intro",
//!   "final": "done",
//!   "defer": false,
//!   "debug": true
//! }
//! ```
//!
//! Handlers and resolvers are code and are attached through
//! [`MachineBuilder`](super::MachineBuilder).

use super::error::BuildError;
use super::rule::Rule;
use crate::core::ActionTarget;
use serde::{de, Deserialize, Deserializer, Serialize};

/// One entry of the `events` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleDefinition {
    Shorthand(String),
    Record {
        name: String,
        #[serde(deserialize_with = "one_or_many")]
        from: Vec<String>,
        to: String,
    },
}

/// `from` of a record: a single state or a list of states.
#[derive(Deserialize)]
#[serde(untagged)]
enum Sources {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let states = match Sources::deserialize(deserializer)? {
        Sources::One(state) => vec![state],
        Sources::Many(states) => states,
    };
    if states.is_empty() {
        return Err(de::Error::invalid_length(0, &"at least one source state"));
    }
    Ok(states)
}

impl From<RuleDefinition> for Rule {
    fn from(definition: RuleDefinition) -> Self {
        match definition {
            RuleDefinition::Shorthand(text) => Rule::Shorthand(text),
            RuleDefinition::Record { name, from, to } => Rule::Record {
                name,
                from,
                to: ActionTarget::Fixed(to),
            },
        }
    }
}

/// Declarative machine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    /// Transition rules, shorthand strings or records.
    pub events: Vec<RuleDefinition>,

    /// Initial state; defaults to the first discovered state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<String>,

    /// State that marks the workflow as complete.
    #[serde(default, rename = "final", skip_serializing_if = "Option::is_none")]
    pub final_state: Option<String>,

    /// Leave the machine unstarted after construction.
    #[serde(default)]
    pub defer: bool,

    /// Enable the diagnostic channel.
    #[serde(default)]
    pub debug: bool,
}

impl Definition {
    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, BuildError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
