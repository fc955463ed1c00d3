//! Event taxonomy and the payload handed to handlers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::error::EventIdError;

/// Top-level event category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    System,
    Action,
    State,
    Transition,
}

impl Family {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Action => "action",
            Self::State => "state",
            Self::Transition => "transition",
        }
    }

    /// Whether events of this family name a concrete state or action.
    pub fn is_targeted(&self) -> bool {
        matches!(self, Self::Action | Self::State)
    }

    /// Whether `kind` is an event type this family emits.
    pub fn accepts(&self, kind: EventType) -> bool {
        use EventType::*;
        match self {
            Self::System => matches!(kind, Initialize | Change | Update | Complete | Reset),
            Self::Action => matches!(kind, Start | End),
            Self::State => matches!(kind, Leave | Enter | Add | Remove),
            Self::Transition => matches!(kind, Start | Pause | Resume | Cancel | End),
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Family {
    type Err = EventIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Self::System),
            "action" => Ok(Self::Action),
            "state" => Ok(Self::State),
            "transition" => Ok(Self::Transition),
            other => Err(EventIdError::UnknownFamily {
                family: other.to_string(),
            }),
        }
    }
}

/// The kind of event within a family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Initialize,
    Change,
    Update,
    Complete,
    Reset,
    Start,
    End,
    Leave,
    Enter,
    Add,
    Remove,
    Pause,
    Resume,
    Cancel,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Change => "change",
            Self::Update => "update",
            Self::Complete => "complete",
            Self::Reset => "reset",
            Self::Start => "start",
            Self::End => "end",
            Self::Leave => "leave",
            Self::Enter => "enter",
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Cancel => "cancel",
        }
    }

    /// Family implied by a bare type name.
    ///
    /// `initialize` has no alias and must be written as `system.initialize`.
    pub fn alias_family(&self) -> Option<Family> {
        use EventType::*;
        match self {
            Start | End => Some(Family::Action),
            Leave | Enter | Add | Remove => Some(Family::State),
            Pause | Resume | Cancel => Some(Family::Transition),
            Change | Update | Complete | Reset => Some(Family::System),
            Initialize => None,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = EventIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "initialize" => Self::Initialize,
            "change" => Self::Change,
            "update" => Self::Update,
            "complete" => Self::Complete,
            "reset" => Self::Reset,
            "start" => Self::Start,
            "end" => Self::End,
            "leave" => Self::Leave,
            "enter" => Self::Enter,
            "add" => Self::Add,
            "remove" => Self::Remove,
            "pause" => Self::Pause,
            "resume" => Self::Resume,
            "cancel" => Self::Cancel,
            other => {
                return Err(EventIdError::UnknownType {
                    kind: other.to_string(),
                })
            }
        };
        Ok(kind)
    }
}

/// Subject of a state or action event.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// The wildcard `*`, its own registry path.
    Any,
    Named(String),
}

impl EventTarget {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Any => "*",
            Self::Named(name) => name,
        }
    }
}

impl From<&str> for EventTarget {
    fn from(token: &str) -> Self {
        if token == "*" {
            Self::Any
        } else {
            Self::Named(token.to_string())
        }
    }
}

/// Structured registry key `family.target.type` (or `family.type`).
///
/// `system` and `transition` keys always carry [`EventTarget::Any`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EventKey {
    pub family: Family,
    pub kind: EventType,
    pub target: EventTarget,
}

impl EventKey {
    pub fn new(family: Family, kind: EventType, target: EventTarget) -> Self {
        Self {
            family,
            kind,
            target,
        }
    }

    pub fn any(family: Family, kind: EventType) -> Self {
        Self::new(family, kind, EventTarget::Any)
    }

    pub fn named(family: Family, kind: EventType, name: &str) -> Self {
        Self::new(family, kind, EventTarget::named(name))
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.family.is_targeted() {
            write!(f, "{}.{}.{}", self.family, self.target.as_str(), self.kind)
        } else {
            write!(f, "{}.{}", self.family, self.kind)
        }
    }
}

/// Snapshot of the transition an event belongs to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionInfo {
    pub action: String,
    pub from: String,
    pub to: String,
    pub args: Vec<Value>,
}

/// Payload passed to every handler on dispatch.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub family: Family,
    pub kind: EventType,
    /// Concrete state or action name, also set when dispatching to `*`.
    pub target: Option<String>,
    pub transition: Option<TransitionInfo>,
}

impl Event {
    pub fn new(
        family: Family,
        kind: EventType,
        target: Option<&str>,
        transition: Option<TransitionInfo>,
    ) -> Self {
        Self {
            family,
            kind,
            target: target.map(str::to_string),
            transition,
        }
    }

    /// Concrete path of this event, e.g. `state.intro.leave`.
    pub fn path(&self) -> String {
        match &self.target {
            Some(target) => format!("{}.{}.{}", self.family, target, self.kind),
            None => format!("{}.{}", self.family, self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_table_maps_short_names() {
        assert_eq!(EventType::Start.alias_family(), Some(Family::Action));
        assert_eq!(EventType::End.alias_family(), Some(Family::Action));
        assert_eq!(EventType::Leave.alias_family(), Some(Family::State));
        assert_eq!(EventType::Remove.alias_family(), Some(Family::State));
        assert_eq!(EventType::Cancel.alias_family(), Some(Family::Transition));
        assert_eq!(EventType::Update.alias_family(), Some(Family::System));
        assert_eq!(EventType::Initialize.alias_family(), None);
    }

    #[test]
    fn families_accept_their_types() {
        assert!(Family::Transition.accepts(EventType::Start));
        assert!(Family::Transition.accepts(EventType::End));
        assert!(Family::System.accepts(EventType::Initialize));
        assert!(!Family::State.accepts(EventType::Start));
        assert!(!Family::Action.accepts(EventType::Leave));
    }

    #[test]
    fn names_parse_back() {
        for kind in ["start", "end", "leave", "enter", "change", "initialize", "cancel"] {
            assert_eq!(kind.parse::<EventType>().unwrap().as_str(), kind);
        }
        assert!("bogus".parse::<EventType>().is_err());
        assert_eq!("state".parse::<Family>().unwrap(), Family::State);
        assert!("widget".parse::<Family>().is_err());
    }

    #[test]
    fn key_displays_as_path() {
        let key = EventKey::named(Family::State, EventType::Leave, "intro");
        assert_eq!(key.to_string(), "state.intro.leave");

        let key = EventKey::any(Family::Action, EventType::Start);
        assert_eq!(key.to_string(), "action.*.start");

        let key = EventKey::any(Family::System, EventType::Change);
        assert_eq!(key.to_string(), "system.change");
    }

    #[test]
    fn wildcard_token_becomes_any() {
        assert_eq!(EventTarget::from("*"), EventTarget::Any);
        assert_eq!(EventTarget::from("intro"), EventTarget::named("intro"));
    }

    #[test]
    fn event_path_uses_concrete_target() {
        let event = Event::new(Family::Action, EventType::End, Some("next"), None);
        assert_eq!(event.path(), "action.next.end");

        let event = Event::new(Family::Transition, EventType::Cancel, None, None);
        assert_eq!(event.path(), "transition.cancel");
    }
}
