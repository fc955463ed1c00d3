//! Parser for textual event ids.
//!
//! Accepted forms:
//!
//! | id                        | family     | type    | targets        |
//! |---------------------------|------------|---------|----------------|
//! | `system.change`           | system     | change  | `*`            |
//! | `change`                  | system     | change  | `*`            |
//! | `leave:intro form`        | state      | leave   | `intro`, `form`|
//! | `action.start:(next back)`| action     | start   | `next`, `back` |
//! | `state.intro.enter`       | state      | enter   | `intro`        |
//! | `intro.enter`             | state      | enter   | `intro`        |
//! | `@next`                   | action     | start   | `next`         |
//! | `#form`                   | state      | enter   | `form`         |
//! | `intro` (known state)     | state      | leave   | `intro`        |
//! | `next` (known action)     | action     | end     | `next`         |
//!
//! Type aliases win over state and action names: a state called `start`
//! can only be subscribed to through an explicit form.

use super::error::EventIdError;
use super::event::{EventKey, EventTarget, EventType, Family};

/// Names the parser can fall back on when an id is not an event type.
pub trait Lexicon {
    fn is_state(&self, name: &str) -> bool;
    fn is_action(&self, name: &str) -> bool;

    /// Whether `name` is known for events of `family`.
    fn knows(&self, family: Family, name: &str) -> bool {
        match family {
            Family::State => self.is_state(name),
            Family::Action => self.is_action(name),
            Family::System | Family::Transition => true,
        }
    }
}

/// Structured descriptor produced from an event id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventId {
    pub family: Family,
    pub kind: EventType,
    /// Never empty; an id without targets yields `[EventTarget::Any]`.
    pub targets: Vec<EventTarget>,
}

impl EventId {
    pub fn parse<L>(id: &str, lexicon: &L) -> Result<Self, EventIdError>
    where
        L: Lexicon + ?Sized,
    {
        let id = id.trim();
        if id.is_empty() {
            return Err(EventIdError::Empty);
        }

        if let Some(rest) = id.strip_prefix('@') {
            return Self::build(id, Family::Action, EventType::Start, Some(parse_targets(rest)?));
        }
        if let Some(rest) = id.strip_prefix('#') {
            return Self::build(id, Family::State, EventType::Enter, Some(parse_targets(rest)?));
        }

        let (head, targets) = match id.split_once(':') {
            Some((head, list)) => (head.trim(), Some(parse_targets(list)?)),
            None => (id, None),
        };

        let segments: Vec<&str> = head.split('.').map(str::trim).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(malformed(id));
        }

        match segments.as_slice() {
            [family, target, kind] => {
                if targets.is_some() || !is_target_token(target) {
                    return Err(malformed(id));
                }
                let family: Family = family.parse()?;
                let kind: EventType = kind.parse()?;
                Self::build(id, family, kind, Some(vec![EventTarget::from(*target)]))
            }
            [first, second] => match first.parse::<Family>() {
                Ok(family) => Self::build(id, family, second.parse()?, targets),
                Err(unknown_family) => {
                    let kind: EventType = second.parse()?;
                    let family = kind
                        .alias_family()
                        .filter(Family::is_targeted)
                        .ok_or(unknown_family)?;
                    if targets.is_some() || !is_target_token(first) {
                        return Err(malformed(id));
                    }
                    Self::build(id, family, kind, Some(vec![EventTarget::from(*first)]))
                }
            },
            [name] => Self::resolve_name(id, name, targets, lexicon),
            _ => Err(malformed(id)),
        }
    }

    /// One registry key per target.
    pub fn keys(&self) -> impl Iterator<Item = EventKey> + '_ {
        self.targets
            .iter()
            .map(|target| EventKey::new(self.family, self.kind, target.clone()))
    }

    /// Named targets the lexicon does not know.
    pub fn unknown_targets<'a, L>(&'a self, lexicon: &L) -> Vec<&'a str>
    where
        L: Lexicon + ?Sized,
    {
        self.targets
            .iter()
            .filter_map(|target| match target {
                EventTarget::Named(name) if !lexicon.knows(self.family, name) => {
                    Some(name.as_str())
                }
                _ => None,
            })
            .collect()
    }

    fn resolve_name<L>(
        id: &str,
        name: &str,
        targets: Option<Vec<EventTarget>>,
        lexicon: &L,
    ) -> Result<Self, EventIdError>
    where
        L: Lexicon + ?Sized,
    {
        if let Some((family, kind)) = name
            .parse::<EventType>()
            .ok()
            .and_then(|kind| kind.alias_family().map(|family| (family, kind)))
        {
            return Self::build(id, family, kind, targets);
        }

        let implied = if lexicon.is_state(name) {
            Some((Family::State, EventType::Leave))
        } else if lexicon.is_action(name) {
            Some((Family::Action, EventType::End))
        } else {
            None
        };

        match implied {
            Some(_) if targets.is_some() => Err(EventIdError::UnexpectedTargets {
                id: id.to_string(),
            }),
            Some((family, kind)) => Self::build(id, family, kind, Some(vec![EventTarget::named(name)])),
            None => Err(EventIdError::Unresolved {
                name: name.to_string(),
            }),
        }
    }

    fn build(
        id: &str,
        family: Family,
        kind: EventType,
        targets: Option<Vec<EventTarget>>,
    ) -> Result<Self, EventIdError> {
        if !family.accepts(kind) {
            return Err(EventIdError::TypeNotInFamily {
                family: family.to_string(),
                kind: kind.to_string(),
            });
        }

        let targets = targets.unwrap_or_else(|| vec![EventTarget::Any]);
        if !family.is_targeted() && targets.iter().any(|t| *t != EventTarget::Any) {
            return Err(EventIdError::UnexpectedTargets { id: id.to_string() });
        }

        Ok(Self {
            family,
            kind,
            targets,
        })
    }
}

fn malformed(id: &str) -> EventIdError {
    EventIdError::Malformed { id: id.to_string() }
}

/// Whether `name` can be addressed as a state or action in an event id.
pub(crate) fn is_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-'))
}

fn is_target_token(token: &str) -> bool {
    token == "*" || is_name(token)
}

/// Split `a b c` or `(a b c)` into targets; an empty list means `*`.
fn parse_targets(list: &str) -> Result<Vec<EventTarget>, EventIdError> {
    let trimmed = list.trim();
    let inner = match trimmed.strip_prefix('(') {
        Some(rest) => rest
            .strip_suffix(')')
            .ok_or_else(|| EventIdError::MalformedTargets {
                targets: trimmed.to_string(),
            })?,
        None => trimmed,
    };

    let mut targets = Vec::new();
    for token in inner.split_whitespace() {
        if !is_target_token(token) {
            return Err(EventIdError::MalformedTargets {
                targets: trimmed.to_string(),
            });
        }
        let target = EventTarget::from(token);
        if !targets.contains(&target) {
            targets.push(target);
        }
    }

    if targets.is_empty() {
        targets.push(EventTarget::Any);
    }
    Ok(targets)
}
