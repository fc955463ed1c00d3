//! Declarative transition rules and their compilation into [`Tables`].

use super::error::BuildError;
use super::shorthand::Shorthand;
use crate::core::{ActionTarget, Resolver, Tables};
use crate::events::is_name;

/// One entry of a machine's `events` list.
#[derive(Clone, Debug)]
pub enum Rule {
    /// Shorthand string such as `"next: intro > form"`.
    Shorthand(String),
    /// Explicit `{name, from, to}` record; one rule per source state.
    Record {
        name: String,
        from: Vec<String>,
        to: ActionTarget,
    },
}

impl Rule {
    pub fn new(name: impl Into<String>, from: impl Into<String>, to: impl Into<ActionTarget>) -> Self {
        Self::Record {
            name: name.into(),
            from: vec![from.into()],
            to: to.into(),
        }
    }

    /// A rule whose target state is picked by `resolver` at transition time.
    pub fn resolved(name: impl Into<String>, from: impl Into<String>, resolver: Resolver) -> Self {
        Self::Record {
            name: name.into(),
            from: vec![from.into()],
            to: ActionTarget::Resolved(resolver),
        }
    }

    /// Expand into directed `(action, from, target)` triples.
    pub fn expand(&self) -> Result<Vec<(String, String, ActionTarget)>, BuildError> {
        match self {
            Self::Shorthand(text) => {
                let shorthand = Shorthand::parse(text)?;
                let name = shorthand.name().to_string();
                Ok(shorthand
                    .edges()
                    .into_iter()
                    .map(|(from, to)| (name.clone(), from, ActionTarget::Fixed(to)))
                    .collect())
            }
            Self::Record { name, from, to } => {
                let malformed = |reason: String| BuildError::MalformedRule {
                    rule: name.clone(),
                    reason,
                };
                if !is_name(name) {
                    return Err(malformed(format!("invalid action name '{name}'")));
                }
                if from.is_empty() {
                    return Err(malformed("expected at least one source state".to_string()));
                }
                let mut states = from.iter().map(String::as_str).chain(to.fixed());
                if let Some(state) = states.find(|state| !is_name(state)) {
                    return Err(malformed(format!("invalid state name '{state}'")));
                }
                Ok(from
                    .iter()
                    .map(|state| (name.clone(), state.clone(), to.clone()))
                    .collect())
            }
        }
    }
}

impl From<&str> for Rule {
    fn from(text: &str) -> Self {
        Self::Shorthand(text.to_string())
    }
}

impl From<String> for Rule {
    fn from(text: String) -> Self {
        Self::Shorthand(text)
    }
}

impl Tables {
    /// Compile one rule into the tables.
    ///
    /// Returns the states the rule introduced, in discovery order.
    pub fn apply_rule(&mut self, rule: &Rule) -> Result<Vec<String>, BuildError> {
        let edges = rule.expand()?;
        let mut discovered = Vec::new();
        for (action, from, target) in edges {
            discovered.extend(self.insert_edge(&action, &from, target));
        }
        Ok(discovered)
    }
}

/// Compile a rule list into fresh tables.
///
/// # Example
///
/// ```rust
/// use statewise::builder::{compile, Rule};
///
/// let tables = compile(&[
///     Rule::from("next: intro > form > done"),
///     Rule::from("back: intro < form"),
/// ])
/// .unwrap();
///
/// assert_eq!(tables.states.as_slice(), &["intro", "form", "done"]);
/// assert_eq!(tables.transitions.actions_for("form"), &["next", "back"]);
/// ```
pub fn compile(rules: &[Rule]) -> Result<Tables, BuildError> {
    if rules.is_empty() {
        return Err(BuildError::NoEvents);
    }

    let mut tables = Tables::new();
    for rule in rules {
        tables.apply_rule(rule)?;
    }
    Ok(tables)
}
