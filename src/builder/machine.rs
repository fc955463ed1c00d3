//! Builder for constructing machines.

use super::definition::Definition;
use super::error::BuildError;
use super::rule::{compile, Rule};
use crate::core::Resolver;
use crate::diagnostics::{Diagnostic, DiagnosticSink, Diagnostics};
use crate::events::Event;
use crate::runtime::{Handler, Machine};
use serde_json::Value;
use std::sync::Arc;

/// Builder for constructing machines with a fluent API.
///
/// # Example
///
/// ```rust
/// use statewise::builder::MachineBuilder;
/// use std::sync::{Arc, Mutex};
///
/// let visited = Arc::new(Mutex::new(Vec::new()));
/// let log = Arc::clone(&visited);
///
/// let mut machine = MachineBuilder::new()
///     .event("next: intro > form > done")
///     .transition("restart", "done", "intro")
///     .final_state("done")
///     .handler("enter", move |_, event| {
///         log.lock().unwrap().push(event.target.clone().unwrap_or_default());
///     })
///     .build()
///     .unwrap();
///
/// machine.do_action("next", vec![]).unwrap();
/// machine.do_action("next", vec![]).unwrap();
///
/// assert!(machine.is_complete());
/// assert_eq!(*visited.lock().unwrap(), vec!["form", "done"]);
/// ```
pub struct MachineBuilder {
    rules: Vec<Rule>,
    initial: Option<String>,
    final_state: Option<String>,
    defer: bool,
    debug: bool,
    handlers: Vec<(String, Handler)>,
    sink: Option<DiagnosticSink>,
}

impl MachineBuilder {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            initial: None,
            final_state: None,
            defer: false,
            debug: false,
            handlers: Vec::new(),
            sink: None,
        }
    }

    /// Seed a builder from a declarative definition.
    pub fn from_definition(definition: Definition) -> Self {
        let builder = Self::new()
            .events(definition.events)
            .defer(definition.defer)
            .debug(definition.debug);
        let builder = match definition.initial {
            Some(initial) => builder.initial(initial),
            None => builder,
        };
        match definition.final_state {
            Some(state) => builder.final_state(state),
            None => builder,
        }
    }

    /// Seed a builder from a JSON definition.
    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        Ok(Self::from_definition(Definition::from_json(json)?))
    }

    /// Add a transition rule (shorthand string or [`Rule`]).
    pub fn event(mut self, rule: impl Into<Rule>) -> Self {
        self.rules.push(rule.into());
        self
    }

    /// Add multiple transition rules at once.
    pub fn events<I, R>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Rule>,
    {
        self.rules.extend(rules.into_iter().map(Into::into));
        self
    }

    /// Add an explicit `{name, from, to}` rule.
    pub fn transition(
        self,
        name: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        self.event(Rule::new(name, from, to.into()))
    }

    /// Add a rule whose target state is chosen by `resolve` at transition time.
    pub fn resolved<F>(self, name: impl Into<String>, from: impl Into<String>, resolve: F) -> Self
    where
        F: Fn(&Machine, &[Value]) -> Result<String, String> + Send + Sync + 'static,
    {
        self.event(Rule::resolved(name, from, Resolver::new(resolve)))
    }

    /// Set the initial state (default: first discovered state).
    pub fn initial(mut self, state: impl Into<String>) -> Self {
        self.initial = Some(state.into());
        self
    }

    /// Set the state that marks the workflow as complete.
    pub fn final_state(mut self, state: impl Into<String>) -> Self {
        self.final_state = Some(state.into());
        self
    }

    /// Leave the machine unstarted until `start` or `reset` is called.
    pub fn defer(mut self, defer: bool) -> Self {
        self.defer = defer;
        self
    }

    /// Enable the diagnostic channel.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Subscribe a handler to the events matched by `id`.
    pub fn handler<F>(mut self, id: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut Machine, &Event) + Send + Sync + 'static,
    {
        self.handlers.push((id.into(), Arc::new(handler)));
        self
    }

    /// Subscribe several handlers to the same id, in order.
    pub fn handlers<I>(mut self, id: impl Into<String>, handlers: I) -> Self
    where
        I: IntoIterator<Item = Handler>,
    {
        let id = id.into();
        self.handlers
            .extend(handlers.into_iter().map(|handler| (id.clone(), handler)));
        self
    }

    /// Receive diagnostics when debugging is enabled.
    pub fn diagnostics<F>(mut self, sink: F) -> Self
    where
        F: Fn(&Diagnostic) + Send + Sync + 'static,
    {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Build the machine.
    ///
    /// Compiles the rules, registers handlers in insertion order and,
    /// unless deferred, enters the initial state and emits
    /// `system.initialize`.
    pub fn build(self) -> Result<Machine, BuildError> {
        let Self {
            rules,
            initial,
            final_state,
            defer,
            debug,
            handlers,
            sink,
        } = self;

        let tables = compile(&rules)?;
        let initial = match initial {
            Some(state) if tables.states.contains(&state) => state,
            Some(state) => return Err(BuildError::UnknownInitialState { state }),
            None => tables
                .states
                .first()
                .map(str::to_string)
                .ok_or(BuildError::NoEvents)?,
        };

        let diagnostics = Diagnostics::new(debug, sink);
        if let Some(state) = &final_state {
            if !tables.states.contains(state) {
                diagnostics.report(Diagnostic::UnknownState {
                    state: state.clone(),
                });
            }
        }

        let mut machine = Machine::new(tables, initial, final_state, diagnostics);
        for (id, handler) in handlers {
            machine
                .subscribe(&id, handler)
                .map_err(|source| BuildError::InvalidHandlerId { id, source })?;
        }

        if !defer {
            machine.start();
        }
        Ok(machine)
    }
}

impl Default for MachineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
