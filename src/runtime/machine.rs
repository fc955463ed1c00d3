//! The state machine facade.

use super::error::MachineError;
use super::transition::{Phase, Transition};
use crate::builder::Rule;
use crate::core::{ActionTarget, StateHistory, StateSet, Tables, TransitionRecord};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::events::{
    Event, EventId, EventIdError, EventType, Family, HandlerRegistry, TransitionInfo,
};
use chrono::Utc;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Callable subscribed to an event.
///
/// Handlers run synchronously and may call back into the machine, for
/// example to pause or cancel the transition that is dispatching them.
pub type Handler = Arc<dyn Fn(&mut Machine, &Event) + Send + Sync>;

/// Finite state machine driving a named workflow.
///
/// Build one with [`MachineBuilder`](crate::builder::MachineBuilder).
///
/// # Example
///
/// ```rust
/// use statewise::builder::MachineBuilder;
///
/// let mut machine = MachineBuilder::new()
///     .event("next: intro > form > done")
///     .event("back: intro < form")
///     .final_state("done")
///     .build()
///     .unwrap();
///
/// assert_eq!(machine.state(), "intro");
/// assert!(machine.can("next"));
/// assert!(machine.cannot("back"));
///
/// assert!(machine.do_action("next", vec![]).unwrap());
/// assert_eq!(machine.state(), "form");
///
/// assert!(machine.go("done").unwrap());
/// assert!(machine.is_complete());
/// ```
pub struct Machine {
    state: String,
    initial: String,
    final_state: Option<String>,
    tables: Tables,
    handlers: HandlerRegistry<Handler>,
    transition: Option<Transition>,
    history: StateHistory,
    diagnostics: Diagnostics,
    next_transition_id: u64,
}

impl Machine {
    /// Create an unstarted machine over compiled tables.
    pub(crate) fn new(
        tables: Tables,
        initial: String,
        final_state: Option<String>,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            state: String::new(),
            initial,
            final_state,
            tables,
            handlers: HandlerRegistry::new(),
            transition: None,
            history: StateHistory::new(),
            diagnostics,
            next_transition_id: 0,
        }
    }

    // Queries

    /// Current committed state; empty until the machine is started.
    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn states(&self) -> &StateSet {
        &self.tables.states
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn initial_state(&self) -> &str {
        &self.initial
    }

    pub fn final_state(&self) -> Option<&str> {
        self.final_state.as_deref()
    }

    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    /// The in-flight transition, if any.
    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    /// Whether `action` is permitted from the current state.
    pub fn can(&self, action: &str) -> bool {
        if !self.tables.actions.contains(action) {
            self.diagnostics.report(Diagnostic::UnknownTarget {
                family: Family::Action,
                name: action.to_string(),
            });
            return false;
        }
        self.tables.transitions.permits(&self.state, action)
    }

    pub fn cannot(&self, action: &str) -> bool {
        !self.can(action)
    }

    pub fn is(&self, state: &str) -> bool {
        self.state == state
    }

    /// Whether `state` was declared by any rule.
    pub fn has(&self, state: &str) -> bool {
        self.tables.states.contains(state)
    }

    /// Actions permitted from `state` (default: current state), without
    /// duplicates, in declaration order.
    pub fn actions_for(&self, state: Option<&str>) -> Vec<String> {
        let Some(state) = self.known_state(state) else {
            return Vec::new();
        };
        let mut actions: Vec<String> = Vec::new();
        for action in self.tables.transitions.actions_for(state) {
            if !actions.contains(action) {
                actions.push(action.clone());
            }
        }
        actions
    }

    /// Actions permitted from `state` paired with their targets.
    pub fn action_map_for(&self, state: Option<&str>) -> Vec<(String, ActionTarget)> {
        let Some(source) = self.known_state(state) else {
            return Vec::new();
        };
        self.actions_for(Some(source))
            .into_iter()
            .filter_map(|action| {
                let target = self.tables.actions.get(&action, source)?.clone();
                Some((action, target))
            })
            .collect()
    }

    /// States reachable in one step from `state` (default: current state).
    ///
    /// Targets chosen by resolvers are unknown until a transition starts
    /// and are not included.
    pub fn states_for(&self, state: Option<&str>) -> Vec<String> {
        let mut states: Vec<String> = Vec::new();
        for (_, target) in self.action_map_for(state) {
            if let Some(to) = target.fixed() {
                if !states.iter().any(|s| s == to) {
                    states.push(to.to_string());
                }
            }
        }
        states
    }

    /// First action permitted from the current state that leads to `target`.
    pub fn action_for_state(&self, target: &str) -> Option<String> {
        self.tables
            .transitions
            .actions_for(&self.state)
            .iter()
            .find(|action| {
                self.tables
                    .actions
                    .get(action, &self.state)
                    .and_then(ActionTarget::fixed)
                    == Some(target)
            })
            .cloned()
    }

    pub fn is_started(&self) -> bool {
        !self.state.is_empty()
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.transition.as_ref().is_some_and(Transition::is_paused)
    }

    pub fn is_complete(&self) -> bool {
        self.final_state
            .as_deref()
            .is_some_and(|state| state == self.state)
    }

    // Commands

    /// Perform `action` from the current state.
    ///
    /// Returns `Ok(false)` if the action is not permitted or another
    /// transition is in flight, and `Ok(true)` once the transition started.
    /// A started transition may still be paused by one of its handlers.
    /// A failing resolver aborts the transition and leaves the state as is.
    pub fn do_action(&mut self, action: &str, args: Vec<Value>) -> Result<bool, MachineError> {
        if let Some(active) = &self.transition {
            tracing::debug!(action, active = active.action(), "transition in flight");
            self.diagnostics.report(Diagnostic::TransitionInFlight {
                action: action.to_string(),
            });
            return Ok(false);
        }

        let target = match self.tables.actions.get(action, &self.state) {
            Some(target) if self.tables.transitions.permits(&self.state, action) => target.clone(),
            _ => {
                self.diagnostics.report(Diagnostic::TransitionRejected {
                    action: action.to_string(),
                    state: self.state.clone(),
                });
                return Ok(false);
            }
        };

        let to = match target {
            ActionTarget::Fixed(state) => state,
            ActionTarget::Resolved(resolver) => {
                let state =
                    resolver
                        .resolve(self, &args)
                        .map_err(|reason| MachineError::ResolverFailed {
                            action: action.to_string(),
                            reason,
                        })?;
                if !self.has(&state) {
                    return Err(MachineError::UnresolvedState {
                        action: action.to_string(),
                        state,
                    });
                }
                state
            }
        };

        self.next_transition_id += 1;
        let transition = Transition::new(self.next_transition_id, action, &self.state, &to, args);
        tracing::debug!(
            id = transition.id(),
            action,
            from = transition.from(),
            to = transition.to(),
            "transition started"
        );
        self.transition = Some(transition);
        self.queue_phase();
        self.drive();
        Ok(true)
    }

    /// Perform the first action that leads from the current state to `state`.
    ///
    /// On a deferred machine that was never started, enters `state`
    /// directly and emits `system.initialize` as `start` does.
    pub fn go(&mut self, state: &str) -> Result<bool, MachineError> {
        if !self.has(state) {
            self.diagnostics.report(Diagnostic::UnknownState {
                state: state.to_string(),
            });
            return Ok(false);
        }
        if !self.is_started() {
            self.initialize(state.to_string());
            return Ok(true);
        }
        match self.action_for_state(state) {
            Some(action) => self.do_action(&action, Vec::new()),
            None => {
                self.diagnostics.report(Diagnostic::NoRoute {
                    from: self.state.clone(),
                    to: state.to_string(),
                });
                Ok(false)
            }
        }
    }

    /// Pause the in-flight transition before its next handler.
    pub fn pause(&mut self) -> bool {
        let Some(transition) = self.transition.as_mut() else {
            self.not_transitioning("pause");
            return false;
        };
        if !transition.pause() {
            return false;
        }
        let info = transition.info();
        tracing::debug!(action = %info.action, phase = ?transition.phase(), "transition paused");
        self.emit(Family::Transition, EventType::Pause, None, Some(info));
        true
    }

    /// Continue a paused transition from where it stopped.
    pub fn resume(&mut self) -> bool {
        let Some(transition) = self.transition.as_mut() else {
            self.not_transitioning("resume");
            return false;
        };
        if !transition.resume() {
            return false;
        }
        let info = transition.info();
        tracing::debug!(action = %info.action, phase = ?transition.phase(), "transition resumed");
        self.emit(Family::Transition, EventType::Resume, None, Some(info));
        self.drive();
        true
    }

    /// Discard the in-flight transition and restore its source state.
    pub fn cancel(&mut self) -> bool {
        let Some(transition) = self.transition.take() else {
            self.not_transitioning("cancel");
            return false;
        };
        tracing::debug!(
            action = transition.action(),
            phase = ?transition.phase(),
            "transition cancelled"
        );
        self.state = transition.from().to_string();
        self.emit(
            Family::Transition,
            EventType::Cancel,
            None,
            Some(transition.info()),
        );
        true
    }

    /// Commit the in-flight transition's target without running its
    /// remaining handlers.
    pub fn end(&mut self) -> bool {
        if self.transition.is_none() {
            self.not_transitioning("end");
            return false;
        }
        self.finish(true);
        true
    }

    /// Hard-set the state to `initial` (default: the configured initial
    /// state), discarding any in-flight transition without running its
    /// handlers. The history starts over from the new state.
    pub fn reset(&mut self, initial: Option<&str>) -> bool {
        let state = initial.unwrap_or(self.initial.as_str()).to_string();
        if !self.has(&state) {
            self.diagnostics.report(Diagnostic::UnknownState { state });
            return false;
        }
        if let Some(discarded) = self.transition.take() {
            tracing::debug!(action = discarded.action(), "transition discarded by reset");
        }
        tracing::debug!(state = %state, "machine reset");
        self.state = state;
        self.history.clear();
        self.emit(Family::System, EventType::Reset, None, None);
        true
    }

    /// Enter the initial state of a deferred machine.
    ///
    /// Returns `false` if the machine was already started.
    pub fn start(&mut self) -> bool {
        if self.is_started() {
            return false;
        }
        self.initialize(self.initial.clone());
        true
    }

    /// Subscribe `handler` to the events matched by `id`.
    ///
    /// See [`EventId`] for the accepted id forms. Unknown state or action
    /// names are reported as diagnostics but still subscribed.
    pub fn on<F>(&mut self, id: &str, handler: F) -> Result<(), MachineError>
    where
        F: Fn(&mut Machine, &Event) + Send + Sync + 'static,
    {
        self.subscribe(id, Arc::new(handler))
            .map_err(|source| MachineError::InvalidEventId {
                id: id.to_string(),
                source,
            })
    }

    /// Compile an extra rule into the machine.
    ///
    /// Emits `state.<name>.add` for every new state, then `system.update`.
    pub fn add(&mut self, rule: impl Into<Rule>) -> Result<(), MachineError> {
        let discovered = self.tables.apply_rule(&rule.into())?;
        for state in &discovered {
            self.emit(Family::State, EventType::Add, Some(state.as_str()), None);
        }
        self.emit(Family::System, EventType::Update, None, None);
        Ok(())
    }

    pub(crate) fn subscribe(&mut self, id: &str, handler: Handler) -> Result<(), EventIdError> {
        let event_id = EventId::parse(id, &self.tables).inspect_err(|error| {
            self.diagnostics.report(Diagnostic::InvalidEventId {
                id: id.to_string(),
                reason: error.to_string(),
            });
        })?;

        for name in event_id.unknown_targets(&self.tables) {
            self.diagnostics.report(Diagnostic::UnknownTarget {
                family: event_id.family,
                name: name.to_string(),
            });
        }
        for key in event_id.keys() {
            tracing::trace!(%key, "handler registered");
            self.handlers.register(key, Arc::clone(&handler));
        }
        Ok(())
    }

    // Lifecycle driver

    fn known_state<'a>(&'a self, state: Option<&'a str>) -> Option<&'a str> {
        let state = state.unwrap_or(self.state.as_str());
        if self.has(state) {
            Some(state)
        } else {
            self.diagnostics.report(Diagnostic::UnknownState {
                state: state.to_string(),
            });
            None
        }
    }

    fn initialize(&mut self, state: String) {
        tracing::debug!(state = %state, "machine initialized");
        self.state = state;
        self.emit(Family::System, EventType::Initialize, None, None);
    }

    fn not_transitioning(&self, operation: &str) {
        self.diagnostics.report(Diagnostic::NotTransitioning {
            operation: operation.to_string(),
        });
    }

    /// Dispatch an event outside the transition queue.
    fn emit(
        &mut self,
        family: Family,
        kind: EventType,
        target: Option<&str>,
        transition: Option<TransitionInfo>,
    ) {
        let handlers = self.handlers.matching(family, kind, target);
        let event = Event::new(family, kind, target, transition);
        tracing::trace!(event = %event.path(), handlers = handlers.len(), "emit");
        for handler in handlers {
            handler(self, &event);
        }
    }

    /// Queue the handlers of the in-flight transition's current phase.
    fn queue_phase(&mut self) {
        let Some((family, kind, target, info)) = self.transition.as_ref().and_then(|t| {
            t.phase_event()
                .map(|(family, kind, target)| (family, kind, target, t.info()))
        }) else {
            return;
        };

        let handlers = self.handlers.matching(family, kind, target.as_deref());
        let event = Event::new(family, kind, target.as_deref(), Some(info));
        if let Some(transition) = self.transition.as_mut() {
            transition.enqueue(event, handlers);
        }
    }

    /// Run the in-flight transition until it completes, pauses, or is
    /// replaced by a cancel, end or reset issued from a handler.
    fn drive(&mut self) {
        let Some(id) = self.transition.as_ref().map(Transition::id) else {
            return;
        };

        loop {
            let Some(transition) = self.transition.as_mut().filter(|t| t.id() == id) else {
                return;
            };
            if transition.is_paused() {
                return;
            }

            if let Some(step) = transition.next_step() {
                tracing::trace!(event = %step.event.path(), "dispatch");
                (step.handler)(self, &step.event);
                continue;
            }

            match transition.advance() {
                Phase::Applying => {
                    let to = transition.to().to_string();
                    tracing::debug!(state = %to, "state committed");
                    self.state = to;
                }
                Phase::Complete => {
                    self.finish(false);
                    return;
                }
                _ => self.queue_phase(),
            }
        }
    }

    /// Commit the in-flight transition and emit the completion events.
    fn finish(&mut self, forced: bool) {
        let Some(transition) = self.transition.take() else {
            return;
        };
        let info = transition.info();
        let complete = self.final_state.as_deref() == Some(info.to.as_str());

        self.state = info.to.clone();
        self.history.push(TransitionRecord {
            action: info.action.clone(),
            from: info.from.clone(),
            to: info.to.clone(),
            timestamp: Utc::now(),
            forced,
        });
        tracing::debug!(
            action = %info.action,
            from = %info.from,
            to = %info.to,
            forced,
            "transition complete"
        );

        if forced {
            self.emit(Family::Transition, EventType::End, None, Some(info.clone()));
        }
        self.emit(Family::System, EventType::Change, None, Some(info.clone()));
        if complete {
            self.emit(Family::System, EventType::Complete, None, Some(info));
        }
    }
}

impl fmt::Debug for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("state", &self.state)
            .field("initial", &self.initial)
            .field("final_state", &self.final_state)
            .field("states", &self.tables.states)
            .field("transition", &self.transition)
            .field("handlers", &self.handlers.len())
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}
