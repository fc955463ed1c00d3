//! Lifecycle of a single in-flight transition.
//!
//! A transition runs through a fixed sequence of phases. Each phase that
//! dispatches an event queues its handlers up front; the machine pops and
//! invokes them one at a time, checking between invocations whether the
//! transition was paused, cancelled or forced to end.

use super::machine::Handler;
use crate::events::{Event, EventType, Family, TransitionInfo};
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt;

/// Phase of an in-flight transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Dispatching `transition.start`
    Pending,
    /// Dispatching `state.<from>.leave`
    Leaving,
    /// Dispatching `action.<action>.start`
    Starting,
    /// Committing the target state
    Applying,
    /// Dispatching `state.<to>.enter`
    Entering,
    /// Dispatching `action.<action>.end`
    Ending,
    /// All phases ran
    Complete,
}

impl Phase {
    pub fn next(self) -> Self {
        match self {
            Self::Pending => Self::Leaving,
            Self::Leaving => Self::Starting,
            Self::Starting => Self::Applying,
            Self::Applying => Self::Entering,
            Self::Entering => Self::Ending,
            Self::Ending | Self::Complete => Self::Complete,
        }
    }
}

/// A queued handler invocation.
#[derive(Clone)]
pub(crate) struct Step {
    pub event: Event,
    pub handler: Handler,
}

/// The single active transition of a machine.
pub struct Transition {
    id: u64,
    action: String,
    from: String,
    to: String,
    args: Vec<Value>,
    phase: Phase,
    paused: bool,
    queue: VecDeque<Step>,
}

impl Transition {
    pub(crate) fn new(id: u64, action: &str, from: &str, to: &str, args: Vec<Value>) -> Self {
        Self {
            id,
            action: action.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            args,
            phase: Phase::Pending,
            paused: false,
            queue: VecDeque::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Handler invocations still queued for the current phase.
    pub fn pending_handlers(&self) -> usize {
        self.queue.len()
    }

    pub fn info(&self) -> TransitionInfo {
        TransitionInfo {
            action: self.action.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
            args: self.args.clone(),
        }
    }

    /// The event dispatched by the current phase, if any.
    pub(crate) fn phase_event(&self) -> Option<(Family, EventType, Option<String>)> {
        match self.phase {
            Phase::Pending => Some((Family::Transition, EventType::Start, None)),
            Phase::Leaving => Some((Family::State, EventType::Leave, Some(self.from.clone()))),
            Phase::Starting => Some((Family::Action, EventType::Start, Some(self.action.clone()))),
            Phase::Entering => Some((Family::State, EventType::Enter, Some(self.to.clone()))),
            Phase::Ending => Some((Family::Action, EventType::End, Some(self.action.clone()))),
            Phase::Applying | Phase::Complete => None,
        }
    }

    pub(crate) fn enqueue(&mut self, event: Event, handlers: Vec<Handler>) {
        self.queue.extend(handlers.into_iter().map(|handler| Step {
            event: event.clone(),
            handler,
        }));
    }

    pub(crate) fn next_step(&mut self) -> Option<Step> {
        self.queue.pop_front()
    }

    /// Move to the next phase. Only valid once the queue is drained.
    pub(crate) fn advance(&mut self) -> Phase {
        debug_assert!(self.queue.is_empty());
        self.phase = self.phase.next();
        self.phase
    }

    /// Returns `false` if the transition was already paused.
    pub(crate) fn pause(&mut self) -> bool {
        !std::mem::replace(&mut self.paused, true)
    }

    /// Returns `false` if the transition was not paused.
    pub(crate) fn resume(&mut self) -> bool {
        std::mem::replace(&mut self.paused, false)
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("id", &self.id)
            .field("action", &self.action)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("args", &self.args)
            .field("phase", &self.phase)
            .field("paused", &self.paused)
            .field("queued", &self.queue.len())
            .finish()
    }
}
