//! Target states of actions.
//!
//! An action maps a source state either to a fixed target state or to a
//! resolver callback that picks the target when the transition starts.

use crate::runtime::Machine;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

type ResolverFn = dyn Fn(&Machine, &[Value]) -> Result<String, String> + Send + Sync;

/// Callback that decides the target state of a transition at start time.
///
/// The resolver receives the machine (read-only) and the arguments passed
/// to `do_action`. It returns the name of the target state, or an error
/// message that aborts the transition.
///
/// # Example
///
/// ```rust
/// use statewise::core::Resolver;
///
/// let resolver = Resolver::new(|_machine, args| {
///     match args.first().and_then(|v| v.as_bool()) {
///         Some(true) => Ok("accepted".to_string()),
///         Some(false) => Ok("rejected".to_string()),
///         None => Err("expected a boolean argument".to_string()),
///     }
/// });
/// # let _ = resolver;
/// ```
#[derive(Clone)]
pub struct Resolver {
    resolve: Arc<ResolverFn>,
}

impl Resolver {
    pub fn new<F>(resolve: F) -> Self
    where
        F: Fn(&Machine, &[Value]) -> Result<String, String> + Send + Sync + 'static,
    {
        Resolver {
            resolve: Arc::new(resolve),
        }
    }

    /// Run the resolver against the machine and transition arguments.
    pub fn resolve(&self, machine: &Machine, args: &[Value]) -> Result<String, String> {
        (self.resolve)(machine, args)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Resolver(..)")
    }
}

/// Where an action leads from a given source state.
#[derive(Clone, Debug)]
pub enum ActionTarget {
    /// Always transition to this state.
    Fixed(String),
    /// Ask the resolver for the target when the transition starts.
    Resolved(Resolver),
}

impl ActionTarget {
    /// The fixed target state, if this target is not resolved dynamically.
    pub fn fixed(&self) -> Option<&str> {
        match self {
            Self::Fixed(state) => Some(state),
            Self::Resolved(_) => None,
        }
    }
}

impl From<&str> for ActionTarget {
    fn from(state: &str) -> Self {
        Self::Fixed(state.to_string())
    }
}

impl From<String> for ActionTarget {
    fn from(state: String) -> Self {
        Self::Fixed(state)
    }
}

impl From<Resolver> for ActionTarget {
    fn from(resolver: Resolver) -> Self {
        Self::Resolved(resolver)
    }
}
