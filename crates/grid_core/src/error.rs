//! Error types for the grid composition engine

/// Configuration and lifecycle errors raised by the composition root.
///
/// Everything in this enum except [`GridError::Dispatch`] is produced while a
/// grid is being constructed or while its inputs are validated, so it surfaces
/// before the first render.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Two reducer contributions claimed the same top-level state key
    #[error("Reducer namespace '{namespace}' is claimed by both '{first}' and '{second}'")]
    ReducerNamespaceCollision {
        namespace: String,
        first: String,
        second: String,
    },

    /// A plugin bundle failed load-time validation
    #[error("Invalid plugin '{plugin}': {reason}")]
    InvalidPlugin { plugin: String, reason: String },

    /// No component named `Layout` survived the merge
    #[error("Merged components do not provide a 'Layout' component")]
    MissingLayout,

    /// A listener slot did not hold a handler while the strict policy was active
    #[error("Listener '{name}' from {source_name} is not a handler")]
    InvalidListener { name: String, source_name: String },

    /// A property update arrived while another one was still being applied
    #[error("Property synchronization already in progress")]
    SyncInProgress,

    /// No event with the given name exists in the merged events map
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    /// No selector with the given name exists in the merged selectors map
    #[error("Unknown selector: {0}")]
    UnknownSelector(String),

    /// Runtime dispatch failure
    #[error("Dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Errors that can occur while an action travels through the store
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// A middleware refused or failed to process the action
    #[error("Middleware '{middleware}' failed: {message}")]
    Middleware { middleware: String, message: String },

    /// A named listener failed during the notification pass
    #[error("Listener '{name}' failed: {source}")]
    Listener {
        name: String,
        #[source]
        source: ListenerError,
    },

    /// An anonymous subscriber failed during the notification pass
    #[error("Subscriber failed: {0}")]
    Subscriber(String),

    /// Dispatch was called from inside a reducer
    #[error("Reducers may not dispatch actions (while reducing '{0}')")]
    ReducerDispatch(String),
}

/// Failure reported by a listener handler
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ListenerError {
    pub message: String,
}

impl ListenerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<ListenerError> for DispatchError {
    fn from(err: ListenerError) -> Self {
        DispatchError::Subscriber(err.message)
    }
}
