//! Dispatch middleware
//!
//! Middleware wrap the store's dispatch. The chain runs in list order: the
//! first middleware is outermost and sees each action first, the last one
//! hands it straight to the reducer. Grids list plugin middleware (in plugin
//! order) before user middleware, so user middleware see an action last.

use crate::action::Action;
use crate::error::DispatchError;
use crate::store::Store;
use serde_json::Value;
use std::sync::Arc;

/// What a middleware may do with the store besides forwarding the action
pub struct MiddlewareApi<'a> {
    store: &'a Store,
}

impl<'a> MiddlewareApi<'a> {
    pub(crate) fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Current state snapshot
    pub fn get_state(&self) -> Arc<Value> {
        self.store.get_state()
    }

    /// Dispatch a new action through the whole pipeline
    pub fn dispatch(&self, action: Action) -> Result<Action, DispatchError> {
        self.store.dispatch(action)
    }
}

/// Remainder of the chain after the current middleware
pub struct Next<'a> {
    chain: &'a [MiddlewareRef],
    api: &'a MiddlewareApi<'a>,
    terminal: &'a dyn Fn(Action) -> Result<Action, DispatchError>,
}

impl<'a> Next<'a> {
    pub(crate) fn new(
        chain: &'a [MiddlewareRef],
        api: &'a MiddlewareApi<'a>,
        terminal: &'a dyn Fn(Action) -> Result<Action, DispatchError>,
    ) -> Self {
        Self { chain, api, terminal }
    }

    /// Forward the action to the next middleware, or to the reducer
    pub fn run(self, action: Action) -> Result<Action, DispatchError> {
        match self.chain.split_first() {
            Some((current, rest)) => {
                let next = Next {
                    chain: rest,
                    api: self.api,
                    terminal: self.terminal,
                };
                current.handle(self.api, action, next)
            }
            None => (self.terminal)(action),
        }
    }
}

/// A dispatch-chain interceptor.
///
/// Implementations forward with `next.run(action)`, may rewrite the action
/// first, or return without forwarding to swallow it.
pub trait Middleware: Send + Sync {
    /// Name used in logs and error reports
    fn name(&self) -> &str {
        "anonymous"
    }

    fn handle(&self, api: &MiddlewareApi<'_>, action: Action, next: Next<'_>) -> Result<Action, DispatchError>;
}

/// Shared handle to a middleware
pub type MiddlewareRef = Arc<dyn Middleware>;

/// Middleware list entry as contributed; `None` entries are dropped when
/// the lists are flattened.
pub type MiddlewareSlot = Option<MiddlewareRef>;

struct FnMiddleware<F> {
    name: String,
    handler: F,
}

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&MiddlewareApi<'_>, Action, Next<'_>) -> Result<Action, DispatchError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self, api: &MiddlewareApi<'_>, action: Action, next: Next<'_>) -> Result<Action, DispatchError> {
        (self.handler)(api, action, next)
    }
}

/// Wrap a closure as a named middleware
pub fn middleware<F>(name: &str, handler: F) -> MiddlewareRef
where
    F: Fn(&MiddlewareApi<'_>, Action, Next<'_>) -> Result<Action, DispatchError> + Send + Sync + 'static,
{
    Arc::new(FnMiddleware {
        name: name.to_string(),
        handler,
    })
}
