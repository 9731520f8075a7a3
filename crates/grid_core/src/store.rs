//! Unified state container
//!
//! The store owns the single mutable state of a grid. State only changes
//! through [`Store::dispatch`], which runs the middleware chain, the combined
//! reducer and then every subscriber, synchronously and in call order.
//!
//! A dispatch issued while subscribers are being notified is queued and runs
//! once the current notification pass is over, so notification passes never
//! interleave. Dispatching from inside a reducer is an error.

use crate::action::Action;
use crate::devtools::{self, StoreEnhancer};
use crate::error::DispatchError;
use crate::middleware::{MiddlewareApi, MiddlewareRef, Next};
use crate::reducer::CombinedReducer;
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

/// Callback invoked after every reducer run
pub type Subscriber = Arc<dyn Fn(&Store) -> Result<(), DispatchError> + Send + Sync>;

/// Identifier handed out by [`Store::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// Statistics for store monitoring
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub actions_dispatched: u64,
    pub actions_queued: u64,
    pub notifications_sent: u64,
    pub subscribers: usize,
}

struct StoreInner {
    state: ArcSwap<Value>,
    reducer: CombinedReducer,
    middleware: Vec<MiddlewareRef>,
    enhancer: Arc<dyn StoreEnhancer>,
    subscribers: Mutex<Vec<(SubscriberId, Subscriber)>>,
    next_subscriber_id: AtomicU64,
    queue: Mutex<VecDeque<Action>>,
    reducing: AtomicBool,
    notifying: AtomicBool,
    stats: Mutex<StoreStats>,
}

/// Cheaply clonable handle to a unified state container
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

/// Handle returned by [`Store::subscribe`]; dropping it keeps the
/// subscription alive.
#[derive(Debug, Clone)]
pub struct Subscription {
    id: SubscriberId,
    store: Weak<StoreInner>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Remove the subscriber. Returns `false` if it was already removed or
    /// the store is gone.
    pub fn unsubscribe(&self) -> bool {
        match self.store.upgrade() {
            Some(inner) => Store { inner }.unsubscribe(self.id),
            None => false,
        }
    }
}

/// Non-owning store handle, for callbacks the store itself keeps alive
#[derive(Debug, Clone, Default)]
pub struct WeakStore {
    inner: Weak<StoreInner>,
}

impl WeakStore {
    pub fn upgrade(&self) -> Option<Store> {
        self.inner.upgrade().map(|inner| Store { inner })
    }
}

impl std::fmt::Debug for StoreInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreInner")
            .field("reducer", &self.reducer)
            .field("middleware", &self.middleware.len())
            .field("enhancer", &self.enhancer.name())
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.inner.fmt(f)
    }
}

/// Resets a phase flag when dropped, also on early return and unwind
struct PhaseGuard<'a>(&'a AtomicBool);

impl<'a> PhaseGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Store {
    /// Create a store wrapped by the detected enhancer (see [`devtools`])
    pub fn new(reducer: CombinedReducer, initial_state: Value, middleware: Vec<MiddlewareRef>) -> Self {
        Self::with_enhancer(reducer, initial_state, middleware, devtools::detect_or_passthrough())
    }

    /// Create a store with an explicit enhancer
    pub fn with_enhancer(
        reducer: CombinedReducer,
        initial_state: Value,
        middleware: Vec<MiddlewareRef>,
        enhancer: Arc<dyn StoreEnhancer>,
    ) -> Self {
        debug!(
            "🏪 Creating store with {} middleware, enhancer '{}'",
            middleware.len(),
            enhancer.name()
        );
        Self {
            inner: Arc::new(StoreInner {
                state: ArcSwap::from_pointee(initial_state),
                reducer,
                middleware,
                enhancer,
                subscribers: Mutex::new(Vec::new()),
                next_subscriber_id: AtomicU64::new(1),
                queue: Mutex::new(VecDeque::new()),
                reducing: AtomicBool::new(false),
                notifying: AtomicBool::new(false),
                stats: Mutex::new(StoreStats::default()),
            }),
        }
    }

    /// Current state snapshot
    pub fn get_state(&self) -> Arc<Value> {
        self.inner.state.load_full()
    }

    pub fn downgrade(&self) -> WeakStore {
        WeakStore {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Dispatch an action.
    ///
    /// Returns the action as it left the middleware chain. Middleware,
    /// listener and subscriber failures are returned to the caller; when that
    /// happens any actions queued during the failed pass are discarded.
    ///
    /// A dispatch made while subscribers are being notified is queued and
    /// returns `Ok` with the action as given: middleware has not run yet, and
    /// failures of the queued action surface from the outer dispatch instead.
    pub fn dispatch(&self, action: Action) -> Result<Action, DispatchError> {
        if self.inner.reducing.load(Ordering::SeqCst) {
            return Err(DispatchError::ReducerDispatch(action.action_type));
        }

        if self.inner.notifying.load(Ordering::SeqCst) {
            debug!("📥 Queueing {} until notifications finish", action.action_type);
            self.inner.stats.lock().actions_queued += 1;
            self.inner.queue.lock().push_back(action.clone());
            return Ok(action);
        }

        let result = self.run_pipeline(action).and_then(|dispatched| {
            self.drain_queue()?;
            Ok(dispatched)
        });

        if result.is_err() {
            let mut queue = self.inner.queue.lock();
            if !queue.is_empty() {
                warn!("🗑️ Discarding {} queued action(s) after a failed dispatch", queue.len());
                queue.clear();
            }
        }
        result
    }

    fn drain_queue(&self) -> Result<(), DispatchError> {
        loop {
            let queued = self.inner.queue.lock().pop_front();
            match queued {
                Some(action) => {
                    self.run_pipeline(action)?;
                }
                None => return Ok(()),
            }
        }
    }

    fn run_pipeline(&self, action: Action) -> Result<Action, DispatchError> {
        let api = MiddlewareApi::new(self);
        let terminal = |action: Action| self.reduce_and_notify(action);
        Next::new(&self.inner.middleware, &api, &terminal).run(action)
    }

    fn reduce_and_notify(&self, action: Action) -> Result<Action, DispatchError> {
        let previous = self.inner.state.load_full();
        self.inner.enhancer.before_reduce(&action, &previous);

        let next = {
            let _reducing = PhaseGuard::enter(&self.inner.reducing);
            self.inner.reducer.reduce(&previous, &action)
        };

        self.inner.enhancer.after_reduce(&action, &previous, &next);
        self.inner.state.store(Arc::new(next));
        self.inner.stats.lock().actions_dispatched += 1;

        self.notify()?;
        Ok(action)
    }

    fn notify(&self) -> Result<(), DispatchError> {
        // Snapshot so subscribers may (un)subscribe while being notified
        let subscribers: Vec<Subscriber> = self
            .inner
            .subscribers
            .lock()
            .iter()
            .map(|(_, subscriber)| subscriber.clone())
            .collect();

        let _notifying = PhaseGuard::enter(&self.inner.notifying);
        for subscriber in &subscribers {
            subscriber(self)?;
            self.inner.stats.lock().notifications_sent += 1;
        }
        Ok(())
    }

    /// Register a subscriber, called after every reducer run in
    /// registration order.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Store) -> Result<(), DispatchError> + Send + Sync + 'static,
    {
        let id = SubscriberId(self.inner.next_subscriber_id.fetch_add(1, Ordering::SeqCst));
        self.inner.subscribers.lock().push((id, Arc::new(callback)));
        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    /// Remove a subscriber by id
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.inner.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }

    /// Name of the enhancer wrapping this store
    pub fn enhancer(&self) -> Arc<dyn StoreEnhancer> {
        self.inner.enhancer.clone()
    }

    /// Reducer namespaces in registration order
    pub fn namespaces(&self) -> Vec<String> {
        self.inner.reducer.namespaces().map(str::to_string).collect()
    }

    pub fn stats(&self) -> StoreStats {
        let mut stats = self.inner.stats.lock().clone();
        stats.subscribers = self.subscriber_count();
        stats
    }
}
