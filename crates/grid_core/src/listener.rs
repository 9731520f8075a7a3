//! Named state-change listeners
//!
//! A listener is a side-effect handler called after every state change with
//! the current state and a fixed [`ListenerContext`]. Listeners are registered
//! by name; registering a name again replaces the earlier listener.

use crate::action::Action;
use crate::error::{DispatchError, GridError, ListenerError};
use crate::event::EventMap;
use crate::selector::SelectorMap;
use crate::store::{Store, Subscription, WeakStore};
use dashmap::DashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, trace};

/// Handler invoked on every state-change notification
pub type Listener = Arc<dyn Fn(&Value, &ListenerContext) -> Result<(), ListenerError> + Send + Sync>;

/// Wrap a closure as a [`Listener`]
pub fn listener<F>(handler: F) -> Listener
where
    F: Fn(&Value, &ListenerContext) -> Result<(), ListenerError> + Send + Sync + 'static,
{
    Arc::new(handler)
}

/// A listener entry as contributed by the user or a plugin.
///
/// Contributions are loosely typed: anything that is not a handler is
/// dropped (or rejected under [`ListenerPolicy::Strict`]) when the
/// listeners are merged.
#[derive(Clone)]
pub enum ListenerSlot {
    Handler(Listener),
    Value(Value),
}

impl ListenerSlot {
    pub fn handler<F>(handler: F) -> Self
    where
        F: Fn(&Value, &ListenerContext) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        ListenerSlot::Handler(Arc::new(handler))
    }

    pub fn as_handler(&self) -> Option<&Listener> {
        match self {
            ListenerSlot::Handler(handler) => Some(handler),
            ListenerSlot::Value(_) => None,
        }
    }
}

impl std::fmt::Debug for ListenerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerSlot::Handler(_) => f.write_str("Handler(..)"),
            ListenerSlot::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

/// Listener name to slot, in contribution order
pub type ListenerSlots = IndexMap<String, ListenerSlot>;

/// What to do with listener slots that are not handlers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListenerPolicy {
    /// Drop them silently
    #[default]
    Lenient,
    /// Fail construction with [`GridError::InvalidListener`]
    Strict,
}

/// Keeps only the handler slots of one contribution.
///
/// `source` names the contribution in logs and errors.
pub fn sanitize_listeners(
    slots: &ListenerSlots,
    source: &str,
    policy: ListenerPolicy,
) -> Result<IndexMap<String, Listener>, GridError> {
    let mut handlers = IndexMap::new();
    for (name, slot) in slots {
        match slot {
            ListenerSlot::Handler(handler) => {
                handlers.insert(name.clone(), handler.clone());
            }
            ListenerSlot::Value(value) => match policy {
                ListenerPolicy::Lenient => {
                    trace!("🔇 Dropping listener '{}' from {}: not a handler ({})", name, source, value);
                }
                ListenerPolicy::Strict => {
                    return Err(GridError::InvalidListener {
                        name: name.clone(),
                        source_name: source.to_string(),
                    });
                }
            },
        }
    }
    Ok(handlers)
}

/// Fixed context every listener is called with
#[derive(Clone, Default)]
pub struct ListenerContext {
    pub events: Arc<EventMap>,
    pub selectors: Arc<SelectorMap>,
    store: WeakStore,
}

impl ListenerContext {
    pub fn new(events: Arc<EventMap>, selectors: Arc<SelectorMap>) -> Self {
        Self {
            events,
            selectors,
            store: WeakStore::default(),
        }
    }

    /// Evaluate a selector against the given state
    pub fn select(&self, name: &str, state: &Value) -> Option<Value> {
        self.selectors.get(name).map(|selector| selector(state))
    }

    /// Dispatch an action to the store the listener is registered with.
    ///
    /// Dispatches from inside a notification are queued until the current
    /// notification pass is over.
    pub fn dispatch(&self, action: Action) -> Result<Action, ListenerError> {
        let store = self
            .store
            .upgrade()
            .ok_or_else(|| ListenerError::new("store is no longer available"))?;
        store
            .dispatch(action)
            .map_err(|err| ListenerError::new(err.to_string()))
    }

    /// Create an action from a named event and dispatch it
    pub fn dispatch_event(&self, name: &str, payload: Value) -> Result<Action, ListenerError> {
        let creator = self
            .events
            .get(name)
            .ok_or_else(|| ListenerError::new(format!("unknown event '{name}'")))?;
        self.dispatch(creator(payload))
    }

    fn bound_to(&self, store: &Store) -> Self {
        Self {
            events: self.events.clone(),
            selectors: self.selectors.clone(),
            store: store.downgrade(),
        }
    }
}

impl std::fmt::Debug for ListenerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerContext")
            .field("events", &self.events.keys().collect::<Vec<_>>())
            .field("selectors", &self.selectors.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Registry of named listeners bound to one store
pub struct StoreListener {
    store: Store,
    unsubscribers: DashMap<String, Subscription>,
}

impl StoreListener {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            unsubscribers: DashMap::new(),
        }
    }

    /// Register `handler` under `name`, replacing any listener with that name
    pub fn add_listener(&self, handler: Listener, name: &str, context: ListenerContext) -> Subscription {
        if let Some((_, previous)) = self.unsubscribers.remove(name) {
            debug!("🔁 Replacing listener '{}'", name);
            previous.unsubscribe();
        }

        let context = context.bound_to(&self.store);
        let listener_name = name.to_string();
        let subscription = self.store.subscribe(move |store| {
            let state = store.get_state();
            handler(&state, &context).map_err(|source| DispatchError::Listener {
                name: listener_name.clone(),
                source,
            })
        });

        debug!("👂 Registered listener '{}'", name);
        self.unsubscribers.insert(name.to_string(), subscription.clone());
        subscription
    }

    /// Unsubscribe and forget a listener. Returns whether it existed.
    pub fn remove_listener(&self, name: &str) -> bool {
        match self.unsubscribers.remove(name) {
            Some((_, subscription)) => {
                subscription.unsubscribe();
                debug!("🔕 Removed listener '{}'", name);
                true
            }
            None => false,
        }
    }

    pub fn has_listener(&self, name: &str) -> bool {
        self.unsubscribers.contains_key(name)
    }

    /// Registered listener names, sorted
    pub fn listener_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .unsubscribers
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.unsubscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unsubscribers.is_empty()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}

impl std::fmt::Debug for StoreListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreListener")
            .field("listeners", &self.listener_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action;
    use crate::devtools::PassthroughEnhancer;
    use crate::reducer::{data::data_reducers, CombinedReducer};
    use parking_lot::Mutex;
    use serde_json::json;

    fn store() -> Store {
        let reducers = data_reducers();
        let combined = CombinedReducer::combine([("griddle", &reducers)]).unwrap();
        Store::with_enhancer(
            combined,
            json!({"pageProperties": {"currentPage": 1, "pageSize": 10}}),
            Vec::new(),
            Arc::new(PassthroughEnhancer),
        )
    }

    fn recording(log: &Arc<Mutex<Vec<String>>>, tag: &'static str) -> Listener {
        let log = log.clone();
        listener(move |state, _context| {
            log.lock().push(format!("{tag}:{}", state["pageProperties"]["currentPage"]));
            Ok(())
        })
    }

    #[test]
    fn test_sanitize_drops_non_handlers() {
        let mut slots = ListenerSlots::new();
        slots.insert("a".to_string(), ListenerSlot::handler(|_, _| Ok(())));
        slots.insert("b".to_string(), ListenerSlot::Value(json!("not a function")));
        slots.insert("c".to_string(), ListenerSlot::Value(Value::Null));

        let handlers = sanitize_listeners(&slots, "user", ListenerPolicy::Lenient).unwrap();
        assert_eq!(handlers.keys().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_sanitize_strict_rejects() {
        let mut slots = ListenerSlots::new();
        slots.insert("b".to_string(), ListenerSlot::Value(json!(3)));

        let result = sanitize_listeners(&slots, "plugin 'x'", ListenerPolicy::Strict);
        assert!(matches!(
            result,
            Err(GridError::InvalidListener { name, source_name }) if name == "b" && source_name == "plugin 'x'"
        ));
    }

    #[test]
    fn test_listener_receives_current_state() {
        let store = store();
        let registry = StoreListener::new(store.clone());
        let log = Arc::new(Mutex::new(Vec::new()));

        registry.add_listener(recording(&log, "a"), "a", ListenerContext::default());
        store.dispatch(action::next_page()).unwrap();

        assert_eq!(*log.lock(), vec!["a:2"]);
        assert!(registry.has_listener("a"));
    }

    #[test]
    fn test_same_name_replaces() {
        let store = store();
        let registry = StoreListener::new(store.clone());
        let log = Arc::new(Mutex::new(Vec::new()));

        registry.add_listener(recording(&log, "old"), "watch", ListenerContext::default());
        registry.add_listener(recording(&log, "new"), "watch", ListenerContext::default());
        store.dispatch(action::next_page()).unwrap();

        assert_eq!(*log.lock(), vec!["new:2"]);
        assert_eq!(registry.len(), 1);
        assert_eq!(store.subscriber_count(), 1);
    }

    #[test]
    fn test_remove_listener() {
        let store = store();
        let registry = StoreListener::new(store.clone());
        let log = Arc::new(Mutex::new(Vec::new()));

        registry.add_listener(recording(&log, "a"), "a", ListenerContext::default());
        assert!(registry.remove_listener("a"));
        assert!(!registry.remove_listener("a"));
        store.dispatch(action::next_page()).unwrap();

        assert!(log.lock().is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_listener_error_aborts_notification() {
        let store = store();
        let registry = StoreListener::new(store.clone());
        let log = Arc::new(Mutex::new(Vec::new()));

        registry.add_listener(listener(|_, _| Err(ListenerError::new("nope"))), "failing", ListenerContext::default());
        registry.add_listener(recording(&log, "after"), "after", ListenerContext::default());

        let err = store.dispatch(action::next_page()).unwrap_err();
        match err {
            DispatchError::Listener { name, source } => {
                assert_eq!(name, "failing");
                assert_eq!(source.message, "nope");
            }
            other => panic!("expected listener error, got {other:?}"),
        }
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_listener_can_dispatch_events() {
        let store = store();
        let registry = StoreListener::new(store.clone());
        let context = ListenerContext::new(Arc::new(crate::event::base_events()), Arc::new(SelectorMap::new()));

        registry.add_listener(
            listener(|state, context| {
                if state["pageProperties"]["currentPage"] == json!(2) {
                    context.dispatch_event("setPage", json!(5))?;
                }
                Ok(())
            }),
            "jump",
            context,
        );

        store.dispatch(action::next_page()).unwrap();
        assert_eq!(store.get_state()["pageProperties"]["currentPage"], json!(5));
    }
}
