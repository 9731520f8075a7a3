//! Grid context handed to descendants
//!
//! Components do not look anything up ambiently. The composition root builds
//! one immutable [`GridContext`] and passes it down explicitly, e.g. through
//! [`RenderScope`](crate::component::RenderScope).

use crate::action::Action;
use crate::component::{ComponentMap, SettingsComponentMap};
use crate::error::GridError;
use crate::event::EventMap;
use crate::listener::StoreListener;
use crate::selector::SelectorMap;
use crate::store::Store;
use serde_json::Value;
use std::sync::Arc;

/// Store key used when the configuration does not name one
pub const DEFAULT_STORE_KEY: &str = "store";

/// Read-only view of a grid's merged structures and its store
pub struct GridContext {
    components: Arc<ComponentMap>,
    settings_component_objects: Arc<SettingsComponentMap>,
    events: Arc<EventMap>,
    selectors: Arc<SelectorMap>,
    store_key: String,
    store_listener: Arc<StoreListener>,
}

impl GridContext {
    pub(crate) fn new(
        components: Arc<ComponentMap>,
        settings_component_objects: Arc<SettingsComponentMap>,
        events: Arc<EventMap>,
        selectors: Arc<SelectorMap>,
        store_key: String,
        store_listener: Arc<StoreListener>,
    ) -> Self {
        Self {
            components,
            settings_component_objects,
            events,
            selectors,
            store_key,
            store_listener,
        }
    }

    pub fn components(&self) -> &ComponentMap {
        &self.components
    }

    pub fn settings_component_objects(&self) -> &SettingsComponentMap {
        &self.settings_component_objects
    }

    pub fn events(&self) -> &EventMap {
        &self.events
    }

    pub fn selectors(&self) -> &SelectorMap {
        &self.selectors
    }

    pub fn store_key(&self) -> &str {
        &self.store_key
    }

    pub fn store_listener(&self) -> &Arc<StoreListener> {
        &self.store_listener
    }

    pub fn store(&self) -> &Store {
        self.store_listener.store()
    }

    /// Create the action for a named event without dispatching it
    pub fn create_action(&self, event: &str, payload: Value) -> Result<Action, GridError> {
        let creator = self
            .events
            .get(event)
            .ok_or_else(|| GridError::UnknownEvent(event.to_string()))?;
        Ok(creator(payload))
    }

    /// Evaluate a named selector against the current state
    pub fn select(&self, selector: &str) -> Result<Value, GridError> {
        let selector_fn = self
            .selectors
            .get(selector)
            .ok_or_else(|| GridError::UnknownSelector(selector.to_string()))?;
        Ok(selector_fn(&self.store().get_state()))
    }
}

impl std::fmt::Debug for GridContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridContext")
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .field(
                "settings_component_objects",
                &self.settings_component_objects.keys().collect::<Vec<_>>(),
            )
            .field("events", &self.events.keys().collect::<Vec<_>>())
            .field("selectors", &self.selectors.keys().collect::<Vec<_>>())
            .field("store_key", &self.store_key)
            .field("store_listener", &self.store_listener)
            .finish()
    }
}
