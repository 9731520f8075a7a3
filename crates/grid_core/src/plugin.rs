//! Plugin bundles and factories
//!
//! A [`Plugin`] is a typed bundle of optional contributions. `None` means the
//! plugin contributes nothing of that kind; `Some` of an empty collection is
//! an explicit empty contribution. Bundles are validated when a grid loads
//! them, before anything is merged.

use crate::component::{ComponentMap, ComponentRef, SettingsComponentMap, SettingsComponentObject};
use crate::error::GridError;
use crate::event::{ActionCreator, EventMap};
use crate::listener::{ListenerSlot, ListenerSlots};
use crate::middleware::{MiddlewareRef, MiddlewareSlot};
use crate::reducer::{ReducerMap, ReducerRef};
use crate::selector::{Selector, SelectorMap};
use serde_json::Value;

/// Plugin metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginMetadata {
    /// Plugin name, used in logs and error messages
    pub name: String,
    /// Plugin version
    pub version: String,
    /// Plugin description
    pub description: Option<String>,
}

impl PluginMetadata {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A bundle of optional grid contributions
#[derive(Clone, Default)]
pub struct Plugin {
    pub metadata: PluginMetadata,
    pub reducer: Option<ReducerMap>,
    pub components: Option<ComponentMap>,
    pub settings_component_objects: Option<SettingsComponentMap>,
    pub events: Option<EventMap>,
    pub selectors: Option<SelectorMap>,
    pub style_config: Option<Value>,
    pub render_properties: Option<Value>,
    pub initial_state: Option<Value>,
    pub middleware: Option<Vec<MiddlewareSlot>>,
    pub listeners: Option<ListenerSlots>,
}

impl Default for PluginMetadata {
    fn default() -> Self {
        Self::new("", "0.1.0")
    }
}

impl Plugin {
    /// Create an empty plugin bundle
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            metadata: PluginMetadata::new(name, "0.1.0"),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn with_metadata(mut self, metadata: PluginMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Add a slice reducer for `namespace`
    pub fn with_reducer(mut self, namespace: impl Into<String>, reducer: ReducerRef) -> Self {
        self.reducer.get_or_insert_with(ReducerMap::new).insert(namespace.into(), reducer);
        self
    }

    pub fn with_component(mut self, name: impl Into<String>, component: ComponentRef) -> Self {
        self.components
            .get_or_insert_with(ComponentMap::new)
            .insert(name.into(), component);
        self
    }

    pub fn with_settings_component(mut self, name: impl Into<String>, order: u32, component: ComponentRef) -> Self {
        self.settings_component_objects
            .get_or_insert_with(SettingsComponentMap::new)
            .insert(name.into(), SettingsComponentObject { order, component });
        self
    }

    pub fn with_event(mut self, name: impl Into<String>, creator: ActionCreator) -> Self {
        self.events.get_or_insert_with(EventMap::new).insert(name.into(), creator);
        self
    }

    pub fn with_selector(mut self, name: impl Into<String>, selector: Selector) -> Self {
        self.selectors
            .get_or_insert_with(SelectorMap::new)
            .insert(name.into(), selector);
        self
    }

    pub fn with_style_config(mut self, style_config: Value) -> Self {
        self.style_config = Some(style_config);
        self
    }

    pub fn with_render_properties(mut self, render_properties: Value) -> Self {
        self.render_properties = Some(render_properties);
        self
    }

    pub fn with_initial_state(mut self, initial_state: Value) -> Self {
        self.initial_state = Some(initial_state);
        self
    }

    pub fn with_middleware(mut self, middleware: MiddlewareRef) -> Self {
        self.middleware.get_or_insert_with(Vec::new).push(Some(middleware));
        self
    }

    pub fn with_listener(mut self, name: impl Into<String>, slot: ListenerSlot) -> Self {
        self.listeners
            .get_or_insert_with(ListenerSlots::new)
            .insert(name.into(), slot);
        self
    }

    /// Load-time checks on the bundle's shape
    pub fn validate(&self) -> Result<(), GridError> {
        if self.metadata.name.trim().is_empty() {
            return Err(self.invalid("plugin name must not be empty"));
        }

        if let Some(reducers) = &self.reducer {
            if let Some(namespace) = reducers.keys().find(|namespace| namespace.trim().is_empty()) {
                return Err(self.invalid(format!("reducer namespace '{namespace}' must not be empty")));
            }
        }

        for (kind, object) in [
            ("style_config", &self.style_config),
            ("render_properties", &self.render_properties),
            ("initial_state", &self.initial_state),
        ] {
            if let Some(value) = object {
                if !value.is_object() {
                    return Err(self.invalid(format!("{kind} must be an object")));
                }
            }
        }

        Ok(())
    }

    fn invalid(&self, reason: impl Into<String>) -> GridError {
        GridError::InvalidPlugin {
            plugin: if self.metadata.name.is_empty() {
                "<unnamed>".to_string()
            } else {
                self.metadata.name.clone()
            },
            reason: reason.into(),
        }
    }
}

fn keys<V>(map: &Option<indexmap::IndexMap<String, V>>) -> Option<Vec<&String>> {
    map.as_ref().map(|map| map.keys().collect())
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("metadata", &self.metadata)
            .field("reducer", &keys(&self.reducer))
            .field("components", &keys(&self.components))
            .field("settings_component_objects", &keys(&self.settings_component_objects))
            .field("events", &keys(&self.events))
            .field("selectors", &keys(&self.selectors))
            .field("style_config", &self.style_config)
            .field("render_properties", &self.render_properties)
            .field("initial_state", &self.initial_state)
            .field("middleware", &self.middleware.as_ref().map(Vec::len))
            .field("listeners", &keys(&self.listeners))
            .finish()
    }
}

/// Creates plugin bundles on demand, e.g. from a host's configuration
pub trait PluginFactory: Send + Sync {
    /// Create a new plugin bundle
    fn create(&self) -> Result<Plugin, GridError>;

    fn plugin_name(&self) -> &str;
}

/// Plugin factory wrapping a constructor function
pub struct SimplePluginFactory {
    constructor: Box<dyn Fn() -> Plugin + Send + Sync>,
    name: String,
}

impl SimplePluginFactory {
    pub fn new<F>(name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> Plugin + Send + Sync + 'static,
    {
        Self {
            constructor: Box::new(constructor),
            name: name.into(),
        }
    }
}

impl PluginFactory for SimplePluginFactory {
    fn create(&self) -> Result<Plugin, GridError> {
        let plugin = (self.constructor)();
        plugin.validate()?;
        Ok(plugin)
    }

    fn plugin_name(&self) -> &str {
        &self.name
    }
}
