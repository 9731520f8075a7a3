//! Grid construction configuration

use crate::component::{ComponentMap, SettingsComponentMap};
use crate::context::DEFAULT_STORE_KEY;
use crate::event::EventMap;
use crate::listener::{ListenerPolicy, ListenerSlot, ListenerSlots};
use crate::middleware::{MiddlewareRef, MiddlewareSlot};
use crate::plugin::Plugin;
use crate::rows::RowDefinition;
use crate::selector::SelectorMap;
use crate::value::{Properties, DATA_KEY};
use serde_json::{json, Value};

pub const PAGE_PROPERTIES_KEY: &str = "pageProperties";
pub const SORT_PROPERTIES_KEY: &str = "sortProperties";
pub const STYLE_CONFIG_KEY: &str = "styleConfig";
pub const RENDER_PROPERTIES_KEY: &str = "renderProperties";
pub const STORE_KEY_KEY: &str = "storeKey";

/// Everything a grid is constructed from.
///
/// Fields left as `None` fall back to the base set and plugin contributions.
/// Keys in `extra` are folded into the initial state verbatim.
#[derive(Clone)]
pub struct GridConfig {
    pub plugins: Vec<Plugin>,
    /// `None` leaves `data` to plugin initial state or the empty default
    pub data: Option<Value>,
    pub children: Option<RowDefinition>,
    pub events: Option<EventMap>,
    pub selectors: Option<SelectorMap>,
    pub sort_properties: Option<Value>,
    pub style_config: Option<Value>,
    pub page_properties: Option<Value>,
    pub components: Option<ComponentMap>,
    /// Start from the base component set; without it a plugin or the user
    /// must provide `Layout`
    pub base_components: bool,
    pub render_properties: Option<Value>,
    pub settings_component_objects: Option<SettingsComponentMap>,
    pub store_key: String,
    pub middleware: Vec<MiddlewareSlot>,
    pub listeners: ListenerSlots,
    pub listener_policy: ListenerPolicy,
    pub extra: Properties,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            plugins: Vec::new(),
            data: None,
            children: None,
            events: None,
            selectors: None,
            sort_properties: None,
            style_config: None,
            page_properties: None,
            components: None,
            base_components: true,
            render_properties: None,
            settings_component_objects: None,
            store_key: DEFAULT_STORE_KEY.to_string(),
            middleware: Vec::new(),
            listeners: ListenerSlots::new(),
            listener_policy: ListenerPolicy::default(),
            extra: Properties::new(),
        }
    }
}

impl GridConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split a flat property set into the known keys and `extra`
    pub fn from_properties(mut properties: Properties) -> Self {
        let mut config = Self::new();
        config.data = properties.remove(DATA_KEY);
        config.page_properties = properties.remove(PAGE_PROPERTIES_KEY);
        config.sort_properties = properties.remove(SORT_PROPERTIES_KEY);
        config.style_config = properties.remove(STYLE_CONFIG_KEY);
        config.render_properties = properties.remove(RENDER_PROPERTIES_KEY);
        if let Some(Value::String(store_key)) = properties.remove(STORE_KEY_KEY) {
            config.store_key = store_key;
        }
        config.extra = properties;
        config
    }

    /// The data-valued properties of this configuration, as the host would
    /// pass them again on a later update
    pub fn properties(&self) -> Properties {
        let mut properties = self.extra.clone();
        for (key, value) in [
            (DATA_KEY, &self.data),
            (PAGE_PROPERTIES_KEY, &self.page_properties),
            (SORT_PROPERTIES_KEY, &self.sort_properties),
            (STYLE_CONFIG_KEY, &self.style_config),
            (RENDER_PROPERTIES_KEY, &self.render_properties),
        ] {
            if let Some(value) = value {
                properties.insert(key.to_string(), value.clone());
            }
        }
        properties
    }

    pub fn plugin(mut self, plugin: Plugin) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn plugins(mut self, plugins: impl IntoIterator<Item = Plugin>) -> Self {
        self.plugins.extend(plugins);
        self
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn children(mut self, row: RowDefinition) -> Self {
        self.children = Some(row);
        self
    }

    pub fn events(mut self, events: EventMap) -> Self {
        self.events = Some(events);
        self
    }

    pub fn selectors(mut self, selectors: SelectorMap) -> Self {
        self.selectors = Some(selectors);
        self
    }

    pub fn sort_properties(mut self, sort_properties: Value) -> Self {
        self.sort_properties = Some(sort_properties);
        self
    }

    pub fn style_config(mut self, style_config: Value) -> Self {
        self.style_config = Some(style_config);
        self
    }

    pub fn page_properties(mut self, page_properties: Value) -> Self {
        self.page_properties = Some(page_properties);
        self
    }

    pub fn components(mut self, components: ComponentMap) -> Self {
        self.components = Some(components);
        self
    }

    pub fn base_components(mut self, enabled: bool) -> Self {
        self.base_components = enabled;
        self
    }

    pub fn render_properties(mut self, render_properties: Value) -> Self {
        self.render_properties = Some(render_properties);
        self
    }

    pub fn settings_component_objects(mut self, objects: SettingsComponentMap) -> Self {
        self.settings_component_objects = Some(objects);
        self
    }

    pub fn store_key(mut self, store_key: impl Into<String>) -> Self {
        self.store_key = store_key.into();
        self
    }

    pub fn middleware(mut self, middleware: MiddlewareRef) -> Self {
        self.middleware.push(Some(middleware));
        self
    }

    pub fn listener(mut self, name: impl Into<String>, slot: ListenerSlot) -> Self {
        self.listeners.insert(name.into(), slot);
        self
    }

    pub fn listener_policy(mut self, policy: ListenerPolicy) -> Self {
        self.listener_policy = policy;
        self
    }

    /// Add a property that is folded into the initial state as is
    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

impl std::fmt::Debug for GridConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridConfig")
            .field("plugins", &self.plugins.iter().map(Plugin::name).collect::<Vec<_>>())
            .field("store_key", &self.store_key)
            .field("listener_policy", &self.listener_policy)
            .field("properties", &self.properties())
            .finish_non_exhaustive()
    }
}
