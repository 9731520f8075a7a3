//! Composition root
//!
//! [`Grid::new`] validates the plugin bundles, merges every contribution,
//! builds the store and the listener registry and wires the property
//! synchronizer. The merged structures never change afterwards; the state
//! changes only through dispatched actions.

use crate::action::Action;
use crate::component::{self, base_settings_component_objects, ComponentMap, RenderNode, RenderScope, LAYOUT};
use crate::config::GridConfig;
use crate::context::GridContext;
use crate::error::GridError;
use crate::event::base_events;
use crate::listener::{ListenerContext, StoreListener};
use crate::merge::{self, ForcedState};
use crate::selector::base_selectors;
use crate::store::{Store, StoreStats};
use crate::sync::{PropertySynchronizer, SyncOutcome};
use crate::value::Properties;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// A composed grid instance
pub struct Grid {
    context: Arc<GridContext>,
    synchronizer: PropertySynchronizer,
}

impl Grid {
    /// Compose a grid from its configuration.
    ///
    /// Fails before any store exists when a plugin is invalid, two reducer
    /// contributions claim the same namespace, a listener is rejected under
    /// the strict policy or no `Layout` component is available.
    pub fn new(config: GridConfig) -> Result<Self, GridError> {
        let baseline = config.properties();
        let GridConfig {
            plugins,
            data,
            children,
            events,
            selectors,
            sort_properties,
            style_config,
            page_properties,
            components,
            base_components,
            render_properties,
            settings_component_objects,
            store_key,
            middleware,
            listeners,
            listener_policy,
            extra,
        } = config;

        info!("🔧 Composing grid '{}' with {} plugin(s)", store_key, plugins.len());
        for plugin in &plugins {
            plugin.validate()?;
            debug!("🔌 Loaded plugin '{}' v{}", plugin.name(), plugin.metadata.version);
        }

        let reducer = merge::combine_reducers(&plugins)?;

        let base = if base_components {
            component::base_components()
        } else {
            ComponentMap::new()
        };
        let components = merge::merge_components(base, &plugins, components.as_ref());
        if !components.contains_key(LAYOUT) {
            return Err(GridError::MissingLayout);
        }
        let settings_component_objects = merge::merge_settings_component_objects(
            base_settings_component_objects(),
            &plugins,
            settings_component_objects.as_ref(),
        );
        let events = Arc::new(merge::merge_events(base_events(), &plugins, events.as_ref()));
        let selectors = Arc::new(merge::merge_selectors(base_selectors(), &plugins, selectors.as_ref()));
        let listeners = merge::merge_listeners(&listeners, &plugins, listener_policy)?;
        let middleware = merge::flatten_middleware(&plugins, &middleware);

        let forced = ForcedState {
            data,
            page_properties: merge::merge_page_properties(page_properties.as_ref()),
            render_properties: merge::merge_render_properties(children.as_ref(), &plugins, render_properties.as_ref()),
            sort_properties,
            style_config: merge::merge_style_config(&plugins, style_config.as_ref()),
        };
        let initial_state = merge::merge_initial_state(&plugins, &extra, forced);

        let store = Store::new(reducer, initial_state, middleware);
        let store_listener = Arc::new(StoreListener::new(store));
        let listener_context = ListenerContext::new(events.clone(), selectors.clone());
        for (name, handler) in listeners {
            store_listener.add_listener(handler, &name, listener_context.clone());
        }

        let context = Arc::new(GridContext::new(
            Arc::new(components),
            Arc::new(settings_component_objects),
            events,
            selectors,
            store_key,
            store_listener,
        ));

        info!(
            "✅ Grid '{}' ready: {} components, {} listeners, namespaces {:?}",
            context.store_key(),
            context.components().len(),
            context.store_listener().len(),
            context.store().namespaces()
        );

        Ok(Self {
            context,
            synchronizer: PropertySynchronizer::new(baseline),
        })
    }

    /// Context passed to every descendant
    pub fn context(&self) -> Arc<GridContext> {
        self.context.clone()
    }

    pub fn store(&self) -> &Store {
        self.context.store()
    }

    pub fn state(&self) -> Arc<Value> {
        self.store().get_state()
    }

    /// Provider shell around the merged `Layout`
    pub fn render(&self) -> RenderNode {
        let state = self.state();
        let scope = RenderScope::new(&self.context, &state);
        RenderNode::Provider {
            store_key: self.context.store_key().to_string(),
            child: Box::new(scope.render_child(LAYOUT, Value::Null)),
        }
    }

    /// Synchronize a new external property set into state
    pub fn receive_properties(&self, properties: Properties) -> Result<SyncOutcome, GridError> {
        self.synchronizer.receive_properties(self.store(), properties)
    }

    /// Re-rendering is driven by the store, never by property changes
    pub fn should_update(&self) -> bool {
        false
    }

    /// Dispatch an action through the store
    pub fn dispatch(&self, action: Action) -> Result<Action, GridError> {
        Ok(self.store().dispatch(action)?)
    }

    /// Create an action from a named event and dispatch it
    pub fn dispatch_event(&self, event: &str, payload: Value) -> Result<Action, GridError> {
        let action = self.context.create_action(event, payload)?;
        self.dispatch(action)
    }

    /// Evaluate a named selector against the current state
    pub fn select(&self, selector: &str) -> Result<Value, GridError> {
        self.context.select(selector)
    }

    pub fn stats(&self) -> StoreStats {
        self.store().stats()
    }
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("context", &self.context)
            .field("synchronizer", &self.synchronizer)
            .finish()
    }
}
