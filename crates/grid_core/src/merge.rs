//! Contribution merging
//!
//! Pure functions folding base defaults, plugin contributions (in list
//! order) and user overrides into the structures a grid runs on. Later
//! contributions win per key. Absent contributions are skipped; only a
//! reducer namespace collision or a strict-mode listener rejection fails.

use crate::component::{ComponentMap, SettingsComponentMap};
use crate::error::GridError;
use crate::event::EventMap;
use crate::listener::{sanitize_listeners, Listener, ListenerPolicy, ListenerSlots};
use crate::middleware::{MiddlewareRef, MiddlewareSlot};
use crate::plugin::Plugin;
use crate::reducer::{data::data_reducers, data::BASE_REDUCER_OWNER, CombinedReducer, ReducerMap};
use crate::rows::{properties_from_children, RowDefinition};
use crate::selector::SelectorMap;
use crate::state::{default_initial_state, default_page_properties, default_style_config};
use crate::value::{deep_merge, merge_layers, Properties, DATA_KEY};
use indexmap::IndexMap;
use serde_json::{json, Value};
use tracing::debug;

/// Shallow, last-wins merge of named maps
pub fn merge_named<'a, V, I>(base: IndexMap<String, V>, contributions: I) -> IndexMap<String, V>
where
    V: Clone + 'a,
    I: IntoIterator<Item = Option<&'a IndexMap<String, V>>>,
{
    contributions
        .into_iter()
        .flatten()
        .fold(base, |mut merged, contribution| {
            for (name, value) in contribution {
                merged.insert(name.clone(), value.clone());
            }
            merged
        })
}

pub fn merge_components(base: ComponentMap, plugins: &[Plugin], user: Option<&ComponentMap>) -> ComponentMap {
    let merged = merge_named(
        base,
        plugins
            .iter()
            .map(|plugin| plugin.components.as_ref())
            .chain(std::iter::once(user)),
    );
    debug!("🧩 Merged {} components", merged.len());
    merged
}

pub fn merge_settings_component_objects(
    base: SettingsComponentMap,
    plugins: &[Plugin],
    user: Option<&SettingsComponentMap>,
) -> SettingsComponentMap {
    merge_named(
        base,
        plugins
            .iter()
            .map(|plugin| plugin.settings_component_objects.as_ref())
            .chain(std::iter::once(user)),
    )
}

pub fn merge_events(base: EventMap, plugins: &[Plugin], user: Option<&EventMap>) -> EventMap {
    let merged = merge_named(
        base,
        plugins
            .iter()
            .map(|plugin| plugin.events.as_ref())
            .chain(std::iter::once(user)),
    );
    debug!("🧩 Merged {} events", merged.len());
    merged
}

pub fn merge_selectors(base: SelectorMap, plugins: &[Plugin], user: Option<&SelectorMap>) -> SelectorMap {
    let merged = merge_named(
        base,
        plugins
            .iter()
            .map(|plugin| plugin.selectors.as_ref())
            .chain(std::iter::once(user)),
    );
    debug!("🧩 Merged {} selectors", merged.len());
    merged
}

/// Deep merge of the default style config, plugin style configs and the user's
pub fn merge_style_config(plugins: &[Plugin], user: Option<&Value>) -> Value {
    let mut merged = default_style_config();
    for style in plugins
        .iter()
        .filter_map(|plugin| plugin.style_config.as_ref())
        .chain(user)
    {
        deep_merge(&mut merged, style);
    }
    merged
}

/// Row/column properties from the children, then plugins, then the user.
///
/// Each layer replaces top-level keys of the previous one.
pub fn merge_render_properties(
    children: Option<&RowDefinition>,
    plugins: &[Plugin],
    user: Option<&Value>,
) -> Value {
    let mut merged = properties_from_children(children);
    for layer in plugins
        .iter()
        .filter_map(|plugin| plugin.render_properties.as_ref())
        .chain(user)
    {
        if let (Value::Object(target), Value::Object(source)) = (&mut merged, layer) {
            for (key, value) in source {
                target.insert(key.clone(), value.clone());
            }
        }
    }
    merged
}

/// Default page properties overlaid by the user's
pub fn merge_page_properties(user: Option<&Value>) -> Value {
    let mut merged = default_page_properties();
    if let (Value::Object(target), Some(Value::Object(source))) = (&mut merged, user) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Values that always win in the initial state
#[derive(Debug, Clone, Default)]
pub struct ForcedState {
    /// `None` when the user gave no data
    pub data: Option<Value>,
    pub page_properties: Value,
    pub render_properties: Value,
    /// `None` when the user gave no sort properties
    pub sort_properties: Option<Value>,
    pub style_config: Value,
}

impl ForcedState {
    fn into_layer(self) -> Value {
        let mut layer = json!({
            "pageProperties": self.page_properties,
            "renderProperties": self.render_properties,
            "sortProperties": self.sort_properties.unwrap_or_else(|| json!({})),
            "styleConfig": self.style_config
        });
        if let (Some(data), Some(fields)) = (self.data, layer.as_object_mut()) {
            fields.insert(DATA_KEY.to_string(), data);
        }
        layer
    }
}

/// Deep merge of defaults, plugin initial state, the user's remaining
/// properties and finally the forced keys.
///
/// The forced layer is merged like every other layer, so a plugin's nested
/// values under a forced key survive unless the forced value overrides them.
/// `data` is always replaced, and only forced when the user supplied it.
pub fn merge_initial_state(plugins: &[Plugin], extra: &Properties, forced: ForcedState) -> Value {
    let defaults = default_initial_state();
    let user = Value::Object(extra.clone());
    let forced = forced.into_layer();

    let layers = std::iter::once(&defaults)
        .chain(plugins.iter().filter_map(|plugin| plugin.initial_state.as_ref()))
        .chain([&user, &forced]);
    merge_layers(layers)
}

/// Combine the base data reducer with every plugin reducer contribution
pub fn combine_reducers(plugins: &[Plugin]) -> Result<CombinedReducer, GridError> {
    let base = data_reducers();
    let contributions: Vec<(&str, &ReducerMap)> = std::iter::once((BASE_REDUCER_OWNER, &base))
        .chain(
            plugins
                .iter()
                .filter_map(|plugin| plugin.reducer.as_ref().map(|reducer| (plugin.name(), reducer))),
        )
        .collect();
    CombinedReducer::combine(contributions)
}

/// Plugin middleware in plugin order, then user middleware, empty slots dropped
pub fn flatten_middleware(plugins: &[Plugin], user: &[MiddlewareSlot]) -> Vec<MiddlewareRef> {
    let flattened: Vec<MiddlewareRef> = plugins
        .iter()
        .filter_map(|plugin| plugin.middleware.as_deref())
        .chain(std::iter::once(user))
        .flatten()
        .flatten()
        .cloned()
        .collect();
    debug!("🧩 Flattened {} middleware", flattened.len());
    flattened
}

/// User listeners, overwritten per name by each plugin's, handlers only
pub fn merge_listeners(
    user: &ListenerSlots,
    plugins: &[Plugin],
    policy: ListenerPolicy,
) -> Result<IndexMap<String, Listener>, GridError> {
    let mut merged = sanitize_listeners(user, "user config", policy)?;
    for plugin in plugins {
        if let Some(listeners) = &plugin.listeners {
            let source = format!("plugin '{}'", plugin.name());
            merged.extend(sanitize_listeners(listeners, &source, policy)?);
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::component::{component, RenderNode, RenderScope};
    use crate::listener::ListenerSlot;
    use crate::middleware::middleware;
    use crate::reducer::reducer;
    use crate::rows::ColumnDefinition;
    use pretty_assertions::assert_eq;

    fn text_component(text: &'static str) -> crate::component::ComponentRef {
        component(move |_: &RenderScope<'_>| RenderNode::text(text))
    }

    #[test]
    fn test_components_last_wins() {
        let base = crate::component::component_map([("Layout", text_component("base")), ("Cell", text_component("base"))]);
        let plugin = Plugin::new("p").with_component("Layout", text_component("plugin"));
        let user = crate::component::component_map([("Cell", text_component("user"))]);

        let merged = merge_components(base, &[plugin], Some(&user));
        assert_eq!(merged.len(), 2);
        assert!(std::sync::Arc::ptr_eq(&merged["Cell"], &user["Cell"]));
    }

    #[test]
    fn test_style_config_deep_merge() {
        let plugin = Plugin::new("p").with_style_config(json!({"classNames": {"Cell": "plugin-cell"}}));
        let user = json!({"classNames": {"Row": "user-row"}, "styles": {"Table": {"border": 0}}});

        let merged = merge_style_config(&[plugin], Some(&user));
        assert_eq!(merged["classNames"]["Cell"], json!("plugin-cell"));
        assert_eq!(merged["classNames"]["Row"], json!("user-row"));
        assert_eq!(merged["classNames"]["Table"], json!("griddle-table"));
        assert_eq!(merged["styles"], json!({"Table": {"border": 0}}));
        assert_eq!(merged["icons"]["TableHeadingCell"]["sortAscendingIcon"], json!("▲"));
    }

    #[test]
    fn test_render_properties_layers() {
        let row = RowDefinition::new().column(ColumnDefinition::new("name"));
        let plugin = Plugin::new("p").with_render_properties(json!({"pluginKey": 1}));
        let user = json!({"userKey": 2});

        let merged = merge_render_properties(Some(&row), &[plugin], Some(&user));
        assert_eq!(
            merged,
            json!({
                "rowProperties": {},
                "columnProperties": {"name": {"id": "name", "order": 0}},
                "pluginKey": 1,
                "userKey": 2
            })
        );
    }

    #[test]
    fn test_page_properties_default_and_overlay() {
        assert_eq!(merge_page_properties(None), json!({"currentPage": 1, "pageSize": 10}));
        assert_eq!(
            merge_page_properties(Some(&json!({"pageSize": 25}))),
            json!({"currentPage": 1, "pageSize": 25})
        );
    }

    #[test]
    fn test_initial_state_layers() {
        let plugin = Plugin::new("p").with_initial_state(json!({
            "enableSettings": false,
            "data": [{"ignored": true}],
            "pluginKey": "plugin"
        }));
        let extra = json!({"pluginKey": "user", "userKey": 1}).as_object().cloned().unwrap_or_default();
        let forced = ForcedState {
            data: Some(json!([{"name": "a"}])),
            page_properties: merge_page_properties(None),
            render_properties: json!({}),
            sort_properties: None,
            style_config: json!({}),
        };

        let state = merge_initial_state(&[plugin], &extra, forced);
        assert_eq!(state["enableSettings"], json!(false));
        assert_eq!(state["textProperties"]["next"], json!("Next"));
        assert_eq!(state["pluginKey"], json!("user"));
        assert_eq!(state["userKey"], json!(1));
        assert_eq!(state["data"], json!([{"name": "a"}]));
        assert_eq!(state["sortProperties"], json!({}));
    }

    #[test]
    fn test_initial_state_keeps_plugin_data_without_user_data() {
        let seeded = Plugin::new("seed").with_initial_state(json!({"data": [{"seeded": true}]}));
        let forced = ForcedState {
            page_properties: merge_page_properties(None),
            ..ForcedState::default()
        };

        let state = merge_initial_state(&[seeded], &Properties::new(), forced.clone());
        assert_eq!(state["data"], json!([{"seeded": true}]));

        let empty = merge_initial_state(&[], &Properties::new(), forced);
        assert_eq!(empty["data"], json!([]));
    }

    #[test]
    fn test_reducer_collision_with_base() {
        let plugin = Plugin::new("rogue").with_reducer("pageProperties", reducer(|slice: &Value, _: &Action| slice.clone()));
        match combine_reducers(&[plugin]) {
            Err(GridError::ReducerNamespaceCollision { first, second, .. }) => {
                assert_eq!(first, BASE_REDUCER_OWNER);
                assert_eq!(second, "rogue");
            }
            other => panic!("expected collision, got {other:?}"),
        }
    }

    #[test]
    fn test_flatten_middleware_order() {
        let a = middleware("a", |_, action, next| next.run(action));
        let b = middleware("b", |_, action, next| next.run(action));
        let user = middleware("user", |_, action, next| next.run(action));

        let mut first = Plugin::new("first").with_middleware(a);
        first.middleware.get_or_insert_with(Vec::new).push(None);
        let second = Plugin::new("second").with_middleware(b);

        let flattened = flatten_middleware(&[first, second], &[None, Some(user)]);
        let names: Vec<&str> = flattened.iter().map(|middleware| middleware.name()).collect();
        assert_eq!(names, vec!["a", "b", "user"]);
    }

    #[test]
    fn test_plugin_listeners_overwrite_user() {
        let mut user = ListenerSlots::new();
        user.insert("shared".to_string(), ListenerSlot::handler(|_, _| Ok(())));
        user.insert("userOnly".to_string(), ListenerSlot::handler(|_, _| Ok(())));
        user.insert("broken".to_string(), ListenerSlot::Value(json!("not a function")));

        let plugin_handler = crate::listener::listener(|_, _| Ok(()));
        let plugin = Plugin::new("p")
            .with_listener("shared", ListenerSlot::Handler(plugin_handler.clone()))
            .with_listener("undefined", ListenerSlot::Value(Value::Null));

        let merged = merge_listeners(&user, &[plugin], ListenerPolicy::Lenient).unwrap();
        assert_eq!(merged.keys().collect::<Vec<_>>(), vec!["shared", "userOnly"]);
        assert!(std::sync::Arc::ptr_eq(&merged["shared"], &plugin_handler));
    }
}
