//! Property-based tests for grid composition.
//!
//! These tests verify the guarantees every composed grid must satisfy:
//! - Precedence: user overrides win over base and plugin contributions
//! - Idempotence: deep-merging the same style config twice changes nothing
//! - Minimal synchronization: only changed properties are dispatched

use grid_core::component::{base_components, ComponentRef};
use grid_core::merge::{merge_components, merge_events, merge_selectors};
use grid_core::value::{changed_properties, deep_merge};
use grid_core::{
    action_creator, component, listener, middleware, selector, Action, Component, ComponentMap, EventMap, Grid,
    GridConfig, ListenerContext, ListenerSlot, Plugin, RenderNode, RenderScope, SelectorMap, SyncOutcome,
};
use parking_lot::Mutex;
use proptest::prelude::*;
use serde_json::{json, Map, Value};
use std::sync::Arc;

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

fn key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-e]{1,2}").unwrap()
}

fn leaf_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        (-100i64..100).prop_map(Value::from),
        prop::string::string_regex("[a-z]{0,6}").unwrap().prop_map(Value::from),
        prop::collection::vec(0i64..10, 0..3).prop_map(|items| json!(items)),
    ]
}

fn value_strategy() -> impl Strategy<Value = Value> {
    leaf_strategy().prop_recursive(3, 24, 4, |inner| {
        prop::collection::btree_map(key_strategy(), inner, 0..4)
            .prop_map(|entries| Value::Object(entries.into_iter().collect()))
    })
}

fn object_strategy() -> impl Strategy<Value = Value> {
    prop::collection::btree_map(key_strategy(), value_strategy(), 0..5)
        .prop_map(|entries| Value::Object(entries.into_iter().collect()))
}

fn properties_strategy() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map(key_strategy(), leaf_strategy(), 0..6).prop_map(|entries| entries.into_iter().collect())
}

fn name_list_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop::sample::select(vec!["Layout", "Table", "Row", "Cell", "Custom"]), 0..4)
        .prop_map(|names| names.into_iter().map(str::to_string).collect())
}

fn tagged(tag: &str) -> ComponentRef {
    let tag = tag.to_string();
    component(move |_: &RenderScope<'_>| RenderNode::text(tag.clone()))
}

fn render_tag(component: &ComponentRef) -> RenderNode {
    let grid = Grid::new(GridConfig::new()).unwrap();
    let context = grid.context();
    let state = json!({});
    component.render(&RenderScope::new(&context, &state))
}

// =============================================================================
// DEEP MERGE PROPERTIES
// =============================================================================

mod deep_merge_properties {
    use super::*;

    proptest! {
        /// Idempotence: merge(merge(a, b), b) == merge(a, b)
        #[test]
        fn merge_is_idempotent(a in object_strategy(), b in object_strategy()) {
            let mut once = a.clone();
            deep_merge(&mut once, &b);

            let mut twice = once.clone();
            deep_merge(&mut twice, &b);

            prop_assert_eq!(once, twice);
        }

        /// Every leaf of the source is readable at the same path afterwards
        #[test]
        fn source_leaves_win(a in object_strategy(), b in object_strategy()) {
            let mut merged = a.clone();
            deep_merge(&mut merged, &b);

            if let Value::Object(source) = &b {
                for (key, value) in source {
                    if !value.is_object() {
                        prop_assert_eq!(&merged[key], value);
                    }
                }
            }
        }

        /// Merging with an empty object changes nothing
        #[test]
        fn empty_source_is_identity(a in object_strategy()) {
            let mut merged = a.clone();
            deep_merge(&mut merged, &json!({}));
            prop_assert_eq!(merged, a);
        }
    }
}

// =============================================================================
// PRECEDENCE PROPERTIES
// =============================================================================

mod precedence_properties {
    use super::*;

    proptest! {
        /// A component name present in the user override resolves to the user's component
        #[test]
        fn user_components_win(
            plugin_names in prop::collection::vec(name_list_strategy(), 0..3),
            user_names in name_list_strategy(),
        ) {
            let plugins: Vec<Plugin> = plugin_names
                .iter()
                .enumerate()
                .map(|(index, names)| {
                    names.iter().fold(Plugin::new(format!("plugin-{index}")), |plugin, name| {
                        plugin.with_component(name.clone(), tagged(&format!("plugin-{index}")))
                    })
                })
                .collect();
            let user: ComponentMap = user_names
                .iter()
                .map(|name| (name.clone(), tagged("user")))
                .collect();

            let merged = merge_components(base_components(), &plugins, Some(&user));
            for name in &user_names {
                prop_assert_eq!(render_tag(&merged[name.as_str()]), RenderNode::text("user"));
            }
        }

        /// User events and selectors win the same way
        #[test]
        fn user_events_and_selectors_win(names in name_list_strategy()) {
            let plugin = names.iter().fold(Plugin::new("p"), |plugin, name| {
                plugin
                    .with_event(name.clone(), action_creator(|_| Action::bare("PLUGIN")))
                    .with_selector(name.clone(), selector(|_| json!("plugin")))
            });
            let user_events: EventMap = names
                .iter()
                .map(|name| (name.clone(), action_creator(|_| Action::bare("USER"))))
                .collect();
            let user_selectors: SelectorMap = names
                .iter()
                .map(|name| (name.clone(), selector(|_| json!("user"))))
                .collect();

            let plugins = [plugin];
            let events = merge_events(EventMap::new(), &plugins, Some(&user_events));
            let selectors = merge_selectors(SelectorMap::new(), &plugins, Some(&user_selectors));
            for name in &names {
                prop_assert_eq!((events[name.as_str()])(Value::Null), Action::bare("USER"));
                prop_assert_eq!((selectors[name.as_str()])(&Value::Null), json!("user"));
            }
        }
    }
}

// =============================================================================
// SYNCHRONIZER PROPERTIES
// =============================================================================

fn recording_grid(initial: &Map<String, Value>) -> (Grid, Arc<Mutex<Vec<Action>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    let recorder = middleware("recorder", move |_, action, next| {
        sink.lock().push(action.clone());
        next.run(action)
    });
    let mut config = GridConfig::new().middleware(recorder);
    config.extra = initial.clone();
    (Grid::new(config).unwrap(), log)
}

mod synchronizer_properties {
    use super::*;

    proptest! {
        /// Re-sending the construction properties dispatches nothing
        #[test]
        fn identical_properties_are_a_no_op(extra in properties_strategy()) {
            let (grid, log) = recording_grid(&extra);

            let outcome = grid.receive_properties(extra.clone()).unwrap();
            prop_assert_eq!(outcome, SyncOutcome::Unchanged);
            prop_assert!(log.lock().is_empty());
        }

        /// The dispatched patch holds exactly the changed keys
        #[test]
        fn patch_is_exactly_the_changed_subset(
            before in properties_strategy(),
            after in properties_strategy(),
        ) {
            let (grid, log) = recording_grid(&before);

            let expected = changed_properties(&before, &after);
            let outcome = grid.receive_properties(after.clone()).unwrap();

            let log = log.lock();
            if expected.is_empty() {
                prop_assert_eq!(outcome, SyncOutcome::Unchanged);
                prop_assert!(log.is_empty());
            } else {
                prop_assert_eq!(outcome, SyncOutcome::Dispatched(expected.clone()));
                prop_assert_eq!(log.len(), 1);
                prop_assert_eq!(&log[0].payload, &Value::Object(expected));
            }
        }
    }
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn sync_patch_example() {
    let initial: Map<String, Value> = json!({"x": 1, "y": 2}).as_object().cloned().unwrap_or_default();
    let (grid, log) = recording_grid(&initial);

    let next = json!({"x": 1, "y": 3, "z": 4}).as_object().cloned().unwrap_or_default();
    grid.receive_properties(next).unwrap();

    let log = log.lock();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].payload, json!({"y": 3, "z": 4}));
}

#[test]
fn listener_filtering_example() {
    let grid = Grid::new(
        GridConfig::new()
            .listener("a", ListenerSlot::handler(|_, _| Ok(())))
            .listener("b", ListenerSlot::Value(json!("not a function")))
            .listener("c", ListenerSlot::Value(Value::Null)),
    )
    .unwrap();

    assert_eq!(grid.context().store_listener().listener_names(), vec!["a".to_string()]);
}

#[test]
fn plugin_seeded_data_survives_without_user_data() {
    let seed = Plugin::new("seed").with_initial_state(json!({"data": [{"seeded": true}]}));
    let grid = Grid::new(GridConfig::new().plugin(seed.clone())).unwrap();
    assert_eq!(grid.state()["data"], json!([{"seeded": true}]));

    let grid = Grid::new(GridConfig::new().plugin(seed).data(json!([{"user": true}]))).unwrap();
    assert_eq!(grid.state()["data"], json!([{"user": true}]));
}

#[test]
fn default_page_properties_example() {
    let grid = Grid::new(GridConfig::new()).unwrap();
    assert_eq!(grid.state()["pageProperties"], json!({"currentPage": 1, "pageSize": 10}));
}

#[test]
fn queued_dispatch_keeps_notifications_ordered() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let first_log = log.clone();
    let second_log = log.clone();
    let grid = Grid::new(
        GridConfig::new()
            .listener(
                "first",
                ListenerSlot::handler(move |state, context| {
                    let page = state["pageProperties"]["currentPage"].clone();
                    first_log.lock().push(format!("first:{page}"));
                    if page == json!(2) {
                        context.dispatch_event("setPage", json!(4))?;
                    }
                    Ok(())
                }),
            )
            .listener(
                "second",
                ListenerSlot::handler(move |state, _| {
                    second_log
                        .lock()
                        .push(format!("second:{}", state["pageProperties"]["currentPage"]));
                    Ok(())
                }),
            ),
    )
    .unwrap();

    grid.dispatch_event("nextPage", Value::Null).unwrap();

    assert_eq!(*log.lock(), vec!["first:2", "second:2", "first:4", "second:4"]);
    assert_eq!(grid.select("currentPageSelector").unwrap(), json!(4));
}

#[test]
fn listener_replace_and_remove() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let grid = Grid::new(GridConfig::new()).unwrap();
    let context = grid.context();
    let registry = context.store_listener();

    for tag in ["old", "new"] {
        let calls = calls.clone();
        registry.add_listener(
            listener(move |_, _| {
                calls.lock().push(tag);
                Ok(())
            }),
            "watcher",
            ListenerContext::default(),
        );
    }

    grid.dispatch_event("nextPage", Value::Null).unwrap();
    assert_eq!(*calls.lock(), vec!["new"]);

    assert!(registry.remove_listener("watcher"));
    grid.dispatch_event("nextPage", Value::Null).unwrap();
    assert_eq!(*calls.lock(), vec!["new"]);
    assert!(!registry.has_listener("watcher"));
}
