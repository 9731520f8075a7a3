//! Named events: action creators exposed to descendants
//!
//! An event turns a JSON payload into an [`Action`]. Descendants look events
//! up by name in the merged map and hand the result to the store.

use crate::action::{self, Action};
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

/// Action creator invoked with the caller's payload
pub type ActionCreator = Arc<dyn Fn(Value) -> Action + Send + Sync>;

/// Event name to action creator, in merge order
pub type EventMap = IndexMap<String, ActionCreator>;

/// Wrap a closure as an [`ActionCreator`]
pub fn action_creator<F>(creator: F) -> ActionCreator
where
    F: Fn(Value) -> Action + Send + Sync + 'static,
{
    Arc::new(creator)
}

/// Build an event map from `(name, creator)` pairs
pub fn event_map<I, S>(entries: I) -> EventMap
where
    I: IntoIterator<Item = (S, ActionCreator)>,
    S: Into<String>,
{
    entries
        .into_iter()
        .map(|(name, creator)| (name.into(), creator))
        .collect()
}

fn page_number(payload: &Value) -> u64 {
    payload.as_u64().unwrap_or(1)
}

/// The fixed base set: every base action creator plus `onFilter` and
/// `setSortProperties`.
pub fn base_events() -> EventMap {
    event_map([
        ("setFilter", action_creator(action::set_filter)),
        ("onFilter", action_creator(action::set_filter)),
        ("setPage", action_creator(|payload| action::set_page(page_number(&payload)))),
        ("nextPage", action_creator(|_| action::next_page())),
        ("previousPage", action_creator(|_| action::previous_page())),
        (
            "setPageSize",
            action_creator(|payload| action::set_page_size(payload.as_u64().unwrap_or(10))),
        ),
        ("setSortColumn", action_creator(action::set_sort_column)),
        (
            "setSortProperties",
            action_creator(|payload| {
                let column_id = payload
                    .get("columnId")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let current = payload.get("sortProperty").cloned().unwrap_or(Value::Null);
                action::set_sort_properties(&column_id, &current)
            }),
        ),
        ("toggleSettings", action_creator(|_| action::toggle_settings())),
        (
            "toggleColumn",
            action_creator(|payload| action::toggle_column(payload.as_str().unwrap_or_default())),
        ),
        (
            "updateState",
            action_creator(|payload| match payload {
                Value::Object(patch) => action::update_state(patch),
                _ => action::update_state(Default::default()),
            }),
        ),
    ])
}
