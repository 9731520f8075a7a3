//! Selectors: pure read functions over the unified state

use crate::value::get_path;
use indexmap::IndexMap;
use serde_json::{json, Value};
use std::sync::Arc;

/// Pure function deriving a value from state
pub type Selector = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Selector name to selector, in merge order
pub type SelectorMap = IndexMap<String, Selector>;

/// Wrap a closure as a [`Selector`]
pub fn selector<F>(f: F) -> Selector
where
    F: Fn(&Value) -> Value + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Build a selector map from `(name, selector)` pairs
pub fn selector_map<I, S>(entries: I) -> SelectorMap
where
    I: IntoIterator<Item = (S, Selector)>,
    S: Into<String>,
{
    entries
        .into_iter()
        .map(|(name, selector)| (name.into(), selector))
        .collect()
}

fn page_size(state: &Value) -> u64 {
    get_path(state, &["pageProperties", "pageSize"])
        .and_then(Value::as_u64)
        .filter(|size| *size > 0)
        .unwrap_or(10)
}

fn current_page(state: &Value) -> u64 {
    get_path(state, &["pageProperties", "currentPage"])
        .and_then(Value::as_u64)
        .unwrap_or(1)
}

fn record_count(state: &Value) -> u64 {
    get_path(state, &["pageProperties", "recordCount"])
        .and_then(Value::as_u64)
        .or_else(|| state.get("data").and_then(Value::as_array).map(|rows| rows.len() as u64))
        .unwrap_or(0)
}

fn max_page(state: &Value) -> u64 {
    record_count(state).div_ceil(page_size(state))
}

/// Column ids ordered by their `order` property, falling back to the keys of
/// the first data row when no columns were declared.
pub fn column_ids(state: &Value) -> Vec<String> {
    if let Some(columns) = get_path(state, &["renderProperties", "columnProperties"]).and_then(Value::as_object) {
        if !columns.is_empty() {
            let mut ids: Vec<(u64, &String)> = columns
                .iter()
                .map(|(id, props)| {
                    let order = props.get("order").and_then(Value::as_u64).unwrap_or(u64::MAX);
                    (order, id)
                })
                .collect();
            ids.sort_by_key(|(order, _)| *order);
            return ids.into_iter().map(|(_, id)| id.clone()).collect();
        }
    }

    state
        .get("data")
        .and_then(Value::as_array)
        .and_then(|rows| rows.first())
        .and_then(Value::as_object)
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default()
}

fn visible_column_ids(state: &Value) -> Vec<String> {
    column_ids(state)
        .into_iter()
        .filter(|id| {
            get_path(state, &["renderProperties", "columnProperties", id.as_str(), "visible"])
                .and_then(Value::as_bool)
                .unwrap_or(true)
        })
        .collect()
}

/// Base selectors available to every grid
pub fn base_selectors() -> SelectorMap {
    selector_map([
        (
            "dataSelector",
            selector(|state| state.get("data").cloned().unwrap_or_else(|| json!([]))),
        ),
        ("pageSizeSelector", selector(|state| json!(page_size(state)))),
        ("currentPageSelector", selector(|state| json!(current_page(state)))),
        ("recordCountSelector", selector(|state| json!(record_count(state)))),
        ("maxPageSelector", selector(|state| json!(max_page(state)))),
        (
            "hasNextSelector",
            selector(|state| json!(current_page(state) < max_page(state))),
        ),
        ("hasPreviousSelector", selector(|state| json!(current_page(state) > 1))),
        (
            "filterSelector",
            selector(|state| state.get("filter").cloned().unwrap_or_else(|| json!(""))),
        ),
        (
            "sortPropertiesSelector",
            selector(|state| state.get("sortProperties").cloned().unwrap_or(Value::Null)),
        ),
        ("columnIdsSelector", selector(|state| json!(column_ids(state)))),
        (
            "visibleColumnIdsSelector",
            selector(|state| json!(visible_column_ids(state))),
        ),
        (
            "textSelector",
            selector(|state| state.get("textProperties").cloned().unwrap_or_else(|| json!({}))),
        ),
    ])
}
