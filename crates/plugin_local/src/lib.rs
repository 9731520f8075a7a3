//! Local data plugin
//!
//! Filters, sorts and pages the grid's `data` in process. The base grid only
//! knows the raw rows; this plugin publishes the rows of the current page as
//! `visibleDataSelector` and recomputes the paging selectors from the
//! filtered row count. It also adds per-column filters, kept in its own
//! `columnFilters` state namespace.

use grid_core::action::Action;
use grid_core::component::{component, RenderNode, RenderScope};
use grid_core::event::action_creator;
use grid_core::plugin::{Plugin, PluginMetadata, SimplePluginFactory};
use grid_core::reducer::reducer;
use grid_core::selector::{column_ids, selector};
use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use tracing::debug;

pub const PLUGIN_NAME: &str = "local";

/// State namespace owned by this plugin
pub const COLUMN_FILTERS_KEY: &str = "columnFilters";

pub const LOCAL_SET_COLUMN_FILTER: &str = "LOCAL_SET_COLUMN_FILTER";
pub const LOCAL_CLEAR_COLUMN_FILTERS: &str = "LOCAL_CLEAR_COLUMN_FILTERS";

// ============================================================================
// Actions
// ============================================================================

/// Filter one column by a case-insensitive substring; an empty value clears it
pub fn set_column_filter(column_id: &str, value: &str) -> Action {
    Action::new(LOCAL_SET_COLUMN_FILTER, json!({ "columnId": column_id, "value": value }))
}

pub fn clear_column_filters() -> Action {
    Action::bare(LOCAL_CLEAR_COLUMN_FILTERS)
}

fn column_filters_reducer(slice: &Value, action: &Action) -> Value {
    match action.action_type.as_str() {
        LOCAL_SET_COLUMN_FILTER => {
            let mut filters = slice.as_object().cloned().unwrap_or_default();
            let Some(column_id) = action.payload.get("columnId").and_then(Value::as_str) else {
                return slice.clone();
            };
            match action.payload.get("value").and_then(Value::as_str) {
                Some(value) if !value.is_empty() => {
                    filters.insert(column_id.to_string(), json!(value));
                }
                _ => {
                    filters.remove(column_id);
                }
            }
            Value::Object(filters)
        }
        LOCAL_CLEAR_COLUMN_FILTERS => json!({}),
        _ => slice.clone(),
    }
}

// ============================================================================
// Row processing
// ============================================================================

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.to_lowercase(),
        Value::Null => String::new(),
        other => other.to_string().to_lowercase(),
    }
}

fn rows(state: &Value) -> Vec<Value> {
    state
        .get("data")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn matches_filter(row: &Value, columns: &[String], filter: &str) -> bool {
    if filter.is_empty() {
        return true;
    }
    let filter = filter.to_lowercase();
    match row.as_object() {
        Some(cells) if columns.is_empty() => cells.values().any(|value| cell_text(value).contains(&filter)),
        Some(cells) => columns
            .iter()
            .filter_map(|column| cells.get(column))
            .any(|value| cell_text(value).contains(&filter)),
        None => cell_text(row).contains(&filter),
    }
}

fn matches_column_filters(row: &Value, filters: &Map<String, Value>) -> bool {
    filters.iter().all(|(column, filter)| {
        let needle = filter.as_str().unwrap_or_default().to_lowercase();
        row.get(column)
            .map(|value| cell_text(value).contains(&needle))
            .unwrap_or(false)
    })
}

/// Rows passing the global filter and every column filter
pub fn filtered_rows(state: &Value) -> Vec<Value> {
    let filter = state.get("filter").and_then(Value::as_str).unwrap_or_default();
    let columns = column_ids(state);
    let column_filters = state
        .get(COLUMN_FILTERS_KEY)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    rows(state)
        .into_iter()
        .filter(|row| matches_filter(row, &columns, filter))
        .filter(|row| matches_column_filters(row, &column_filters))
        .collect()
}

fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(left), Value::Number(right)) => {
            let left = left.as_f64().unwrap_or_default();
            let right = right.as_f64().unwrap_or_default();
            left.partial_cmp(&right).unwrap_or(Ordering::Equal)
        }
        (Value::Bool(left), Value::Bool(right)) => left.cmp(right),
        (left, right) => cell_text(left).cmp(&cell_text(right)),
    }
}

/// Sort entries as `(column id, ascending)`, from `sortProperties`
fn sort_keys(state: &Value) -> Vec<(String, bool)> {
    state
        .get("sortProperties")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| {
                    let id = entry.get("id").and_then(Value::as_str)?;
                    let ascending = entry.get("sortAscending").and_then(Value::as_bool).unwrap_or(true);
                    Some((id.to_string(), ascending))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Filtered rows ordered by every sort entry in turn
pub fn sorted_rows(state: &Value) -> Vec<Value> {
    let mut rows = filtered_rows(state);
    let keys = sort_keys(state);
    if keys.is_empty() {
        return rows;
    }

    rows.sort_by(|left, right| {
        keys.iter()
            .map(|(column, ascending)| {
                let ordering = compare_values(
                    left.get(column).unwrap_or(&Value::Null),
                    right.get(column).unwrap_or(&Value::Null),
                );
                if *ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            })
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
    rows
}

fn page_size(state: &Value) -> usize {
    state
        .pointer("/pageProperties/pageSize")
        .and_then(Value::as_u64)
        .filter(|size| *size > 0)
        .unwrap_or(10) as usize
}

fn current_page(state: &Value) -> usize {
    state
        .pointer("/pageProperties/currentPage")
        .and_then(Value::as_u64)
        .filter(|page| *page > 0)
        .unwrap_or(1) as usize
}

fn max_page(state: &Value) -> usize {
    filtered_rows(state).len().div_ceil(page_size(state))
}

/// Rows of the current page
pub fn visible_rows(state: &Value) -> Vec<Value> {
    let size = page_size(state);
    let start = (current_page(state) - 1).saturating_mul(size);
    sorted_rows(state).into_iter().skip(start).take(size).collect()
}

// ============================================================================
// Components
// ============================================================================

fn page_summary(scope: &RenderScope<'_>) -> RenderNode {
    let total = scope.select("recordCountSelector").as_u64().unwrap_or(0);
    let shown = scope.select("visibleDataSelector").as_array().map(Vec::len).unwrap_or(0) as u64;
    let size = page_size(scope.state) as u64;
    let first = (current_page(scope.state) as u64 - 1).saturating_mul(size);

    let text = if shown == 0 {
        format!("0 of {total}")
    } else {
        format!("{}-{} of {}", first.saturating_add(1), first.saturating_add(shown), total)
    };
    RenderNode::element("span", scope.class_name("PageSummary"), vec![RenderNode::text(text)])
}

fn pagination(scope: &RenderScope<'_>) -> RenderNode {
    let children = ["PreviousButton", "PageDropdown", "PageSummary", "NextButton"]
        .iter()
        .map(|child| scope.render_child(child, Value::Null))
        .collect();
    RenderNode::element("div", scope.class_name("Pagination"), children)
}

// ============================================================================
// Plugin bundle
// ============================================================================

/// Build the local data plugin bundle
pub fn local_plugin() -> Plugin {
    debug!("📦 Building local data plugin");
    Plugin::new(PLUGIN_NAME)
        .with_metadata(
            PluginMetadata::new(PLUGIN_NAME, env!("CARGO_PKG_VERSION"))
                .with_description("Client-side filtering, sorting and paging"),
        )
        .with_reducer(COLUMN_FILTERS_KEY, reducer(column_filters_reducer))
        .with_selector("filteredDataSelector", selector(|state| json!(filtered_rows(state))))
        .with_selector("sortedDataSelector", selector(|state| json!(sorted_rows(state))))
        .with_selector("visibleDataSelector", selector(|state| json!(visible_rows(state))))
        .with_selector("recordCountSelector", selector(|state| json!(filtered_rows(state).len())))
        .with_selector("maxPageSelector", selector(|state| json!(max_page(state))))
        .with_selector(
            "hasNextSelector",
            selector(|state| json!(current_page(state) < max_page(state))),
        )
        .with_selector(
            "columnFiltersSelector",
            selector(|state| state.get(COLUMN_FILTERS_KEY).cloned().unwrap_or_else(|| json!({}))),
        )
        .with_event(
            "setColumnFilter",
            action_creator(|payload| {
                let column_id = payload.get("columnId").and_then(Value::as_str).unwrap_or_default();
                let value = payload.get("value").and_then(Value::as_str).unwrap_or_default();
                set_column_filter(column_id, value)
            }),
        )
        .with_event("clearColumnFilters", action_creator(|_| clear_column_filters()))
        .with_component("PageSummary", component(page_summary))
        .with_component("Pagination", component(pagination))
        .with_style_config(json!({
            "classNames": { "PageSummary": "griddle-page-summary" }
        }))
        .with_initial_state(json!({ COLUMN_FILTERS_KEY: {} }))
}

/// Factory for hosts that enable plugins by name
pub fn factory() -> SimplePluginFactory {
    SimplePluginFactory::new(PLUGIN_NAME, local_plugin)
}
