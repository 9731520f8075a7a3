//! Base data reducer: the slices every grid owns out of the box

use super::{reducer, reducer_map, ReducerMap};
use crate::action::*;
use serde_json::{json, Value};

/// Owner name used for the base reducer in collision reports
pub const BASE_REDUCER_OWNER: &str = "griddle";

fn filter(slice: &Value, action: &Action) -> Value {
    if action.is(GRIDDLE_SET_FILTER) {
        return action.payload.clone();
    }
    slice.clone()
}

fn page_properties(slice: &Value, action: &Action) -> Value {
    let mut next = match slice {
        Value::Object(_) => slice.clone(),
        _ => json!({}),
    };
    let current_page = next.get("currentPage").and_then(Value::as_u64).unwrap_or(1);

    let new_page = match action.action_type.as_str() {
        GRIDDLE_SET_PAGE => action.payload.as_u64().unwrap_or(current_page),
        GRIDDLE_NEXT_PAGE => current_page.saturating_add(1),
        GRIDDLE_PREVIOUS_PAGE => current_page.saturating_sub(1).max(1),
        // a new filter or page size invalidates the current page
        GRIDDLE_SET_FILTER => 1,
        GRIDDLE_SET_PAGE_SIZE => {
            if let Some(size) = action.payload.as_u64() {
                next["pageSize"] = json!(size);
            }
            1
        }
        _ => return slice.clone(),
    };

    next["currentPage"] = json!(new_page);
    next
}

fn sort_properties(slice: &Value, action: &Action) -> Value {
    if action.is(GRIDDLE_SET_SORT) {
        return action
            .payload
            .get("sortProperties")
            .cloned()
            .unwrap_or_else(|| action.payload.clone());
    }
    slice.clone()
}

fn show_settings(slice: &Value, action: &Action) -> Value {
    if action.is(GRIDDLE_TOGGLE_SETTINGS) {
        return json!(!slice.as_bool().unwrap_or(false));
    }
    slice.clone()
}

fn render_properties(slice: &Value, action: &Action) -> Value {
    if !action.is(GRIDDLE_TOGGLE_COLUMN) {
        return slice.clone();
    }
    let Some(column_id) = action.payload.as_str() else {
        return slice.clone();
    };

    let mut next = match slice {
        Value::Object(_) => slice.clone(),
        _ => json!({}),
    };
    let Some(render) = next.as_object_mut() else {
        return slice.clone();
    };
    let columns = render
        .entry("columnProperties")
        .or_insert_with(|| json!({}));
    if !columns.is_object() {
        *columns = json!({});
    }
    let Some(columns) = columns.as_object_mut() else {
        return slice.clone();
    };
    let column = columns
        .entry(column_id)
        .or_insert_with(|| json!({ "id": column_id }));
    if !column.is_object() {
        *column = json!({ "id": column_id });
    }
    let visible = column.get("visible").and_then(Value::as_bool).unwrap_or(true);
    if let Some(column) = column.as_object_mut() {
        column.insert("visible".to_string(), json!(!visible));
    }
    next
}

/// Namespaced base reducers
pub fn data_reducers() -> ReducerMap {
    reducer_map([
        ("filter", reducer(filter)),
        ("pageProperties", reducer(page_properties)),
        ("sortProperties", reducer(sort_properties)),
        ("showSettings", reducer(show_settings)),
        ("renderProperties", reducer(render_properties)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_paging() {
        let pages = json!({"currentPage": 2, "pageSize": 10});
        assert_eq!(page_properties(&pages, &next_page())["currentPage"], json!(3));
        assert_eq!(page_properties(&pages, &previous_page())["currentPage"], json!(1));
        assert_eq!(page_properties(&json!({"currentPage": 1}), &previous_page())["currentPage"], json!(1));
        assert_eq!(page_properties(&pages, &set_page(7))["currentPage"], json!(7));
    }

    #[test]
    fn test_page_size_resets_page() {
        let pages = json!({"currentPage": 4, "pageSize": 10});
        let next = page_properties(&pages, &set_page_size(25));
        assert_eq!(next, json!({"currentPage": 1, "pageSize": 25}));
    }

    #[test]
    fn test_unrelated_action_is_identity() {
        let pages = json!({"currentPage": 4, "pageSize": 10});
        assert_eq!(page_properties(&pages, &Action::bare("OTHER")), pages);
        assert_eq!(filter(&json!("x"), &Action::bare("OTHER")), json!("x"));
    }

    #[test]
    fn test_toggle_column_visibility() {
        let render = json!({"columnProperties": {"name": {"id": "name"}}});
        let hidden = render_properties(&render, &toggle_column("name"));
        assert_eq!(hidden["columnProperties"]["name"]["visible"], json!(false));

        let shown = render_properties(&hidden, &toggle_column("name"));
        assert_eq!(shown["columnProperties"]["name"]["visible"], json!(true));
    }

    #[test]
    fn test_next_page_saturates() {
        let pages = page_properties(&json!({"pageSize": 10}), &set_page(u64::MAX));
        let next = page_properties(&pages, &next_page());
        assert_eq!(next["currentPage"], json!(u64::MAX));
    }

    #[test]
    fn test_toggle_column_replaces_malformed_column_properties() {
        let render = json!({"columnProperties": [], "rowProperties": {"x": 1}});
        let toggled = render_properties(&render, &toggle_column("name"));
        assert_eq!(
            toggled,
            json!({
                "columnProperties": {"name": {"id": "name", "visible": false}},
                "rowProperties": {"x": 1}
            })
        );

        let scalar_column = json!({"columnProperties": {"name": 3}});
        let toggled = render_properties(&scalar_column, &toggle_column("name"));
        assert_eq!(toggled["columnProperties"]["name"], json!({"id": "name", "visible": false}));
    }

    #[test]
    fn test_toggle_settings() {
        assert_eq!(show_settings(&Value::Null, &toggle_settings()), json!(true));
        assert_eq!(show_settings(&json!(true), &toggle_settings()), json!(false));
    }
}
