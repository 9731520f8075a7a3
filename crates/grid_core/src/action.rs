//! Action protocol and the base action creators
//!
//! Actions are a type tag plus an opaque JSON payload. Plugins are free to
//! define their own tags; the constants below are the ones the base data
//! reducer understands.

use crate::value::Properties;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const GRIDDLE_SET_FILTER: &str = "GRIDDLE_SET_FILTER";
pub const GRIDDLE_SET_PAGE: &str = "GRIDDLE_SET_PAGE";
pub const GRIDDLE_NEXT_PAGE: &str = "GRIDDLE_NEXT_PAGE";
pub const GRIDDLE_PREVIOUS_PAGE: &str = "GRIDDLE_PREVIOUS_PAGE";
pub const GRIDDLE_SET_PAGE_SIZE: &str = "GRIDDLE_SET_PAGE_SIZE";
pub const GRIDDLE_SET_SORT: &str = "GRIDDLE_SET_SORT";
pub const GRIDDLE_TOGGLE_SETTINGS: &str = "GRIDDLE_TOGGLE_SETTINGS";
pub const GRIDDLE_TOGGLE_COLUMN: &str = "GRIDDLE_TOGGLE_COLUMN";
pub const GRIDDLE_UPDATE_STATE: &str = "GRIDDLE_UPDATE_STATE";

/// A dispatched action: type tag plus payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default)]
    pub payload: Value,
}

impl Action {
    /// Create an action with a payload
    pub fn new(action_type: impl Into<String>, payload: Value) -> Self {
        Self {
            action_type: action_type.into(),
            payload,
        }
    }

    /// Create an action without a payload
    pub fn bare(action_type: impl Into<String>) -> Self {
        Self::new(action_type, Value::Null)
    }

    /// Whether this action carries the given type tag
    pub fn is(&self, action_type: &str) -> bool {
        self.action_type == action_type
    }
}

pub fn set_filter(filter: Value) -> Action {
    Action::new(GRIDDLE_SET_FILTER, filter)
}

pub fn set_page(page_number: u64) -> Action {
    Action::new(GRIDDLE_SET_PAGE, json!(page_number))
}

pub fn next_page() -> Action {
    Action::bare(GRIDDLE_NEXT_PAGE)
}

pub fn previous_page() -> Action {
    Action::bare(GRIDDLE_PREVIOUS_PAGE)
}

pub fn set_page_size(page_size: u64) -> Action {
    Action::new(GRIDDLE_SET_PAGE_SIZE, json!(page_size))
}

/// Replace the sort properties with a single sort entry
pub fn set_sort_column(sort_property: Value) -> Action {
    Action::new(GRIDDLE_SET_SORT, json!({ "sortProperties": [sort_property] }))
}

pub fn toggle_settings() -> Action {
    Action::bare(GRIDDLE_TOGGLE_SETTINGS)
}

pub fn toggle_column(column_id: &str) -> Action {
    Action::new(GRIDDLE_TOGGLE_COLUMN, json!(column_id))
}

/// Generic patch action; the payload is deep-merged into state
pub fn update_state(patch: Properties) -> Action {
    Action::new(GRIDDLE_UPDATE_STATE, Value::Object(patch))
}

/// Toggle sorting on a column.
///
/// `sort_property` is the column's current sort entry (`{id, sortAscending}`)
/// or `null` when the column is not sorted yet, in which case sorting starts
/// ascending.
pub fn set_sort_properties(column_id: &str, sort_property: &Value) -> Action {
    if sort_property.is_null() {
        return set_sort_column(json!({ "id": column_id, "sortAscending": true }));
    }

    let ascending = sort_property
        .get("sortAscending")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let mut toggled = sort_property.clone();
    if let Value::Object(map) = &mut toggled {
        map.insert("sortAscending".to_string(), Value::Bool(!ascending));
    }
    set_sort_column(toggled)
}
