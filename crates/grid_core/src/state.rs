//! Built-in state defaults

use serde_json::{json, Value};

pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Page properties used when the user supplies none
pub fn default_page_properties() -> Value {
    json!({ "currentPage": 1, "pageSize": DEFAULT_PAGE_SIZE })
}

/// First initial-state layer, below every plugin and user contribution
pub fn default_initial_state() -> Value {
    json!({
        "data": [],
        "enableSettings": true,
        "textProperties": {
            "next": "Next",
            "previous": "Previous",
            "settingsToggle": "Settings"
        }
    })
}

/// Base style config: sort icons and one class name per base component
pub fn default_style_config() -> Value {
    json!({
        "icons": {
            "TableHeadingCell": {
                "sortDescendingIcon": "▼",
                "sortAscendingIcon": "▲"
            }
        },
        "classNames": {
            "Cell": "griddle-cell",
            "Filter": "griddle-filter",
            "Loading": "griddle-loadingResults",
            "NextButton": "griddle-next-button",
            "NoResults": "griddle-noResults",
            "PageDropdown": "griddle-page-select",
            "Pagination": "griddle-pagination",
            "PreviousButton": "griddle-previous-button",
            "Row": "griddle-row",
            "RowDefinition": "griddle-row-definition",
            "Settings": "griddle-settings",
            "SettingsToggle": "griddle-settings-toggle",
            "Table": "griddle-table",
            "TableBody": "griddle-table-body",
            "TableHeading": "griddle-table-heading",
            "TableHeadingCell": "griddle-table-heading-cell",
            "TableHeadingCellAscending": "griddle-heading-ascending",
            "TableHeadingCellDescending": "griddle-heading-descending"
        },
        "styles": {}
    })
}
