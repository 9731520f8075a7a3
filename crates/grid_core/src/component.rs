//! Components and the render tree they produce
//!
//! Rendering proper belongs to the host UI layer. Components here describe
//! what they would draw as a [`RenderNode`] tree, reading state and merged
//! maps through the [`RenderScope`] they are handed.

use crate::context::GridContext;
use crate::value::get_path;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Name of the component the composition root mounts
pub const LAYOUT: &str = "Layout";

/// Description of rendered output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RenderNode {
    /// State provider shell emitted by the composition root
    Provider { store_key: String, child: Box<RenderNode> },
    /// Output of a named component
    Component { name: String, output: Box<RenderNode> },
    /// Markup-like element
    Element {
        tag: String,
        class_name: Option<String>,
        props: Value,
        children: Vec<RenderNode>,
    },
    Text { text: String },
    /// A component name that is not in the merged map
    Missing { name: String },
    Empty,
}

impl RenderNode {
    pub fn element(tag: &str, class_name: Option<String>, children: Vec<RenderNode>) -> Self {
        RenderNode::Element {
            tag: tag.to_string(),
            class_name,
            props: Value::Null,
            children,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        RenderNode::Text { text: text.into() }
    }

    /// Name of the component this node was produced by, if any
    pub fn component_name(&self) -> Option<&str> {
        match self {
            RenderNode::Component { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Depth-first search for the first component node with `name`
    pub fn find_component(&self, name: &str) -> Option<&RenderNode> {
        match self {
            RenderNode::Component { name: own, output } => {
                if own == name {
                    Some(self)
                } else {
                    output.find_component(name)
                }
            }
            RenderNode::Provider { child, .. } => child.find_component(name),
            RenderNode::Element { children, .. } => {
                children.iter().find_map(|child| child.find_component(name))
            }
            _ => None,
        }
    }
}

/// Everything a component may read while rendering
pub struct RenderScope<'a> {
    pub context: &'a GridContext,
    pub state: &'a Value,
    pub props: Value,
}

impl<'a> RenderScope<'a> {
    pub fn new(context: &'a GridContext, state: &'a Value) -> Self {
        Self {
            context,
            state,
            props: Value::Null,
        }
    }

    /// Render a named component from the merged map with the given props
    pub fn render_child(&self, name: &str, props: Value) -> RenderNode {
        let Some(component) = self.context.components().get(name) else {
            return RenderNode::Missing {
                name: name.to_string(),
            };
        };

        let child_scope = RenderScope {
            context: self.context,
            state: self.state,
            props,
        };
        RenderNode::Component {
            name: name.to_string(),
            output: Box::new(component.render(&child_scope)),
        }
    }

    /// Evaluate a merged selector, `Null` when it does not exist
    pub fn select(&self, name: &str) -> Value {
        self.context
            .selectors()
            .get(name)
            .map(|selector| selector(self.state))
            .unwrap_or(Value::Null)
    }

    /// Class name configured for a component in `styleConfig.classNames`
    pub fn class_name(&self, component: &str) -> Option<String> {
        get_path(self.state, &["styleConfig", "classNames", component])
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn text(&self, key: &str) -> String {
        get_path(self.state, &["textProperties", key])
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }
}

/// A renderable component implementation
pub trait Component: Send + Sync {
    fn render(&self, scope: &RenderScope<'_>) -> RenderNode;
}

impl<F> Component for F
where
    F: Fn(&RenderScope<'_>) -> RenderNode + Send + Sync,
{
    fn render(&self, scope: &RenderScope<'_>) -> RenderNode {
        self(scope)
    }
}

/// Shared handle to a component implementation
pub type ComponentRef = Arc<dyn Component>;

/// Component name to implementation, in merge order
pub type ComponentMap = IndexMap<String, ComponentRef>;

/// Wrap a closure as a [`ComponentRef`]
pub fn component<F>(render: F) -> ComponentRef
where
    F: Fn(&RenderScope<'_>) -> RenderNode + Send + Sync + 'static,
{
    Arc::new(render)
}

/// Build a component map from `(name, component)` pairs
pub fn component_map<I, S>(entries: I) -> ComponentMap
where
    I: IntoIterator<Item = (S, ComponentRef)>,
    S: Into<String>,
{
    entries
        .into_iter()
        .map(|(name, component)| (name.into(), component))
        .collect()
}

/// A component shown inside the settings panel, ordered by `order`
#[derive(Clone)]
pub struct SettingsComponentObject {
    pub order: u32,
    pub component: ComponentRef,
}

impl std::fmt::Debug for SettingsComponentObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsComponentObject")
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

pub type SettingsComponentMap = IndexMap<String, SettingsComponentObject>;

// ============================================================================
// Base components
// ============================================================================

fn wrapper(scope: &RenderScope<'_>, name: &str, tag: &str, children: &[&str]) -> RenderNode {
    let rendered = children
        .iter()
        .map(|child| scope.render_child(child, Value::Null))
        .collect();
    RenderNode::element(tag, scope.class_name(name), rendered)
}

fn rows_for_body(scope: &RenderScope<'_>) -> Vec<Value> {
    // Plugins that page or filter locally publish the visible rows
    let visible = scope.select("visibleDataSelector");
    let rows = if visible.is_array() {
        visible
    } else {
        scope.select("dataSelector")
    };
    rows.as_array().cloned().unwrap_or_default()
}

fn layout(scope: &RenderScope<'_>) -> RenderNode {
    wrapper(scope, LAYOUT, "div", &["Filter", "SettingsToggle", "Settings", "Table", "Pagination"])
}

fn table(scope: &RenderScope<'_>) -> RenderNode {
    if rows_for_body(scope).is_empty() {
        return scope.render_child("NoResults", Value::Null);
    }
    wrapper(scope, "Table", "table", &["TableHeading", "TableBody"])
}

fn table_heading(scope: &RenderScope<'_>) -> RenderNode {
    let cells = scope
        .select("visibleColumnIdsSelector")
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .map(|column_id| scope.render_child("TableHeadingCell", json!({ "columnId": column_id })))
        .collect();
    RenderNode::element("thead", scope.class_name("TableHeading"), cells)
}

fn table_heading_cell(scope: &RenderScope<'_>) -> RenderNode {
    let column_id = scope.props.get("columnId").and_then(Value::as_str).unwrap_or_default();
    let title = get_path(
        scope.state,
        &["renderProperties", "columnProperties", column_id, "title"],
    )
    .and_then(Value::as_str)
    .unwrap_or(column_id);

    let sorted = scope
        .state
        .get("sortProperties")
        .and_then(Value::as_array)
        .and_then(|entries| {
            entries
                .iter()
                .find(|entry| entry.get("id").and_then(Value::as_str) == Some(column_id))
        })
        .and_then(|entry| entry.get("sortAscending").and_then(Value::as_bool));

    let mut children = vec![RenderNode::text(title)];
    let icon_key = match sorted {
        Some(true) => Some("sortAscendingIcon"),
        Some(false) => Some("sortDescendingIcon"),
        None => None,
    };
    if let Some(icon) = icon_key
        .and_then(|key| get_path(scope.state, &["styleConfig", "icons", "TableHeadingCell", key]))
        .and_then(Value::as_str)
    {
        children.push(RenderNode::text(icon));
    }
    RenderNode::element("th", scope.class_name("TableHeadingCell"), children)
}

fn table_body(scope: &RenderScope<'_>) -> RenderNode {
    let rows = rows_for_body(scope)
        .into_iter()
        .enumerate()
        .map(|(index, row)| scope.render_child("Row", json!({ "index": index, "row": row })))
        .collect();
    RenderNode::element("tbody", scope.class_name("TableBody"), rows)
}

fn row(scope: &RenderScope<'_>) -> RenderNode {
    let row = scope.props.get("row").cloned().unwrap_or(Value::Null);
    let cells = scope
        .select("visibleColumnIdsSelector")
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .map(|column_id| {
            let value = column_id
                .as_str()
                .and_then(|id| row.get(id))
                .cloned()
                .unwrap_or(Value::Null);
            scope.render_child("Cell", json!({ "columnId": column_id, "value": value }))
        })
        .collect();
    RenderNode::element("tr", scope.class_name("Row"), cells)
}

fn cell(scope: &RenderScope<'_>) -> RenderNode {
    let text = match scope.props.get("value") {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    RenderNode::element("td", scope.class_name("Cell"), vec![RenderNode::text(text)])
}

fn filter(scope: &RenderScope<'_>) -> RenderNode {
    let current = scope.select("filterSelector");
    RenderNode::Element {
        tag: "input".to_string(),
        class_name: scope.class_name("Filter"),
        props: json!({ "value": current, "event": "onFilter" }),
        children: Vec::new(),
    }
}

fn pagination(scope: &RenderScope<'_>) -> RenderNode {
    wrapper(scope, "Pagination", "div", &["PreviousButton", "PageDropdown", "NextButton"])
}

fn page_button(scope: &RenderScope<'_>, name: &str, text_key: &str, enabled_selector: &str) -> RenderNode {
    if scope.select(enabled_selector) != Value::Bool(true) {
        return RenderNode::Empty;
    }
    RenderNode::element("button", scope.class_name(name), vec![RenderNode::text(scope.text(text_key))])
}

fn page_dropdown(scope: &RenderScope<'_>) -> RenderNode {
    let max_page = scope.select("maxPageSelector").as_u64().unwrap_or(0);
    let options = (1..=max_page)
        .map(|page| RenderNode::element("option", None, vec![RenderNode::text(page.to_string())]))
        .collect();
    RenderNode::Element {
        tag: "select".to_string(),
        class_name: scope.class_name("PageDropdown"),
        props: json!({ "value": scope.select("currentPageSelector") }),
        children: options,
    }
}

fn settings_toggle(scope: &RenderScope<'_>) -> RenderNode {
    let enabled = scope
        .state
        .get("enableSettings")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if !enabled {
        return RenderNode::Empty;
    }
    RenderNode::element(
        "button",
        scope.class_name("SettingsToggle"),
        vec![RenderNode::text(scope.text("settingsToggle"))],
    )
}

fn settings(scope: &RenderScope<'_>) -> RenderNode {
    let visible = scope
        .state
        .get("showSettings")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if !visible {
        return RenderNode::Empty;
    }

    let mut objects: Vec<(&String, &SettingsComponentObject)> =
        scope.context.settings_component_objects().iter().collect();
    objects.sort_by_key(|(_, object)| object.order);

    let children = objects
        .into_iter()
        .map(|(name, object)| RenderNode::Component {
            name: name.clone(),
            output: Box::new(object.component.render(scope)),
        })
        .collect();
    RenderNode::element("div", scope.class_name("Settings"), children)
}

fn column_chooser(scope: &RenderScope<'_>) -> RenderNode {
    let choices = scope
        .select("columnIdsSelector")
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .map(|column_id| RenderNode::Element {
            tag: "label".to_string(),
            class_name: None,
            props: json!({ "columnId": column_id, "event": "toggleColumn" }),
            children: Vec::new(),
        })
        .collect();
    RenderNode::element("div", None, choices)
}

fn page_size_settings(scope: &RenderScope<'_>) -> RenderNode {
    RenderNode::Element {
        tag: "input".to_string(),
        class_name: None,
        props: json!({ "value": scope.select("pageSizeSelector"), "event": "setPageSize" }),
        children: Vec::new(),
    }
}

/// Base component set every grid starts from
pub fn base_components() -> ComponentMap {
    component_map([
        (LAYOUT, component(layout)),
        ("Table", component(table)),
        ("TableHeading", component(table_heading)),
        ("TableHeadingCell", component(table_heading_cell)),
        ("TableBody", component(table_body)),
        ("Row", component(row)),
        ("Cell", component(cell)),
        ("Filter", component(filter)),
        ("Pagination", component(pagination)),
        (
            "NextButton",
            component(|scope: &RenderScope<'_>| page_button(scope, "NextButton", "next", "hasNextSelector")),
        ),
        (
            "PreviousButton",
            component(|scope: &RenderScope<'_>| {
                page_button(scope, "PreviousButton", "previous", "hasPreviousSelector")
            }),
        ),
        ("PageDropdown", component(page_dropdown)),
        ("SettingsToggle", component(settings_toggle)),
        ("Settings", component(settings)),
        (
            "NoResults",
            component(|scope: &RenderScope<'_>| {
                RenderNode::element("div", scope.class_name("NoResults"), vec![RenderNode::text("No results found.")])
            }),
        ),
        (
            "Loading",
            component(|scope: &RenderScope<'_>| {
                RenderNode::element("div", scope.class_name("Loading"), vec![RenderNode::text("Loading...")])
            }),
        ),
    ])
}

/// Base settings panel entries
pub fn base_settings_component_objects() -> SettingsComponentMap {
    let mut objects = SettingsComponentMap::new();
    objects.insert(
        "columnChooser".to_string(),
        SettingsComponentObject {
            order: 1,
            component: component(column_chooser),
        },
    );
    objects.insert(
        "pageSizeSettings".to_string(),
        SettingsComponentObject {
            order: 2,
            component: component(page_size_settings),
        },
    );
    objects
}
