//! Row and column definitions supplied as grid children
//!
//! A grid may be given one [`RowDefinition`] describing its columns. The
//! definition is turned into the `rowProperties`/`columnProperties` pair of
//! the render properties.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Declares one column of the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub id: String,
    /// Extra column properties, e.g. `title` or `visible`
    #[serde(default, flatten)]
    pub properties: Map<String, Value>,
}

impl ColumnDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            properties: Map::new(),
        }
    }

    pub fn title(self, title: impl Into<String>) -> Self {
        self.property("title", json!(title.into()))
    }

    pub fn visible(self, visible: bool) -> Self {
        self.property("visible", json!(visible))
    }

    pub fn property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }
}

/// Declares the row layout and its columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowDefinition {
    /// Row-level properties
    #[serde(default, flatten)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
}

impl RowDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Row properties as stored in state
    pub fn row_properties(&self) -> Value {
        Value::Object(self.properties.clone())
    }

    /// Column id to `{id, order, ...properties}`, with `order` the declaration index
    pub fn column_properties(&self) -> Value {
        let columns = self
            .columns
            .iter()
            .enumerate()
            .map(|(order, column)| {
                let mut properties = Map::new();
                properties.insert("id".to_string(), json!(column.id));
                properties.insert("order".to_string(), json!(order));
                for (key, value) in &column.properties {
                    properties.insert(key.clone(), value.clone());
                }
                (column.id.clone(), Value::Object(properties))
            })
            .collect();
        Value::Object(columns)
    }
}

/// `{rowProperties, columnProperties}` for an optional row definition.
///
/// Without a definition both are absent: `rowProperties` is `null` and
/// `columnProperties` is empty.
pub fn properties_from_children(children: Option<&RowDefinition>) -> Value {
    match children {
        Some(row) => json!({
            "rowProperties": row.row_properties(),
            "columnProperties": row.column_properties(),
        }),
        None => json!({
            "rowProperties": Value::Null,
            "columnProperties": {},
        }),
    }
}
