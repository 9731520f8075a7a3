//! JSON value helpers shared by the merger, the reducers and the synchronizer

use serde_json::{Map, Value};

/// Top-level state key whose value is always replaced, never merged
pub const DATA_KEY: &str = "data";

/// Property set handed to the grid by its host
pub type Properties = Map<String, Value>;

/// Recursively merges `source` into `target`.
///
/// Objects merge key by key. Every other kind of value, arrays included,
/// replaces the target leaf.
pub fn deep_merge(target: &mut Value, source: &Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, value) in source_map {
                match target_map.get_mut(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        deep_merge(existing, value);
                    }
                    _ => {
                        target_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, source) => *target = source.clone(),
    }
}

/// Merges a state patch into a state object.
///
/// Same as [`deep_merge`] except that the top-level `data` key is replaced
/// wholesale.
pub fn merge_state(state: &mut Value, patch: &Value) {
    let (Value::Object(state_map), Value::Object(patch_map)) = (&mut *state, patch) else {
        deep_merge(state, patch);
        return;
    };

    for (key, value) in patch_map {
        match state_map.get_mut(key) {
            Some(existing) if key != DATA_KEY && existing.is_object() && value.is_object() => {
                deep_merge(existing, value);
            }
            _ => {
                state_map.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Folds a sequence of layers into one state object, in order
pub fn merge_layers<'a, I>(layers: I) -> Value
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut merged = Value::Object(Map::new());
    for layer in layers {
        merge_state(&mut merged, layer);
    }
    merged
}

/// Keys of `next` whose values differ from the same key in `previous`.
///
/// The comparison is per top-level key. Keys only present in `previous` are
/// not reported.
pub fn changed_properties(previous: &Properties, next: &Properties) -> Properties {
    next.iter()
        .filter(|(key, value)| previous.get(key.as_str()) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Reads a nested value by a list of object keys
pub fn get_path<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

/// Writes a nested value, creating intermediate objects as needed
pub fn set_path(value: &mut Value, path: &[&str], new_value: Value) {
    let Some((last, parents)) = path.split_last() else {
        *value = new_value;
        return;
    };

    let mut current = value;
    for key in parents {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Value::Object(map) = current else {
            return;
        };
        current = map
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Value::Object(map) = current {
        map.insert(last.to_string(), new_value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_deep_merge_objects() {
        let mut target = json!({"classNames": {"Cell": "a", "Row": "b"}, "icons": {}});
        deep_merge(&mut target, &json!({"classNames": {"Cell": "c"}, "styles": {"Table": {"x": 1}}}));

        assert_eq!(
            target,
            json!({
                "classNames": {"Cell": "c", "Row": "b"},
                "icons": {},
                "styles": {"Table": {"x": 1}}
            })
        );
    }

    #[test]
    fn test_arrays_replace() {
        let mut target = json!({"columns": [1, 2, 3]});
        deep_merge(&mut target, &json!({"columns": [4]}));
        assert_eq!(target, json!({"columns": [4]}));
    }

    #[test]
    fn test_data_replaces_wholesale() {
        let mut state = json!({"data": {"a": 1, "b": 2}, "sortProperties": {"a": 1}});
        merge_state(&mut state, &json!({"data": {"c": 3}, "sortProperties": {"b": 2}}));
        assert_eq!(state, json!({"data": {"c": 3}, "sortProperties": {"a": 1, "b": 2}}));
    }

    #[test]
    fn test_changed_properties() {
        let previous = json!({"x": 1, "y": 2}).as_object().cloned().unwrap_or_default();
        let next = json!({"x": 1, "y": 3, "z": 4}).as_object().cloned().unwrap_or_default();

        let changed = changed_properties(&previous, &next);
        assert_eq!(Value::Object(changed), json!({"y": 3, "z": 4}));
    }

    #[test]
    fn test_changed_properties_ignores_removed_keys() {
        let previous = json!({"x": 1, "gone": true}).as_object().cloned().unwrap_or_default();
        let next = json!({"x": 1}).as_object().cloned().unwrap_or_default();
        assert!(changed_properties(&previous, &next).is_empty());
    }

    #[test]
    fn test_paths() {
        let mut value = json!({});
        set_path(&mut value, &["pageProperties", "currentPage"], json!(3));
        assert_eq!(get_path(&value, &["pageProperties", "currentPage"]), Some(&json!(3)));
        assert_eq!(get_path(&value, &["pageProperties", "pageSize"]), None);
    }
}
