//! Namespaced reducers and their combination
//!
//! Every reducer contribution maps a namespace (a top-level state key) to a
//! slice reducer. Combining contributions checks that no namespace is
//! claimed twice, so slices of different owners can never overwrite each
//! other. The combined reducer also applies the generic
//! [`GRIDDLE_UPDATE_STATE`] patch protocol to the whole state before the
//! slice reducers run.

pub mod data;

use crate::action::{Action, GRIDDLE_UPDATE_STATE};
use crate::error::GridError;
use crate::value::merge_state;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Pure `(slice, action) -> slice` function for one namespace.
///
/// The slice is `Null` when the namespace is absent from state.
pub trait Reducer: Send + Sync {
    fn reduce(&self, slice: &Value, action: &Action) -> Value;
}

impl<F> Reducer for F
where
    F: Fn(&Value, &Action) -> Value + Send + Sync,
{
    fn reduce(&self, slice: &Value, action: &Action) -> Value {
        self(slice, action)
    }
}

/// Shared handle to a slice reducer
pub type ReducerRef = Arc<dyn Reducer>;

/// Namespace to slice reducer, as contributed by one owner
pub type ReducerMap = IndexMap<String, ReducerRef>;

/// Wrap a closure as a [`ReducerRef`]
pub fn reducer<F>(f: F) -> ReducerRef
where
    F: Fn(&Value, &Action) -> Value + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Build a reducer map from `(namespace, reducer)` pairs
pub fn reducer_map<I, S>(entries: I) -> ReducerMap
where
    I: IntoIterator<Item = (S, ReducerRef)>,
    S: Into<String>,
{
    entries
        .into_iter()
        .map(|(namespace, reducer)| (namespace.into(), reducer))
        .collect()
}

struct SliceReducer {
    namespace: String,
    owner: String,
    reducer: ReducerRef,
}

/// Single reducer assembled from every namespaced contribution
pub struct CombinedReducer {
    slices: Vec<SliceReducer>,
}

impl CombinedReducer {
    /// Combine `(owner, reducers)` contributions in order.
    ///
    /// Fails with [`GridError::ReducerNamespaceCollision`] as soon as a
    /// namespace is claimed by a second owner.
    pub fn combine<'a, I>(contributions: I) -> Result<Self, GridError>
    where
        I: IntoIterator<Item = (&'a str, &'a ReducerMap)>,
    {
        let mut owners: IndexMap<String, String> = IndexMap::new();
        let mut slices = Vec::new();

        for (owner, reducers) in contributions {
            for (namespace, reducer) in reducers {
                if let Some(first) = owners.get(namespace) {
                    return Err(GridError::ReducerNamespaceCollision {
                        namespace: namespace.clone(),
                        first: first.clone(),
                        second: owner.to_string(),
                    });
                }
                owners.insert(namespace.clone(), owner.to_string());
                slices.push(SliceReducer {
                    namespace: namespace.clone(),
                    owner: owner.to_string(),
                    reducer: reducer.clone(),
                });
            }
        }

        debug!("🧩 Combined {} reducer namespaces", slices.len());
        Ok(Self { slices })
    }

    /// Compute the next state.
    ///
    /// Keys that no slice reducer owns pass through unchanged unless an
    /// update-state patch touches them.
    pub fn reduce(&self, state: &Value, action: &Action) -> Value {
        let mut next = state.clone();

        if action.is(GRIDDLE_UPDATE_STATE) && action.payload.is_object() {
            merge_state(&mut next, &action.payload);
        }

        let Value::Object(map) = &mut next else {
            return next;
        };

        for slice in &self.slices {
            let current = map.get(&slice.namespace).unwrap_or(&Value::Null);
            let updated = slice.reducer.reduce(current, action);
            if updated.is_null() && !map.contains_key(&slice.namespace) {
                continue;
            }
            map.insert(slice.namespace.clone(), updated);
        }

        next
    }

    /// Namespaces in registration order
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.slices.iter().map(|slice| slice.namespace.as_str())
    }

    /// Owner that registered a namespace
    pub fn owner_of(&self, namespace: &str) -> Option<&str> {
        self.slices
            .iter()
            .find(|slice| slice.namespace == namespace)
            .map(|slice| slice.owner.as_str())
    }
}

impl std::fmt::Debug for CombinedReducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombinedReducer")
            .field("namespaces", &self.namespaces().collect::<Vec<_>>())
            .finish()
    }
}
