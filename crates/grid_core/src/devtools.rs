//! Store enhancers and the detected debugging enhancer
//!
//! A store is always wrapped by exactly one enhancer. When the host
//! environment asks for devtools (the `GRID_DEVTOOLS` environment variable is
//! set to anything but `0`/`false`) the [`DevtoolsEnhancer`] records recent
//! actions and traces every state transition; otherwise the no-op
//! [`PassthroughEnhancer`] is used.

use crate::action::Action;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

/// Environment variable checked when a store is created
pub const DEVTOOLS_ENV: &str = "GRID_DEVTOOLS";

/// Number of actions the devtools enhancer remembers
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Hooks wrapped around every reducer run
pub trait StoreEnhancer: Send + Sync {
    fn name(&self) -> &str;

    /// Called after the middleware chain, right before the reducer
    fn before_reduce(&self, _action: &Action, _state: &Value) {}

    /// Called with the previous and next state once the reducer returned
    fn after_reduce(&self, _action: &Action, _previous: &Value, _next: &Value) {}

    /// Recorded history, newest last. Empty unless the enhancer records.
    fn history(&self) -> Vec<ActionRecord> {
        Vec::new()
    }
}

/// Enhancer used when no debugging enhancer is detected
#[derive(Debug, Default)]
pub struct PassthroughEnhancer;

impl StoreEnhancer for PassthroughEnhancer {
    fn name(&self) -> &str {
        "passthrough"
    }
}

/// One recorded action with the top-level keys it changed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRecord {
    pub action: Action,
    pub changed_keys: Vec<String>,
}

/// Debugging enhancer keeping a bounded action history
#[derive(Debug)]
pub struct DevtoolsEnhancer {
    history: Mutex<VecDeque<ActionRecord>>,
    limit: usize,
}

impl DevtoolsEnhancer {
    pub fn new(limit: usize) -> Self {
        Self {
            history: Mutex::new(VecDeque::with_capacity(limit)),
            limit,
        }
    }
}

impl Default for DevtoolsEnhancer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

fn changed_keys(previous: &Value, next: &Value) -> Vec<String> {
    let (Some(previous), Some(next)) = (previous.as_object(), next.as_object()) else {
        return Vec::new();
    };
    let mut keys: Vec<String> = next
        .iter()
        .filter(|(key, value)| previous.get(key.as_str()) != Some(*value))
        .map(|(key, _)| key.clone())
        .collect();
    keys.extend(
        previous
            .keys()
            .filter(|key| !next.contains_key(key.as_str()))
            .cloned(),
    );
    keys
}

impl StoreEnhancer for DevtoolsEnhancer {
    fn name(&self) -> &str {
        "devtools"
    }

    fn before_reduce(&self, action: &Action, _state: &Value) {
        debug!("🛠️ devtools: reducing {}", action.action_type);
    }

    fn after_reduce(&self, action: &Action, previous: &Value, next: &Value) {
        let changed = changed_keys(previous, next);
        debug!("🛠️ devtools: {} changed {:?}", action.action_type, changed);

        let mut history = self.history.lock();
        if self.limit > 0 && history.len() == self.limit {
            history.pop_front();
        }
        if self.limit > 0 {
            history.push_back(ActionRecord {
                action: action.clone(),
                changed_keys: changed,
            });
        }
    }

    fn history(&self) -> Vec<ActionRecord> {
        self.history.lock().iter().cloned().collect()
    }
}

fn devtools_requested(value: Option<String>) -> bool {
    match value {
        Some(value) => {
            let value = value.trim();
            !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
        }
        None => false,
    }
}

/// Detect the debugging enhancer from the host environment
pub fn detect() -> Option<Arc<dyn StoreEnhancer>> {
    if devtools_requested(std::env::var(DEVTOOLS_ENV).ok()) {
        debug!("🛠️ {} set, enabling devtools enhancer", DEVTOOLS_ENV);
        Some(Arc::new(DevtoolsEnhancer::default()))
    } else {
        None
    }
}

/// The detected enhancer, or the passthrough when none is present
pub fn detect_or_passthrough() -> Arc<dyn StoreEnhancer> {
    detect().unwrap_or_else(|| Arc::new(PassthroughEnhancer))
}
