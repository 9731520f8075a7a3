//! Action logger plugin: traces every dispatched action and every state
//! change notification of the grid it is composed into.

use dashmap::DashMap;
use grid_core::action::Action;
use grid_core::error::DispatchError;
use grid_core::listener::ListenerSlot;
use grid_core::middleware::middleware;
use grid_core::plugin::{Plugin, PluginMetadata, SimplePluginFactory};
use grid_core::reducer::reducer;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const PLUGIN_NAME: &str = "action_logger";

/// State namespace holding the type of the last reduced action
pub const LAST_ACTION_KEY: &str = "lastAction";

pub const DEFAULT_RECENT_LIMIT: usize = 100;

/// One action as seen by the logging middleware
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedAction {
    pub sequence: u64,
    pub action_type: String,
    pub payload: Value,
    pub succeeded: bool,
}

#[derive(Debug, Default)]
struct LoggerState {
    sequence: AtomicU64,
    notifications: AtomicU64,
    counts: DashMap<String, u64>,
    recent: Mutex<VecDeque<LoggedAction>>,
}

/// A logger plugin that traces every dispatched action and every state
/// change notification
#[derive(Debug, Clone)]
pub struct ActionLogger {
    state: Arc<LoggerState>,
    limit: usize,
}

impl ActionLogger {
    pub fn new(limit: usize) -> Self {
        Self {
            state: Arc::new(LoggerState::default()),
            limit,
        }
    }

    /// Build the plugin bundle; every bundle built from one logger reports
    /// into the same counters
    pub fn plugin(&self) -> Plugin {
        let logger = self.clone();
        let log_actions = middleware("action_logger", move |_api, action, next| {
            let sequence = logger.state.sequence.fetch_add(1, Ordering::SeqCst) + 1;
            debug!("📝 ActionLogger: ➡️ #{} {}", sequence, action.action_type);
            *logger.state.counts.entry(action.action_type.clone()).or_insert(0) += 1;

            let logged = LoggedAction {
                sequence,
                action_type: action.action_type.clone(),
                payload: action.payload.clone(),
                succeeded: false,
            };
            let result = next.run(action);
            match &result {
                Ok(_) => logger.record(LoggedAction { succeeded: true, ..logged }),
                Err(err) => {
                    warn!(
                        "📝 ActionLogger: ❌ #{} {} failed in {}",
                        sequence,
                        logged.action_type,
                        describe_failure(err)
                    );
                    logger.record(logged);
                }
            }
            result
        });

        let notifications = self.state.clone();
        let log_state = ListenerSlot::handler(move |state, context| {
            let count = notifications.notifications.fetch_add(1, Ordering::SeqCst) + 1;
            let page = context.select("currentPageSelector", state).unwrap_or(Value::Null);
            let records = context.select("recordCountSelector", state).unwrap_or(Value::Null);
            debug!(
                "📝 ActionLogger: 🔔 notification #{} (last action {}, page {}, {} records)",
                count,
                state.get(LAST_ACTION_KEY).unwrap_or(&serde_json::Value::Null),
                page,
                records
            );
            Ok(())
        });

        Plugin::new(PLUGIN_NAME)
            .with_metadata(
                PluginMetadata::new(PLUGIN_NAME, env!("CARGO_PKG_VERSION"))
                    .with_description("Traces dispatched actions and state notifications"),
            )
            .with_reducer(
                LAST_ACTION_KEY,
                reducer(|_slice: &Value, action: &Action| json!(action.action_type)),
            )
            .with_middleware(log_actions)
            .with_listener("actionLoggerStateChanges", log_state)
    }

    /// Factory whose bundles all report into this logger
    pub fn factory(&self) -> SimplePluginFactory {
        let logger = self.clone();
        SimplePluginFactory::new(PLUGIN_NAME, move || logger.plugin())
    }

    fn record(&self, logged: LoggedAction) {
        let mut recent = self.state.recent.lock();
        if self.limit == 0 {
            return;
        }
        if recent.len() == self.limit {
            recent.pop_front();
        }
        recent.push_back(logged);
    }

    /// Number of actions that entered the middleware
    pub fn actions_logged(&self) -> u64 {
        self.state.sequence.load(Ordering::SeqCst)
    }

    pub fn count_for(&self, action_type: &str) -> u64 {
        self.state.counts.get(action_type).map(|count| *count).unwrap_or(0)
    }

    pub fn notifications(&self) -> u64 {
        self.state.notifications.load(Ordering::SeqCst)
    }

    /// Most recent actions, oldest first
    pub fn recent(&self) -> Vec<LoggedAction> {
        self.state.recent.lock().iter().cloned().collect()
    }

    /// Log a one-line summary of everything seen so far
    pub fn summarize(&self) {
        let mut counts: Vec<(String, u64)> = self
            .state
            .counts
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        counts.sort();
        info!(
            "📝 ActionLogger: {} actions, {} notifications, by type {:?}",
            self.actions_logged(),
            self.notifications(),
            counts
        );
    }
}

impl Default for ActionLogger {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_LIMIT)
    }
}

/// Turn a dispatch failure into the logged form
pub fn describe_failure(err: &DispatchError) -> String {
    match err {
        DispatchError::Middleware { middleware, message } => format!("middleware {middleware}: {message}"),
        DispatchError::Listener { name, source } => format!("listener {name}: {source}"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_core::error::ListenerError;
    use grid_core::{listener, Grid, GridConfig, PluginFactory};
    use pretty_assertions::assert_eq;

    #[test_log::test]
    fn test_logs_actions_and_notifications() {
        let logger = ActionLogger::new(10);
        let grid = Grid::new(GridConfig::new().plugin(logger.plugin()).data(json!([{"a": 1}]))).unwrap();

        grid.dispatch_event("nextPage", Value::Null).unwrap();
        grid.dispatch_event("setFilter", json!("x")).unwrap();

        assert_eq!(logger.actions_logged(), 2);
        assert_eq!(logger.notifications(), 2);
        assert_eq!(logger.count_for("GRIDDLE_NEXT_PAGE"), 1);
        assert_eq!(grid.state()[LAST_ACTION_KEY], json!("GRIDDLE_SET_FILTER"));

        let recent = logger.recent();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[1].sequence, 2);
        assert!(recent.iter().all(|logged| logged.succeeded));
    }

    #[test]
    fn test_recent_is_bounded() {
        let logger = ActionLogger::new(2);
        let grid = Grid::new(GridConfig::new().plugin(logger.plugin())).unwrap();
        for _ in 0..3 {
            grid.dispatch_event("nextPage", Value::Null).unwrap();
        }

        let recent = logger.recent();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].sequence, 2);
    }

    #[test]
    fn test_failures_are_recorded() {
        let logger = ActionLogger::default();
        let grid = Grid::new(
            GridConfig::new()
                .plugin(logger.plugin())
                .listener("failing", ListenerSlot::Handler(listener(|_, _| Err(ListenerError::new("boom"))))),
        )
        .unwrap();

        let err = grid.dispatch_event("nextPage", Value::Null).unwrap_err();
        assert!(matches!(err, grid_core::GridError::Dispatch(DispatchError::Listener { .. })));

        let recent = logger.recent();
        assert_eq!(recent.len(), 1);
        assert!(!recent[0].succeeded);
    }

    #[test]
    fn test_describe_failure() {
        let listener_err = DispatchError::Listener {
            name: "failing".to_string(),
            source: ListenerError::new("boom"),
        };
        assert_eq!(describe_failure(&listener_err), "listener failing: boom");

        let err = DispatchError::Middleware {
            middleware: "guard".to_string(),
            message: "denied".to_string(),
        };
        assert_eq!(describe_failure(&err), "middleware guard: denied");
    }

    #[test]
    fn test_factory_builds_valid_plugin() {
        let logger = ActionLogger::default();
        let factory = logger.factory();
        assert_eq!(factory.plugin_name(), PLUGIN_NAME);

        let plugin = factory.create().unwrap();
        assert_eq!(plugin.name(), PLUGIN_NAME);
        assert!(plugin.middleware.as_ref().is_some_and(|middleware| middleware.len() == 1));

        let grid = Grid::new(GridConfig::new().plugin(factory.create().unwrap())).unwrap();
        grid.dispatch_event("nextPage", Value::Null).unwrap();
        assert_eq!(logger.actions_logged(), 1);
    }
}
