//! Replay scripts: a JSON array of steps applied to a running grid.
//!
//! ```json
//! [
//!   { "kind": "properties", "properties": { "data": [], "pageProperties": { "currentPage": 2 } } },
//!   { "kind": "event", "name": "setFilter", "payload": "bob" }
//! ]
//! ```

use anyhow::Context;
use grid_core::{Grid, Properties, SyncOutcome};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptStep {
    /// Hand a new property set to the grid, as a parent re-render would
    Properties { properties: Properties },
    /// Fire a named event through the grid's events
    Event {
        name: String,
        #[serde(default)]
        payload: Value,
    },
}

/// What replaying a script did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub steps: usize,
    pub property_updates: usize,
    pub unchanged: usize,
    pub events: usize,
}

pub fn load_script(path: &Path) -> anyhow::Result<Vec<ScriptStep>> {
    let content = std::fs::read_to_string(path).with_context(|| format!("reading script {}", path.display()))?;
    let steps = serde_json::from_str(&content).with_context(|| format!("parsing script {}", path.display()))?;
    Ok(steps)
}

/// Apply every step in order, stopping at the first failure
pub fn replay(grid: &Grid, steps: &[ScriptStep]) -> anyhow::Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();
    for (index, step) in steps.iter().enumerate() {
        match step {
            ScriptStep::Properties { properties } => {
                match grid
                    .receive_properties(properties.clone())
                    .with_context(|| format!("script step {index}"))?
                {
                    SyncOutcome::Unchanged => {
                        debug!("⏭️ Step {}: properties unchanged", index);
                        summary.unchanged += 1;
                    }
                    SyncOutcome::Dispatched(changed) => {
                        let keys: Vec<&String> = changed.keys().collect();
                        info!("🔄 Step {}: synchronized {:?}", index, keys);
                        summary.property_updates += 1;
                    }
                }
            }
            ScriptStep::Event { name, payload } => {
                let action = grid
                    .dispatch_event(name, payload.clone())
                    .with_context(|| format!("script step {index}"))?;
                info!("🎯 Step {}: {} dispatched {}", index, name, action.action_type);
                summary.events += 1;
            }
        }
        summary.steps += 1;
    }
    Ok(summary)
}
