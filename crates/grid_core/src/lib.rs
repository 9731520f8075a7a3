//! # Grid Core
//!
//! Plugin composition and state synchronization engine for a pluggable data
//! grid. A grid is assembled from a base set of reducers, components, events
//! and selectors plus a list of plugin bundles and user overrides, and keeps
//! one unified state in sync with the properties its host supplies.
//!
//! ## Key Features
//!
//! - **Typed Plugin Bundles**: every contribution is optional and validated at load time
//! - **Deterministic Merging**: base, then plugins in list order, then user overrides
//! - **Namespaced Reducers**: colliding state keys are rejected at construction
//! - **Synchronous Store**: middleware chain, combined reducer, ordered notifications
//! - **Named Listeners**: side-effect handlers bound to state changes
//! - **Property Sync**: only changed external properties are dispatched
//!
//! ## Architecture
//!
//! - **merge**: pure functions folding contributions together
//! - **Store**: the unified state container, optionally wrapped by a devtools enhancer
//! - **StoreListener**: registry of named listeners
//! - **PropertySynchronizer**: diffs incoming property sets
//! - **Grid**: the composition root exposing a [`GridContext`]
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use grid_core::*;
//! use serde_json::json;
//!
//! let grid = Grid::new(
//!     GridConfig::new()
//!         .data(json!([{"name": "Alice", "age": 31}, {"name": "Bob", "age": 27}]))
//!         .children(RowDefinition::new().column(ColumnDefinition::new("name").title("Name")))
//!         .plugin(Plugin::new("highlight").with_style_config(json!({"classNames": {"Row": "striped"}}))),
//! )?;
//!
//! grid.dispatch_event("setPageSize", json!(1))?;
//! assert_eq!(grid.select("maxPageSelector")?, json!(2));
//!
//! let props = json!({"data": [{"name": "Carol", "age": 45}]});
//! grid.receive_properties(props.as_object().cloned().unwrap_or_default())?;
//! # Ok::<(), GridError>(())
//! ```

pub mod action;
pub mod component;
pub mod config;
pub mod context;
pub mod devtools;
pub mod error;
pub mod event;
pub mod grid;
pub mod listener;
pub mod merge;
pub mod middleware;
pub mod plugin;
pub mod reducer;
pub mod rows;
pub mod selector;
pub mod state;
pub mod store;
pub mod sync;
pub mod value;


// Re-exports for convenience
pub use action::Action;
pub use component::{component, Component, ComponentMap, RenderNode, RenderScope, SettingsComponentObject};
pub use config::GridConfig;
pub use context::{GridContext, DEFAULT_STORE_KEY};
pub use error::{DispatchError, GridError, ListenerError};
pub use event::{action_creator, ActionCreator, EventMap};
pub use grid::Grid;
pub use listener::{listener, Listener, ListenerContext, ListenerPolicy, ListenerSlot, StoreListener};
pub use middleware::{middleware, Middleware, MiddlewareApi, MiddlewareRef, Next};
pub use plugin::{Plugin, PluginFactory, PluginMetadata, SimplePluginFactory};
pub use reducer::{reducer, Reducer, ReducerMap};
pub use rows::{ColumnDefinition, RowDefinition};
pub use selector::{selector, Selector, SelectorMap};
pub use store::{Store, StoreStats, Subscription};
pub use sync::{SyncOutcome, SyncState};
pub use value::Properties;

/// Crate version
pub const GRID_CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, GridError>;
