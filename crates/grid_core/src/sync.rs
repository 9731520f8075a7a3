//! External property synchronization
//!
//! The host hands the grid a fresh property set whenever its own inputs
//! change. Only the keys whose values differ from the previous set are
//! dispatched, as a single update-state patch.

use crate::action;
use crate::error::GridError;
use crate::store::Store;
use crate::value::{changed_properties, Properties};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Syncing,
}

/// Result of one property update
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Nothing changed, nothing was dispatched
    Unchanged,
    /// One update-state action carrying this patch was dispatched
    Dispatched(Properties),
}

/// Diffs incoming property sets against the previous one
#[derive(Debug)]
pub struct PropertySynchronizer {
    previous: Mutex<Properties>,
    syncing: AtomicBool,
}

struct SyncGuard<'a>(&'a AtomicBool);

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl PropertySynchronizer {
    /// `initial` is the baseline; it is never dispatched itself.
    pub fn new(initial: Properties) -> Self {
        Self {
            previous: Mutex::new(initial),
            syncing: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> SyncState {
        if self.syncing.load(Ordering::SeqCst) {
            SyncState::Syncing
        } else {
            SyncState::Idle
        }
    }

    /// Property set the next update is compared against
    pub fn previous(&self) -> Properties {
        self.previous.lock().clone()
    }

    /// Dispatch the changed subset of `next`, if any.
    ///
    /// `next` becomes the baseline once the update went through. A call made
    /// while another update is still dispatching fails with
    /// [`GridError::SyncInProgress`].
    pub fn receive_properties(&self, store: &Store, next: Properties) -> Result<SyncOutcome, GridError> {
        if self
            .syncing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(GridError::SyncInProgress);
        }
        let _guard = SyncGuard(&self.syncing);

        let changed = changed_properties(&self.previous.lock(), &next);
        if changed.is_empty() {
            *self.previous.lock() = next;
            debug!("🔄 Property update without changes");
            return Ok(SyncOutcome::Unchanged);
        }

        debug!(
            "🔄 Synchronizing {} changed properties: {:?}",
            changed.len(),
            changed.keys().collect::<Vec<_>>()
        );
        store.dispatch(action::update_state(changed.clone()))?;
        *self.previous.lock() = next;
        Ok(SyncOutcome::Dispatched(changed))
    }
}
