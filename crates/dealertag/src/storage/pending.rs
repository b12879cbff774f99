use std::rc::Rc;

use tracing::warn;

use super::BrowserStorage;
use crate::error::TrackingError;
use crate::models::EventPayload;

/// Session storage key holding the buffered promotion click.
pub const PENDING_CLICK_KEY: &str = "tealium_pending_promo_click";

/// Holds at most one promotion-click payload across a full page navigation.
///
/// A new record overwrites the previous one. The landing page consumes it
/// once during initialization.
#[derive(Clone)]
pub struct PendingClickBuffer {
    store: Rc<dyn BrowserStorage>,
}

impl PendingClickBuffer {
    pub fn new(store: Rc<dyn BrowserStorage>) -> Self {
        Self { store }
    }

    pub fn set(&self, record: &EventPayload) -> Result<(), TrackingError> {
        let encoded = serde_json::to_string(record)
            .map_err(|err| TrackingError::malformed(PENDING_CLICK_KEY, err))?;
        self.store.set_item(PENDING_CLICK_KEY, &encoded)
    }

    /// The stored record, or `None` when absent or unreadable.
    #[must_use]
    pub fn get(&self) -> Option<EventPayload> {
        let raw = self.store.get_item(PENDING_CLICK_KEY)?;
        match serde_json::from_str::<EventPayload>(&raw) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(key = PENDING_CLICK_KEY, error = %err, "discarding unreadable pending click");
                None
            }
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.get().is_some()
    }

    pub fn clear(&self) {
        self.store.remove_item(PENDING_CLICK_KEY);
    }

    /// Reads and removes the record.
    pub fn take(&self) -> Option<EventPayload> {
        let record = self.get();
        self.clear();
        record
    }
}

impl std::fmt::Debug for PendingClickBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingClickBuffer")
            .field("pending", &self.is_pending())
            .finish()
    }
}
