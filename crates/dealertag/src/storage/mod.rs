//! Browser storage seam (`sessionStorage` / `localStorage`) and the records
//! the pipeline keeps there across page loads.

mod pending;
mod promotion;

pub use pending::{PENDING_CLICK_KEY, PendingClickBuffer};
pub use promotion::{
    LIMITED_TIME_OFFER_FLAG_KEY, LimitedTimeOfferFlag, PromotionSelection,
    SELECTED_PROMOTION_IDS_KEY, SELECTED_PROMOTION_TITLE_KEY,
};

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::TrackingError;

pub trait BrowserStorage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), TrackingError>;
    fn remove_item(&self, key: &str);
}

/// In-memory storage; clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_entries(entries: BTreeMap<String, String>) -> Self {
        Self {
            entries: Rc::new(RefCell::new(entries)),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.borrow().clone()
    }
}

impl BrowserStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), TrackingError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

/// The two storage areas a page can reach.
#[derive(Clone)]
pub struct PageStores {
    pub session: Rc<dyn BrowserStorage>,
    pub local: Rc<dyn BrowserStorage>,
}

impl PageStores {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            session: Rc::new(MemoryStorage::new()),
            local: Rc::new(MemoryStorage::new()),
        }
    }
}

impl std::fmt::Debug for PageStores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageStores").finish_non_exhaustive()
    }
}
