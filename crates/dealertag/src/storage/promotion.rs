use std::rc::Rc;

use tracing::warn;

use super::BrowserStorage;

pub const SELECTED_PROMOTION_TITLE_KEY: &str = "selectedPromotionTitle";
pub const SELECTED_PROMOTION_IDS_KEY: &str = "selectedPromotionIds";
/// Set when a `.promotion-link` is clicked; read by the next product page.
pub const LIMITED_TIME_OFFER_FLAG_KEY: &str = "limitedTimeOfferBtnClicked_flag";

/// Last promotion the visitor opened offer details for (local storage).
#[derive(Clone)]
pub struct PromotionSelection {
    store: Rc<dyn BrowserStorage>,
}

impl PromotionSelection {
    pub fn new(store: Rc<dyn BrowserStorage>) -> Self {
        Self { store }
    }

    pub fn remember(&self, title: Option<&str>, ids: Option<&str>) {
        for (key, value) in [
            (SELECTED_PROMOTION_TITLE_KEY, title),
            (SELECTED_PROMOTION_IDS_KEY, ids),
        ] {
            let Some(value) = value.filter(|value| !value.is_empty()) else {
                continue;
            };
            if let Err(err) = self.store.set_item(key, value) {
                warn!(error = %err, "could not remember selected promotion");
            }
        }
    }

    #[must_use]
    pub fn title(&self) -> Option<String> {
        self.store.get_item(SELECTED_PROMOTION_TITLE_KEY)
    }

    #[must_use]
    pub fn ids(&self) -> Option<String> {
        self.store
            .get_item(SELECTED_PROMOTION_IDS_KEY)
            .filter(|ids| !ids.is_empty())
    }
}

#[derive(Clone)]
pub struct LimitedTimeOfferFlag {
    store: Rc<dyn BrowserStorage>,
}

impl LimitedTimeOfferFlag {
    pub fn new(store: Rc<dyn BrowserStorage>) -> Self {
        Self { store }
    }

    pub fn raise(&self) {
        if let Err(err) = self.store.set_item(LIMITED_TIME_OFFER_FLAG_KEY, "true") {
            warn!(error = %err, "could not set limited time offer flag");
        }
    }

    /// Returns whether the flag was set and clears it.
    pub fn take(&self) -> bool {
        let raised = self
            .store
            .get_item(LIMITED_TIME_OFFER_FLAG_KEY)
            .is_some_and(|value| !value.is_empty());
        self.store.remove_item(LIMITED_TIME_OFFER_FLAG_KEY);
        raised
    }
}
