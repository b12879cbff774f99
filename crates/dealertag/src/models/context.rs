use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use super::payload::{EventPayload, str_field};
use crate::config::TealiumConfig;

/// Page-wide state assembled at initialization and augmented by handlers.
///
/// Handlers share one instance through [`SharedContext`]. Writes are
/// last-writer-wins; after initialization the context is only augmented,
/// never replaced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AmbientContext {
    pub site_user: EventPayload,
    pub product_info: EventPayload,
    pub brand_promotion_info: EventPayload,
    pub page_type: String,
    pub page_sub_type: String,
    pub page_make_group: String,
    pub is_external_branded_zone_site: bool,
    pub parent_site_platform_type: String,
    /// The event data object sent with the page view (`utag_data`).
    pub utag_data: EventPayload,
}

pub type SharedContext = Rc<RefCell<AmbientContext>>;

impl AmbientContext {
    #[must_use]
    pub fn from_config(config: &TealiumConfig) -> Self {
        Self {
            site_user: config.site_user.clone(),
            product_info: config.product_info.clone(),
            brand_promotion_info: config.brand_promotion_info.clone(),
            page_type: config.page_type.clone(),
            page_sub_type: config.page_sub_type.clone(),
            page_make_group: config.page_make_group.clone(),
            is_external_branded_zone_site: config.is_external_branded_zone_site,
            parent_site_platform_type: config.parent_site_platform_type.clone(),
            utag_data: EventPayload::new(),
        }
    }

    #[must_use]
    pub fn shared(self) -> SharedContext {
        Rc::new(RefCell::new(self))
    }

    /// Page type as carried by the event data, falling back to `other`.
    #[must_use]
    pub fn effective_page_type(&self) -> String {
        str_field(&self.utag_data, "page_type")
            .or_else(|| (!self.page_type.is_empty()).then(|| self.page_type.clone()))
            .unwrap_or_else(|| "other".to_string())
    }

    #[must_use]
    pub fn page_h1(&self) -> Option<String> {
        str_field(&self.utag_data, "page_h1")
    }

    /// Merges `updates` into the event data; later values win.
    pub fn update_utag_data(&mut self, updates: &EventPayload) {
        for (key, value) in updates {
            self.utag_data.insert(key.clone(), value.clone());
        }
    }

    pub fn set_utag_value(&mut self, key: &str, value: impl Into<Value>) {
        self.utag_data.insert(key.to_string(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::AmbientContext;

    #[test]
    fn page_type_prefers_event_data_then_config_then_other() {
        let mut context = AmbientContext::default();
        assert_eq!(context.effective_page_type(), "other");

        context.page_type = "search".to_string();
        assert_eq!(context.effective_page_type(), "search");

        context.set_utag_value("page_type", "finance");
        assert_eq!(context.effective_page_type(), "finance");
    }

    #[test]
    fn updates_are_last_writer_wins() {
        let mut context = AmbientContext::default();
        context.set_utag_value("page_make", "polaris");
        let updates = json!({"page_make": "honda", "page_h1": "Inventory"});
        context.update_utag_data(updates.as_object().expect("fixture must be an object"));

        assert_eq!(context.utag_data["page_make"], json!("honda"));
        assert_eq!(context.page_h1().as_deref(), Some("Inventory"));
    }
}
