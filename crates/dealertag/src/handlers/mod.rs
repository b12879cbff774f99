//! Click and custom-event handlers outside the form lifecycle.

use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::TealiumConfig;
use crate::dispatch::{DispatchOutcome, EventDispatcher};
use crate::forms::OFFER_DETAILS_CLICK;
use crate::models::{
    EcommerceAction, EventPayload, SharedContext, TEALIUM_EVENT, is_truthy, merged, set_str,
};
use crate::product::PRODUCT_DETAILS_PAGE;
use crate::storage::{LimitedTimeOfferFlag, PromotionSelection};
use crate::utils::json::safe_json_parse;

pub const VIEW_MORE_CLICK: &str = "did_view_more_click";
pub const PROMO_CLICK: &str = "promo_click";
pub const CAROUSEL_CLICK: &str = "carousel_click";
pub const GOOGLE_MAPS_CLICK: &str = "google_maps_click";
pub const BRANDED_ZONE_CLICK: &str = "brp_branded_zone_click";
pub const LIMITED_TIME_OFFER_CLICK: &str = "did_limited_time_offer_click";
pub const MODIFY_CART: &str = "ecommerce_part_modify_cart";
pub const PART_DETAIL_VIEW: &str = "ecommerce_part_detail_view";
pub const PART_PURCHASE: &str = "ecommerce_part_purchase";
pub const INVENTORY_INTERACTION: &str = "inventory_interaction";

const PROMO_DATASOURCE: &str = "promotion slide";
const DEFAULT_INVENTORY_CLASS: &str = "Part";

/// What a page event led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Dispatched(DispatchOutcome),
    /// Lead forms newly reported as loaded.
    FormsLoaded(usize),
    /// Held for the next page in the pending click buffer.
    Buffered,
    /// Only browser storage was updated.
    Stored,
    Ignored,
}

impl From<Option<DispatchOutcome>> for EventOutcome {
    fn from(outcome: Option<DispatchOutcome>) -> Self {
        outcome.map_or(Self::Ignored, Self::Dispatched)
    }
}

pub struct CustomEventHandlers {
    config: Rc<TealiumConfig>,
    context: SharedContext,
    dispatcher: EventDispatcher,
    promotion: PromotionSelection,
    limited_time_offer: LimitedTimeOfferFlag,
}

impl CustomEventHandlers {
    pub fn new(
        config: Rc<TealiumConfig>,
        context: SharedContext,
        dispatcher: EventDispatcher,
        promotion: PromotionSelection,
        limited_time_offer: LimitedTimeOfferFlag,
    ) -> Self {
        Self {
            config,
            context,
            dispatcher,
            promotion,
            limited_time_offer,
        }
    }

    /// `DIDViewOfferDetailsClick`. The selection is also remembered for the
    /// promotion form that usually follows.
    pub fn offer_details_click(
        &self,
        promotion_title: Option<&str>,
        promotion_ids: Option<&str>,
    ) -> EventOutcome {
        let mut data = EventPayload::new();
        set_str(&mut data, TEALIUM_EVENT, OFFER_DETAILS_CLICK);
        if let Some(title) = promotion_title.filter(|title| !title.is_empty()) {
            set_str(&mut data, "did_promotions_name", title);
        }
        if let Some(ids) = promotion_ids.filter(|ids| !ids.is_empty()) {
            set_str(&mut data, "campaign_id", ids);
        }
        self.promotion.remember(promotion_title, promotion_ids);

        self.send_with_heading(OFFER_DETAILS_CLICK, &data)
    }

    /// `DIDViewMoreClick`.
    pub fn view_more_click(&self, section: Option<&str>, content: Option<&str>) -> EventOutcome {
        let mut data = EventPayload::new();
        set_str(&mut data, TEALIUM_EVENT, VIEW_MORE_CLICK);
        if let Some(section) = section.filter(|section| !section.is_empty()) {
            set_str(&mut data, "section_name", section);
        }
        if let Some(content) = content.filter(|content| !content.is_empty()) {
            set_str(&mut data, "content_type", content);
        }
        self.send_with_heading(VIEW_MORE_CLICK, &data)
    }

    /// Promotion slide click. The click navigates away, so the event is
    /// buffered for the landing page; it is sent right away only when the
    /// buffer cannot be written.
    pub fn promo_click(&self, datasource: Option<&str>) -> EventOutcome {
        let mut data = self.site_user();
        if let Some(raw) = datasource {
            match safe_json_parse(PROMO_DATASOURCE, raw) {
                Ok(Value::Object(source)) => copy_promotion_fields(&source, &mut data),
                Ok(_) => debug!("promotion datasource is not an object"),
                Err(err) => warn!(error = %err, "could not parse promotion data"),
            }
        }
        set_str(&mut data, "site_section", "promo");
        set_str(&mut data, "site_sub_section", "promo_detail");
        set_str(&mut data, TEALIUM_EVENT, PROMO_CLICK);

        match self.dispatcher.pending().set(&data) {
            Ok(()) => {
                debug!("promotion click buffered for the landing page");
                EventOutcome::Buffered
            }
            Err(err) => {
                warn!(error = %err, "could not buffer promotion click, sending now");
                self.send(PROMO_CLICK, &data)
            }
        }
    }

    pub fn carousel_click(&self, slide_index: Option<&str>, slide_title: Option<&str>) -> EventOutcome {
        let mut data = self.site_user();
        set_str(&mut data, TEALIUM_EVENT, CAROUSEL_CLICK);
        set_str(&mut data, "carousel_asset_name", slide_title.unwrap_or_default());
        set_str(&mut data, "carousel_asset_index", slide_index.unwrap_or_default());
        set_str(&mut data, "site_sub_section", "home");
        self.send(CAROUSEL_CLICK, &data)
    }

    pub fn google_maps_click(&self, text: &str, href: &str) -> EventOutcome {
        let mut data = self.site_user();
        set_str(&mut data, TEALIUM_EVENT, GOOGLE_MAPS_CLICK);
        set_str(&mut data, "click_text", text.trim());
        set_str(&mut data, "click_url", href);
        self.send(GOOGLE_MAPS_CLICK, &data)
    }

    /// Only reported on sites hosted under an external parent platform.
    pub fn branded_zone_click(&self, text: &str, href: &str) -> EventOutcome {
        if !self.config.is_external_branded_zone_site {
            return EventOutcome::Ignored;
        }
        let mut data = self.site_user();
        set_str(&mut data, TEALIUM_EVENT, BRANDED_ZONE_CLICK);
        set_str(&mut data, "click_url", href);
        set_str(&mut data, "click_text", text.trim());
        self.send(BRANDED_ZONE_CLICK, &data)
    }

    /// `.promotion-link` click: flags the product page the visitor lands on.
    pub fn promotion_link_click(&self) -> EventOutcome {
        self.limited_time_offer.raise();
        EventOutcome::Stored
    }

    /// `#inventory_promoMessage` click, product details pages only.
    pub fn inventory_promo_message_click(&self) -> EventOutcome {
        if self.context.borrow().effective_page_type() != PRODUCT_DETAILS_PAGE {
            return EventOutcome::Ignored;
        }
        self.limited_time_offer_click()
    }

    /// Replays a limited-time-offer click flagged by the previous page.
    /// Returns `None` when no flag was set.
    pub fn replay_limited_time_offer(&self) -> Option<EventOutcome> {
        self.limited_time_offer
            .take()
            .then(|| self.limited_time_offer_click())
    }

    /// Sends the whole page data as a limited-time-offer click. The page's
    /// `tealium_event` is overwritten in place.
    pub fn limited_time_offer_click(&self) -> EventOutcome {
        let data = {
            let mut context = self.context.borrow_mut();
            context.set_utag_value(TEALIUM_EVENT, LIMITED_TIME_OFFER_CLICK);
            context.utag_data.clone()
        };
        self.send(LIMITED_TIME_OFFER_CLICK, &data)
    }

    pub fn ecommerce(&self, action: EcommerceAction, detail: &EventPayload) -> EventOutcome {
        let mut data = detail.clone();
        let event_type = match action {
            EcommerceAction::AddToCart | EcommerceAction::RemoveFromCart => {
                if !is_truthy(data.get("cart_action")) {
                    let cart_action = if action == EcommerceAction::AddToCart {
                        "add"
                    } else {
                        "remove"
                    };
                    set_str(&mut data, "cart_action", cart_action);
                }
                if !data.contains_key("ecomm_part_detail_inventory_class") {
                    set_str(
                        &mut data,
                        "ecomm_part_detail_inventory_class",
                        DEFAULT_INVENTORY_CLASS,
                    );
                }
                MODIFY_CART
            }
            EcommerceAction::ProductView => PART_DETAIL_VIEW,
            EcommerceAction::Purchase => PART_PURCHASE,
            EcommerceAction::InventoryInteraction => INVENTORY_INTERACTION,
        };
        set_str(&mut data, TEALIUM_EVENT, event_type);

        let payload = merged(&[&self.site_user(), &data]);
        self.send(event_type, &payload)
    }

    fn site_user(&self) -> EventPayload {
        self.context.borrow().site_user.clone()
    }

    fn send_with_heading(&self, event_type: &str, data: &EventPayload) -> EventOutcome {
        let mut payload = merged(&[&self.site_user(), data]);
        if let Some(h1) = self.context.borrow().page_h1() {
            set_str(&mut payload, "page_h1", h1);
        }
        self.send(event_type, &payload)
    }

    fn send(&self, event_type: &str, payload: &EventPayload) -> EventOutcome {
        let ambient = self.context.borrow().utag_data.clone();
        EventOutcome::Dispatched(self.dispatcher.link(event_type, &ambient, payload, None))
    }
}

fn copy_promotion_fields(source: &EventPayload, data: &mut EventPayload) {
    for (gate, pairs) in [
        (
            "promotionId",
            [("promotionId", "promotion_id"), ("promotionName", "promotion_name")],
        ),
        (
            "promotionMakeId",
            [
                ("promotionMakeId", "promotion_make_id"),
                ("promotionMake", "promotion_make"),
            ],
        ),
        (
            "promotionCategoryId",
            [
                ("promotionCategory", "promotion_category"),
                ("promotionCategoryId", "promotion_category_id"),
            ],
        ),
    ] {
        if !is_truthy(source.get(gate)) {
            continue;
        }
        for (from, to) in pairs {
            if let Some(value) = source.get(from) {
                data.insert(to.to_string(), value.clone());
            }
        }
    }
}
