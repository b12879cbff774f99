//! Composition root for one page: builds the shared context, runs the
//! document-ready and window-load phases and routes page events.

pub mod page_specific;
pub mod readiness;

use std::rc::Rc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::TealiumConfig;
use crate::dispatch::{DispatchOutcome, EventDispatcher};
use crate::forms::{FormAnalytics, FormLifecycleController};
use crate::handlers::{CustomEventHandlers, EventOutcome, PROMO_CLICK};
use crate::models::{
    AmbientContext, EventPayload, PageEvent, PageSnapshot, SharedContext, TEALIUM_EVENT, set_str,
    str_field,
};
use crate::product::{PRODUCT_DETAILS_PAGE, product_analytics, promotion_analytics};
use crate::sdk::SdkHandle;
use crate::storage::{LimitedTimeOfferFlag, PageStores, PendingClickBuffer, PromotionSelection};

pub use page_specific::apply_page_specific;
pub use readiness::{Readiness, RetryPolicy, wait_until_ready};

const SEARCH_PAGE: &str = "search";
const NEW_HOLLAND_CE: &str = "new holland construction";

/// How the landing page dealt with a buffered promotion click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeOutcome {
    Resumed {
        outcome: DispatchOutcome,
        attempts: u32,
    },
    NothingPending,
    /// The SDK never became ready; the buffered click was dropped.
    GaveUp { attempts: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowLoadReport {
    /// `None` when a PSS component without the OEM parts lookup owns the
    /// page view.
    pub view: Option<DispatchOutcome>,
    pub forms_loaded: usize,
}

pub struct PageSession {
    config: Rc<TealiumConfig>,
    context: SharedContext,
    dispatcher: EventDispatcher,
    forms: FormLifecycleController,
    handlers: CustomEventHandlers,
    page: PageSnapshot,
}

impl PageSession {
    /// Builds the page's event data from the rendered configuration.
    ///
    /// On search pages the applied filters and keyword are read from
    /// `href` when the template did not provide them.
    pub fn initialize(
        mut config: TealiumConfig,
        href: &str,
        sdk: SdkHandle,
        stores: &PageStores,
    ) -> Self {
        if config.page_type == SEARCH_PAGE && config.search_page_applied_filters.is_empty() {
            config.apply_search_filters_from_url(href);
        }

        let mut context = AmbientContext::from_config(&config);
        context.utag_data = initial_utag_data(&config);
        let context = context.shared();
        let config = Rc::new(config);

        let dispatcher = EventDispatcher::new(sdk, PendingClickBuffer::new(stores.session.clone()));
        let promotion = PromotionSelection::new(stores.local.clone());
        let forms = FormLifecycleController::new(
            config.clone(),
            context.clone(),
            dispatcher.clone(),
            promotion.clone(),
        );
        let handlers = CustomEventHandlers::new(
            config.clone(),
            context.clone(),
            dispatcher.clone(),
            promotion,
            LimitedTimeOfferFlag::new(stores.local.clone()),
        );

        info!(
            page_type = config.page_type.as_str(),
            profile = %config.resolved_profile(),
            "page session initialized"
        );
        Self {
            config,
            context,
            dispatcher,
            forms,
            handlers,
            page: PageSnapshot::default(),
        }
    }

    #[must_use]
    pub fn context(&self) -> &SharedContext {
        &self.context
    }

    #[must_use]
    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    #[must_use]
    pub fn forms(&self) -> &FormLifecycleController {
        &self.forms
    }

    pub fn forms_mut(&mut self) -> &mut FormLifecycleController {
        &mut self.forms
    }

    #[must_use]
    pub fn form_analytics(&self) -> FormAnalytics {
        self.forms.form_analytics()
    }

    #[must_use]
    pub fn utag_data(&self) -> EventPayload {
        self.context.borrow().utag_data.clone()
    }

    /// Collects every data point the page view carries. Returns the outcome
    /// of a replayed limited-time-offer click, if one was flagged.
    pub fn document_ready(&mut self, page: &PageSnapshot) -> Option<EventOutcome> {
        self.page = page.clone();

        match product_analytics(&self.config, page) {
            Ok(Some(info)) => {
                let mut context = self.context.borrow_mut();
                context.product_info.extend(info);
                let product_info = context.product_info.clone();
                context.update_utag_data(&product_info);
                context.set_utag_value("did_active", u8::from(page.features.inventory_promo_message));
            }
            Ok(None) => {}
            Err(err) => warn!(error = %err, "product analytics skipped"),
        }
        match promotion_analytics(page) {
            Ok(info) => {
                let mut context = self.context.borrow_mut();
                context.brand_promotion_info.extend(info);
                let promotion_info = context.brand_promotion_info.clone();
                context.update_utag_data(&promotion_info);
            }
            Err(err) => warn!(error = %err, "promotion analytics skipped"),
        }

        {
            let mut context = self.context.borrow_mut();
            context.set_utag_value("podium_chatbox_active", u8::from(page.features.podium_chatbox));
            if page.features.page_not_found_modal {
                context.set_utag_value(TEALIUM_EVENT, "error_view");
                context.set_utag_value("site_section", "error");
                context.set_utag_value("site_sub_section", "error");
                context.set_utag_value("page_error_code", "404");
            }
        }

        let replayed = if self.config.page_type == PRODUCT_DETAILS_PAGE {
            self.handlers.replay_limited_time_offer()
        } else {
            None
        };

        {
            let mut context = self.context.borrow_mut();
            if let Some(h1) = page.h1.first() {
                context.set_utag_value("page_h1", h1.as_str());
            }
            apply_page_specific(&self.config, page, &mut context.utag_data);
        }
        debug!(url = %self.config.script_url(), "tag script requested");

        if page.features.new_holland_ce_landing {
            let mut context = self.context.borrow_mut();
            context.set_utag_value(TEALIUM_EVENT, "oem_standard_branded_zone_view");
            context.set_utag_value("page_make", NEW_HOLLAND_CE);
            context.set_utag_value("page_make_group", NEW_HOLLAND_CE);
        }
        replayed
    }

    /// Fires the page view, then starts form tracking.
    pub fn window_load(&mut self) -> WindowLoadReport {
        let features = &self.page.features;
        if matches!(self.config.page_type.as_str(), SEARCH_PAGE | PRODUCT_DETAILS_PAGE) {
            let mut context = self.context.borrow_mut();
            context.set_utag_value("digital_retailing_active", u8::from(features.boatyard_button));
            context.set_utag_value("reserve_a_unit_active", u8::from(features.reserve_unit_button));
        }

        let view = if !features.pss_component || features.oem_parts_lookup {
            let utag_data = self.utag_data();
            Some(self.dispatcher.view(&utag_data, &EventPayload::new()))
        } else {
            debug!("page view left to the PSS component");
            None
        };

        let page = self.page.clone();
        let forms_loaded = self.forms.setup_form_tracking(&page).len();
        WindowLoadReport { view, forms_loaded }
    }

    /// Sends the promotion click buffered by the previous page once the SDK
    /// is ready. The buffer is cleared whatever happens.
    pub fn resume_pending_click(
        &self,
        policy: RetryPolicy,
        sleep: impl FnMut(Duration),
    ) -> ResumeOutcome {
        let pending = self.dispatcher.pending();
        let Some(record) = pending.get() else {
            return ResumeOutcome::NothingPending;
        };

        let sdk = self.dispatcher.sdk().clone();
        match wait_until_ready(policy, || sdk.is_ready(), sleep) {
            Readiness::Ready { attempts } => {
                let event_type = str_field(&record, TEALIUM_EVENT).unwrap_or_else(|| PROMO_CLICK.to_string());
                let ambient = self.utag_data();
                let outcome = self.dispatcher.link(&event_type, &ambient, &record, None);
                pending.clear();
                info!(event_type = event_type.as_str(), attempts, outcome = outcome.as_str(), "pending click resumed");
                ResumeOutcome::Resumed { outcome, attempts }
            }
            Readiness::GaveUp { attempts } => {
                pending.clear();
                warn!(attempts, "tag SDK never became ready, pending click dropped");
                ResumeOutcome::GaveUp { attempts }
            }
        }
    }

    pub fn handle_event(&mut self, event: &PageEvent) -> EventOutcome {
        debug!(event = event.dom_name(), "page event");
        match event {
            PageEvent::FormsAdded { forms } => {
                EventOutcome::FormsLoaded(self.forms.on_forms_added(forms).len())
            }
            PageEvent::ModalShown { form } => self.forms.on_modal_shown(form).into(),
            PageEvent::ModalFormLoad { form } => self.forms.trigger_form_load(form).into(),
            PageEvent::SearchModalOpen { detail } => self.forms.on_search_modal_open(detail).into(),
            PageEvent::Interaction { target, kind } => {
                self.forms.handle_interaction(target, *kind).into()
            }
            PageEvent::Submit { form, fields } => self.forms.handle_submit(form, fields).into(),
            PageEvent::FormSubmissionDetails { form_data } => {
                self.forms.handle_submission_details(form_data).into()
            }
            PageEvent::SelectChanged {
                form,
                select_name,
                value,
            } => self.forms.handle_select_change(form, select_name, value).into(),
            PageEvent::DidViewOfferDetailsClick {
                promotion_title,
                promotion_ids,
            } => self
                .handlers
                .offer_details_click(promotion_title.as_deref(), promotion_ids.as_deref()),
            PageEvent::DidViewMoreClick { section, content } => self
                .handlers
                .view_more_click(section.as_deref(), content.as_deref()),
            PageEvent::PromoClick { datasource } => self.handlers.promo_click(datasource.as_deref()),
            PageEvent::CarouselClick {
                slide_index,
                slide_title,
            } => self
                .handlers
                .carousel_click(slide_index.as_deref(), slide_title.as_deref()),
            PageEvent::GoogleMapsClick { text, href } => self.handlers.google_maps_click(text, href),
            PageEvent::BrandedZoneClick { text, href } => self.handlers.branded_zone_click(text, href),
            PageEvent::PromotionLinkClick => self.handlers.promotion_link_click(),
            PageEvent::InventoryPromoMessageClick => self.handlers.inventory_promo_message_click(),
            PageEvent::DidPromotionSubmit {
                promotion_id,
                promotion_name,
                dealer_id,
            } => EventOutcome::Dispatched(self.forms.did_promotion_submit(
                promotion_id.as_deref(),
                promotion_name.as_deref(),
                dealer_id.as_deref(),
            )),
            PageEvent::DidPromotionToggle {
                promotion_id,
                aria_expanded,
            } => EventOutcome::Dispatched(
                self.forms
                    .did_promotion_toggle(promotion_id.as_deref(), aria_expanded.as_deref()),
            ),
            PageEvent::Ecommerce { action, detail } => self.handlers.ecommerce(*action, detail),
        }
    }

    pub fn destroy(&mut self) {
        self.forms.destroy();
        debug!("page session destroyed");
    }
}

/// `siteUser` plus the page-level fields the template rendered.
fn initial_utag_data(config: &TealiumConfig) -> EventPayload {
    let mut utag_data = config.site_user.clone();
    for (key, value) in [
        ("page_type", config.page_type.clone()),
        ("page_sub_type", config.page_sub_type.clone()),
        ("page_make", config.page_brand.to_lowercase()),
        ("page_make_id", config.page_brand_id.clone()),
        ("page_category", config.page_brand_category.clone()),
        ("page_category_id", config.page_brand_category_id.clone()),
        ("page_sub_category", config.page_brand_sub_category.clone()),
        ("page_sub_category_id", config.page_brand_sub_category_id.clone()),
        ("page_make_group", config.page_make_group.clone()),
        ("search_keyword", config.search_keyword.clone()),
    ] {
        if !value.is_empty() {
            set_str(&mut utag_data, key, value);
        }
    }
    if !config.search_page_applied_filters.is_empty() {
        utag_data.insert(
            "search_filters".into(),
            Value::Array(
                config
                    .search_page_applied_filters
                    .iter()
                    .cloned()
                    .map(Value::String)
                    .collect(),
            ),
        );
    }
    utag_data
}
