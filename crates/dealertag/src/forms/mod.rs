//! Form load, first-interaction and submission tracking.
//!
//! Each [`FormIdentity`] moves through three one-way states (loaded,
//! interacted, submitted), each gated by the [`DeduplicationTracker`].
//! Interaction listeners are armed only after a load has been dispatched for
//! the same identity and are detached after their first firing.

mod fields;
pub mod policy;

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;
use tracing::{debug, info, warn};

pub use fields::{SpecializedSelect, extract_field_data, map_field_name};
pub use policy::{Exclusion, exclusion, form_context};

use crate::config::TealiumConfig;
use crate::dispatch::{DispatchOutcome, EventDispatcher};
use crate::models::{
    AmbientContext, EventPayload, FormContainer, FormField, FormIdentity, InteractionKind,
    PageLocation, PageSnapshot, SharedContext, is_truthy, merged, set_str, str_field,
};
use crate::product::{parse_products_data, promotion_data, showcase_data};
use crate::storage::PromotionSelection;
use crate::tracking::DeduplicationTracker;
use crate::utils::query::query_string_to_payload;

pub const FORM_LOAD: &str = "form_load";
pub const FORM_INTERACTION: &str = "form_interaction";
pub const FORM_SUBMIT: &str = "form_submit";
pub const GET_A_QUOTE_SUBMIT: &str = "did_get_a_quote_form_submit";
pub const OFFER_DETAILS_CLICK: &str = "did_view_offer_details_click";
pub const DID_PROMOTION_SUBMISSION: &str = "did_promotion_form_submission";
pub const DID_PROMOTION_EXPANDED: &str = "did_promotion_expanded";
pub const DID_PROMOTION_COLLAPSED: &str = "did_promotion_collapsed";

const GET_A_QUOTE_FORM: &str = "Get A Quote";
const GET_PROMOTIONS_FORM: &str = "Get Promotions";
const SEARCH_PAGE: &str = "search";
const FINANCE_PAGE: &str = "finance";

#[derive(Debug, Clone)]
struct ArmedInteraction {
    identity: FormIdentity,
    payload: EventPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormAnalytics {
    pub forms_with_interaction: usize,
    pub forms_submitted: usize,
    pub total_forms_tracked: usize,
}

pub struct FormLifecycleController {
    config: Rc<TealiumConfig>,
    context: SharedContext,
    dispatcher: EventDispatcher,
    promotion: PromotionSelection,
    tracker: DeduplicationTracker,
    /// Interaction listeners keyed by the id of the element hosting the `<form>`.
    armed: BTreeMap<String, ArmedInteraction>,
    forms: Vec<FormContainer>,
    location: PageLocation,
    screen_width: u32,
    observing: bool,
}

impl FormLifecycleController {
    pub fn new(
        config: Rc<TealiumConfig>,
        context: SharedContext,
        dispatcher: EventDispatcher,
        promotion: PromotionSelection,
    ) -> Self {
        let defaults = PageSnapshot::default();
        Self {
            config,
            context,
            dispatcher,
            promotion,
            tracker: DeduplicationTracker::new(),
            armed: BTreeMap::new(),
            forms: Vec::new(),
            location: defaults.location,
            screen_width: defaults.screen_width,
            observing: false,
        }
    }

    #[must_use]
    pub fn tracker(&self) -> &DeduplicationTracker {
        &self.tracker
    }

    #[must_use]
    pub fn is_armed(&self, host_id: &str) -> bool {
        self.armed.contains_key(host_id)
    }

    #[must_use]
    pub fn is_observing(&self) -> bool {
        self.observing
    }

    /// Runs the static scan once and starts accepting added forms.
    /// Later calls are no-ops.
    pub fn setup_form_tracking(&mut self, page: &PageSnapshot) -> Vec<FormIdentity> {
        if self.observing {
            debug!("form tracking already set up, skipping");
            return Vec::new();
        }
        self.observing = true;
        self.scan_static_forms(page)
    }

    /// Loads every eligible lead form on the page. Search pages are skipped;
    /// their forms load when a modal opens.
    pub fn scan_static_forms(&mut self, page: &PageSnapshot) -> Vec<FormIdentity> {
        self.location = page.location.clone();
        self.screen_width = page.screen_width;
        for form in &page.forms {
            self.remember_form(form);
        }

        let page_type = self.context.borrow().effective_page_type();
        if page_type == SEARCH_PAGE {
            info!("skipping static form loads on search page");
            return Vec::new();
        }

        let candidates: Vec<FormContainer> = page.lead_forms().cloned().collect();
        debug!(
            page_type = page_type.as_str(),
            count = candidates.len(),
            "scanning static lead forms"
        );
        candidates
            .iter()
            .filter_map(|form| self.load_candidate(form))
            .collect()
    }

    /// Containers inserted after the initial scan. Ignored until
    /// [`FormLifecycleController::setup_form_tracking`] has run.
    pub fn on_forms_added(&mut self, containers: &[FormContainer]) -> Vec<FormIdentity> {
        for form in containers {
            self.remember_form(form);
        }
        if !self.observing {
            debug!("form observer not started, ignoring added forms");
            return Vec::new();
        }
        containers
            .iter()
            .filter(|form| form.is_lead_form())
            .filter_map(|form| self.load_candidate(form))
            .collect()
    }

    /// `show.bs.modal` on a lead form modal. Opening a modal always reports a
    /// load; reopening re-arms interaction and submission for the identity.
    pub fn on_modal_shown(&mut self, container: &FormContainer) -> Option<DispatchOutcome> {
        self.remember_form(container);
        let identity = container.identity();
        if !identity.is_complete() {
            debug!(form = %identity.key(), "modal form is missing identity attributes");
            return None;
        }

        let mut event_type = FORM_LOAD;
        let mut form = identity.to_payload();
        if identity.form_name == GET_PROMOTIONS_FORM {
            event_type = OFFER_DETAILS_CLICK;
            if let Some(title) = self.promotion.title() {
                set_str(&mut form, "did_promotions_name", title);
            }
            if let Some(ids) = self.promotion.ids() {
                set_str(&mut form, "campaign_id", ids);
            }
        }

        let payload = {
            let context = self.context.borrow();
            let mut payload = merged(&[&context.site_user, &form, &context.product_info]);
            decorate(&mut payload, &context, Some(&context.product_info));
            payload
        };

        self.reload(&identity);
        let outcome = self.emit(event_type, &payload);
        if let Some(host) = container.host_id.as_deref() {
            self.arm_in_host(host, &identity, payload);
        }
        Some(outcome)
    }

    /// `searchModalOpen`: a quote/contact modal opened from a search result,
    /// with the unit's data as the event detail.
    pub fn on_search_modal_open(&mut self, detail: &EventPayload) -> Option<DispatchOutcome> {
        if detail.is_empty() {
            return None;
        }
        let product = parse_products_data(&self.config, detail, &self.location.href);
        let identity = FormIdentity::new(
            str_field(detail, "formName").unwrap_or_default(),
            str_field(detail, "formType").unwrap_or_default(),
            str_field(detail, "formId").unwrap_or_default(),
        );

        let model = str_field(detail, "modelName").unwrap_or_default();
        let product_id = if self.config.is_external_branded_zone_site
            && is_truthy(detail.get("productId"))
        {
            str_field(detail, "productId")
        } else {
            str_field(&product, "product_id")
        };
        let host = format!("{model}_{}", product_id.unwrap_or_default());

        if !identity.is_complete() {
            debug!(form = %identity.key(), "search modal detail is missing identity attributes");
            return None;
        }

        let payload = {
            let context = self.context.borrow();
            let mut payload = merged(&[&context.site_user, &identity.to_payload(), &product]);
            decorate(&mut payload, &context, None);
            payload
        };

        self.reload(&identity);
        let outcome = self.emit(FORM_LOAD, &payload);
        self.arm_in_host(&host, &identity, payload);
        Some(outcome)
    }

    /// Explicit load for a modal form whose enclosing context keeps it out of
    /// the static scan. The context is reported as `form_context`.
    pub fn trigger_form_load(&mut self, container: &FormContainer) -> Option<DispatchOutcome> {
        self.remember_form(container);
        let identity = container.identity();
        if !identity.is_complete() {
            debug!(form = %identity.key(), "explicit form load is missing identity attributes");
            return None;
        }

        let mut form = EventPayload::new();
        if let Some(label) = form_context(container) {
            set_str(&mut form, "form_context", label);
        }
        form.extend(identity.to_payload());

        let payload = {
            let context = self.context.borrow();
            let mut payload = merged(&[&context.site_user, &form]);
            if let Some(h1) = context.page_h1() {
                set_str(&mut payload, "page_h1", h1);
            }
            payload
        };

        self.reload(&identity);
        let outcome = self.emit(FORM_LOAD, &payload);
        if let Some(host) = container.host_id.as_deref() {
            self.arm_in_host(host, &identity, payload);
        }
        Some(outcome)
    }

    /// First `input`, `focus` or `click` inside an armed form host. All three
    /// listeners are detached on the first call for a host.
    pub fn handle_interaction(
        &mut self,
        host_id: &str,
        kind: InteractionKind,
    ) -> Option<DispatchOutcome> {
        let armed = self.armed.remove(host_id)?;
        if !self.tracker.mark_interacted(&armed.identity) {
            debug!(form = %armed.identity.key(), "interaction already tracked");
            return None;
        }
        debug!(form = %armed.identity.key(), ?kind, "first form interaction");
        Some(self.emit(FORM_INTERACTION, &armed.payload))
    }

    /// DOM `submit` inside a lead form container. Reported once per
    /// identity, the anonymous identity included.
    pub fn handle_submit(
        &mut self,
        container: &FormContainer,
        fields: &[FormField],
    ) -> Option<DispatchOutcome> {
        if !container.is_lead_form() {
            return None;
        }
        let identity = container.identity();
        if !self.tracker.mark_submitted(&identity) {
            debug!(form = %identity.key(), "submission already tracked");
            return None;
        }

        let mut data = form_data(container);
        data.extend(extract_field_data(fields));
        Some(self.submit(&data))
    }

    /// `FormSubmissionDetails`: a component-serialized submission. Only
    /// identified submissions are deduplicated here.
    pub fn handle_submission_details(&mut self, form_data: &EventPayload) -> Option<DispatchOutcome> {
        let identity = FormIdentity::from_payload(form_data);
        if !identity.is_empty() && !self.tracker.mark_submitted(&identity) {
            debug!(form = %identity.key(), "submission already tracked");
            return None;
        }
        Some(self.submit(form_data))
    }

    pub fn handle_select_change(
        &mut self,
        container: &FormContainer,
        select_name: &str,
        value: &str,
    ) -> Option<DispatchOutcome> {
        let select = SpecializedSelect::detect(container, select_name)?;
        Some(self.emit(select.event_name(), &select.payload(value)))
    }

    /// Sends an arbitrary event carrying the form's identity fields.
    pub fn track_custom_form_event(
        &self,
        container: &FormContainer,
        event_type: &str,
        additional: &EventPayload,
    ) -> DispatchOutcome {
        let mut data = form_data(container);
        for (key, value) in additional {
            data.insert(key.clone(), value.clone());
        }
        self.emit(event_type, &data)
    }

    /// `submit` on a `.did-promotion-form`. Not deduplicated.
    pub fn did_promotion_submit(
        &self,
        promotion_id: Option<&str>,
        promotion_name: Option<&str>,
        dealer_id: Option<&str>,
    ) -> DispatchOutcome {
        let mut data = EventPayload::new();
        set_str(&mut data, "promotion_id", promotion_id.unwrap_or_default());
        set_str(&mut data, "promotion_name", promotion_name.unwrap_or_default());
        set_str(&mut data, "promotion_type", "did");
        set_str(&mut data, "dealer_id", dealer_id.unwrap_or_default());
        self.emit(DID_PROMOTION_SUBMISSION, &data)
    }

    /// `click` on a `.did-promotion-toggle`. `aria_expanded` is read before
    /// the toggle flips it, so `"false"` means the panel is opening.
    pub fn did_promotion_toggle(
        &self,
        promotion_id: Option<&str>,
        aria_expanded: Option<&str>,
    ) -> DispatchOutcome {
        let expanding = aria_expanded == Some("false");
        let (event_type, action) = if expanding {
            (DID_PROMOTION_EXPANDED, "expand")
        } else {
            (DID_PROMOTION_COLLAPSED, "collapse")
        };

        let mut data = EventPayload::new();
        set_str(&mut data, "promotion_id", promotion_id.unwrap_or_default());
        set_str(&mut data, "action", action);
        self.emit(event_type, &data)
    }

    /// Allows the form's interaction and submission to be reported again.
    pub fn reset_form_tracking(&mut self, container: &FormContainer) {
        self.tracker.reset(&container.identity());
    }

    #[must_use]
    pub fn form_analytics(&self) -> FormAnalytics {
        let counts = self.tracker.counts();
        FormAnalytics {
            forms_with_interaction: counts.interacted,
            forms_submitted: counts.submitted,
            total_forms_tracked: self.forms.iter().filter(|form| form.is_lead_form()).count(),
        }
    }

    pub fn destroy(&mut self) {
        self.tracker.reset_all();
        self.armed.clear();
        self.observing = false;
    }

    fn load_candidate(&mut self, container: &FormContainer) -> Option<FormIdentity> {
        let identity = container.identity();
        if self.tracker.has_loaded(&identity) {
            debug!(form = %identity.key(), "form already loaded");
            return None;
        }
        if let Some(reason) = exclusion(container, self.screen_width) {
            debug!(form = %identity.key(), reason = reason.as_str(), "skipping excluded form");
            return None;
        }
        if !identity.is_trackable() {
            debug!(form = %identity.key(), "form has no usable identity");
            return None;
        }

        self.tracker.mark_loaded(&identity);
        let data = form_data(container);
        self.emit(FORM_LOAD, &data);

        match container.host_id.as_deref() {
            Some(host) => self.arm(host, &identity, data),
            None => warn!(form = %identity.key(), "could not find form host id for interaction tracking"),
        }
        Some(identity)
    }

    /// Marks a modal-driven load, clearing earlier interaction and submission
    /// state when the identity was already loaded.
    fn reload(&mut self, identity: &FormIdentity) {
        if !self.tracker.mark_loaded(identity) {
            self.tracker.reset(identity);
        }
    }

    fn arm(&mut self, host: &str, identity: &FormIdentity, payload: EventPayload) {
        if self.tracker.has_interacted(identity) {
            return;
        }
        self.armed.insert(
            host.to_string(),
            ArmedInteraction {
                identity: identity.clone(),
                payload,
            },
        );
    }

    /// Arms only when the host actually renders a `<form>`.
    fn arm_in_host(&mut self, host: &str, identity: &FormIdentity, payload: EventPayload) {
        let rendered = self
            .forms
            .iter()
            .any(|form| form.has_form_element && form.host_id.as_deref() == Some(host));
        if rendered {
            self.arm(host, identity, payload);
        } else {
            debug!(host, "form host not found, interaction not armed");
        }
    }

    fn remember_form(&mut self, container: &FormContainer) {
        if !self.forms.contains(container) {
            self.forms.push(container.clone());
        }
    }

    fn submit(&self, form_data: &EventPayload) -> DispatchOutcome {
        let event_type = if str_field(form_data, "form_name").as_deref() == Some(GET_A_QUOTE_FORM) {
            GET_A_QUOTE_SUBMIT
        } else {
            FORM_SUBMIT
        };

        let payload = {
            let context = self.context.borrow();
            let product = self.product_details(&context, form_data);
            let showcase = showcase_data(&context.utag_data);
            let promotion = promotion_data(&self.promotion, Some(form_data), Some(form_data));
            let mut payload = merged(&[
                &context.site_user,
                form_data,
                &product,
                &showcase,
                &promotion,
            ]);
            decorate(&mut payload, &context, Some(&product));
            payload
        };
        self.emit(event_type, &payload)
    }

    /// Product context for a submission: parsed from the form data on search
    /// pages, from the query string on finance pages, the page's product
    /// otherwise.
    fn product_details(&self, context: &AmbientContext, form_data: &EventPayload) -> EventPayload {
        match context.effective_page_type().as_str() {
            SEARCH_PAGE => parse_products_data(&self.config, form_data, &self.location.href),
            FINANCE_PAGE => {
                let query = query_string_to_payload(&self.location.search);
                if is_truthy(query.get("productId")) {
                    parse_products_data(&self.config, &query, &self.location.href)
                } else {
                    EventPayload::new()
                }
            }
            _ => context.product_info.clone(),
        }
    }

    fn emit(&self, event_type: &str, data: &EventPayload) -> DispatchOutcome {
        let context = self.context.borrow();
        let custom = merged(&[&context.utag_data, data]);
        self.dispatcher
            .link(event_type, &context.utag_data, &custom, None)
    }
}

fn form_data(container: &FormContainer) -> EventPayload {
    let mut data = container.identity().to_payload();
    set_str(
        &mut data,
        "form_location",
        container.form_location.clone().unwrap_or_default(),
    );
    data
}

/// Page heading, make and make group shared by the modal and submission
/// payloads.
fn decorate(payload: &mut EventPayload, context: &AmbientContext, product: Option<&EventPayload>) {
    if let Some(h1) = context.page_h1() {
        set_str(payload, "page_h1", h1);
    }
    if let Some(product) = product {
        if let Some(make) = str_field(product, "product_make") {
            set_str(payload, "page_make", make.to_lowercase());
        }
        if let Some(make_id) = product.get("product_make_id").filter(|id| is_truthy(Some(id))) {
            payload.insert("page_make_id".to_string(), make_id.clone());
        }
    }
    if !context.page_make_group.is_empty() {
        set_str(payload, "page_make_group", context.page_make_group.as_str());
    }
}
