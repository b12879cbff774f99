//! Vocabulary of DOM and custom events the pipeline reacts to.
//!
//! The custom event names are a contract with sibling page components and
//! must not change.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::page::FormContainer;
use super::payload::EventPayload;

pub const FORM_SUBMISSION_DETAILS: &str = "FormSubmissionDetails";
pub const SEARCH_MODAL_OPEN: &str = "searchModalOpen";
pub const DID_VIEW_OFFER_DETAILS_CLICK: &str = "DIDViewOfferDetailsClick";
pub const DID_VIEW_MORE_CLICK: &str = "DIDViewMoreClick";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Input,
    Focus,
    Click,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum EcommerceAction {
    AddToCart,
    RemoveFromCart,
    ProductView,
    Purchase,
    InventoryInteraction,
}

impl EcommerceAction {
    pub const fn dom_name(self) -> &'static str {
        match self {
            Self::AddToCart => "AddToCart",
            Self::RemoveFromCart => "RemoveFromCart",
            Self::ProductView => "ProductView",
            Self::Purchase => "Purchase",
            Self::InventoryInteraction => "InventoryInteraction",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum PageEvent {
    /// Lead form containers inserted after the initial scan.
    FormsAdded { forms: Vec<FormContainer> },
    /// `show.bs.modal` on a `div[id*="AriFormModal"]`.
    ModalShown { form: FormContainer },
    /// Explicit form load for a modal whose context is excluded from scans.
    ModalFormLoad { form: FormContainer },
    #[serde(rename = "searchModalOpen")]
    SearchModalOpen { detail: EventPayload },
    Interaction { target: String, kind: InteractionKind },
    Submit {
        form: FormContainer,
        #[serde(default)]
        fields: Vec<FormField>,
    },
    #[serde(rename = "FormSubmissionDetails")]
    FormSubmissionDetails {
        #[serde(rename = "formData")]
        form_data: EventPayload,
    },
    SelectChanged {
        form: FormContainer,
        select_name: String,
        value: String,
    },
    #[serde(rename = "DIDViewOfferDetailsClick")]
    DidViewOfferDetailsClick {
        #[serde(default, rename = "promotionTitle")]
        promotion_title: Option<String>,
        #[serde(default, rename = "promotionIds")]
        promotion_ids: Option<String>,
    },
    #[serde(rename = "DIDViewMoreClick")]
    DidViewMoreClick {
        #[serde(default)]
        section: Option<String>,
        #[serde(default)]
        content: Option<String>,
    },
    /// Click on a promotion slide; carries the slide's embedded datasource.
    PromoClick {
        #[serde(default)]
        datasource: Option<String>,
    },
    CarouselClick {
        #[serde(default)]
        slide_index: Option<String>,
        #[serde(default)]
        slide_title: Option<String>,
    },
    GoogleMapsClick {
        #[serde(default)]
        text: String,
        #[serde(default)]
        href: String,
    },
    BrandedZoneClick {
        #[serde(default)]
        text: String,
        #[serde(default)]
        href: String,
    },
    /// `.promotion-link` click on a listing page, before navigating.
    PromotionLinkClick,
    /// `#inventory_promoMessage` click on a product details page.
    InventoryPromoMessageClick,
    /// `submit` on a `.did-promotion-form`, with its `data-*` attributes.
    DidPromotionSubmit {
        #[serde(default)]
        promotion_id: Option<String>,
        #[serde(default)]
        promotion_name: Option<String>,
        #[serde(default)]
        dealer_id: Option<String>,
    },
    /// `click` on a `.did-promotion-toggle`.
    DidPromotionToggle {
        #[serde(default)]
        promotion_id: Option<String>,
        #[serde(default)]
        aria_expanded: Option<String>,
    },
    Ecommerce {
        action: EcommerceAction,
        #[serde(default)]
        detail: EventPayload,
    },
}

impl PageEvent {
    /// DOM event name the listener is registered under.
    pub const fn dom_name(&self) -> &'static str {
        match self {
            Self::FormsAdded { .. } => "mutation",
            Self::ModalShown { .. } => "show.bs.modal",
            Self::ModalFormLoad { .. } => "TriggerUtagFormLoad",
            Self::SearchModalOpen { .. } => SEARCH_MODAL_OPEN,
            Self::Interaction { kind, .. } => match kind {
                InteractionKind::Input => "input",
                InteractionKind::Focus => "focus",
                InteractionKind::Click => "click",
            },
            Self::Submit { .. } | Self::DidPromotionSubmit { .. } => "submit",
            Self::FormSubmissionDetails { .. } => FORM_SUBMISSION_DETAILS,
            Self::SelectChanged { .. } => "change",
            Self::DidViewOfferDetailsClick { .. } => DID_VIEW_OFFER_DETAILS_CLICK,
            Self::DidViewMoreClick { .. } => DID_VIEW_MORE_CLICK,
            Self::PromoClick { .. }
            | Self::CarouselClick { .. }
            | Self::GoogleMapsClick { .. }
            | Self::BrandedZoneClick { .. } => "mousedown",
            Self::PromotionLinkClick
            | Self::InventoryPromoMessageClick
            | Self::DidPromotionToggle { .. } => "click",
            Self::Ecommerce { action, .. } => action.dom_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{EcommerceAction, PageEvent};

    #[test]
    fn custom_event_names_round_trip_through_json_tags() {
        let event: PageEvent = serde_json::from_value(json!({
            "type": "DIDViewOfferDetailsClick",
            "promotionTitle": "Spring Sale",
            "promotionIds": "11,12"
        }))
        .expect("offer details click should parse");

        assert_eq!(event.dom_name(), "DIDViewOfferDetailsClick");
        match event {
            PageEvent::DidViewOfferDetailsClick {
                promotion_title,
                promotion_ids,
            } => {
                assert_eq!(promotion_title.as_deref(), Some("Spring Sale"));
                assert_eq!(promotion_ids.as_deref(), Some("11,12"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn submission_details_reads_form_data_key() {
        let event: PageEvent = serde_json::from_value(json!({
            "type": "FormSubmissionDetails",
            "formData": {"form_name": "Get A Quote"}
        }))
        .expect("submission details should parse");

        assert_eq!(event.dom_name(), "FormSubmissionDetails");
    }

    #[test]
    fn did_promotion_toggle_parses_aria_state() {
        let event: PageEvent = serde_json::from_value(json!({
            "type": "DidPromotionToggle",
            "promotion_id": "77",
            "aria_expanded": "false"
        }))
        .expect("promotion toggle should parse");

        assert_eq!(event.dom_name(), "click");
        assert_eq!(
            event,
            PageEvent::DidPromotionToggle {
                promotion_id: Some("77".into()),
                aria_expanded: Some("false".into()),
            }
        );
    }

    #[test]
    fn ecommerce_events_keep_their_dom_names() {
        let event = PageEvent::Ecommerce {
            action: EcommerceAction::RemoveFromCart,
            detail: Default::default(),
        };
        assert_eq!(event.dom_name(), "RemoveFromCart");
    }
}
