//! Snapshot of the parts of the page DOM the pipeline reads.
//!
//! Selector-level scraping lives outside this crate; whatever drives the
//! pipeline (a browser binding, or a recorded scenario) fills these in.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::form::FormIdentity;

const DEFAULT_SCREEN_WIDTH: u32 = 1280;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PageLocation {
    pub href: String,
    pub pathname: String,
    pub search: String,
}

/// A `.component[class*=" LeadForm_"]` container and what it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FormContainer {
    /// Class attribute of the container itself.
    pub classes: String,
    /// Class attributes of enclosing elements, innermost first.
    pub ancestor_classes: Vec<String>,
    /// Id of the closest `.ari-form` or `[id*="AriFormModal"]` element.
    pub host_id: Option<String>,
    pub form_name: Option<String>,
    pub lead_type: Option<String>,
    pub form_id: Option<String>,
    pub form_location: Option<String>,
    /// Whether an actual `<form>` element is rendered inside the host.
    pub has_form_element: bool,
}

impl Default for FormContainer {
    fn default() -> Self {
        Self {
            classes: String::new(),
            ancestor_classes: Vec::new(),
            host_id: None,
            form_name: None,
            lead_type: None,
            form_id: None,
            form_location: None,
            has_form_element: true,
        }
    }
}

impl FormContainer {
    #[must_use]
    pub fn identity(&self) -> FormIdentity {
        FormIdentity::new(
            self.form_name.clone().unwrap_or_default(),
            self.lead_type.clone().unwrap_or_default(),
            self.form_id.clone().unwrap_or_default(),
        )
    }

    /// Matches `.component[class*=" LeadForm_"]`.
    #[must_use]
    pub fn is_lead_form(&self) -> bool {
        self.classes.split_whitespace().any(|class| class == "component")
            && self.classes.contains(" LeadForm_")
    }

    /// Equivalent of `closest('[class*="<fragment>"]')`: the container itself
    /// or any ancestor has a class attribute containing `fragment`.
    #[must_use]
    pub fn within(&self, fragment: &str) -> bool {
        self.classes.contains(fragment)
            || self
                .ancestor_classes
                .iter()
                .any(|classes| classes.contains(fragment))
    }
}

/// Presence checks the page scripts perform with single selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PageFeatures {
    pub podium_chatbox: bool,
    pub page_not_found_modal: bool,
    pub visitors_count: bool,
    pub dealer360_spin: bool,
    pub inventory_promo_message: bool,
    pub boatyard_button: bool,
    pub reserve_unit_button: bool,
    pub pss_component: bool,
    pub oem_parts_lookup: bool,
    pub new_holland_ce_landing: bool,
    pub promotion_links: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SeoBanner {
    pub html: String,
    /// Text of `p` and `li` elements.
    pub paragraphs: Vec<String>,
    pub image_count: u32,
    pub h2: Vec<String>,
    pub h3: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BlogSnapshot {
    pub author: String,
    pub category: String,
    pub date: String,
    pub h2: Vec<String>,
    pub paragraphs: Vec<String>,
    pub tags: Vec<String>,
    pub list_categories: Vec<String>,
    pub list_dates: Vec<String>,
    pub list_titles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PageSnapshot {
    pub location: PageLocation,
    pub screen_width: u32,
    pub h1: Vec<String>,
    pub forms: Vec<FormContainer>,
    pub features: PageFeatures,
    /// Inner HTML of `#unit-analytics-data`.
    pub unit_analytics_data: Option<String>,
    /// Inner HTML of `#promotion-analytics-data`.
    pub promotion_analytics_data: Option<String>,
    /// Inner text of each `span.datasource.hidden`.
    pub list_datasources: Vec<String>,
    /// Text of `.search-results-count`.
    pub search_results_count: Option<String>,
    pub seo_header: Option<SeoBanner>,
    pub seo_footer: Option<SeoBanner>,
    /// First value of each `span[data-*]` attribute, keyed by attribute name.
    pub data_attributes: BTreeMap<String, String>,
    pub blog: Option<BlogSnapshot>,
}

impl Default for PageSnapshot {
    fn default() -> Self {
        Self {
            location: PageLocation::default(),
            screen_width: DEFAULT_SCREEN_WIDTH,
            h1: Vec::new(),
            forms: Vec::new(),
            features: PageFeatures::default(),
            unit_analytics_data: None,
            promotion_analytics_data: None,
            list_datasources: Vec::new(),
            search_results_count: None,
            seo_header: None,
            seo_footer: None,
            data_attributes: BTreeMap::new(),
            blog: None,
        }
    }
}

impl PageSnapshot {
    pub fn lead_forms(&self) -> impl Iterator<Item = &FormContainer> {
        self.forms.iter().filter(|form| form.is_lead_form())
    }

    #[must_use]
    pub fn has_form_host(&self, host_id: &str) -> bool {
        self.forms
            .iter()
            .any(|form| form.has_form_element && form.host_id.as_deref() == Some(host_id))
    }
}
