use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::EventPayload;

const SCRIPT_HOST: &str = "//tags.tiqcdn.com/utag/dtms";
const INVENTORY_SEGMENT: &str = "/inventory/";
const KEYWORD_FILTER: &str = "query";

/// Page configuration rendered by the site template (`window.TealiumConfig`).
///
/// `tealium_profile` holds the raw template setting; use
/// [`TealiumConfig::resolved_profile`] for the account-qualified name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct TealiumConfig {
    pub tealium_environment: String,
    pub tealium_profile: String,
    pub piwik_id: String,
    pub ga4_id: String,
    pub is_external_branded_zone_site: bool,
    pub is_branded_zone_site: bool,
    pub absolute_path: String,
    pub parent_site_platform_type: String,
    pub lang_code: String,
    pub search_page_applied_filters: Vec<String>,
    pub search_keyword: String,
    pub page_type: String,
    pub page_sub_type: String,
    pub event_type: String,
    pub page_brand: String,
    pub page_brand_id: String,
    pub page_brand_category: String,
    pub page_brand_category_id: String,
    pub page_brand_sub_category: String,
    pub page_brand_sub_category_id: String,
    pub page_make_group: String,
    pub site_user: EventPayload,
    pub product_info: EventPayload,
    pub brand_promotion_info: EventPayload,
}

impl Default for TealiumConfig {
    fn default() -> Self {
        Self {
            tealium_environment: "prod".to_string(),
            tealium_profile: "default".to_string(),
            piwik_id: String::new(),
            ga4_id: String::new(),
            is_external_branded_zone_site: false,
            is_branded_zone_site: false,
            absolute_path: "/".to_string(),
            parent_site_platform_type: String::new(),
            lang_code: "en-US".to_string(),
            search_page_applied_filters: Vec::new(),
            search_keyword: String::new(),
            page_type: "other".to_string(),
            page_sub_type: String::new(),
            event_type: "standard_view".to_string(),
            page_brand: String::new(),
            page_brand_id: String::new(),
            page_brand_category: String::new(),
            page_brand_category_id: String::new(),
            page_brand_sub_category: String::new(),
            page_brand_sub_category_id: String::new(),
            page_make_group: String::new(),
            site_user: EventPayload::new(),
            product_info: EventPayload::new(),
            brand_promotion_info: EventPayload::new(),
        }
    }
}

impl TealiumConfig {
    /// `dealerspike-*` for sites hosted on an external parent platform,
    /// `ari-*` otherwise. The `default` profile maps to `<prefix>-eas`.
    #[must_use]
    pub fn resolved_profile(&self) -> String {
        let prefix = if self.is_external_branded_zone_site {
            "dealerspike"
        } else {
            "ari"
        };
        if self.tealium_profile == "default" {
            format!("{prefix}-eas")
        } else {
            format!("{prefix}-{}", self.tealium_profile)
        }
    }

    #[must_use]
    pub fn script_url(&self) -> String {
        format!(
            "{SCRIPT_HOST}/{}/{}/utag.js",
            self.resolved_profile(),
            self.tealium_environment
        )
    }

    /// Fills the search filters and keyword from the inventory URL path.
    ///
    /// Does nothing when `href` carries no `/inventory/` segment.
    pub fn apply_search_filters_from_url(&mut self, href: &str) {
        if let Some(filters) = search_filters_from_url(href) {
            self.search_page_applied_filters = filters.applied;
            if let Some(keyword) = filters.keyword {
                self.search_keyword = keyword;
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    /// `name:value1,value2` entries in first-seen name order.
    pub applied: Vec<String>,
    pub keyword: Option<String>,
}

/// Reads `/inventory/<name>/<value>/...` pairs out of a page URL.
///
/// Repeated names accumulate values. The `query` name becomes the keyword.
#[must_use]
pub fn search_filters_from_url(href: &str) -> Option<SearchFilters> {
    let decoded = urlencoding::decode(href)
        .map(|text| text.into_owned())
        .unwrap_or_else(|_| href.to_string());
    let start = decoded.find(INVENTORY_SEGMENT)? + INVENTORY_SEGMENT.len();
    let segments: Vec<&str> = decoded[start..].split('/').collect();

    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for pair in segments.chunks_exact(2) {
        let (name, value) = (pair[0], pair[1]);
        if name.is_empty() || value.is_empty() {
            continue;
        }
        match grouped.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, values)) => values.push(value.to_string()),
            None => grouped.push((name.to_string(), vec![value.to_string()])),
        }
    }

    let mut filters = SearchFilters::default();
    for (name, values) in grouped {
        if name == KEYWORD_FILTER {
            filters.keyword = Some(values.join(","));
        } else {
            filters.applied.push(format!("{name}:{}", values.join(",")));
        }
    }
    Some(filters)
}

pub fn load_config(path: &Path) -> Result<TealiumConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid config json {}", path.display()))
}
