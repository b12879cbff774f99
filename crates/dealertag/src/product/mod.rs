//! Product and promotion data points read from the page datasources.

use serde_json::Value;
use tracing::warn;
use url::Url;

use crate::config::TealiumConfig;
use crate::error::TrackingError;
use crate::forms::policy::CANT_FIND_FORM_ID;
use crate::models::{
    EventPayload, PageSnapshot, is_truthy, number_field, set_str, str_field,
};
use crate::storage::PromotionSelection;
use crate::utils::json::{number_value, parse_price, parse_price_value, safe_json_parse};

pub const PRODUCT_DETAILS_PAGE: &str = "product details";
pub const UNIT_DATASOURCE: &str = "#unit-analytics-data";
pub const PROMOTION_DATASOURCE: &str = "#promotion-analytics-data";

/// Fields whose presence marks a `span.datasource` record as a product.
const PRODUCT_ITEM_FIELDS: [&str; 15] = [
    "itemMake",
    "itemYear",
    "productId",
    "productExternalId",
    "isUnitInventory",
    "itemOnSale",
    "name",
    "unitPrice",
    "itemType",
    "itemTypeId",
    "itemIndustry",
    "productOwnerId",
    "itemOriginalPrice",
    "vin",
    "primaryColor",
];

/// Product-details data points from `#unit-analytics-data`.
///
/// Returns `Ok(None)` off product-details pages.
pub fn product_analytics(
    config: &TealiumConfig,
    page: &PageSnapshot,
) -> Result<Option<EventPayload>, TrackingError> {
    if config.page_type != PRODUCT_DETAILS_PAGE {
        return Ok(None);
    }
    let raw = page
        .unit_analytics_data
        .as_deref()
        .ok_or_else(|| TrackingError::MissingDomTarget(UNIT_DATASOURCE.to_string()))?;
    let source = as_object(UNIT_DATASOURCE, safe_json_parse(UNIT_DATASOURCE, raw)?)?;

    let mut info = EventPayload::new();
    match external_id(config, &source) {
        Some(external) => {
            info.insert("product_id".into(), external.clone());
            info.insert(
                "product_external_platform".into(),
                Value::Array(vec![config.parent_site_platform_type.clone().into()]),
            );
            info.insert("product_external_id".into(), Value::Array(vec![external]));
        }
        None => copy_field(&source, "productId", &mut info, "product_id"),
    }
    if let Some(name) = str_field(&source, "item") {
        set_str(&mut info, "product_name", name.trim());
    }
    info.insert(
        "vdp_urgency_active".into(),
        flag(page.features.visitors_count),
    );

    if is_truthy(source.get("itemTypeId")) {
        copy_field(&source, "itemType", &mut info, "product_category");
        copy_field(&source, "itemTypeId", &mut info, "product_category_id");
    }
    if is_truthy(source.get("itemSubtypeId")) {
        copy_field(&source, "itemSubtypeId", &mut info, "product_subcategory_id");
        copy_field(&source, "itemSubtype", &mut info, "product_subcategory");
    }
    if is_truthy(source.get("itemMakeId")) {
        copy_field(&source, "itemMakeId", &mut info, "product_make_id");
        copy_field(&source, "itemMake", &mut info, "product_make");
    }
    if is_truthy(source.get("itemModel")) {
        copy_field(&source, "itemModel", &mut info, "product_model");
    }
    if number_field(&source, "itemYear").is_some_and(|year| year > 0.0) {
        copy_field(&source, "itemYear", &mut info, "product_year");
    }

    let is_unit_inventory = is_truthy(source.get("isUnitInventory"));
    if let Some(status) = str_field(&source, "usageStatus") {
        set_str(&mut info, "product_condition", status.trim());
    } else if !is_unit_inventory {
        set_str(&mut info, "product_condition", "New");
    }
    if let Some(industry) = str_field(&source, "itemIndustry") {
        set_str(&mut info, "product_industry", industry.trim());
    }

    let on_sale = is_truthy(source.get("itemOnSale"));
    info.insert("product_on_sale".into(), flag(on_sale));
    set_str(
        &mut info,
        "product_type",
        if is_unit_inventory { "Inventory" } else { "Showcase" },
    );
    set_str(&mut info, "product_uri", page.location.pathname.clone());
    if is_truthy(source.get("itemThumbNailUrl")) {
        copy_field(&source, "itemThumbNailUrl", &mut info, "product_image_url");
    }
    copy_field(&source, "itemCustomImageCount", &mut info, "product_custom_image_count");
    copy_field(&source, "itemVideoExists", &mut info, "product_videos_count");
    info.insert(
        "product_360view_count".into(),
        flag(page.features.dealer360_spin),
    );
    copy_field(
        &source,
        "itemDescriptionCount",
        &mut info,
        "product_description_char_count",
    );

    let original_price = parse_price_value(source.get("itemOriginalPrice"));
    if original_price > 0.0 {
        info.insert("product_original_price".into(), number_value(original_price));
    }
    if on_sale {
        if let Some(sale_price) = str_field(&source, "salePrice") {
            set_str(&mut info, "product_price", sale_price.replace(['$', ','], ""));
        }
        if is_truthy(source.get("discountAmount")) {
            copy_field(&source, "discountAmount", &mut info, "product_discount_amount");
        }
    } else if original_price > 0.0 {
        info.insert("product_price".into(), number_value(original_price));
    }

    Ok(Some(info))
}

/// Brand promotion data points from `#promotion-analytics-data`.
///
/// An absent datasource yields an empty payload.
pub fn promotion_analytics(page: &PageSnapshot) -> Result<EventPayload, TrackingError> {
    let mut info = EventPayload::new();
    let Some(raw) = page.promotion_analytics_data.as_deref() else {
        return Ok(info);
    };
    let source = as_object(
        PROMOTION_DATASOURCE,
        safe_json_parse(PROMOTION_DATASOURCE, raw)?,
    )?;

    if is_truthy(source.get("promotionId")) {
        copy_field(&source, "promotionId", &mut info, "promotion_id");
        copy_field(&source, "promotionName", &mut info, "promotion_name");
    }
    if is_truthy(source.get("promotionMakeId")) {
        copy_field(&source, "promotionMakeId", &mut info, "promotion_make_id");
        copy_field(&source, "promotionMake", &mut info, "promotion_make");
    }
    if is_truthy(source.get("promotionCategoryId")) {
        copy_field(&source, "promotionCategory", &mut info, "promotion_category");
        copy_field(&source, "promotionCategoryId", &mut info, "promotion_category_id");
    }
    Ok(info)
}

#[derive(Default)]
struct ProductLists {
    makes: Vec<Value>,
    years: Vec<Value>,
    ids: Vec<Value>,
    names: Vec<Value>,
    types: Vec<Value>,
    on_sale: Vec<Value>,
    prices: Vec<Value>,
    categories: Vec<Value>,
    category_ids: Vec<Value>,
    industries: Vec<Value>,
    make_ids: Vec<Value>,
    msrps: Vec<Value>,
    vins: Vec<Value>,
    external_colors: Vec<Value>,
    external_ids: Vec<Value>,
    external_platforms: Vec<Value>,
    did_active: Vec<Value>,
}

/// `product_list_*` arrays built from the search-result datasources.
///
/// Records that fail to parse or carry no product field are skipped. Arrays
/// stay index-aligned across the accepted records; empty arrays are omitted.
#[must_use]
pub fn product_list_arrays(config: &TealiumConfig, datasources: &[String]) -> EventPayload {
    let mut lists = ProductLists::default();

    for raw in datasources {
        let data = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(data)) => data,
            Ok(_) => continue,
            Err(err) => {
                warn!(error = %err, "json parse failed for unit datasource");
                continue;
            }
        };
        if !is_product_data(&data) {
            continue;
        }

        let field = |key: &str| data.get(key).cloned().unwrap_or(Value::Null);
        lists.makes.push(field("itemMake"));
        lists.years.push(field("itemYear"));
        match external_id(config, &data) {
            Some(external) => {
                let numeric = str_field(&data, "productExternalId")
                    .and_then(|id| leading_integer(&id))
                    .map_or(Value::Null, Value::from);
                lists.ids.push(numeric);
                lists.external_ids.push(external);
                lists
                    .external_platforms
                    .push(config.parent_site_platform_type.clone().into());
            }
            None => lists.ids.push(field("productId")),
        }
        lists.names.push(field("name"));
        lists.types.push(
            if text_is_true(&data, "isUnitInventory") {
                "Inventory"
            } else {
                "Showcase"
            }
            .into(),
        );
        lists
            .on_sale
            .push(if text_is_true(&data, "itemOnSale") { "1" } else { "0" }.into());
        lists.prices.push(field("unitPrice"));
        lists.categories.push(field("itemType"));
        lists.category_ids.push(field("itemTypeId"));
        lists.industries.push(field("itemIndustry"));
        lists.make_ids.push(field("productOwnerId"));
        lists.msrps.push(field("itemOriginalPrice"));
        lists.vins.push(field("vin"));
        lists.external_colors.push(field("primaryColor"));
        lists
            .did_active
            .push(flag(is_truthy(data.get("arePromotionsAvailable"))));
    }

    let mut out = EventPayload::new();
    for (key, values) in [
        ("product_list_makes", lists.makes),
        ("product_list_years", lists.years),
        ("product_list_ids", lists.ids),
        ("product_list_names", lists.names),
        ("product_list_types", lists.types),
        ("product_list_on_sale", lists.on_sale),
        ("product_list_prices", lists.prices),
        ("product_list_categories", lists.categories),
        ("product_list_category_ids", lists.category_ids),
        ("product_list_industries", lists.industries),
        ("product_list_make_ids", lists.make_ids),
        ("product_list_msrp", lists.msrps),
        ("product_list_vins", lists.vins),
        ("product_list_external_colors", lists.external_colors),
        ("product_external_id", lists.external_ids),
        ("product_external_platform", lists.external_platforms),
        ("product_list_did_active", lists.did_active),
    ] {
        if !values.is_empty() {
            out.insert(key.to_string(), Value::Array(values));
        }
    }
    out
}

/// Product data points for an event detail (form payloads, ecommerce events).
///
/// `page_href` resolves relative item URLs to a path.
#[must_use]
pub fn parse_products_data(
    config: &TealiumConfig,
    item: &EventPayload,
    page_href: &str,
) -> EventPayload {
    let mut product = EventPayload::new();

    match external_id(config, item) {
        Some(external) => {
            product.insert("product_id".into(), external);
        }
        None if is_truthy(item.get("productId")) => {
            copy_field(item, "productId", &mut product, "product_id");
        }
        None => {}
    }
    if is_truthy(item.get("item")) {
        copy_field(item, "item", &mut product, "product_name");
    }
    if let Some(year) = first_positive(item, &["itemYear", "year"]) {
        copy_field(item, year, &mut product, "product_year");
    }
    if is_truthy(item.get("itemMake")) {
        copy_field(item, "itemMake", &mut product, "product_make");
    }
    if is_truthy(item.get("itemMakeId")) {
        copy_field(item, "itemMakeId", &mut product, "product_make_id");
    }
    if let Some(model) = first_truthy(item, &["itemModel", "model"]) {
        copy_field(item, model, &mut product, "product_model");
    }
    if let Some(url) = first_truthy(item, &["itemUrl", "itemurl"])
        .and_then(|key| str_field(item, key))
        .and_then(|url| resolve_path(page_href, &url))
    {
        set_str(&mut product, "product_uri", url);
    }
    if is_truthy(item.get("usageStatus")) {
        copy_field(item, "usageStatus", &mut product, "product_condition");
    }
    set_str(
        &mut product,
        "product_type",
        if is_truthy(item.get("isUnitInventory")) {
            "Inventory"
        } else {
            "Showcase"
        },
    );

    let price = str_field(item, "itemDisplayPrice")
        .map(|raw| parse_price(&raw))
        .filter(|price| *price > 0.0);
    if let Some(price) = price {
        product.insert("product_price".into(), number_value(price));
    }
    if is_truthy(item.get("itemType")) {
        copy_field(item, "itemType", &mut product, "product_category");
    }
    if is_truthy(item.get("itemTypeId")) {
        copy_field(item, "itemTypeId", &mut product, "product_category_id");
    }
    let original_price = str_field(item, "itemOriginalPrice")
        .map(|raw| parse_price(&raw))
        .filter(|price| *price > 0.0);
    if let Some(original_price) = original_price {
        product.insert("product_original_price".into(), number_value(original_price));
    }
    if is_truthy(item.get("itemIndustry")) {
        copy_field(item, "itemIndustry", &mut product, "product_industry");
    }

    if is_truthy(item.get("itemOnSale")) {
        let on_sale = text_is_true(item, "itemOnSale");
        set_str(&mut product, "product_on_sale", if on_sale { "1" } else { "0" });
    } else if str_field(item, "FormId").as_deref() != Some(CANT_FIND_FORM_ID) {
        set_str(&mut product, "product_on_sale", "0");
    }
    if let (Some(price), Some(original_price)) = (price, original_price) {
        let discount = original_price - price;
        if discount > 0.0 {
            product.insert("product_discount_amount".into(), number_value(discount));
        }
    }

    if is_truthy(item.get("itemSubtype")) {
        copy_field(item, "itemSubtype", &mut product, "product_subcategory");
        if is_truthy(item.get("itemSubtypeId")) {
            copy_field(item, "itemSubtypeId", &mut product, "product_subcategory_id");
        }
    }
    copy_count(
        item,
        "itemCustomImageCount",
        "imageCount",
        &mut product,
        "product_custom_image_count",
    );
    copy_count(
        item,
        "itemVideoExists",
        "videoCount",
        &mut product,
        "product_videos_count",
    );
    copy_count(
        item,
        "itemDescriptionCount",
        "descriptionLength",
        &mut product,
        "product_description_char_count",
    );
    if is_truthy(item.get("item_360view_count")) {
        copy_field(item, "item_360view_count", &mut product, "product_360view_count");
    }
    if is_truthy(item.get("vdp_urgency_active_flag")) {
        copy_field(item, "vdp_urgency_active_flag", &mut product, "vdp_urgency_active");
    }
    product
}

/// Showroom classification carried over from the page data (`page_make` lowercased).
#[must_use]
pub fn showcase_data(utag_data: &EventPayload) -> EventPayload {
    let mut showcase = EventPayload::new();
    if let Some(make) = str_field(utag_data, "page_make") {
        set_str(&mut showcase, "page_make", make.to_lowercase());
    }
    for key in [
        "page_make_id",
        "page_category",
        "page_category_id",
        "page_subcategory",
        "page_subcategory_id",
    ] {
        if is_truthy(utag_data.get(key)) {
            copy_field(utag_data, key, &mut showcase, key);
        }
    }
    showcase
}

/// Digital-retailing promotion fields attached to form events.
#[must_use]
pub fn promotion_data(
    selection: &PromotionSelection,
    form: Option<&EventPayload>,
    data: Option<&EventPayload>,
) -> EventPayload {
    let mut promotion = EventPayload::new();

    if let Some(ids) = selection.ids() {
        set_str(&mut promotion, "did_promotions_selected", ids.clone());
        set_str(&mut promotion, "campaign_id", ids);
    }
    if let Some(form) = form {
        for (from, to) in [
            ("formId", "did_form_id"),
            ("formName", "did_form_name"),
            ("form_submission_first_name", "did_form_submission_first_name"),
            ("form_submission_last_name", "did_form_submission_last_name"),
        ] {
            copy_field(form, from, &mut promotion, to);
        }
    }
    if let Some((data, contact)) =
        data.and_then(|data| str_field(data, "contact").map(|contact| (data, contact)))
    {
        match contact.as_str() {
            "email" => copy_field(data, "email", &mut promotion, "did_form_submission_email"),
            "phone" => copy_field(data, "phone", &mut promotion, "did_form_submission_phone"),
            _ => {}
        }
        set_str(
            &mut promotion,
            "did_form_submission_perferred_contact",
            contact,
        );
    }
    promotion
}

fn as_object(source_name: &str, value: Value) -> Result<EventPayload, TrackingError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(TrackingError::malformed(
            source_name,
            format!("expected an object, found {other}"),
        )),
    }
}

fn external_id(config: &TealiumConfig, item: &EventPayload) -> Option<Value> {
    if !config.is_external_branded_zone_site {
        return None;
    }
    item.get("productExternalId")
        .filter(|value| is_truthy(Some(value)))
        .cloned()
}

fn is_product_data(data: &EventPayload) -> bool {
    PRODUCT_ITEM_FIELDS.iter().any(|key| match data.get(*key) {
        None | Some(Value::Null) => false,
        Some(Value::String(text)) => !text.trim().is_empty(),
        Some(_) => true,
    })
}

fn text_is_true(data: &EventPayload, key: &str) -> bool {
    str_field(data, key).is_some_and(|text| text.eq_ignore_ascii_case("true"))
}

fn leading_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let end = trimmed
        .char_indices()
        .find(|(index, ch)| !(ch.is_ascii_digit() || (*index == 0 && (*ch == '-' || *ch == '+'))))
        .map_or(trimmed.len(), |(index, _)| index);
    trimmed[..end].parse().ok()
}

fn first_truthy<'k>(item: &EventPayload, keys: &[&'k str]) -> Option<&'k str> {
    keys.iter().copied().find(|key| is_truthy(item.get(*key)))
}

fn first_positive<'k>(item: &EventPayload, keys: &[&'k str]) -> Option<&'k str> {
    keys.iter()
        .copied()
        .find(|key| number_field(item, key).is_some_and(|value| value > 0.0))
}

/// Preferred field when truthy, otherwise the fallback when it is a
/// non-negative number.
fn copy_count(
    item: &EventPayload,
    preferred: &str,
    fallback: &str,
    out: &mut EventPayload,
    target: &str,
) {
    if is_truthy(item.get(preferred)) {
        copy_field(item, preferred, out, target);
    } else if number_field(item, fallback).is_some_and(|count| count >= 0.0) {
        copy_field(item, fallback, out, target);
    }
}

fn copy_field(from: &EventPayload, key: &str, out: &mut EventPayload, target: &str) {
    if let Some(value) = from.get(key) {
        out.insert(target.to_string(), value.clone());
    }
}

fn flag(active: bool) -> Value {
    Value::from(u8::from(active))
}

fn resolve_path(page_href: &str, target: &str) -> Option<String> {
    let resolved = match Url::parse(page_href) {
        Ok(base) => base.join(target).ok()?,
        Err(_) => Url::parse("http://localhost/").ok()?.join(target).ok()?,
    };
    Some(resolved.path().to_string())
}

#[cfg(test)]
mod tests {
    use super::{leading_integer, resolve_path};

    #[test]
    fn relative_and_absolute_item_urls_resolve_to_paths() {
        assert_eq!(
            resolve_path("https://dealer.test/inventory/boats", "/unit/123?ref=x").as_deref(),
            Some("/unit/123")
        );
        assert_eq!(
            resolve_path("https://dealer.test/inventory/", "unit/9").as_deref(),
            Some("/inventory/unit/9")
        );
        assert_eq!(
            resolve_path("not a url", "https://other.test/a/b").as_deref(),
            Some("/a/b")
        );
    }

    #[test]
    fn leading_integer_reads_prefix_digits() {
        assert_eq!(leading_integer("1234abc"), Some(1234));
        assert_eq!(leading_integer(" 42"), Some(42));
        assert_eq!(leading_integer("abc"), None);
    }
}
