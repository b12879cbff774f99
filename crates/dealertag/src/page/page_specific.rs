//! Data points that only exist on particular page types.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::config::TealiumConfig;
use crate::models::{BlogSnapshot, EventPayload, PageSnapshot, SeoBanner, set_str};
use crate::product::product_list_arrays;
use crate::utils::time::format_us_date;

const SEARCH_PAGE: &str = "search";
const SHOWROOM_PAGE: &str = "showroom";
const BLOG_POST: &str = "blog post";
const BLOG_LIST: &str = "blog list";

/// `span[data-*]` attribute to data point, for showroom pages.
const SHOWROOM_ATTRIBUTES: [(&str, &str); 6] = [
    ("data-product-owner-name", "page_make"),
    ("data-product-owner-id", "page_make_id"),
    ("data-category", "page_category"),
    ("data-category-id", "page_category_id"),
    ("data-selected-sub-category", "page_subcategory"),
    ("data-selected-sub-category-id", "page_subcategory_id"),
];

fn header_button_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r#"href=("(.*?)")"#).expect("header button regex should compile"))
}

pub fn apply_page_specific(config: &TealiumConfig, page: &PageSnapshot, utag_data: &mut EventPayload) {
    match config.page_type.as_str() {
        SEARCH_PAGE => search_page(config, page, utag_data),
        SHOWROOM_PAGE => {
            for (attribute, key) in SHOWROOM_ATTRIBUTES {
                if let Some(value) = page.data_attributes.get(attribute).filter(|value| !value.is_empty()) {
                    set_str(utag_data, key, value.as_str());
                }
            }
        }
        _ => {}
    }

    let Some(blog) = page.blog.as_ref() else {
        return;
    };
    match config.page_sub_type.as_str() {
        BLOG_POST => blog_post(blog, utag_data),
        BLOG_LIST => blog_list(blog, utag_data),
        _ => {}
    }
}

fn search_page(config: &TealiumConfig, page: &PageSnapshot, utag_data: &mut EventPayload) {
    utag_data.extend(product_list_arrays(config, &page.list_datasources));

    if let Some(header) = page.seo_header.as_ref() {
        header_banner(header, utag_data);
    }
    if let Some(footer) = page.seo_footer.as_ref() {
        footer_banner(footer, utag_data);
    }

    if let Some(label) = page.search_results_count.as_deref() {
        let tokens: Vec<&str> = label.split(' ').collect();
        if let Some(count) = tokens.len().checked_sub(2).map(|index| tokens[index]) {
            set_str(utag_data, "search_result_count", count);
        }
    }

    utag_data.insert(
        "did_active".into(),
        Value::from(u8::from(page.features.promotion_links > 0)),
    );
}

fn header_banner(banner: &SeoBanner, utag_data: &mut EventPayload) {
    let buttons: Vec<Value> = header_button_regex()
        .find_iter(&banner.html)
        .map(|found| Value::String(found.as_str().to_string()))
        .collect();
    if !buttons.is_empty() {
        utag_data.insert("product_list_header_buttons_uris".into(), Value::Array(buttons));
    }
    if !banner.paragraphs.is_empty() {
        let total: usize = banner.paragraphs.iter().map(|text| char_count(text.trim())).sum();
        utag_data.insert("product_list_header_p_char_counts".into(), Value::from(total));
    }
    utag_data.insert(
        "product_list_header_img_count".into(),
        Value::from(banner.image_count),
    );
}

fn footer_banner(banner: &SeoBanner, utag_data: &mut EventPayload) {
    if !banner.paragraphs.is_empty() {
        utag_data.insert(
            "product_list_footer_p_char_counts".into(),
            trimmed_counts(&banner.paragraphs),
        );
    }
    utag_data.insert(
        "product_list_footer_img_count".into(),
        Value::from(banner.image_count),
    );
    for (headings, prefix) in [(&banner.h2, "product_list_footer_h2"), (&banner.h3, "product_list_footer_h3")] {
        if headings.is_empty() {
            continue;
        }
        let counts = headings
            .iter()
            .map(|text| Value::String(char_count(text).to_string()))
            .collect();
        let strings = headings.iter().cloned().map(Value::String).collect();
        utag_data.insert(format!("{prefix}_char_counts"), Value::Array(counts));
        utag_data.insert(format!("{prefix}_strings"), Value::Array(strings));
    }
}

fn blog_post(blog: &BlogSnapshot, utag_data: &mut EventPayload) {
    for (text, key) in [
        (&blog.author, "blog_article_author"),
        (&blog.category, "blog_article_category"),
    ] {
        let text = text.trim();
        if !text.is_empty() {
            set_str(utag_data, key, text);
        }
    }
    if let Some(date) = format_us_date(blog.date.trim()) {
        set_str(utag_data, "blog_article_date", date);
    }

    if !blog.h2.is_empty() {
        let counts = blog
            .h2
            .iter()
            .map(|text| Value::String(char_count(text).to_string()))
            .collect();
        utag_data.insert("blog_article_h2_char_counts".into(), Value::Array(counts));
        utag_data.insert("blog_article_h2_strings".into(), trimmed_strings(&blog.h2));
    }
    if !blog.paragraphs.is_empty() {
        utag_data.insert(
            "blog_article_p_char_counts".into(),
            trimmed_counts(&blog.paragraphs),
        );
    }
    if !blog.tags.is_empty() {
        utag_data.insert("blog_article_tags".into(), trimmed_strings(&blog.tags));
    }
}

fn blog_list(blog: &BlogSnapshot, utag_data: &mut EventPayload) {
    if !blog.list_categories.is_empty() {
        utag_data.insert(
            "blog_list_articles_category".into(),
            trimmed_strings(&blog.list_categories),
        );
    }
    if !blog.list_dates.is_empty() {
        let dates = blog
            .list_dates
            .iter()
            .filter_map(|date| format_us_date(date.trim()))
            .map(Value::String)
            .collect();
        utag_data.insert("blog_list_articles_date".into(), Value::Array(dates));
    }
    if !blog.list_titles.is_empty() {
        let counts = blog
            .list_titles
            .iter()
            .map(|title| Value::String(char_count(title.trim()).to_string()))
            .collect();
        utag_data.insert(
            "blog_list_articles_titles_char_counts".into(),
            Value::Array(counts),
        );
        utag_data.insert(
            "blog_list_articles_titles_strings".into(),
            trimmed_strings(&blog.list_titles),
        );
    }
}

fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Lengths of the non-blank entries after trimming, as strings.
fn trimmed_counts(texts: &[String]) -> Value {
    Value::Array(
        texts
            .iter()
            .map(|text| char_count(text.trim()))
            .filter(|count| *count > 0)
            .map(|count| Value::String(count.to_string()))
            .collect(),
    )
}

fn trimmed_strings(texts: &[String]) -> Value {
    Value::Array(
        texts
            .iter()
            .map(|text| Value::String(text.trim().to_string()))
            .collect(),
    )
}
