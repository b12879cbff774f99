use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::warn;

use crate::error::TrackingError;

const HTML_ENTITIES: [(&str, &str); 6] = [
    ("&quot;", "\""),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&#x27;", "'"),
    ("&#x2F;", "/"),
];

/// Decodes the entities the site template escapes inside embedded JSON.
///
/// Replacements run in table order, so `&amp;quot;` decodes to `"`.
#[must_use]
pub fn decode_html_entities(raw: &str) -> String {
    HTML_ENTITIES
        .iter()
        .fold(raw.to_string(), |text, (entity, plain)| text.replace(entity, plain))
}

/// Parses an HTML-embedded JSON datasource.
pub fn safe_json_parse(source_name: &str, raw: &str) -> Result<Value, TrackingError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TrackingError::malformed(source_name, "empty datasource"));
    }

    serde_json::from_str(&decode_html_entities(trimmed)).map_err(|err| {
        warn!(source_name, error = %err, "datasource json parse failed");
        TrackingError::malformed(source_name, err)
    })
}

/// Numeric value of a display price such as `$1,234.56`; `0.0` when unparseable.
#[must_use]
pub fn parse_price(raw: &str) -> f64 {
    price_noise_regex()
        .replace_all(raw, "")
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite())
        .unwrap_or(0.0)
}

/// Same as [`parse_price`] for JSON values, which may already be numbers.
#[must_use]
pub fn parse_price_value(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
        Some(Value::String(text)) => parse_price(text),
        _ => 0.0,
    }
}

/// JSON number for a computed amount; whole values serialize without a fraction.
#[must_use]
pub fn number_value(amount: f64) -> Value {
    if amount.fract() == 0.0 && amount.abs() < 9.0e15 {
        Value::from(amount as i64)
    } else {
        Value::from(amount)
    }
}

fn price_noise_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"[$,\s]").expect("price noise regex should compile"))
}
