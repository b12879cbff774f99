use crate::models::EventPayload;

/// Splits a `?a=1&b=2` query string into string fields.
///
/// Missing values read as empty strings. Components that fail to decode are
/// kept raw.
#[must_use]
pub fn query_string_to_payload(search: &str) -> EventPayload {
    let mut out = EventPayload::new();
    let query = search.strip_prefix('?').unwrap_or(search);

    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key.is_empty() {
            continue;
        }
        out.insert(decode(key), decode(value).into());
    }
    out
}

fn decode(component: &str) -> String {
    urlencoding::decode(component)
        .map(|text| text.into_owned())
        .unwrap_or_else(|_| component.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::query_string_to_payload;

    #[test]
    fn decodes_pairs_and_defaults_missing_values() {
        let payload = query_string_to_payload("?productId=12&name=Red%20Boat&flag");

        assert_eq!(
            serde_json::Value::Object(payload),
            json!({"productId": "12", "name": "Red Boat", "flag": ""})
        );
    }

    #[test]
    fn empty_search_yields_empty_payload() {
        assert!(query_string_to_payload("").is_empty());
        assert!(query_string_to_payload("?").is_empty());
    }
}
