use serde_json::{Map, Value};

/// Key/value event data handed to the vendor SDK.
///
/// Insertion order is preserved; the duplicate-key resolver relies on it for
/// its first-seen tie break.
pub type EventPayload = Map<String, Value>;

pub const TEALIUM_EVENT: &str = "tealium_event";

/// Shallow merge of `layers`, later layers winning on key conflicts.
#[must_use]
pub fn merged(layers: &[&EventPayload]) -> EventPayload {
    let mut out = EventPayload::new();
    for layer in layers {
        for (key, value) in layer.iter() {
            out.insert(key.clone(), value.clone());
        }
    }
    out
}

pub fn set_str(payload: &mut EventPayload, key: &str, value: impl Into<String>) {
    payload.insert(key.to_string(), Value::String(value.into()));
}

/// Reads a field as text, accepting numbers and booleans the way the page
/// scripts coerce them. Empty strings read as absent.
#[must_use]
pub fn str_field(payload: &EventPayload, key: &str) -> Option<String> {
    match payload.get(key)? {
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Script truthiness: absent, null, `false`, `0` and `""` are false.
#[must_use]
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

/// Numeric reading of a field, accepting numeric strings.
#[must_use]
pub fn number_field(payload: &EventPayload, key: &str) -> Option<f64> {
    match payload.get(key)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{EventPayload, is_truthy, merged, number_field, str_field};

    fn payload(value: serde_json::Value) -> EventPayload {
        value.as_object().cloned().expect("fixture must be an object")
    }

    #[test]
    fn later_layers_win_and_keep_first_position() {
        let base = payload(json!({"a": 1, "b": 2}));
        let custom = payload(json!({"b": 3, "c": 4}));

        let out = merged(&[&base, &custom]);

        assert_eq!(out.keys().collect::<Vec<_>>(), ["a", "b", "c"]);
        assert_eq!(out["b"], json!(3));
    }

    #[test]
    fn str_field_coerces_numbers_and_skips_empty() {
        let data = payload(json!({"id": 1461, "name": "", "flag": true}));

        assert_eq!(str_field(&data, "id").as_deref(), Some("1461"));
        assert_eq!(str_field(&data, "name"), None);
        assert_eq!(str_field(&data, "flag").as_deref(), Some("true"));
        assert_eq!(str_field(&data, "missing"), None);
    }

    #[test]
    fn truthiness_follows_script_rules() {
        let data = payload(json!({"zero": 0, "empty": "", "no": false, "yes": "False", "list": []}));

        assert!(!is_truthy(data.get("zero")));
        assert!(!is_truthy(data.get("empty")));
        assert!(!is_truthy(data.get("no")));
        assert!(!is_truthy(data.get("missing")));
        assert!(is_truthy(data.get("yes")));
        assert!(is_truthy(data.get("list")));
    }

    #[test]
    fn number_field_reads_numeric_strings() {
        let data = payload(json!({"year": "2021", "count": 3, "name": "boat"}));

        assert_eq!(number_field(&data, "year"), Some(2021.0));
        assert_eq!(number_field(&data, "count"), Some(3.0));
        assert_eq!(number_field(&data, "name"), None);
    }
}
