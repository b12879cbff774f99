//! Canonicalization of event payloads before they reach the vendor SDK.
//!
//! `clean` runs key normalization, duplicate-key resolution, the legacy
//! `lead_type` rename and empty-value stripping, recursively. It is
//! idempotent: cleaning a cleaned payload changes nothing.

mod duplicates;
mod keys;

pub use duplicates::{collision_identity, resolve_duplicates};
pub use keys::{KEY_OVERRIDES, normalize_key};

use serde_json::Value;

use crate::models::EventPayload;

const LEGACY_LEAD_TYPE: &str = "lead_type";
const FORM_TYPE: &str = "form_type";

/// Cleans any JSON value. `None` means the value is absent after cleaning
/// (null or the empty string).
#[must_use]
pub fn clean(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(text) if text.is_empty() => None,
        Value::Array(items) => Some(Value::Array(items.into_iter().filter_map(clean).collect())),
        Value::Object(map) => Some(Value::Object(clean_payload(map))),
        scalar => Some(scalar),
    }
}

#[must_use]
pub fn clean_payload(payload: EventPayload) -> EventPayload {
    let resolved = resolve_duplicates(normalize_keys(payload));
    let renamed = rename_legacy_keys(resolved);

    renamed
        .into_iter()
        .filter_map(|(key, value)| clean(value).map(|value| (key, value)))
        .collect()
}

/// Rewrites every key with [`normalize_key`]. Keys that normalize to the same
/// string behave like repeated object assignment: the later value wins, the
/// first position is kept.
#[must_use]
pub fn normalize_keys(payload: EventPayload) -> EventPayload {
    let mut out = EventPayload::new();
    for (key, value) in payload {
        out.insert(normalize_key(&key), value);
    }
    out
}

/// `lead_type` is always removed; when it was present its value (even an
/// empty one) is copied into `form_type`.
fn rename_legacy_keys(mut payload: EventPayload) -> EventPayload {
    let Some(lead_type) = payload.shift_remove(LEGACY_LEAD_TYPE) else {
        return payload;
    };
    payload.insert(FORM_TYPE.to_string(), lead_type);

    let introduces_collision = payload
        .keys()
        .filter(|key| collision_identity(key) == collision_identity(FORM_TYPE))
        .nth(1)
        .is_some();
    if introduces_collision {
        resolve_duplicates(payload)
    } else {
        payload
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{clean, clean_payload};
    use crate::models::EventPayload;

    fn payload(value: serde_json::Value) -> EventPayload {
        value.as_object().cloned().expect("fixture must be an object")
    }

    #[test]
    fn strips_null_and_empty_but_keeps_falsy_scalars() {
        let out = clean_payload(payload(json!({"a": "", "b": null, "d": 0, "e": false})));
        assert_eq!(out, payload(json!({"d": 0, "e": false})));
    }

    #[test]
    fn arrays_drop_empty_elements_without_renaming_scalars() {
        let out = clean(json!(["1", "", null, 0, {"itemMake": "Honda", "x": ""}]))
            .expect("array should survive");
        assert_eq!(out, json!(["1", 0, {"item_make": "Honda"}]));
    }

    #[test]
    fn lead_type_moves_into_form_type() {
        let out = clean_payload(payload(json!({"lead_type": "financing", "form_type": "old"})));
        assert_eq!(out, payload(json!({"form_type": "financing"})));
    }

    #[test]
    fn rename_that_collides_is_resolved_in_the_same_pass() {
        let input = payload(json!({"formtype": "a", "lead_type": "b"}));
        let once = clean_payload(input);
        assert_eq!(once, payload(json!({"form_type": "b"})));
        assert_eq!(clean_payload(once.clone()), once);
    }
}
