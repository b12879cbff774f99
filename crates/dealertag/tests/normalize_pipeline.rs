use dealertag::models::EventPayload;
use dealertag::normalize::{clean, clean_payload};
use serde_json::{Value, json};

fn payload(value: Value) -> EventPayload {
    value.as_object().cloned().expect("fixture must be an object")
}

#[test]
fn dispatched_payload_is_normalized_renamed_and_stripped() {
    let cleaned = clean_payload(payload(json!({
        "tealium_event": "form_submit",
        "siteId": "42",
        "isnewvdp": "1",
        "lead_type": "quote",
        "formType": "",
        "empty": null,
        "nested": {"unitPrice": "", "itemMake": "Honda"},
        "tags": ["", "atv"]
    })));

    insta::assert_json_snapshot!(cleaned, @r#"
    {
      "tealium_event": "form_submit",
      "site_id": "42",
      "is_new_vdp": "1",
      "form_type": "quote",
      "nested": {
        "item_make": "Honda"
      },
      "tags": [
        "atv"
      ]
    }
    "#);
}

#[test]
fn cleaning_is_idempotent() {
    let once = clean_payload(payload(json!({
        "productId": "9",
        "_Foo": 1,
        "foo": 2,
        "items": [{"itemYear": 2024, "vin": null}],
        "zero": 0,
        "off": false
    })));
    let twice = clean_payload(once.clone());

    assert_eq!(once, twice);
    assert_eq!(once["zero"], json!(0));
    assert_eq!(once["off"], json!(false));
}

#[test]
fn keys_normalizing_to_one_name_keep_the_later_value() {
    let cleaned = clean_payload(payload(json!({
        "page_make": "polaris",
        "site_id": "1",
        "pageMake": "honda"
    })));

    assert_eq!(cleaned.keys().collect::<Vec<_>>(), ["page_make", "site_id"]);
    assert_eq!(cleaned["page_make"], json!("honda"));
}

#[test]
fn colliding_keys_resolve_by_underscore_rank() {
    let cleaned = clean_payload(payload(json!({
        "foo": 2,
        "f_o_o": 3,
        "_foo": 1
    })));

    assert_eq!(cleaned.keys().collect::<Vec<_>>(), ["_foo"]);
    assert_eq!(cleaned["_foo"], json!(1));
}

#[test]
fn empty_lead_type_still_replaces_form_type() {
    let cleaned = clean_payload(payload(json!({
        "form_type": "service",
        "lead_type": ""
    })));

    assert!(!cleaned.contains_key("lead_type"));
    assert!(!cleaned.contains_key("form_type"));
}

#[test]
fn null_and_empty_string_vanish_everywhere() {
    assert_eq!(clean(Value::Null), None);
    assert_eq!(clean(json!("")), None);
    assert_eq!(clean(json!([null, "", [""]])), Some(json!([[]])));
}
