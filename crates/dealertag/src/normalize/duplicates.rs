use std::collections::HashMap;

use crate::models::EventPayload;

/// Keys collide when they are equal after removing every `_` and lowercasing.
#[must_use]
pub fn collision_identity(key: &str) -> String {
    key.chars()
        .filter(|ch| *ch != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Keeps one key per collision group and drops the rest, values included.
///
/// Within a group a leading-underscore key beats one without; otherwise the
/// key with strictly more underscores wins; otherwise the first key seen
/// stays. Survivors keep their original position. Losers are discarded even
/// when the winner's value is empty.
#[must_use]
pub fn resolve_duplicates(payload: EventPayload) -> EventPayload {
    let mut winners: HashMap<String, String> = HashMap::new();
    for key in payload.keys() {
        let identity = collision_identity(key);
        match winners.get_mut(&identity) {
            Some(incumbent) => {
                if outranks(key, incumbent) {
                    *incumbent = key.clone();
                }
            }
            None => {
                winners.insert(identity, key.clone());
            }
        }
    }

    payload
        .into_iter()
        .filter(|(key, _)| {
            winners
                .get(&collision_identity(key))
                .is_some_and(|winner| winner == key)
        })
        .collect()
}

fn outranks(candidate: &str, incumbent: &str) -> bool {
    let candidate_leading = candidate.starts_with('_');
    let incumbent_leading = incumbent.starts_with('_');
    if candidate_leading != incumbent_leading {
        return candidate_leading;
    }
    underscore_count(candidate) > underscore_count(incumbent)
}

fn underscore_count(key: &str) -> usize {
    key.matches('_').count()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{collision_identity, resolve_duplicates};
    use crate::models::EventPayload;

    fn payload(value: serde_json::Value) -> EventPayload {
        value.as_object().cloned().expect("fixture must be an object")
    }

    #[test]
    fn identity_ignores_case_and_underscores() {
        assert_eq!(collision_identity("_Foo"), "foo");
        assert_eq!(collision_identity("f_o_o"), "foo");
        assert_eq!(collision_identity("product__id"), "productid");
    }

    #[test]
    fn leading_underscore_beats_everything_else() {
        let out = resolve_duplicates(payload(json!({"foo": 2, "f_o_o": 3, "_foo": 1})));
        assert_eq!(out, payload(json!({"_foo": 1})));
    }

    #[test]
    fn equal_rank_keeps_first_seen() {
        let out = resolve_duplicates(payload(json!({"ab_c": 1, "a_bc": 2})));
        assert_eq!(out, payload(json!({"ab_c": 1})));
    }

    #[test]
    fn empty_winner_still_discards_the_loser() {
        let out = resolve_duplicates(payload(json!({"formtype": "quote", "form_type": ""})));
        assert_eq!(out, payload(json!({"form_type": ""})));
    }

    #[test]
    fn survivors_keep_original_positions() {
        let out = resolve_duplicates(payload(json!({
            "page_make": "x",
            "productid": 1,
            "site_id": "9",
            "product_id": 2
        })));

        assert_eq!(
            out.keys().collect::<Vec<_>>(),
            ["page_make", "site_id", "product_id"]
        );
    }
}
