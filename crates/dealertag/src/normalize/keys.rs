/// Keys without uppercase letters that still need a canonical spelling.
/// Looked up before the generic camelCase rule.
pub const KEY_OVERRIDES: &[(&str, &str)] = &[("isnewvdp", "is_new_vdp")];

/// Converts a camelCase or irregular key to snake_case.
///
/// Every ASCII uppercase letter becomes `_` plus its lowercase form, and a
/// leading `_` produced that way is dropped (`FooBar` -> `foo_bar`). Keys that
/// already start with `_` are returned unchanged.
#[must_use]
pub fn normalize_key(key: &str) -> String {
    if let Some(canonical) = override_for(key) {
        return canonical.to_string();
    }
    if key.starts_with('_') {
        return key.to_string();
    }

    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('_');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }

    match out.strip_prefix('_') {
        Some(stripped) => stripped.to_string(),
        None => out,
    }
}

fn override_for(key: &str) -> Option<&'static str> {
    KEY_OVERRIDES
        .iter()
        .find(|(irregular, _)| *irregular == key)
        .map(|(_, canonical)| *canonical)
}
