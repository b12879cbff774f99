use serde::{Deserialize, Serialize};

use super::payload::{EventPayload, set_str, str_field};

/// Composite identity of a lead form: `(form_name, form_type, form_id)`.
///
/// Every dedup set is keyed by [`FormIdentity::key`]. Identities are rebuilt
/// from the DOM on every extraction and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormIdentity {
    pub form_name: String,
    pub form_type: String,
    pub form_id: String,
}

impl FormIdentity {
    pub fn new(
        form_name: impl Into<String>,
        form_type: impl Into<String>,
        form_id: impl Into<String>,
    ) -> Self {
        Self {
            form_name: form_name.into(),
            form_type: form_type.into(),
            form_id: form_id.into(),
        }
    }

    /// Reads an identity out of submitted form data, accepting both the
    /// snake_case keys and the camelCase keys sibling components emit.
    #[must_use]
    pub fn from_payload(data: &EventPayload) -> Self {
        let pick = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| str_field(data, key))
                .unwrap_or_default()
        };
        Self {
            form_name: pick(&["form_name", "formName"]),
            form_type: pick(&["form_type", "formType", "lead_type", "leadType"]),
            form_id: pick(&["form_id", "formId"]),
        }
    }

    #[must_use]
    pub fn key(&self) -> String {
        format!("{}_{}_{}", self.form_name, self.form_type, self.form_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.form_name.is_empty() && self.form_type.is_empty() && self.form_id.is_empty()
    }

    /// A name plus at least one of type or id.
    #[must_use]
    pub fn is_trackable(&self) -> bool {
        !self.form_name.is_empty() && (!self.form_type.is_empty() || !self.form_id.is_empty())
    }

    /// All three parts present; required by the modal-driven load paths.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.form_name.is_empty() && !self.form_type.is_empty() && !self.form_id.is_empty()
    }

    #[must_use]
    pub fn to_payload(&self) -> EventPayload {
        let mut payload = EventPayload::new();
        set_str(&mut payload, "form_name", self.form_name.as_str());
        set_str(&mut payload, "form_type", self.form_type.as_str());
        set_str(&mut payload, "form_id", self.form_id.as_str());
        payload
    }
}
