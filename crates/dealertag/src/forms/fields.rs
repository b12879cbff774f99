use crate::models::{EventPayload, FormContainer, FormField, set_str};

/// Submitted field names with a canonical output key. Anything else is
/// reported under its own name.
const FIELD_MAPPING: [(&str, &str); 13] = [
    ("firstName", "customer_first_name"),
    ("lastName", "customer_last_name"),
    ("email", "customer_email"),
    ("phone", "customer_phone"),
    ("address", "customer_address"),
    ("zipCode", "customer_zip_code"),
    ("city", "customer_city"),
    ("state", "customer_state"),
    ("message", "customer_message"),
    ("interest", "customer_interest"),
    ("tradeInMake", "trade_in_make"),
    ("tradeInModel", "trade_in_model"),
    ("tradeInYear", "trade_in_year"),
];

#[must_use]
pub fn map_field_name(name: &str) -> &str {
    FIELD_MAPPING
        .iter()
        .find(|(from, _)| *from == name)
        .map_or(name, |(_, to)| to)
}

/// Trimmed field values under their canonical keys; blank values are dropped.
#[must_use]
pub fn extract_field_data(fields: &[FormField]) -> EventPayload {
    let mut data = EventPayload::new();
    for field in fields {
        let value = field.value.trim();
        if value.is_empty() {
            continue;
        }
        set_str(&mut data, map_field_name(&field.name), value);
    }
    data
}

/// Selects on dedicated lead forms that report their choice on change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecializedSelect {
    ServiceType,
    CreditScore,
    TradeVehicleType,
}

impl SpecializedSelect {
    const ALL: [Self; 3] = [Self::ServiceType, Self::CreditScore, Self::TradeVehicleType];

    const fn component_fragment(self) -> &'static str {
        match self {
            Self::ServiceType => "ServiceForm",
            Self::CreditScore => "FinancingForm",
            Self::TradeVehicleType => "TradeInForm",
        }
    }

    const fn select_fragment(self) -> &'static str {
        match self {
            Self::ServiceType => "serviceType",
            Self::CreditScore => "creditScore",
            Self::TradeVehicleType => "vehicleType",
        }
    }

    pub const fn event_name(self) -> &'static str {
        match self {
            Self::ServiceType => "service_type_selected",
            Self::CreditScore => "credit_score_selected",
            Self::TradeVehicleType => "trade_vehicle_type_selected",
        }
    }

    const fn value_key(self) -> &'static str {
        match self {
            Self::ServiceType => "service_type",
            Self::CreditScore => "credit_score",
            Self::TradeVehicleType => "vehicle_type",
        }
    }

    const fn form_type(self) -> &'static str {
        match self {
            Self::ServiceType => "service",
            Self::CreditScore => "financing",
            Self::TradeVehicleType => "trade_in",
        }
    }

    /// Matches `.component[class*="<Form>"] select[name*="<field>"]`.
    #[must_use]
    pub fn detect(container: &FormContainer, select_name: &str) -> Option<Self> {
        let is_component = container
            .classes
            .split_whitespace()
            .any(|class| class == "component");
        if !is_component {
            return None;
        }
        Self::ALL.into_iter().find(|select| {
            container.classes.contains(select.component_fragment())
                && select_name.contains(select.select_fragment())
        })
    }

    #[must_use]
    pub fn payload(self, value: &str) -> EventPayload {
        let mut data = EventPayload::new();
        set_str(&mut data, self.value_key(), value);
        set_str(&mut data, "form_type", self.form_type());
        data
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{SpecializedSelect, extract_field_data, map_field_name};
    use crate::models::{FormContainer, FormField};

    fn field(name: &str, value: &str) -> FormField {
        FormField {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn known_fields_map_to_customer_keys() {
        assert_eq!(map_field_name("zipCode"), "customer_zip_code");
        assert_eq!(map_field_name("tradeInYear"), "trade_in_year");
        assert_eq!(map_field_name("stockNumber"), "stockNumber");
    }

    #[test]
    fn blank_values_are_dropped_and_others_trimmed() {
        let data = extract_field_data(&[
            field("firstName", "  Ada "),
            field("lastName", "   "),
            field("comments", "call me"),
        ]);

        assert_eq!(
            serde_json::Value::Object(data),
            json!({"customer_first_name": "Ada", "comments": "call me"})
        );
    }

    #[test]
    fn specialized_selects_need_matching_component_and_name() {
        let service = FormContainer {
            classes: "component ServiceForm_12 LeadForm_x".to_string(),
            ..FormContainer::default()
        };

        assert_eq!(
            SpecializedSelect::detect(&service, "form.serviceType"),
            Some(SpecializedSelect::ServiceType)
        );
        assert_eq!(SpecializedSelect::detect(&service, "creditScore"), None);

        let payload = SpecializedSelect::ServiceType.payload("Oil change");
        assert_eq!(payload["service_type"], "Oil change");
        assert_eq!(payload["form_type"], "service");
    }
}
