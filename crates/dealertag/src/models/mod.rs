pub mod context;
pub mod events;
pub mod form;
pub mod page;
pub mod payload;

pub use context::{AmbientContext, SharedContext};
pub use events::{EcommerceAction, FormField, InteractionKind, PageEvent};
pub use form::FormIdentity;
pub use page::{BlogSnapshot, FormContainer, PageFeatures, PageLocation, PageSnapshot, SeoBanner};
pub use payload::{
    EventPayload, TEALIUM_EVENT, is_truthy, merged, number_field, set_str, str_field,
};
