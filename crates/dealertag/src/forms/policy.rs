//! Which lead forms the static scan reports, and how explicitly loaded
//! forms are labelled.
//!
//! The table is site policy carried as-is.

use crate::models::FormContainer;

/// Enclosing component class fragments whose forms are never auto-loaded,
/// with the `form_context` label used when one is loaded explicitly.
pub const EXCLUDED_CONTEXTS: [(&str, &str); 5] = [
    ("Staff_", "staff"),
    ("OfferedServices_", "offered_services"),
    ("ShowcaseRoot_", "showcase"),
    ("VDP-Unit-Detail_", "vdp_unit_detail"),
    ("SearchRoot_", "search"),
];

pub const CANT_FIND_FORM_ID: &str = "1461";
pub const DESKTOP_MIN_WIDTH: u32 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// Inside one of [`EXCLUDED_CONTEXTS`].
    Context(&'static str),
    /// The "Can't find what you are looking for" form on a desktop viewport.
    CantFindOnDesktop,
}

impl Exclusion {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Context(context) => context,
            Self::CantFindOnDesktop => "cant_find_desktop",
        }
    }
}

#[must_use]
pub fn exclusion(container: &FormContainer, screen_width: u32) -> Option<Exclusion> {
    if let Some((_, context)) = EXCLUDED_CONTEXTS
        .iter()
        .find(|(fragment, _)| container.within(fragment))
    {
        return Some(Exclusion::Context(context));
    }
    if container.form_id.as_deref() == Some(CANT_FIND_FORM_ID) && screen_width >= DESKTOP_MIN_WIDTH {
        return Some(Exclusion::CantFindOnDesktop);
    }
    None
}

/// Label for an explicitly loaded form. When several contexts enclose the
/// form the last entry of the table wins.
#[must_use]
pub fn form_context(container: &FormContainer) -> Option<&'static str> {
    EXCLUDED_CONTEXTS
        .iter()
        .rev()
        .find(|(fragment, _)| container.within(fragment))
        .map(|(_, context)| *context)
}
