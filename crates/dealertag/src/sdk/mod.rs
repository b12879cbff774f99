//! Seam to the vendor tag-management SDK (`utag.view/link/track`).
//!
//! The SDK is loaded asynchronously by the page, so callers hold an
//! [`SdkHandle`] that may still be empty when they fire.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use crate::error::TrackingError;
use crate::models::EventPayload;

const SDK_NAME: &str = "utag";

/// Completion hook for `link`, typically used to defer a redirect until the
/// beacon is queued.
pub type LinkCallback = Box<dyn FnOnce()>;

pub trait TagSdk {
    fn view(&self, payload: &EventPayload) -> Result<(), TrackingError>;

    fn link(
        &self,
        payload: &EventPayload,
        callback: Option<LinkCallback>,
    ) -> Result<(), TrackingError>;

    fn track(&self, event_name: &str, payload: &EventPayload) -> Result<(), TrackingError>;
}

/// Late-bound slot for the vendor SDK; clones share the slot.
#[derive(Clone, Default)]
pub struct SdkHandle {
    slot: Rc<RefCell<Option<Rc<dyn TagSdk>>>>,
}

impl SdkHandle {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_sdk(sdk: Rc<dyn TagSdk>) -> Self {
        let handle = Self::default();
        handle.install(sdk);
        handle
    }

    pub fn install(&self, sdk: Rc<dyn TagSdk>) {
        *self.slot.borrow_mut() = Some(sdk);
    }

    #[must_use]
    pub fn current(&self) -> Option<Rc<dyn TagSdk>> {
        self.slot.borrow().clone()
    }

    /// The installed SDK, or [`TrackingError::MissingDependency`] while the
    /// page is still loading it.
    pub fn require(&self) -> Result<Rc<dyn TagSdk>, TrackingError> {
        self.current()
            .ok_or_else(|| TrackingError::MissingDependency(SDK_NAME.to_string()))
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.slot.borrow().is_some()
    }
}

impl std::fmt::Debug for SdkHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdkHandle")
            .field("ready", &self.is_ready())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum SdkCall {
    View {
        payload: EventPayload,
    },
    Link {
        payload: EventPayload,
        with_callback: bool,
    },
    Track {
        event_name: String,
        payload: EventPayload,
    },
}

impl SdkCall {
    #[must_use]
    pub fn payload(&self) -> &EventPayload {
        match self {
            Self::View { payload } | Self::Link { payload, .. } | Self::Track { payload, .. } => {
                payload
            }
        }
    }

    #[must_use]
    pub fn tealium_event(&self) -> Option<&str> {
        self.payload()
            .get(crate::models::TEALIUM_EVENT)
            .and_then(serde_json::Value::as_str)
    }
}

/// In-process SDK that records every call; callbacks run immediately.
///
/// Used by the replay command and by tests.
#[derive(Debug, Default)]
pub struct RecordingSdk {
    calls: RefCell<Vec<SdkCall>>,
    fail_with: RefCell<Option<String>>,
}

impl RecordingSdk {
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Makes every subsequent call fail with `reason` without recording it.
    pub fn fail_with(&self, reason: impl Into<String>) {
        *self.fail_with.borrow_mut() = Some(reason.into());
    }

    #[must_use]
    pub fn calls(&self) -> Vec<SdkCall> {
        self.calls.borrow().clone()
    }

    #[must_use]
    pub fn events_named(&self, tealium_event: &str) -> Vec<SdkCall> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.tealium_event() == Some(tealium_event))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn view_count(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, SdkCall::View { .. }))
            .count()
    }

    fn record(&self, call: &'static str, entry: SdkCall) -> Result<(), TrackingError> {
        if let Some(reason) = self.fail_with.borrow().as_ref() {
            return Err(TrackingError::Sdk {
                call,
                reason: reason.clone(),
            });
        }
        self.calls.borrow_mut().push(entry);
        Ok(())
    }
}

impl TagSdk for RecordingSdk {
    fn view(&self, payload: &EventPayload) -> Result<(), TrackingError> {
        self.record(
            "view",
            SdkCall::View {
                payload: payload.clone(),
            },
        )
    }

    fn link(
        &self,
        payload: &EventPayload,
        callback: Option<LinkCallback>,
    ) -> Result<(), TrackingError> {
        self.record(
            "link",
            SdkCall::Link {
                payload: payload.clone(),
                with_callback: callback.is_some(),
            },
        )?;
        if let Some(callback) = callback {
            callback();
        }
        Ok(())
    }

    fn track(&self, event_name: &str, payload: &EventPayload) -> Result<(), TrackingError> {
        self.record(
            "track",
            SdkCall::Track {
                event_name: event_name.to_string(),
                payload: payload.clone(),
            },
        )
    }
}
