//! Single choke point for every vendor SDK call.

use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{EventPayload, TEALIUM_EVENT, merged};
use crate::normalize::clean_payload;
use crate::sdk::{LinkCallback, SdkHandle};
use crate::storage::PendingClickBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent,
    /// A buffered promotion click owns this page view.
    Suppressed,
    SdkUnavailable,
    SdkFailed,
}

impl DispatchOutcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Suppressed => "suppressed",
            Self::SdkUnavailable => "sdk_unavailable",
            Self::SdkFailed => "sdk_failed",
        }
    }

    #[must_use]
    pub const fn is_sent(self) -> bool {
        matches!(self, Self::Sent)
    }
}

/// Merges caller data with ambient data, cleans it and forwards it to the
/// SDK. Never panics or propagates: a missing or failing SDK degrades to a
/// logged outcome.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    sdk: SdkHandle,
    pending: PendingClickBuffer,
}

impl EventDispatcher {
    pub fn new(sdk: SdkHandle, pending: PendingClickBuffer) -> Self {
        Self { sdk, pending }
    }

    #[must_use]
    pub fn sdk(&self) -> &SdkHandle {
        &self.sdk
    }

    #[must_use]
    pub fn pending(&self) -> &PendingClickBuffer {
        &self.pending
    }

    /// Page view. Suppressed entirely while a promotion click is pending.
    pub fn view(&self, ambient: &EventPayload, custom: &EventPayload) -> DispatchOutcome {
        if self.pending.is_pending() {
            debug!("page view suppressed by pending promotion click");
            return DispatchOutcome::Suppressed;
        }

        let payload = clean_payload(merged(&[ambient, custom]));
        let sdk = match self.sdk.require() {
            Ok(sdk) => sdk,
            Err(err) => {
                warn!(error = %err, "could not trigger utag.view");
                return DispatchOutcome::SdkUnavailable;
            }
        };
        match sdk.view(&payload) {
            Ok(()) => DispatchOutcome::Sent,
            Err(err) => {
                warn!(error = %err, "utag.view failed");
                DispatchOutcome::SdkFailed
            }
        }
    }

    /// Interaction event. Ambient data is merged in only while a promotion
    /// click is pending; otherwise only `custom` and the event type are sent.
    ///
    /// When the SDK is missing the callback is run directly, so a navigation
    /// waiting on it still happens.
    pub fn link(
        &self,
        event_type: &str,
        ambient: &EventPayload,
        custom: &EventPayload,
        callback: Option<LinkCallback>,
    ) -> DispatchOutcome {
        let mut event_type_layer = EventPayload::new();
        event_type_layer.insert(
            TEALIUM_EVENT.to_string(),
            Value::String(event_type.to_string()),
        );

        let raw = if self.pending.is_pending() {
            merged(&[ambient, custom, &event_type_layer])
        } else {
            merged(&[custom, &event_type_layer])
        };
        let payload = clean_payload(raw);

        let sdk = match self.sdk.require() {
            Ok(sdk) => sdk,
            Err(err) => {
                warn!(event_type, error = %err, "could not trigger utag.link");
                if let Some(callback) = callback {
                    callback();
                }
                return DispatchOutcome::SdkUnavailable;
            }
        };

        // The callback belongs to the SDK from here on, even on error.
        match sdk.link(&payload, callback) {
            Ok(()) => {
                debug!(event_type, "utag.link sent");
                DispatchOutcome::Sent
            }
            Err(err) => {
                warn!(event_type, error = %err, "utag.link failed");
                DispatchOutcome::SdkFailed
            }
        }
    }

    /// Generic `utag.track`; silently skipped when the SDK is missing.
    pub fn track(&self, event_name: &str, data: &EventPayload) -> DispatchOutcome {
        let payload = clean_payload(data.clone());
        let sdk = match self.sdk.require() {
            Ok(sdk) => sdk,
            Err(err) => {
                debug!(event_name, error = %err, "utag.track skipped");
                return DispatchOutcome::SdkUnavailable;
            }
        };
        match sdk.track(event_name, &payload) {
            Ok(()) => DispatchOutcome::Sent,
            Err(err) => {
                warn!(event_name, error = %err, "utag.track failed");
                DispatchOutcome::SdkFailed
            }
        }
    }
}
