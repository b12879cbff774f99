//! Failure taxonomy for the tracking pipeline.
//!
//! None of these are fatal to the page. Callers log them and treat the
//! affected data point or event as skipped.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackingError {
    /// An embedded JSON datasource or stored record could not be parsed.
    #[error("malformed data in `{source_name}`: {reason}")]
    MalformedData { source_name: String, reason: String },

    /// The vendor SDK or a sibling collaborator is not available yet.
    #[error("missing dependency: {0}")]
    MissingDependency(String),

    /// An expected element or attribute was not present in the page.
    #[error("missing DOM target: {0}")]
    MissingDomTarget(String),

    /// The vendor SDK rejected a call.
    #[error("vendor SDK call `{call}` failed: {reason}")]
    Sdk { call: &'static str, reason: String },

    /// Browser storage refused a write (quota, privacy mode).
    #[error("storage write failed for `{key}`: {reason}")]
    Storage { key: String, reason: String },
}

impl TrackingError {
    pub fn malformed(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::MalformedData {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TrackingError;

    #[test]
    fn malformed_data_names_the_source() {
        let err = TrackingError::malformed("unit-analytics-data", "expected value at line 1");
        assert!(err.to_string().contains("unit-analytics-data"));
        assert!(err.to_string().contains("expected value"));
    }

    #[test]
    fn sdk_error_names_the_call() {
        let err = TrackingError::Sdk {
            call: "link",
            reason: "beacon rejected".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "vendor SDK call `link` failed: beacon rejected"
        );
    }
}
