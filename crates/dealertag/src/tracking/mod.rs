use std::collections::HashSet;

use crate::models::FormIdentity;

/// Membership registry gating form events to once per page per identity.
///
/// Three independent sets keyed by [`FormIdentity::key`]. Entries are only
/// removed by [`DeduplicationTracker::reset`] or [`DeduplicationTracker::reset_all`].
#[derive(Debug, Clone, Default)]
pub struct DeduplicationTracker {
    loaded: HashSet<String>,
    interacted: HashSet<String>,
    submitted: HashSet<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerCounts {
    pub loaded: usize,
    pub interacted: usize,
    pub submitted: usize,
}

impl DeduplicationTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn has_loaded(&self, identity: &FormIdentity) -> bool {
        self.loaded.contains(&identity.key())
    }

    /// Returns `false` when the identity was already marked.
    pub fn mark_loaded(&mut self, identity: &FormIdentity) -> bool {
        self.loaded.insert(identity.key())
    }

    #[must_use]
    pub fn has_interacted(&self, identity: &FormIdentity) -> bool {
        self.interacted.contains(&identity.key())
    }

    pub fn mark_interacted(&mut self, identity: &FormIdentity) -> bool {
        self.interacted.insert(identity.key())
    }

    #[must_use]
    pub fn has_submitted(&self, identity: &FormIdentity) -> bool {
        self.submitted.contains(&identity.key())
    }

    pub fn mark_submitted(&mut self, identity: &FormIdentity) -> bool {
        self.submitted.insert(identity.key())
    }

    /// Forgets interaction and submission for one identity. Load stays marked.
    pub fn reset(&mut self, identity: &FormIdentity) {
        let key = identity.key();
        self.interacted.remove(&key);
        self.submitted.remove(&key);
    }

    pub fn reset_all(&mut self) {
        self.loaded.clear();
        self.interacted.clear();
        self.submitted.clear();
    }

    #[must_use]
    pub fn counts(&self) -> TrackerCounts {
        TrackerCounts {
            loaded: self.loaded.len(),
            interacted: self.interacted.len(),
            submitted: self.submitted.len(),
        }
    }
}
