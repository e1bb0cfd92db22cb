// crates/questionnaire-precondition/tests/common/mod.rs
// ============================================================================
// Module: Precondition Test Fixtures
// Description: Shared collaborator fakes for precondition integration tests.
// Purpose: Record current-ETag lookups and return scripted values.
// ============================================================================

#![allow(dead_code, reason = "Not every test binary uses every fixture.")]

use std::collections::HashMap;
use std::sync::Mutex;

use questionnaire_precondition::CurrentEtagProvider;
use questionnaire_precondition::EtagLookupError;
use questionnaire_precondition::ResourceKind;
use questionnaire_precondition::ResourceTarget;

/// Scripted current-ETag provider that records every lookup.
#[derive(Default)]
pub struct RecordingProvider {
    etags: HashMap<ResourceKind, String>,
    fail: bool,
    lookups: Mutex<Vec<ResourceTarget>>,
}

impl RecordingProvider {
    pub fn with(kind: ResourceKind, etag: &str) -> Self {
        let mut provider = Self::default();
        provider.etags.insert(kind, etag.to_string());
        provider
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn lookups(&self) -> Vec<ResourceTarget> {
        self.lookups.lock().map(|lookups| lookups.clone()).unwrap_or_default()
    }
}

impl CurrentEtagProvider for RecordingProvider {
    fn current_etag(&self, target: &ResourceTarget) -> Result<Option<String>, EtagLookupError> {
        if let Ok(mut lookups) = self.lookups.lock() {
            lookups.push(target.clone());
        }
        if self.fail {
            return Err(EtagLookupError::Unavailable("store offline".to_string()));
        }
        Ok(self.etags.get(&target.kind).cloned())
    }
}
