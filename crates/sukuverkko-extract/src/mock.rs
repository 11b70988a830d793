//! A canned [`StructuredExtractor`] for tests that need deterministic
//! responses and call-count visibility (e.g. asserting a cache only
//! invokes the extractor once per family).

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use sukuverkko_core::FamilyId;

use crate::{ExtractError, StructuredExtractor};

/// Returns a fixed response per family id, or [`ExtractError::NotConfigured`]
/// for ids with no canned response. Tracks the total number of calls made,
/// and the per-family call count, for assertions like "exactly one
/// extraction per family regardless of concurrent lookups".
#[derive(Debug, Default)]
pub struct MockStructuredExtractor {
    responses: HashMap<String, String>,
    call_counts: Mutex<HashMap<String, usize>>,
    total_calls: AtomicUsize,
}

impl MockStructuredExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the canned response for `family_id`.
    pub fn with_response(mut self, family_id: impl Into<String>, response: impl Into<String>) -> Self {
        self.responses.insert(family_id.into(), response.into());
        self
    }

    /// Total number of `extract` calls across all family ids.
    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }

    /// Number of `extract` calls for one family id.
    pub fn calls_for(&self, family_id: &FamilyId) -> usize {
        self.call_counts
            .lock()
            .expect("mock call-count lock poisoned")
            .get(family_id.as_str())
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl StructuredExtractor for MockStructuredExtractor {
    async fn extract(&self, family_id: &FamilyId, _text: &str) -> Result<String, ExtractError> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        *self
            .call_counts
            .lock()
            .expect("mock call-count lock poisoned")
            .entry(family_id.as_str().to_string())
            .or_insert(0) += 1;

        self.responses
            .get(family_id.as_str())
            .cloned()
            .ok_or(ExtractError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_the_registered_response() {
        let mock = MockStructuredExtractor::new().with_response("KORPI 6", "{}".to_string());
        let response = mock.extract(&FamilyId::new("KORPI 6"), "ignored").await.unwrap();
        assert_eq!(response, "{}");
    }

    #[tokio::test]
    async fn unregistered_family_is_not_configured() {
        let mock = MockStructuredExtractor::new();
        let err = mock.extract(&FamilyId::new("KORPI 6"), "ignored").await.unwrap_err();
        assert_eq!(err, ExtractError::NotConfigured);
    }

    #[tokio::test]
    async fn tracks_per_family_and_total_call_counts() {
        let mock = MockStructuredExtractor::new()
            .with_response("KORPI 6", "{}".to_string())
            .with_response("KORPI 7", "{}".to_string());
        let _ = mock.extract(&FamilyId::new("KORPI 6"), "t").await;
        let _ = mock.extract(&FamilyId::new("KORPI 6"), "t").await;
        let _ = mock.extract(&FamilyId::new("KORPI 7"), "t").await;

        assert_eq!(mock.total_calls(), 3);
        assert_eq!(mock.calls_for(&FamilyId::new("KORPI 6")), 2);
        assert_eq!(mock.calls_for(&FamilyId::new("KORPI 7")), 1);
    }
}
