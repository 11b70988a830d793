//! Structured extractor adapter: wraps an external, opaque structured
//! extraction service, validates and normalizes its response into a
//! [`sukuverkko_core::Family`].

mod http;
mod mock;
mod normalize;

pub use http::HttpStructuredExtractor;
pub use mock::MockStructuredExtractor;
pub use normalize::normalize_response;

use async_trait::async_trait;
use sukuverkko_core::FamilyId;
use thiserror::Error;

/// Failure modes specific to the extraction call itself (before
/// normalization/validation, which raises `SukuverkkoError` variants
/// instead).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("extractor not configured")]
    NotConfigured,
    #[error("extraction request timed out")]
    Timeout,
    #[error("extraction transport error: {0}")]
    Transport(String),
}

/// Delegates the structured-extraction step to an external collaborator.
/// Implementations are assumed unreliable: rate limits, transient
/// failures, and occasional malformed responses are expected, and it is
/// this adapter's caller's job (via [`normalize_response`]) to validate
/// and fail cleanly on bad output.
#[async_trait]
pub trait StructuredExtractor: Send + Sync {
    /// Submit `text` (the family's source segment) for structured
    /// extraction and return the raw response text.
    async fn extract(&self, family_id: &FamilyId, text: &str) -> Result<String, ExtractError>;
}
