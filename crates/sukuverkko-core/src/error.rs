//! Shared error types for Sukuverkko.

use thiserror::Error;

/// Top-level error type for Sukuverkko operations.
///
/// Variants correspond one-to-one with the error kinds table: each surface
/// (segmenter, extractor adapter, cache) raises one of these, and the
/// propagation policy lives with the caller, not the error type itself.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SukuverkkoError {
    /// The source text file is missing or unreadable.
    #[error("source text unavailable: {0}")]
    SourceUnavailable(String),

    /// The segmenter found no header for the requested family.
    #[error("family not found: {0}")]
    FamilyNotFound(String),

    /// No usable `StructuredExtractor` is configured.
    #[error("extractor not configured")]
    ExtractorNotConfigured,

    /// The extractor returned no usable response, or timed out.
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),

    /// The extractor's response parsed but violated the schema.
    #[error("schema invalid: {0}")]
    SchemaInvalid(String),

    /// A disk read/write problem in the cache layer. Non-fatal: the
    /// in-memory cache remains authoritative.
    #[error("cache persistence warning: {0}")]
    CachePersistenceWarning(String),
}
