//! Parish-record lookup descriptor and result envelope.
//!
//! The core defines only these boundary types; the actual HTTP call or
//! browser-driven scrape that answers a [`LookupQuery`] is an external
//! collaborator, deliberately out of scope (see spec §1/§6).

use serde::{Deserialize, Serialize};

/// The kind of event a parish-record lookup is being asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupEventKind {
    Birth,
    Death,
    Marriage,
}

/// A query descriptor the core may emit to an external parish-record
/// lookup collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupQuery {
    pub kind: LookupEventKind,
    pub primary_name: String,
    pub secondary_name: Option<String>,
    pub normalized_date: Option<String>,
}

/// The result envelope returned by the external lookup collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LookupResult {
    Found { url: String },
    NotFound,
    Error { message: String },
}
