//! Sukuverkko core domain types, ids, and shared error types.
//!
//! This crate contains the foundational types used across every other
//! Sukuverkko crate. It has no internal dependencies on other workspace
//! crates.

pub mod error;
pub mod ids;
pub mod lookup;
pub mod types;

pub use error::SukuverkkoError;
pub use ids::FamilyId;
pub use types::{Couple, Family, FamilyNetwork, Person};
