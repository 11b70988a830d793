//! Sukuverkko domain value types.

mod family;
mod network;
mod person;

pub use family::{Couple, Family};
pub use network::{FamilyNetwork, KeyedFamilyMap};
pub use person::{Person, UNKNOWN_PLACEHOLDER_NAME};
