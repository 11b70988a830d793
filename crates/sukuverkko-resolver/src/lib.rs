//! Family network resolver: builds a `FamilyNetwork` from one freshly
//! extracted `Family` by resolving its as-child, as-parent, and
//! spouse-as-child neighbors, one hop only.

pub mod matcher;
mod resolve;
mod stats;

pub use resolve::{resolve_family_network, BirthDateResolver, ResolverContext};
pub use stats::ResolutionStats;
