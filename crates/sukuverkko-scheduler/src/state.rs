//! Observable prefetch progress snapshot.

use sukuverkko_core::FamilyId;

/// A snapshot of prefetch progress, broadcast over a `tokio::sync::watch`
/// channel so callers read the latest state without polling a lock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefetchState {
    pub is_prefetching: bool,
    pub current_family_id: Option<FamilyId>,
    pub completed_count: u32,
    pub total_count: u32,
    pub next_family_ready: bool,
    pub next_family_id: Option<FamilyId>,
}
