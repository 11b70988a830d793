//! Resolution statistics returned alongside a resolved `FamilyNetwork`.

/// Per-call summary of how each cross-reference was resolved. Emitted for
/// observability only; the resolver never changes behavior based on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionStats {
    pub resolved_by_family_id: u32,
    pub resolved_by_birth_date: u32,
    pub unresolved: u32,
    pub total: u32,
}

impl ResolutionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_resolved_by_family_id(&mut self) {
        self.resolved_by_family_id += 1;
        self.total += 1;
    }

    pub fn record_resolved_by_birth_date(&mut self) {
        self.resolved_by_birth_date += 1;
        self.total += 1;
    }

    pub fn record_unresolved(&mut self) {
        self.unresolved += 1;
        self.total += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_tracks_every_recorded_outcome() {
        let mut stats = ResolutionStats::new();
        stats.record_resolved_by_family_id();
        stats.record_unresolved();
        stats.record_unresolved();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.unresolved, 2);
        assert_eq!(stats.resolved_by_family_id, 1);
        assert_eq!(stats.resolved_by_birth_date, 0);
    }
}
