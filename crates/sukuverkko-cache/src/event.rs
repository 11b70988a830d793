//! Cache change notifications for UI-layer consumers.

/// An observable cache state transition. Currently carries only the one
/// event the spec requires; more may be added as consumers need them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEvent {
    /// The persisted document's mtime advanced past what this process
    /// last wrote, meaning another process changed it.
    UpdatedExternally,
}
