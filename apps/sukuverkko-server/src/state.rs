//! Shared application state for Axum handlers.

use std::sync::Arc;

use sukuverkko_scheduler::PrefetchScheduler;

use crate::collaborators::Collaborators;

#[derive(Clone)]
pub struct AppState {
    pub collaborators: Collaborators,
    pub scheduler: Arc<PrefetchScheduler>,
}

impl AppState {
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            collaborators,
            scheduler: Arc::new(PrefetchScheduler::new()),
        }
    }
}
