//! Bounded, cancellable background prefetch of family networks.
//!
//! `PrefetchScheduler` is deliberately ignorant of how a family is
//! actually resolved — callers supply a `prefetch_one` closure (typically
//! a thin wrapper around `FamilyCache::get_or_build` plus the resolver)
//! so this crate never depends on `sukuverkko-cache`/`sukuverkko-resolver`.

mod state;

pub use state::PrefetchState;

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use sukuverkko_core::FamilyId;

/// Pause between successive prefetches, giving the foreground request
/// priority over the extraction service and source file I/O.
const INTER_FAMILY_PAUSE: std::time::Duration = std::time::Duration::from_secs(2);

/// Maximum number of uncached families `start_prefetch_from` will queue.
const PREFETCH_FROM_LIMIT: usize = 10;

type PrefetchOneFn = dyn Fn(FamilyId) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync;
type IsCachedFn = dyn Fn(&FamilyId) -> bool + Send + Sync;

/// Owns at most one in-flight background prefetch task.
pub struct PrefetchScheduler {
    handle: Mutex<Option<JoinHandle<()>>>,
    cancel: Mutex<Option<CancellationToken>>,
    state_tx: watch::Sender<PrefetchState>,
}

impl Default for PrefetchScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl PrefetchScheduler {
    pub fn new() -> Self {
        let (state_tx, _rx) = watch::channel(PrefetchState::default());
        Self {
            handle: Mutex::new(None),
            cancel: Mutex::new(None),
            state_tx,
        }
    }

    /// Subscribe to prefetch progress snapshots.
    pub fn subscribe(&self) -> watch::Receiver<PrefetchState> {
        self.state_tx.subscribe()
    }

    /// The most recent snapshot without subscribing.
    pub fn current_state(&self) -> PrefetchState {
        self.state_tx.borrow().clone()
    }

    /// `true` if a prefetch task is currently running.
    pub fn is_prefetching(&self) -> bool {
        self.handle
            .lock()
            .expect("scheduler handle lock poisoned")
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Processes the entire ordered family-id list, skipping entries
    /// `is_cached` already reports as cached. A no-op if a prefetch is
    /// already running.
    pub fn start_prefetch_all(
        &self,
        ordered_ids: Vec<FamilyId>,
        is_cached: impl Fn(&FamilyId) -> bool + Send + Sync + 'static,
        prefetch_one: impl Fn(FamilyId) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync + 'static,
    ) {
        let targets: Vec<FamilyId> = ordered_ids.into_iter().filter(|id| !is_cached(id)).collect();
        self.spawn(targets, Box::new(is_cached), Box::new(prefetch_one));
    }

    /// Processes at most `PREFETCH_FROM_LIMIT` (10) uncached families
    /// strictly after `current_id` in `ordered_ids`'s order. A no-op if a
    /// prefetch is already running, or if `current_id` is not found.
    pub fn start_prefetch_from(
        &self,
        ordered_ids: &[FamilyId],
        current_id: &FamilyId,
        is_cached: impl Fn(&FamilyId) -> bool + Send + Sync + 'static,
        prefetch_one: impl Fn(FamilyId) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync + 'static,
    ) {
        let Some(position) = ordered_ids.iter().position(|id| id == current_id) else {
            debug!(current_id = %current_id, "start_prefetch_from: anchor not found in source order");
            return;
        };

        let targets: Vec<FamilyId> = ordered_ids[position + 1..]
            .iter()
            .filter(|id| !is_cached(id))
            .take(PREFETCH_FROM_LIMIT)
            .cloned()
            .collect();
        self.spawn(targets, Box::new(is_cached), Box::new(prefetch_one));
    }

    /// Cancels the running prefetch task, if any. The task observes
    /// cancellation at its next inter-family pause and stops there.
    pub fn cancel_prefetch(&self) {
        if let Some(token) = self.cancel.lock().expect("scheduler cancel lock poisoned").take() {
            token.cancel();
        }
    }

    fn spawn(&self, targets: Vec<FamilyId>, is_cached: Box<IsCachedFn>, prefetch_one: Box<PrefetchOneFn>) {
        let mut handle_guard = self.handle.lock().expect("scheduler handle lock poisoned");
        if handle_guard.as_ref().is_some_and(|h| !h.is_finished()) {
            debug!("start_prefetch: a prefetch is already running, ignoring");
            return;
        }

        let total_count = targets.len() as u32;
        let cancel = CancellationToken::new();
        *self.cancel.lock().expect("scheduler cancel lock poisoned") = Some(cancel.clone());

        let state_tx = self.state_tx.clone();
        let _ = state_tx.send(PrefetchState {
            is_prefetching: true,
            current_family_id: None,
            completed_count: 0,
            total_count,
            next_family_ready: false,
            next_family_id: targets.first().cloned(),
        });

        info!(total_count, "starting prefetch");

        let handle = tokio::spawn(async move {
            let mut completed = 0u32;
            for (index, family_id) in targets.iter().enumerate() {
                if cancel.is_cancelled() {
                    info!(completed, "prefetch cancelled");
                    break;
                }
                if is_cached(family_id) {
                    continue;
                }

                let _ = state_tx.send(PrefetchState {
                    is_prefetching: true,
                    current_family_id: Some(family_id.clone()),
                    completed_count: completed,
                    total_count,
                    next_family_ready: false,
                    next_family_id: targets.get(index + 1).cloned(),
                });

                prefetch_one(family_id.clone()).await;
                completed += 1;

                let _ = state_tx.send(PrefetchState {
                    is_prefetching: true,
                    current_family_id: Some(family_id.clone()),
                    completed_count: completed,
                    total_count,
                    next_family_ready: true,
                    next_family_id: targets.get(index + 1).cloned(),
                });

                tokio::select! {
                    () = tokio::time::sleep(INTER_FAMILY_PAUSE) => {}
                    () = cancel.cancelled() => {
                        info!(completed, "prefetch cancelled during pause");
                        break;
                    }
                }
            }

            let _ = state_tx.send(PrefetchState {
                is_prefetching: false,
                current_family_id: None,
                completed_count: completed,
                total_count,
                next_family_ready: false,
                next_family_id: None,
            });
            info!(completed, total_count, "prefetch finished");
        });

        *handle_guard = Some(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn prefetch_all_skips_already_cached_entries() {
        let scheduler = PrefetchScheduler::new();
        let visited = Arc::new(std::sync::Mutex::new(Vec::new()));

        let visited_clone = visited.clone();
        scheduler.start_prefetch_all(
            vec![FamilyId::new("A"), FamilyId::new("B"), FamilyId::new("C")],
            |id| id.as_str() == "B",
            move |id| {
                let visited = visited_clone.clone();
                Box::pin(async move {
                    visited.lock().unwrap().push(id.as_str().to_string());
                })
            },
        );

        tokio::time::advance(std::time::Duration::from_secs(10)).await;
        tokio::task::yield_now().await;
        tokio::time::advance(std::time::Duration::from_secs(10)).await;
        tokio::task::yield_now().await;

        let seen = visited.lock().unwrap().clone();
        assert_eq!(seen, vec!["A".to_string(), "C".to_string()]);
    }

    #[tokio::test]
    async fn starting_a_prefetch_while_running_is_a_no_op() {
        let scheduler = PrefetchScheduler::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let calls_clone = calls.clone();
        scheduler.start_prefetch_all(
            vec![FamilyId::new("A"), FamilyId::new("B")],
            |_| false,
            move |_| {
                let calls = calls_clone.clone();
                Box::pin(async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                })
            },
        );

        assert!(scheduler.is_prefetching());
        scheduler.start_prefetch_all(vec![FamilyId::new("X")], |_| false, move |_| Box::pin(async {}));

        scheduler.cancel_prefetch();
    }

    #[tokio::test]
    async fn start_prefetch_from_bounds_at_ten() {
        let scheduler = PrefetchScheduler::new();
        let ordered: Vec<FamilyId> = (0..20).map(|i| FamilyId::new(format!("F{i}"))).collect();
        scheduler.start_prefetch_from(&ordered, &FamilyId::new("F0"), |_| false, move |_| Box::pin(async {}));
        let state = scheduler.current_state();
        assert_eq!(state.total_count, 10);
        scheduler.cancel_prefetch();
    }
}
