//! In-memory + disk-persistent cache of resolved [`FamilyNetwork`]s.
//!
//! `FamilyCache` is the single-owner actor spec'd for this layer: callers
//! never lock anything themselves, they call [`FamilyCache::get_or_build`]
//! and let the cache coalesce concurrent requests for the same family into
//! one in-flight build via [`futures::future::Shared`].

mod document;
mod event;

pub use event::CacheEvent;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use sukuverkko_core::{FamilyId, FamilyNetwork, SukuverkkoError};

use document::CacheDocument;

/// One resolved network plus the bookkeeping the citation/debug surfaces
/// want: when it was cached and how long the original resolution took.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedFamily {
    pub network: FamilyNetwork,
    pub cached_at: DateTime<Utc>,
    pub extraction_time_seconds: f64,
}

type InFlight = Shared<BoxFuture<'static, Result<FamilyNetwork, SukuverkkoError>>>;

/// The in-memory + disk-persistent family network cache.
pub struct FamilyCache {
    path: PathBuf,
    entries: DashMap<String, CachedFamily>,
    in_flight: DashMap<String, InFlight>,
    events: broadcast::Sender<CacheEvent>,
    last_written_mtime: std::sync::Mutex<Option<std::time::SystemTime>>,
}

impl FamilyCache {
    /// Builds a cache backed by `path`. Does not touch disk until
    /// [`Self::load`] is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let (tx, _rx) = broadcast::channel(32);
        Self {
            path: path.into(),
            entries: DashMap::new(),
            in_flight: DashMap::new(),
            events: tx,
            last_written_mtime: std::sync::Mutex::new(None),
        }
    }

    /// Resolves the default cache file path under the platform cache
    /// directory, mirroring the teacher's `dirs`-based disk backend.
    pub fn default_path() -> Result<PathBuf, SukuverkkoError> {
        let dir = dirs::cache_dir()
            .ok_or_else(|| SukuverkkoError::CachePersistenceWarning("no platform cache directory".into()))?;
        Ok(dir.join("sukuverkko").join("families.json"))
    }

    /// Subscribe to external-change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Load the persisted document from disk, replacing the in-memory
    /// entries. A missing file is not an error (first run); a document
    /// with a stale or absent `schemaVersion` is migrated or discarded per
    /// [`document::CacheDocument::load`].
    pub fn load(&self) -> Result<(), SukuverkkoError> {
        let document = CacheDocument::load(&self.path)?;
        self.entries.clear();
        for (key, cached) in document.families {
            self.entries.insert(key, cached);
        }
        *self.last_written_mtime.lock().expect("mtime lock poisoned") = file_mtime(&self.path);
        Ok(())
    }

    /// Re-read the persisted document, as `load`, but first checks whether
    /// the file has changed since this process last wrote it and emits
    /// [`CacheEvent::UpdatedExternally`] if so.
    pub fn reload_if_changed(&self) -> Result<bool, SukuverkkoError> {
        let current_mtime = file_mtime(&self.path);
        let last = *self.last_written_mtime.lock().expect("mtime lock poisoned");
        if current_mtime > last {
            self.load()?;
            let _ = self.events.send(CacheEvent::UpdatedExternally);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// A cached network, if present. Checks for an external change first.
    pub fn get(&self, family_id: &FamilyId) -> Option<CachedFamily> {
        let _ = self.reload_if_changed();
        self.entries.get(family_id.as_str()).map(|e| e.clone())
    }

    /// Returns the cached network for `family_id`, or runs `build` exactly
    /// once even under concurrent callers, caching and persisting the
    /// result. `build` returns the resolved network plus how long the
    /// resolution took to build (for `CachedFamily::extraction_time_seconds`).
    pub async fn get_or_build<F, Fut>(
        &self,
        family_id: &FamilyId,
        build: F,
    ) -> Result<FamilyNetwork, SukuverkkoError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(FamilyNetwork, f64), SukuverkkoError>> + Send + 'static,
    {
        if let Some(cached) = self.get(family_id) {
            return Ok(cached.network);
        }

        let key = family_id.as_str().to_string();

        if let Some(existing) = self.in_flight.get(&key) {
            return existing.clone().await;
        }

        let shared: InFlight = build_and_store(self, family_id.clone(), build).boxed().shared();
        self.in_flight.insert(key.clone(), shared.clone());
        let result = shared.await;
        self.in_flight.remove(&key);
        result
    }

    /// Remove one family from the in-memory cache and persist the change.
    pub fn delete(&self, family_id: &FamilyId) -> Result<(), SukuverkkoError> {
        self.entries.remove(family_id.as_str());
        self.persist()
    }

    /// Remove every family from the in-memory cache and persist the change.
    pub fn clear(&self) -> Result<(), SukuverkkoError> {
        self.entries.clear();
        self.persist()
    }

    /// Number of cached families.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) -> Result<(), SukuverkkoError> {
        let families = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        CacheDocument::save(&self.path, families)?;
        *self.last_written_mtime.lock().expect("mtime lock poisoned") = file_mtime(&self.path);
        Ok(())
    }
}

async fn build_and_store<F, Fut>(
    cache: &FamilyCache,
    family_id: FamilyId,
    build: F,
) -> Result<FamilyNetwork, SukuverkkoError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(FamilyNetwork, f64), SukuverkkoError>>,
{
    let (network, extraction_time_seconds) = build().await?;
    let cached = CachedFamily {
        network: network.clone(),
        cached_at: Utc::now(),
        extraction_time_seconds,
    };
    cache.entries.insert(family_id.as_str().to_string(), cached);
    if let Err(e) = cache.persist() {
        tracing::warn!(family_id = %family_id, error = %e, "failed to persist cache after build");
    }
    Ok(network)
}

fn file_mtime(path: &Path) -> Option<std::time::SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Convenience alias for sharing one cache across tasks.
pub type SharedFamilyCache = Arc<FamilyCache>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use sukuverkko_core::types::{Couple, Person};
    use sukuverkko_core::types::Family;

    fn sample_network(id: &str) -> FamilyNetwork {
        let family = Family {
            family_id: FamilyId::new(id),
            page_references: vec![],
            couples: vec![Couple {
                husband: Person {
                    name: "Matti".to_string(),
                    ..Person::unknown_placeholder()
                },
                wife: Person::unknown_placeholder(),
                marriage_date: None,
                full_marriage_date: None,
                children: vec![],
                children_died_infancy: None,
                couple_notes: vec![],
            }],
            notes: vec![],
            note_definitions: Default::default(),
        };
        FamilyNetwork::new(family)
    }

    #[tokio::test]
    async fn get_or_build_runs_the_builder_once_per_family() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FamilyCache::new(dir.path().join("families.json"));
        let calls = Arc::new(AtomicUsize::new(0));

        let calls_clone = calls.clone();
        let network = cache
            .get_or_build(&FamilyId::new("KORPI 6"), move || {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                async move { Ok((sample_network("KORPI 6"), 0.01)) }
            })
            .await
            .unwrap();
        assert_eq!(network.main_family.family_id, FamilyId::new("KORPI 6"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let calls_clone = calls.clone();
        let _ = cache
            .get_or_build(&FamilyId::new("KORPI 6"), move || {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                async move { Ok((sample_network("KORPI 6"), 0.01)) }
            })
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1, "second call must hit the cache, not rebuild");
    }

    #[tokio::test]
    async fn concurrent_get_or_build_coalesces_into_one_build() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(FamilyCache::new(dir.path().join("families.json")));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_build(&FamilyId::new("KORPI 6"), move || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        async move {
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Ok((sample_network("KORPI 6"), 0.02))
                        }
                    })
                    .await
            }));
        }

        for h in handles {
            h.await.unwrap().unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn delete_and_clear_persist_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FamilyCache::new(dir.path().join("families.json"));
        cache
            .get_or_build(&FamilyId::new("KORPI 6"), || async {
                Ok((sample_network("KORPI 6"), 0.0))
            })
            .await
            .unwrap();
        assert_eq!(cache.len(), 1);

        cache.delete(&FamilyId::new("KORPI 6")).unwrap();
        assert!(cache.is_empty());

        let reloaded = FamilyCache::new(dir.path().join("families.json"));
        reloaded.load().unwrap();
        assert!(reloaded.is_empty());
    }
}
