//! The four operations spec.md §6 names, shared between every subcommand:
//! resolve-and-cache a family network, render its citation, drive a
//! prefetch run, and administer the cache.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use sukuverkko_cache::FamilyCache;
use sukuverkko_core::types::{FamilyNetwork, Person};
use sukuverkko_core::{FamilyId, SukuverkkoError};
use sukuverkko_extract::StructuredExtractor;
use sukuverkko_names::NameEquivalence;
use sukuverkko_resolver::{resolve_family_network, ResolverContext};
use sukuverkko_scheduler::PrefetchScheduler;
use sukuverkko_text::SourceText;

/// The collaborators every operation needs, bundled so each CLI command
/// doesn't have to thread five separate arguments through.
#[derive(Clone)]
pub struct Collaborators {
    pub source: Arc<SourceText>,
    pub extractor: Arc<dyn StructuredExtractor>,
    pub names: Arc<NameEquivalence>,
    pub cache: Arc<FamilyCache>,
}

/// Returns the cached network for `family_id`, building it (via the
/// extractor and resolver) if it is not already cached.
pub async fn resolve_and_cache(collaborators: &Collaborators, family_id: &FamilyId) -> Result<FamilyNetwork, SukuverkkoError> {
    let source = Arc::clone(&collaborators.source);
    let extractor = Arc::clone(&collaborators.extractor);
    let names = Arc::clone(&collaborators.names);
    let cache = Arc::clone(&collaborators.cache);
    let family_id_owned = family_id.clone();

    collaborators
        .cache
        .get_or_build(family_id, move || async move {
            let start = Instant::now();
            let text = source
                .segment(&family_id_owned)
                .ok_or_else(|| SukuverkkoError::FamilyNotFound(family_id_owned.to_string()))?
                .to_string();
            let raw = extractor
                .extract(&family_id_owned, &text)
                .await
                .map_err(|e| SukuverkkoError::ExtractionFailed(e.to_string()))?;
            let family = sukuverkko_extract::normalize_response(&family_id_owned, &raw)?;
            let ctx = ResolverContext::new(&source, extractor.as_ref(), &names, &cache);
            let (network, stats) = resolve_family_network(family, &ctx).await;
            tracing::debug!(
                family_id = %family_id_owned,
                resolved_by_family_id = stats.resolved_by_family_id,
                resolved_by_birth_date = stats.resolved_by_birth_date,
                unresolved = stats.unresolved,
                total = stats.total,
                "resolved cross-references"
            );
            Ok((network, start.elapsed().as_secs_f64()))
        })
        .await
}

/// Finds a person by name (display name, bare name, or name-equivalence
/// match) among the main family's parents and children. Used to turn a
/// `<personName>` CLI argument into the `target` citation generation wants.
pub fn find_person<'a>(network: &'a FamilyNetwork, person_name: &str, names: &NameEquivalence) -> Option<&'a Person> {
    let candidates: Vec<&Person> = network
        .main_family
        .all_parents()
        .into_iter()
        .chain(network.main_family.couples.iter().flat_map(|c| c.children.iter()))
        .collect();

    candidates
        .into_iter()
        .find(|p| names_match(&p.display_name(), person_name, names) || names_match(&p.name, person_name, names))
}

fn names_match(a: &str, b: &str, names: &NameEquivalence) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim()) || names.are_equivalent(a, b)
}

/// Runs `start_prefetch_all` and awaits the scheduler's watch channel
/// until the run completes.
pub async fn prefetch_all(collaborators: &Collaborators, scheduler: &PrefetchScheduler) {
    let ordered_ids = collaborators.source.all_family_ids().to_vec();
    let mut rx = scheduler.subscribe();
    scheduler.start_prefetch_all(ordered_ids, is_cached(collaborators), prefetch_one(collaborators));
    await_completion(&mut rx).await;
}

/// Runs `start_prefetch_from` anchored at `family_id` and awaits completion.
pub async fn prefetch_from(collaborators: &Collaborators, scheduler: &PrefetchScheduler, family_id: &FamilyId) {
    let ordered_ids = collaborators.source.all_family_ids().to_vec();
    let mut rx = scheduler.subscribe();
    scheduler.start_prefetch_from(&ordered_ids, family_id, is_cached(collaborators), prefetch_one(collaborators));
    await_completion(&mut rx).await;
}

async fn await_completion(rx: &mut tokio::sync::watch::Receiver<sukuverkko_scheduler::PrefetchState>) {
    loop {
        if !rx.borrow().is_prefetching {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}

fn is_cached(collaborators: &Collaborators) -> impl Fn(&FamilyId) -> bool + Send + Sync + 'static {
    let cache = Arc::clone(&collaborators.cache);
    move |id: &FamilyId| cache.get(id).is_some()
}

fn prefetch_one(collaborators: &Collaborators) -> impl Fn(FamilyId) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync + 'static {
    let collaborators = collaborators.clone();
    move |id: FamilyId| {
        let collaborators = collaborators.clone();
        Box::pin(async move {
            if let Err(e) = resolve_and_cache(&collaborators, &id).await {
                tracing::warn!(family_id = %id, error = %e, "prefetch failed for family");
            }
        })
    }
}
