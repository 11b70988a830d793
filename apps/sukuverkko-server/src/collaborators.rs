//! Bootstraps the collaborators every handler needs, and the
//! resolve-and-cache operation they share, mirroring
//! `sukuverkko-cli`'s `ops` module but addressed to the server's own
//! `ServerConfig`.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use sukuverkko_cache::FamilyCache;
use sukuverkko_core::types::{FamilyNetwork, Person};
use sukuverkko_core::{FamilyId, SukuverkkoError};
use sukuverkko_extract::{HttpStructuredExtractor, StructuredExtractor};
use sukuverkko_names::NameEquivalence;
use sukuverkko_resolver::{resolve_family_network, ResolverContext};
use sukuverkko_text::SourceText;

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct Collaborators {
    pub source: Arc<SourceText>,
    pub extractor: Arc<dyn StructuredExtractor>,
    pub names: Arc<NameEquivalence>,
    pub cache: Arc<FamilyCache>,
}

pub fn build_collaborators(cfg: &ServerConfig) -> Result<Collaborators, SukuverkkoError> {
    let source = SourceText::load(&cfg.source_path)?;
    let names = NameEquivalence::load_default();
    let cache = build_cache(cfg)?;

    let api_key = cfg.extractor_api_key.clone().ok_or(SukuverkkoError::ExtractorNotConfigured)?;
    let extractor = HttpStructuredExtractor::with_timeout(
        api_key,
        cfg.extractor_model.clone(),
        std::time::Duration::from_secs(cfg.extractor_timeout_seconds),
    )
    .with_base_url(cfg.extractor_base_url.clone());

    Ok(Collaborators {
        source: Arc::new(source),
        extractor: Arc::new(extractor),
        names: Arc::new(names),
        cache: Arc::new(cache),
    })
}

pub fn build_cache(cfg: &ServerConfig) -> Result<FamilyCache, SukuverkkoError> {
    let path: PathBuf = match &cfg.cache_dir {
        Some(dir) => PathBuf::from(dir).join("families.json"),
        None => FamilyCache::default_path()?,
    };
    let cache = FamilyCache::new(path);
    cache.load()?;
    Ok(cache)
}

/// Returns the cached network for `family_id`, building it if necessary.
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
            let (network, _stats) = resolve_family_network(family, &ctx).await;
            Ok((network, start.elapsed().as_secs_f64()))
        })
        .await
}

/// Finds a person by name among the main family's parents and children.
pub fn find_person<'a>(network: &'a FamilyNetwork, person_name: &str, names: &NameEquivalence) -> Option<&'a Person> {
    network
        .main_family
        .all_parents()
        .into_iter()
        .chain(network.main_family.couples.iter().flat_map(|c| c.children.iter()))
        .find(|p| names_match(&p.display_name(), person_name, names) || names_match(&p.name, person_name, names))
}

fn names_match(a: &str, b: &str, names: &NameEquivalence) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim()) || names.are_equivalent(a, b)
}

pub fn is_cached(collaborators: &Collaborators) -> impl Fn(&FamilyId) -> bool + Send + Sync + 'static {
    let cache = Arc::clone(&collaborators.cache);
    move |id: &FamilyId| cache.get(id).is_some()
}

pub fn prefetch_one(collaborators: &Collaborators) -> impl Fn(FamilyId) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync + 'static {
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
