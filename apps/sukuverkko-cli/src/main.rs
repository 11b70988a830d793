//! Sukuverkko CLI: lookup, citation, prefetch, and cache administration
//! over a source compendium, per spec.md §6.

mod config;
mod ops;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use sukuverkko_cache::FamilyCache;
use sukuverkko_core::{FamilyId, SukuverkkoError};
use sukuverkko_extract::HttpStructuredExtractor;
use sukuverkko_names::NameEquivalence;
use sukuverkko_scheduler::PrefetchScheduler;
use sukuverkko_text::SourceText;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::ops::Collaborators;

#[derive(Parser)]
#[command(name = "sukuverkko", about = "Resolve and cite genealogical family records")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a family and print its structured summary.
    Lookup { family_id: String },
    /// Emit a citation string for one person within a family.
    Citation { family_id: String, person_name: String },
    /// Warm the cache from the anchor family (or from the start of the
    /// source if no anchor is given) for up to N families.
    Prefetch { anchor_family_id: Option<String> },
    /// Administer the persistent cache.
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[derive(Subcommand)]
enum CacheCommand {
    /// Delete every cached entry.
    Clear,
    /// Delete one cached entry.
    Delete { family_id: String },
}

#[tokio::main]
async fn main() {
    let cfg = Settings::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {e}");
        std::process::exit(4);
    });

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level)))
        .init();

    let cli = Cli::parse();
    let exit_code = run(cli, &cfg).await;
    std::process::exit(exit_code);
}

async fn run(cli: Cli, cfg: &Settings) -> i32 {
    match cli.command {
        Command::Lookup { family_id } => match build_collaborators(cfg) {
            Ok(collaborators) => run_lookup(&collaborators, &family_id).await,
            Err(e) => report(&e),
        },
        Command::Citation { family_id, person_name } => match build_collaborators(cfg) {
            Ok(collaborators) => run_citation(&collaborators, &family_id, &person_name).await,
            Err(e) => report(&e),
        },
        Command::Prefetch { anchor_family_id } => match build_collaborators(cfg) {
            Ok(collaborators) => run_prefetch(&collaborators, anchor_family_id.as_deref()).await,
            Err(e) => report(&e),
        },
        Command::Cache(CacheCommand::Clear) => match build_cache(cfg) {
            Ok(cache) => report_result(cache.clear()),
            Err(e) => report(&e),
        },
        Command::Cache(CacheCommand::Delete { family_id }) => match build_cache(cfg) {
            Ok(cache) => {
                let id = FamilyId::new(&family_id);
                report_result(cache.delete(&id))
            }
            Err(e) => report(&e),
        },
    }
}

async fn run_lookup(collaborators: &Collaborators, family_id: &str) -> i32 {
    let id = FamilyId::new(family_id);
    match ops::resolve_and_cache(collaborators, &id).await {
        Ok(network) => {
            println!("{:#?}", network.main_family);
            0
        }
        Err(e) => report(&e),
    }
}

async fn run_citation(collaborators: &Collaborators, family_id: &str, person_name: &str) -> i32 {
    let id = FamilyId::new(family_id);
    match ops::resolve_and_cache(collaborators, &id).await {
        Ok(network) => {
            let target = ops::find_person(&network, person_name, &collaborators.names);
            let citation = sukuverkko_citation::generate_citation(
                &network.main_family,
                target,
                Some(&network),
                Some(&collaborators.names),
            );
            print!("{citation}");
            0
        }
        Err(e) => report(&e),
    }
}

async fn run_prefetch(collaborators: &Collaborators, anchor_family_id: Option<&str>) -> i32 {
    let scheduler = PrefetchScheduler::new();
    match anchor_family_id {
        Some(anchor) => {
            let id = FamilyId::new(anchor);
            ops::prefetch_from(collaborators, &scheduler, &id).await;
        }
        None => ops::prefetch_all(collaborators, &scheduler).await,
    }
    let state = scheduler.current_state();
    info!(completed = state.completed_count, total = state.total_count, "prefetch finished");
    0
}

fn build_collaborators(cfg: &Settings) -> Result<Collaborators, SukuverkkoError> {
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

fn build_cache(cfg: &Settings) -> Result<FamilyCache, SukuverkkoError> {
    let path: PathBuf = match &cfg.cache_dir {
        Some(dir) => PathBuf::from(dir).join("families.json"),
        None => FamilyCache::default_path()?,
    };
    let cache = FamilyCache::new(path);
    cache.load()?;
    Ok(cache)
}

fn report(err: &SukuverkkoError) -> i32 {
    error!(%err, "command failed");
    match err {
        SukuverkkoError::FamilyNotFound(_) => 2,
        SukuverkkoError::ExtractorNotConfigured => 3,
        _ => 4,
    }
}

fn report_result(result: Result<(), SukuverkkoError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => report(&e),
    }
}
