//! REST handlers over the four spec.md §6 operations.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use sukuverkko_core::FamilyId;

use crate::collaborators;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /families/:id
pub async fn get_family(State(state): State<AppState>, Path(family_id): Path<String>) -> Result<Json<serde_json::Value>, ApiError> {
    let id = FamilyId::new(&family_id);
    let network = collaborators::resolve_and_cache(&state.collaborators, &id).await?;
    Ok(Json(serde_json::to_value(&network.main_family).unwrap_or(serde_json::Value::Null)))
}

#[derive(Deserialize)]
pub struct CitationQuery {
    pub person: String,
}

/// GET /families/:id/citation?person=<name>
pub async fn get_citation(
    State(state): State<AppState>,
    Path(family_id): Path<String>,
    Query(query): Query<CitationQuery>,
) -> Result<String, ApiError> {
    let id = FamilyId::new(&family_id);
    let network = collaborators::resolve_and_cache(&state.collaborators, &id).await?;
    let target = collaborators::find_person(&network, &query.person, &state.collaborators.names);
    Ok(sukuverkko_citation::generate_citation(
        &network.main_family,
        target,
        Some(&network),
        Some(&state.collaborators.names),
    ))
}

/// POST /prefetch — warms the cache from the start of the source, up to
/// the scheduler's bound. Returns immediately; progress is observable via
/// `AppState::scheduler`.
pub async fn post_prefetch(State(state): State<AppState>) -> StatusCode {
    let ordered_ids = state.collaborators.source.all_family_ids().to_vec();
    state.scheduler.start_prefetch_all(
        ordered_ids,
        collaborators::is_cached(&state.collaborators),
        collaborators::prefetch_one(&state.collaborators),
    );
    StatusCode::ACCEPTED
}

/// DELETE /cache/:id
pub async fn delete_cache_entry(State(state): State<AppState>, Path(family_id): Path<String>) -> Result<StatusCode, ApiError> {
    let id = FamilyId::new(&family_id);
    state.collaborators.cache.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /cache
pub async fn delete_cache(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.collaborators.cache.clear()?;
    Ok(StatusCode::NO_CONTENT)
}
