use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{EnrichedMovie, Movie, Rate, RatePayload},
    services::movies,
};

use super::{AppState, AuthUser};

/// Body of a movie creation request
#[derive(Debug, Deserialize)]
pub struct MovieForm {
    /// Free-form text containing an IMDb id, e.g. a pasted IMDb URL
    pub imdb: String,
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// List all movies enriched for the caller
pub async fn list_movies(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    user: AuthUser,
) -> AppResult<Json<Vec<EnrichedMovie>>> {
    let enriched = movies::list_movies(state.store.as_ref(), &user.subject).await?;

    tracing::info!(
        request_id = %request_id,
        viewer = %user.subject,
        count = enriched.len(),
        "Listed movies"
    );

    Ok(Json(enriched))
}

/// Get one movie enriched for the caller
pub async fn get_movie(
    State(state): State<AppState>,
    user: AuthUser,
    Path(imdb_id): Path<String>,
) -> AppResult<Json<EnrichedMovie>> {
    let enriched = movies::get_movie(state.store.as_ref(), &imdb_id, &user.subject).await?;
    Ok(Json(enriched))
}

/// Create a movie from free-form input
pub async fn create_movie(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    user: AuthUser,
    payload: Result<Json<MovieForm>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Movie>)> {
    let Json(form) = payload?;

    tracing::info!(
        request_id = %request_id,
        author = %user.subject,
        input = %form.imdb,
        "Processing movie creation"
    );

    let movie = movies::create_movie(
        state.store.as_ref(),
        state.catalog.as_ref(),
        state.identity.as_ref(),
        &form.imdb,
        &user.subject,
        &user.token,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(movie)))
}

/// Create or replace the caller's rate for a movie
pub async fn rate_movie(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    user: AuthUser,
    Path(imdb_id): Path<String>,
    payload: Result<Json<RatePayload>, JsonRejection>,
) -> AppResult<Json<Rate>> {
    let Json(payload) = payload?;

    tracing::debug!(request_id = %request_id, imdb_id = %imdb_id, "Processing rate upsert");

    let rate = movies::rate_movie(
        state.store.as_ref(),
        state.identity.as_ref(),
        &imdb_id,
        &user.subject,
        &user.token,
        payload,
    )
    .await?;

    Ok(Json(rate))
}

/// Delete a movie; author or admin only
pub async fn delete_movie(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    user: AuthUser,
    Path(imdb_id): Path<String>,
) -> AppResult<StatusCode> {
    tracing::debug!(request_id = %request_id, imdb_id = %imdb_id, "Processing movie deletion");

    movies::delete_movie(
        state.store.as_ref(),
        &imdb_id,
        &user.subject,
        state.rate_policy,
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
