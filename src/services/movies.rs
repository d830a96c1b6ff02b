use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    config::RatePolicy,
    db::Store,
    error::{AppError, AppResult},
    models::{EnrichedMovie, Movie, Rate, RatePayload},
    services::{
        aggregator::{self, UserDirectory},
        providers::{CatalogProvider, IdentityProvider},
    },
};

lazy_static! {
    static ref IMDB_ID: Regex = Regex::new(r"tt\d+").expect("valid IMDb id pattern");
}

/// Pulls the first IMDb id (`tt` followed by digits) out of free-form text
pub fn extract_imdb_id(raw: &str) -> Option<&str> {
    IMDB_ID.find(raw).map(|m| m.as_str())
}

/// Lists every movie as seen by `viewer_id`, in storage order
pub async fn list_movies(store: &dyn Store, viewer_id: &str) -> AppResult<Vec<EnrichedMovie>> {
    let movies = store.list_movies().await?;
    let rates = store.list_rates().await?;
    let users = store.list_users().await?;

    tracing::debug!(
        movies = movies.len(),
        rates = rates.len(),
        users = users.len(),
        "Enriching movie list"
    );

    Ok(aggregator::enrich_all(&movies, &rates, &users, viewer_id))
}

/// Fetches one movie as seen by `viewer_id`
pub async fn get_movie(
    store: &dyn Store,
    imdb_id: &str,
    viewer_id: &str,
) -> AppResult<EnrichedMovie> {
    let movie = find_existing(store, imdb_id).await?;
    let rates = store.rates_for_movie(imdb_id).await?;
    let users = store.list_users().await?;

    let rate_refs: Vec<&Rate> = rates.iter().collect();
    Ok(aggregator::enrich(
        &movie,
        &rate_refs,
        &UserDirectory::new(&users),
        viewer_id,
    ))
}

/// Adds a movie from free-form input containing an IMDb id
///
/// The creator's user row is materialized before the movie is stored, so the
/// author shows up in `authorProfile` and in the index denominator without
/// having rated. The stored record is returned as is, without viewer-relative
/// fields.
pub async fn create_movie(
    store: &dyn Store,
    catalog: &dyn CatalogProvider,
    identity: &dyn IdentityProvider,
    raw_input: &str,
    author_id: &str,
    token: &str,
) -> AppResult<Movie> {
    let imdb_id = extract_imdb_id(raw_input)
        .ok_or_else(|| AppError::NotFound("Wrong imdbID".to_string()))?;

    let metadata = catalog
        .lookup(imdb_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Wrong imdbID: {}", imdb_id)))?;

    // The movie is keyed by the id it was looked up with
    if metadata.imdb_id != imdb_id {
        return Err(AppError::ExternalApi(format!(
            "{} answered {:?} for {}",
            catalog.name(),
            metadata.imdb_id,
            imdb_id
        )));
    }

    let movie = Movie::new(metadata, author_id);

    if store.find_movie(movie.imdb_id()).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "resource {} already exists",
            movie.imdb_id()
        )));
    }

    ensure_user(store, identity, author_id, token).await?;

    store.insert_movie(&movie).await?;

    tracing::info!(
        imdb_id = %movie.imdb_id(),
        author = %author_id,
        provider = catalog.name(),
        "Movie created"
    );

    Ok(movie)
}

/// Creates or replaces the caller's rate for a movie
///
/// A subject rating for the first time gets a user row from the identity
/// provider before the rate is written.
pub async fn rate_movie(
    store: &dyn Store,
    identity: &dyn IdentityProvider,
    imdb_id: &str,
    subject: &str,
    token: &str,
    payload: RatePayload,
) -> AppResult<Rate> {
    find_existing(store, imdb_id).await?;

    ensure_user(store, identity, subject, token).await?;

    let rate = payload.into_rate(subject, imdb_id);
    store.upsert_rate(&rate).await?;

    tracing::info!(
        imdb_id = %imdb_id,
        author = %subject,
        seen = rate.seen,
        rate = rate.rate,
        "Rate stored"
    );

    Ok(rate)
}

/// Deletes a movie if `requester_id` is its author or an admin
pub async fn delete_movie(
    store: &dyn Store,
    imdb_id: &str,
    requester_id: &str,
    policy: RatePolicy,
) -> AppResult<()> {
    let movie = find_existing(store, imdb_id).await?;

    if movie.author_id != requester_id {
        let is_admin = store
            .find_user(requester_id)
            .await?
            .is_some_and(|user| user.admin);

        if !is_admin {
            return Err(AppError::Forbidden(format!(
                "only the author or an admin may delete {}",
                imdb_id
            )));
        }
    }

    if !store.remove_movie(imdb_id).await? {
        return Err(AppError::NotFound(format!("movie {} not found", imdb_id)));
    }

    let removed_rates = match policy {
        RatePolicy::Cascade => store.remove_rates_for_movie(imdb_id).await?,
        RatePolicy::Retain => 0,
    };

    tracing::info!(
        imdb_id = %imdb_id,
        requester = %requester_id,
        policy = ?policy,
        removed_rates,
        "Movie deleted"
    );

    Ok(())
}

async fn find_existing(store: &dyn Store, imdb_id: &str) -> AppResult<Movie> {
    store
        .find_movie(imdb_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("movie {} not found", imdb_id)))
}

/// Materializes the subject's user row if it does not exist yet
async fn ensure_user(
    store: &dyn Store,
    identity: &dyn IdentityProvider,
    subject: &str,
    token: &str,
) -> AppResult<()> {
    if store.find_user(subject).await?.is_some() {
        return Ok(());
    }

    let mut user = identity.fetch_profile(token).await?;
    user.user_id = subject.to_string();

    if store.insert_user_if_absent(&user).await? {
        tracing::info!(subject = %subject, provider = identity.name(), "User materialized");
    }

    Ok(())
}
