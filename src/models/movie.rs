use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AnnotatedRate, UserSummary};

/// Movie metadata as returned by the OMDb catalog
///
/// Every field is an opaque string; missing fields default to empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct CatalogMovie {
    pub title: String,
    pub year: String,
    pub rated: String,
    pub released: String,
    pub runtime: String,
    pub genre: String,
    pub director: String,
    pub writer: String,
    pub actors: String,
    pub plot: String,
    pub language: String,
    pub country: String,
    pub awards: String,
    pub poster: String,
    pub metascore: String,
    #[serde(rename = "imdbRating")]
    pub imdb_rating: String,
    #[serde(rename = "imdbVotes")]
    pub imdb_votes: String,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Type")]
    pub movie_type: String,
    pub response: String,
}

/// A movie as persisted in the store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    #[serde(flatten)]
    pub catalog: CatalogMovie,
    /// Subject id of the user who added the movie
    #[serde(rename = "author")]
    pub author_id: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Movie {
    /// Creates a new movie owned by `author_id`
    pub fn new(catalog: CatalogMovie, author_id: impl Into<String>) -> Self {
        Self {
            catalog,
            author_id: author_id.into(),
            created_at: Utc::now(),
        }
    }

    /// External (IMDb) identifier
    pub fn imdb_id(&self) -> &str {
        &self.catalog.imdb_id
    }
}

/// A movie as seen by one viewer
///
/// Only the embedded [`Movie`] is ever persisted; the rest is recomputed per request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EnrichedMovie {
    #[serde(flatten)]
    pub movie: Movie,
    /// Creator identity; empty when the creator has no user row
    #[serde(rename = "authorProfile")]
    pub author: UserSummary,
    pub seen: bool,
    pub rate: i32,
    /// Other users' rates, in storage order
    pub rates: Vec<AnnotatedRate>,
    pub index: f64,
}
