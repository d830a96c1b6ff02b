/// External collaborators: the movie catalog and the identity provider
///
/// Both are consumed through small traits so handlers can be exercised with
/// in-process doubles.
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::{CatalogMovie, User},
};

pub mod cached_catalog;
pub mod identity;
pub mod omdb;

pub use cached_catalog::CachedCatalog;
pub use identity::JwtIdentityProvider;
pub use omdb::OmdbProvider;

/// Source of canonical movie metadata
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Looks up an IMDb id; `Ok(None)` when the catalog reports it unknown
    async fn lookup(&self, imdb_id: &str) -> AppResult<Option<CatalogMovie>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Verified bearer token claims
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Every other claim, e.g. `admin` or `app_metadata`
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Validates bearer credentials and resolves user profiles
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verifies a bearer token, failing with `AppError::Unauthorized`
    fn validate(&self, token: &str) -> AppResult<Claims>;

    /// Fetches the profile of the token's subject
    async fn fetch_profile(&self, token: &str) -> AppResult<User>;

    fn name(&self) -> &'static str;
}
