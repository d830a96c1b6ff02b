use std::sync::Arc;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::AppResult,
    models::CatalogMovie,
    services::providers::CatalogProvider,
};

const CATALOG_CACHE_TTL: u64 = 86400; // 1 day

/// Wraps a catalog provider with the Redis read-through cache
///
/// Misses from the catalog are cached too, so a mistyped id is not re-fetched
/// for the lifetime of the entry.
pub struct CachedCatalog {
    inner: Arc<dyn CatalogProvider>,
    cache: Cache,
}

impl CachedCatalog {
    pub fn new(inner: Arc<dyn CatalogProvider>, cache: Cache) -> Self {
        Self { inner, cache }
    }
}

#[async_trait::async_trait]
impl CatalogProvider for CachedCatalog {
    async fn lookup(&self, imdb_id: &str) -> AppResult<Option<CatalogMovie>> {
        cached!(
            self.cache,
            CacheKey::CatalogLookup(imdb_id.to_string()),
            CATALOG_CACHE_TTL,
            self.inner.lookup(imdb_id)
        )
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
