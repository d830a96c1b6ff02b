/// Read-through caching around an async computation.
///
/// Returns the cached value for `$key` when present. Otherwise awaits `$block`,
/// queues the result for caching with `$ttl` seconds to live, and returns it.
/// Cache read errors propagate with `?`, so the enclosing function must return
/// `AppResult`.
///
/// # Example
/// ```rust,ignore
/// let movie: Option<CatalogMovie> = cached!(
///     self.cache,
///     CacheKey::CatalogLookup(imdb_id.to_string()),
///     CATALOG_CACHE_TTL,
///     async move { self.inner.lookup(imdb_id).await }
/// )?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        if let Some(hit) = $cache.get_from_cache(&key).await? {
            tracing::debug!(key = %key, "Cache hit");
            Ok(hit)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&key, &value, $ttl);
            Ok(value)
        }
    }};
}
