pub mod memory;
pub mod postgres;
pub mod redis;
mod store;

pub use memory::MemoryStore;
pub use postgres::{create_pool, PostgresStore};
pub use redis::{create_redis_client, Cache, CacheKey, CacheWriterHandle};
pub use store::Store;

#[cfg(test)]
pub use store::MockStore;
