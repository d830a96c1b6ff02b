use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    db::Store,
    error::{AppError, AppResult},
    models::{Movie, Rate, User},
};

/// In-process store backed by ordered vectors
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

#[derive(Default)]
struct MemoryStoreInner {
    movies: Vec<Movie>,
    rates: Vec<Rate>,
    users: Vec<User>,
}

impl MemoryStore {
    /// Creates a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn list_movies(&self) -> AppResult<Vec<Movie>> {
        Ok(self.inner.read().await.movies.clone())
    }

    async fn find_movie(&self, imdb_id: &str) -> AppResult<Option<Movie>> {
        let inner = self.inner.read().await;
        Ok(inner.movies.iter().find(|m| m.imdb_id() == imdb_id).cloned())
    }

    async fn insert_movie(&self, movie: &Movie) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if inner.movies.iter().any(|m| m.imdb_id() == movie.imdb_id()) {
            return Err(AppError::Conflict(format!(
                "resource {} already exists",
                movie.imdb_id()
            )));
        }
        inner.movies.push(movie.clone());
        Ok(())
    }

    async fn remove_movie(&self, imdb_id: &str) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.movies.len();
        inner.movies.retain(|m| m.imdb_id() != imdb_id);
        Ok(inner.movies.len() != before)
    }

    async fn list_rates(&self) -> AppResult<Vec<Rate>> {
        Ok(self.inner.read().await.rates.clone())
    }

    async fn rates_for_movie(&self, imdb_id: &str) -> AppResult<Vec<Rate>> {
        let inner = self.inner.read().await;
        Ok(inner
            .rates
            .iter()
            .filter(|r| r.imdb_id == imdb_id)
            .cloned()
            .collect())
    }

    async fn upsert_rate(&self, rate: &Rate) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let existing = inner
            .rates
            .iter()
            .position(|r| r.author_id == rate.author_id && r.imdb_id == rate.imdb_id);
        match existing {
            Some(pos) => inner.rates[pos] = rate.clone(),
            None => inner.rates.push(rate.clone()),
        }
        Ok(())
    }

    async fn remove_rates_for_movie(&self, imdb_id: &str) -> AppResult<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.rates.len();
        inner.rates.retain(|r| r.imdb_id != imdb_id);
        Ok((before - inner.rates.len()) as u64)
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self.inner.read().await.users.clone())
    }

    async fn find_user(&self, user_id: &str) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.user_id == user_id).cloned())
    }

    async fn insert_user_if_absent(&self, user: &User) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.user_id == user.user_id) {
            return Ok(false);
        }
        inner.users.push(user.clone());
        Ok(true)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
