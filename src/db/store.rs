use crate::{
    error::AppResult,
    models::{Movie, Rate, User},
};

/// Persistence contract over the three collections: movies, users and rates
///
/// Listing operations return rows in creation order. Nothing here spans
/// collections transactionally.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    async fn list_movies(&self) -> AppResult<Vec<Movie>>;

    async fn find_movie(&self, imdb_id: &str) -> AppResult<Option<Movie>>;

    /// Inserts a movie; fails with `AppError::Conflict` if the IMDb id is taken
    async fn insert_movie(&self, movie: &Movie) -> AppResult<()>;

    /// Removes a movie, returning whether a row existed
    async fn remove_movie(&self, imdb_id: &str) -> AppResult<bool>;

    async fn list_rates(&self) -> AppResult<Vec<Rate>>;

    async fn rates_for_movie(&self, imdb_id: &str) -> AppResult<Vec<Rate>>;

    /// Creates or wholly replaces the row keyed by (`author_id`, `imdb_id`)
    async fn upsert_rate(&self, rate: &Rate) -> AppResult<()>;

    /// Removes every rate for a movie, returning the number removed
    async fn remove_rates_for_movie(&self, imdb_id: &str) -> AppResult<u64>;

    async fn list_users(&self) -> AppResult<Vec<User>>;

    async fn find_user(&self, user_id: &str) -> AppResult<Option<User>>;

    /// Atomically inserts the user unless a row for the subject exists.
    /// Returns whether this call created the row.
    async fn insert_user_if_absent(&self, user: &User) -> AppResult<bool>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
